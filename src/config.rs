// src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::fetch::DEFAULT_BASE_URL;
use crate::remap::{ColumnLetterSpec, NumberLocale};

pub const DEFAULT_SHEET_ID: &str = "1WgmLAeasNKCDo1JUm_5iDv9Ww5Wzh8rQ3EXCc8nSVvQ";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Static configuration of the engine and its service, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sheet_id: String,
    /// Tab used when a request names none.
    pub default_tab: Option<String>,
    pub base_url: Url,
    pub columns: ColumnLetterSpec,
    pub locale: NumberLocale,
    pub fetch_timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_id: DEFAULT_SHEET_ID.to_string(),
            default_tab: None,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL should parse"),
            columns: ColumnLetterSpec::default(),
            locale: NumberLocale::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Config::default();

        if let Some(id) = get("SHEET_ID") {
            cfg.sheet_id = id.trim().to_string();
        }
        cfg.default_tab = get("SHEET_GID").map(|g| g.trim().to_string());
        if let Some(base) = get("SHEET_BASE_URL") {
            let mut base = base.trim().to_string();
            if !base.ends_with('/') {
                base.push('/');
            }
            cfg.base_url =
                Url::parse(&base).with_context(|| format!("parsing SHEET_BASE_URL {}", base))?;
        }
        if let Some(spec) = get("SHEET_COLUMNS") {
            cfg.columns = ColumnLetterSpec::parse(&spec).context("parsing SHEET_COLUMNS")?;
        }
        if let Some(locale) = get("SHEET_NUMBER_LOCALE") {
            cfg.locale = NumberLocale::parse(&locale).context("parsing SHEET_NUMBER_LOCALE")?;
        }
        if let Some(secs) = get("SHEET_FETCH_TIMEOUT_SECS") {
            cfg.fetch_timeout = Duration::from_secs(parse_int("SHEET_FETCH_TIMEOUT_SECS", &secs)?);
        }
        if let Some(port) = get("PORT") {
            cfg.port = parse_int("PORT", &port)?;
        }
        Ok(cfg)
    }
}

fn parse_int<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidInteger {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remap::number::VI_VN;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = from_pairs(&[]).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.sheet_id, DEFAULT_SHEET_ID);
        assert_eq!(cfg.port, 4000);
        assert!(cfg.default_tab.is_none());
    }

    #[test]
    fn test_overrides() {
        let cfg = from_pairs(&[
            ("SHEET_ID", " abc "),
            ("SHEET_GID", "123"),
            ("SHEET_BASE_URL", "http://localhost:9000/d"),
            ("SHEET_COLUMNS", "A=Name;J=TP:grouped"),
            ("SHEET_NUMBER_LOCALE", "vi-VN"),
            ("SHEET_FETCH_TIMEOUT_SECS", "3"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(cfg.sheet_id, "abc");
        assert_eq!(cfg.default_tab.as_deref(), Some("123"));
        assert_eq!(cfg.base_url.as_str(), "http://localhost:9000/d/");
        assert_eq!(cfg.columns.fields().len(), 2);
        assert_eq!(cfg.locale, VI_VN);
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(3));
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let cfg = from_pairs(&[("SHEET_GID", "  "), ("SHEET_ID", "")]).unwrap();
        assert!(cfg.default_tab.is_none());
        assert_eq!(cfg.sheet_id, DEFAULT_SHEET_ID);
    }

    #[test]
    fn test_bad_values_fail() {
        assert!(from_pairs(&[("SHEET_COLUMNS", "AB=Wide")]).is_err());
        assert!(from_pairs(&[("SHEET_NUMBER_LOCALE", "tlh")]).is_err());
        let err = from_pairs(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::InvalidInteger {
                name: "PORT",
                value: "eighty".to_string()
            })
        );
    }
}
