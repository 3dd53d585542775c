// src/resolve/mod.rs

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::error::ResolveError;
use crate::fetch::{SheetEndpoint, SheetFetcher};
use crate::matcher::{match_rows, MatchQuery};
use crate::remap::{remap, ColumnLetterSpec, NumberLocale, ResolvedRow};
use crate::table;
use crate::wire;

/// Successful outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub match_count: usize,
    /// Sheet column names as declared, empty names included.
    pub header: Vec<String>,
    /// One entry per matching row, in sheet order. Callers that only show one take the first.
    pub resolved_rows: Vec<ResolvedRow>,
}

/// Fetch → decode → build → match → remap. Holds only static configuration, so one instance can
/// serve any number of concurrent resolutions.
pub struct Resolver<F> {
    fetcher: F,
    endpoint: SheetEndpoint,
    default_tab: Option<String>,
    columns: ColumnLetterSpec,
    locale: NumberLocale,
}

impl<F: SheetFetcher> Resolver<F> {
    pub fn new(fetcher: F, endpoint: SheetEndpoint) -> Self {
        Self {
            fetcher,
            endpoint,
            default_tab: None,
            columns: ColumnLetterSpec::default(),
            locale: NumberLocale::default(),
        }
    }

    pub fn from_config(fetcher: F, config: &Config) -> Result<Self> {
        let endpoint = SheetEndpoint::new(&config.base_url, &config.sheet_id)?;
        Ok(Self::new(fetcher, endpoint)
            .with_default_tab(config.default_tab.clone())
            .with_columns(config.columns.clone())
            .with_locale(config.locale))
    }

    pub fn with_default_tab(mut self, tab: Option<String>) -> Self {
        self.default_tab = tab;
        self
    }

    pub fn with_columns(mut self, columns: ColumnLetterSpec) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn columns(&self) -> &ColumnLetterSpec {
        &self.columns
    }

    /// Resolve `identifier` against the sheet tab `tab_id` (or the configured default tab).
    #[instrument(level = "info", skip(self, tab_id), fields(tab = ?tab_id))]
    pub async fn resolve(
        &self,
        identifier: &str,
        tab_id: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        let outcome = self.run(identifier, tab_id).await;
        match &outcome {
            Ok(res) => info!(matches = res.match_count, "resolved"),
            Err(err) => log_failure(err),
        }
        outcome
    }

    async fn run(&self, identifier: &str, tab_id: Option<&str>) -> Result<Resolution, ResolveError> {
        let query = MatchQuery::new(identifier);
        if query.is_empty() {
            return Err(ResolveError::MissingIdentifier);
        }

        let tab = tab_id.or(self.default_tab.as_deref());
        let url = self.endpoint.query_url(tab);
        let resp = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|e| ResolveError::UpstreamUnavailable {
                status: None,
                body: format!("{:#}", e),
            })?;
        if !resp.is_success() {
            return Err(ResolveError::UpstreamUnavailable {
                status: Some(resp.status),
                body: resp.body,
            });
        }

        resolve_text(&resp.body, &query, &self.columns, &self.locale)
    }
}

/// The synchronous tail of the pipeline, run over an already fetched 2xx body.
pub fn resolve_text(
    text: &str,
    query: &MatchQuery,
    columns: &ColumnLetterSpec,
    locale: &NumberLocale,
) -> Result<Resolution, ResolveError> {
    if !wire::has_response_marker(text) {
        return Err(ResolveError::NotPublicOrInvalid);
    }
    let doc = wire::decode(text)?;
    let table = table::build(doc);
    let matched = match_rows(&table, query);
    let resolved_rows: Vec<ResolvedRow> = matched
        .into_iter()
        .map(|row| remap(row, table.header(), columns, locale))
        .collect();
    debug!(rows = table.rows().len(), matched = resolved_rows.len(), "pipeline done");

    Ok(Resolution {
        match_count: resolved_rows.len(),
        header: table.header().to_vec(),
        resolved_rows,
    })
}

fn log_failure(err: &ResolveError) {
    match err {
        ResolveError::MissingIdentifier => debug!("rejected blank identifier"),
        ResolveError::UpstreamUnavailable { status, body } => {
            warn!(status = ?status, body_len = body.len(), error = %err, "upstream unavailable")
        }
        ResolveError::NotPublicOrInvalid => warn!("sheet feed lacks the setResponse marker"),
        ResolveError::InvalidWireFormat(msg) => {
            error!(detail = %msg, "sheet feed format changed or is corrupt")
        }
    }
}
