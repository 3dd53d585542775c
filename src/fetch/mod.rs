// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[cfg(test)]
pub(crate) mod stub;

pub const DEFAULT_BASE_URL: &str = "https://docs.google.com/spreadsheets/d/";

/// Status and text body of one upstream response, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The only capability the engine needs from the outside world: GET a URL, return status + body.
///
/// `Err` is reserved for transport failures (connect, timeout, body read of a 2xx). A non-2xx
/// response is still `Ok` so the caller can surface its status and raw body.
pub trait SheetFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchResponse>> + Send;
}

/// `reqwest`-backed fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl SheetFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse> {
        debug!(%url, "fetching sheet feed");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let status = resp.status().as_u16();
        let response = settle_body(url, status, resp.text().await)?;
        debug!(%url, status, body_len = response.body.len(), "fetched sheet feed");
        Ok(response)
    }
}

/// Pair a status with its body read. A failed read only fails the fetch on 2xx; otherwise the
/// status is still worth reporting, with an empty body.
fn settle_body<E>(url: &Url, status: u16, body: Result<String, E>) -> Result<FetchResponse>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match body {
        Ok(body) => Ok(FetchResponse { status, body }),
        Err(e) if !(200..300).contains(&status) => {
            warn!(%url, status, error = %e, "dropping unreadable error body");
            Ok(FetchResponse {
                status,
                body: String::new(),
            })
        }
        Err(e) => Err(e).with_context(|| format!("reading body from {}", url)),
    }
}

/// The query endpoint of one spreadsheet, e.g. `<base><sheet_id>/gviz/tq?tqx=out:json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEndpoint {
    tq: Url,
}

impl SheetEndpoint {
    pub fn new(base: &Url, sheet_id: &str) -> Result<Self> {
        let sheet_id = sheet_id.trim();
        anyhow::ensure!(!sheet_id.is_empty(), "spreadsheet id is empty");
        anyhow::ensure!(
            !sheet_id.contains(['/', '?', '#']),
            "spreadsheet id '{}' contains URL delimiters",
            sheet_id
        );
        let tq = base
            .join(&format!("{}/gviz/tq", sheet_id))
            .with_context(|| format!("joining sheet id onto {}", base))?;
        Ok(Self { tq })
    }

    /// Query URL for the given tab; a blank tab id is the same as none.
    pub fn query_url(&self, tab_id: Option<&str>) -> Url {
        let mut url = self.tq.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("tqx", "out:json");
            if let Some(gid) = tab_id.map(str::trim).filter(|g| !g.is_empty()) {
                pairs.append_pair("gid", gid);
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> SheetEndpoint {
        SheetEndpoint::new(&Url::parse(DEFAULT_BASE_URL).unwrap(), "abc123").unwrap()
    }

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_query_url_without_tab() {
        let url = endpoint().query_url(None);
        assert_eq!(url.path(), "/spreadsheets/d/abc123/gviz/tq");
        assert_eq!(pairs(&url), vec![("tqx".into(), "out:json".into())]);
    }

    #[test]
    fn test_query_url_with_tab_is_encoded() {
        let url = endpoint().query_url(Some("12 & 3"));
        assert_eq!(
            pairs(&url),
            vec![
                ("tqx".into(), "out:json".into()),
                ("gid".into(), "12 & 3".into())
            ]
        );
        assert!(!url.as_str().contains("12 & 3"));
    }

    #[test]
    fn test_blank_tab_is_ignored() {
        assert_eq!(endpoint().query_url(Some("  ")), endpoint().query_url(None));
    }

    #[test]
    fn test_sheet_id_with_slash_is_rejected() {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        assert!(SheetEndpoint::new(&base, "../evil").is_err());
        assert!(SheetEndpoint::new(&base, " ").is_err());
    }

    #[test]
    fn test_response_success_range() {
        let ok = FetchResponse {
            status: 204,
            body: String::new(),
        };
        let denied = FetchResponse {
            status: 403,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!denied.is_success());
    }

    #[test]
    fn test_unreadable_error_body_keeps_status() {
        let url = endpoint().query_url(None);
        let reset = || std::io::Error::new(std::io::ErrorKind::ConnectionReset, "body cut off");

        let resp = settle_body(&url, 503, Err(reset())).unwrap();
        assert_eq!(
            resp,
            FetchResponse {
                status: 503,
                body: String::new()
            }
        );
        assert!(!resp.is_success());

        let err = settle_body(&url, 200, Err(reset())).unwrap_err();
        assert!(format!("{:#}", err).contains("body cut off"));

        let resp = settle_body::<std::io::Error>(&url, 403, Ok("denied".into())).unwrap();
        assert_eq!(resp.body, "denied");
    }
}
