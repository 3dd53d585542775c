// src/fetch/stub.rs

use anyhow::Result;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;

use super::{FetchResponse, SheetFetcher};

/// Replays one canned response and records the URLs it was asked for.
pub(crate) struct StubFetcher {
    reply: std::result::Result<FetchResponse, String>,
    seen: Mutex<Vec<Url>>,
}

impl StubFetcher {
    pub(crate) fn ok(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(FetchResponse {
                status,
                body: body.to_string(),
            }),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(msg: &str) -> Self {
        Self {
            reply: Err(msg.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn seen(&self) -> Vec<Url> {
        self.seen.lock().unwrap().clone()
    }
}

impl SheetFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse> {
        self.seen.lock().unwrap().push(url.clone());
        self.reply.clone().map_err(|m| anyhow::anyhow!(m))
    }
}

/// A query-feed body with columns `Name, Rank, Role, Score` (A-D) and the given row objects.
pub(crate) fn feed(rows: &str) -> String {
    format!(
        r#"/*O_o*/
google.visualization.Query.setResponse({{"version":"0.6","status":"ok","table":{{"cols":[{{"id":"A","label":"Name","type":"string"}},{{"id":"B","label":"Rank","type":"string"}},{{"id":"C","label":"Role","type":"string"}},{{"id":"D","label":"Score","type":"string"}}],"rows":[{}]}}}});"#,
        rows
    )
}

pub(crate) const LMS_ROW: &str = r#"{"c":[{"v":"lms001"},{"v":"Gold"},{"v":"Lead"},{"v":"2,500"}]}"#;

pub(crate) fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sheetlookup=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
