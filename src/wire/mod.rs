// src/wire/mod.rs

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{instrument, trace, warn};

use crate::error::ResolveError;

/// Literal every public query-feed response is wrapped in.
pub const RESPONSE_MARKER: &str = "google.visualization.Query.setResponse";

/// Decoded query-feed document. Only the parts the table builder reads are modelled;
/// anything else in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WireDocument {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub table: Option<WireTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WireTable {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cols: Vec<WireColumn>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<WireRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WireColumn {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WireRow {
    #[serde(default, deserialize_with = "null_as_default")]
    pub c: Vec<Option<WireCell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WireCell {
    #[serde(default)]
    pub v: Option<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// True when the body looks like a query-feed response rather than an HTML error page.
pub fn has_response_marker(text: &str) -> bool {
    text.contains(RESPONSE_MARKER)
}

/// Strip the function-call wrapper and parse the JSON object between the first `{` and the
/// last `}` (inclusive).
#[instrument(level = "debug", skip(text), fields(text_len = text.len()))]
pub fn decode(text: &str) -> Result<WireDocument, ResolveError> {
    let start = text
        .find('{')
        .ok_or_else(|| ResolveError::InvalidWireFormat("no '{' in response".to_string()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| ResolveError::InvalidWireFormat("no '}' in response".to_string()))?;
    if end < start {
        return Err(ResolveError::InvalidWireFormat(
            "last '}' precedes first '{'".to_string(),
        ));
    }

    let json = &text[start..=end];
    trace!(json_len = json.len(), "extracted wrapped JSON");
    let doc: WireDocument = serde_json::from_str(json)
        .map_err(|e| ResolveError::InvalidWireFormat(format!("payload is not valid JSON: {}", e)))?;

    if doc.status.as_deref() == Some("error") {
        warn!("query feed reported status=error");
    }
    Ok(doc)
}
