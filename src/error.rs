// src/error.rs

use serde::Serialize;
use thiserror::Error;

/// Every way a single resolution can fail. Nothing partial is returned alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("identifier is missing or blank")]
    MissingIdentifier,

    /// Transport failure (`status == None`) or a non-2xx upstream response.
    #[error("upstream unavailable (status {status:?})")]
    UpstreamUnavailable { status: Option<u16>, body: String },

    /// The feed answered 2xx but without the `setResponse` marker, usually a sharing problem.
    #[error("sheet is not public or the response is not a query feed")]
    NotPublicOrInvalid,

    #[error("invalid wire format: {0}")]
    InvalidWireFormat(String),
}

/// Stable tag of a [`ResolveError`], as exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    MissingIdentifier,
    UpstreamUnavailable,
    NotPublicOrInvalid,
    InvalidWireFormat,
}

impl ResolveError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ResolveError::MissingIdentifier => FailureKind::MissingIdentifier,
            ResolveError::UpstreamUnavailable { .. } => FailureKind::UpstreamUnavailable,
            ResolveError::NotPublicOrInvalid => FailureKind::NotPublicOrInvalid,
            ResolveError::InvalidWireFormat(_) => FailureKind::InvalidWireFormat,
        }
    }

    pub fn detail(&self) -> Option<String> {
        match self {
            ResolveError::MissingIdentifier | ResolveError::NotPublicOrInvalid => None,
            ResolveError::UpstreamUnavailable { body, .. } => Some(body.clone()),
            ResolveError::InvalidWireFormat(msg) => Some(msg.clone()),
        }
    }

    /// Upstream HTTP status, when the failure came from a real response.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ResolveError::UpstreamUnavailable { status, .. } => *status,
            _ => None,
        }
    }

    pub fn to_failure(&self) -> Failure {
        Failure {
            kind: self.kind(),
            detail: self.detail(),
        }
    }
}

/// Outbound failure document: `{ "kind": ..., "detail": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Errors raised while building the engine's static configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("column '{0}' is not a single letter A-Z (multi-letter columns are not supported)")]
    InvalidColumnLetter(String),

    #[error("malformed column entry '{0}', expected LETTER=Name[:grouped]")]
    MalformedColumnEntry(String),

    #[error("unknown column format '{0}'")]
    UnknownColumnFormat(String),

    #[error("output field name for column {0} is empty")]
    EmptyFieldName(char),

    #[error("output field name '{0}' is used more than once")]
    DuplicateFieldName(String),

    #[error("column spec has no entries")]
    EmptyColumnSpec,

    #[error("unknown number locale '{0}'")]
    UnknownLocale(String),

    #[error("{name} must be an integer, got '{value}'")]
    InvalidInteger { name: &'static str, value: String },
}
