//! Per-user record lookup over a public spreadsheet query feed.
//!
//! Fetch the feed, decode its wrapped JSON, build a [`table::Table`], pick the rows holding an
//! identifier, and remap selected column letters into named output fields.

pub mod config;
pub mod error;
pub mod fetch;
pub mod matcher;
pub mod remap;
pub mod resolve;
pub mod service;
pub mod table;
pub mod wire;

pub use config::Config;
pub use error::{ConfigError, Failure, FailureKind, ResolveError};
pub use fetch::{HttpFetcher, SheetFetcher};
pub use resolve::{Resolution, Resolver};
