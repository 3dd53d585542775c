// src/service/mod.rs

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use warp::http::StatusCode;
use warp::{reject::Rejection, reply::Reply, Filter};

use crate::error::{FailureKind, ResolveError};
use crate::fetch::SheetFetcher;
use crate::resolve::Resolver;

#[derive(Debug, Default, Deserialize)]
pub struct SheetQuery {
    #[serde(rename = "lmsCode", alias = "identifier")]
    pub lms_code: Option<String>,
    pub gid: Option<String>,
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({ "ok": true })))
}

async fn sheet_lookup<F: SheetFetcher>(
    query: SheetQuery,
    resolver: Arc<Resolver<F>>,
) -> Result<warp::reply::Response, Rejection> {
    let identifier = query.lms_code.unwrap_or_default();
    let reply = match resolver.resolve(&identifier, query.gid.as_deref()).await {
        Ok(resolution) => {
            warp::reply::with_status(warp::reply::json(&resolution), StatusCode::OK).into_response()
        }
        Err(err) => failure_reply(&err),
    };
    Ok(reply)
}

/// HTTP status a failure is reported with.
pub fn failure_status(err: &ResolveError) -> StatusCode {
    match err.kind() {
        FailureKind::MissingIdentifier | FailureKind::NotPublicOrInvalid => StatusCode::BAD_REQUEST,
        FailureKind::UpstreamUnavailable => err
            .upstream_status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        FailureKind::InvalidWireFormat => StatusCode::BAD_GATEWAY,
    }
}

fn failure_reply(err: &ResolveError) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&err.to_failure()), failure_status(err))
        .into_response()
}

/// `GET /api/health` and `GET /api/sheet?lmsCode=..[&gid=..]`.
pub fn routes<F>(
    resolver: Arc<Resolver<F>>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    F: SheetFetcher + 'static,
{
    let health = warp::path!("api" / "health")
        .and(warp::get())
        .and_then(health_check);

    let sheet = warp::path!("api" / "sheet")
        .and(warp::get())
        .and(warp::query::<SheetQuery>())
        .and(warp::any().map(move || resolver.clone()))
        .and_then(sheet_lookup::<F>);

    health.or(sheet)
}

pub async fn serve<F>(resolver: Arc<Resolver<F>>, port: u16)
where
    F: SheetFetcher + 'static,
{
    info!("Server starting on port {}", port);
    info!("Health check: http://localhost:{}/api/health", port);
    info!("Lookup endpoint: GET http://localhost:{}/api/sheet?lmsCode=<code>", port);
    warp::serve(routes(resolver)).run(([0, 0, 0, 0], port)).await;
}
