use anyhow::Result;
use sheetlookup::{service, Config, HttpFetcher, Resolver};
use std::{env, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(
        sheet_id = %config.sheet_id,
        default_tab = ?config.default_tab,
        columns = config.columns.fields().len(),
        locale = config.locale.id,
        timeout = ?config.fetch_timeout,
        "configured"
    );

    // ─── 3) serve ────────────────────────────────────────────────────
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let resolver = Arc::new(Resolver::from_config(fetcher, &config)?);
    service::serve(resolver, config.port).await;

    Ok(())
}
