use anyhow::{bail, Result};
use futures::{stream, StreamExt};
use sheetlookup::{Config, HttpFetcher, Resolver};
use std::{env, process::exit};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

const MAX_CONCURRENCY: usize = 4;

struct Args {
    identifiers: Vec<String>,
    gid: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut identifiers = Vec::new();
    let mut gid = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--gid" => match args.next() {
                Some(tab) => gid = Some(tab),
                None => bail!("--gid needs a value"),
            },
            _ => identifiers.push(arg),
        }
    }
    if identifiers.is_empty() {
        bail!("no identifiers given");
    }
    Ok(Args { identifiers, gid })
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: lookup <IDENTIFIER>... [--gid <TAB_ID>]");
            exit(2);
        }
    };

    let config = Config::from_env()?;
    let resolver = Resolver::from_config(HttpFetcher::new(config.fetch_timeout)?, &config)?;
    let gid = args.gid.as_deref();

    // resolve concurrently, print in argument order
    let results: Vec<_> = stream::iter(args.identifiers.iter())
        .map(|id| {
            let resolver = &resolver;
            async move { (id, resolver.resolve(id, gid).await) }
        })
        .buffered(MAX_CONCURRENCY)
        .collect()
        .await;

    let mut failed = 0;
    for (id, result) in results {
        let doc = match result {
            Ok(resolution) => serde_json::json!({ "identifier": id, "resolution": resolution }),
            Err(err) => {
                warn!(identifier = %id, error = %err, "lookup failed");
                failed += 1;
                serde_json::json!({ "identifier": id, "failure": err.to_failure() })
            }
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
    }

    if failed > 0 {
        exit(1);
    }
    Ok(())
}
