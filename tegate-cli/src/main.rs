//! tegate CLI
//!
//! Runs the proxy server, or pushes a single request through the same
//! cached, rate-gated pipeline for inspection.

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tegate_api::ApiServer;
use tegate_client::UpstreamClient;
use tegate_core::{ProxyConfig, ProxyError, QueryParams};

/// tegate - rate-limited, caching proxy for the Trading Economics API
#[derive(Parser)]
#[command(name = "tegate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the proxy server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "3000")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Fetch one upstream path and print the JSON body
    Fetch {
        /// Upstream path, e.g. /indicators
        path: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short = 'q', long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "tegate=debug,tower_http=debug,info"
    } else {
        "tegate=info,warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Fetch {
            path,
            query,
            compact,
        } => cmd_fetch(&path, query, compact).await,
    }
}

/// Run the proxy server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    let config = ProxyConfig::from_env();

    println!("{}", "Starting tegate proxy...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} {}", "Upstream:".green(), config.base_url);
    println!(
        "   {} {}ms between calls, {}s cache TTL",
        "Limits:".green(),
        config.min_interval.as_millis(),
        config.cache_ttl.as_secs()
    );
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(config).context("Failed to build upstream client")?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {bind}:{port}"))?;
    server.run(addr).await?;

    Ok(())
}

/// Fetch a single path through the pipeline
async fn cmd_fetch(path: &str, query: Vec<(String, String)>, compact: bool) -> Result<()> {
    let client = UpstreamClient::new(ProxyConfig::from_env())
        .context("Failed to build upstream client")?;
    let query: QueryParams = query.into_iter().collect();

    match client.request(path, &query).await {
        Ok(value) => {
            let out = if compact {
                serde_json::to_string(&value)?
            } else {
                serde_json::to_string_pretty(&value)?
            };
            println!("{out}");
            Ok(())
        }
        Err(ProxyError::TerminalUpstream { status, body }) => {
            eprintln!("{} upstream returned {}", "✗".red().bold(), status);
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            bail!("upstream error {status}")
        }
        Err(err) => Err(err).context(format!("Request for {path} failed")),
    }
}
