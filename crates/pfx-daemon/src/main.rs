//! pfx-daemon entry point.
//!
//! Loads config, registers the portfolio gauges, starts one scraper per
//! configured exchange and serves `/metrics` until ctrl-c.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pfx_daemon::{bootstrap, routes, state};
use pfx_metrics::PortfolioGauges;
use pfx_runtime::SchedulerHandle;
use prometheus::Registry;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "pfx-daemon")]
#[command(about = "Brokerage portfolio exporter for Prometheus", long_about = None)]
struct Cli {
    /// Config files in merge order; later files override earlier ones.
    #[arg(long = "config", default_value = "config.yml")]
    config_paths: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    let paths: Vec<&str> = cli.config_paths.iter().map(String::as_str).collect();
    let loaded = pfx_config::load_layered_yaml(&paths).context("failed to load config")?;
    info!(config_hash = %loaded.config_hash, files = ?paths, "config loaded");
    bootstrap::warn_unused_keys(&pfx_config::report_unused_keys(&loaded.config_json));

    let registry = Registry::new();
    let gauges = PortfolioGauges::register(&registry).context("failed to register metrics")?;
    let schedulers = bootstrap::build_schedulers(&loaded.config, &gauges)?;
    if schedulers.is_empty() {
        warn!("no exchanges configured; serving empty metrics");
    }

    let statuses = schedulers.iter().map(|s| s.status()).collect();
    let handles: Vec<SchedulerHandle> = schedulers.into_iter().map(|s| s.spawn()).collect();

    let shared = Arc::new(state::AppState::new(registry, statuses));
    let app = routes::build_router(shared).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let addr = loaded.config.listen_address();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("pfx-daemon listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown(handles))
        .await
        .context("server crashed")?;

    info!("pfx-daemon stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PFX_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// Resolves on ctrl-c once every scraper has stopped.
async fn shutdown(handles: Vec<SchedulerHandle>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c; shutting down");
    }
    info!(scrapers = handles.len(), "shutdown requested");
    for handle in handles {
        handle.shutdown().await;
    }
}
