use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use schemaflow::app::cache::TableCache;
use schemaflow::app::service::SchemaService;
use schemaflow::error;
use schemaflow::infra::adapters;
use schemaflow::infra::config::{Settings, mask_password};
use schemaflow::infra::export::MermaidRenderer;
use schemaflow::web::{AppState, router};

/// Serves cached ClickHouse table dependency diagrams over HTTP.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at debug level and print the effective configuration
    #[arg(long)]
    debug: bool,

    /// TOML configuration file, overridden by environment variables
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn log_settings(settings: &Settings) {
    let clickhouse = &settings.clickhouse;
    debug!(
        host = %clickhouse.host,
        port = clickhouse.port(),
        user = %clickhouse.user,
        password = %mask_password(&clickhouse.password),
        database = %clickhouse.database,
        transport = ?clickhouse.transport,
        tls = clickhouse.tls.enabled,
        skip_verify = clickhouse.tls.skip_verify,
        server_name = ?clickhouse.tls.server_name,
        addr = %settings.server.addr,
        ttl_secs = settings.cache.ttl.as_secs(),
        refresh_timeout_secs = settings.cache.refresh_timeout.as_secs(),
        denylist = ?settings.cache.denylist,
        "Effective configuration"
    );
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    error::install_hooks()?;

    let args = Args::parse();
    init_tracing(args.debug);

    let settings = Settings::load(args.config.as_deref()).wrap_err("failed to load configuration")?;
    if args.debug {
        log_settings(&settings);
    }

    let source = adapters::connect(&settings.clickhouse)
        .await
        .wrap_err("failed to create metadata source")?;
    match source.ping().await {
        Ok(()) => info!("Metadata source reachable"),
        Err(e) => warn!(error = %e, "Metadata source ping failed; continuing"),
    }

    let cache = Arc::new(TableCache::new(Arc::clone(&source), settings.cache.clone()));
    let service = SchemaService::new(cache, Arc::clone(&source), Arc::new(MermaidRenderer::new()));
    let app = router(Arc::new(AppState::new(service)));

    let addr = settings.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    if let Err(e) = source.close().await {
        warn!(error = %e, "Failed to close metadata source");
    }
    info!("Stopped");
    Ok(())
}
