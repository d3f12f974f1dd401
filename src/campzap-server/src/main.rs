//! CampZap — multi-tenant WhatsApp campaign dashboard backend.
//!
//! Main entry point that wires the store, media library, webhook client and
//! reporting layer into the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use campzap_core::config::AppConfig;
use campzap_dispatch::HttpWebhookClient;
use campzap_management::{api_router, AppState};
use campzap_reporting::DashboardReporter;
use campzap_storage::{MediaLibrary, MemoryBucket};
use campzap_store::{seed_demo_tenant, TenantStore};

#[derive(Parser, Debug)]
#[command(name = "campzap-server")]
#[command(about = "Multi-tenant WhatsApp campaign dashboard backend")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPZAP__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Seed a demo tenant and print its API token
    #[arg(long, default_value_t = false)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campzap=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("CampZap starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }

    info!(
        http_port = config.api.http_port,
        bucket = %config.storage.bucket,
        dispatch_url = %config.webhooks.dispatch_url,
        "Configuration loaded"
    );

    let store = Arc::new(TenantStore::new());
    let media = Arc::new(MediaLibrary::new(
        Arc::new(MemoryBucket::new()),
        config.storage.clone(),
    ));
    let webhook = Arc::new(HttpWebhookClient::new(config.webhooks.clone())?);
    let reporter = Arc::new(DashboardReporter::new(store.clone()));

    if cli.seed {
        let tenant = seed_demo_tenant(&store);
        info!(tenant_id = %tenant, token = %campzap_management::auth::dev_token(tenant),
            "Demo tenant seeded");
    }

    let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
    if let Err(e) = metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
    {
        error!(error = %e, "Failed to start metrics exporter");
    }

    let state = AppState {
        store,
        media,
        webhook,
        reporter,
    };

    let addr = format!("{}:{}", config.api.host, config.api.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "CampZap is ready to serve traffic");

    axum::serve(listener, api_router(state)).await?;

    Ok(())
}
