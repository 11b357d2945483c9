//! clientd demo front-end.
//!
//! Small HTTP server that turns JSON requests into clientd SDK calls, for
//! poking at a daemon from a browser or curl. Connection settings come from
//! CLI flags or the usual `FEDIMINT_CLIENTD_*` environment variables.

mod routes;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clientd_client::FedimintClient;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FEDERATION_ID: &str =
    "15db8cb4f1ec8e484d73b889372bec94812580f929e8148b7437d359af422cd3";

#[derive(Parser)]
#[command(name = "clientd-demo", about = "Demo web front-end for a clientd daemon")]
struct Cli {
    /// Base URL of the clientd daemon (the `/v2` prefix is added automatically).
    #[arg(long, env = "FEDIMINT_CLIENTD_BASE_URL", default_value = "http://127.0.0.1:3333")]
    base_url: String,

    /// Bearer password of the daemon.
    #[arg(long, env = "FEDIMINT_CLIENTD_PASSWORD", default_value = "password")]
    password: String,

    /// Federation used when a request does not name one.
    #[arg(long, env = "FEDIMINT_CLIENTD_ACTIVE_FEDERATION_ID", default_value = DEFAULT_FEDERATION_ID)]
    active_federation_id: String,

    /// Pick the federation's first gateway as the default at startup.
    #[arg(long, env = "FEDIMINT_CLIENTD_USE_DEFAULT_GATEWAY")]
    use_default_gateway: bool,

    /// Per-request timeout towards the daemon, in seconds (default: none).
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// HTTP port to listen on.
    #[arg(long, env = "CLIENTD_DEMO_PORT", default_value_t = 8080)]
    port: u16,
}

pub struct AppState {
    pub client: FedimintClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut builder = FedimintClient::builder()
        .base_url(&cli.base_url)
        .password(&cli.password)
        .active_federation_id(&cli.active_federation_id);
    if let Some(secs) = cli.timeout_secs {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    let client = builder.build().context("Failed to build clientd client")?;
    info!(
        base_url = client.base_url(),
        federation_id = %cli.active_federation_id,
        "clientd client ready"
    );

    if cli.use_default_gateway {
        match client.select_default_gateway().await {
            Ok(gateway) => info!(gateway_id = %gateway.info.gateway_id, "Using default gateway"),
            Err(e) => warn!("Could not select a default gateway: {}", e),
        }
    }

    let state = Arc::new(AppState { client });
    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("clientd-demo listening on {}", addr);

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
