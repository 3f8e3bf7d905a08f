use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use roomcast_core::service::{
    EgressOrchestrator, IngressService, ParticipantService, RoomService,
};
use roomcast_core::{logging, Config, MediaClient};
use tracing::info;

use roomcast_api::http::{create_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "roomcast-api", about = "REST facade over a LiveKit media server")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    logging::init_logging(&config.logging)?;

    info!("roomcast API server starting");
    info!("HTTP address: {}", config.http_address());
    info!("media server: {}", config.livekit_http_url());

    let client = MediaClient::from_config(&config.livekit, &config.livekit_http_url())
        .context("failed to build media server client")?;

    let state = AppState {
        rooms: RoomService::new(client.clone()),
        participants: ParticipantService::new(client.clone(), config.token.clone()),
        egress: Arc::new(EgressOrchestrator::new(
            client.clone(),
            config.egress.clone(),
            config.storage.clone(),
        )),
        ingress: IngressService::new(client),
        config: Arc::new(config),
    };

    let addr = state.config.http_address();
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    info!("shutdown signal received");
}
