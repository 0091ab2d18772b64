// ABOUTME: OAuth token exchange proxy server for wearable provider connections
// ABOUTME: Holds client secrets server-side and exchanges, refreshes, and revokes tokens for the app
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]

//! # Coach Token Proxy Binary
//!
//! Serves `POST /token-exchange`, `POST /refresh-token`, `POST /revoke-token`
//! and `GET /health` so the mobile app never sees provider client secrets.

use anyhow::Result;
use clap::Parser;
use pierre_coach::{
    config::ServerConfig,
    constants::service_names,
    logging,
    middleware::{setup_cors, with_request_tracing},
    oauth2_client::TokenExchangeClient,
    routes,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "coach-token-proxy")]
#[command(about = "Pierre Coach - OAuth token exchange proxy for wearable providers")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Pierre Coach token proxy");
    info!("{}", config.summary());

    let client = Arc::new(TokenExchangeClient::new(config.oauth.clone()));
    let app = with_request_tracing(routes::router(client), service_names::COACH_TOKEN_PROXY)
        .layer(setup_cors(&config.cors_allowed_origins));

    let addr = SocketAddr::new(args.host, config.http_port);
    let listener = TcpListener::bind(addr).await?;
    info!("Token proxy listening on http://{addr}");
    display_available_endpoints(&addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        return Err(e.into());
    }

    info!("Token proxy stopped");
    Ok(())
}

fn display_available_endpoints(addr: &SocketAddr) {
    info!("=== Available Endpoints ===");
    info!("  GET  http://{addr}/health");
    info!("  POST http://{addr}/token-exchange");
    info!("  POST http://{addr}/refresh-token");
    info!("  POST http://{addr}/revoke-token");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
