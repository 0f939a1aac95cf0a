//! `serve`: run the HTTP server until Ctrl-C.

use std::path::Path;

use anyhow::{Context, Result};

use crate::adapters::http::ClusterHttpServer;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;

use super::{build_run_service, load_config};

pub async fn execute(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    ConfigLoader::validate(&config)?;

    let _logger = LoggerImpl::init(&config.logging)?;
    tracing::info!(
        source = ?config.data_source.kind,
        host = %config.server.host,
        port = config.server.port,
        "starting clusterhub"
    );

    let service = build_run_service(&config)?;
    let server = ClusterHttpServer::new(service, config.server.clone());
    server
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("HTTP server failed")?;

    tracing::info!("clusterhub stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
