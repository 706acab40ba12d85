mod config;
mod export;
mod metrics;
mod pipeline;
mod render;
mod server;

use crate::config::{Command, Config};
use crate::metrics::DashboardMetrics;
use crate::server::AppState;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::parse();
    tracing::info!(config = ?config, "Starting damage map");

    let settings = config.dashboard.settings()?;
    let dashboard = pipeline::load_dashboard(&settings)?;

    match config.command {
        Command::Export { output_dir } => {
            let written = export::export_dashboard(&dashboard, &output_dir)?;
            tracing::info!(
                dir = %output_dir.display(),
                files = written.len(),
                "Dashboard exported"
            );
        }
        Command::Serve {
            listen_addr,
            metrics_listen_addr,
        } => {
            let metrics = Arc::new(DashboardMetrics::new());
            metrics.footprints_loaded.set(dashboard.rows.len() as i64);
            metrics.load_seconds.set(dashboard.load_time.as_secs_f64());

            // Metrics server
            let metrics_router = metrics.router();
            tokio::spawn(async move {
                let listener = match tokio::net::TcpListener::bind(metrics_listen_addr).await {
                    Ok(listener) => listener,
                    Err(e) => {
                        tracing::error!(error = %e, addr = %metrics_listen_addr, "Failed to bind metrics listener");
                        return;
                    }
                };
                tracing::info!(addr = %metrics_listen_addr, "Metrics server started");
                if let Err(e) = axum::serve(listener, metrics_router.into_make_service()).await {
                    tracing::error!(error = %e, "Metrics server failed");
                }
            });

            let state = Arc::new(AppState::new(&dashboard, metrics)?);
            server::serve(state, listen_addr).await?;
        }
    }

    Ok(())
}
