use crate::metrics::DashboardMetrics;
use crate::pipeline::Dashboard;
use crate::render::page::{confusion_svg, render_page};
use anyhow::Context;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc};

/// Read-only state shared by every handler. Bodies are rendered once up front.
pub struct AppState {
    page: String,
    buildings_json: String,
    geojson: String,
    confusion_svg: Option<String>,
    metrics: Arc<DashboardMetrics>,
}

impl AppState {
    pub fn new(dashboard: &Dashboard, metrics: Arc<DashboardMetrics>) -> anyhow::Result<Self> {
        Ok(Self {
            page: render_page(dashboard).context("Failed to render dashboard page")?,
            buildings_json: serde_json::to_string(&dashboard.rows)
                .context("Failed to serialize building rows")?,
            geojson: dashboard.table.to_geojson().to_string(),
            confusion_svg: confusion_svg(dashboard),
            metrics,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/buildings", get(buildings))
        .route("/buildings.geojson", get(geojson))
        .route("/confusion_matrix.svg", get(confusion_matrix))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    state.metrics.record_request("index");
    Html(state.page.clone())
}

async fn buildings(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.record_request("buildings");
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.buildings_json.clone(),
    )
        .into_response()
}

async fn geojson(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.record_request("geojson");
    (
        [(header::CONTENT_TYPE, "application/geo+json")],
        state.geojson.clone(),
    )
        .into_response()
}

async fn confusion_matrix(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.record_request("confusion_matrix");
    match &state.confusion_svg {
        Some(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "confusion matrix disabled").into_response(),
    }
}

/// Serve the dashboard until SIGINT/SIGTERM.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard listener on {addr}"))?;
    tracing::info!(addr = %addr, "Dashboard server started");

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Dashboard server failed")?;

    tracing::info!("Dashboard server stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
