//! HTTP query surface.
//!
//! Four read-only JSON endpoints, one per view, plus a health check. Every
//! request recomputes its view from the shared snapshot.

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::{response::IntoResponse, response::Response, routing::get, Router};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::analysis::ReportingContext;
use crate::config::ServerConfig;
use crate::data::Dataset;

pub use error::ApiError;
pub use handlers::*;

/// State shared by every handler. Never mutated after startup.
#[derive(Debug)]
pub struct AppState {
    pub data: Arc<Dataset>,
    pub context: ReportingContext,
}

/// Render a handler panic as the usual `{"error": ...}` 500.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!("Request handler panicked: {}", detail);
    ApiError::Internal(detail).into_response()
}

/// Panic recovery, request tracing and, optionally, permissive CORS.
fn apply_layers(router: Router, cors: bool) -> Router {
    let router = router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

pub fn configure_routes(state: Arc<AppState>, cors: bool) -> Router {
    let router = Router::new()
        .route("/api/summary", get(handle_summary))
        .route("/api/drivers", get(handle_drivers))
        .route("/api/risk-factors", get(handle_risk_factors))
        .route("/api/recommendations", get(handle_recommendations))
        .route("/health", get(handle_health))
        .with_state(state);

    apply_layers(router, cors)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                error!("Failed to register SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutting down HTTP server...");
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn serve(state: Arc<AppState>, config: &ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = configure_routes(state, config.cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} - is another instance running?", addr))?;

    info!("HTTP server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}
