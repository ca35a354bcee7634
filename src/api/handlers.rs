//! Request handlers, one per dashboard view.

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{debug, error};

use super::error::ApiError;
use super::AppState;
use crate::analysis::{
    compute_drivers, compute_recommendations, compute_risk_factors, compute_summary,
    AnalysisError,
};
use crate::models::{Drivers, RiskFactors, Summary};

/// Log a failed computation before it is rendered as a 500.
fn failed(view: &'static str) -> impl Fn(AnalysisError) -> ApiError {
    move |e| {
        error!("Failed to compute {}: {}", view, e);
        ApiError::from(e)
    }
}

/// `GET /api/summary`
pub async fn handle_summary(State(state): State<Arc<AppState>>) -> Result<Json<Summary>, ApiError> {
    debug!("Computing summary");
    let summary = compute_summary(&state.data, &state.context).map_err(failed("summary"))?;
    Ok(Json(summary))
}

/// `GET /api/drivers`
pub async fn handle_drivers(State(state): State<Arc<AppState>>) -> Result<Json<Drivers>, ApiError> {
    debug!("Computing drivers");
    let drivers = compute_drivers(&state.data, &state.context).map_err(failed("drivers"))?;
    Ok(Json(drivers))
}

/// `GET /api/risk-factors`
pub async fn handle_risk_factors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RiskFactors>, ApiError> {
    debug!("Computing risk factors");
    let risks =
        compute_risk_factors(&state.data, &state.context).map_err(failed("risk factors"))?;
    Ok(Json(risks))
}

/// `GET /api/recommendations`: 3 to 5 strings in priority order.
pub async fn handle_recommendations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    debug!("Computing recommendations");
    let recommendations = compute_recommendations(&state.data, &state.context)
        .map_err(failed("recommendations"))?;
    Ok(Json(recommendations))
}

/// `GET /health`
pub async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
