//! Ad-hoc batch analysis.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::BatchOutcome;
use crate::types::IndicatorParams;
use crate::AppState;

/// Upper bound on symbols per request.
pub const MAX_BATCH_SYMBOLS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub symbols: Vec<String>,
    /// Falls back to the server's configured parameters.
    pub params: Option<IndicatorParams>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze))
}

/// Analyse a batch without tracking it. Symbols that fail are listed
/// individually under `failures`.
async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<BatchOutcome>>> {
    if request.symbols.iter().all(|s| s.trim().is_empty()) {
        return Err(AppError::BadRequest("symbols must not be empty".to_string()));
    }
    if request.symbols.len() > MAX_BATCH_SYMBOLS {
        return Err(AppError::BadRequest(format!(
            "at most {} symbols per request",
            MAX_BATCH_SYMBOLS
        )));
    }

    let params = request
        .params
        .unwrap_or_else(|| state.config.indicator_params.clone());
    let outcome = state.analyzer.analyze_detailed(&request.symbols, &params).await?;
    Ok(Json(ApiResponse::new(outcome)))
}
