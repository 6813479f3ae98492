//! Gem discovery over a symbol list or the tracked set.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use super::analyze::MAX_BATCH_SYMBOLS;
use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::{find_gems, GemCriteria};
use crate::types::SymbolAnalysis;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GemsRequest {
    /// Symbols to analyse fresh. Empty screens the tracked analyses instead.
    #[serde(default)]
    pub symbols: Vec<String>,
    pub criteria: Option<GemCriteria>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(gems))
}

async fn gems(
    State(state): State<AppState>,
    Json(request): Json<GemsRequest>,
) -> Result<Json<ApiResponse<Vec<SymbolAnalysis>>>> {
    if request.symbols.len() > MAX_BATCH_SYMBOLS {
        return Err(AppError::BadRequest(format!(
            "at most {} symbols per request",
            MAX_BATCH_SYMBOLS
        )));
    }
    let criteria = request.criteria.unwrap_or_default();

    let candidates = if request.symbols.is_empty() {
        state.store.get_all()
    } else {
        state
            .analyzer
            .analyze(&request.symbols, &state.config.indicator_params)
            .await?
    };

    Ok(Json(ApiResponse::new(find_gems(&candidates, &criteria))))
}
