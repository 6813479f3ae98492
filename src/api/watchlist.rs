//! Tracked symbols: analysed on add, replaced wholesale on refresh.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::SymbolAnalysis;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddSymbolRequest {
    pub symbol: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(add))
        .route("/:symbol", get(get_one).delete(remove))
        .route("/:symbol/refresh", post(refresh))
}

async fn list(State(state): State<AppState>) -> Json<ApiResponse<Vec<SymbolAnalysis>>> {
    Json(ApiResponse::new(state.store.get_all()))
}

/// Analyse with the configured parameters and store the record.
async fn track(state: &AppState, symbol: &str) -> Result<SymbolAnalysis> {
    let analysis = state
        .analyzer
        .analyze_one(symbol, &state.config.indicator_params)
        .await?;
    state.store.upsert(analysis.clone());
    Ok(analysis)
}

async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddSymbolRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SymbolAnalysis>>)> {
    let symbol = request.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::BadRequest("symbol must not be empty".to_string()));
    }
    let analysis = track(&state, &symbol).await?;
    info!("Tracking {}", symbol);
    Ok((StatusCode::CREATED, Json(ApiResponse::new(analysis))))
}

async fn get_one(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<SymbolAnalysis>>> {
    state
        .store
        .get(&symbol)
        .map(|analysis| Json(ApiResponse::new(analysis)))
        .ok_or_else(|| AppError::NotFound(format!("{} is not tracked", symbol.to_uppercase())))
}

async fn refresh(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<SymbolAnalysis>>> {
    if !state.store.contains(&symbol) {
        return Err(AppError::NotFound(format!(
            "{} is not tracked",
            symbol.to_uppercase()
        )));
    }
    let analysis = track(&state, &symbol).await?;
    Ok(Json(ApiResponse::new(analysis)))
}

async fn remove(State(state): State<AppState>, Path(symbol): Path<String>) -> Result<StatusCode> {
    match state.store.remove(&symbol) {
        Some(_) => {
            info!("Stopped tracking {}", symbol.to_uppercase());
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(AppError::NotFound(format!(
            "{} is not tracked",
            symbol.to_uppercase()
        ))),
    }
}
