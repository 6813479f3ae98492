//! Screening over tracked analyses.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::services::ScanFilter;
use crate::types::{Opinion, RecommendationBucket, SymbolAnalysis};
use crate::AppState;

/// Query string form of [`ScanFilter`]. List fields are comma-separated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanQuery {
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    /// e.g. "buy,buy_lean_mixed"
    pub opinions: Option<String>,
    /// e.g. "strong_buy,watch"
    pub buckets: Option<String>,
    pub sector: Option<String>,
    pub min_volume_ratio: Option<f64>,
}

fn parse_list<T>(raw: Option<&str>, what: &str, parse: fn(&str) -> Option<T>) -> Result<Vec<T>> {
    raw.into_iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse(s).ok_or_else(|| AppError::BadRequest(format!("unknown {}: {}", what, s))))
        .collect()
}

impl TryFrom<ScanQuery> for ScanFilter {
    type Error = AppError;

    fn try_from(query: ScanQuery) -> Result<Self> {
        Ok(ScanFilter {
            min_score: query.min_score,
            max_score: query.max_score,
            opinions: parse_list(query.opinions.as_deref(), "opinion", Opinion::from_str)?,
            buckets: parse_list(
                query.buckets.as_deref(),
                "bucket",
                RecommendationBucket::from_str,
            )?,
            sector: query.sector.filter(|s| !s.trim().is_empty()),
            min_volume_ratio: query.min_volume_ratio,
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(scan))
}

async fn scan(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ApiResponse<Vec<SymbolAnalysis>>>> {
    let filter = ScanFilter::try_from(query)?;
    let tracked = state.store.get_all();
    Ok(Json(ApiResponse::new(filter.apply(&tracked))))
}
