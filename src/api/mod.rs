pub mod analyze;
pub mod gems;
pub mod health;
pub mod scan;
pub mod watchlist;

use axum::Router;
use serde::Serialize;

use crate::AppState;

/// API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Unix milliseconds when the response was built.
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: ApiMeta {
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
        }
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/analyze", analyze::router())
        .nest("/api/watchlist", watchlist::router())
        .nest("/api/scan", scan::router())
        .nest("/api/gems", gems::router())
}
