use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures reported by a market data provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Symbol not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse provider response: {0}")]
    Parse(String),
}

/// Reasons a symbol is excluded from a batch.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{symbol}: insufficient history ({have} bars, need {need})")]
    InsufficientHistory {
        symbol: String,
        have: usize,
        need: usize,
    },

    #[error("{symbol}: {source}")]
    Provider {
        symbol: String,
        #[source]
        source: ProviderError,
    },

    #[error("{symbol}: {source}")]
    InvalidParams {
        symbol: String,
        #[source]
        source: ConfigError,
    },
}

impl AnalysisError {
    pub fn symbol(&self) -> &str {
        match self {
            Self::InsufficientHistory { symbol, .. } => symbol,
            Self::Provider { symbol, .. } => symbol,
            Self::InvalidParams { symbol, .. } => symbol,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Provider(ProviderError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, format!("Symbol not found: {}", msg))
            }
            AppError::Provider(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            AppError::Analysis(e @ AnalysisError::InsufficientHistory { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AppError::Analysis(AnalysisError::Provider { symbol, source }) => match source {
                ProviderError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, format!("{}: {}", symbol, source))
                }
                _ => (StatusCode::BAD_GATEWAY, format!("{}: {}", symbol, source)),
            },
            AppError::Analysis(e @ AnalysisError::InvalidParams { .. }) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Config(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("AAPL".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_insufficient_history_status() {
        let err = AppError::from(AnalysisError::InsufficientHistory {
            symbol: "NEW".to_string(),
            have: 5,
            need: 20,
        });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_provider_unavailable_is_bad_gateway() {
        let err = AppError::from(AnalysisError::Provider {
            symbol: "AAPL".to_string(),
            source: ProviderError::Unavailable("timeout".to_string()),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_config_error_is_bad_request() {
        let err = AppError::from(ConfigError::InvalidParam("rsi_period".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_analysis_error_message() {
        let err = AnalysisError::InsufficientHistory {
            symbol: "NEW".to_string(),
            have: 5,
            need: 20,
        };
        assert_eq!(err.symbol(), "NEW");
        assert_eq!(err.to_string(), "NEW: insufficient history (5 bars, need 20)");
    }
}
