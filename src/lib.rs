//! Swingscope - indicator, signal and scoring engine for daily price bars

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::{AnalysisStore, AnalyzerConfig, BatchAnalyzer};
use sources::MarketDataProvider;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<BatchAnalyzer<dyn MarketDataProvider>>,
    pub store: Arc<AnalysisStore>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn MarketDataProvider>) -> Self {
        let analyzer = BatchAnalyzer::new(provider, AnalyzerConfig::from(&config));
        Self {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
            store: Arc::new(AnalysisStore::new()),
        }
    }
}

// Re-export commonly used types
pub use types::*;
