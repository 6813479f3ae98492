use std::sync::Arc;

use axum::Router;
use swingscope::config::Config;
use swingscope::sources::{MarketDataProvider, YahooFinanceClient};
use swingscope::{api, AppState};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swingscope=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!("Starting Swingscope server on {}:{}", config.host, config.port);

    let provider: Arc<dyn MarketDataProvider> =
        Arc::new(YahooFinanceClient::new(config.yahoo_timeout_secs)?);
    let state = AppState::new(config, provider);

    // Analyse the startup watchlist before serving
    if !state.config.watchlist.is_empty() {
        let outcome = state
            .analyzer
            .analyze_detailed(&state.config.watchlist, &state.config.indicator_params)
            .await?;
        for analysis in outcome.results {
            state.store.upsert(analysis);
        }
        for failure in &outcome.failures {
            warn!("Watchlist symbol {} not tracked: {}", failure.symbol, failure.reason);
        }
        info!("Tracking {} watchlist symbols", state.store.len());
    }

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let addr = format!("{}:{}", state.config.host, state.config.port);

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Swingscope server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
