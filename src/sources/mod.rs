//! Market data providers.

pub mod memory;
pub mod yahoo;

pub use memory::StaticProvider;
pub use yahoo::YahooFinanceClient;

use futures_util::future::BoxFuture;

use crate::error::ProviderError;
use crate::types::{Bar, Fundamentals, OptionsSummary, Quote, DEFAULT_SECTOR};

/// Source of daily bars and the per-symbol context the engine scores with.
///
/// Only `get_bars` is required for an analysis; the other lookups enrich it
/// and callers treat their failures as "not available".
pub trait MarketDataProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Daily bars covering roughly the last `lookback_days` calendar days.
    fn get_bars<'a>(
        &'a self,
        symbol: &'a str,
        lookback_days: u32,
    ) -> BoxFuture<'a, Result<Vec<Bar>, ProviderError>>;

    /// Live quote for the current session, if the provider has one.
    fn get_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<Option<Quote>, ProviderError>>;

    /// Sector name, or `"Default"` when unknown.
    fn get_sector<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<String, ProviderError>> {
        let _ = symbol;
        Box::pin(async { Ok(DEFAULT_SECTOR.to_string()) })
    }

    /// Volume summary for the nearest option expiry.
    fn get_options<'a>(
        &'a self,
        symbol: &'a str,
    ) -> BoxFuture<'a, Result<Option<OptionsSummary>, ProviderError>> {
        let _ = symbol;
        Box::pin(async { Ok(None) })
    }

    /// Valuation data for gem screening.
    fn get_fundamentals<'a>(
        &'a self,
        symbol: &'a str,
    ) -> BoxFuture<'a, Result<Option<Fundamentals>, ProviderError>> {
        let _ = symbol;
        Box::pin(async { Ok(None) })
    }
}
