//! In-memory provider backed by preloaded data.
//!
//! Used for offline runs and tests. Symbols can be marked unavailable to
//! simulate provider outages.

use dashmap::{DashMap, DashSet};
use futures_util::future::BoxFuture;

use super::MarketDataProvider;
use crate::error::ProviderError;
use crate::types::{
    Bar, BarSeries, Fundamentals, OptionsSummary, Quote, SymbolBar, DEFAULT_SECTOR,
};

const DAY_MS: i64 = 86_400_000;

#[derive(Debug, Clone, Default)]
struct SymbolData {
    bars: Vec<Bar>,
    quote: Option<Quote>,
    sector: Option<String>,
    options: Option<OptionsSummary>,
    fundamentals: Option<Fundamentals>,
}

/// Provider serving preloaded bars and context.
#[derive(Default)]
pub struct StaticProvider {
    data: DashMap<String, SymbolData>,
    unavailable: DashSet<String>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mixed multi-symbol feed.
    pub fn from_symbol_bars(raw: impl IntoIterator<Item = SymbolBar>) -> Self {
        let provider = Self::new();
        for (symbol, series) in BarSeries::group_by_symbol(raw) {
            provider.insert_bars(&symbol, series.bars().to_vec());
        }
        provider
    }

    fn key(symbol: &str) -> String {
        symbol.trim().to_uppercase()
    }

    pub fn insert_bars(&self, symbol: &str, bars: Vec<Bar>) {
        self.data.entry(Self::key(symbol)).or_default().bars = bars;
    }

    pub fn set_quote(&self, symbol: &str, quote: Quote) {
        self.data.entry(Self::key(symbol)).or_default().quote = Some(quote);
    }

    pub fn set_sector(&self, symbol: &str, sector: &str) {
        self.data.entry(Self::key(symbol)).or_default().sector = Some(sector.to_string());
    }

    pub fn set_options(&self, symbol: &str, options: OptionsSummary) {
        self.data.entry(Self::key(symbol)).or_default().options = Some(options);
    }

    pub fn set_fundamentals(&self, symbol: &str, fundamentals: Fundamentals) {
        self.data.entry(Self::key(symbol)).or_default().fundamentals = Some(fundamentals);
    }

    /// Make every lookup for `symbol` fail with `ProviderError::Unavailable`.
    pub fn set_unavailable(&self, symbol: &str, unavailable: bool) {
        if unavailable {
            self.unavailable.insert(Self::key(symbol));
        } else {
            self.unavailable.remove(&Self::key(symbol));
        }
    }

    pub fn with_bars(self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.insert_bars(symbol, bars);
        self
    }

    pub fn with_sector(self, symbol: &str, sector: &str) -> Self {
        self.set_sector(symbol, sector);
        self
    }

    fn lookup(&self, symbol: &str) -> Result<SymbolData, ProviderError> {
        let key = Self::key(symbol);
        if self.unavailable.contains(&key) {
            return Err(ProviderError::Unavailable(format!("{} is offline", key)));
        }
        self.data
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or(ProviderError::NotFound(key))
    }
}

impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn get_bars<'a>(
        &'a self,
        symbol: &'a str,
        lookback_days: u32,
    ) -> BoxFuture<'a, Result<Vec<Bar>, ProviderError>> {
        Box::pin(async move {
            let bars = self.lookup(symbol)?.bars;
            let Some(latest) = bars.iter().map(|b| b.timestamp).max() else {
                return Ok(bars);
            };
            let cutoff = latest - i64::from(lookback_days) * DAY_MS;
            Ok(bars.into_iter().filter(|b| b.timestamp >= cutoff).collect())
        })
    }

    fn get_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<Option<Quote>, ProviderError>> {
        Box::pin(async move { Ok(self.lookup(symbol)?.quote) })
    }

    fn get_sector<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            Ok(self
                .lookup(symbol)?
                .sector
                .unwrap_or_else(|| DEFAULT_SECTOR.to_string()))
        })
    }

    fn get_options<'a>(
        &'a self,
        symbol: &'a str,
    ) -> BoxFuture<'a, Result<Option<OptionsSummary>, ProviderError>> {
        Box::pin(async move { Ok(self.lookup(symbol)?.options) })
    }

    fn get_fundamentals<'a>(
        &'a self,
        symbol: &'a str,
    ) -> BoxFuture<'a, Result<Option<Fundamentals>, ProviderError>> {
        Box::pin(async move { Ok(self.lookup(symbol)?.fundamentals) })
    }
}
