//! Batch orchestration: fetch market data per symbol and run the engine.
//!
//! Symbols are independent. A provider failure or a short history excludes
//! that symbol only; the rest of the batch still completes.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AnalysisError, ConfigError};
use crate::services::signals::{
    compute_indicators, extract_features, price_fields, price_levels, resolve, score,
    ResolverConfig, ScoringPolicy,
};
use crate::sources::MarketDataProvider;
use crate::types::{IndicatorParams, MarketSnapshot, SymbolAnalysis, DEFAULT_SECTOR};

/// Batch-level settings.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub lookback_days: u32,
    /// Overrides `IndicatorParams::min_history` when set.
    pub min_history: Option<usize>,
    /// Symbols fetched at once. 1 runs sequentially.
    pub concurrency: usize,
    pub resolver: ResolverConfig,
    pub scoring: ScoringPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            min_history: None,
            concurrency: 4,
            resolver: ResolverConfig::default(),
            scoring: ScoringPolicy::default(),
        }
    }
}

impl From<&Config> for AnalyzerConfig {
    fn from(config: &Config) -> Self {
        Self {
            lookback_days: config.lookback_days,
            min_history: config.min_history_bars,
            concurrency: config.batch_concurrency.max(1),
            resolver: ResolverConfig {
                adx_rules: config.adx_rules,
                volume_filter: config.volume_filter,
                ..ResolverConfig::default()
            },
            scoring: ScoringPolicy {
                thresholds: config.bucket_thresholds,
                ..ScoringPolicy::default()
            },
        }
    }
}

/// A symbol that could not be analysed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub symbol: String,
    pub reason: String,
}

impl From<&AnalysisError> for BatchFailure {
    fn from(err: &AnalysisError) -> Self {
        Self {
            symbol: err.symbol().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Results of a batch in input order, plus the excluded symbols.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<SymbolAnalysis>,
    pub failures: Vec<BatchFailure>,
}

/// Upper-case, trim and de-duplicate symbols, keeping first occurrences.
pub fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Run the engine over one symbol's market data.
///
/// The quote, when present, is merged into the series as its latest bar;
/// the last bar is then the current session.
pub fn analyze_snapshot(
    ticker: &str,
    snapshot: &MarketSnapshot,
    params: &IndicatorParams,
    config: &AnalyzerConfig,
) -> Result<SymbolAnalysis, AnalysisError> {
    params.validate().map_err(|source| AnalysisError::InvalidParams {
        symbol: ticker.to_string(),
        source,
    })?;

    let mut series = snapshot.series.clone();
    if let Some(quote) = &snapshot.quote {
        let provisional = quote.to_bar(None);
        let same_day = series
            .last()
            .filter(|last| last.day().is_some() && last.day() == provisional.day());
        let latest = quote.to_bar(same_day);
        series = series.with_latest(latest);
    }

    let need = config.min_history.unwrap_or_else(|| params.min_history());
    if series.len() < need {
        return Err(AnalysisError::InsufficientHistory {
            symbol: ticker.to_string(),
            have: series.len(),
            need,
        });
    }

    let bars = series.bars();
    let indicators = compute_indicators(bars, params);
    let prices = price_fields(bars);
    let signal = resolve(
        prices.current_price,
        prices.previous_close,
        prices.volume,
        &indicators,
        &config.resolver,
    );

    let sector = snapshot
        .sector
        .clone()
        .unwrap_or_else(|| DEFAULT_SECTOR.to_string());
    let features = extract_features(bars, &indicators, &prices, snapshot.options.as_ref());
    let score = score(&features, &sector, &config.scoring);
    let levels = price_levels(&features, &indicators, &prices);

    debug!(
        "{}: {} bars, opinion {:?}, score {:.1} ({:?})",
        ticker,
        bars.len(),
        signal.opinion,
        score.score,
        score.bucket
    );

    Ok(SymbolAnalysis {
        ticker: ticker.to_string(),
        sector,
        prices,
        indicators,
        signal,
        score,
        features,
        levels,
        fundamentals: snapshot.fundamentals,
        bars_used: bars.len(),
        analyzed_at: Utc::now(),
    })
}

/// Fetches market data from a provider and analyses symbols in batches.
pub struct BatchAnalyzer<P: ?Sized> {
    provider: Arc<P>,
    config: AnalyzerConfig,
}

impl<P: MarketDataProvider + ?Sized> BatchAnalyzer<P> {
    pub fn new(provider: Arc<P>, config: AnalyzerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Gather everything the engine needs for one symbol. Only the bars are
    /// required; the other lookups fall back to "not available".
    pub async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, AnalysisError> {
        let provider = self.provider.as_ref();
        let bars = provider
            .get_bars(symbol, self.config.lookback_days)
            .await
            .map_err(|source| AnalysisError::Provider {
                symbol: symbol.to_string(),
                source,
            })?;

        let (quote, sector, options, fundamentals) = tokio::join!(
            provider.get_quote(symbol),
            provider.get_sector(symbol),
            provider.get_options(symbol),
            provider.get_fundamentals(symbol),
        );

        let soft = |what: &str, err: &dyn std::fmt::Display| {
            warn!("[{}] {} lookup failed for {}: {}", provider.name(), what, symbol, err);
        };
        let quote = quote.unwrap_or_else(|e| {
            soft("quote", &e);
            None
        });
        let sector = sector.map(Some).unwrap_or_else(|e| {
            soft("sector", &e);
            None
        });
        let options = options.unwrap_or_else(|e| {
            soft("options", &e);
            None
        });
        let fundamentals = fundamentals.unwrap_or_else(|e| {
            soft("fundamentals", &e);
            None
        });

        Ok(MarketSnapshot {
            series: bars.into(),
            quote,
            sector,
            options,
            fundamentals,
        })
    }

    /// Analyse one symbol, producing a complete new record.
    pub async fn analyze_one(
        &self,
        symbol: &str,
        params: &IndicatorParams,
    ) -> Result<SymbolAnalysis, AnalysisError> {
        let ticker = symbol.trim().to_uppercase();
        let snapshot = self.fetch_snapshot(&ticker).await?;
        analyze_snapshot(&ticker, &snapshot, params, &self.config)
    }

    /// Analyse a batch and report both results and excluded symbols.
    pub async fn analyze_detailed<S: AsRef<str>>(
        &self,
        symbols: &[S],
        params: &IndicatorParams,
    ) -> Result<BatchOutcome, ConfigError> {
        params.validate()?;
        self.config.scoring.thresholds.validate()?;
        let symbols = normalize_symbols(symbols);
        let total = symbols.len();

        let outcomes: Vec<Result<SymbolAnalysis, AnalysisError>> = stream::iter(symbols)
            .map(|symbol| async move { self.analyze_one(&symbol, params).await })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut batch = BatchOutcome::default();
        for outcome in outcomes {
            match outcome {
                Ok(analysis) => batch.results.push(analysis),
                Err(e) => {
                    warn!("Excluding {} from batch: {}", e.symbol(), e);
                    batch.failures.push(BatchFailure::from(&e));
                }
            }
        }

        info!(
            "Analyzed {}/{} symbols via {}",
            batch.results.len(),
            total,
            self.provider.name()
        );
        Ok(batch)
    }

    /// Analyse a batch, returning records for the symbols that succeeded.
    pub async fn analyze<S: AsRef<str>>(
        &self,
        symbols: &[S],
        params: &IndicatorParams,
    ) -> Result<Vec<SymbolAnalysis>, ConfigError> {
        Ok(self.analyze_detailed(symbols, params).await?.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::indicators::testing::DAY_MS;
    use crate::sources::StaticProvider;
    use crate::types::{Bar, BarSeries, Opinion, Quote};

    fn trend(count: usize, start: f64, step: f64) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let close = start + i as f64 * step;
                Bar::new(i as i64 * DAY_MS, close, close + 1.0, close - 1.0, close, 1_000.0)
            })
            .collect()
    }

    fn analyzer(provider: StaticProvider) -> BatchAnalyzer<StaticProvider> {
        BatchAnalyzer::new(Arc::new(provider), AnalyzerConfig::default())
    }

    #[test]
    fn test_normalize_symbols() {
        let symbols = normalize_symbols(&["aapl", " MSFT ", "AAPL", "", "brk.b"]);
        assert_eq!(symbols, vec!["AAPL", "MSFT", "BRK.B"]);
    }

    #[test]
    fn test_snapshot_insufficient_history() {
        let snapshot = MarketSnapshot {
            series: BarSeries::new(trend(5, 100.0, 1.0)),
            ..Default::default()
        };
        let err = analyze_snapshot(
            "NEW",
            &snapshot,
            &IndicatorParams::default(),
            &AnalyzerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientHistory { have: 5, need: 20, .. }
        ));
    }

    #[test]
    fn test_snapshot_min_history_override() {
        let snapshot = MarketSnapshot {
            series: BarSeries::new(trend(30, 100.0, 1.0)),
            ..Default::default()
        };
        let config = AnalyzerConfig {
            min_history: Some(60),
            ..Default::default()
        };
        let err = analyze_snapshot("AAPL", &snapshot, &IndicatorParams::default(), &config)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientHistory { need: 60, .. }));
    }

    #[test]
    fn test_snapshot_invalid_params() {
        let snapshot = MarketSnapshot {
            series: BarSeries::new(trend(60, 100.0, 1.0)),
            ..Default::default()
        };
        let params = IndicatorParams {
            rsi_period: 0,
            ..Default::default()
        };
        let err = analyze_snapshot("AAPL", &snapshot, &params, &AnalyzerConfig::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParams { .. }));
    }

    #[test]
    fn test_snapshot_merges_quote_as_latest_bar() {
        let bars = trend(60, 100.0, 1.0);
        let last_ts = bars[59].timestamp;
        let snapshot = MarketSnapshot {
            series: BarSeries::new(bars),
            quote: Some(Quote {
                timestamp: last_ts + DAY_MS,
                price: 170.0,
                open: None,
                high: None,
                low: None,
                volume: Some(5_000.0),
            }),
            ..Default::default()
        };
        let analysis = analyze_snapshot(
            "AAPL",
            &snapshot,
            &IndicatorParams::default(),
            &AnalyzerConfig::default(),
        )
        .unwrap();
        assert_eq!(analysis.bars_used, 61);
        assert_eq!(analysis.prices.current_price, Some(170.0));
        assert_eq!(analysis.prices.previous_close, Some(159.0));
        assert_eq!(analysis.sector, DEFAULT_SECTOR);
    }

    #[test]
    fn test_snapshot_same_day_quote_replaces_last_bar() {
        let bars = trend(60, 100.0, 1.0);
        let last_ts = bars[59].timestamp;
        let snapshot = MarketSnapshot {
            series: BarSeries::new(bars),
            quote: Some(Quote {
                timestamp: last_ts + 3_600_000,
                price: 158.5,
                open: None,
                high: None,
                low: None,
                volume: None,
            }),
            ..Default::default()
        };
        let analysis = analyze_snapshot(
            "AAPL",
            &snapshot,
            &IndicatorParams::default(),
            &AnalyzerConfig::default(),
        )
        .unwrap();
        assert_eq!(analysis.bars_used, 60);
        assert_eq!(analysis.prices.current_price, Some(158.5));
        assert_eq!(analysis.prices.previous_close, Some(158.0));
    }

    #[tokio::test]
    async fn test_analyze_excludes_short_and_missing_symbols() {
        let provider = StaticProvider::new()
            .with_bars("AAPL", trend(60, 100.0, 1.0))
            .with_bars("NEW", trend(5, 10.0, 1.0));
        let outcome = analyzer(provider)
            .analyze_detailed(&["aapl", "NEW", "GONE"], &IndicatorParams::default())
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].ticker, "AAPL");
        let failed: Vec<_> = outcome.failures.iter().map(|f| f.symbol.as_str()).collect();
        assert_eq!(failed, vec!["NEW", "GONE"]);
    }

    #[tokio::test]
    async fn test_analyze_preserves_input_order() {
        let provider = StaticProvider::new()
            .with_bars("A", trend(40, 10.0, 1.0))
            .with_bars("B", trend(40, 20.0, 1.0))
            .with_bars("C", trend(40, 30.0, 1.0));
        let results = analyzer(provider)
            .analyze(&["c", "a", "b", "a"], &IndicatorParams::default())
            .await
            .unwrap();
        let tickers: Vec<_> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_concurrency_does_not_change_results() {
        let provider = Arc::new(
            StaticProvider::new()
                .with_bars("A", trend(80, 10.0, 0.5))
                .with_bars("B", trend(80, 50.0, -0.2)),
        );
        let params = IndicatorParams::default();
        let sequential = BatchAnalyzer::new(
            provider.clone(),
            AnalyzerConfig {
                concurrency: 1,
                ..Default::default()
            },
        );
        let parallel = BatchAnalyzer::new(
            provider,
            AnalyzerConfig {
                concurrency: 8,
                ..Default::default()
            },
        );

        let a = sequential.analyze(&["A", "B"], &params).await.unwrap();
        let b = parallel.analyze(&["A", "B"], &params).await.unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.indicators, y.indicators);
            assert_eq!(x.signal, y.signal);
            assert_eq!(x.score, y.score);
        }
    }

    #[tokio::test]
    async fn test_unavailable_provider_is_reported() {
        let provider = StaticProvider::new().with_bars("AAPL", trend(60, 100.0, 1.0));
        provider.set_unavailable("AAPL", true);
        let analyzer = analyzer(provider);
        let err = analyzer
            .analyze_one("AAPL", &IndicatorParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_before_fetching() {
        let provider = StaticProvider::new();
        let params = IndicatorParams {
            macd_short: 26,
            macd_long: 12,
            ..Default::default()
        };
        let result = analyzer(provider).analyze(&["AAPL"], &params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unordered_thresholds_rejected() {
        let provider = StaticProvider::new().with_bars("AAPL", trend(60, 100.0, 1.0));
        let mut config = AnalyzerConfig::default();
        config.scoring.thresholds.watch = 9.0;
        let analyzer = BatchAnalyzer::new(Arc::new(provider), config);
        let result = analyzer.analyze(&["AAPL"], &IndicatorParams::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_analyze_one_produces_opinion() {
        let provider = StaticProvider::new().with_bars("SPY", trend(120, 100.0, 1.0));
        let analysis = analyzer(provider)
            .analyze_one("spy", &IndicatorParams::default())
            .await
            .unwrap();
        assert_eq!(analysis.ticker, "SPY");
        assert_ne!(analysis.signal.opinion, Opinion::InsufficientData);
        assert!(analysis.score.score >= 0.0);
    }
}
