use std::env;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::types::{BucketThresholds, IndicatorParams};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Calendar days of daily bars requested per symbol.
    pub lookback_days: u32,
    /// Symbols analysed concurrently within one batch.
    pub batch_concurrency: usize,
    /// Overrides the bar count derived from the indicator parameters.
    pub min_history_bars: Option<usize>,
    /// Enable the ADX trend-strength signal rules.
    pub adx_rules: bool,
    /// Require volume at or above VMA for ATR breakout signals.
    pub volume_filter: bool,
    /// Yahoo Finance request timeout in seconds.
    pub yahoo_timeout_secs: u64,
    /// Symbols analysed and tracked at startup.
    pub watchlist: Vec<String>,
    /// Default indicator parameters for requests that omit them.
    pub indicator_params: IndicatorParams,
    /// Minimum scores for the recommendation buckets.
    pub bucket_thresholds: BucketThresholds,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = IndicatorParams::default();

        // Format: "5,20,50"
        let ma_periods = env::var("MA_PERIODS")
            .ok()
            .map(|s| {
                s.split(',')
                    .filter_map(|p| p.trim().parse().ok())
                    .collect::<Vec<usize>>()
            })
            .filter(|periods| !periods.is_empty())
            .unwrap_or_else(|| defaults.ma_periods.clone());

        let indicator_params = IndicatorParams {
            rsi_period: env_parse("RSI_PERIOD").unwrap_or(defaults.rsi_period),
            ma_periods,
            bb_period: env_parse("BB_PERIOD").unwrap_or(defaults.bb_period),
            bb_stddev: env_parse("BB_STDDEV").unwrap_or(defaults.bb_stddev),
            macd_short: env_parse("MACD_SHORT").unwrap_or(defaults.macd_short),
            macd_long: env_parse("MACD_LONG").unwrap_or(defaults.macd_long),
            macd_signal: env_parse("MACD_SIGNAL").unwrap_or(defaults.macd_signal),
            vma_period: env_parse("VMA_PERIOD").unwrap_or(defaults.vma_period),
            stoch_k: env_parse("STOCH_K").unwrap_or(defaults.stoch_k),
            stoch_d: env_parse("STOCH_D").unwrap_or(defaults.stoch_d),
            atr_period: env_parse("ATR_PERIOD").unwrap_or(defaults.atr_period),
            adx_period: env_parse("ADX_PERIOD").unwrap_or(defaults.adx_period),
        };

        let default_buckets = BucketThresholds::default();
        let bucket_thresholds = BucketThresholds {
            strong_buy: env_parse("STRONG_BUY_SCORE").unwrap_or(default_buckets.strong_buy),
            watch: env_parse("WATCH_SCORE").unwrap_or(default_buckets.watch),
            caution: env_parse("CAUTION_SCORE").unwrap_or(default_buckets.caution),
        };

        let watchlist = env::var("WATCHLIST")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|sym| sym.trim().to_uppercase())
                    .filter(|sym| !sym.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT").unwrap_or(3001),
            lookback_days: env_parse("LOOKBACK_DAYS").unwrap_or(365),
            batch_concurrency: env_parse("BATCH_CONCURRENCY").unwrap_or(4).max(1),
            min_history_bars: env_parse("MIN_HISTORY_BARS"),
            adx_rules: env_flag("ADX_RULES", true),
            volume_filter: env_flag("VOLUME_FILTER", false),
            yahoo_timeout_secs: env_parse("YAHOO_TIMEOUT_SECS").unwrap_or(30),
            watchlist,
            indicator_params,
            bucket_thresholds,
        }
    }

    /// Check the indicator parameters and bucket thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicator_params.validate()?;
        self.bucket_thresholds.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            lookback_days: 365,
            batch_concurrency: 4,
            min_history_bars: None,
            adx_rules: true,
            volume_filter: false,
            yahoo_timeout_secs: 30,
            watchlist: Vec::new(),
            indicator_params: IndicatorParams::default(),
            bucket_thresholds: BucketThresholds::default(),
        }
    }
}
