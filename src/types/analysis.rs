use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Bar, BarSeries, IndicatorSet, ScoreResult, SignalResult};

/// Live quote for the current session, merged into the daily series as its
/// latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Quote {
    /// Convert to a bar, filling fields the quote lacks from `same_day`
    /// (the series' bar for the same session, if any).
    pub fn to_bar(&self, same_day: Option<&Bar>) -> Bar {
        let open = self
            .open
            .or(same_day.map(|b| b.open))
            .unwrap_or(self.price);
        let high = self
            .high
            .into_iter()
            .chain(same_day.map(|b| b.high))
            .fold(self.price.max(open), f64::max);
        let low = self
            .low
            .into_iter()
            .chain(same_day.map(|b| b.low))
            .fold(self.price.min(open), f64::min);
        let volume = self
            .volume
            .or(same_day.map(|b| b.volume))
            .unwrap_or(0.0);

        Bar::new(self.timestamp, open, high, low, self.price, volume)
    }
}

/// Per-strike volume concentration for the nearest option expiry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSummary {
    pub expiry: Option<String>,
    pub total_call_volume: f64,
    pub total_put_volume: f64,
    pub max_call_strike: Option<f64>,
    pub max_call_volume: Option<f64>,
    pub max_put_strike: Option<f64>,
    pub max_put_volume: Option<f64>,
}

/// Valuation data used by gem screening.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    pub trailing_pe: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Everything the engine needs to analyse one symbol.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub series: BarSeries,
    pub quote: Option<Quote>,
    pub sector: Option<String>,
    pub options: Option<OptionsSummary>,
    pub fundamentals: Option<Fundamentals>,
}

/// Price-derived headline fields.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFields {
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub change_pct: Option<f64>,
    pub volume: Option<f64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
    /// Percent below the 52-week high.
    pub high_gap_pct: Option<f64>,
    /// Percent above the 52-week low.
    pub low_gap_pct: Option<f64>,
}

/// Where the current price sits relative to the Bollinger bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPosition {
    AboveUpper,
    UpperHalf,
    LowerHalf,
    BelowLower,
}

/// Short/mid moving-average relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "days")]
pub enum TrendState {
    GoldenCross,
    DeadCross,
    Up(u32),
    Down(u32),
    Neutral,
}

/// Direction of the last three daily closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseStreak {
    ThreeUp,
    ThreeDown,
    Mixed,
    Insufficient,
}

/// Inputs to the composite scorer. Every field is optional; missing inputs
/// simply do not score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFeatures {
    pub current_price: Option<f64>,
    /// Short/mid MAs including the current price as the newest close.
    pub ma_short_live: Option<f64>,
    pub ma_mid_live: Option<f64>,
    /// MAs over completed bars only.
    pub prev_ma_short: Option<f64>,
    pub prev_ma_mid: Option<f64>,
    pub ma_60: Option<f64>,
    pub ma_120: Option<f64>,
    pub trend: Option<TrendState>,
    pub sustained_days: u32,
    pub rsi: Option<f64>,
    pub disparity_20: Option<f64>,
    pub band_position: Option<BandPosition>,
    pub gap_up_pct: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub turnover_million: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub high_low_ratio: Option<f64>,
    pub high_gap_pct: Option<f64>,
    pub close_streak: Option<CloseStreak>,
    pub options: Option<OptionsSummary>,
}

/// Support and resistance candidates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLevels {
    /// Nearest first (highest price first).
    pub supports: Vec<f64>,
    /// Nearest first (lowest price first), all above the current price.
    pub resistances: Vec<f64>,
}

/// Complete analysis record for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolAnalysis {
    pub ticker: String,
    pub sector: String,
    pub prices: PriceFields,
    pub indicators: IndicatorSet,
    pub signal: SignalResult,
    pub score: ScoreResult,
    pub features: ScoreFeatures,
    pub levels: PriceLevels,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamentals: Option<Fundamentals>,
    pub bars_used: usize,
    pub analyzed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    #[test]
    fn test_quote_to_bar_without_session_bar() {
        let quote = Quote {
            timestamp: DAY_MS,
            price: 10.0,
            open: None,
            high: None,
            low: None,
            volume: Some(500.0),
        };
        let bar = quote.to_bar(None);
        assert_eq!(bar.open, 10.0);
        assert_eq!(bar.high, 10.0);
        assert_eq!(bar.low, 10.0);
        assert_eq!(bar.volume, 500.0);
        assert!(bar.is_valid());
    }

    #[test]
    fn test_quote_to_bar_fills_from_session_bar() {
        let session = Bar::new(DAY_MS, 9.0, 12.0, 8.5, 11.0, 2_000.0);
        let quote = Quote {
            timestamp: DAY_MS + 3_600_000,
            price: 12.5,
            open: None,
            high: None,
            low: None,
            volume: None,
        };
        let bar = quote.to_bar(Some(&session));
        assert_eq!(bar.open, 9.0);
        assert_eq!(bar.high, 12.5);
        assert_eq!(bar.low, 8.5);
        assert_eq!(bar.close, 12.5);
        assert_eq!(bar.volume, 2_000.0);
        assert!(bar.is_valid());
    }
}
