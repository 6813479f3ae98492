//! Indicator and signal engine.
//!
//! Pure, synchronous computation over one symbol's bars: the indicator set,
//! the rule-based trade opinion and the composite score.

pub mod features;
pub mod indicators;
pub mod resolver;
pub mod scorer;

pub use features::{extract_features, price_fields, price_levels};
pub use resolver::{resolve, ResolverConfig};
pub use scorer::{score, ScoringPolicy};

use crate::types::{Bar, IndicatorParams, IndicatorSet, MovingAverage};
use indicators::{Adx, Atr, BollingerBands, Indicator, Macd, Obv, Rsi, Sma, Stochastic, Vma};

/// Compute every indicator as of the last bar.
///
/// Fields whose minimum history is not met are `None`; the set itself is
/// always produced.
pub fn compute_indicators(bars: &[Bar], params: &IndicatorParams) -> IndicatorSet {
    let moving_averages = params
        .ma_periods
        .iter()
        .map(|&period| MovingAverage {
            period,
            value: Sma::new(period).latest(bars),
        })
        .collect();

    IndicatorSet {
        rsi: Rsi::new(params.rsi_period).latest(bars),
        moving_averages,
        bollinger: BollingerBands::new(params.bb_period, params.bb_stddev).latest(bars),
        macd: Macd::new(params.macd_short, params.macd_long, params.macd_signal).latest(bars),
        vma: Vma::new(params.vma_period).latest(bars),
        obv: Obv.latest(bars),
        stochastic: Stochastic::new(params.stoch_k, params.stoch_d).latest(bars),
        atr: Atr::new(params.atr_period).latest(bars),
        adx: Adx::new(params.adx_period).latest(bars),
    }
}

#[cfg(test)]
mod tests {
    use super::indicators::testing::create_uptrend_bars;
    use super::*;

    #[test]
    fn test_compute_full_history() {
        let bars = create_uptrend_bars(120);
        let set = compute_indicators(&bars, &IndicatorParams::default());
        assert!(set.rsi.is_some());
        assert_eq!(set.moving_averages.len(), 3);
        assert!(set.ma_long().is_some());
        assert!(set.bollinger.is_some());
        assert!(set.macd.is_some());
        assert!(set.vma.is_some());
        assert!(set.obv.is_some());
        assert!(set.stochastic.is_some());
        assert!(set.atr.is_some());
        assert!(set.adx.is_some());
    }

    #[test]
    fn test_compute_short_history_nulls() {
        let bars = create_uptrend_bars(20);
        let set = compute_indicators(&bars, &IndicatorParams::default());
        assert!(set.rsi.is_some());
        assert!(set.ma_mid().is_some());
        assert!(set.ma_long().is_none());
        assert!(set.macd.is_none());
        assert!(set.bollinger.is_some());
    }

    #[test]
    fn test_compute_empty_series() {
        let set = compute_indicators(&[], &IndicatorParams::default());
        assert_eq!(set.rsi, None);
        assert!(set.moving_averages.iter().all(|m| m.value.is_none()));
        assert_eq!(set.obv, None);
    }
}
