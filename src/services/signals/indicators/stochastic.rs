//! Stochastic Oscillator indicator.

use super::{Indicator, EPSILON};
use crate::types::{Bar, StochasticValue};

/// Stochastic Oscillator.
///
/// %K = position of the close within the `k`-bar high/low range (0-100),
/// %D = mean of the last `d` %K values.
/// - Below 20: Oversold
/// - Above 80: Overbought
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self { k_period, d_period }
    }

    /// %K for the window ending at `index` (inclusive).
    fn percent_k(bars: &[Bar], index: usize, k_period: usize) -> Option<f64> {
        let start = (index + 1).checked_sub(k_period)?;
        let window = bars.get(start..=index)?;

        let lowest_low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let highest_high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let close = bars[index].close;

        Some(100.0 * (close - lowest_low) / (highest_high - lowest_low + EPSILON))
    }
}

impl Indicator for Stochastic {
    type Output = StochasticValue;

    fn id(&self) -> &str {
        "stochastic"
    }

    fn min_periods(&self) -> usize {
        self.k_period.saturating_add(self.d_period).saturating_sub(1)
    }

    fn calculate(&self, bars: &[Bar]) -> Option<StochasticValue> {
        if self.k_period == 0 || self.d_period == 0 {
            return None;
        }
        let last = bars.len().checked_sub(1)?;
        let first = (last + 1).checked_sub(self.d_period)?;

        let k_values = (first..=last)
            .map(|i| Self::percent_k(bars, i, self.k_period))
            .collect::<Option<Vec<f64>>>()?;

        let k = *k_values.last()?;
        let d = k_values.iter().sum::<f64>() / self.d_period as f64;
        Some(StochasticValue { k, d })
    }
}
