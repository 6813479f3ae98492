//! Relative Strength Index (RSI) indicator.

use super::ema::ewm_com;
use super::{Indicator, EPSILON};
use crate::types::Bar;

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold (potential buy signal)
/// - Above 70: Overbought (potential sell signal)
///
/// Gains and losses are Wilder-smoothed with an EWM of `com = period - 1`.
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn id(&self) -> &str {
        "rsi"
    }

    fn min_periods(&self) -> usize {
        self.period.saturating_add(1)
    }

    fn calculate(&self, bars: &[Bar]) -> Option<f64> {
        let first = bars.first()?;

        // The first bar has no prior close and contributes a zero change.
        let mut gains = Vec::with_capacity(bars.len());
        let mut losses = Vec::with_capacity(bars.len());
        let mut previous = first.close;
        for bar in bars {
            let change = bar.close - previous;
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
            previous = bar.close;
        }

        let com = self.period.saturating_sub(1);
        let avg_gain = *ewm_com(&gains, com).last()?;
        let avg_loss = *ewm_com(&losses, com).last()?;

        // No movement at all reads as neutral.
        if avg_gain == 0.0 && avg_loss == 0.0 {
            return Some(50.0);
        }

        let rs = avg_gain / (avg_loss + EPSILON);
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}
