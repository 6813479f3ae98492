//! Average True Range (ATR) indicator.

use super::ema::ewm_span;
use super::Indicator;
use crate::types::Bar;

/// ATR (Average True Range) indicator.
///
/// Volatility measure: EWM (span = period) of the true range.
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// True range for every bar. The first bar has no prior close and uses
    /// its own high-low range.
    pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
        let mut result = Vec::with_capacity(bars.len());
        let mut previous_close: Option<f64> = None;

        for bar in bars {
            let hl = bar.high - bar.low;
            let tr = match previous_close {
                Some(pc) => hl.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
                None => hl,
            };
            result.push(tr);
            previous_close = Some(bar.close);
        }

        result
    }

    /// Smoothed true range series.
    pub fn series(bars: &[Bar], period: usize) -> Vec<f64> {
        ewm_span(&Self::true_ranges(bars), period)
    }
}

impl Indicator for Atr {
    type Output = f64;

    fn id(&self) -> &str {
        "atr"
    }

    fn min_periods(&self) -> usize {
        self.period.saturating_add(1)
    }

    fn calculate(&self, bars: &[Bar]) -> Option<f64> {
        Self::series(bars, self.period).last().copied()
    }
}
