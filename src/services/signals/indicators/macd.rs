//! Moving Average Convergence Divergence (MACD) indicator.

use super::ema::ewm_span;
use super::Indicator;
use crate::types::{Bar, MacdValue};

/// MACD indicator.
///
/// Line = fast EWM - slow EWM of closes, signal = EWM of the line,
/// histogram = line - signal.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Indicator for Macd {
    type Output = MacdValue;

    fn id(&self) -> &str {
        "macd"
    }

    fn min_periods(&self) -> usize {
        self.slow_period.saturating_add(self.signal_period).saturating_sub(1)
    }

    fn calculate(&self, bars: &[Bar]) -> Option<MacdValue> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ewm_span(&closes, self.fast_period);
        let slow = ewm_span(&closes, self.slow_period);

        let line: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal = ewm_span(&line, self.signal_period);

        let line = *line.last()?;
        let signal = *signal.last()?;
        Some(MacdValue {
            line,
            signal,
            histogram: line - signal,
        })
    }
}
