//! Bollinger Bands indicator.

use super::sma::{rolling_std, sma};
use super::Indicator;
use crate::types::{Bar, BollingerValue};

/// Bollinger Bands: an SMA middle line with bands `k` sample standard
/// deviations above and below it.
pub struct BollingerBands {
    period: usize,
    std_dev: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev: f64) -> Self {
        Self { period, std_dev }
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerValue;

    fn id(&self) -> &str {
        "bollinger"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Option<BollingerValue> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let middle = sma(&closes, self.period)?;
        let std = rolling_std(&closes, self.period)?;

        Some(BollingerValue {
            upper: middle + self.std_dev * std,
            middle,
            lower: middle - self.std_dev * std,
        })
    }
}
