//! Volume indicators: On-Balance Volume (OBV) and Volume Moving Average (VMA).

use super::sma::sma;
use super::Indicator;
use crate::types::Bar;

/// OBV (On-Balance Volume) indicator.
///
/// Running total that adds the bar's volume on an up close, subtracts it on
/// a down close and carries it on a flat close. The first bar contributes 0.
#[derive(Default)]
pub struct Obv;

impl Obv {
    /// Full OBV series, one value per bar.
    pub fn series(bars: &[Bar]) -> Vec<f64> {
        let mut result = Vec::with_capacity(bars.len());
        let mut obv = 0.0;
        let mut previous: Option<f64> = None;

        for bar in bars {
            if let Some(prev_close) = previous {
                if bar.close > prev_close {
                    obv += bar.volume;
                } else if bar.close < prev_close {
                    obv -= bar.volume;
                }
            }
            result.push(obv);
            previous = Some(bar.close);
        }

        result
    }
}

impl Indicator for Obv {
    type Output = f64;

    fn id(&self) -> &str {
        "obv"
    }

    fn min_periods(&self) -> usize {
        2
    }

    fn calculate(&self, bars: &[Bar]) -> Option<f64> {
        Self::series(bars).last().copied()
    }
}

/// VMA: simple rolling mean of volume.
pub struct Vma {
    period: usize,
}

impl Default for Vma {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl Vma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Vma {
    type Output = f64;

    fn id(&self) -> &str {
        "vma"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Option<f64> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        sma(&volumes, self.period)
    }
}
