//! Simple Moving Average (SMA) indicator.

use super::Indicator;
use crate::types::Bar;

/// Simple rolling mean of closes.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

/// Mean of the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    sma_at(values, period, values.len())
}

/// Mean of the `period` values ending just before index `end`.
pub fn sma_at(values: &[f64], period: usize, end: usize) -> Option<f64> {
    if period == 0 || end > values.len() || end < period {
        return None;
    }
    let window = &values[end - period..end];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Sample standard deviation (n - 1 denominator) of the last `period` values.
pub fn rolling_std(values: &[f64], period: usize) -> Option<f64> {
    let mean = sma(values, period)?;
    if period < 2 {
        return Some(0.0);
    }
    let window = &values[values.len() - period..];
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
    Some(variance.sqrt())
}

impl Indicator for Sma {
    type Output = f64;

    fn id(&self) -> &str {
        "sma"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[Bar]) -> Option<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma(&closes, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::bars_from_closes;
    use super::*;

    #[test]
    fn test_sma_min_periods() {
        assert_eq!(Sma::new(20).min_periods(), 20);
    }

    #[test]
    fn test_sma_value() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(Sma::new(5).latest(&bars), Some(3.0));
        assert_eq!(Sma::new(2).latest(&bars), Some(4.5));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0]);
        assert!(Sma::new(5).latest(&bars).is_none());
    }

    #[test]
    fn test_sma_at_previous_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sma_at(&values, 2, 4), Some(3.5));
        assert_eq!(sma_at(&values, 5, 4), None);
        assert_eq!(sma_at(&values, 0, 4), None);
    }

    #[test]
    fn test_rolling_std_sample() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = rolling_std(&values, 8).unwrap();
        assert!((std - 2.138089935).abs() < 1e-6);
    }
}
