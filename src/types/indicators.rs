use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest lookback any indicator may request, in bars.
pub const MAX_PERIOD: usize = 5_000;

/// Lookback parameters shared by every indicator in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    /// Moving-average periods. The first three are read as short, mid and
    /// long by the signal rules.
    pub ma_periods: Vec<usize>,
    pub bb_period: usize,
    pub bb_stddev: f64,
    pub macd_short: usize,
    pub macd_long: usize,
    pub macd_signal: usize,
    pub vma_period: usize,
    pub stoch_k: usize,
    pub stoch_d: usize,
    pub atr_period: usize,
    pub adx_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ma_periods: vec![5, 20, 50],
            bb_period: 20,
            bb_stddev: 2.0,
            macd_short: 12,
            macd_long: 26,
            macd_signal: 9,
            vma_period: 20,
            stoch_k: 14,
            stoch_d: 3,
            atr_period: 14,
            adx_period: 14,
        }
    }
}

impl IndicatorParams {
    /// Reject parameter sets that cannot produce meaningful values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("bb_period", self.bb_period),
            ("macd_short", self.macd_short),
            ("macd_long", self.macd_long),
            ("macd_signal", self.macd_signal),
            ("vma_period", self.vma_period),
            ("stoch_k", self.stoch_k),
            ("stoch_d", self.stoch_d),
            ("atr_period", self.atr_period),
            ("adx_period", self.adx_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::InvalidParam(format!("{} must be positive", name)));
            }
            if value > MAX_PERIOD {
                return Err(ConfigError::InvalidParam(format!(
                    "{} must be at most {}",
                    name, MAX_PERIOD
                )));
            }
        }
        if self.ma_periods.len() < 3 {
            return Err(ConfigError::InvalidParam(
                "ma_periods needs short, mid and long periods".to_string(),
            ));
        }
        if self.ma_periods.iter().any(|&p| p == 0 || p > MAX_PERIOD) {
            return Err(ConfigError::InvalidParam(format!(
                "ma_periods must be between 1 and {}",
                MAX_PERIOD
            )));
        }
        if self.macd_short >= self.macd_long {
            return Err(ConfigError::InvalidParam(
                "macd_short must be shorter than macd_long".to_string(),
            ));
        }
        if !self.bb_stddev.is_finite() || self.bb_stddev <= 0.0 {
            return Err(ConfigError::InvalidParam("bb_stddev must be positive".to_string()));
        }
        Ok(())
    }

    pub fn short_ma_period(&self) -> Option<usize> {
        self.ma_periods.first().copied()
    }

    pub fn mid_ma_period(&self) -> Option<usize> {
        self.ma_periods.get(1).copied()
    }

    pub fn long_ma_period(&self) -> Option<usize> {
        self.ma_periods.get(2).copied()
    }

    /// Bars a symbol needs before it is worth analysing at all: enough for
    /// RSI, ATR, the Bollinger window and the mid moving average.
    pub fn min_history(&self) -> usize {
        [
            self.rsi_period.saturating_add(1),
            self.atr_period.saturating_add(1),
            self.bb_period,
            self.mid_ma_period().unwrap_or(0),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    pub period: usize,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerValue {
    /// Whether the bands have collapsed onto the middle line.
    pub fn is_degenerate(&self) -> bool {
        self.upper <= self.lower
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxValue {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Latest indicator values for one symbol as of its last bar.
///
/// `None` always means "not enough history"; nothing is defaulted to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub rsi: Option<f64>,
    pub moving_averages: Vec<MovingAverage>,
    pub bollinger: Option<BollingerValue>,
    pub macd: Option<MacdValue>,
    pub vma: Option<f64>,
    pub obv: Option<f64>,
    pub stochastic: Option<StochasticValue>,
    pub atr: Option<f64>,
    pub adx: Option<AdxValue>,
}

impl IndicatorSet {
    /// Moving average for a given period, if it was configured and computable.
    pub fn ma(&self, period: usize) -> Option<f64> {
        self.moving_averages
            .iter()
            .find(|m| m.period == period)
            .and_then(|m| m.value)
    }

    fn ma_at(&self, index: usize) -> Option<f64> {
        self.moving_averages.get(index).and_then(|m| m.value)
    }

    pub fn ma_short(&self) -> Option<f64> {
        self.ma_at(0)
    }

    pub fn ma_mid(&self) -> Option<f64> {
        self.ma_at(1)
    }

    pub fn ma_long(&self) -> Option<f64> {
        self.ma_at(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_validate() {
        assert!(IndicatorParams::default().validate().is_ok());
    }

    #[test]
    fn test_params_reject_zero_period() {
        let params = IndicatorParams {
            rsi_period: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_reject_short_ma_list() {
        let params = IndicatorParams {
            ma_periods: vec![5, 20],
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_reject_inverted_macd() {
        let params = IndicatorParams {
            macd_short: 26,
            macd_long: 12,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_reject_oversized_periods() {
        let params = IndicatorParams {
            rsi_period: usize::MAX,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        assert_eq!(params.min_history(), usize::MAX);

        let params = IndicatorParams {
            ma_periods: vec![5, 20, MAX_PERIOD + 1],
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = IndicatorParams {
            macd_long: MAX_PERIOD,
            macd_signal: MAX_PERIOD,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_min_history_defaults() {
        assert_eq!(IndicatorParams::default().min_history(), 20);
    }

    #[test]
    fn test_params_partial_json_uses_defaults() {
        let params: IndicatorParams = serde_json::from_str(r#"{"rsi_period": 7}"#).unwrap();
        assert_eq!(params.rsi_period, 7);
        assert_eq!(params.ma_periods, vec![5, 20, 50]);
        assert_eq!(params.macd_long, 26);
    }

    #[test]
    fn test_ma_lookup_by_position_and_period() {
        let set = IndicatorSet {
            moving_averages: vec![
                MovingAverage { period: 5, value: Some(10.0) },
                MovingAverage { period: 20, value: Some(9.0) },
                MovingAverage { period: 50, value: None },
            ],
            ..Default::default()
        };
        assert_eq!(set.ma_short(), Some(10.0));
        assert_eq!(set.ma(20), Some(9.0));
        assert_eq!(set.ma_long(), None);
        assert_eq!(set.ma(200), None);
    }
}
