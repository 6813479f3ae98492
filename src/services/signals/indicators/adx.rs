//! Average Directional Index (ADX) indicator.

use super::atr::Atr;
use super::ema::ewm_span;
use super::{Indicator, EPSILON};
use crate::types::{AdxValue, Bar};

/// ADX (Average Directional Index) indicator.
///
/// Measures trend strength (not direction):
/// - Below 20: Weak trend / ranging market
/// - 20-40: Trending
/// - Above 40: Strong trend
///
/// Combined with +DI and -DI for direction. Directional movement and true
/// range are smoothed with an EWM of span `period`.
pub struct Adx {
    period: usize,
}

impl Default for Adx {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// +DM and -DM per bar. The first bar has no movement.
    fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
        let mut plus_dm = Vec::with_capacity(bars.len());
        let mut minus_dm = Vec::with_capacity(bars.len());
        plus_dm.push(0.0);
        minus_dm.push(0.0);

        for pair in bars.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            plus_dm.push((current.high - previous.high).max(0.0));
            minus_dm.push((previous.low - current.low).max(0.0));
        }

        (plus_dm, minus_dm)
    }
}

impl Indicator for Adx {
    type Output = AdxValue;

    fn id(&self) -> &str {
        "adx"
    }

    fn min_periods(&self) -> usize {
        self.period.saturating_add(1)
    }

    fn calculate(&self, bars: &[Bar]) -> Option<AdxValue> {
        if bars.is_empty() {
            return None;
        }

        let (plus_dm, minus_dm) = Self::directional_movement(bars);
        let smoothed_plus = ewm_span(&plus_dm, self.period);
        let smoothed_minus = ewm_span(&minus_dm, self.period);
        let atr = Atr::series(bars, self.period);

        let mut plus_di = Vec::with_capacity(bars.len());
        let mut minus_di = Vec::with_capacity(bars.len());
        let mut dx = Vec::with_capacity(bars.len());
        for i in 0..atr.len() {
            let pdi = 100.0 * smoothed_plus[i] / (atr[i] + EPSILON);
            let mdi = 100.0 * smoothed_minus[i] / (atr[i] + EPSILON);
            dx.push(100.0 * (pdi - mdi).abs() / (pdi + mdi + EPSILON));
            plus_di.push(pdi);
            minus_di.push(mdi);
        }

        let adx = ewm_span(&dx, self.period);
        Some(AdxValue {
            adx: *adx.last()?,
            plus_di: *plus_di.last()?,
            minus_di: *minus_di.last()?,
        })
    }
}
