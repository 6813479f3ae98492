//! Technical indicator implementations.
//!
//! Every indicator reports only its latest value. `Indicator::latest` is the
//! single place where the minimum-history contract is enforced.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::BollingerBands;
pub use macd::Macd;
pub use obv::{Obv, Vma};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::Stochastic;

use crate::types::Bar;

/// Denominator guard shared by all indicators.
pub const EPSILON: f64 = 1e-10;

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    type Output;

    /// Unique identifier for this indicator.
    fn id(&self) -> &str;

    /// Minimum number of bars required for calculation.
    fn min_periods(&self) -> usize;

    /// Calculate the latest value. Callers should go through `latest`.
    fn calculate(&self, bars: &[Bar]) -> Option<Self::Output>;

    /// Latest value, or `None` when the series is shorter than `min_periods`.
    fn latest(&self, bars: &[Bar]) -> Option<Self::Output> {
        if bars.len() < self.min_periods() {
            return None;
        }
        self.calculate(bars)
    }
}
