//! Rule-based buy/sell opinion from one indicator snapshot.

use serde::{Deserialize, Serialize};

use crate::types::{IndicatorSet, Opinion, SignalReason, SignalResult};

/// Thresholds and optional rule families for the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Price below `lower * lower_band_factor` counts as near the lower band.
    pub lower_band_factor: f64,
    /// Price above `upper * upper_band_factor` counts as near the upper band.
    pub upper_band_factor: f64,
    pub stoch_oversold: f64,
    pub stoch_overbought: f64,
    /// Evaluate the ADX trend-strength rules.
    pub adx_rules: bool,
    pub adx_threshold: f64,
    /// ATR breakouts also need the current volume at or above VMA.
    pub volume_filter: bool,
    /// Mixed signals lean toward buying only when RSI is at or below this.
    pub lean_buy_rsi: f64,
    /// Mixed signals lean toward selling only when RSI is at or above this.
    pub lean_sell_rsi: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            lower_band_factor: 1.01,
            upper_band_factor: 0.99,
            stoch_oversold: 20.0,
            stoch_overbought: 80.0,
            adx_rules: true,
            adx_threshold: 25.0,
            volume_filter: false,
            lean_buy_rsi: 35.0,
            lean_sell_rsi: 65.0,
        }
    }
}

impl ResolverConfig {
    fn volume_confirms(&self, current_volume: Option<f64>, vma: Option<f64>) -> bool {
        if !self.volume_filter {
            return true;
        }
        matches!((current_volume, vma), (Some(volume), Some(vma)) if volume >= vma)
    }
}

/// Resolve a trade opinion.
///
/// A rule whose inputs are missing never fires. Without a current price or
/// previous close the result is `InsufficientData` with no reasons.
pub fn resolve(
    current_price: Option<f64>,
    previous_close: Option<f64>,
    current_volume: Option<f64>,
    indicators: &IndicatorSet,
    config: &ResolverConfig,
) -> SignalResult {
    let (Some(price), Some(prev_close)) = (current_price, previous_close) else {
        return SignalResult::insufficient_data();
    };

    let buy_reasons = buy_reasons(price, prev_close, current_volume, indicators, config);
    let sell_reasons = sell_reasons(price, prev_close, current_volume, indicators, config);

    let ma_mid = indicators.ma_mid();
    let buy_target_price = indicators.bollinger.map(|b| b.lower).or(ma_mid);
    let sell_target_price = indicators.bollinger.map(|b| b.upper).or(ma_mid);

    let opinion = decide_opinion(&buy_reasons, &sell_reasons, indicators.rsi, config);

    SignalResult {
        buy_reasons,
        sell_reasons,
        buy_target_price,
        sell_target_price,
        opinion,
    }
}

fn buy_reasons(
    price: f64,
    prev_close: f64,
    current_volume: Option<f64>,
    ind: &IndicatorSet,
    config: &ResolverConfig,
) -> Vec<SignalReason> {
    let mut reasons = Vec::new();

    if matches!(ind.rsi, Some(rsi) if rsi <= config.rsi_oversold) {
        reasons.push(SignalReason::RsiOversold);
    }

    if let (Some(short), Some(mid), Some(long)) = (ind.ma_short(), ind.ma_mid(), ind.ma_long()) {
        if short > mid && mid > long && price > long {
            reasons.push(SignalReason::MaAlignedUp);
        } else if short > mid && price > short {
            reasons.push(SignalReason::ShortMaAboveMid);
        }
    }

    if let Some(bands) = ind.bollinger.filter(|b| !b.is_degenerate()) {
        if price < bands.lower * config.lower_band_factor {
            reasons.push(SignalReason::NearLowerBand);
        }
    }

    if matches!(ind.macd, Some(macd) if macd.line > macd.signal) {
        reasons.push(SignalReason::MacdBullish);
    }

    if matches!(ind.stochastic, Some(s) if s.k <= config.stoch_oversold && s.k > s.d) {
        reasons.push(SignalReason::StochasticOversoldReversal);
    }

    if let Some(atr) = ind.atr {
        if price > prev_close + atr && config.volume_confirms(current_volume, ind.vma) {
            reasons.push(SignalReason::AtrBreakoutUp);
        }
    }

    if config.adx_rules {
        if let Some(adx) = ind.adx {
            if adx.adx > config.adx_threshold && adx.plus_di > adx.minus_di {
                reasons.push(SignalReason::AdxUptrend);
            }
        }
    }

    reasons
}

fn sell_reasons(
    price: f64,
    prev_close: f64,
    current_volume: Option<f64>,
    ind: &IndicatorSet,
    config: &ResolverConfig,
) -> Vec<SignalReason> {
    let mut reasons = Vec::new();

    if matches!(ind.rsi, Some(rsi) if rsi >= config.rsi_overbought) {
        reasons.push(SignalReason::RsiOverbought);
    }

    if let (Some(short), Some(mid), Some(long)) = (ind.ma_short(), ind.ma_mid(), ind.ma_long()) {
        if short < mid && mid < long && price < long {
            reasons.push(SignalReason::MaAlignedDown);
        } else if short < mid && price < short {
            reasons.push(SignalReason::ShortMaBelowMid);
        }
    }

    if let Some(bands) = ind.bollinger.filter(|b| !b.is_degenerate()) {
        if price > bands.upper * config.upper_band_factor {
            reasons.push(SignalReason::NearUpperBand);
        }
    }

    if matches!(ind.macd, Some(macd) if macd.line < macd.signal) {
        reasons.push(SignalReason::MacdBearish);
    }

    if matches!(ind.stochastic, Some(s) if s.k >= config.stoch_overbought && s.k < s.d) {
        reasons.push(SignalReason::StochasticOverboughtReversal);
    }

    if let Some(atr) = ind.atr {
        if price < prev_close - atr && config.volume_confirms(current_volume, ind.vma) {
            reasons.push(SignalReason::AtrBreakoutDown);
        }
    }

    if config.adx_rules {
        if let Some(adx) = ind.adx {
            if adx.adx > config.adx_threshold && adx.minus_di > adx.plus_di {
                reasons.push(SignalReason::AdxDowntrend);
            }
        }
    }

    reasons
}

fn decide_opinion(
    buy: &[SignalReason],
    sell: &[SignalReason],
    rsi: Option<f64>,
    config: &ResolverConfig,
) -> Opinion {
    match (buy.is_empty(), sell.is_empty()) {
        (true, true) => Opinion::Hold,
        (false, true) => Opinion::Buy,
        (true, false) => Opinion::Sell,
        (false, false) => {
            if buy.contains(&SignalReason::AtrBreakoutUp) {
                Opinion::StrongBuyMixed
            } else if sell.contains(&SignalReason::AtrBreakoutDown) {
                Opinion::StrongSellMixed
            } else if buy.len() > sell.len() && matches!(rsi, Some(r) if r <= config.lean_buy_rsi) {
                Opinion::BuyLeanMixed
            } else if sell.len() > buy.len() && matches!(rsi, Some(r) if r >= config.lean_sell_rsi)
            {
                Opinion::SellLeanMixed
            } else {
                Opinion::ConflictingMixed
            }
        }
    }
}
