use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rule that fired while resolving a trade opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalReason {
    #[serde(rename = "RSI oversold")]
    RsiOversold,
    #[serde(rename = "moving averages fully aligned upward")]
    MaAlignedUp,
    #[serde(rename = "short MA above mid MA, price trending up")]
    ShortMaAboveMid,
    #[serde(rename = "near lower Bollinger band")]
    NearLowerBand,
    #[serde(rename = "MACD bullish crossover")]
    MacdBullish,
    #[serde(rename = "stochastic oversold reversal")]
    StochasticOversoldReversal,
    #[serde(rename = "ATR breakout upward")]
    AtrBreakoutUp,
    #[serde(rename = "strong uptrend (ADX)")]
    AdxUptrend,
    #[serde(rename = "RSI overbought")]
    RsiOverbought,
    #[serde(rename = "moving averages fully aligned downward")]
    MaAlignedDown,
    #[serde(rename = "short MA below mid MA, price trending down")]
    ShortMaBelowMid,
    #[serde(rename = "near upper Bollinger band")]
    NearUpperBand,
    #[serde(rename = "MACD bearish crossover")]
    MacdBearish,
    #[serde(rename = "stochastic overbought reversal")]
    StochasticOverboughtReversal,
    #[serde(rename = "ATR breakout downward")]
    AtrBreakoutDown,
    #[serde(rename = "strong downtrend (ADX)")]
    AdxDowntrend,
}

impl SignalReason {
    /// Human-readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RsiOversold => "RSI oversold",
            Self::MaAlignedUp => "moving averages fully aligned upward",
            Self::ShortMaAboveMid => "short MA above mid MA, price trending up",
            Self::NearLowerBand => "near lower Bollinger band",
            Self::MacdBullish => "MACD bullish crossover",
            Self::StochasticOversoldReversal => "stochastic oversold reversal",
            Self::AtrBreakoutUp => "ATR breakout upward",
            Self::AdxUptrend => "strong uptrend (ADX)",
            Self::RsiOverbought => "RSI overbought",
            Self::MaAlignedDown => "moving averages fully aligned downward",
            Self::ShortMaBelowMid => "short MA below mid MA, price trending down",
            Self::NearUpperBand => "near upper Bollinger band",
            Self::MacdBearish => "MACD bearish crossover",
            Self::StochasticOverboughtReversal => "stochastic overbought reversal",
            Self::AtrBreakoutDown => "ATR breakout downward",
            Self::AdxDowntrend => "strong downtrend (ADX)",
        }
    }
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final categorical trade opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opinion {
    Hold,
    Buy,
    Sell,
    StrongBuyMixed,
    StrongSellMixed,
    BuyLeanMixed,
    SellLeanMixed,
    ConflictingMixed,
    InsufficientData,
}

impl Opinion {
    /// Parse from the snake_case wire form.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hold" => Some(Self::Hold),
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            "strong_buy_mixed" => Some(Self::StrongBuyMixed),
            "strong_sell_mixed" => Some(Self::StrongSellMixed),
            "buy_lean_mixed" => Some(Self::BuyLeanMixed),
            "sell_lean_mixed" => Some(Self::SellLeanMixed),
            "conflicting_mixed" => Some(Self::ConflictingMixed),
            "insufficient_data" => Some(Self::InsufficientData),
            _ => None,
        }
    }
}

/// Rule-based opinion derived from one indicator snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResult {
    pub buy_reasons: Vec<SignalReason>,
    pub sell_reasons: Vec<SignalReason>,
    pub buy_target_price: Option<f64>,
    pub sell_target_price: Option<f64>,
    pub opinion: Opinion,
}

impl SignalResult {
    /// Result used when the current price or previous close is unknown.
    pub fn insufficient_data() -> Self {
        Self {
            buy_reasons: Vec::new(),
            sell_reasons: Vec::new(),
            buy_target_price: None,
            sell_target_price: None,
            opinion: Opinion::InsufficientData,
        }
    }
}
