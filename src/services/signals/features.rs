//! Price fields, score features and support/resistance levels.
//!
//! The last bar of a series is the current session; everything before it is
//! completed history. "Live" moving averages include the current close,
//! "previous" ones do not.

use super::indicators::sma::{sma, sma_at};
use crate::types::{
    BandPosition, Bar, CloseStreak, IndicatorSet, OptionsSummary, PriceFields, PriceLevels,
    ScoreFeatures, TrendState,
};

const SHORT_WINDOW: usize = 5;
const MID_WINDOW: usize = 20;
const MEDIUM_WINDOW: usize = 60;
const LONG_WINDOW: usize = 120;
/// Completed bars averaged for the volume ratio.
const VOLUME_LOOKBACK: usize = 5;
const STREAK_DAYS: usize = 3;
const MAX_LEVELS: usize = 3;
/// Span of the 52-week range, in milliseconds.
const YEAR_MS: i64 = 365 * 86_400_000;

fn pct_change(from: f64, to: f64) -> Option<f64> {
    (from != 0.0).then(|| (to - from) / from * 100.0)
}

/// Headline price fields for the current session.
pub fn price_fields(bars: &[Bar]) -> PriceFields {
    let Some(last) = bars.last() else {
        return PriceFields::default();
    };
    let current = last.close;
    let previous_close = bars.len().checked_sub(2).map(|i| bars[i].close);

    let since = last.timestamp.saturating_sub(YEAR_MS);
    let year = &bars[bars.partition_point(|b| b.timestamp < since)..];
    let high_52w = year.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low_52w = year.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    PriceFields {
        current_price: Some(current),
        previous_close,
        change_pct: previous_close.and_then(|prev| pct_change(prev, current)),
        volume: Some(last.volume),
        high_52w: Some(high_52w),
        low_52w: Some(low_52w),
        high_gap_pct: (high_52w > 0.0).then(|| (high_52w - current) / high_52w * 100.0),
        low_gap_pct: (low_52w > 0.0).then(|| (current - low_52w) / low_52w * 100.0),
    }
}

/// Consecutive prior sessions over which the short/mid MA relationship had
/// the same direction as the live one.
fn sustained_days(completed: &[f64], live_short: f64, live_mid: f64) -> u32 {
    let rising = live_short > live_mid;
    let falling = live_short < live_mid;
    let mut days = 0;

    for offset in 1..completed.len() {
        let end = completed.len() - offset;
        let (Some(short), Some(mid)) = (
            sma_at(completed, SHORT_WINDOW, end),
            sma_at(completed, MID_WINDOW, end),
        ) else {
            break;
        };
        if (rising && short > mid) || (falling && short < mid) {
            days += 1;
        } else {
            break;
        }
    }

    days
}

fn trend_state(
    live_short: f64,
    live_mid: f64,
    prev_short: Option<f64>,
    prev_mid: Option<f64>,
    sustained: u32,
) -> TrendState {
    let crossed_up = matches!((prev_short, prev_mid), (Some(s), Some(m)) if s <= m);
    let crossed_down = matches!((prev_short, prev_mid), (Some(s), Some(m)) if s >= m);

    if live_short > live_mid && crossed_up {
        TrendState::GoldenCross
    } else if live_short < live_mid && crossed_down {
        TrendState::DeadCross
    } else if live_short > live_mid {
        TrendState::Up(sustained)
    } else if live_short < live_mid {
        TrendState::Down(sustained)
    } else {
        TrendState::Neutral
    }
}

fn band_position(price: f64, indicators: &IndicatorSet) -> Option<BandPosition> {
    let bands = indicators.bollinger?;
    Some(if price > bands.upper {
        BandPosition::AboveUpper
    } else if price > bands.middle {
        BandPosition::UpperHalf
    } else if price < bands.lower {
        BandPosition::BelowLower
    } else {
        BandPosition::LowerHalf
    })
}

fn close_streak(closes: &[f64]) -> CloseStreak {
    if closes.len() < STREAK_DAYS + 1 {
        return CloseStreak::Insufficient;
    }
    let recent = &closes[closes.len() - STREAK_DAYS - 1..];
    let changes: Vec<f64> = recent.windows(2).map(|w| w[1] - w[0]).collect();

    if changes.iter().all(|&c| c > 0.0) {
        CloseStreak::ThreeUp
    } else if changes.iter().all(|&c| c < 0.0) {
        CloseStreak::ThreeDown
    } else {
        CloseStreak::Mixed
    }
}

/// Today's volume relative to the mean of the preceding sessions.
fn volume_ratio(bars: &[Bar]) -> Option<f64> {
    let (today, completed) = bars.split_last()?;
    let start = completed.len().saturating_sub(VOLUME_LOOKBACK);
    let window = &completed[start..];
    if window.is_empty() {
        return None;
    }
    let average = window.iter().map(|b| b.volume).sum::<f64>() / window.len() as f64;
    (average > 0.0).then(|| today.volume / average)
}

/// Gather every input of the composite scorer.
pub fn extract_features(
    bars: &[Bar],
    indicators: &IndicatorSet,
    prices: &PriceFields,
    options: Option<&OptionsSummary>,
) -> ScoreFeatures {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let completed = closes.split_last().map(|(_, rest)| rest).unwrap_or(&[]);
    let current = prices.current_price;

    let ma_short_live = sma(&closes, SHORT_WINDOW);
    let ma_mid_live = sma(&closes, MID_WINDOW);
    let prev_ma_short = sma(completed, SHORT_WINDOW);
    let prev_ma_mid = sma(completed, MID_WINDOW);

    let (trend, sustained) = match (ma_short_live, ma_mid_live) {
        (Some(short), Some(mid)) => {
            let days = sustained_days(completed, short, mid);
            (
                Some(trend_state(short, mid, prev_ma_short, prev_ma_mid, days)),
                days,
            )
        }
        _ => (None, 0),
    };

    let last_completed = completed.last().copied();
    let disparity_20 = match (last_completed, prev_ma_mid) {
        (Some(close), Some(ma)) if ma != 0.0 => Some(close / ma * 100.0),
        _ => None,
    };

    let gap_up_pct = match (bars.last(), last_completed) {
        (Some(today), Some(yesterday)) => pct_change(yesterday, today.open),
        _ => None,
    };

    let high_low_ratio = match (prices.high_52w, prices.low_52w) {
        (Some(high), Some(low)) if low > 0.0 => Some(high / low),
        _ => None,
    };

    ScoreFeatures {
        current_price: current,
        ma_short_live,
        ma_mid_live,
        prev_ma_short,
        prev_ma_mid,
        ma_60: sma(completed, MEDIUM_WINDOW),
        ma_120: sma(completed, LONG_WINDOW),
        trend,
        sustained_days: sustained,
        rsi: indicators.rsi,
        disparity_20,
        band_position: current.and_then(|price| band_position(price, indicators)),
        gap_up_pct,
        macd_line: indicators.macd.map(|m| m.line),
        macd_signal: indicators.macd.map(|m| m.signal),
        volume_ratio: volume_ratio(bars),
        turnover_million: match (prices.volume, current) {
            (Some(volume), Some(price)) => Some(volume * price / 1_000_000.0),
            _ => None,
        },
        stoch_k: indicators.stochastic.map(|s| s.k),
        stoch_d: indicators.stochastic.map(|s| s.d),
        high_low_ratio,
        high_gap_pct: prices.high_gap_pct,
        close_streak: Some(close_streak(&closes)),
        options: options.cloned(),
    }
}

/// Support and resistance candidates around the current price.
pub fn price_levels(
    features: &ScoreFeatures,
    indicators: &IndicatorSet,
    prices: &PriceFields,
) -> PriceLevels {
    let mut supports: Vec<f64> = [features.prev_ma_mid, features.ma_60, features.ma_120]
        .into_iter()
        .flatten()
        .collect();
    supports.sort_by(|a, b| b.total_cmp(a));
    supports.truncate(MAX_LEVELS);

    let mut resistances: Vec<f64> = match prices.current_price {
        Some(price) => [
            indicators.bollinger.map(|b| b.upper),
            features.prev_ma_short,
            features.prev_ma_mid,
            features.ma_60,
            features.ma_120,
            prices.high_52w,
        ]
        .into_iter()
        .flatten()
        .filter(|&level| level > price)
        .collect(),
        None => Vec::new(),
    };
    resistances.sort_by(|a, b| a.total_cmp(b));
    resistances.truncate(MAX_LEVELS);

    PriceLevels {
        supports,
        resistances,
    }
}
