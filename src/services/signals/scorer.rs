//! Composite ranking score.
//!
//! Independent of the trade opinion: accumulates weighted points from the
//! score features, clamps at zero and maps the total onto a bucket.

use serde::{Deserialize, Serialize};

use crate::types::{
    BandPosition, BucketThresholds, CloseStreak, ScoreFactor, ScoreFeatures, ScoreResult,
    ScoreRule, SectorProfile, TrendState,
};

/// Scoring knobs that are not sector specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub thresholds: BucketThresholds,
    /// Combined call+put volume needed before the put/call skew counts.
    pub min_option_volume: f64,
    /// Volume needed at the most active strike before its proximity counts.
    pub min_strike_volume: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            thresholds: BucketThresholds::default(),
            min_option_volume: 1_000.0,
            min_strike_volume: 500.0,
        }
    }
}

struct Tally {
    total: f64,
    factors: Vec<ScoreFactor>,
}

impl Tally {
    fn add(&mut self, rule: ScoreRule, points: f64) {
        self.total += points;
        self.factors.push(ScoreFactor { rule, points });
    }
}

/// Score one symbol's features under its sector profile.
pub fn score(features: &ScoreFeatures, sector: &str, policy: &ScoringPolicy) -> ScoreResult {
    let profile = SectorProfile::for_sector(sector);
    let mut tally = Tally {
        total: 0.0,
        factors: Vec::new(),
    };

    score_trend(features, &mut tally);
    score_long_trend(features, &mut tally);
    score_rsi(features, &profile, &mut tally);
    score_disparity(features, &profile, &mut tally);
    score_bollinger(features, &mut tally);
    score_gap(features, &mut tally);
    score_macd(features, &mut tally);
    score_volume(features, &profile, &mut tally);
    score_stochastic(features, &mut tally);
    score_range(features, &profile, &mut tally);
    score_turnover(features, &mut tally);
    score_options(features, policy, &mut tally);
    score_streak(features, &mut tally);

    let total = tally.total.max(0.0);
    ScoreResult {
        score: total,
        bucket: policy.thresholds.bucket(total),
        factors: tally.factors,
    }
}

fn score_trend(f: &ScoreFeatures, tally: &mut Tally) {
    let (Some(short), Some(mid)) = (f.ma_short_live, f.ma_mid_live) else {
        return;
    };

    if short > mid {
        tally.add(ScoreRule::ShortTrend, 1.5);
        if f.trend == Some(TrendState::GoldenCross) {
            tally.add(ScoreRule::GoldenCross, 1.5);
        } else if f.sustained_days >= 5 {
            tally.add(ScoreRule::SustainedTrend, 0.5);
        } else if f.sustained_days >= 3 {
            tally.add(ScoreRule::SustainedTrend, 0.3);
        }
    } else if short < mid
        && matches!((f.prev_ma_short, f.prev_ma_mid), (Some(ps), Some(pm)) if ps >= pm)
    {
        tally.add(ScoreRule::DeadCross, -1.5);
    }
}

fn score_long_trend(f: &ScoreFeatures, tally: &mut Tally) {
    if let (Some(ma_60), Some(ma_120)) = (f.ma_60, f.ma_120) {
        tally.add(ScoreRule::LongTrend, if ma_60 > ma_120 { 1.0 } else { -0.5 });
    }

    let Some(price) = f.current_price else {
        return;
    };
    if matches!(f.ma_120, Some(ma) if price > ma) {
        tally.add(ScoreRule::AboveLongMa, 0.7);
    } else if matches!(f.ma_60, Some(ma) if price > ma) {
        tally.add(ScoreRule::AboveLongMa, 0.5);
    }
}

fn score_rsi(f: &ScoreFeatures, profile: &SectorProfile, tally: &mut Tally) {
    let Some(rsi) = f.rsi else {
        return;
    };
    let (low, high) = profile.rsi_range;
    let points = if rsi < 30.0 {
        1.0
    } else if rsi < low {
        0.7
    } else if rsi < high {
        1.2
    } else {
        -1.0
    };
    tally.add(ScoreRule::Rsi, points);
}

fn score_disparity(f: &ScoreFeatures, profile: &SectorProfile, tally: &mut Tally) {
    let Some(disparity) = f.disparity_20 else {
        return;
    };
    let (low, high) = profile.disparity_range;
    if (low..=high).contains(&disparity) {
        tally.add(ScoreRule::Disparity, 0.5);
    } else if disparity > high + 2.0 {
        tally.add(ScoreRule::Disparity, -0.7);
    } else if disparity < low - 2.0 {
        tally.add(ScoreRule::Disparity, 0.3);
    }
}

fn score_bollinger(f: &ScoreFeatures, tally: &mut Tally) {
    match f.band_position {
        Some(BandPosition::AboveUpper) => tally.add(ScoreRule::BollingerPosition, 0.5),
        Some(BandPosition::UpperHalf) => tally.add(ScoreRule::BollingerPosition, 0.7),
        Some(BandPosition::BelowLower) => tally.add(ScoreRule::BollingerPosition, 0.4),
        Some(BandPosition::LowerHalf) | None => {}
    }
}

fn score_gap(f: &ScoreFeatures, tally: &mut Tally) {
    let Some(gap) = f.gap_up_pct else {
        return;
    };
    if gap >= 2.0 {
        tally.add(ScoreRule::Gap, -0.5);
    } else if gap >= 0.5 {
        tally.add(ScoreRule::Gap, 0.3);
    } else if gap < -0.5 {
        tally.add(ScoreRule::Gap, -1.0);
    }
}

fn score_macd(f: &ScoreFeatures, tally: &mut Tally) {
    let (Some(line), Some(signal)) = (f.macd_line, f.macd_signal) else {
        return;
    };
    if line > signal {
        // Below the zero line the cross is still fresh.
        tally.add(ScoreRule::Macd, if line > 0.0 { 0.8 } else { 1.2 });
    } else {
        // Bearish below the zero line is penalised twice: -1.3 in total,
        // against -0.8 above it.
        tally.add(ScoreRule::Macd, -0.8);
        if line < 0.0 {
            tally.add(ScoreRule::Macd, -0.5);
        }
    }
}

fn score_volume(f: &ScoreFeatures, profile: &SectorProfile, tally: &mut Tally) {
    let Some(ratio) = f.volume_ratio else {
        return;
    };
    if ratio >= 3.0 {
        tally.add(ScoreRule::VolumeRatio, 1.5);
    } else if ratio >= 2.0 {
        tally.add(ScoreRule::VolumeRatio, 1.2);
    } else if ratio >= profile.volume_rate_min {
        tally.add(ScoreRule::VolumeRatio, 1.0);
    } else if ratio < 0.5 {
        tally.add(ScoreRule::VolumeRatio, -1.0);
    }
}

fn score_stochastic(f: &ScoreFeatures, tally: &mut Tally) {
    let (Some(k), Some(d)) = (f.stoch_k, f.stoch_d) else {
        return;
    };
    if k < 20.0 && k > d {
        tally.add(ScoreRule::Stochastic, 1.0);
    } else if (20.0..=80.0).contains(&k) {
        tally.add(ScoreRule::Stochastic, if k > d { 0.5 } else { 0.2 });
    } else if k > 80.0 && k < d {
        tally.add(ScoreRule::Stochastic, -0.5);
    }
}

fn score_range(f: &ScoreFeatures, profile: &SectorProfile, tally: &mut Tally) {
    if matches!(f.high_low_ratio, Some(ratio) if ratio < profile.high_low_max) {
        tally.add(ScoreRule::HighLowRange, 0.3);
    }

    match f.high_gap_pct {
        Some(gap) if gap <= 1.0 => tally.add(ScoreRule::HighProximity, 0.7),
        Some(gap) if gap <= 5.0 => tally.add(ScoreRule::HighProximity, 0.3),
        _ => {}
    }
}

fn score_turnover(f: &ScoreFeatures, tally: &mut Tally) {
    let Some(turnover) = f.turnover_million else {
        return;
    };
    if turnover >= 50.0 {
        tally.add(ScoreRule::Turnover, 0.8);
    } else if turnover >= 10.0 {
        tally.add(ScoreRule::Turnover, 0.4);
    } else if turnover < 1.0 {
        tally.add(ScoreRule::Turnover, -2.0);
    }
}

fn score_options(f: &ScoreFeatures, policy: &ScoringPolicy, tally: &mut Tally) {
    let Some(options) = &f.options else {
        return;
    };

    let total = options.total_call_volume + options.total_put_volume;
    if total > policy.min_option_volume {
        let puts = if options.total_put_volume > 0.0 {
            options.total_put_volume
        } else {
            0.1
        };
        let ratio = options.total_call_volume / puts;
        if ratio > 2.0 {
            tally.add(ScoreRule::OptionsSkew, 1.5);
        } else if ratio > 1.2 {
            tally.add(ScoreRule::OptionsSkew, 0.8);
        } else if ratio < 0.5 {
            tally.add(ScoreRule::OptionsSkew, -0.8);
        }
    }

    let Some(price) = f.current_price.filter(|p| *p > 0.0) else {
        return;
    };

    if let (Some(strike), Some(volume)) = (options.max_call_strike, options.max_call_volume) {
        if volume > policy.min_strike_volume && strike > price {
            let proximity = (strike - price) / price * 100.0;
            if proximity <= 2.0 {
                tally.add(ScoreRule::CallStrike, 1.5);
            } else if proximity <= 5.0 {
                tally.add(ScoreRule::CallStrike, 0.8);
            }
        }
    }

    if let (Some(strike), Some(volume)) = (options.max_put_strike, options.max_put_volume) {
        if volume > policy.min_strike_volume && strike < price {
            let proximity = (price - strike) / price * 100.0;
            if proximity <= 2.0 {
                tally.add(ScoreRule::PutStrike, 0.7);
            } else if proximity <= 5.0 {
                tally.add(ScoreRule::PutStrike, 0.3);
            }
        }
    }
}

fn score_streak(f: &ScoreFeatures, tally: &mut Tally) {
    match f.close_streak {
        Some(CloseStreak::ThreeUp) => tally.add(ScoreRule::ConsecutiveCloses, 1.0),
        Some(CloseStreak::ThreeDown) => {
            tally.add(ScoreRule::ConsecutiveCloses, 1.5);
            if matches!(f.rsi, Some(rsi) if rsi <= 30.0) {
                tally.add(ScoreRule::ConsecutiveCloses, 1.0);
            }
        }
        _ => {}
    }
}
