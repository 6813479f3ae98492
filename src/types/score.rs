use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sector-specific thresholds that parameterize several scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorProfile {
    /// RSI band considered healthy momentum (low, high).
    pub rsi_range: (f64, f64),
    /// Volume ratio (today vs 5-day average) treated as a real pickup.
    pub volume_rate_min: f64,
    /// Close-to-MA20 disparity band in percent (low, high).
    pub disparity_range: (f64, f64),
    /// Upper bound on the 52-week high/low ratio still rewarded.
    pub high_low_max: f64,
}

impl Default for SectorProfile {
    fn default() -> Self {
        Self {
            rsi_range: (40.0, 70.0),
            volume_rate_min: 1.1,
            disparity_range: (96.0, 104.0),
            high_low_max: 4.0,
        }
    }
}

/// Sector name used when the provider cannot classify a symbol.
pub const DEFAULT_SECTOR: &str = "Default";

const SECTOR_PROFILES: &[(&str, SectorProfile)] = &[
    (
        "Technology",
        SectorProfile {
            rsi_range: (35.0, 75.0),
            volume_rate_min: 1.0,
            disparity_range: (95.0, 105.0),
            high_low_max: 6.0,
        },
    ),
    (
        "Healthcare",
        SectorProfile {
            rsi_range: (40.0, 68.0),
            volume_rate_min: 1.2,
            disparity_range: (97.0, 103.0),
            high_low_max: 3.0,
        },
    ),
    (
        "Financial Services",
        SectorProfile {
            rsi_range: (38.0, 72.0),
            volume_rate_min: 1.0,
            disparity_range: (95.0, 106.0),
            high_low_max: 5.0,
        },
    ),
    (
        "Communication Services",
        SectorProfile {
            rsi_range: (38.0, 72.0),
            volume_rate_min: 1.1,
            disparity_range: (95.0, 106.0),
            high_low_max: 5.0,
        },
    ),
    (
        "Industrials",
        SectorProfile {
            rsi_range: (40.0, 70.0),
            volume_rate_min: 1.0,
            disparity_range: (96.0, 104.0),
            high_low_max: 4.0,
        },
    ),
    (
        "Consumer Cyclical",
        SectorProfile {
            rsi_range: (37.0, 73.0),
            volume_rate_min: 1.1,
            disparity_range: (95.0, 106.0),
            high_low_max: 6.0,
        },
    ),
    (
        "Energy",
        SectorProfile {
            rsi_range: (38.0, 72.0),
            volume_rate_min: 0.9,
            disparity_range: (94.0, 107.0),
            high_low_max: 4.5,
        },
    ),
];

impl SectorProfile {
    /// Look up the profile for a sector, falling back to the default profile.
    pub fn for_sector(sector: &str) -> Self {
        SECTOR_PROFILES
            .iter()
            .find(|(name, _)| *name == sector)
            .map(|(_, profile)| *profile)
            .unwrap_or_default()
    }
}

/// Coarse ranking label derived from the composite score.
///
/// Variants are declared from worst to best so `Ord` follows quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationBucket {
    Avoid,
    Caution,
    Watch,
    StrongBuy,
}

impl RecommendationBucket {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "avoid" => Some(Self::Avoid),
            "caution" => Some(Self::Caution),
            "watch" => Some(Self::Watch),
            "strong_buy" => Some(Self::StrongBuy),
            _ => None,
        }
    }
}

/// Minimum scores for each bucket above `Avoid`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketThresholds {
    pub strong_buy: f64,
    pub watch: f64,
    pub caution: f64,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 8.0,
            watch: 6.0,
            caution: 4.0,
        }
    }
}

impl BucketThresholds {
    /// Map a score to its bucket. Monotonic as long as the thresholds are
    /// ordered `caution <= watch <= strong_buy`.
    pub fn bucket(&self, score: f64) -> RecommendationBucket {
        if score >= self.strong_buy {
            RecommendationBucket::StrongBuy
        } else if score >= self.watch {
            RecommendationBucket::Watch
        } else if score >= self.caution {
            RecommendationBucket::Caution
        } else {
            RecommendationBucket::Avoid
        }
    }

    /// Thresholds must be finite, non-negative and ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [self.caution, self.watch, self.strong_buy];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::InvalidParam(
                "bucket thresholds must be finite and non-negative".to_string(),
            ));
        }
        if !(self.caution <= self.watch && self.watch <= self.strong_buy) {
            return Err(ConfigError::InvalidParam(
                "bucket thresholds must satisfy caution <= watch <= strong_buy".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scoring rule that contributed points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRule {
    ShortTrend,
    GoldenCross,
    SustainedTrend,
    DeadCross,
    LongTrend,
    AboveLongMa,
    Rsi,
    Disparity,
    BollingerPosition,
    Gap,
    Macd,
    VolumeRatio,
    Stochastic,
    HighLowRange,
    HighProximity,
    Turnover,
    OptionsSkew,
    CallStrike,
    PutStrike,
    ConsecutiveCloses,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub rule: ScoreRule,
    pub points: f64,
}

/// Composite ranking score, independent of the trade opinion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Accumulated points, never negative.
    pub score: f64,
    pub bucket: RecommendationBucket,
    /// Every rule that moved the score, in evaluation order.
    pub factors: Vec<ScoreFactor>,
}
