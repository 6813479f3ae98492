//! Filtering tracked analyses.

use serde::Deserialize;

use crate::types::{Opinion, RecommendationBucket, SymbolAnalysis};

/// Screening filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanFilter {
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub opinions: Vec<Opinion>,
    pub buckets: Vec<RecommendationBucket>,
    pub sector: Option<String>,
    pub min_volume_ratio: Option<f64>,
}

impl ScanFilter {
    pub fn matches(&self, analysis: &SymbolAnalysis) -> bool {
        let score = analysis.score.score;
        if self.min_score.is_some_and(|min| score < min) {
            return false;
        }
        if self.max_score.is_some_and(|max| score > max) {
            return false;
        }
        if !self.opinions.is_empty() && !self.opinions.contains(&analysis.signal.opinion) {
            return false;
        }
        if !self.buckets.is_empty() && !self.buckets.contains(&analysis.score.bucket) {
            return false;
        }
        if let Some(sector) = &self.sector {
            if !analysis.sector.eq_ignore_ascii_case(sector) {
                return false;
            }
        }
        if let Some(min) = self.min_volume_ratio {
            match analysis.features.volume_ratio {
                Some(ratio) if ratio >= min => {}
                _ => return false,
            }
        }
        true
    }

    /// Matching analyses, best score first.
    pub fn apply<'a>(&self, analyses: impl IntoIterator<Item = &'a SymbolAnalysis>) -> Vec<SymbolAnalysis> {
        let mut matched: Vec<SymbolAnalysis> = analyses
            .into_iter()
            .filter(|a| self.matches(a))
            .cloned()
            .collect();
        sort_by_score(&mut matched);
        matched
    }
}

/// Sort by score descending, ties by ticker.
pub fn sort_by_score(analyses: &mut [SymbolAnalysis]) {
    analyses.sort_by(|a, b| {
        b.score
            .score
            .total_cmp(&a.score.score)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
}
