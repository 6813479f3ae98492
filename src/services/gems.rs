//! Gem discovery: high-scoring symbols trading well below their 52-week
//! high at a reasonable valuation.

use serde::{Deserialize, Serialize};

use super::scan::sort_by_score;
use crate::types::{RecommendationBucket, SymbolAnalysis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemCriteria {
    pub min_score: f64,
    /// Percent below the 52-week high required.
    pub min_high_gap_pct: f64,
    pub max_pe: f64,
    pub max_ps: f64,
    pub min_market_cap: f64,
    pub limit: usize,
    pub buckets: Vec<RecommendationBucket>,
}

impl Default for GemCriteria {
    fn default() -> Self {
        Self {
            min_score: 6.5,
            min_high_gap_pct: 10.0,
            max_pe: 35.0,
            max_ps: 7.0,
            min_market_cap: 5e9,
            limit: 20,
            buckets: vec![RecommendationBucket::StrongBuy, RecommendationBucket::Watch],
        }
    }
}

impl GemCriteria {
    /// Every valuation figure must be known and within limits. A missing
    /// figure fails its check.
    fn valuation_ok(&self, analysis: &SymbolAnalysis) -> bool {
        let Some(f) = analysis.fundamentals else {
            return false;
        };
        f.trailing_pe.is_some_and(|pe| pe > 0.0 && pe <= self.max_pe)
            && f.price_to_sales.is_some_and(|ps| ps <= self.max_ps)
            && f.market_cap.is_some_and(|cap| cap >= self.min_market_cap)
    }

    pub fn matches(&self, analysis: &SymbolAnalysis) -> bool {
        self.buckets.contains(&analysis.score.bucket)
            && analysis.score.score >= self.min_score
            && analysis
                .prices
                .high_gap_pct
                .is_some_and(|gap| gap >= self.min_high_gap_pct)
            && self.valuation_ok(analysis)
    }
}

/// Rank the analyses meeting `criteria`, best score first.
pub fn find_gems<'a>(
    analyses: impl IntoIterator<Item = &'a SymbolAnalysis>,
    criteria: &GemCriteria,
) -> Vec<SymbolAnalysis> {
    let mut gems: Vec<SymbolAnalysis> = analyses
        .into_iter()
        .filter(|a| criteria.matches(a))
        .cloned()
        .collect();
    sort_by_score(&mut gems);
    gems.truncate(criteria.limit);
    gems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::analysis;
    use crate::types::{Fundamentals, Opinion};

    #[test]
    fn test_default_criteria() {
        let criteria = GemCriteria::default();
        assert_eq!(criteria.min_score, 6.5);
        assert_eq!(criteria.limit, 20);
        assert_eq!(criteria.buckets.len(), 2);
    }

    #[test]
    fn test_filters_bucket_score_and_gap() {
        let mut near_high = analysis("NEAR", 9.0, RecommendationBucket::StrongBuy, Opinion::Buy);
        near_high.prices.high_gap_pct = Some(4.0);
        let analyses = vec![
            analysis("GEM", 7.0, RecommendationBucket::Watch, Opinion::Hold),
            analysis("LOW", 6.0, RecommendationBucket::Watch, Opinion::Hold),
            analysis("CAUT", 7.0, RecommendationBucket::Caution, Opinion::Hold),
            near_high,
        ];
        let gems = find_gems(&analyses, &GemCriteria::default());
        assert_eq!(gems.len(), 1);
        assert_eq!(gems[0].ticker, "GEM");
    }

    #[test]
    fn test_valuation_limits() {
        let mut expensive = analysis("RICH", 8.0, RecommendationBucket::StrongBuy, Opinion::Buy);
        expensive.fundamentals = Some(Fundamentals {
            trailing_pe: Some(80.0),
            price_to_sales: Some(3.0),
            market_cap: Some(1e11),
        });
        let mut small = analysis("TINY", 8.0, RecommendationBucket::StrongBuy, Opinion::Buy);
        small.fundamentals = Some(Fundamentals {
            trailing_pe: Some(12.0),
            price_to_sales: None,
            market_cap: Some(1e8),
        });
        let mut fair = analysis("FAIR", 8.0, RecommendationBucket::StrongBuy, Opinion::Buy);
        fair.fundamentals = Some(Fundamentals {
            trailing_pe: Some(18.0),
            price_to_sales: Some(4.0),
            market_cap: Some(2e10),
        });

        let analyses = vec![expensive, small, fair];
        let tickers: Vec<_> = find_gems(&analyses, &GemCriteria::default())
            .into_iter()
            .map(|a| a.ticker)
            .collect();
        assert_eq!(tickers, vec!["FAIR"]);
    }

    #[test]
    fn test_missing_fundamentals_fail_valuation() {
        let mut none = analysis("NOFUND", 9.0, RecommendationBucket::StrongBuy, Opinion::Buy);
        none.fundamentals = None;

        let mut no_pe = analysis("NOPE", 9.0, RecommendationBucket::StrongBuy, Opinion::Buy);
        no_pe.fundamentals = Some(Fundamentals {
            trailing_pe: None,
            price_to_sales: Some(2.0),
            market_cap: Some(5e10),
        });

        let mut no_cap = analysis("NOCAP", 9.0, RecommendationBucket::StrongBuy, Opinion::Buy);
        no_cap.fundamentals = Some(Fundamentals {
            trailing_pe: Some(15.0),
            price_to_sales: Some(2.0),
            market_cap: None,
        });

        let complete = analysis("FULL", 8.0, RecommendationBucket::StrongBuy, Opinion::Buy);

        let analyses = vec![none, no_pe, no_cap, complete];
        let tickers: Vec<_> = find_gems(&analyses, &GemCriteria::default())
            .into_iter()
            .map(|a| a.ticker)
            .collect();
        assert_eq!(tickers, vec!["FULL"]);
    }

    #[test]
    fn test_limit_truncates_ranked_list() {
        let analyses: Vec<_> = (0..5)
            .map(|i| {
                analysis(
                    &format!("S{}", i),
                    7.0 + i as f64 * 0.1,
                    RecommendationBucket::Watch,
                    Opinion::Hold,
                )
            })
            .collect();
        let criteria = GemCriteria {
            limit: 2,
            ..Default::default()
        };
        let tickers: Vec<_> = find_gems(&analyses, &criteria)
            .into_iter()
            .map(|a| a.ticker)
            .collect();
        assert_eq!(tickers, vec!["S4", "S3"]);
    }
}
