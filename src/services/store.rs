//! Tracked analyses, keyed by upper-case ticker.

use dashmap::DashMap;

use crate::types::SymbolAnalysis;

/// Shared store of the latest analysis per ticker.
///
/// Records are replaced wholesale on refresh; nothing is merged.
#[derive(Default)]
pub struct AnalysisStore {
    analyses: DashMap<String, SymbolAnalysis>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(ticker: &str) -> String {
        ticker.trim().to_uppercase()
    }

    /// Insert or replace the record for its ticker. Returns the previous one.
    pub fn upsert(&self, analysis: SymbolAnalysis) -> Option<SymbolAnalysis> {
        self.analyses.insert(Self::key(&analysis.ticker), analysis)
    }

    pub fn remove(&self, ticker: &str) -> Option<SymbolAnalysis> {
        self.analyses.remove(&Self::key(ticker)).map(|(_, analysis)| analysis)
    }

    pub fn get(&self, ticker: &str) -> Option<SymbolAnalysis> {
        self.analyses.get(&Self::key(ticker)).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.analyses.contains_key(&Self::key(ticker))
    }

    /// All records, sorted by ticker.
    pub fn get_all(&self) -> Vec<SymbolAnalysis> {
        let mut all: Vec<SymbolAnalysis> = self.analyses.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        all
    }

    /// Tracked tickers, sorted.
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.analyses.iter().map(|e| e.key().clone()).collect();
        tickers.sort();
        tickers
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::analysis;
    use crate::types::{Opinion, RecommendationBucket};

    #[test]
    fn test_upsert_replaces_wholesale() {
        let store = AnalysisStore::new();
        assert!(store
            .upsert(analysis("AAPL", 5.0, RecommendationBucket::Caution, Opinion::Hold))
            .is_none());

        let previous = store
            .upsert(analysis("aapl", 9.0, RecommendationBucket::StrongBuy, Opinion::Buy))
            .unwrap();
        assert_eq!(previous.score.score, 5.0);

        let current = store.get("AAPL").unwrap();
        assert_eq!(current.score.score, 9.0);
        assert_eq!(current.signal.opinion, Opinion::Buy);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_all_sorted_by_ticker() {
        let store = AnalysisStore::new();
        for ticker in ["MSFT", "AAPL", "NVDA"] {
            store.upsert(analysis(ticker, 1.0, RecommendationBucket::Avoid, Opinion::Hold));
        }
        let tickers: Vec<_> = store.get_all().into_iter().map(|a| a.ticker).collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT", "NVDA"]);
        assert_eq!(store.tickers(), vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn test_remove() {
        let store = AnalysisStore::new();
        store.upsert(analysis("TSLA", 1.0, RecommendationBucket::Avoid, Opinion::Sell));
        assert!(store.contains("tsla"));
        assert!(store.remove("tsla").is_some());
        assert!(store.remove("TSLA").is_none());
        assert!(store.is_empty());
    }
}
