use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One daily OHLCV record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Whether the bar honours `low <= min(open, close) <= max(open, close) <= high`
    /// and has a non-negative volume.
    pub fn is_valid(&self) -> bool {
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        self.low <= body_low && body_high <= self.high && self.volume >= 0.0
    }

    /// Widen `high`/`low` so they contain the open and close. Feeds that
    /// omit or misreport the range produce bars that break the envelope.
    pub fn repaired(self) -> Self {
        Self {
            high: self.high.max(self.open).max(self.close),
            low: self.low.min(self.open).min(self.close),
            ..self
        }
    }

    /// UTC calendar day of the bar.
    pub fn day(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(self.timestamp).map(|dt| dt.date_naive())
    }
}

/// A raw bar tagged with the symbol it belongs to, as delivered by
/// multi-symbol feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolBar {
    pub symbol: String,
    #[serde(flatten)]
    pub bar: Bar,
}

/// Time-ordered bars for one symbol.
///
/// Construction guarantees ascending timestamps with no duplicates. Length is
/// never checked here; each indicator enforces its own minimum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Normalize an arbitrary sequence of bars. When two bars share a
    /// timestamp the one appearing later in the input is kept.
    pub fn new(bars: impl IntoIterator<Item = Bar>) -> Self {
        let mut by_time: BTreeMap<i64, Bar> = BTreeMap::new();
        for bar in bars {
            by_time.insert(bar.timestamp, bar);
        }
        Self {
            bars: by_time.into_values().collect(),
        }
    }

    /// Split a mixed multi-symbol feed into one normalized series per symbol.
    /// Symbols are upper-cased.
    pub fn group_by_symbol(raw: impl IntoIterator<Item = SymbolBar>) -> BTreeMap<String, BarSeries> {
        let mut grouped: BTreeMap<String, Vec<Bar>> = BTreeMap::new();
        for item in raw {
            grouped
                .entry(item.symbol.trim().to_uppercase())
                .or_default()
                .push(item.bar);
        }
        grouped
            .into_iter()
            .map(|(symbol, bars)| (symbol, BarSeries::new(bars)))
            .collect()
    }

    /// Merge a supplementary "latest" bar into the series.
    ///
    /// A bar on the same UTC day as the last bar replaces it; a newer day is
    /// appended; anything older than the last bar is ignored.
    pub fn with_latest(mut self, latest: Bar) -> Self {
        match self.bars.last() {
            None => self.bars.push(latest),
            Some(last) if last.day().is_some() && last.day() == latest.day() => {
                if let Some(slot) = self.bars.last_mut() {
                    *slot = latest;
                }
            }
            Some(last) if latest.timestamp > last.timestamp => self.bars.push(latest),
            Some(_) => {}
        }
        self
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

impl From<Vec<Bar>> for BarSeries {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    fn bar(day: i64, close: f64) -> Bar {
        Bar::new(day * DAY_MS, close, close + 1.0, close - 1.0, close, 1_000.0)
    }

    fn closes(series: &BarSeries) -> Vec<f64> {
        series.bars().iter().map(|b| b.close).collect()
    }

    #[test]
    fn test_series_sorts_ascending() {
        let series = BarSeries::new(vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0)]);
        assert_eq!(closes(&series), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_series_drops_duplicate_timestamps() {
        let series = BarSeries::new(vec![bar(1, 1.0), bar(2, 2.0), bar(2, 2.5)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().close, 2.5);
    }

    #[test]
    fn test_latest_bar_replaces_same_day() {
        let series = BarSeries::new(vec![bar(1, 1.0), bar(2, 2.0)]);
        let intraday = Bar::new(2 * DAY_MS + 3_600_000, 2.0, 3.0, 1.5, 2.8, 500.0);
        let merged = series.with_latest(intraday);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.last().unwrap().close, 2.8);
    }

    #[test]
    fn test_latest_bar_appends_new_day() {
        let series = BarSeries::new(vec![bar(1, 1.0), bar(2, 2.0)]);
        let merged = series.with_latest(bar(3, 3.0));
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.bars()[1].close, 2.0);
    }

    #[test]
    fn test_latest_bar_older_than_series_is_ignored() {
        let series = BarSeries::new(vec![bar(5, 5.0), bar(6, 6.0)]);
        let merged = series.with_latest(bar(2, 2.0));
        assert_eq!(closes(&merged), vec![5.0, 6.0]);
    }

    #[test]
    fn test_group_by_symbol() {
        let raw = vec![
            SymbolBar { symbol: "aapl".into(), bar: bar(2, 2.0) },
            SymbolBar { symbol: "MSFT".into(), bar: bar(1, 10.0) },
            SymbolBar { symbol: "AAPL".into(), bar: bar(1, 1.0) },
        ];
        let grouped = BarSeries::group_by_symbol(raw);
        assert_eq!(grouped.len(), 2);
        assert_eq!(closes(&grouped["AAPL"]), vec![1.0, 2.0]);
        assert_eq!(grouped["MSFT"].len(), 1);
    }

    #[test]
    fn test_bar_validity() {
        assert!(bar(1, 10.0).is_valid());
        let broken = Bar::new(0, 10.0, 9.0, 8.0, 9.5, 100.0);
        assert!(!broken.is_valid());
        let negative_volume = Bar::new(0, 10.0, 11.0, 9.0, 10.5, -1.0);
        assert!(!negative_volume.is_valid());
    }

    #[test]
    fn test_repaired_widens_range() {
        let broken = Bar::new(0, 10.0, 9.0, 9.8, 9.5, 100.0);
        assert!(!broken.is_valid());
        let fixed = broken.repaired();
        assert!(fixed.is_valid());
        assert_eq!(fixed.high, 10.0);
        assert_eq!(fixed.low, 9.5);
        assert_eq!(fixed.close, 9.5);

        let negative_volume = Bar::new(0, 10.0, 11.0, 9.0, 10.5, -1.0).repaired();
        assert!(!negative_volume.is_valid());
    }
}
