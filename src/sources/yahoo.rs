//! Yahoo Finance client for daily bars, quotes and symbol context.
//!
//! Uses the unofficial chart, quoteSummary and options endpoints. Responses
//! are cached briefly and concurrent requests for one URL are collapsed, so
//! the sector and fundamentals of a symbol come from a single quoteSummary
//! call. The quote reuses the chart the bars were read from when it is still
//! cached.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::DateTime;
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use super::MarketDataProvider;
use crate::error::ProviderError;
use crate::types::{Bar, Fundamentals, OptionsSummary, Quote, DEFAULT_SECTOR};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const OPTIONS_URL: &str = "https://query2.finance.yahoo.com/v7/finance/options";
const RESPONSE_TTL: Duration = Duration::from_secs(60);
/// Chart lookback used for a quote when no recent chart is cached.
const QUOTE_LOOKBACK_DAYS: u32 = 5;

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooEnvelope<YahooChartResult>,
}

#[derive(Debug, Deserialize)]
struct YahooEnvelope<T> {
    result: Option<Vec<T>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    regular_market_price: Option<f64>,
    regular_market_time: Option<i64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSummaryResponse {
    quote_summary: YahooEnvelope<YahooSummaryResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSummaryResult {
    asset_profile: Option<YahooAssetProfile>,
    summary_detail: Option<YahooSummaryDetail>,
}

#[derive(Debug, Deserialize)]
struct YahooAssetProfile {
    sector: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<YahooRaw>,
    price_to_sales_trailing12_months: Option<YahooRaw>,
    market_cap: Option<YahooRaw>,
}

#[derive(Debug, Deserialize)]
struct YahooRaw {
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooOptionsResponse {
    option_chain: YahooEnvelope<YahooOptionsResult>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionsResult {
    #[serde(default)]
    options: Vec<YahooOptionExpiry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooOptionExpiry {
    expiration_date: Option<i64>,
    #[serde(default)]
    calls: Vec<YahooContract>,
    #[serde(default)]
    puts: Vec<YahooContract>,
}

#[derive(Debug, Deserialize)]
struct YahooContract {
    strike: f64,
    volume: Option<f64>,
}

/// Bars and the live session quote from one chart response.
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    pub bars: Vec<Bar>,
    pub quote: Option<Quote>,
}

/// Yahoo uses hyphens instead of dots for share classes (BRK-B, not BRK.B).
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

/// Smallest chart range covering `lookback_days`.
fn range_for_lookback(lookback_days: u32) -> &'static str {
    match lookback_days {
        0..=5 => "5d",
        6..=31 => "1mo",
        32..=92 => "3mo",
        93..=183 => "6mo",
        184..=366 => "1y",
        367..=731 => "2y",
        732..=1827 => "5y",
        1828..=3653 => "10y",
        _ => "max",
    }
}

fn envelope_result<T>(envelope: YahooEnvelope<T>, symbol: &str) -> Result<T, ProviderError> {
    if let Some(error) = envelope.error {
        return Err(if error.code.eq_ignore_ascii_case("not found") {
            ProviderError::NotFound(symbol.to_string())
        } else {
            ProviderError::Unavailable(format!("{} - {}", error.code, error.description))
        });
    }
    envelope
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))
}

/// Parse a v8 chart response into daily bars and the session quote.
pub fn parse_chart(body: &str, symbol: &str) -> Result<ChartData, ProviderError> {
    let data: YahooChartResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let result = envelope_result(data.chart, symbol)?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next();
    let (opens, highs, lows, closes, volumes) = match quote {
        Some(q) => (
            q.open.unwrap_or_default(),
            q.high.unwrap_or_default(),
            q.low.unwrap_or_default(),
            q.close.unwrap_or_default(),
            q.volume.unwrap_or_default(),
        ),
        None => Default::default(),
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let Some(close) = closes.get(i).copied().flatten().filter(|c| *c > 0.0) else {
            continue;
        };
        let open = opens.get(i).copied().flatten().unwrap_or(close);
        let high = highs.get(i).copied().flatten().unwrap_or(close);
        let low = lows.get(i).copied().flatten().unwrap_or(close);
        let volume = volumes.get(i).copied().flatten().unwrap_or(0.0);
        let bar = Bar::new(timestamp * 1000, open, high, low, close, volume).repaired();
        if !bar.is_valid() {
            debug!("{}: dropping malformed bar at {}", symbol, timestamp);
            continue;
        }
        bars.push(bar);
    }

    let meta = result.meta;
    let quote = match (meta.regular_market_price, meta.regular_market_time) {
        (Some(price), Some(time)) if price > 0.0 => Some(Quote {
            timestamp: time * 1000,
            price,
            open: None,
            high: meta.regular_market_day_high,
            low: meta.regular_market_day_low,
            volume: meta.regular_market_volume,
        }),
        _ => None,
    };

    Ok(ChartData { bars, quote })
}

/// Parse a quoteSummary response into the sector and valuation data.
pub fn parse_quote_summary(
    body: &str,
    symbol: &str,
) -> Result<(Option<String>, Option<Fundamentals>), ProviderError> {
    let data: YahooSummaryResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let result = envelope_result(data.quote_summary, symbol)?;

    let sector = result
        .asset_profile
        .and_then(|p| p.sector)
        .filter(|s| !s.is_empty());
    let raw = |v: Option<YahooRaw>| v.and_then(|r| r.raw);
    let fundamentals = result.summary_detail.map(|d| Fundamentals {
        trailing_pe: raw(d.trailing_pe),
        price_to_sales: raw(d.price_to_sales_trailing12_months),
        market_cap: raw(d.market_cap),
    });

    Ok((sector, fundamentals))
}

fn busiest_strike(contracts: &[YahooContract]) -> (f64, Option<(f64, f64)>) {
    let mut total = 0.0;
    let mut busiest: Option<(f64, f64)> = None;
    for contract in contracts {
        let volume = contract.volume.unwrap_or(0.0);
        total += volume;
        if busiest.map_or(true, |(_, best)| volume > best) {
            busiest = Some((contract.strike, volume));
        }
    }
    (total, busiest)
}

/// Parse a v7 options response, summarizing the nearest expiry.
pub fn parse_options(body: &str, symbol: &str) -> Result<Option<OptionsSummary>, ProviderError> {
    let data: YahooOptionsResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let result = envelope_result(data.option_chain, symbol)?;

    let Some(expiry) = result.options.into_iter().next() else {
        return Ok(None);
    };
    if expiry.calls.is_empty() && expiry.puts.is_empty() {
        return Ok(None);
    }

    let (total_call_volume, max_call) = busiest_strike(&expiry.calls);
    let (total_put_volume, max_put) = busiest_strike(&expiry.puts);

    Ok(Some(OptionsSummary {
        expiry: expiry
            .expiration_date
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|d| d.format("%Y-%m-%d").to_string()),
        total_call_volume,
        total_put_volume,
        max_call_strike: max_call.map(|(strike, _)| strike),
        max_call_volume: max_call.map(|(_, volume)| volume),
        max_put_strike: max_put.map(|(strike, _)| strike),
        max_put_volume: max_put.map(|(_, volume)| volume),
    }))
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    responses: DashMap<String, (Instant, String)>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    /// Most recent chart URL per Yahoo symbol.
    chart_urls: DashMap<String, String>,
}

impl YahooFinanceClient {
    pub fn new(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            responses: DashMap::new(),
            in_flight: DashMap::new(),
            chart_urls: DashMap::new(),
        })
    }

    fn cached(&self, url: &str) -> Option<String> {
        self.responses.get(url).and_then(|entry| {
            let (fetched_at, body) = entry.value();
            (fetched_at.elapsed() < RESPONSE_TTL).then(|| body.clone())
        })
    }

    fn store(&self, url: String, body: String) {
        self.responses.retain(|_, (at, _)| at.elapsed() < RESPONSE_TTL);
        self.responses.insert(url, (Instant::now(), body));
    }

    async fn fetch(&self, url: String, symbol: &str) -> Result<String, ProviderError> {
        if let Some(body) = self.cached(&url) {
            return Ok(body);
        }

        // Later callers for the same URL wait here and then hit the cache.
        let gate = self.in_flight.entry(url.clone()).or_default().clone();
        let _guard = gate.lock().await;
        if let Some(body) = self.cached(&url) {
            return Ok(body);
        }

        let result = self.request(&url, symbol).await;
        if let Ok(body) = &result {
            self.store(url.clone(), body.clone());
        }
        self.in_flight.remove(&url);
        result
    }

    async fn request(&self, url: &str, symbol: &str) -> Result<String, ProviderError> {
        debug!("Fetching Yahoo Finance data: {}", url);
        let response = self.client.get(url).send().await?;
        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(ProviderError::NotFound(symbol.to_string())),
            status => return Err(ProviderError::Unavailable(format!("API error: {}", status))),
        }
        Ok(response.text().await?)
    }

    fn chart_url(symbol: &str, lookback_days: u32) -> String {
        format!(
            "{}/{}?range={}&interval=1d&includePrePost=false",
            CHART_URL,
            normalize_yahoo_symbol(symbol),
            range_for_lookback(lookback_days)
        )
    }

    /// Chart URL to read the quote from: the last chart fetched for the
    /// symbol while it is cached, otherwise a short range.
    fn quote_url(&self, symbol: &str) -> String {
        self.chart_urls
            .get(&normalize_yahoo_symbol(symbol))
            .map(|entry| entry.value().clone())
            .filter(|url| self.cached(url).is_some())
            .unwrap_or_else(|| Self::chart_url(symbol, QUOTE_LOOKBACK_DAYS))
    }

    /// Fetch and parse the daily chart.
    pub async fn get_chart(&self, symbol: &str, lookback_days: u32) -> Result<ChartData, ProviderError> {
        let url = Self::chart_url(symbol, lookback_days);
        let body = self.fetch(url.clone(), symbol).await?;
        self.chart_urls.insert(normalize_yahoo_symbol(symbol), url);
        parse_chart(&body, symbol)
    }

    async fn get_summary(
        &self,
        symbol: &str,
    ) -> Result<(Option<String>, Option<Fundamentals>), ProviderError> {
        let url = format!(
            "{}/{}?modules=assetProfile,summaryDetail",
            SUMMARY_URL,
            normalize_yahoo_symbol(symbol)
        );
        let body = self.fetch(url, symbol).await?;
        parse_quote_summary(&body, symbol)
    }
}

impl MarketDataProvider for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn get_bars<'a>(
        &'a self,
        symbol: &'a str,
        lookback_days: u32,
    ) -> BoxFuture<'a, Result<Vec<Bar>, ProviderError>> {
        Box::pin(async move { Ok(self.get_chart(symbol, lookback_days).await?.bars) })
    }

    fn get_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<Option<Quote>, ProviderError>> {
        // The meta block of any chart carries the live quote.
        Box::pin(async move {
            let body = self.fetch(self.quote_url(symbol), symbol).await?;
            Ok(parse_chart(&body, symbol)?.quote)
        })
    }

    fn get_sector<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let (sector, _) = self.get_summary(symbol).await?;
            Ok(sector.unwrap_or_else(|| DEFAULT_SECTOR.to_string()))
        })
    }

    fn get_options<'a>(
        &'a self,
        symbol: &'a str,
    ) -> BoxFuture<'a, Result<Option<OptionsSummary>, ProviderError>> {
        Box::pin(async move {
            let url = format!("{}/{}", OPTIONS_URL, normalize_yahoo_symbol(symbol));
            let body = self.fetch(url, symbol).await?;
            parse_options(&body, symbol)
        })
    }

    fn get_fundamentals<'a>(
        &'a self,
        symbol: &'a str,
    ) -> BoxFuture<'a, Result<Option<Fundamentals>, ProviderError>> {
        Box::pin(async move { Ok(self.get_summary(symbol).await?.1) })
    }
}
