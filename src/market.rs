// src/market.rs
//! Market data gateway: thin wrapper over the Yahoo Finance v8 chart API.
//!
//! Every failure path (transport, non-success status, empty series, nulls in
//! the response) collapses to `None`; price is never a hard error for the
//! rest of the system.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Time-indexed OHLCV-ish series; rows with any missing field are dropped.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PriceHistory {
    pub timestamps: Vec<i64>,
    pub close: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub volume: Vec<f64>,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }
}

pub struct MarketDataGateway {
    http: reqwest::Client,
    base_url: String,
}

impl Default for MarketDataGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataGateway {
    pub fn new() -> Self {
        Self::with_base_url("https://query1.finance.yahoo.com".to_string())
    }

    /// Custom base URL, for tests against a local server.
    pub fn with_base_url(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self { http, base_url }
    }

    /// Daily history for `range` (e.g. "1d", "6mo").
    pub async fn history(&self, ticker: &str, range: &str) -> Option<PriceHistory> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}",
            self.base_url, ticker, range
        );

        let resp = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(ticker, error = %e, "market data fetch failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(ticker, status = %resp.status(), "market data non-success");
            return None;
        }
        let body: YahooResponse = match resp.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(ticker, error = %e, "market data parse failed");
                return None;
            }
        };

        if let Some(err) = body.chart.error {
            warn!(ticker, code = %err.code, description = %err.description, "market data provider error");
            return None;
        }

        let data = body.chart.result?.into_iter().next()?;
        let quote = data.indicators.quote.into_iter().next()?;

        let mut out = PriceHistory::default();
        for (i, &ts) in data.timestamp.iter().enumerate() {
            let close = quote.close.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            if let (Some(c), Some(h), Some(l), Some(v)) = (close, high, low, volume) {
                out.timestamps.push(ts);
                out.close.push(c);
                out.high.push(h);
                out.low.push(l);
                out.volume.push(v);
            }
        }

        if out.is_empty() {
            return None;
        }
        Some(out)
    }

    /// Final close of a one-day history, rounded to 2 decimals. `None` when
    /// the series is empty or the fetch fails.
    pub async fn latest_close(&self, ticker: &str) -> Option<f64> {
        let history = self.history(ticker, "1d").await?;
        history.close.last().map(|c| round2(*c))
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
