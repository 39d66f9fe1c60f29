// src/snapshot.rs
//! Market snapshot for a fixed basket of large-cap tickers: six months of
//! price/volume history plus the derived stats the dashboard charts
//! (latest close, 7-day percent change, average volume, daily high-low
//! range). Independent of the LLM features; works without an API key.

use chrono::DateTime;
use serde::Serialize;
use tracing::warn;

use crate::market::{round2, MarketDataGateway, PriceHistory};

pub const TOP_STOCKS: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "NFLX", "AMD", "INTC",
];

pub const SNAPSHOT_RANGE: &str = "6mo";

#[derive(Debug, Clone, Serialize)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub timestamps: Vec<i64>,
    /// Same instants as `timestamps`, formatted YYYY-MM-DD for chart axes.
    pub dates: Vec<String>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    /// Elementwise high - low, a simple volatility proxy.
    pub daily_range: Vec<f64>,
    pub latest_close: f64,
    /// Change vs. the 7th-from-last close, in percent; absent for short series.
    pub pct_change_7d: Option<f64>,
    pub avg_volume: f64,
}

/// Percent change of the last close against the close 7 rows back. `None`
/// when fewer than 7 rows exist.
pub fn pct_change_7d(close: &[f64]) -> Option<f64> {
    if close.len() < 7 {
        return None;
    }
    let last = *close.last()?;
    let base = close[close.len() - 7];
    if base == 0.0 {
        return None;
    }
    Some(round2((last / base - 1.0) * 100.0))
}

pub fn avg_volume(volume: &[f64]) -> f64 {
    if volume.is_empty() {
        return 0.0;
    }
    volume.iter().sum::<f64>() / volume.len() as f64
}

pub fn daily_range(high: &[f64], low: &[f64]) -> Vec<f64> {
    high.iter().zip(low.iter()).map(|(h, l)| h - l).collect()
}

fn format_date(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn build_snapshot(ticker: &str, history: &PriceHistory) -> TickerSnapshot {
    TickerSnapshot {
        ticker: ticker.to_string(),
        timestamps: history.timestamps.clone(),
        dates: history.timestamps.iter().map(|ts| format_date(*ts)).collect(),
        close: history.close.clone(),
        volume: history.volume.clone(),
        daily_range: daily_range(&history.high, &history.low),
        latest_close: history.close.last().copied().map(round2).unwrap_or(0.0),
        pct_change_7d: pct_change_7d(&history.close),
        avg_volume: avg_volume(&history.volume),
    }
}

/// Fetch the basket sequentially; tickers whose fetch fails are omitted.
pub async fn market_snapshot(gateway: &MarketDataGateway) -> Vec<TickerSnapshot> {
    let mut out = Vec::with_capacity(TOP_STOCKS.len());
    for ticker in TOP_STOCKS {
        match gateway.history(ticker, SNAPSHOT_RANGE).await {
            Some(history) => out.push(build_snapshot(ticker, &history)),
            None => warn!(ticker, "snapshot history unavailable, omitting"),
        }
    }
    out
}
