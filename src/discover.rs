// src/discover.rs
//! News link discovery over an RSS search feed.
//!
//! The provider's result order is kept as-is and treated as a relevance
//! proxy; downstream acquisition walks it front to back. Provider errors are
//! soft: any fetch or parse problem yields an empty list, never an error.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::DiscoveryConfig;

/// A URL returned by news search, not yet verified extractable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: String,
    pub title: Option<String>,
}

impl CandidateLink {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }
}

#[async_trait]
pub trait LinkDiscovery: Send + Sync {
    /// Up to `max_results` candidate links for the query, deduplicated,
    /// first-seen order preserved. Empty on provider failure.
    async fn discover(&self, query: &str, max_results: usize) -> Vec<CandidateLink>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
}

/// RSS-backed news search (Google News style: `<endpoint>?q=<query>`).
pub struct NewsRssDiscovery {
    http: reqwest::Client,
    endpoint: String,
}

impl NewsRssDiscovery {
    pub fn new(cfg: &DiscoveryConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            endpoint: cfg.search_endpoint.clone(),
        }
    }

    async fn fetch_feed(&self, query: &str) -> Option<String> {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
        let url = format!("{}?q={}", self.endpoint, encoded);
        let resp = self.http.get(&url).send().await.ok()?;
        if !resp.status().is_success() {
            warn!(status = %resp.status(), "news search returned non-success");
            return None;
        }
        resp.text().await.ok()
    }
}

#[async_trait]
impl LinkDiscovery for NewsRssDiscovery {
    async fn discover(&self, query: &str, max_results: usize) -> Vec<CandidateLink> {
        let Some(body) = self.fetch_feed(query).await else {
            warn!(query, "news search fetch failed, treating as no results");
            return Vec::new();
        };
        let links = parse_search_feed(&body);
        debug!(query, found = links.len(), "news search parsed");
        dedup_preserving_order(links, max_results)
    }

    fn name(&self) -> &'static str {
        "news-rss"
    }
}

/// Parse `<item>` entries out of an RSS search result. Malformed XML is a
/// soft failure: empty list.
pub fn parse_search_feed(xml: &str) -> Vec<CandidateLink> {
    let rss: Rss = match from_str(xml) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "search feed did not parse as RSS");
            return Vec::new();
        }
    };
    rss.channel
        .item
        .into_iter()
        .filter_map(|it| {
            let url = it.link.filter(|l| !l.trim().is_empty())?;
            let title = it
                .title
                .map(|t| normalize_title(&t))
                .filter(|t| !t.is_empty());
            Some(CandidateLink { url, title })
        })
        .collect()
}

/// Normalize a feed title: decode HTML entities, strip stray tags, collapse
/// whitespace.
fn normalize_title(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&decoded, "");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

/// Keep the first occurrence of each URL, in input order, capped at `max`.
pub fn dedup_preserving_order(links: Vec<CandidateLink>, max: usize) -> Vec<CandidateLink> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for link in links {
        if out.len() >= max {
            break;
        }
        if seen.insert(link.url.clone()) {
            out.push(link);
        }
    }
    out
}
