// src/extract.rs
//! Fetch-and-extract for one candidate URL.
//!
//! Best-effort heuristic extractor: every failure mode (blocked domain,
//! transport error, non-200, stub-sized body, boilerplate-only page) is a
//! soft `None`. False negatives are acceptable; the acquisition loop
//! compensates by over-sampling candidate links.

use std::io::Cursor;

use async_trait::async_trait;
use readability::extractor;
use tracing::debug;
use url::Url;

use crate::config::ExtractionConfig;
use crate::filter::DomainFilter;

/// Cleaned body text of one successfully processed link. Ephemeral: lives
/// only for the duration of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub text: String,
    pub url: String,
}

#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    /// `None` covers both transport and content failures; callers cannot and
    /// need not distinguish them.
    async fn extract(&self, url: &str) -> Option<ExtractedArticle>;
}

/// Raw-body gate: response bodies below `min_chars` are paywall stubs,
/// bot-block pages, or error pages. Inclusive at the boundary.
pub fn raw_body_usable(raw: &str, min_chars: usize) -> bool {
    raw.chars().count() >= min_chars
}

/// Content gate: trimmed article text must *exceed* `min_chars`.
pub fn article_text_usable(text: &str, min_chars: usize) -> bool {
    text.trim().chars().count() > min_chars
}

pub struct HttpExtractor {
    http: reqwest::Client,
    filter: DomainFilter,
    min_raw_chars: usize,
    min_text_chars: usize,
}

impl HttpExtractor {
    pub fn new(cfg: &ExtractionConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.fetch_timeout())
            .build()
            .expect("reqwest client");
        Self {
            http,
            filter: DomainFilter::new(cfg.blocked_domains.clone()),
            min_raw_chars: cfg.min_raw_chars,
            min_text_chars: cfg.min_text_chars,
        }
    }

    /// Swap the deny-list; used when callers carry their own filter.
    pub fn with_filter(mut self, filter: DomainFilter) -> Self {
        self.filter = filter;
        self
    }
}

#[async_trait]
impl ArticleExtractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Option<ExtractedArticle> {
        if self.filter.is_blocked(url) {
            debug!(url, "skipping blocked publisher");
            return None;
        }

        let resp = self.http.get(url).send().await.ok()?;
        if resp.status() != reqwest::StatusCode::OK {
            debug!(url, status = %resp.status(), "fetch rejected");
            return None;
        }
        let raw = resp.text().await.ok()?;
        if !raw_body_usable(&raw, self.min_raw_chars) {
            debug!(url, chars = raw.chars().count(), "body below stub threshold");
            return None;
        }

        let parsed = Url::parse(url).ok()?;
        let mut reader = Cursor::new(raw.as_bytes());
        let product = extractor::extract(&mut reader, &parsed).ok()?;

        let text = product.text.trim();
        if !article_text_usable(text, self.min_text_chars) {
            debug!(url, chars = text.chars().count(), "extraction too thin");
            return None;
        }
        Some(ExtractedArticle {
            text: text.to_string(),
            url: url.to_string(),
        })
    }
}
