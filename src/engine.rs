// src/engine.rs
//! Orchestration of one full analysis pass:
//! price -> link discovery -> bounded acquisition -> LLM evaluation.
//!
//! Each empty stage is a distinguishable outcome the surface reports to the
//! user; nothing past the ticker normalization is a hard error.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::analysis::AnalysisService;
use crate::config::AnalyzerConfig;
use crate::discover::{CandidateLink, LinkDiscovery, NewsRssDiscovery};
use crate::extract::{ArticleExtractor, HttpExtractor};
use crate::llm::CompletionClient;
use crate::market::MarketDataGateway;
use crate::pipeline::{acquire, AcquisitionResult, ProgressSink};

/// Uppercased, trimmed ticker symbol. Empty input yields `None`.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let t = raw.trim().to_ascii_uppercase();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

/// Where the analysis pass ended. `Evaluated` is the happy path; everything
/// else names the stage that came up empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    PriceUnavailable,
    NoLinksFound,
    NoArticles,
    NotConfigured,
    Evaluated { evaluation: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub price: Option<f64>,
    pub links: Vec<String>,
    pub attempted: usize,
    pub extracted: usize,
    pub outcome: AnalysisOutcome,
}

impl AnalysisReport {
    fn early(ticker: String, price: Option<f64>, outcome: AnalysisOutcome) -> Self {
        Self {
            ticker,
            price,
            links: Vec::new(),
            attempted: 0,
            extracted: 0,
            outcome,
        }
    }
}

pub struct Engine {
    config: AnalyzerConfig,
    market: MarketDataGateway,
    discovery: Arc<dyn LinkDiscovery>,
    extractor: Arc<dyn ArticleExtractor>,
    analysis: AnalysisService,
}

impl Engine {
    /// Wire the production components from config.
    pub fn from_config(config: AnalyzerConfig, client: Arc<CompletionClient>) -> Self {
        let discovery: Arc<dyn LinkDiscovery> = Arc::new(NewsRssDiscovery::new(&config.discovery));
        let extractor: Arc<dyn ArticleExtractor> = Arc::new(HttpExtractor::new(&config.extraction));
        let analysis = AnalysisService::new(client, &config.llm);
        Self {
            config,
            market: MarketDataGateway::new(),
            discovery,
            extractor,
            analysis,
        }
    }

    /// Custom parts; used by tests to swap network-facing components.
    pub fn with_parts(
        config: AnalyzerConfig,
        market: MarketDataGateway,
        discovery: Arc<dyn LinkDiscovery>,
        extractor: Arc<dyn ArticleExtractor>,
        analysis: AnalysisService,
    ) -> Self {
        Self {
            config,
            market,
            discovery,
            extractor,
            analysis,
        }
    }

    pub fn market(&self) -> &MarketDataGateway {
        &self.market
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Discovery plus the bounded acquisition loop in one call, for callers
    /// that want articles without the price/evaluation stages.
    pub async fn acquire_articles(
        &self,
        ticker: &str,
        sink: &dyn ProgressSink,
    ) -> AcquisitionResult {
        let links = self
            .discovery
            .discover(ticker, self.config.discovery.max_results)
            .await;
        acquire(
            self.extractor.as_ref(),
            &links,
            self.config.acquisition.target_count,
            self.config.acquisition.request_delay(),
            sink,
        )
        .await
    }

    /// One synchronous pass over the whole chain for a normalized ticker.
    /// The sink receives one event per acquisition attempt.
    pub async fn run_analysis(&self, ticker: &str, sink: &dyn ProgressSink) -> AnalysisReport {
        let Some(price) = self.market.latest_close(ticker).await else {
            return AnalysisReport::early(
                ticker.to_string(),
                None,
                AnalysisOutcome::PriceUnavailable,
            );
        };
        info!(ticker, price, "price fetched");

        let links = self
            .discovery
            .discover(ticker, self.config.discovery.max_results)
            .await;
        if links.is_empty() {
            return AnalysisReport::early(
                ticker.to_string(),
                Some(price),
                AnalysisOutcome::NoLinksFound,
            );
        }
        info!(ticker, found = links.len(), "candidate links discovered");

        let AcquisitionResult { articles, attempted } = acquire(
            self.extractor.as_ref(),
            &links,
            self.config.acquisition.target_count,
            self.config.acquisition.request_delay(),
            sink,
        )
        .await;
        info!(
            ticker,
            attempted,
            extracted = articles.len(),
            "acquisition finished"
        );

        let link_urls = link_urls(&links);
        if articles.is_empty() {
            return AnalysisReport {
                ticker: ticker.to_string(),
                price: Some(price),
                links: link_urls,
                attempted,
                extracted: 0,
                outcome: AnalysisOutcome::NoArticles,
            };
        }

        // Credential check happens only after acquisition, so the link and
        // article feedback is still useful without a key.
        if !self.analysis.is_configured() {
            return AnalysisReport {
                ticker: ticker.to_string(),
                price: Some(price),
                links: link_urls,
                attempted,
                extracted: articles.len(),
                outcome: AnalysisOutcome::NotConfigured,
            };
        }

        let evaluation = self.analysis.evaluate(&articles, price, ticker).await;
        AnalysisReport {
            ticker: ticker.to_string(),
            price: Some(price),
            links: link_urls,
            attempted,
            extracted: articles.len(),
            outcome: AnalysisOutcome::Evaluated { evaluation },
        }
    }
}

/// The first ten discovered URLs, the slice the surface lists.
fn link_urls(links: &[CandidateLink]) -> Vec<String> {
    links.iter().take(10).map(|l| l.url.clone()).collect()
}
