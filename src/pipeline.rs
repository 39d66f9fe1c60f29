// src/pipeline.rs
//! Bounded-yield acquisition loop.
//!
//! Walks the discovered link list front to back, extracting per link, and
//! stops early once `target_count` articles have been collected. Failures
//! are expected and routine: one bad link never aborts the scan, and an
//! unbounded prefix of failures is tolerated up to list exhaustion. Each
//! link gets exactly one attempt per run. A fixed politeness delay follows
//! every attempt, successful or not.

use std::time::Duration;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::discover::CandidateLink;
use crate::extract::{ArticleExtractor, ExtractedArticle};

/// Outcome of one pipeline run: `articles.len() <= target_count` and
/// `articles.len() <= attempted <= links.len()`.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionResult {
    pub articles: Vec<ExtractedArticle>,
    pub attempted: usize,
}

impl AcquisitionResult {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Extracted,
    Failed,
}

/// Per-attempt event emitted to the caller's sink; lets the surface show
/// interim progress without the pipeline knowing about any UI.
#[derive(Debug)]
pub struct AttemptEvent<'a> {
    /// Zero-based position in the candidate list.
    pub index: usize,
    pub url: &'a str,
    pub outcome: AttemptOutcome,
}

pub trait ProgressSink: Send + Sync {
    fn on_attempt(&self, event: &AttemptEvent<'_>);
}

/// Default sink: discards events.
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_attempt(&self, _event: &AttemptEvent<'_>) {}
}

/// Logs each attempt at info level.
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_attempt(&self, event: &AttemptEvent<'_>) {
        match event.outcome {
            AttemptOutcome::Extracted => {
                info!(source = event.index + 1, url = event.url, "extracted")
            }
            AttemptOutcome::Failed => {
                info!(source = event.index + 1, url = event.url, "blocked or failed")
            }
        }
    }
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "acquisition_attempts_total",
            "Candidate links attempted by the acquisition loop."
        );
        describe_counter!(
            "acquisition_extracted_total",
            "Articles successfully extracted."
        );
        describe_counter!(
            "acquisition_failures_total",
            "Attempts that ended in a soft failure."
        );
    });
}

/// Run the acquisition loop over `links`. Stateless: all inputs are
/// parameters and the result is returned, never written to shared state.
pub async fn acquire(
    extractor: &dyn ArticleExtractor,
    links: &[CandidateLink],
    target_count: usize,
    delay: Duration,
    sink: &dyn ProgressSink,
) -> AcquisitionResult {
    ensure_metrics_described();

    let mut articles: Vec<ExtractedArticle> = Vec::new();
    let mut attempted = 0usize;

    for (index, link) in links.iter().enumerate() {
        if articles.len() >= target_count {
            break;
        }
        attempted += 1;
        counter!("acquisition_attempts_total").increment(1);

        let outcome = match extractor.extract(&link.url).await {
            Some(article) => {
                articles.push(article);
                counter!("acquisition_extracted_total").increment(1);
                AttemptOutcome::Extracted
            }
            None => {
                counter!("acquisition_failures_total").increment(1);
                AttemptOutcome::Failed
            }
        };
        sink.on_attempt(&AttemptEvent {
            index,
            url: &link.url,
            outcome,
        });

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    AcquisitionResult {
        articles,
        attempted,
    }
}
