// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod analysis;
pub mod api;
pub mod chat;
pub mod config;
pub mod discover;
pub mod engine;
pub mod extract;
pub mod filter;
pub mod llm;
pub mod market;
pub mod metrics;
pub mod pipeline;
pub mod session;
pub mod snapshot;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::AnalyzerConfig;
pub use crate::discover::{CandidateLink, LinkDiscovery};
pub use crate::engine::{AnalysisOutcome, AnalysisReport, Engine};
pub use crate::extract::{ArticleExtractor, ExtractedArticle};
pub use crate::pipeline::{acquire, AcquisitionResult, NoopSink, ProgressSink};
