// src/analysis.rs
//! Analysis service: formats acquired articles + price into the analyst
//! prompt and asks the completion endpoint for a sentiment/justification
//! judgment. The result is opaque text that becomes the grounding context
//! for follow-up conversation.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::extract::ExtractedArticle;
use crate::llm::{ChatMessage, CompletionClient};

pub fn combine_articles(articles: &[ExtractedArticle]) -> String {
    articles
        .iter()
        .map(|a| a.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Truncate to the first `max_chars` chars, safely at char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn build_analysis_prompt(news_text: &str, price: f64, ticker: &str) -> String {
    format!(
        "You are a financial analyst.\n\
         \n\
         Stock: {ticker}\n\
         Current Price: {price}\n\
         \n\
         News Articles:\n\
         {news_text}\n\
         \n\
         Tasks:\n\
         1. Sentiment (Positive / Negative / Neutral)\n\
         2. Does news justify the price?\n\
         3. Actionable insight (max 3 lines)\n\
         \n\
         Respond in plain text."
    )
}

pub struct AnalysisService {
    client: Arc<CompletionClient>,
    temperature: f32,
    max_article_chars: usize,
}

impl AnalysisService {
    pub fn new(client: Arc<CompletionClient>, cfg: &LlmConfig) -> Self {
        Self {
            client,
            temperature: cfg.eval_temperature,
            max_article_chars: cfg.max_article_chars,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    /// Judgment text for one (ticker, price, article-set) triple. Diagnostic
    /// text on upstream failure; never an error.
    pub async fn evaluate(
        &self,
        articles: &[ExtractedArticle],
        price: f64,
        ticker: &str,
    ) -> String {
        let news_text = truncate_chars(&combine_articles(articles), self.max_article_chars);
        let prompt = build_analysis_prompt(&news_text, price, ticker);
        let messages = [ChatMessage::user(prompt)];
        self.client.complete(&messages, self.temperature).await
    }
}
