// src/session.rs
//! Per-session state: the mutable bundle the analysis flow writes and the
//! conversation service reads. Owned by the presentation layer; the core
//! pipeline never retains it across calls. Nothing here survives a restart.

use crate::chat::ConversationTurn;

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub ticker: Option<String>,
    pub price: Option<f64>,
    pub evaluation: Option<String>,
    pub transcript: Vec<ConversationTurn>,
}

impl Session {
    /// Prepare for an analysis of `ticker`. Switching tickers invalidates the
    /// previous evaluation and transcript.
    pub fn begin_analysis(&mut self, ticker: &str) {
        if self.ticker.as_deref() != Some(ticker) {
            self.evaluation = None;
            self.transcript.clear();
        }
        self.ticker = Some(ticker.to_string());
    }

    pub fn record_result(&mut self, price: f64, evaluation: Option<String>) {
        self.price = Some(price);
        if evaluation.is_some() {
            self.evaluation = evaluation;
        }
    }

    /// True when a follow-up conversation has grounding context.
    pub fn can_chat(&self) -> bool {
        self.ticker.is_some() && self.evaluation.is_some()
    }

    pub fn push_exchange(&mut self, user_message: &str, reply: &str) {
        self.transcript.push(ConversationTurn::user(user_message));
        self.transcript.push(ConversationTurn::assistant(reply));
    }
}
