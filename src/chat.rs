// src/chat.rs
//! Follow-up conversation grounded in the last evaluation.
//!
//! Request size is bounded on both axes: at most the trailing
//! `max_transcript_turns` turns of the transcript and at most
//! `max_eval_context_chars` chars of the evaluation go upstream,
//! regardless of how large either grows in the session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::truncate_chars;
use crate::config::LlmConfig;
use crate::llm::{ChatMessage, CompletionClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the session transcript. Append-only within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    fn to_message(&self) -> ChatMessage {
        match self.role {
            Role::User => ChatMessage::user(self.content.clone()),
            Role::Assistant => ChatMessage::assistant(self.content.clone()),
        }
    }
}

fn build_system_preamble(ticker: &str, price: f64, eval_context: &str) -> String {
    format!(
        "You are a stock research assistant.\n\
         \n\
         Use the provided evaluation context as your primary reference.\n\
         Discuss plausible bullish/bearish scenarios and what would need to happen for price to rise/fall.\n\
         Do not claim certainty or guarantee future price movements.\n\
         If asked \"will it go up\", respond with a scenario-based answer and key risks.\n\
         \n\
         Stock: {ticker}\n\
         Current Price: {price}\n\
         \n\
         Evaluation Context:\n\
         {eval_context}\n\
         \n\
         Answer format rules:\n\
         - Be concise.\n\
         - Plain text.\n\
         - If you reference up/down, clarify it is a hypothesis, not a guarantee."
    )
}

/// Assemble the upstream message list: system preamble, bounded transcript
/// tail, then the new user message.
pub fn build_chat_messages(
    ticker: &str,
    price: f64,
    evaluation: &str,
    transcript: &[ConversationTurn],
    user_message: &str,
    max_turns: usize,
    max_eval_chars: usize,
) -> Vec<ChatMessage> {
    let eval_context = truncate_chars(evaluation, max_eval_chars);

    let mut messages = Vec::with_capacity(transcript.len().min(max_turns) + 2);
    messages.push(ChatMessage::system(build_system_preamble(
        ticker,
        price,
        &eval_context,
    )));

    let tail_start = transcript.len().saturating_sub(max_turns);
    for turn in &transcript[tail_start..] {
        messages.push(turn.to_message());
    }

    messages.push(ChatMessage::user(user_message));
    messages
}

pub struct ConversationService {
    client: Arc<CompletionClient>,
    temperature: f32,
    max_transcript_turns: usize,
    max_eval_context_chars: usize,
}

impl ConversationService {
    pub fn new(client: Arc<CompletionClient>, cfg: &LlmConfig) -> Self {
        Self {
            client,
            temperature: cfg.chat_temperature,
            max_transcript_turns: cfg.max_transcript_turns,
            max_eval_context_chars: cfg.max_eval_context_chars,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    pub async fn respond(
        &self,
        ticker: &str,
        price: f64,
        evaluation: &str,
        transcript: &[ConversationTurn],
        user_message: &str,
    ) -> String {
        let messages = build_chat_messages(
            ticker,
            price,
            evaluation,
            transcript,
            user_message,
            self.max_transcript_turns,
            self.max_eval_context_chars,
        );
        self.client.complete(&messages, self.temperature).await
    }
}
