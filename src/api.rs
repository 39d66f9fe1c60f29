// src/api.rs
//! HTTP surface: the single conversational interface over the analysis
//! engine. Owns the session state; the engine stays stateless.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::chat::ConversationService;
use crate::config::AnalyzerConfig;
use crate::engine::{normalize_ticker, AnalysisOutcome, AnalysisReport, Engine};
use crate::llm::CompletionClient;
use crate::pipeline::TracingSink;
use crate::session::Session;
use crate::snapshot::{market_snapshot, TickerSnapshot};

#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
    chat: Arc<ConversationService>,
    session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn from_config(config: AnalyzerConfig) -> Self {
        let client = Arc::new(CompletionClient::new(
            &config.llm,
            crate::config::LlmConfig::resolve_api_key(),
        ));
        let chat = Arc::new(ConversationService::new(client.clone(), &config.llm));
        let engine = Arc::new(Engine::from_config(config, client));
        Self {
            engine,
            chat,
            session: Arc::new(Mutex::new(Session::default())),
        }
    }

    /// Assemble from pre-built parts (tests swap network-facing components).
    pub fn with_parts(engine: Arc<Engine>, chat: Arc<ConversationService>) -> Self {
        Self {
            engine,
            chat,
            session: Arc::new(Mutex::new(Session::default())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/chat", post(chat))
        .route("/price/{ticker}", get(price))
        .route("/snapshot", get(snapshot))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct AnalyzeReq {
    ticker: String,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<AnalysisReport>, (StatusCode, String)> {
    let Some(ticker) = normalize_ticker(&body.ticker) else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "ticker must not be empty".to_string(),
        ));
    };

    // The full pass runs without holding the session lock; one user action,
    // one synchronous chain.
    let report = state.engine.run_analysis(&ticker, &TracingSink).await;

    if let AnalysisOutcome::Evaluated { evaluation } = &report.outcome {
        let mut session = state.session.lock().expect("session mutex poisoned");
        session.begin_analysis(&ticker);
        session.record_result(
            report.price.unwrap_or_default(),
            Some(evaluation.clone()),
        );
    }

    Ok(Json(report))
}

#[derive(Deserialize)]
struct ChatReq {
    message: String,
}

#[derive(Serialize)]
struct ChatResp {
    reply: String,
}

async fn chat(State(state): State<AppState>, Json(body): Json<ChatReq>) -> Json<ChatResp> {
    let (ticker, price, evaluation, transcript) = {
        let session = state.session.lock().expect("session mutex poisoned");
        if !session.can_chat() {
            return Json(ChatResp {
                reply: "No evaluation in this session yet. Analyze a ticker first.".to_string(),
            });
        }
        (
            session.ticker.clone().unwrap_or_default(),
            session.price.unwrap_or_default(),
            session.evaluation.clone().unwrap_or_default(),
            session.transcript.clone(),
        )
    };

    let reply = state
        .chat
        .respond(&ticker, price, &evaluation, &transcript, &body.message)
        .await;

    let mut session = state.session.lock().expect("session mutex poisoned");
    session.push_exchange(&body.message, &reply);

    Json(ChatResp { reply })
}

#[derive(Serialize)]
struct PriceResp {
    ticker: String,
    price: Option<f64>,
}

async fn price(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<PriceResp>, (StatusCode, String)> {
    let Some(ticker) = normalize_ticker(&ticker) else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "ticker must not be empty".to_string(),
        ));
    };
    let price = state.engine.market().latest_close(&ticker).await;
    Ok(Json(PriceResp { ticker, price }))
}

async fn snapshot(State(state): State<AppState>) -> Json<Vec<TickerSnapshot>> {
    Json(market_snapshot(state.engine.market()).await)
}
