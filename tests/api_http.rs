// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with the
// network-facing components stubbed (mock market server, scripted discovery
// and extraction, no completion key).

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stock_news_analyzer::analysis::AnalysisService;
use stock_news_analyzer::api::{router, AppState};
use stock_news_analyzer::chat::ConversationService;
use stock_news_analyzer::config::AnalyzerConfig;
use stock_news_analyzer::discover::{CandidateLink, LinkDiscovery};
use stock_news_analyzer::engine::Engine;
use stock_news_analyzer::extract::{ArticleExtractor, ExtractedArticle};
use stock_news_analyzer::llm::CompletionClient;
use stock_news_analyzer::market::MarketDataGateway;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn chart_body(closes: &[f64]) -> Json {
    let n = closes.len();
    json!({
        "chart": {
            "result": [{
                "timestamp": (0..n as i64).collect::<Vec<_>>(),
                "indicators": {
                    "quote": [{
                        "close": closes,
                        "high": vec![200.0; n],
                        "low": vec![100.0; n],
                        "volume": vec![1000.0; n]
                    }]
                }
            }],
            "error": null
        }
    })
}

struct StubDiscovery {
    links: Vec<&'static str>,
}

#[async_trait]
impl LinkDiscovery for StubDiscovery {
    async fn discover(&self, _query: &str, max_results: usize) -> Vec<CandidateLink> {
        self.links
            .iter()
            .take(max_results)
            .map(|u| CandidateLink::new(*u))
            .collect()
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

struct ScriptedExtractor;

#[async_trait]
impl ArticleExtractor for ScriptedExtractor {
    async fn extract(&self, url: &str) -> Option<ExtractedArticle> {
        url.contains("good").then(|| ExtractedArticle {
            text: format!("article body from {url}"),
            url: url.to_string(),
        })
    }
}

/// Router with all outbound calls stubbed and no completion key configured.
async fn test_router(market_server: &MockServer, links: Vec<&'static str>) -> Router {
    let mut config = AnalyzerConfig::default();
    config.acquisition.request_delay_ms = 0;

    let client = Arc::new(CompletionClient::new(&config.llm, None));
    let chat = Arc::new(ConversationService::new(client.clone(), &config.llm));
    let analysis = AnalysisService::new(client, &config.llm);

    let engine = Engine::with_parts(
        config,
        MarketDataGateway::with_base_url(market_server.uri()),
        Arc::new(StubDiscovery { links }),
        Arc::new(ScriptedExtractor),
        analysis,
    );
    router(AppState::with_parts(Arc::new(engine), chat))
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let server = MockServer::start().await;
    let app = test_router(&server, vec![]).await;

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn api_price_normalizes_ticker_and_rounds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[123.456])))
        .mount(&server)
        .await;

    let app = test_router(&server, vec![]).await;
    let req = Request::builder()
        .method("GET")
        .uri("/price/%20aapl%20")
        .body(Body::empty())
        .expect("build GET /price");

    let resp = app.oneshot(req).await.expect("oneshot /price");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["ticker"], "AAPL");
    assert!((v["price"].as_f64().unwrap() - 123.46).abs() < 1e-9);
}

#[tokio::test]
async fn api_analyze_reports_counts_and_not_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[190.0])))
        .mount(&server)
        .await;

    let app = test_router(&server, vec!["bad1", "good1", "bad2", "good2"]).await;
    let payload = json!({ "ticker": " aapl " });
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /analyze");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["ticker"], "AAPL");
    assert_eq!(v["price"], 190.0);
    // target (5) exceeds the 2 extractable links, so the whole list is walked
    assert_eq!(v["attempted"], 4);
    assert_eq!(v["extracted"], 2);
    assert_eq!(v["links"].as_array().unwrap().len(), 4);
    assert_eq!(v["outcome"]["kind"], "not_configured");
}

#[tokio::test]
async fn api_analyze_distinguishes_empty_stages() {
    let server = MockServer::start().await;
    // price resolves, but discovery yields nothing
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[190.0])))
        .mount(&server)
        .await;

    let app = test_router(&server, vec![]).await;
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({"ticker": "AAPL"}).to_string()))
        .expect("build POST /analyze");
    let v = read_json(app.oneshot(req).await.expect("oneshot")).await;
    assert_eq!(v["outcome"]["kind"], "no_links_found");

    // all links fail extraction
    let app = test_router(&server, vec!["bad1", "bad2"]).await;
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({"ticker": "AAPL"}).to_string()))
        .expect("build POST /analyze");
    let v = read_json(app.oneshot(req).await.expect("oneshot")).await;
    assert_eq!(v["outcome"]["kind"], "no_articles");
    assert_eq!(v["attempted"], 2);

    // price unavailable (no mock for this ticker -> 404)
    let app = test_router(&server, vec![]).await;
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({"ticker": "MISSING"}).to_string()))
        .expect("build POST /analyze");
    let v = read_json(app.oneshot(req).await.expect("oneshot")).await;
    assert_eq!(v["outcome"]["kind"], "price_unavailable");
    assert_eq!(v["price"], Json::Null);
}

#[tokio::test]
async fn api_analyze_rejects_blank_ticker() {
    let server = MockServer::start().await;
    let app = test_router(&server, vec![]).await;

    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({"ticker": "   "}).to_string()))
        .expect("build POST /analyze");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn api_chat_without_evaluation_asks_for_analysis_first() {
    let server = MockServer::start().await;
    let app = test_router(&server, vec![]).await;

    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(json!({"message": "will it go up?"}).to_string()))
        .expect("build POST /chat");

    let resp = app.oneshot(req).await.expect("oneshot /chat");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let reply = v["reply"].as_str().unwrap();
    assert!(
        reply.contains("Analyze a ticker first"),
        "unexpected reply: {reply}"
    );
}

#[tokio::test]
async fn api_snapshot_covers_the_basket() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/v8/finance/chart/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[
            100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 110.0,
        ])))
        .mount(&server)
        .await;

    let app = test_router(&server, vec![]).await;
    let req = Request::builder()
        .method("GET")
        .uri("/snapshot")
        .body(Body::empty())
        .expect("build GET /snapshot");

    let resp = app.oneshot(req).await.expect("oneshot /snapshot");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let rows = v.as_array().expect("array of snapshots");
    assert_eq!(rows.len(), 10, "one entry per basket ticker");
    assert_eq!(rows[0]["latest_close"], 110.0);
    assert_eq!(rows[0]["pct_change_7d"], 10.0);
}
