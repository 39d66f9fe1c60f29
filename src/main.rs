//! News-vs-price analyzer — binary entrypoint.
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stock_news_analyzer::api::{self, AppState};
use stock_news_analyzer::config::{AnalyzerConfig, LlmConfig};
use stock_news_analyzer::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stock_news_analyzer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AnalyzerConfig::load_or_default();
    let bind_addr = config.server.bind_addr.clone();

    let metrics = Metrics::init(config.acquisition.target_count);

    if LlmConfig::resolve_api_key().is_none() {
        tracing::warn!(
            "GROQ_API_KEY not set; evaluation and chat are disabled, price and snapshot still work"
        );
    }

    let state = AppState::from_config(config);
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
