use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eduplanner::ai::{GeminiClient, OpenAiClient};
use eduplanner::api::router;
use eduplanner::config::AiConfig;
use eduplanner::pdf::PdfTextExtractor;
use eduplanner::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "eduplanner=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://eduplanner.db".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let ai_config = AiConfig::from_env();
    if ai_config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set, syllabus analysis will be unavailable");
    }
    if ai_config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set, AI summaries will be unavailable");
    }

    let http = reqwest::Client::new();
    let state = AppState {
        db: pool.clone(),
        extractor: Arc::new(PdfTextExtractor::new(http.clone())),
        gemini: Arc::new(GeminiClient::new(http.clone(), ai_config.gemini_api_key)),
        openai: Arc::new(OpenAiClient::new(http, ai_config.openai_api_key)),
    };

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
