use std::sync::Arc;

use sqlx::SqlitePool;

use crate::ai::LlmClient;
use crate::pdf::TextExtractor;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub extractor: Arc<dyn TextExtractor>,
    pub gemini: Arc<dyn LlmClient>,
    pub openai: Arc<dyn LlmClient>,
}
