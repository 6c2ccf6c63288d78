use async_trait::async_trait;
use reqwest::Client;

use crate::ai::{AiError, LlmClient, dto};

const OPENAI_MODEL: &str = "gpt-3.5-turbo";

const SYSTEM_PROMPT: &str = "You are an AI educational assistant that helps \
students understand and organize their course material. Be concise, accurate, \
and well-structured.";

pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            model: OPENAI_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::Auth("OPENAI_API_KEY is not set".to_string()))?;

        let request_body = dto::ChatCompletionRequest {
            model: self.model.clone(),
            temperature: 0.2,
            messages: vec![
                dto::ChatMessage::system(SYSTEM_PROMPT),
                dto::ChatMessage::user(prompt),
            ],
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AiError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(AiError::Auth(body));
            }
            return Err(AiError::Api { status: status.as_u16(), body });
        }

        let body_text = response.text().await.unwrap_or_default();
        let parsed: dto::ChatCompletionResponse = serde_json::from_str(&body_text)
            .map_err(|e| AiError::Malformed(format!("failed to parse OpenAI response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::Malformed("OpenAI response contained no choices".to_string()))
    }
}
