use async_trait::async_trait;
use reqwest::Client;

use crate::ai::{AiError, LlmClient, dto};

const GEMINI_MODEL: &str = "gemini-pro";

/// Client for the Gemini generateContent REST API. The key is injected at
/// construction; a missing key fails each call with `AiError::Auth` instead
/// of failing startup.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            model: GEMINI_MODEL.to_string(),
        }
    }

    async fn generate(&self, prompt: &str, json_mode: bool) -> Result<String, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::Auth("GEMINI_API_KEY is not set".to_string()))?;

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, api_key
        );

        let request_body = dto::GenerateContentRequest {
            contents: vec![dto::Content {
                parts: vec![dto::Part { text: prompt.to_string() }],
                role: None,
            }],
            generation_config: Some(dto::GenerationConfig {
                temperature: 0.2,
                top_k: 32,
                top_p: 0.95,
                response_mime_type: json_mode.then(|| "application/json".to_string()),
            }),
        };

        let response = self
            .client
            .post(&url)
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
        let parsed: dto::GenerateContentResponse = serde_json::from_str(&body_text)
            .map_err(|e| AiError::Malformed(format!("failed to parse Gemini response: {}", e)))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| AiError::Malformed("Gemini response contained no candidates".to_string()))?;

        Ok(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        self.generate(prompt, false).await
    }

    async fn complete_structured(&self, prompt: &str) -> Result<String, AiError> {
        self.generate(prompt, true).await
    }
}
