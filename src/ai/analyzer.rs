use std::sync::Arc;

use serde::Serialize;

use crate::ai::{AiError, LlmClient};

/// Character ceiling for a single prompt. The underlying models have a
/// bounded context window; anything above this is rejected before the
/// network call is made.
pub const MAX_PROMPT_CHARS: usize = 80_000;

/// Envelope returned to callers of the analyze surface. Absence of `error`
/// means `result` is usable.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    fn ok(result: String) -> Self {
        Self { result, error: None }
    }

    fn err(message: String) -> Self {
        Self { result: String::new(), error: Some(message) }
    }
}

/// Prompt-driven text analysis over one completion provider.
pub struct Analyzer {
    llm: Arc<dyn LlmClient>,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Length-guarded completion. The guard fires before any external call.
    pub async fn complete_guarded(&self, prompt: &str) -> Result<String, AiError> {
        let len = prompt.chars().count();
        if len > MAX_PROMPT_CHARS {
            return Err(AiError::TooLong { len, max: MAX_PROMPT_CHARS });
        }
        self.llm.complete(prompt).await
    }

    /// Completion wrapped in the non-throwing `AnalysisResult` envelope.
    pub async fn analyze(&self, prompt: &str) -> AnalysisResult {
        match self.complete_guarded(prompt).await {
            Ok(text) => AnalysisResult::ok(text),
            Err(e) => AnalysisResult::err(e.to_string()),
        }
    }

    /// Structured-extraction variant: expects the completion to contain a
    /// JSON object, possibly wrapped in explanatory prose, and returns the
    /// parsed object.
    pub async fn extract_json(&self, prompt: &str) -> Result<serde_json::Value, AiError> {
        let len = prompt.chars().count();
        if len > MAX_PROMPT_CHARS {
            return Err(AiError::TooLong { len, max: MAX_PROMPT_CHARS });
        }
        let completion = self.llm.complete_structured(prompt).await?;
        let span = find_json_object(&completion).ok_or_else(|| {
            AiError::Malformed("completion contained no JSON object".to_string())
        })?;
        serde_json::from_str(span)
            .map_err(|e| AiError::Malformed(format!("failed to parse completion JSON: {}", e)))
    }
}

/// Locates the first balanced `{...}` span in free-form text. Models often
/// wrap their JSON in prose or markdown fences, so a plain parse of the
/// whole completion is not enough. Brace depth is tracked outside string
/// literals only.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
