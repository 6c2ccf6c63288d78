use std::env;

/// API credentials for the two LLM providers, read once at startup and
/// injected into the clients. A missing key is not a startup error: the
/// corresponding client degrades to per-call auth failures.
#[derive(Clone, Debug, Default)]
pub struct AiConfig {
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}
