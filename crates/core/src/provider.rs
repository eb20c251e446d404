use async_trait::async_trait;
use tracing::debug;

use crate::{error::ExtractionError, source::ExtractionService};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Missing API key for {provider_name}: {env_var} environment variable is not set")]
    MissingApiKey {
        provider_name: String,
        env_var: String,
    },
}

#[derive(Clone, Debug, Default)]
pub enum Provider {
    #[default]
    Openai,
    Grok,
    Gemini,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub topic_model: &'static str,
    pub analysis_model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                topic_model: "gpt-4o",
                analysis_model: "gpt-4o-mini",
                env_var: "OPENAI_API_KEY",
            },
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1/chat/completions",
                topic_model: "grok-4-fast",
                analysis_model: "grok-4-fast",
                env_var: "XAI_API_KEY",
            },
            Provider::Gemini => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                topic_model: "gemini-2.5-flash",
                analysis_model: "gemini-2.5-flash",
                env_var: "GEMINI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Openai => "OpenAI",
            Provider::Grok => "Grok",
            Provider::Gemini => "Gemini",
        }
    }

    /// Validate that the API key is set for this provider
    pub fn validate_api_key(&self) -> Result<String, ProviderError> {
        let config = self.config();
        std::env::var(config.env_var).map_err(|_| ProviderError::MissingApiKey {
            provider_name: self.name().to_string(),
            env_var: config.env_var.to_string(),
        })
    }

    /// Chat client tuned for one-line topic extraction.
    pub fn topic_client(&self) -> Result<ChatClient, ProviderError> {
        let config = self.config();
        Ok(ChatClient::new(config.api_url, config.topic_model, self.validate_api_key()?)
            .with_temperature(0.5)
            .with_max_tokens(150))
    }

    /// Chat client tuned for structured transcript analysis.
    pub fn analysis_client(&self) -> Result<ChatClient, ProviderError> {
        let config = self.config();
        Ok(
            ChatClient::new(config.api_url, config.analysis_model, self.validate_api_key()?)
                .with_temperature(0.5)
                .with_max_tokens(500),
        )
    }
}

static SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            model: model.into(),
            api_key,
            temperature: 0.3,
            max_tokens: 500,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Pull `choices[0].message.content` out of a chat completions response.
pub(crate) fn message_content(response: &serde_json::Value) -> Result<String, ExtractionError> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ExtractionError::MissingContent {
            reason: format!("no message content in {}", response),
        })
}

#[async_trait]
impl ExtractionService for ChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, ExtractionError> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "sending chat completion");

        let response = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": SYSTEM_PROMPT,
                    },
                    {
                        "role": "user",
                        "content": prompt,
                    },
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response = response.json::<serde_json::Value>().await?;
        message_content(&response)
    }
}
