/// LLM API integration module
/// Structured interpretation through a Claude-style messages endpoint

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fetch::parse_json_object;
use crate::interpret::{ExtractionError, Schema, StructuredInterpreter};
use crate::prompts::system_prompt_for;

pub const DEFAULT_LLM_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_LLM_MODEL: &str = "claude-3-haiku-20240307";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClaudeMessage {
    pub role: String,
    pub content: String,
}

/// Messages API request
#[derive(Debug, Serialize)]
pub struct ClaudeRequest {
    pub model: String,
    pub max_tokens: i32,
    pub system: String,
    pub messages: Vec<ClaudeMessage>,
}

/// Messages API response
#[derive(Debug, Deserialize)]
pub struct ClaudeResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: String,
}

/// Interpreter that asks a language model for a JSON value of the schema
pub struct LlmInterpreter {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmInterpreter {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Send one extraction request and return the raw reply text
    async fn call_claude(&self, system: String, user_input: &str) -> Result<String, ExtractionError> {
        let request = ClaudeRequest {
            model: self.config.model.clone(),
            max_tokens: 256,
            system,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: user_input.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api(format!("{}: {}", status, error_text)));
        }

        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Api(format!("Unreadable response: {}", e)))?;

        tracing::debug!("[LLM] stop_reason={}", claude_response.stop_reason);

        claude_response
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or_else(|| ExtractionError::Api("No response from model".to_string()))
    }
}

#[async_trait]
impl StructuredInterpreter for LlmInterpreter {
    async fn interpret(&self, schema: Schema, text: &str) -> Result<Value, ExtractionError> {
        tracing::debug!("[LLM] Calling {} for {} extraction", self.config.model, schema.name());
        let reply = self.call_claude(system_prompt_for(schema), text).await?;
        tracing::debug!("[LLM] Reply for {}: '{}'", schema.name(), reply);

        parse_json_object(&reply).map_err(|reason| ExtractionError::Malformed {
            schema: schema.name(),
            reason,
        })
    }
}
