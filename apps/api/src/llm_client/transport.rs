//! Wire types and transports for OpenAI-compatible chat-completions endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::LlmError;

const DEFAULT_TEMPERATURE: f32 = 0.2;

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: Value,
    /// Strict mode demands every property be required; the resume schema relies on defaults.
    pub strict: bool,
}

impl ChatRequest {
    /// A request whose output is constrained to `schema`.
    pub fn constrained(model: &str, system: &str, user: &str, name: &str, schema: Value) -> Self {
        Self {
            response_format: Some(ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: name.to_string(),
                    schema,
                    strict: false,
                },
            }),
            ..Self::unconstrained(model, system, user)
        }
    }

    /// A plain request without any output constraint.
    pub fn unconstrained(model: &str, system: &str, user: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            temperature: DEFAULT_TEMPERATURE,
            response_format: None,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn is_constrained(&self) -> bool {
        self.response_format.is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    /// Set by the service when it declines to produce structured output.
    #[serde(default)]
    pub refusal: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatResponse {
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Transport seam
// ────────────────────────────────────────────────────────────────────────────

/// Sends one chat-completions request. Implementations perform exactly one
/// round trip; timeouts and classification live in `LlmClient`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// Production transport for OpenAI and OpenAI-compatible services.
pub struct OpenAiTransport {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiTransport {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for OpenAiTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = parsed.usage {
            debug!(
                "Chat completion succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                parsed.model, usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constrained_request_serializes_json_schema_format() {
        let schema = serde_json::json!({"type": "object"});
        let request = ChatRequest::constrained("gpt-test", "sys", "user", "resume_document", schema);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-test");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "user");
        assert_eq!(value["response_format"]["type"], "json_schema");
        assert_eq!(value["response_format"]["json_schema"]["name"], "resume_document");
        assert_eq!(value["response_format"]["json_schema"]["strict"], false);
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_unconstrained_request_omits_response_format() {
        let request = ChatRequest::unconstrained("gpt-test", "sys", "user").with_max_tokens(8);
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("response_format").is_none());
        assert_eq!(value["max_tokens"], 8);
        assert!(!request.is_constrained());
    }

    #[test]
    fn test_response_with_refusal_deserializes() {
        let body = r#"{
            "model": "gpt-4o-2024-08-06",
            "choices": [{"message": {"role": "assistant", "content": null, "refusal": "I can't help with that."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let choice = response.first_choice().unwrap();
        assert_eq!(choice.message.refusal.as_deref(), Some("I can't help with that."));
        assert!(choice.message.content.is_none());
        assert_eq!(response.usage.unwrap().total_tokens, 17);
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let transport = OpenAiTransport::new(
            "sk-test".to_string(),
            "https://api.example.com/v1/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(transport.endpoint(), "https://api.example.com/v1/chat/completions");
    }
}
