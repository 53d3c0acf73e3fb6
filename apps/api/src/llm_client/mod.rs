//! LLM client: the single point of entry for all generation-service calls.
//!
//! ARCHITECTURAL RULE: No other module may talk to the generation service directly.
//! All LLM interactions MUST go through this module.
//!
//! Every call is made exactly once (no retry/backoff; that policy belongs to callers),
//! bounded by a timeout, and classified into a `GenerationOutcome` instead of a `Result`.
//! The timeout is one deadline per call: a schema fallback shares it with the
//! constrained attempt.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::time::{timeout_at, Instant as Deadline};
use tracing::{debug, warn};

use crate::models::resume::SchemaValidationError;

pub mod extract;
pub mod prompts;
#[cfg(test)]
pub mod testing;
pub mod transport;

use extract::{extract_first_json_object, strip_json_fences};
use prompts::{CONNECTION_CHECK_PROMPT, CONNECTION_CHECK_SYSTEM, JSON_ONLY_SYSTEM};
pub use transport::{ChatRequest, ChatResponse, ChatTransport, OpenAiTransport};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("schema validation failed: {0}")]
    Schema(#[from] SchemaValidationError),
}

impl LlmError {
    /// True when the service rejected the structured-output constraint itself,
    /// as opposed to failing to satisfy it.
    pub fn is_schema_unsupported(&self) -> bool {
        match self {
            LlmError::Api { status, message } if *status == 400 || *status == 422 => {
                let message = message.to_lowercase();
                message.contains("response_format")
                    || message.contains("json_schema")
                    || message.contains("structured output")
                    || (message.contains("schema") && message.contains("not supported"))
            }
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            LlmError::Timeout(_) => true,
            LlmError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// A record type the service can be asked to produce.
pub trait StructuredOutput: Sized {
    /// Name sent alongside the schema in the request.
    const SCHEMA_NAME: &'static str;

    fn json_schema() -> Value;

    /// Validates raw JSON text into the record, never panicking.
    fn from_json_str(raw: &str) -> Result<Self, SchemaValidationError>;
}

/// Token accounting and provenance for one generation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    /// False when the response came from the unconstrained fallback path.
    pub schema_constrained: bool,
    pub generated_at: Option<DateTime<Utc>>,
}

impl UsageMetadata {
    fn from_response(response: &ChatResponse, requested_model: &str, constrained: bool) -> Self {
        let tokens = response.usage.unwrap_or_default();
        let model = if response.model.is_empty() {
            requested_model.to_string()
        } else {
            response.model.clone()
        };
        Self {
            model,
            prompt_tokens: tokens.prompt_tokens,
            completion_tokens: tokens.completion_tokens,
            total_tokens: tokens.total_tokens,
            schema_constrained: constrained,
            generated_at: Some(Utc::now()),
        }
    }
}

/// The three ways a structured generation call can end.
#[derive(Debug)]
pub enum GenerationOutcome<T> {
    Parsed {
        value: T,
        usage: UsageMetadata,
    },
    Refusal {
        reason: String,
        usage: Option<UsageMetadata>,
    },
    Error {
        error: LlmError,
        usage: Option<UsageMetadata>,
    },
}

/// Result of a connectivity probe against the configured service.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionCheck {
    pub ok: bool,
    pub model: String,
    pub latency_ms: u64,
    pub message: String,
}

/// The single LLM client. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn ChatTransport>,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(transport: Arc<dyn ChatTransport>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            model: model.into(),
            timeout,
        }
    }

    /// Builds a client backed by the OpenAI chat-completions API.
    pub fn openai(
        api_key: String,
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let transport = OpenAiTransport::new(api_key, base_url, timeout)?;
        debug!("LLM transport endpoint: {}", transport.endpoint());
        Ok(Self::new(Arc::new(transport), model, timeout))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn deadline(&self) -> Deadline {
        Deadline::now() + self.timeout
    }

    /// One round trip that must finish by `deadline`. Dropping the returned
    /// future aborts the request.
    async fn send(&self, request: &ChatRequest, deadline: Deadline) -> Result<ChatResponse, LlmError> {
        match timeout_at(deadline, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout.as_secs())),
        }
    }

    /// Asks the service for a `T`, constrained by `T`'s JSON schema.
    ///
    /// If the service rejects the schema constraint, one unconstrained request is
    /// made instead and the first JSON object is extracted from its text. Both
    /// requests together are bounded by the client's timeout.
    pub async fn generate_structured<T: StructuredOutput>(
        &self,
        system: &str,
        user: &str,
        model_override: Option<&str>,
    ) -> GenerationOutcome<T> {
        let model = model_override
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.model)
            .to_string();
        let deadline = self.deadline();

        let constrained =
            ChatRequest::constrained(&model, system, user, T::SCHEMA_NAME, T::json_schema());

        match self.send(&constrained, deadline).await {
            Ok(response) => classify(response, &model, true),
            Err(error) if error.is_schema_unsupported() => {
                warn!(
                    "Model {} rejected the schema constraint ({}); falling back to unconstrained generation",
                    model, error
                );
                let system = format!("{system}\n\n{JSON_ONLY_SYSTEM}");
                let unconstrained = ChatRequest::unconstrained(&model, &system, user);
                match self.send(&unconstrained, deadline).await {
                    Ok(response) => classify(response, &model, false),
                    Err(error) => GenerationOutcome::Error { error, usage: None },
                }
            }
            Err(error) => GenerationOutcome::Error { error, usage: None },
        }
    }

    /// Sends a tiny unconstrained request to verify credentials and reachability.
    pub async fn check_connection(&self) -> ConnectionCheck {
        let request =
            ChatRequest::unconstrained(&self.model, CONNECTION_CHECK_SYSTEM, CONNECTION_CHECK_PROMPT)
                .with_max_tokens(8);
        let started = Instant::now();
        let result = self.send(&request, self.deadline()).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                let reply = response
                    .first_choice()
                    .and_then(|c| c.message.content.as_deref())
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                ConnectionCheck {
                    ok: true,
                    model: self.model.clone(),
                    latency_ms,
                    message: reply,
                }
            }
            Err(error) => {
                warn!("Connection check against model {} failed: {}", self.model, error);
                ConnectionCheck {
                    ok: false,
                    model: self.model.clone(),
                    latency_ms,
                    message: error.to_string(),
                }
            }
        }
    }
}

/// Maps a completed response onto an outcome.
fn classify<T: StructuredOutput>(
    response: ChatResponse,
    requested_model: &str,
    constrained: bool,
) -> GenerationOutcome<T> {
    let usage = UsageMetadata::from_response(&response, requested_model, constrained);

    let Some(choice) = response.first_choice() else {
        return GenerationOutcome::Error {
            error: LlmError::EmptyContent,
            usage: Some(usage),
        };
    };

    let refusal = choice
        .message
        .refusal
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    if let Some(reason) = refusal {
        return GenerationOutcome::Refusal {
            reason: reason.to_string(),
            usage: Some(usage),
        };
    }
    if choice.finish_reason.as_deref() == Some("content_filter") {
        return GenerationOutcome::Refusal {
            reason: "content_filter".to_string(),
            usage: Some(usage),
        };
    }

    let Some(text) = choice
        .message
        .content
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return GenerationOutcome::Error {
            error: LlmError::EmptyContent,
            usage: Some(usage),
        };
    };

    let parsed = if constrained {
        T::from_json_str(strip_json_fences(text))
    } else {
        match extract_first_json_object(text) {
            Some(json) => T::from_json_str(json),
            None => Err(SchemaValidationError::NoJsonObject),
        }
    };

    match parsed {
        Ok(value) => {
            debug!(
                "Structured output parsed: model={}, total_tokens={}",
                usage.model, usage.total_tokens
            );
            GenerationOutcome::Parsed { value, usage }
        }
        Err(e) => GenerationOutcome::Error {
            error: LlmError::Schema(e),
            usage: Some(usage),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{
        refusal_response, schema_unsupported_error, text_response, ScriptedTransport,
        SlowSchemaRejection, StalledTransport,
    };
    use super::*;
    use crate::models::resume::ResumeDocument;

    fn client(transport: Arc<dyn ChatTransport>) -> LlmClient {
        LlmClient::new(transport, "gpt-test", Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_parsed_outcome_carries_usage() {
        let transport = ScriptedTransport::new(vec![Ok(text_response(
            r#"{"summary": "Rust engineer", "skills": ["Rust"]}"#,
        ))]);
        let outcome = client(transport.clone())
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;

        match outcome {
            GenerationOutcome::Parsed { value, usage } => {
                assert_eq!(value.summary, "Rust engineer");
                assert_eq!(usage.total_tokens, 30);
                assert!(usage.schema_constrained);
            }
            other => panic!("expected Parsed, got {other:?}"),
        }

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].is_constrained());
        assert_eq!(requests[0].model, "gpt-test");
    }

    #[tokio::test]
    async fn test_constrained_output_tolerates_code_fences() {
        let transport = ScriptedTransport::new(vec![Ok(text_response(
            "```json\n{\"headline\": \"SRE\"}\n```",
        ))]);
        let outcome = client(transport)
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;
        assert!(matches!(outcome, GenerationOutcome::Parsed { ref value, .. } if value.headline == "SRE"));
    }

    #[tokio::test]
    async fn test_model_override_is_used() {
        let transport = ScriptedTransport::new(vec![Ok(text_response("{}"))]);
        let _ = client(transport.clone())
            .generate_structured::<ResumeDocument>("sys", "user", Some("gpt-4o-mini"))
            .await;
        assert_eq!(transport.requests()[0].model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_blank_model_override_falls_back_to_default() {
        let transport = ScriptedTransport::new(vec![Ok(text_response("{}"))]);
        let _ = client(transport.clone())
            .generate_structured::<ResumeDocument>("sys", "user", Some("  "))
            .await;
        assert_eq!(transport.requests()[0].model, "gpt-test");
    }

    #[tokio::test]
    async fn test_refusal_is_classified() {
        let transport = ScriptedTransport::new(vec![Ok(refusal_response("I can't assist with that."))]);
        let outcome = client(transport)
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;
        match outcome {
            GenerationOutcome::Refusal { reason, usage } => {
                assert_eq!(reason, "I can't assist with that.");
                assert!(usage.is_some());
            }
            other => panic!("expected Refusal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_content_filter_is_a_refusal() {
        let mut response = text_response("");
        response.choices[0].finish_reason = Some("content_filter".to_string());
        let transport = ScriptedTransport::new(vec![Ok(response)]);
        let outcome = client(transport)
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;
        assert!(matches!(outcome, GenerationOutcome::Refusal { ref reason, .. } if reason == "content_filter"));
    }

    #[tokio::test]
    async fn test_malformed_constrained_output_is_schema_error() {
        let transport = ScriptedTransport::new(vec![Ok(text_response(r#"{"skills": "Rust"}"#))]);
        let outcome = client(transport)
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;
        assert!(matches!(
            outcome,
            GenerationOutcome::Error {
                error: LlmError::Schema(SchemaValidationError::Malformed(_)),
                usage: Some(_),
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let transport = ScriptedTransport::new(vec![Ok(ChatResponse::default())]);
        let outcome = client(transport)
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;
        assert!(matches!(
            outcome,
            GenerationOutcome::Error {
                error: LlmError::EmptyContent,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_transport_error_is_error_without_usage() {
        let transport = ScriptedTransport::new(vec![Err(LlmError::Api {
            status: 401,
            message: "Incorrect API key provided".to_string(),
        })]);
        let outcome = client(transport.clone())
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;
        assert!(matches!(
            outcome,
            GenerationOutcome::Error {
                error: LlmError::Api { status: 401, .. },
                usage: None,
            }
        ));
        // No fallback request for errors other than a rejected schema constraint.
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_schema_rejection_falls_back_to_extraction() {
        let transport = ScriptedTransport::new(vec![
            Err(schema_unsupported_error()),
            Ok(text_response(
                "Sure! Here it is:\n{\"summary\": \"Data engineer\", \"skills\": [\"SQL\"]}\nThanks",
            )),
        ]);
        let outcome = client(transport.clone())
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;

        match outcome {
            GenerationOutcome::Parsed { value, usage } => {
                assert_eq!(value.skills, vec!["SQL"]);
                assert!(!usage.schema_constrained);
            }
            other => panic!("expected Parsed, got {other:?}"),
        }

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].is_constrained());
        assert!(!requests[1].is_constrained());
        assert!(requests[1].messages[0].content.contains(JSON_ONLY_SYSTEM));
    }

    #[tokio::test]
    async fn test_fallback_without_json_is_error() {
        let transport = ScriptedTransport::new(vec![
            Err(schema_unsupported_error()),
            Ok(text_response("I would rather write a poem.")),
        ]);
        let outcome = client(transport)
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;
        assert!(matches!(
            outcome,
            GenerationOutcome::Error {
                error: LlmError::Schema(SchemaValidationError::NoJsonObject),
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_service_times_out() {
        let client = LlmClient::new(Arc::new(StalledTransport), "gpt-test", Duration::from_secs(5));
        let outcome = client
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;
        match outcome {
            GenerationOutcome::Error { error, usage } => {
                assert!(error.is_timeout());
                assert!(usage.is_none());
            }
            other => panic!("expected timeout Error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_schema_fallback_shares_one_deadline() {
        let transport = SlowSchemaRejection::new(Duration::from_secs(4));
        let client = LlmClient::new(transport.clone(), "gpt-test", Duration::from_secs(5));

        let started = Deadline::now();
        let outcome = client
            .generate_structured::<ResumeDocument>("sys", "user", None)
            .await;
        let elapsed = started.elapsed();

        assert_eq!(transport.calls(), 2);
        assert!(matches!(outcome, GenerationOutcome::Error { ref error, .. } if error.is_timeout()));
        assert!(elapsed >= Duration::from_secs(5), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(6), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_check_connection_success_and_failure() {
        let transport = ScriptedTransport::new(vec![Ok(text_response("OK"))]);
        let check = client(transport.clone()).check_connection().await;
        assert!(check.ok);
        assert_eq!(check.message, "OK");
        assert_eq!(transport.requests()[0].max_tokens, Some(8));

        let transport = ScriptedTransport::new(vec![Err(LlmError::Api {
            status: 401,
            message: "bad key".to_string(),
        })]);
        let check = client(transport).check_connection().await;
        assert!(!check.ok);
        assert!(check.message.contains("401"));
    }

    #[test]
    fn test_schema_unsupported_detection() {
        assert!(schema_unsupported_error().is_schema_unsupported());
        assert!(!LlmError::Api {
            status: 500,
            message: "response_format".to_string()
        }
        .is_schema_unsupported());
        assert!(!LlmError::Api {
            status: 400,
            message: "maximum context length exceeded".to_string()
        }
        .is_schema_unsupported());
        assert!(!LlmError::EmptyContent.is_schema_unsupported());
    }
}
