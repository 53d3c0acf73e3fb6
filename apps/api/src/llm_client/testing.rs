//! Scripted transports for exercising `LlmClient` without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::transport::{AssistantMessage, ChatRequest, ChatResponse, ChatTransport, Choice, TokenUsage};
use super::LlmError;

/// Replays queued replies in order and records every request it sees.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<ChatResponse, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

/// Never answers; used to drive the client's timeout.
pub struct StalledTransport;

#[async_trait]
impl ChatTransport for StalledTransport {
    async fn send(&self, _request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        std::future::pending().await
    }
}

/// Rejects the schema constraint after `delay`, then never answers the fallback.
pub struct SlowSchemaRejection {
    pub delay: Duration,
    calls: AtomicUsize,
}

impl SlowSchemaRejection {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for SlowSchemaRejection {
    async fn send(&self, _request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(self.delay).await;
            return Err(schema_unsupported_error());
        }
        std::future::pending().await
    }
}

fn usage() -> Option<TokenUsage> {
    Some(TokenUsage {
        prompt_tokens: 20,
        completion_tokens: 10,
        total_tokens: 30,
    })
}

pub fn text_response(content: &str) -> ChatResponse {
    ChatResponse {
        model: "gpt-test".to_string(),
        choices: vec![Choice {
            message: AssistantMessage {
                content: Some(content.to_string()),
                refusal: None,
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: usage(),
    }
}

pub fn refusal_response(reason: &str) -> ChatResponse {
    ChatResponse {
        model: "gpt-test".to_string(),
        choices: vec![Choice {
            message: AssistantMessage {
                content: None,
                refusal: Some(reason.to_string()),
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: usage(),
    }
}

pub fn schema_unsupported_error() -> LlmError {
    LlmError::Api {
        status: 400,
        message: "Invalid parameter: 'response_format' of type 'json_schema' is not supported with this model."
            .to_string(),
    }
}
