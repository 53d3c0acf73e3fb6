//! Folds a `GenerationOutcome` into one well-typed `GenerationResult`.
//!
//! Every failure path still yields a renderable document built only from the
//! user's own contact fields. Raw faults are logged here and never leave this
//! module; callers only see the coarse `FailureClass`.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::generation::grounding::{enforce_traceability, GroundingViolation};
use crate::llm_client::{GenerationOutcome, LlmError, UsageMetadata};
use crate::models::profile::ProfileInput;
use crate::models::resume::{Contact, Language, ResumeDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Refusal,
    Transport,
    Timeout,
    ServiceError,
    SchemaValidation,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::Refusal => "refusal",
            FailureClass::Transport => "transport",
            FailureClass::Timeout => "timeout",
            FailureClass::ServiceError => "service_error",
            FailureClass::SchemaValidation => "schema_validation",
        }
    }

    fn from_error(error: &LlmError) -> Self {
        match error {
            e if e.is_timeout() => FailureClass::Timeout,
            LlmError::Http(_) => FailureClass::Transport,
            LlmError::Api { .. } => FailureClass::ServiceError,
            LlmError::EmptyContent | LlmError::Schema(_) => FailureClass::SchemaValidation,
            LlmError::Timeout(_) => FailureClass::Timeout,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub document: ResumeDocument,
    pub success: bool,
    pub usage: UsageMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureClass>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub grounding_violations: Vec<GroundingViolation>,
}

pub fn reconcile(outcome: GenerationOutcome<ResumeDocument>, profile: &ProfileInput) -> GenerationResult {
    match outcome {
        GenerationOutcome::Parsed { value, usage } => {
            let (document, grounding_violations) = enforce_traceability(value, profile);
            info!(
                "Resume generated: model={}, total_tokens={}, schema_constrained={}, violations={}",
                usage.model,
                usage.total_tokens,
                usage.schema_constrained,
                grounding_violations.len()
            );
            GenerationResult {
                document,
                success: true,
                usage,
                failure: None,
                grounding_violations,
            }
        }
        GenerationOutcome::Refusal { reason, usage } => {
            warn!("Generation service refused to produce a resume: {}", reason);
            failed(FailureClass::Refusal, usage, profile)
        }
        GenerationOutcome::Error { error, usage } => {
            let class = FailureClass::from_error(&error);
            error!("Resume generation failed ({}): {}", class.as_str(), error);
            failed(class, usage, profile)
        }
    }
}

fn failed(class: FailureClass, usage: Option<UsageMetadata>, profile: &ProfileInput) -> GenerationResult {
    GenerationResult {
        document: fallback_document(profile, class),
        success: false,
        usage: usage.unwrap_or_default(),
        failure: Some(class),
        grounding_violations: Vec::new(),
    }
}

/// The document returned when generation did not succeed: the user's name,
/// email and phone verbatim, a diagnostic summary, and nothing else.
pub fn fallback_document(profile: &ProfileInput, class: FailureClass) -> ResumeDocument {
    ResumeDocument {
        language: profile.language,
        contact: Contact {
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            ..Default::default()
        },
        summary: fallback_summary(profile.language, class),
        ..Default::default()
    }
}

fn fallback_summary(language: Language, class: FailureClass) -> String {
    match language {
        Language::Zh => format!(
            "AI 未能生成简历（{}），请检查输入后重试。",
            class.as_str()
        ),
        Language::En => format!(
            "The resume could not be generated ({}). Please review your input and try again.",
            class.as_str()
        ),
    }
}
