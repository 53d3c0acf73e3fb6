//! Resume generation: orchestrates the full pipeline.
//!
//! Flow: compose_prompt → LlmClient::generate_structured → reconcile
//!       (traceability guard included) → optional render.
//!
//! The pipeline is strictly sequential and request-scoped. The generation call
//! is the only suspension point; rendering is CPU-bound and runs on the
//! blocking pool.

use tracing::info;

use crate::errors::AppError;
use crate::generation::composer::compose_prompt;
use crate::generation::reconciler::{reconcile, GenerationResult};
use crate::layout::PageConfig;
use crate::llm_client::LlmClient;
use crate::models::profile::ProfileInput;
use crate::models::resume::ResumeDocument;
use crate::render::{render_resume, FontRegistry, RenderedResume};

/// A generation result together with its rendered PDF.
#[derive(Debug)]
pub struct GeneratedPdf {
    pub result: GenerationResult,
    pub rendered: RenderedResume,
}

/// Runs composition, generation and reconciliation for one profile.
///
/// Never fails: refusals and faults come back as a `GenerationResult` with
/// `success == false` and a fallback document.
pub async fn generate_resume(
    llm: &LlmClient,
    profile: &ProfileInput,
    model_override: Option<&str>,
) -> GenerationResult {
    let prompt = compose_prompt(profile);
    info!(
        "Generating resume: language={}, model={}, prompt_chars={}",
        profile.language.code(),
        model_override.unwrap_or(llm.model()),
        prompt.user.chars().count()
    );

    let outcome = llm
        .generate_structured::<ResumeDocument>(&prompt.system, &prompt.user, model_override)
        .await;

    reconcile(outcome, profile)
}

/// Generates a resume and renders whatever document came back, fallback included.
pub async fn generate_resume_pdf(
    llm: &LlmClient,
    fonts: &FontRegistry,
    page_config: &PageConfig,
    profile: &ProfileInput,
    model_override: Option<&str>,
) -> Result<GeneratedPdf, AppError> {
    let result = generate_resume(llm, profile, model_override).await;
    let rendered = render_document(result.document.clone(), fonts.clone(), page_config.clone()).await?;
    Ok(GeneratedPdf { result, rendered })
}

/// Renders on the blocking pool so layout and PDF emission never stall the executor.
pub async fn render_document(
    document: ResumeDocument,
    fonts: FontRegistry,
    page_config: PageConfig,
) -> Result<RenderedResume, AppError> {
    let rendered = tokio::task::spawn_blocking(move || render_resume(&document, &fonts, &page_config))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed while rendering: {e}")))??;

    info!(
        "Rendered resume: pages={}, font={}, bytes={}",
        rendered.page_count,
        rendered.font_name,
        rendered.bytes.len()
    );
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::layout::default_page_config;
    use crate::llm_client::testing::{refusal_response, text_response, ScriptedTransport};
    use crate::models::resume::Language;

    fn profile() -> ProfileInput {
        ProfileInput {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            skills: "Rust, Go".to_string(),
            experience_text: "Acme, backend engineer, 2020-2023".to_string(),
            language: Language::En,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_pipeline_returns_grounded_document() {
        let transport = ScriptedTransport::new(vec![Ok(text_response(
            r#"{"language": "zh", "contact": {"name": "Jane"}, "skills": ["Rust", "Go"],
                "experience": [{"company": "Acme", "role": "Backend Engineer", "bullets": ["Built APIs"]}]}"#,
        ))]);
        let llm = LlmClient::new(transport.clone(), "gpt-test", Duration::from_secs(30));

        let result = generate_resume(&llm, &profile(), None).await;

        assert!(result.success);
        assert_eq!(result.document.language, Language::En);
        assert_eq!(result.document.contact.name, "Jane Doe");
        assert_eq!(result.document.skills, vec!["Rust", "Go"]);

        let request = &transport.requests()[0];
        assert!(request.messages[1].content.contains("Name: Jane Doe"));
    }

    #[tokio::test]
    async fn test_pipeline_renders_fallback_on_refusal() {
        let transport = ScriptedTransport::new(vec![Ok(refusal_response("no"))]);
        let llm = LlmClient::new(transport, "gpt-test", Duration::from_secs(30));
        let fonts = FontRegistry::new(None);
        let page_config = default_page_config();

        let generated = generate_resume_pdf(&llm, &fonts, &page_config, &profile(), None)
            .await
            .unwrap();

        assert!(!generated.result.success);
        assert_eq!(generated.rendered.page_count, 1);
        assert!(generated.rendered.bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_render_document_off_thread() {
        let document = ResumeDocument {
            contact: crate::models::resume::Contact {
                name: "Jane Doe".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let rendered = render_document(document, FontRegistry::new(None), default_page_config())
            .await
            .unwrap();
        assert_eq!(rendered.font_name, "Helvetica");
    }
}
