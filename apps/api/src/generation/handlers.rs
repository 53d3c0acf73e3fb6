//! Axum route handlers for the Resume API.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::errors::AppError;
use crate::generation::generator::{generate_resume, generate_resume_pdf, render_document};
use crate::generation::reconciler::GenerationResult;
use crate::llm_client::ConnectionCheck;
use crate::models::profile::ProfileInput;
use crate::models::resume::ResumeDocument;
use crate::render::RenderedResume;
use crate::state::AppState;

pub const GENERATION_SUCCESS_HEADER: &str = "x-generation-success";
pub const PAGE_COUNT_HEADER: &str = "x-page-count";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub profile: ProfileInput,
    /// Overrides the configured model for this request only.
    #[serde(default)]
    pub model: Option<String>,
}

impl GenerateRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.profile.name.trim().is_empty() {
            return Err(AppError::Validation("profile.name cannot be empty".to_string()));
        }
        if self.profile.email.trim().is_empty() {
            return Err(AppError::Validation("profile.email cannot be empty".to_string()));
        }
        Ok(())
    }
}

fn pdf_response(rendered: RenderedResume, generation_success: Option<bool>) -> Response {
    let mut response = (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment; filename=\"resume.pdf\""),
            ),
        ],
        Bytes::from(rendered.bytes),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(PAGE_COUNT_HEADER, HeaderValue::from(rendered.page_count));
    if let Some(success) = generation_success {
        headers.insert(
            GENERATION_SUCCESS_HEADER,
            HeaderValue::from_static(if success { "true" } else { "false" }),
        );
    }
    response
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/generate
///
/// Compose → generate → reconcile. Always 200 once the request validates;
/// generation failures are reported in the body (`success: false`).
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerationResult>, AppError> {
    request.validate()?;
    let result = generate_resume(&state.llm, &request.profile, request.model.as_deref()).await;
    Ok(Json(result))
}

/// POST /api/v1/resumes/generate/pdf
///
/// Same pipeline as `handle_generate`, rendered straight to PDF. The fallback
/// document is rendered too; `x-generation-success` tells the two apart.
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    request.validate()?;
    let generated = generate_resume_pdf(
        &state.llm,
        &state.fonts,
        &state.page_config,
        &request.profile,
        request.model.as_deref(),
    )
    .await?;
    Ok(pdf_response(generated.rendered, Some(generated.result.success)))
}

/// POST /api/v1/resumes/render
///
/// Renders a caller-supplied (possibly edited) document without calling the model.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(document): Json<ResumeDocument>,
) -> Result<Response, AppError> {
    let rendered = render_document(
        document.normalized(),
        state.fonts.clone(),
        state.page_config.clone(),
    )
    .await?;
    Ok(pdf_response(rendered, None))
}

/// POST /api/v1/llm/check
///
/// Verifies credentials and reachability of the configured model.
pub async fn handle_llm_check(State(state): State<AppState>) -> Json<ConnectionCheck> {
    Json(state.llm.check_connection().await)
}
