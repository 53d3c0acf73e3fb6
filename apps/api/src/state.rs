use crate::config::Config;
use crate::layout::PageConfig;
use crate::llm_client::LlmClient;
use crate::render::FontRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Immutable after startup; every request works on its own data.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Preferred CJK font, resolved per render with Helvetica fallback.
    pub fonts: FontRegistry,
    /// Page geometry and typography for rendered resumes (A4).
    pub page_config: PageConfig,
    pub config: Config,
}
