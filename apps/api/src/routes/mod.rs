pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/api/v1/resumes/generate", post(handlers::handle_generate))
        .route(
            "/api/v1/resumes/generate/pdf",
            post(handlers::handle_generate_pdf),
        )
        .route("/api/v1/resumes/render", post(handlers::handle_render))
        // Service diagnostics
        .route("/api/v1/llm/check", post(handlers::handle_llm_check))
        .with_state(state)
}
