use std::time::Duration;

use anyhow::{Context, Result};

use crate::render::fonts::DEFAULT_CJK_FONT;

pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub generation_timeout: Duration,
    /// Preferred CID font; `None` when CJK fonts are disabled.
    pub cjk_font: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let timeout_secs = get("GENERATION_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .context("GENERATION_TIMEOUT_SECS must be a whole number of seconds")?;

        let cjk_font = get("RESUME_CJK_FONT", DEFAULT_CJK_FONT);
        let cjk_font = (!cjk_font.eq_ignore_ascii_case("none")).then_some(cjk_font);

        Ok(Config {
            openai_api_key: require(&lookup, "OPENAI_API_KEY")?,
            openai_model: get("OPENAI_MODEL", DEFAULT_MODEL),
            openai_base_url: get("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            generation_timeout: Duration::from_secs(timeout_secs),
            cjk_font,
            port: get("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG", "info"),
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}
