use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
///
/// The Gemini key is optional at startup: without it the service still serves
/// the report store, and every formalization run fails with a configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub reports_file: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_max_attempts: u32,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let llm_max_attempts = get("LLM_MAX_ATTEMPTS")
            .unwrap_or_else(|| "3".to_string())
            .parse::<u32>()
            .context("LLM_MAX_ATTEMPTS must be a positive integer")?;
        if llm_max_attempts == 0 {
            anyhow::bail!("LLM_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            port: get("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            reports_file: get("REPORTS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("database.json")),
            gemini_api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_max_attempts,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
