//! Environment-sourced application configuration
//!
//! Required keys fail fast at startup; everything else has a default.

use crate::{Error, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the OpenAI-compatible chat gateway.
    pub llm_api_key: String,
    /// Base URL of the chat gateway, including any path prefix.
    pub llm_base_url: String,
    /// Chat model identifier.
    pub llm_model: String,

    /// API key for the Gemini image API.
    pub gemini_api_key: String,
    /// Gemini image model identifier.
    pub gemini_image_model: String,
    /// Safety filter threshold applied to every image request.
    pub gemini_safety_threshold: String,

    /// Directory where uploaded and generated images are stored.
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,

    /// Requests admitted per client within one rate-limit window.
    pub rate_limit_requests: usize,
    /// Rate-limit window length in seconds.
    pub rate_limit_window_secs: u64,

    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            llm_api_key: require("LLM_API_KEY")?,
            llm_base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.lunos.tech/v1".to_string()),
            llm_model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| "google/gemma-3-12b-it".to_string()),
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_image_model: std::env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash-preview-image-generation".to_string()),
            gemini_safety_threshold: std::env::var("GEMINI_SAFETY_THRESHOLD")
                .unwrap_or_else(|_| "BLOCK_MEDIUM_AND_ABOVE".to_string()),
            upload_dir: PathBuf::from(
                std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            ),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            rate_limit_requests: parse_var("RATE_LIMIT_REQUESTS", 100)?,
            rate_limit_window_secs: parse_var("RATE_LIMIT_WINDOW_SECS", 3600)?,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8000)?,
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{} not set", name)))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
