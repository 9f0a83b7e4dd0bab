//! Runtime configuration from the environment.

use std::env;

use tracing::warn;

use crate::error::ConfigError;
use crate::llm::DEFAULT_MODEL;
use crate::llm::gemini::DEFAULT_BASE_URL;

pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GIT_AI_MODEL";
pub const BASE_BRANCH_VAR: &str = "GIT_AI_BASE_BRANCH";
pub const REMOTE_VAR: &str = "GIT_AI_REMOTE";
pub const API_BASE_VAR: &str = "GEMINI_API_BASE";

pub const DEFAULT_BASE_BRANCH: &str = "main";
pub const DEFAULT_REMOTE: &str = "origin";

/// Settings for a run. CLI flags override these after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub gemini_api_key: String,
    pub model: String,
    pub base_branch: String,
    pub remote: String,
    pub api_base: String,
}

impl Config {
    /// Read configuration from environment variables.
    ///
    /// Only the Gemini key is required. Optional values that are set but blank
    /// or contain whitespace fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let gemini_api_key = env::var(GEMINI_API_KEY_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingGeminiKey)?;

        Ok(Self {
            gemini_api_key,
            model: optional_var(MODEL_VAR, DEFAULT_MODEL),
            base_branch: optional_var(BASE_BRANCH_VAR, DEFAULT_BASE_BRANCH),
            remote: optional_var(REMOTE_VAR, DEFAULT_REMOTE),
            api_base: optional_var(API_BASE_VAR, DEFAULT_BASE_URL),
        })
    }
}

fn optional_var(name: &str, default: &str) -> String {
    let Ok(raw) = env::var(name) else {
        return default.to_string();
    };

    let value = raw.trim();
    if value.is_empty() || value.contains(char::is_whitespace) {
        warn!("Ignoring invalid {name}={raw:?}; using {default}");
        return default.to_string();
    }

    value.to_string()
}
