//! Environment-based configuration
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file by `dotenvy` at startup.

use std::env;
use url::Url;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://training-planner.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_LLM_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_LLM_MODEL: &str = "claude-sonnet-4-20250514";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {var}: {reason}")]
  Invalid { var: &'static str, reason: String },
}

/// ---------------------------------------------------------------------------
/// Config Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,
  pub max_connections: u32,
  pub log_filter: String,
  /// None when no API key is configured; AI drafting is then unavailable
  pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
  pub api_key: String,
  pub base_url: Url,
  pub model: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let max_connections = match env::var("TRAINING_PLANNER_DB_MAX_CONNECTIONS") {
      Ok(raw) => parse_max_connections(&raw)?,
      Err(_) => DEFAULT_MAX_CONNECTIONS,
    };

    Ok(Self {
      database_url: env::var("TRAINING_PLANNER_DATABASE_URL")
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
      max_connections,
      log_filter: env::var("TRAINING_PLANNER_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
      llm: LlmConfig::from_env()?,
    })
  }
}

impl LlmConfig {
  pub fn from_env() -> Result<Option<Self>, ConfigError> {
    let api_key = match env::var("ANTHROPIC_API_KEY") {
      Ok(key) if !key.trim().is_empty() => key,
      _ => return Ok(None),
    };

    let raw_url = env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string());
    let base_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
      var: "ANTHROPIC_BASE_URL",
      reason: e.to_string(),
    })?;

    Ok(Some(Self {
      api_key,
      base_url,
      model: env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
    }))
  }
}

fn parse_max_connections(raw: &str) -> Result<u32, ConfigError> {
  let invalid = |reason: String| ConfigError::Invalid {
    var: "TRAINING_PLANNER_DB_MAX_CONNECTIONS",
    reason,
  };

  let value: u32 = raw.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
  if value == 0 {
    return Err(invalid("must be at least 1".to_string()));
  }
  Ok(value)
}
