pub mod activation;
pub mod commands;
pub mod config;
pub mod db;
pub mod drafting;
pub mod generator;
pub mod llm;
pub mod logging;
pub mod models;
pub mod outcome;
pub mod schedule;
pub mod store;
pub mod validation;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;
use tracing::{info, warn};

use config::AppConfig;
use db::AppState;
use llm::ClaudeClient;

/// Load configuration, start logging, open the database and build the
/// optional completion client.
pub async fn bootstrap() -> Result<AppState, Box<dyn std::error::Error>> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  logging::init(&config.log_filter);

  let pool = db::initialize_db(&config).await?;
  let mut state = AppState::new(pool);

  match &config.llm {
    Some(llm_config) => {
      state = state.with_completion(Arc::new(ClaudeClient::new(llm_config)?));
      info!(model = %llm_config.model, "AI drafting enabled");
    }
    None => warn!("ANTHROPIC_API_KEY not set; AI drafting disabled"),
  }

  Ok(state)
}
