use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::llm::TextCompletion;

pub type DbPool = SqlitePool;

/// Application state shared by every command
#[derive(Clone)]
pub struct AppState {
  pub db: DbPool,
  /// Present only when an API key is configured
  pub completion: Option<Arc<dyn TextCompletion>>,
}

impl AppState {
  pub fn new(db: DbPool) -> Self {
    Self { db, completion: None }
  }

  pub fn with_completion(mut self, completion: Arc<dyn TextCompletion>) -> Self {
    self.completion = Some(completion);
    self
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &AppConfig) -> Result<DbPool, sqlx::Error> {
  info!(url = %config.database_url, "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}
