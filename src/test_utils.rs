//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Request and program factories
//! - Time helpers
//! - Helper assertions

use crate::generator::build_program;
use crate::models::{
  DayPatternEntry, ExercisePrescription, GenerateProgramRequest, Provenance, TrainingProgram,
};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Build and insert an inactive program for `user_id`
pub async fn seed_program(pool: &SqlitePool, user_id: Uuid, duration_weeks: i64) -> TrainingProgram {
  let mut request = mock_generate_request(duration_weeks);
  request.user_id = user_id;
  let program = build_program(&request, Utc::now())
    .into_result()
    .expect("Mock request should be valid");

  let mut conn = pool.acquire().await.expect("Failed to acquire connection");
  crate::store::insert_program_graph(&mut conn, &program)
    .await
    .expect("Failed to seed program");

  program
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Prescription with a fixed 8-12 rep range
pub fn mock_prescription(order_index: u32, set_count: u32) -> ExercisePrescription {
  ExercisePrescription {
    exercise_id: Uuid::new_v4(),
    order_index,
    set_count,
    min_reps: 8,
    max_reps: 12,
    rest_seconds: 90,
    progression_rule: Some("double_progression".to_string()),
  }
}

pub fn training_entry(day: &str, focus: &str, exercises: Vec<ExercisePrescription>) -> DayPatternEntry {
  DayPatternEntry {
    day_of_week: day.to_string(),
    is_rest_day: false,
    focus: Some(focus.to_string()),
    estimated_duration_minutes: Some(60),
    exercises: Some(exercises),
  }
}

pub fn rest_entry(day: &str) -> DayPatternEntry {
  DayPatternEntry {
    day_of_week: day.to_string(),
    is_rest_day: true,
    focus: None,
    estimated_duration_minutes: None,
    exercises: None,
  }
}

/// Monday/Wednesday/Friday training with 3 exercises each, rest otherwise
pub fn mock_generate_request(duration_weeks: i64) -> GenerateProgramRequest {
  let three_exercises = || vec![mock_prescription(0, 5), mock_prescription(1, 3), mock_prescription(2, 1)];

  GenerateProgramRequest {
    user_id: Uuid::new_v4(),
    name: "Strength Block".to_string(),
    duration_weeks,
    goal_description: Some("Build base strength".to_string()),
    provenance: Provenance::Human,
    day_pattern: vec![
      training_entry("Monday", "Lower Body", three_exercises()),
      rest_entry("Tuesday"),
      training_entry("Wednesday", "Upper Body", three_exercises()),
      rest_entry("Thursday"),
      training_entry("Friday", "Full Body", three_exercises()),
      rest_entry("Saturday"),
      rest_entry("Sunday"),
    ],
    activate_immediately: false,
  }
}

/// Built (not persisted) program with the mock pattern
pub fn mock_program(user_id: Uuid, duration_weeks: i64) -> TrainingProgram {
  let mut request = mock_generate_request(duration_weeks);
  request.user_id = user_id;
  build_program(&request, Utc::now())
    .into_result()
    .expect("Mock request should be valid")
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Fixed UTC instant
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
    .single()
    .expect("Invalid test date")
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    // Verify key tables exist
    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('training_programs', 'program_weeks', 'program_days', 'workout_templates', 'template_exercises')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 5, "Expected 5 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_program_inserts_graph() {
    let pool = setup_test_db().await;

    seed_program(&pool, Uuid::new_v4(), 4).await;

    let weeks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM program_weeks")
      .fetch_one(&pool)
      .await
      .expect("Failed to count weeks");
    assert_eq!(weeks, 4);

    // 3 training days per week, one template each
    let templates: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_templates")
      .fetch_one(&pool)
      .await
      .expect("Failed to count templates");
    assert_eq!(templates, 12);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let request = mock_generate_request(8);
    assert_eq!(request.day_pattern.len(), 7);
    assert!(crate::validation::check(&request).is_success());

    let program = mock_program(Uuid::new_v4(), 8);
    assert_eq!(program.weeks.len(), 8);
    assert!(program.invariant_violations().is_empty());
  }
}
