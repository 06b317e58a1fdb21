//! Commands for creating, activating and reading training programs

use chrono::Utc;
use uuid::Uuid;

use super::{CommandFault, CommandResult};
use crate::activation;
use crate::db::AppState;
use crate::generator;
use crate::models::{GenerateProgramRequest, TrainingProgram};
use crate::outcome::Outcome;
use crate::store::{self, StoreError};

/// Generate (and optionally activate) a program from a weekly pattern
pub async fn generate_program(
  state: &AppState,
  request: GenerateProgramRequest,
) -> CommandResult<TrainingProgram> {
  generator::generate_program(&state.db, &request, Utc::now())
    .await
    .map_err(|e| CommandFault::capture("generate_program", e))
}

pub async fn activate_program(
  state: &AppState,
  user_id: Uuid,
  program_id: Uuid,
) -> CommandResult<TrainingProgram> {
  activation::activate_program(&state.db, user_id, program_id, Utc::now())
    .await
    .map_err(|e| CommandFault::capture("activate_program", e))
}

/// Full program graph, visible to its owner only
pub async fn get_program(
  state: &AppState,
  user_id: Uuid,
  program_id: Uuid,
) -> CommandResult<TrainingProgram> {
  let fault = |e: StoreError| CommandFault::capture("get_program", e);

  let mut conn = state.db.acquire().await.map_err(|e| fault(e.into()))?;
  let program = store::fetch_program(&mut conn, program_id).await.map_err(fault)?;

  Ok(match program {
    Some(program) if program.user_id == user_id => Outcome::success(program),
    Some(_) => Outcome::failure(format!("Training program {} belongs to a different user", program_id)),
    None => Outcome::failure(format!("Training program {} was not found", program_id)),
  })
}

/// The user's active program, if any
pub async fn get_active_program(
  state: &AppState,
  user_id: Uuid,
) -> CommandResult<Option<TrainingProgram>> {
  let fault = |e: StoreError| CommandFault::capture("get_active_program", e);

  let mut conn = state.db.acquire().await.map_err(|e| fault(e.into()))?;
  store::fetch_active_program(&mut conn, user_id)
    .await
    .map(Outcome::success)
    .map_err(fault)
}

/// All of the user's programs, newest first
pub async fn list_programs(
  state: &AppState,
  user_id: Uuid,
) -> CommandResult<Vec<TrainingProgram>> {
  let fault = |e: StoreError| CommandFault::capture("list_programs", e);

  let mut conn = state.db.acquire().await.map_err(|e| fault(e.into()))?;
  store::list_programs(&mut conn, user_id)
    .await
    .map(Outcome::success)
    .map_err(fault)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{mock_generate_request, setup_test_db, teardown_test_db};

  #[tokio::test]
  async fn test_generate_then_read_back() {
    let state = AppState::new(setup_test_db().await);
    let request = mock_generate_request(4);
    let user_id = request.user_id;

    let created = generate_program(&state, request)
      .await
      .unwrap()
      .into_result()
      .expect("Request should be valid");

    let fetched = get_program(&state, user_id, created.id).await.unwrap();
    assert_eq!(fetched.value(), Some(&created));

    let listed = list_programs(&state, user_id).await.unwrap();
    assert_eq!(listed.value().map(Vec::len), Some(1));

    let active = get_active_program(&state, user_id).await.unwrap();
    assert_eq!(active, Outcome::success(None));

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_invalid_request_is_failure_not_fault() {
    let state = AppState::new(setup_test_db().await);
    let mut request = mock_generate_request(0);
    request.name = String::new();

    let outcome = generate_program(&state, request).await.unwrap();
    assert_eq!(outcome.errors().len(), 2);

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_get_program_checks_owner() {
    let state = AppState::new(setup_test_db().await);
    let request = mock_generate_request(2);
    let created = generate_program(&state, request).await.unwrap().into_result().unwrap();

    let outcome = get_program(&state, Uuid::new_v4(), created.id).await.unwrap();
    assert!(outcome.errors()[0].contains("different user"));

    let outcome = get_program(&state, created.user_id, Uuid::new_v4()).await.unwrap();
    assert!(outcome.errors()[0].contains("not found"));

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_activate_through_command() {
    let state = AppState::new(setup_test_db().await);
    let request = mock_generate_request(4);
    let user_id = request.user_id;
    let created = generate_program(&state, request).await.unwrap().into_result().unwrap();

    let outcome = activate_program(&state, user_id, created.id).await.unwrap();
    assert!(outcome.is_success());

    let active = get_active_program(&state, user_id).await.unwrap().into_result().unwrap();
    assert_eq!(active.map(|p| p.id), Some(created.id));

    let again = activate_program(&state, user_id, created.id).await.unwrap();
    assert!(again.errors()[0].contains("already active"));

    teardown_test_db(state.db).await;
  }

  #[tokio::test]
  async fn test_store_failure_becomes_fault() {
    let pool = setup_test_db().await;
    pool.close().await;
    let state = AppState::new(pool);

    let fault = list_programs(&state, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(fault.message, "list_programs could not be completed");
  }
}
