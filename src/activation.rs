//! Activation State Machine
//!
//! A program is either Inactive or Active. Activating one program
//! deactivates every other active program of the same user in the same
//! transaction, so storage never holds zero-or-two actives mid-switch.
//! There is no standalone deactivate; a program stays active until another
//! one replaces it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::models::TrainingProgram;
use crate::outcome::Outcome;
use crate::store::{self, StoreError};
use crate::validation::{self, RuleSet, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActivationState {
  Inactive,
  Active { activated_at: DateTime<Utc> },
}

impl ActivationState {
  pub fn of(program: &TrainingProgram) -> Self {
    if program.is_active {
      ActivationState::Active {
        // Rows activated before timestamps were recorded fall back to creation
        activated_at: program.activated_at.unwrap_or(program.created_at),
      }
    } else {
      ActivationState::Inactive
    }
  }
}

/// Why an activation request was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivationRejection {
  #[error("Training program {0} was not found")]
  NotFound(Uuid),

  #[error("Training program {0} belongs to a different user")]
  NotOwner(Uuid),

  #[error("Training program {0} is already active")]
  AlreadyActive(Uuid),
}

/// Identifiers an activation request must carry
#[derive(Debug, Clone, Copy)]
struct ActivationTarget {
  user_id: Uuid,
  program_id: Uuid,
}

impl Validate for ActivationTarget {
  fn rules() -> RuleSet<Self> {
    RuleSet::new()
      .rule("User id is required", |t: &ActivationTarget| !t.user_id.is_nil())
      .rule("Program id is required", |t: &ActivationTarget| {
        !t.program_id.is_nil()
      })
  }
}

/// Preconditions for `Inactive -> Active`
pub fn check_activation(
  program: Option<TrainingProgram>,
  program_id: Uuid,
  user_id: Uuid,
) -> Result<TrainingProgram, ActivationRejection> {
  let program = program.ok_or(ActivationRejection::NotFound(program_id))?;

  if program.user_id != user_id {
    return Err(ActivationRejection::NotOwner(program_id));
  }

  match ActivationState::of(&program) {
    ActivationState::Active { .. } => Err(ActivationRejection::AlreadyActive(program_id)),
    ActivationState::Inactive => Ok(program),
  }
}

/// Clear the user's other active programs and flip `program` to Active in
/// memory. The caller persists `program` on the same connection.
pub(crate) async fn promote(
  conn: &mut SqliteConnection,
  program: &mut TrainingProgram,
  now: DateTime<Utc>,
) -> Result<u64, StoreError> {
  let deactivated = store::deactivate_user_programs(conn, program.user_id, program.id).await?;
  program.is_active = true;
  program.activated_at = Some(now);
  Ok(deactivated)
}

/// Activate a program for its owner
pub async fn activate_program(
  pool: &SqlitePool,
  user_id: Uuid,
  program_id: Uuid,
  now: DateTime<Utc>,
) -> Result<Outcome<TrainingProgram>, StoreError> {
  if let Outcome::Failure(errors) = validation::check(&ActivationTarget { user_id, program_id }) {
    return Ok(Outcome::Failure(errors));
  }

  let mut tx = pool.begin().await?;

  let fetched = store::fetch_program(&mut tx, program_id).await?;
  let mut program = match check_activation(fetched, program_id, user_id) {
    Ok(program) => program,
    // Dropping the transaction rolls it back; nothing was written
    Err(rejection) => return Ok(Outcome::failure(rejection.to_string())),
  };

  let deactivated = promote(&mut tx, &mut program, now).await?;
  store::save_activation(&mut tx, &program).await?;
  tx.commit().await?;

  info!(
    program_id = %program.id,
    user_id = %user_id,
    deactivated,
    "Activated training program"
  );

  Ok(Outcome::success(program))
}
