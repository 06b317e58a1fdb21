//! Caller-facing commands
//!
//! Every command returns `CommandResult<T>`. Expected failures (bad input,
//! wrong owner, already active) come back as `Ok(Outcome::Failure)`.
//! Infrastructure faults are logged under a fresh correlation id and
//! surfaced as an opaque `CommandFault`.

pub mod drafting;
pub mod programs;

use chrono::Local;
use serde::Serialize;
use std::fmt::Display;
use tracing::error;
use uuid::Uuid;

use crate::db::AppState;
use crate::outcome::Outcome;
use crate::schedule::{self, TodayEntry};

pub use drafting::draft_program;
pub use programs::{activate_program, generate_program, get_active_program, get_program, list_programs};

/// Opaque infrastructure failure; details are only in the logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message} (reference {correlation_id})")]
pub struct CommandFault {
  pub correlation_id: Uuid,
  pub message: String,
}

pub type CommandResult<T> = Result<Outcome<T>, CommandFault>;

impl CommandFault {
  /// Log `cause` and return a fault that carries only the correlation id
  pub(crate) fn capture(command: &'static str, cause: impl Display) -> Self {
    let correlation_id = Uuid::new_v4();
    error!(
      correlation_id = %correlation_id,
      command,
      error = %cause,
      "Command failed"
    );

    Self {
      correlation_id,
      message: format!("{} could not be completed", command),
    }
  }
}

/// What the user's active program prescribes for today, in local time
pub async fn get_today(state: &AppState, user_id: Uuid) -> CommandResult<TodayEntry> {
  schedule::resolve_today(&state.db, user_id, Local::now())
    .await
    .map(Outcome::success)
    .map_err(|e| CommandFault::capture("get_today", e))
}
