//! Commands for AI-drafted programs

use uuid::Uuid;

use super::{programs, CommandFault, CommandResult};
use crate::db::AppState;
use crate::drafting::{self, ProgramBrief};
use crate::models::TrainingProgram;
use crate::outcome::Outcome;

/// Draft a weekly pattern from `brief` and generate it as an AI-authored program
pub async fn draft_program(
  state: &AppState,
  user_id: Uuid,
  brief: ProgramBrief,
  activate_immediately: bool,
) -> CommandResult<TrainingProgram> {
  let client = match &state.completion {
    Some(client) => client.clone(),
    None => return Ok(Outcome::failure("AI drafting is not configured")),
  };

  let draft = match drafting::draft_program(client.as_ref(), &brief)
    .await
    .map_err(|e| CommandFault::capture("draft_program", e))?
  {
    Outcome::Success(draft) => draft,
    Outcome::Failure(errors) => return Ok(Outcome::Failure(errors)),
  };

  let request = draft.into_request(user_id, &brief, activate_immediately);
  programs::generate_program(state, request).await
}
