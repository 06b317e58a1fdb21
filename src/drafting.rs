//! AI program drafting
//!
//! Turns a short brief into a weekly day pattern by asking a completion
//! backend, then hands the pattern to the regular generator path as an
//! AI-authored request.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::{extract_json, LlmError, TextCompletion};
use crate::models::program::{MAX_DURATION_WEEKS, MIN_DURATION_WEEKS};
use crate::models::{DayPatternEntry, GenerateProgramRequest, Provenance};
use crate::outcome::Outcome;
use crate::validation::{self, RuleSet, Validate};

/// ---------------------------------------------------------------------------
/// Types
/// ---------------------------------------------------------------------------

const DRAFT_MAX_TOKENS: u32 = 4000;

/// An exercise the drafted program may prescribe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogExercise {
  pub id: Uuid,
  pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramBrief {
  pub goal: String,
  pub duration_weeks: i64,
  pub training_days_per_week: u32,
  pub available_exercises: Vec<CatalogExercise>,
}

/// Weekly pattern proposed by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDraft {
  pub name: String,
  pub rationale: Option<String>,
  pub day_pattern: Vec<DayPatternEntry>,
}

impl Validate for ProgramBrief {
  fn rules() -> RuleSet<Self> {
    RuleSet::new()
      .required("Goal", |b: &ProgramBrief| b.goal.as_str())
      .range(
        "Duration in weeks",
        MIN_DURATION_WEEKS as i64..=MAX_DURATION_WEEKS as i64,
        |b: &ProgramBrief| b.duration_weeks,
      )
      .range("Training days per week", 1..=7, |b: &ProgramBrief| {
        b.training_days_per_week
      })
      .rule(
        "At least one available exercise is required",
        |b: &ProgramBrief| !b.available_exercises.is_empty(),
      )
  }
}

impl ProgramDraft {
  /// Request for the generator, attributed to the model
  pub fn into_request(self, user_id: Uuid, brief: &ProgramBrief, activate_immediately: bool) -> GenerateProgramRequest {
    GenerateProgramRequest {
      user_id,
      name: self.name,
      duration_weeks: brief.duration_weeks,
      goal_description: Some(brief.goal.clone()),
      provenance: Provenance::AiGenerated {
        rationale: self.rationale,
      },
      day_pattern: self.day_pattern,
      activate_immediately,
    }
  }

  /// Remove prescriptions that point outside the brief's catalog
  fn retain_catalog(&mut self, catalog: &[CatalogExercise]) {
    let known: HashSet<Uuid> = catalog.iter().map(|e| e.id).collect();

    for entry in &mut self.day_pattern {
      if let Some(exercises) = entry.exercises.as_mut() {
        exercises.retain(|exercise| {
          let keep = known.contains(&exercise.exercise_id);
          if !keep {
            warn!(
              exercise_id = %exercise.exercise_id,
              day = %entry.day_of_week,
              "Dropping drafted exercise outside the catalog"
            );
          }
          keep
        });
      }
    }
  }
}

/// ---------------------------------------------------------------------------
/// Drafting
/// ---------------------------------------------------------------------------

/// Ask the completion backend for a program draft.
///
/// An invalid brief is a `Failure`. A reply that cannot be read as a draft
/// is an `LlmError::Parse`.
pub async fn draft_program(
  client: &dyn TextCompletion,
  brief: &ProgramBrief,
) -> Result<Outcome<ProgramDraft>, LlmError> {
  if let Outcome::Failure(errors) = validation::check(brief) {
    return Ok(Outcome::Failure(errors));
  }

  let system_prompt = include_str!("prompts/program_designer.txt");
  let brief_json = serde_json::to_string_pretty(brief).map_err(|e| LlmError::Parse(e.to_string()))?;

  let user_message = format!(
    r#"Design a training program for this brief.

BRIEF:
{}

Respond with valid JSON matching the OUTPUT FORMAT specified in your instructions."#,
    brief_json
  );

  let (response_text, usage) = client
    .complete(system_prompt, &user_message, DRAFT_MAX_TOKENS)
    .await?;

  let json_str = extract_json(&response_text)?;
  let mut draft: ProgramDraft =
    serde_json::from_str(&json_str).map_err(|e| LlmError::Parse(format!("{}: {}", e, json_str)))?;

  draft.retain_catalog(&brief.available_exercises);

  info!(
    name = %draft.name,
    days = draft.day_pattern.len(),
    input_tokens = usage.input_tokens,
    output_tokens = usage.output_tokens,
    "Drafted training program"
  );

  Ok(Outcome::success(draft))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
