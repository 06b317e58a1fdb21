use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::program::{Provenance, MAX_DURATION_WEEKS, MIN_DURATION_WEEKS};
use super::tags::{DayOfWeek, ProgressionRule};
use crate::validation::{RuleSet, Validate};

/// Input to the program generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateProgramRequest {
  pub user_id: Uuid,
  pub name: String,
  /// Signed so out-of-range input reaches validation instead of failing decode
  pub duration_weeks: i64,
  pub goal_description: Option<String>,
  #[serde(default)]
  pub provenance: Provenance,
  pub day_pattern: Vec<DayPatternEntry>,
  #[serde(default)]
  pub activate_immediately: bool,
}

/// One day of the weekly pattern, replicated into every week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPatternEntry {
  /// Loose day token ("Monday", "mon", "1"); unrecognized tokens are skipped
  pub day_of_week: String,
  #[serde(default)]
  pub is_rest_day: bool,
  pub focus: Option<String>,
  pub estimated_duration_minutes: Option<u32>,
  pub exercises: Option<Vec<ExercisePrescription>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisePrescription {
  pub exercise_id: Uuid,
  pub order_index: u32,
  pub set_count: u32,
  pub min_reps: u32,
  pub max_reps: u32,
  #[serde(default)]
  pub rest_seconds: u32,
  pub progression_rule: Option<String>,
}

impl DayPatternEntry {
  pub fn day(&self) -> Option<DayOfWeek> {
    DayOfWeek::parse(&self.day_of_week)
  }

  pub fn exercises(&self) -> &[ExercisePrescription] {
    self.exercises.as_deref().unwrap_or_default()
  }

  /// Recognized training day; only these entries produce workouts
  pub fn is_scheduled_training(&self) -> bool {
    !self.is_rest_day && self.day().is_some()
  }
}

impl ExercisePrescription {
  /// Omitted rule means a static prescription
  pub fn progression_rule(&self) -> Option<ProgressionRule> {
    match &self.progression_rule {
      Some(token) => ProgressionRule::parse(token),
      None => Some(ProgressionRule::Static),
    }
  }
}

impl Validate for GenerateProgramRequest {
  fn rules() -> RuleSet<Self> {
    RuleSet::new()
      .rule("User id is required", |r: &GenerateProgramRequest| {
        !r.user_id.is_nil()
      })
      .required("Program name", |r: &GenerateProgramRequest| r.name.as_str())
      .range(
        "Duration in weeks",
        MIN_DURATION_WEEKS as i64..=MAX_DURATION_WEEKS as i64,
        |r: &GenerateProgramRequest| r.duration_weeks,
      )
      .rule(
        "Day pattern must contain at least one day",
        |r: &GenerateProgramRequest| !r.day_pattern.is_empty(),
      )
      .each(|r: &GenerateProgramRequest| duplicate_day_errors(&r.day_pattern))
      .each(|r: &GenerateProgramRequest| {
        r.day_pattern
          .iter()
          .enumerate()
          .filter(|(_, entry)| entry.is_scheduled_training())
          .flat_map(|(i, entry)| entry_errors(i + 1, entry))
          .collect()
      })
  }
}

/// A recognized day listed twice would produce two days with the same tag
fn duplicate_day_errors(pattern: &[DayPatternEntry]) -> Vec<String> {
  let mut seen = HashSet::new();
  let mut reported = HashSet::new();
  let mut errors = Vec::new();
  for day in pattern.iter().filter_map(|e| e.day()) {
    if !seen.insert(day) && reported.insert(day) {
      errors.push(format!("Day pattern lists {} more than once", day));
    }
  }
  errors
}

fn entry_errors(position: usize, entry: &DayPatternEntry) -> Vec<String> {
  let mut errors = Vec::new();
  let mut order_indexes = HashSet::new();

  for (j, exercise) in entry.exercises().iter().enumerate() {
    let label = format!("Day pattern entry {} exercise {}", position, j + 1);
    if exercise.set_count < 1 {
      errors.push(format!("{}: set count must be at least 1", label));
    }
    if exercise.min_reps < 1 {
      errors.push(format!("{}: minimum reps must be at least 1", label));
    }
    if exercise.max_reps < exercise.min_reps {
      errors.push(format!(
        "{}: maximum reps ({}) must not be below minimum reps ({})",
        label, exercise.max_reps, exercise.min_reps
      ));
    }
    if exercise.progression_rule().is_none() {
      errors.push(format!(
        "{}: unknown progression rule '{}'",
        label,
        exercise.progression_rule.as_deref().unwrap_or_default()
      ));
    }
    if !order_indexes.insert(exercise.order_index) {
      errors.push(format!(
        "{}: order index {} is already used",
        label, exercise.order_index
      ));
    }
  }

  errors
}
