use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tags::ProgressionRule;

/// Reusable workout prescription attached to a program day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
  pub id: Uuid,
  pub user_id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub estimated_duration_minutes: Option<u32>,
  pub exercises: Vec<TemplateExercise>,
}

/// One exercise prescription inside a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExercise {
  pub id: Uuid,
  pub template_id: Uuid,
  /// Reference into the exercise catalog
  pub exercise_id: Uuid,
  pub order_index: u32,
  pub set_count: u32,
  pub min_reps: u32,
  pub max_reps: u32,
  pub rest_seconds: u32,
  pub progression_rule: ProgressionRule,
}

impl WorkoutTemplate {
  /// Total planned sets across all exercises
  pub fn total_sets(&self) -> u32 {
    self.exercises.iter().map(|e| e.set_count).sum()
  }
}
