use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::tags::DayOfWeek;
use super::template::WorkoutTemplate;

pub const MIN_DURATION_WEEKS: u32 = 1;
pub const MAX_DURATION_WEEKS: u32 = 52;

/// Who authored the program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
  #[default]
  Human,
  AiGenerated { rationale: Option<String> },
}

impl Provenance {
  pub fn is_ai_generated(&self) -> bool {
    matches!(self, Provenance::AiGenerated { .. })
  }

  pub fn rationale(&self) -> Option<&str> {
    match self {
      Provenance::Human => None,
      Provenance::AiGenerated { rationale } => rationale.as_deref(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingProgram {
  pub id: Uuid,
  pub user_id: Uuid,
  pub name: String,
  pub duration_weeks: u32,
  pub goal_description: Option<String>,
  pub provenance: Provenance,
  pub is_active: bool,
  pub activated_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub weeks: Vec<ProgramWeek>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramWeek {
  pub id: Uuid,
  pub program_id: Uuid,
  /// 1-based
  pub week_number: u32,
  pub is_deload: bool,
  /// Fraction of planned volume, 1.0 = full
  pub volume_multiplier: f64,
  pub days: Vec<ProgramDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDay {
  pub id: Uuid,
  pub week_id: Uuid,
  pub day_of_week: DayOfWeek,
  pub is_rest_day: bool,
  pub focus: Option<String>,
  pub workout_template: Option<WorkoutTemplate>,
}

impl TrainingProgram {
  pub fn week(&self, week_number: u32) -> Option<&ProgramWeek> {
    self.weeks.iter().find(|w| w.week_number == week_number)
  }

  pub fn deload_weeks(&self) -> impl Iterator<Item = &ProgramWeek> {
    self.weeks.iter().filter(|w| w.is_deload)
  }

  /// Every structural invariant the graph breaks. Empty means valid.
  pub fn invariant_violations(&self) -> Vec<String> {
    let mut violations = Vec::new();

    if !(MIN_DURATION_WEEKS..=MAX_DURATION_WEEKS).contains(&self.duration_weeks) {
      violations.push(format!(
        "Duration must be between {} and {} weeks (got {})",
        MIN_DURATION_WEEKS, MAX_DURATION_WEEKS, self.duration_weeks
      ));
    }

    if self.weeks.len() != self.duration_weeks as usize {
      violations.push(format!(
        "Program has {} weeks but a duration of {}",
        self.weeks.len(),
        self.duration_weeks
      ));
    }

    let mut seen_weeks = HashSet::new();
    for week in &self.weeks {
      if week.week_number < 1 || week.week_number > self.duration_weeks {
        violations.push(format!("Week number {} is out of range", week.week_number));
      }
      if !seen_weeks.insert(week.week_number) {
        violations.push(format!("Week {} appears more than once", week.week_number));
      }
      violations.extend(week.invariant_violations());
    }

    violations
  }
}

impl ProgramWeek {
  pub fn day(&self, day_of_week: DayOfWeek) -> Option<&ProgramDay> {
    self.days.iter().find(|d| d.day_of_week == day_of_week)
  }

  pub fn training_days(&self) -> impl Iterator<Item = &ProgramDay> {
    self.days.iter().filter(|d| !d.is_rest_day)
  }

  fn invariant_violations(&self) -> Vec<String> {
    let mut violations = Vec::new();

    if !(self.volume_multiplier > 0.0 && self.volume_multiplier <= 1.0) {
      violations.push(format!(
        "Week {} volume multiplier {} is outside (0, 1]",
        self.week_number, self.volume_multiplier
      ));
    }

    let mut seen_days = HashSet::new();
    for day in &self.days {
      if !seen_days.insert(day.day_of_week) {
        violations.push(format!(
          "Week {} lists {} more than once",
          self.week_number, day.day_of_week
        ));
      }
      if let Some(template) = &day.workout_template {
        if day.is_rest_day {
          violations.push(format!(
            "Week {} {} is a rest day but has a workout",
            self.week_number, day.day_of_week
          ));
        }
        if template.exercises.iter().any(|e| e.set_count == 0) {
          violations.push(format!(
            "Week {} {} has an exercise with zero sets",
            self.week_number, day.day_of_week
          ));
        }
      }
    }

    violations
  }
}
