use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Day of Week
/// ---------------------------------------------------------------------------

/// Schedule day tag. Numbering is ISO-style: Monday = 1 ... Sunday = 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
  Sunday,
}

impl DayOfWeek {
  pub const ALL: [DayOfWeek; 7] = [
    DayOfWeek::Monday,
    DayOfWeek::Tuesday,
    DayOfWeek::Wednesday,
    DayOfWeek::Thursday,
    DayOfWeek::Friday,
    DayOfWeek::Saturday,
    DayOfWeek::Sunday,
  ];

  /// Parse a loosely-typed token ("Monday", "mon", "1").
  /// Returns None for anything unrecognized, including "0".
  pub fn parse(token: &str) -> Option<Self> {
    match token.trim().to_lowercase().as_str() {
      "monday" | "mon" | "1" => Some(DayOfWeek::Monday),
      "tuesday" | "tue" | "tues" | "2" => Some(DayOfWeek::Tuesday),
      "wednesday" | "wed" | "3" => Some(DayOfWeek::Wednesday),
      "thursday" | "thu" | "thur" | "thurs" | "4" => Some(DayOfWeek::Thursday),
      "friday" | "fri" | "5" => Some(DayOfWeek::Friday),
      "saturday" | "sat" | "6" => Some(DayOfWeek::Saturday),
      "sunday" | "sun" | "7" => Some(DayOfWeek::Sunday),
      _ => None,
    }
  }

  pub fn number(&self) -> u8 {
    match self {
      DayOfWeek::Monday => 1,
      DayOfWeek::Tuesday => 2,
      DayOfWeek::Wednesday => 3,
      DayOfWeek::Thursday => 4,
      DayOfWeek::Friday => 5,
      DayOfWeek::Saturday => 6,
      DayOfWeek::Sunday => 7,
    }
  }

  pub fn from_number(number: i64) -> Option<Self> {
    match number {
      1..=7 => Some(Self::ALL[(number - 1) as usize]),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      DayOfWeek::Monday => "Monday",
      DayOfWeek::Tuesday => "Tuesday",
      DayOfWeek::Wednesday => "Wednesday",
      DayOfWeek::Thursday => "Thursday",
      DayOfWeek::Friday => "Friday",
      DayOfWeek::Saturday => "Saturday",
      DayOfWeek::Sunday => "Sunday",
    }
  }
}

impl From<Weekday> for DayOfWeek {
  // chrono's own numbering is 0-based from Monday; map each variant by name
  // so Sunday lands on 7.
  fn from(weekday: Weekday) -> Self {
    match weekday {
      Weekday::Mon => DayOfWeek::Monday,
      Weekday::Tue => DayOfWeek::Tuesday,
      Weekday::Wed => DayOfWeek::Wednesday,
      Weekday::Thu => DayOfWeek::Thursday,
      Weekday::Fri => DayOfWeek::Friday,
      Weekday::Sat => DayOfWeek::Saturday,
      Weekday::Sun => DayOfWeek::Sunday,
    }
  }
}

impl std::fmt::Display for DayOfWeek {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// ---------------------------------------------------------------------------
/// Progression Rule
/// ---------------------------------------------------------------------------

/// How an exercise prescription is meant to advance. Stored with the
/// template; nothing in the planner evaluates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionRule {
  /// Same prescription every session
  #[default]
  Static,
  /// Add load each session while reps are hit
  LinearLoad,
  /// Add reps up to the top of the range, then add load
  DoubleProgression,
  /// Load chosen by target RPE
  RpeBased,
  /// Load as a percentage of a training max
  PercentageBased,
}

impl ProgressionRule {
  pub fn parse(token: &str) -> Option<Self> {
    let normalized = token.trim().to_lowercase().replace(['-', ' '], "_");
    match normalized.as_str() {
      "static" | "none" | "" => Some(ProgressionRule::Static),
      "linear_load" | "linear" => Some(ProgressionRule::LinearLoad),
      "double_progression" | "double" => Some(ProgressionRule::DoubleProgression),
      "rpe_based" | "rpe" => Some(ProgressionRule::RpeBased),
      "percentage_based" | "percentage" | "percent_1rm" => Some(ProgressionRule::PercentageBased),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ProgressionRule::Static => "static",
      ProgressionRule::LinearLoad => "linear_load",
      ProgressionRule::DoubleProgression => "double_progression",
      ProgressionRule::RpeBased => "rpe_based",
      ProgressionRule::PercentageBased => "percentage_based",
    }
  }
}

impl std::fmt::Display for ProgressionRule {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}
