//! Persistence for the program graph
//!
//! Every function takes a plain connection so callers decide whether it
//! runs inside a transaction (`&mut *tx`) or on a pooled connection.
//! Absence is `Ok(None)`; `Err` is reserved for infrastructure faults.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{
  DayOfWeek, ProgramDay, ProgramWeek, ProgressionRule, Provenance, TemplateExercise,
  TrainingProgram, WorkoutTemplate,
};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Corrupt record: {0}")]
  Corrupt(String),
}

const PROGRAM_COLUMNS: &str = r#"
  id, user_id, name, duration_weeks, goal_description,
  is_ai_generated, ai_rationale, is_active, activated_at, created_at
"#;

/// ---------------------------------------------------------------------------
/// Queries
/// ---------------------------------------------------------------------------

/// Fetch a program by id with weeks, days and templates loaded
pub async fn fetch_program(
  conn: &mut SqliteConnection,
  program_id: Uuid,
) -> Result<Option<TrainingProgram>, StoreError> {
  let row = sqlx::query(&format!(
    "SELECT {} FROM training_programs WHERE id = ?1",
    PROGRAM_COLUMNS
  ))
  .bind(program_id.to_string())
  .fetch_optional(&mut *conn)
  .await?;

  match row {
    Some(row) => Ok(Some(load_graph(conn, program_from_row(&row)?).await?)),
    None => Ok(None),
  }
}

/// Fetch the user's active program graph, if any
pub async fn fetch_active_program(
  conn: &mut SqliteConnection,
  user_id: Uuid,
) -> Result<Option<TrainingProgram>, StoreError> {
  let row = sqlx::query(&format!(
    "SELECT {} FROM training_programs WHERE user_id = ?1 AND is_active = 1 LIMIT 1",
    PROGRAM_COLUMNS
  ))
  .bind(user_id.to_string())
  .fetch_optional(&mut *conn)
  .await?;

  match row {
    Some(row) => Ok(Some(load_graph(conn, program_from_row(&row)?).await?)),
    None => Ok(None),
  }
}

/// All programs for a user, newest first
pub async fn list_programs(
  conn: &mut SqliteConnection,
  user_id: Uuid,
) -> Result<Vec<TrainingProgram>, StoreError> {
  let rows = sqlx::query(&format!(
    "SELECT {} FROM training_programs WHERE user_id = ?1 ORDER BY created_at DESC",
    PROGRAM_COLUMNS
  ))
  .bind(user_id.to_string())
  .fetch_all(&mut *conn)
  .await?;

  let mut programs = Vec::with_capacity(rows.len());
  for row in rows {
    let program = program_from_row(&row)?;
    programs.push(load_graph(conn, program).await?);
  }

  Ok(programs)
}

/// Attach weeks -> days -> templates -> exercises to a bare program row
async fn load_graph(
  conn: &mut SqliteConnection,
  mut program: TrainingProgram,
) -> Result<TrainingProgram, StoreError> {
  let program_id = program.id.to_string();

  let exercise_rows = sqlx::query(
    r#"
    SELECT e.id, e.template_id, e.exercise_id, e.order_index, e.set_count,
           e.min_reps, e.max_reps, e.rest_seconds, e.progression_rule
    FROM template_exercises e
    JOIN program_days d ON d.workout_template_id = e.template_id
    JOIN program_weeks w ON w.id = d.week_id
    WHERE w.program_id = ?1
    ORDER BY e.order_index
    "#,
  )
  .bind(&program_id)
  .fetch_all(&mut *conn)
  .await?;

  let mut exercises_by_template: HashMap<Uuid, Vec<TemplateExercise>> = HashMap::new();
  for row in &exercise_rows {
    let exercise = exercise_from_row(row)?;
    exercises_by_template
      .entry(exercise.template_id)
      .or_default()
      .push(exercise);
  }

  let template_rows = sqlx::query(
    r#"
    SELECT t.id, t.user_id, t.name, t.description, t.estimated_duration_minutes
    FROM workout_templates t
    JOIN program_days d ON d.workout_template_id = t.id
    JOIN program_weeks w ON w.id = d.week_id
    WHERE w.program_id = ?1
    "#,
  )
  .bind(&program_id)
  .fetch_all(&mut *conn)
  .await?;

  let mut templates: HashMap<Uuid, WorkoutTemplate> = HashMap::new();
  for row in &template_rows {
    let mut template = template_from_row(row)?;
    template.exercises = exercises_by_template.remove(&template.id).unwrap_or_default();
    templates.insert(template.id, template);
  }

  let day_rows = sqlx::query(
    r#"
    SELECT d.id, d.week_id, d.day_of_week, d.is_rest_day, d.focus, d.workout_template_id
    FROM program_days d
    JOIN program_weeks w ON w.id = d.week_id
    WHERE w.program_id = ?1
    ORDER BY w.week_number, d.day_of_week
    "#,
  )
  .bind(&program_id)
  .fetch_all(&mut *conn)
  .await?;

  let mut days_by_week: HashMap<Uuid, Vec<ProgramDay>> = HashMap::new();
  for row in &day_rows {
    let template_id: Option<String> = row.try_get("workout_template_id")?;
    let workout_template = match template_id {
      Some(id) => Some(templates.remove(&parse_uuid(&id)?).ok_or_else(|| {
        StoreError::Corrupt(format!("Day references missing template {}", id))
      })?),
      None => None,
    };

    let day_number: i64 = row.try_get("day_of_week")?;
    let day = ProgramDay {
      id: parse_uuid(&row.try_get::<String, _>("id")?)?,
      week_id: parse_uuid(&row.try_get::<String, _>("week_id")?)?,
      day_of_week: DayOfWeek::from_number(day_number)
        .ok_or_else(|| StoreError::Corrupt(format!("Invalid day of week {}", day_number)))?,
      is_rest_day: row.try_get("is_rest_day")?,
      focus: row.try_get("focus")?,
      workout_template,
    };
    days_by_week.entry(day.week_id).or_default().push(day);
  }

  let week_rows = sqlx::query(
    r#"
    SELECT id, program_id, week_number, is_deload, volume_multiplier
    FROM program_weeks
    WHERE program_id = ?1
    ORDER BY week_number
    "#,
  )
  .bind(&program_id)
  .fetch_all(&mut *conn)
  .await?;

  let mut weeks = Vec::with_capacity(week_rows.len());
  for row in &week_rows {
    let id = parse_uuid(&row.try_get::<String, _>("id")?)?;
    weeks.push(ProgramWeek {
      id,
      program_id: parse_uuid(&row.try_get::<String, _>("program_id")?)?,
      week_number: to_u32(row.try_get("week_number")?, "week_number")?,
      is_deload: row.try_get("is_deload")?,
      volume_multiplier: row.try_get("volume_multiplier")?,
      days: days_by_week.remove(&id).unwrap_or_default(),
    });
  }

  program.weeks = weeks;
  Ok(program)
}

/// ---------------------------------------------------------------------------
/// Writes
/// ---------------------------------------------------------------------------

/// Insert a freshly built program graph. Every row is inserted with the
/// identifier it was given at construction time.
pub async fn insert_program_graph(
  conn: &mut SqliteConnection,
  program: &TrainingProgram,
) -> Result<(), StoreError> {
  sqlx::query(
    r#"
    INSERT INTO training_programs (
      id, user_id, name, duration_weeks, goal_description,
      is_ai_generated, ai_rationale, is_active, activated_at, created_at
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
  )
  .bind(program.id.to_string())
  .bind(program.user_id.to_string())
  .bind(&program.name)
  .bind(program.duration_weeks as i64)
  .bind(&program.goal_description)
  .bind(program.provenance.is_ai_generated())
  .bind(program.provenance.rationale())
  .bind(program.is_active)
  .bind(program.activated_at.map(|d| d.to_rfc3339()))
  .bind(program.created_at.to_rfc3339())
  .execute(&mut *conn)
  .await?;

  for week in &program.weeks {
    sqlx::query(
      r#"
      INSERT INTO program_weeks (id, program_id, week_number, is_deload, volume_multiplier)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(week.id.to_string())
    .bind(program.id.to_string())
    .bind(week.week_number as i64)
    .bind(week.is_deload)
    .bind(week.volume_multiplier)
    .execute(&mut *conn)
    .await?;

    for day in &week.days {
      if let Some(template) = &day.workout_template {
        insert_template(conn, template, program.created_at).await?;
      }

      sqlx::query(
        r#"
        INSERT INTO program_days (id, week_id, day_of_week, is_rest_day, focus, workout_template_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
      )
      .bind(day.id.to_string())
      .bind(week.id.to_string())
      .bind(day.day_of_week.number() as i64)
      .bind(day.is_rest_day)
      .bind(&day.focus)
      .bind(day.workout_template.as_ref().map(|t| t.id.to_string()))
      .execute(&mut *conn)
      .await?;
    }
  }

  Ok(())
}

async fn insert_template(
  conn: &mut SqliteConnection,
  template: &WorkoutTemplate,
  created_at: DateTime<Utc>,
) -> Result<(), StoreError> {
  sqlx::query(
    r#"
    INSERT INTO workout_templates (id, user_id, name, description, estimated_duration_minutes, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(template.id.to_string())
  .bind(template.user_id.to_string())
  .bind(&template.name)
  .bind(&template.description)
  .bind(template.estimated_duration_minutes.map(i64::from))
  .bind(created_at.to_rfc3339())
  .execute(&mut *conn)
  .await?;

  for exercise in &template.exercises {
    sqlx::query(
      r#"
      INSERT INTO template_exercises (
        id, template_id, exercise_id, order_index, set_count,
        min_reps, max_reps, rest_seconds, progression_rule
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
      "#,
    )
    .bind(exercise.id.to_string())
    .bind(template.id.to_string())
    .bind(exercise.exercise_id.to_string())
    .bind(exercise.order_index as i64)
    .bind(exercise.set_count as i64)
    .bind(exercise.min_reps as i64)
    .bind(exercise.max_reps as i64)
    .bind(exercise.rest_seconds as i64)
    .bind(exercise.progression_rule.as_str())
    .execute(&mut *conn)
    .await?;
  }

  Ok(())
}

/// Clear the active flag on every other active program of the user
pub async fn deactivate_user_programs(
  conn: &mut SqliteConnection,
  user_id: Uuid,
  except_program_id: Uuid,
) -> Result<u64, StoreError> {
  let result = sqlx::query(
    r#"
    UPDATE training_programs
    SET is_active = 0, activated_at = NULL
    WHERE user_id = ?1 AND is_active = 1 AND id != ?2
    "#,
  )
  .bind(user_id.to_string())
  .bind(except_program_id.to_string())
  .execute(&mut *conn)
  .await?;

  Ok(result.rows_affected())
}

/// Persist a program's activation fields
pub async fn save_activation(
  conn: &mut SqliteConnection,
  program: &TrainingProgram,
) -> Result<(), StoreError> {
  let result = sqlx::query(
    r#"
    UPDATE training_programs
    SET is_active = ?1, activated_at = ?2
    WHERE id = ?3
    "#,
  )
  .bind(program.is_active)
  .bind(program.activated_at.map(|d| d.to_rfc3339()))
  .bind(program.id.to_string())
  .execute(&mut *conn)
  .await?;

  if result.rows_affected() == 0 {
    return Err(StoreError::Corrupt(format!(
      "Program {} disappeared while saving activation",
      program.id
    )));
  }

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Row Mapping
/// ---------------------------------------------------------------------------

fn program_from_row(row: &SqliteRow) -> Result<TrainingProgram, StoreError> {
  let is_ai_generated: bool = row.try_get("is_ai_generated")?;
  let provenance = if is_ai_generated {
    Provenance::AiGenerated {
      rationale: row.try_get("ai_rationale")?,
    }
  } else {
    Provenance::Human
  };

  let activated_at: Option<String> = row.try_get("activated_at")?;
  let created_at: String = row.try_get("created_at")?;

  Ok(TrainingProgram {
    id: parse_uuid(&row.try_get::<String, _>("id")?)?,
    user_id: parse_uuid(&row.try_get::<String, _>("user_id")?)?,
    name: row.try_get("name")?,
    duration_weeks: to_u32(row.try_get("duration_weeks")?, "duration_weeks")?,
    goal_description: row.try_get("goal_description")?,
    provenance,
    is_active: row.try_get("is_active")?,
    activated_at: activated_at.as_deref().map(parse_timestamp).transpose()?,
    created_at: parse_timestamp(&created_at)?,
    weeks: Vec::new(),
  })
}

fn template_from_row(row: &SqliteRow) -> Result<WorkoutTemplate, StoreError> {
  let estimated: Option<i64> = row.try_get("estimated_duration_minutes")?;

  Ok(WorkoutTemplate {
    id: parse_uuid(&row.try_get::<String, _>("id")?)?,
    user_id: parse_uuid(&row.try_get::<String, _>("user_id")?)?,
    name: row.try_get("name")?,
    description: row.try_get("description")?,
    estimated_duration_minutes: estimated
      .map(|m| to_u32(m, "estimated_duration_minutes"))
      .transpose()?,
    exercises: Vec::new(),
  })
}

fn exercise_from_row(row: &SqliteRow) -> Result<TemplateExercise, StoreError> {
  let rule: String = row.try_get("progression_rule")?;

  Ok(TemplateExercise {
    id: parse_uuid(&row.try_get::<String, _>("id")?)?,
    template_id: parse_uuid(&row.try_get::<String, _>("template_id")?)?,
    exercise_id: parse_uuid(&row.try_get::<String, _>("exercise_id")?)?,
    order_index: to_u32(row.try_get("order_index")?, "order_index")?,
    set_count: to_u32(row.try_get("set_count")?, "set_count")?,
    min_reps: to_u32(row.try_get("min_reps")?, "min_reps")?,
    max_reps: to_u32(row.try_get("max_reps")?, "max_reps")?,
    rest_seconds: to_u32(row.try_get("rest_seconds")?, "rest_seconds")?,
    progression_rule: ProgressionRule::parse(&rule)
      .ok_or_else(|| StoreError::Corrupt(format!("Unknown progression rule {}", rule)))?,
  })
}

fn parse_uuid(value: &str) -> Result<Uuid, StoreError> {
  Uuid::parse_str(value).map_err(|e| StoreError::Corrupt(format!("Invalid UUID {}: {}", value, e)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
  DateTime::parse_from_rfc3339(value)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| StoreError::Corrupt(format!("Invalid timestamp {}: {}", value, e)))
}

fn to_u32(value: i64, column: &str) -> Result<u32, StoreError> {
  u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{} out of range: {}", column, value)))
}
