//! Program Generator
//!
//! Expands a weekly day pattern into a full multi-week program graph.
//!
//! Rules:
//! - The pattern is replicated identically into every week
//! - The final week of any program of 4+ weeks is a deload week
//! - Deload weeks run at half volume: multiplier 0.5, set counts halved (min 1)
//! - Pattern entries with an unrecognized day token are skipped, not rejected
//! - The whole graph is written in one transaction with client-assigned ids

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::activation;
use crate::models::{
    DayOfWeek, DayPatternEntry, GenerateProgramRequest, ProgramDay, ProgramWeek,
    ProgressionRule, TemplateExercise, TrainingProgram, WorkoutTemplate,
};
use crate::outcome::Outcome;
use crate::store::{self, StoreError};
use crate::validation;

/// Programs shorter than this never get a deload week
pub const DELOAD_MIN_DURATION_WEEKS: u32 = 4;
pub const DELOAD_VOLUME_MULTIPLIER: f64 = 0.5;
pub const FULL_VOLUME_MULTIPLIER: f64 = 1.0;

// ---------------------------------------------------------------------------
/// Deload Policy
// ---------------------------------------------------------------------------

/// Position-based: only the last week, and only for programs of 4+ weeks
pub fn is_deload_week(duration_weeks: u32, week_number: u32) -> bool {
    duration_weeks >= DELOAD_MIN_DURATION_WEEKS && week_number == duration_weeks
}

pub fn volume_multiplier(is_deload: bool) -> f64 {
    if is_deload {
        DELOAD_VOLUME_MULTIPLIER
    } else {
        FULL_VOLUME_MULTIPLIER
    }
}

/// Halve with integer division, never below one set
pub fn deload_set_count(set_count: u32) -> u32 {
    (set_count / 2).max(1)
}

// ---------------------------------------------------------------------------
/// Graph Construction
// ---------------------------------------------------------------------------

/// Validate the request and expand it into a program graph (no I/O)
pub fn build_program(request: &GenerateProgramRequest, now: DateTime<Utc>) -> Outcome<TrainingProgram> {
    validation::check(request).and_then(|()| {
        let program = expand(request, now);
        let violations = program.invariant_violations();
        if violations.is_empty() {
            Outcome::success(program)
        } else {
            Outcome::failures(violations)
        }
    })
}

fn expand(request: &GenerateProgramRequest, now: DateTime<Utc>) -> TrainingProgram {
    // Range already checked by validation
    let duration_weeks = request.duration_weeks as u32;
    let program_id = Uuid::new_v4();

    let mut pattern: Vec<(DayOfWeek, &DayPatternEntry)> = request
        .day_pattern
        .iter()
        .filter_map(|entry| match entry.day() {
            Some(day) => Some((day, entry)),
            None => {
                debug!(token = %entry.day_of_week, "Skipping day pattern entry with unrecognized day");
                None
            }
        })
        .collect();
    pattern.sort_by_key(|(day, _)| *day);

    let weeks = (1..=duration_weeks)
        .map(|week_number| {
            let is_deload = is_deload_week(duration_weeks, week_number);
            let week_id = Uuid::new_v4();
            ProgramWeek {
                id: week_id,
                program_id,
                week_number,
                is_deload,
                volume_multiplier: volume_multiplier(is_deload),
                days: pattern
                    .iter()
                    .map(|(day, entry)| {
                        build_day(request, week_id, week_number, duration_weeks, is_deload, *day, entry)
                    })
                    .collect(),
            }
        })
        .collect();

    TrainingProgram {
        id: program_id,
        user_id: request.user_id,
        name: request.name.trim().to_string(),
        duration_weeks,
        goal_description: request.goal_description.clone(),
        provenance: request.provenance.clone(),
        is_active: false,
        activated_at: None,
        created_at: now,
        weeks,
    }
}

fn build_day(
    request: &GenerateProgramRequest,
    week_id: Uuid,
    week_number: u32,
    duration_weeks: u32,
    is_deload: bool,
    day: DayOfWeek,
    entry: &DayPatternEntry,
) -> ProgramDay {
    let workout_template = if !entry.is_rest_day && !entry.exercises().is_empty() {
        Some(build_template(request, week_number, duration_weeks, is_deload, day, entry))
    } else {
        None
    };

    ProgramDay {
        id: Uuid::new_v4(),
        week_id,
        day_of_week: day,
        is_rest_day: entry.is_rest_day,
        focus: entry.focus.clone(),
        workout_template,
    }
}

fn build_template(
    request: &GenerateProgramRequest,
    week_number: u32,
    duration_weeks: u32,
    is_deload: bool,
    day: DayOfWeek,
    entry: &DayPatternEntry,
) -> WorkoutTemplate {
    let template_id = Uuid::new_v4();

    let mut exercises: Vec<TemplateExercise> = entry
        .exercises()
        .iter()
        .map(|prescription| TemplateExercise {
            id: Uuid::new_v4(),
            template_id,
            exercise_id: prescription.exercise_id,
            order_index: prescription.order_index,
            set_count: if is_deload {
                deload_set_count(prescription.set_count)
            } else {
                prescription.set_count
            },
            min_reps: prescription.min_reps,
            max_reps: prescription.max_reps,
            rest_seconds: prescription.rest_seconds,
            progression_rule: prescription.progression_rule().unwrap_or(ProgressionRule::Static),
        })
        .collect();
    exercises.sort_by_key(|e| e.order_index);

    let description = if is_deload {
        format!("Week {} of {} (deload)", week_number, duration_weeks)
    } else {
        format!("Week {} of {}", week_number, duration_weeks)
    };

    WorkoutTemplate {
        id: template_id,
        user_id: request.user_id,
        name: template_name(request.name.trim(), entry.focus.as_deref(), day),
        description: Some(description),
        estimated_duration_minutes: entry.estimated_duration_minutes,
        exercises,
    }
}

/// "{program} - {focus}" or "{program} - {day}" when the entry has no focus
pub fn template_name(program_name: &str, focus: Option<&str>, day: DayOfWeek) -> String {
    match focus.map(str::trim).filter(|f| !f.is_empty()) {
        Some(focus) => format!("{} - {}", program_name, focus),
        None => format!("{} - {}", program_name, day),
    }
}

// ---------------------------------------------------------------------------
// Database Operations
// ---------------------------------------------------------------------------

/// Generate, optionally activate, and persist a program in one transaction
pub async fn generate_program(
    pool: &SqlitePool,
    request: &GenerateProgramRequest,
    now: DateTime<Utc>,
) -> Result<Outcome<TrainingProgram>, StoreError> {
    let mut program = match build_program(request, now) {
        Outcome::Success(program) => program,
        Outcome::Failure(errors) => return Ok(Outcome::Failure(errors)),
    };

    let mut tx = pool.begin().await?;

    let mut deactivated = 0;
    if request.activate_immediately {
        deactivated = activation::promote(&mut tx, &mut program, now).await?;
    }
    store::insert_program_graph(&mut tx, &program).await?;
    tx.commit().await?;

    info!(
        program_id = %program.id,
        user_id = %program.user_id,
        weeks = program.duration_weeks,
        deload_weeks = program.deload_weeks().count(),
        active = program.is_active,
        deactivated,
        "Generated training program"
    );

    Ok(Outcome::success(program))
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
