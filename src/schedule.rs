//! Schedule Resolver
//!
//! Projects the active program onto the calendar to answer "what should I
//! do today". Nothing is stored; the answer is recomputed on every call
//! from the activation timestamp and the current time.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::models::{DayOfWeek, TrainingProgram};
use crate::store::{self, StoreError};

/// Reference to the workout linked to a training day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateRef {
    pub id: Uuid,
    pub name: String,
    pub exercise_count: usize,
}

/// Today's entry. Callers must handle every variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TodayEntry {
    NoActiveProgram,
    ProgramExpired {
        program_id: Uuid,
        program_name: String,
        total_weeks: u32,
    },
    RestDay {
        program_id: Uuid,
        program_name: String,
        week_number: u32,
        total_weeks: u32,
        is_deload: bool,
        day_of_week: DayOfWeek,
        focus: Option<String>,
    },
    TrainingDay {
        program_id: Uuid,
        program_name: String,
        week_number: u32,
        total_weeks: u32,
        is_deload: bool,
        volume_multiplier: f64,
        day_of_week: DayOfWeek,
        focus: Option<String>,
        template: Option<TemplateRef>,
    },
}

/// Where `now` falls relative to a program's planned length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramWeekPosition {
    Week(u32),
    Expired,
}

/// 1-based week for `now`: whole weeks elapsed since `start`, plus one.
/// Times before `start` count as week 1.
pub fn week_position<Tz: TimeZone>(
    start: DateTime<Utc>,
    now: &DateTime<Tz>,
    duration_weeks: u32,
) -> ProgramWeekPosition {
    let elapsed_weeks = now.with_timezone(&Utc).signed_duration_since(start).num_weeks().max(0);
    let week_number = elapsed_weeks.saturating_add(1);

    if week_number > duration_weeks as i64 {
        ProgramWeekPosition::Expired
    } else {
        ProgramWeekPosition::Week(week_number as u32)
    }
}

/// Pure resolution against an already-loaded program
pub fn resolve_for<Tz: TimeZone>(program: Option<&TrainingProgram>, now: &DateTime<Tz>) -> TodayEntry {
    let program = match program {
        Some(program) => program,
        None => return TodayEntry::NoActiveProgram,
    };

    let start = program.activated_at.unwrap_or(program.created_at);
    let week_number = match week_position(start, now, program.duration_weeks) {
        ProgramWeekPosition::Week(n) => n,
        ProgramWeekPosition::Expired => {
            return TodayEntry::ProgramExpired {
                program_id: program.id,
                program_name: program.name.clone(),
                total_weeks: program.duration_weeks,
            };
        }
    };

    // Weekday in the caller's timezone, mapped Monday=1 .. Sunday=7
    let today = DayOfWeek::from(now.weekday());

    let week = program.week(week_number);
    let is_deload = week.map(|w| w.is_deload).unwrap_or(false);
    let day = week.and_then(|w| w.day(today));

    match (week, day) {
        (Some(week), Some(day)) if !day.is_rest_day => TodayEntry::TrainingDay {
            program_id: program.id,
            program_name: program.name.clone(),
            week_number,
            total_weeks: program.duration_weeks,
            is_deload: week.is_deload,
            volume_multiplier: week.volume_multiplier,
            day_of_week: today,
            focus: day.focus.clone(),
            template: day.workout_template.as_ref().map(|t| TemplateRef {
                id: t.id,
                name: t.name.clone(),
                exercise_count: t.exercises.len(),
            }),
        },
        // Explicit rest day, or nothing scheduled: both read as rest
        (_, day) => TodayEntry::RestDay {
            program_id: program.id,
            program_name: program.name.clone(),
            week_number,
            total_weeks: program.duration_weeks,
            is_deload,
            day_of_week: today,
            focus: day.and_then(|d| d.focus.clone()),
        },
    }
}

/// Resolve today's entry for a user's active program
pub async fn resolve_today<Tz: TimeZone>(
    pool: &SqlitePool,
    user_id: Uuid,
    now: DateTime<Tz>,
) -> Result<TodayEntry, StoreError> {
    let mut conn = pool.acquire().await?;
    let program = store::fetch_active_program(&mut conn, user_id).await?;
    let entry = resolve_for(program.as_ref(), &now);

    debug!(user_id = %user_id, entry = ?entry, "Resolved today's schedule");

    Ok(entry)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::build_program;
    use crate::test_utils::{mock_generate_request, setup_test_db, teardown_test_db, utc};
    use chrono::{Duration, FixedOffset};

    // 2025-01-06 is a Monday
    fn monday_morning() -> DateTime<Utc> {
        utc(2025, 1, 6, 8, 0)
    }

    fn active_program(duration_weeks: i64, activated_at: DateTime<Utc>) -> TrainingProgram {
        let mut program = build_program(&mock_generate_request(duration_weeks), activated_at)
            .into_result()
            .expect("Request should be valid");
        program.is_active = true;
        program.activated_at = Some(activated_at);
        program
    }

    #[test]
    fn test_no_program() {
        assert_eq!(resolve_for(None, &Utc::now()), TodayEntry::NoActiveProgram);
    }

    #[test]
    fn test_week_position() {
        let start = monday_morning();
        assert_eq!(week_position(start, &start, 4), ProgramWeekPosition::Week(1));
        assert_eq!(
            week_position(start, &(start + Duration::days(6)), 4),
            ProgramWeekPosition::Week(1)
        );
        assert_eq!(
            week_position(start, &(start + Duration::days(7)), 4),
            ProgramWeekPosition::Week(2)
        );
        assert_eq!(
            week_position(start, &(start + Duration::days(27)), 4),
            ProgramWeekPosition::Week(4)
        );
        assert_eq!(
            week_position(start, &(start + Duration::days(28)), 4),
            ProgramWeekPosition::Expired
        );
        // Clock before activation clamps to week 1
        assert_eq!(
            week_position(start, &(start - Duration::days(3)), 4),
            ProgramWeekPosition::Week(1)
        );
    }

    #[test]
    fn test_training_day_in_first_week() {
        let program = active_program(4, monday_morning());
        let entry = resolve_for(Some(&program), &(monday_morning() + Duration::hours(2)));

        match entry {
            TodayEntry::TrainingDay {
                week_number,
                total_weeks,
                is_deload,
                day_of_week,
                focus,
                template,
                ..
            } => {
                assert_eq!(week_number, 1);
                assert_eq!(total_weeks, 4);
                assert!(!is_deload);
                assert_eq!(day_of_week, DayOfWeek::Monday);
                assert_eq!(focus.as_deref(), Some("Lower Body"));
                let template = template.expect("Monday should have a workout");
                assert_eq!(template.name, "Strength Block - Lower Body");
                assert_eq!(template.exercise_count, 3);
            }
            other => panic!("Expected training day, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_rest_day() {
        let program = active_program(4, monday_morning());
        // Tuesday of week 1
        let entry = resolve_for(Some(&program), &(monday_morning() + Duration::days(1)));

        assert!(matches!(
            entry,
            TodayEntry::RestDay {
                week_number: 1,
                is_deload: false,
                day_of_week: DayOfWeek::Tuesday,
                ..
            }
        ));
    }

    #[test]
    fn test_rest_day_in_deload_week_carries_flag() {
        let program = active_program(4, monday_morning());
        // Tuesday of week 4
        let entry = resolve_for(Some(&program), &(monday_morning() + Duration::days(22)));

        assert!(matches!(
            entry,
            TodayEntry::RestDay {
                week_number: 4,
                is_deload: true,
                day_of_week: DayOfWeek::Tuesday,
                ..
            }
        ));
    }

    #[test]
    fn test_rest_day_keeps_its_focus() {
        let mut request = mock_generate_request(4);
        for entry in &mut request.day_pattern {
            if entry.day_of_week == "Saturday" {
                entry.focus = Some("Mobility".to_string());
            }
        }
        let activated_at = monday_morning();
        let mut program = build_program(&request, activated_at)
            .into_result()
            .expect("Request should be valid");
        program.is_active = true;
        program.activated_at = Some(activated_at);

        let saturday = monday_morning() + Duration::days(5);
        match resolve_for(Some(&program), &saturday) {
            TodayEntry::RestDay { day_of_week, focus, .. } => {
                assert_eq!(day_of_week, DayOfWeek::Saturday);
                assert_eq!(focus.as_deref(), Some("Mobility"));
            }
            other => panic!("Expected rest day, got {:?}", other),
        }
    }

    #[test]
    fn test_deload_week_training_day() {
        let program = active_program(4, monday_morning());
        // Friday of week 4
        let entry = resolve_for(Some(&program), &(monday_morning() + Duration::days(25)));

        match entry {
            TodayEntry::TrainingDay {
                week_number,
                is_deload,
                volume_multiplier,
                day_of_week,
                ..
            } => {
                assert_eq!(week_number, 4);
                assert!(is_deload);
                assert_eq!(volume_multiplier, 0.5);
                assert_eq!(day_of_week, DayOfWeek::Friday);
            }
            other => panic!("Expected training day, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_day_degrades_to_rest_without_focus() {
        let mut program = active_program(4, monday_morning());
        // Drop every Sunday entry; the other days stay scheduled
        for week in &mut program.weeks {
            week.days.retain(|d| d.day_of_week != DayOfWeek::Sunday);
        }

        let sunday = monday_morning() + Duration::days(6);
        let entry = resolve_for(Some(&program), &sunday);

        assert_eq!(
            entry,
            TodayEntry::RestDay {
                program_id: program.id,
                program_name: program.name.clone(),
                week_number: 1,
                total_weeks: 4,
                is_deload: false,
                day_of_week: DayOfWeek::Sunday,
                focus: None,
            }
        );
    }

    #[test]
    fn test_expired_program() {
        let program = active_program(4, monday_morning());
        let entry = resolve_for(Some(&program), &(monday_morning() + Duration::weeks(5)));

        assert_eq!(
            entry,
            TodayEntry::ProgramExpired {
                program_id: program.id,
                program_name: program.name.clone(),
                total_weeks: 4,
            }
        );
    }

    #[test]
    fn test_sunday_maps_to_tag_seven_in_local_time() {
        let program = active_program(4, monday_morning());
        // 2025-01-12 23:30 UTC is already Monday 2025-01-13 in UTC+2, still in week 1
        let late_sunday_utc = utc(2025, 1, 12, 23, 30);
        let east = FixedOffset::east_opt(2 * 3600).unwrap();

        let utc_entry = resolve_for(Some(&program), &late_sunday_utc);
        assert!(matches!(
            utc_entry,
            TodayEntry::RestDay { day_of_week: DayOfWeek::Sunday, .. }
        ));

        let local_entry = resolve_for(Some(&program), &late_sunday_utc.with_timezone(&east));
        assert!(matches!(
            local_entry,
            TodayEntry::TrainingDay { day_of_week: DayOfWeek::Monday, week_number: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_resolve_today_reads_active_program() {
        let pool = setup_test_db().await;
        let mut request = mock_generate_request(4);
        request.activate_immediately = true;

        let entry = resolve_today(&pool, request.user_id, Utc::now()).await.unwrap();
        assert_eq!(entry, TodayEntry::NoActiveProgram);

        let activated_at = Utc::now();
        crate::generator::generate_program(&pool, &request, activated_at)
            .await
            .unwrap();

        let entry = resolve_today(&pool, request.user_id, activated_at).await.unwrap();
        assert!(matches!(
            entry,
            TodayEntry::TrainingDay { week_number: 1, .. } | TodayEntry::RestDay { week_number: 1, .. }
        ));

        let expired = resolve_today(&pool, request.user_id, activated_at + Duration::weeks(4))
            .await
            .unwrap();
        assert!(matches!(expired, TodayEntry::ProgramExpired { total_weeks: 4, .. }));

        teardown_test_db(pool).await;
    }
}
