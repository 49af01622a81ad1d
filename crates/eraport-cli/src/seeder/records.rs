//! Grade and attendance seeding.
//!
//! Rows are written in the legacy shapes the engine has to tolerate: textual
//! semesters, comma-decimal scores, empty scores, single-letter attendance
//! codes and the odd alias duplicate of a grade.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use eraport::modules::subjects::normalize;
use eraport_models::ids::GradeRecordId;
use eraport_models::periods::AcademicPeriod;
use fake::Fake;
use fake::faker::boolean::en::Boolean;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{AssignmentSeed, AttendanceSeed, GradeSeed, StudentSeed};
use super::{BATCH_SIZE, SeedResult, values_clause};

const DESCRIPTIONS: [&str; 4] = [
    "Menunjukkan penguasaan yang baik dalam seluruh tujuan pembelajaran.",
    "Menunjukkan penguasaan yang baik dalam sebagian besar materi.",
    "Perlu bantuan dalam memahami konsep dasar.",
    "-",
];

const ABSENCE_CODES: [&str; 6] = ["S", "Sakit", "I", "Izin", "A", "Alpa"];

/// Score in the textual forms found in imported rows.
fn legacy_score() -> Option<String> {
    if Boolean(8).fake() {
        return if Boolean(50).fake() {
            Some(String::new())
        } else {
            None
        };
    }
    let whole: u32 = (60..100).fake();
    if Boolean(20).fake() {
        Some(format!("{},5", whole))
    } else {
        Some(whole.to_string())
    }
}

fn legacy_description() -> Option<String> {
    if Boolean(15).fake() {
        return None;
    }
    let idx: usize = (0..DESCRIPTIONS.len()).fake();
    Some(DESCRIPTIONS[idx].to_string())
}

/// One grade per (assigned subject, student) plus an occasional duplicate
/// stored under the canonical spelling.
pub fn generate_grades(
    assignments: &[AssignmentSeed],
    students: &[StudentSeed],
    period: &AcademicPeriod,
) -> Vec<GradeSeed> {
    assignments
        .par_iter()
        .flat_map(|assignment| {
            let canonical = normalize(&assignment.subject);
            let semester = if Boolean(50).fake() {
                period.semester.label().to_string()
            } else {
                period.semester.number().to_string()
            };

            let mut grades = Vec::new();
            for student in students.iter().filter(|s| s.class_id == assignment.class_id) {
                let seed = |subject: &str| GradeSeed {
                    id: GradeRecordId::new(),
                    student_id: student.id,
                    class_id: assignment.class_id,
                    subject: subject.to_string(),
                    period_id: assignment.period_id,
                    semester: semester.clone(),
                    final_score: legacy_score(),
                    achievement_description: legacy_description(),
                };
                grades.push(seed(&assignment.subject));
                if canonical != assignment.subject && Boolean(3).fake() {
                    grades.push(seed(&canonical));
                }
            }
            grades
        })
        .collect()
}

/// Weekdays from the period start, at most `days` of them and never past
/// the period end.
pub fn school_days(period: &AcademicPeriod, days: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(days);
    let mut day = period.start_date;
    while dates.len() < days && day <= period.end_date {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        day = match day.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    dates
}

/// Daily check-ins for every student on every school day.
pub fn generate_attendance(
    students: &[StudentSeed],
    period: &AcademicPeriod,
    days: usize,
) -> Vec<AttendanceSeed> {
    let dates = school_days(period, days);

    students
        .par_iter()
        .flat_map(|student| {
            dates
                .iter()
                .map(|&date| {
                    let status = if Boolean(92).fake() {
                        if Boolean(50).fake() { "Hadir" } else { "H" }
                    } else {
                        let idx: usize = (0..ABSENCE_CODES.len()).fake();
                        ABSENCE_CODES[idx]
                    };
                    AttendanceSeed {
                        student_id: student.id,
                        class_id: student.class_id,
                        period_id: period.id,
                        date,
                        status,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn seed_grades(db: &PgPool, grades: &[GradeSeed]) -> SeedResult<u64> {
    let start_time = Instant::now();
    println!("📊 Seeding {} grade records...", grades.len());

    let mut tx = db.begin().await?;
    let mut inserted = 0;
    for chunk in grades.chunks(BATCH_SIZE) {
        inserted += insert_grades_chunk(&mut tx, chunk).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} grade records in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

pub async fn seed_attendance(db: &PgPool, records: &[AttendanceSeed]) -> SeedResult<u64> {
    let start_time = Instant::now();
    println!("📊 Seeding {} attendance records...", records.len());

    let mut tx = db.begin().await?;
    let mut inserted = 0;
    for chunk in records.chunks(BATCH_SIZE) {
        inserted += insert_attendance_chunk(&mut tx, chunk).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} attendance records in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

async fn insert_grades_chunk(
    tx: &mut Transaction<'_, Postgres>,
    grades: &[GradeSeed],
) -> SeedResult<u64> {
    if grades.is_empty() {
        return Ok(0);
    }

    let query = format!(
        "INSERT INTO grade_records (id, student_id, class_id, subject, period_id, semester, \
         final_score, achievement_description) VALUES {} ON CONFLICT DO NOTHING",
        values_clause(grades.len(), 8)
    );

    let mut q = sqlx::query(&query);
    for grade in grades {
        q = q
            .bind(grade.id)
            .bind(grade.student_id)
            .bind(grade.class_id)
            .bind(&grade.subject)
            .bind(grade.period_id)
            .bind(&grade.semester)
            .bind(&grade.final_score)
            .bind(&grade.achievement_description);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}

async fn insert_attendance_chunk(
    tx: &mut Transaction<'_, Postgres>,
    records: &[AttendanceSeed],
) -> SeedResult<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let query = format!(
        "INSERT INTO attendance_records (student_id, class_id, period_id, date, status) \
         VALUES {} ON CONFLICT DO NOTHING",
        values_clause(records.len(), 5)
    );

    let mut q = sqlx::query(&query);
    for record in records {
        q = q
            .bind(record.student_id)
            .bind(record.class_id)
            .bind(record.period_id)
            .bind(record.date)
            .bind(record.status);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}
