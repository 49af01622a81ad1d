//! Database seeding for development and load testing.
//!
//! Seeds classes, students, teaching assignments, grades and daily
//! attendance into one academic period. Periods themselves are never seeded
//! or cleared; create and activate them through the API or the CLI.

pub mod models;
pub mod records;
pub mod roster;

use eraport_models::ids::TeacherId;
use eraport_models::periods::AcademicPeriod;
use sqlx::PgPool;
use std::time::Instant;

pub use models::{ClassRoster, SeedConfig};

pub type SeedResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Rows per multi-value INSERT.
pub(crate) const BATCH_SIZE: usize = 500;

/// `($1, $2), ($3, $4), ...` for `rows` tuples of `cols` parameters.
pub(crate) fn values_clause(rows: usize, cols: usize) -> String {
    (0..rows)
        .map(|row| {
            let params: Vec<String> = (1..=cols)
                .map(|col| format!("${}", row * cols + col))
                .collect();
            format!("({})", params.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Seeds a full data set into `period`.
pub async fn seed_all(db: &PgPool, period: &AcademicPeriod, config: SeedConfig) -> SeedResult<()> {
    let start_time = Instant::now();
    println!(
        "\n🌱 Seeding into {} semester {}...\n",
        period.year, period.semester
    );

    let (classes, students) = roster::seed_roster(db, config.num_classes, &config.roster).await?;

    let teachers: Vec<TeacherId> = (0..config.teachers.max(1))
        .map(|_| TeacherId::new())
        .collect();
    let assignments = roster::generate_assignments(&classes, &teachers, &config.roster, period.id);
    roster::seed_assignments(db, &assignments).await?;

    let grades = records::generate_grades(&assignments, &students, period);
    records::seed_grades(db, &grades).await?;

    let attendance = records::generate_attendance(&students, period, config.attendance_days);
    records::seed_attendance(db, &attendance).await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!("   Teacher ids:");
    for teacher in &teachers {
        println!("   - {}", teacher);
    }

    Ok(())
}

/// Removes every seeded row. Academic periods are kept.
pub async fn clear_all(db: &PgPool) -> SeedResult<()> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let mut tx = db.begin().await?;
    for table in [
        "attendance_records",
        "grade_records",
        "teacher_assignments",
        "students",
        "classes",
    ] {
        let removed = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        println!("   ✓ Deleted {} rows from {}", removed, table);
    }
    tx.commit().await?;

    println!("\n✅ Cleared in {:?}", start_time.elapsed());
    Ok(())
}
