//! Class, student and teaching-assignment seeding.
//!
//! Assignments are written with the spellings teachers actually type
//! ("MTK", "B. Indonesia", "Penjas"), so the seeded data exercises subject
//! normalization the same way imported data does.

use eraport_models::ids::{AcademicPeriodId, ClassId, StudentId, TeacherId};
use fake::Fake;
use fake::faker::boolean::en::Boolean;
use fake::faker::name::en::*;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{AssignmentSeed, ClassSeed, ClassRoster, StudentSeed};
use super::{BATCH_SIZE, SeedResult, values_clause};

const GRADE_LEVELS: [&str; 3] = ["X", "XI", "XII"];

/// Subject spellings handed out to teachers, mixing canonical names and aliases.
pub const SUBJECT_SPELLINGS: [&str; 12] = [
    "Pendidikan Agama dan Budi Pekerti",
    "PPKn",
    "B. Indonesia",
    "MTK",
    "Bahasa Inggris",
    "Penjas",
    "Sejarah Indonesia",
    "Seni Budaya",
    "Informatika",
    "Fisika",
    "Kimia",
    "Biologi",
];

pub fn generate_classes(num_classes: usize) -> Vec<ClassSeed> {
    (0..num_classes)
        .map(|i| {
            let level = GRADE_LEVELS[i % GRADE_LEVELS.len()];
            ClassSeed {
                id: ClassId::new(),
                name: format!("{} MIPA {}", level, i / GRADE_LEVELS.len() + 1),
            }
        })
        .collect()
}

pub fn generate_students(classes: &[ClassSeed], students_per_class: usize) -> Vec<StudentSeed> {
    classes
        .par_iter()
        .flat_map(|class| {
            (0..students_per_class)
                .map(|_| {
                    let first_name: String = FirstName().fake();
                    let last_name: String = LastName().fake();
                    StudentSeed {
                        id: StudentId::new(),
                        class_id: class.id,
                        name: format!("{} {}", first_name, last_name),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Deals the first `roster.subjects` spellings out to the teachers round-robin,
/// per class.
pub fn generate_assignments(
    classes: &[ClassSeed],
    teachers: &[TeacherId],
    roster: &ClassRoster,
    period_id: AcademicPeriodId,
) -> Vec<AssignmentSeed> {
    let subjects = roster.subjects.min(SUBJECT_SPELLINGS.len());

    classes
        .par_iter()
        .enumerate()
        .flat_map(|(class_idx, class)| {
            (0..subjects)
                .map(|subject_idx| AssignmentSeed {
                    teacher_id: teachers[(class_idx + subject_idx) % teachers.len()],
                    class_id: class.id,
                    subject: SUBJECT_SPELLINGS[subject_idx].to_string(),
                    period_id,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// A small share of students is marked inactive (transferred out).
fn still_enrolled() -> bool {
    Boolean(97).fake()
}

/// Seeds classes and their students. Returns the generated classes.
pub async fn seed_roster(
    db: &PgPool,
    num_classes: usize,
    roster: &ClassRoster,
) -> SeedResult<(Vec<ClassSeed>, Vec<StudentSeed>)> {
    let start_time = Instant::now();
    println!(
        "📊 Seeding {} classes ({} students each)...",
        num_classes, roster.students
    );

    let classes = generate_classes(num_classes);
    let students = generate_students(&classes, roster.students);

    let mut tx = db.begin().await?;
    for chunk in classes.chunks(BATCH_SIZE) {
        insert_classes_chunk(&mut tx, chunk).await?;
    }
    for chunk in students.chunks(BATCH_SIZE) {
        insert_students_chunk(&mut tx, chunk).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} classes and {} students in {:?}",
        classes.len(),
        students.len(),
        start_time.elapsed()
    );

    Ok((classes, students))
}

pub async fn seed_assignments(db: &PgPool, assignments: &[AssignmentSeed]) -> SeedResult<u64> {
    let start_time = Instant::now();
    println!("📊 Seeding {} teaching assignments...", assignments.len());

    let mut tx = db.begin().await?;
    let mut inserted = 0;
    for chunk in assignments.chunks(BATCH_SIZE) {
        inserted += insert_assignments_chunk(&mut tx, chunk).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} assignments in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

async fn insert_classes_chunk(
    tx: &mut Transaction<'_, Postgres>,
    classes: &[ClassSeed],
) -> SeedResult<u64> {
    if classes.is_empty() {
        return Ok(0);
    }

    let query = format!(
        "INSERT INTO classes (id, name) VALUES {}",
        values_clause(classes.len(), 2)
    );

    let mut q = sqlx::query(&query);
    for class in classes {
        q = q.bind(class.id).bind(&class.name);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> SeedResult<u64> {
    if students.is_empty() {
        return Ok(0);
    }

    let query = format!(
        "INSERT INTO students (id, class_id, name, is_active) VALUES {}",
        values_clause(students.len(), 4)
    );

    let mut q = sqlx::query(&query);
    for student in students {
        q = q
            .bind(student.id)
            .bind(student.class_id)
            .bind(&student.name)
            .bind(still_enrolled());
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}

async fn insert_assignments_chunk(
    tx: &mut Transaction<'_, Postgres>,
    assignments: &[AssignmentSeed],
) -> SeedResult<u64> {
    if assignments.is_empty() {
        return Ok(0);
    }

    let query = format!(
        "INSERT INTO teacher_assignments (teacher_id, class_id, subject, period_id) VALUES {}",
        values_clause(assignments.len(), 4)
    );

    let mut q = sqlx::query(&query);
    for assignment in assignments {
        q = q
            .bind(assignment.teacher_id)
            .bind(assignment.class_id)
            .bind(&assignment.subject)
            .bind(assignment.period_id);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}
