//! Seed rows and seeding configuration.

use chrono::NaiveDate;
use eraport_models::ids::{AcademicPeriodId, ClassId, GradeRecordId, StudentId, TeacherId};

pub struct ClassSeed {
    pub id: ClassId,
    pub name: String,
}

pub struct StudentSeed {
    pub id: StudentId,
    pub class_id: ClassId,
    pub name: String,
}

/// Subjects are seeded in the spellings teachers actually type.
pub struct AssignmentSeed {
    pub teacher_id: TeacherId,
    pub class_id: ClassId,
    pub subject: String,
    pub period_id: AcademicPeriodId,
}

/// Grade row in its stored (legacy-tolerant) text form.
pub struct GradeSeed {
    pub id: GradeRecordId,
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub subject: String,
    pub period_id: AcademicPeriodId,
    pub semester: String,
    pub final_score: Option<String>,
    pub achievement_description: Option<String>,
}

pub struct AttendanceSeed {
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub period_id: AcademicPeriodId,
    pub date: NaiveDate,
    pub status: &'static str,
}

/// Configuration for the roster of each seeded class.
#[derive(Clone)]
pub struct ClassRoster {
    pub students: usize,
    pub subjects: usize,
}

impl Default for ClassRoster {
    fn default() -> Self {
        Self {
            students: 32,
            subjects: 8,
        }
    }
}

/// Complete configuration for database seeding.
#[derive(Clone)]
pub struct SeedConfig {
    pub num_classes: usize,
    pub roster: ClassRoster,
    pub teachers: usize,
    /// School days of attendance, counted from the period start
    pub attendance_days: usize,
}

impl SeedConfig {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            roster: ClassRoster::default(),
            teachers: 6,
            attendance_days: 40,
        }
    }

    pub fn with_roster(mut self, roster: ClassRoster) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_teachers(mut self, teachers: usize) -> Self {
        self.teachers = teachers.max(1);
        self
    }

    pub fn with_attendance_days(mut self, days: usize) -> Self {
        self.attendance_days = days;
        self
    }
}
