//! Report-card grade models.
//!
//! A grade record (`nilai_eraport`) holds one student's final score and
//! achievement description for one subject in one period. Its objective details
//! (`nilai_eraport_detail`) tick each learning objective (TP) as achieved or
//! needing improvement; `None` means the objective is not assessed yet.

use chrono::{DateTime, Utc};
use eraport_core::serde::deserialize_lenient_score;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::diagnostics::FetchFailure;
use crate::ids::{
    AcademicPeriodId, ClassId, GradeRecordId, ObjectiveDetailId, ObjectiveId, StudentId,
    TeacherId,
};
use crate::periods::Semester;

/// One student's grade entry for (class, subject, period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GradeRecord {
    pub id: GradeRecordId,
    pub student_id: StudentId,
    pub class_id: ClassId,
    /// Canonical subject name
    pub subject: String,
    pub period_id: AcademicPeriodId,
    #[schema(value_type = i16, minimum = 1, maximum = 2)]
    pub semester: Semester,
    /// 0-100; `None` or 0 means "not entered"
    #[serde(default, deserialize_with = "deserialize_lenient_score")]
    pub final_score: Option<f64>,
    /// Free text derived from the objective checkmarks
    pub achievement_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One learning-objective checkmark of a grade record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ObjectiveDetail {
    pub id: ObjectiveDetailId,
    pub grade_record_id: GradeRecordId,
    pub objective_id: ObjectiveId,
    /// `Some(true)` achieved, `Some(false)` needs improvement, `None` not assessed
    pub achieved: Option<bool>,
}

/// A grade record joined with its objective details.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GradeRecordWithObjectives {
    #[serde(flatten)]
    pub record: GradeRecord,
    pub objectives: Vec<ObjectiveDetail>,
}

/// Fill status of one subject for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// No student has a score
    Empty,
    /// Some, but not all, students have a score
    Partial,
    /// Every active student has a score
    Complete,
    /// More scored records than students: at least one student has two records
    Duplicate,
}

impl CompletionStatus {
    /// Classifies a count of scored records against the active roster size.
    #[must_use]
    pub fn classify(count: usize, total_students: usize) -> Self {
        if count == 0 {
            CompletionStatus::Empty
        } else if count < total_students {
            CompletionStatus::Partial
        } else if count == total_students {
            CompletionStatus::Complete
        } else {
            CompletionStatus::Duplicate
        }
    }
}

/// Completion row for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SubjectCompletion {
    /// Canonical subject name
    pub subject: String,
    pub class_id: ClassId,
    pub scored_count: usize,
    pub described_count: usize,
    pub total_students: usize,
    pub status: CompletionStatus,
}

/// Completion report for one class and period.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompletionReport {
    pub class_id: ClassId,
    pub period_id: AcademicPeriodId,
    pub total_students: usize,
    /// One row per subject, in curriculum order
    pub subjects: Vec<SubjectCompletion>,
    /// Subjects (or the roster) that could not be fetched
    pub failures: Vec<FetchFailure>,
}

impl CompletionReport {
    /// Whether any subject was flagged as holding duplicate records.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.subjects
            .iter()
            .any(|s| s.status == CompletionStatus::Duplicate)
    }
}

/// Query parameters for the completion report.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct CompletionQuery {
    pub class_id: ClassId,
    pub period_id: AcademicPeriodId,
    /// Restrict to the subjects this teacher is assigned; all assigned subjects otherwise
    pub teacher_id: Option<TeacherId>,
}

/// Request to remove duplicate grade records.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CleanDuplicatesDto {
    pub class_id: ClassId,
    pub period_id: AcademicPeriodId,
    /// Must be `true`; the operation deletes rows irreversibly
    #[serde(default)]
    pub confirm: bool,
}

/// Outcome of a duplicate cleanup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct CleanupReport {
    /// (student, subject) pairs that held more than one record
    pub affected_pairs: usize,
    /// Records deleted
    pub removed_records: usize,
    /// Ids of the deleted records
    pub removed_ids: Vec<GradeRecordId>,
}

/// One objective checkmark sent with a grade.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ObjectiveInput {
    pub objective_id: ObjectiveId,
    /// Objective text, used to compose the achievement description
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub achieved: Option<bool>,
}

/// DTO for saving one student's grade.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveGradeDto {
    pub student_id: StudentId,
    pub class_id: ClassId,
    /// Subject as typed; normalized before storage
    #[validate(length(min = 1, max = 120))]
    pub subject: String,
    pub period_id: AcademicPeriodId,
    #[validate(range(min = 0.0, max = 100.0))]
    pub final_score: Option<f64>,
    /// Used only while some objectives are still unassessed
    pub achievement_description: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub objectives: Vec<ObjectiveInput>,
}

/// Objective checkmark handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObjectiveDetail {
    pub objective_id: ObjectiveId,
    pub achieved: Option<bool>,
}

/// Grade row handed to the store; upserted on (student, subject, period).
#[derive(Debug, Clone, PartialEq)]
pub struct NewGradeRecord {
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub subject: String,
    pub period_id: AcademicPeriodId,
    pub semester: Semester,
    pub final_score: Option<f64>,
    pub achievement_description: Option<String>,
    pub objectives: Vec<NewObjectiveDetail>,
}
