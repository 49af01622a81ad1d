//! Teacher assignment models.
//!
//! An assignment grants a teacher the right to grade and view one class and
//! subject during one period. The subject is stored exactly as it was typed
//! (often an uppercase abbreviation) and is only normalized when grades are
//! read or written.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AcademicPeriodId, AssignmentId, ClassId, TeacherId};
use crate::students::ClassRef;

/// One (teacher, class, subject, period) grant. Uniqueness is expected but not
/// guaranteed; consumers deduplicate by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct TeacherAssignment {
    pub id: AssignmentId,
    pub teacher_id: TeacherId,
    pub class_id: ClassId,
    /// Subject name as entered, not normalized
    pub subject: String,
    pub period_id: AcademicPeriodId,
}

/// Query parameters for the teacher load endpoints.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct TeacherLoadQuery {
    /// Period to resolve the load for
    pub period_id: AcademicPeriodId,
}

/// Classes a teacher may act on during a period.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeacherClassesResponse {
    pub teacher_id: TeacherId,
    pub period_id: AcademicPeriodId,
    pub classes: Vec<ClassRef>,
}

/// Raw subject names a teacher teaches in a class during a period.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeacherSubjectsResponse {
    pub teacher_id: TeacherId,
    pub class_id: ClassId,
    pub period_id: AcademicPeriodId,
    pub subjects: Vec<String>,
}
