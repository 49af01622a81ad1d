//! Student and class reference entities.
//!
//! Only active students and classes take part in aggregation; inactive rows are
//! kept for history but excluded from every denominator.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ids::{ClassId, StudentId};

/// A student enrolled in a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Student {
    pub id: StudentId,
    pub class_id: ClassId,
    /// Full name as printed on the report card
    pub name: String,
    pub is_active: bool,
}

/// A class (rombel) as seen by pickers and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ClassRef {
    pub id: ClassId,
    /// Display name, e.g. "X IPA 1"
    pub name: String,
    pub is_active: bool,
}

/// Active students of a roster sorted by name, the order every report starts from.
pub fn active_roster(students: impl IntoIterator<Item = Student>) -> Vec<Student> {
    let mut roster: Vec<Student> = students.into_iter().filter(|s| s.is_active).collect();
    roster.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    roster
}
