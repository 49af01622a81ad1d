//! Strongly-typed ID newtypes for domain entities.
//!
//! Every id is a `Uuid` underneath, but a `StudentId` cannot be passed where a
//! `ClassId` is expected. The store layer binds them directly thanks to the
//! transparent `sqlx::Type` derive.
//!
//! # Example
//!
//! ```ignore
//! use eraport_models::ids::{ClassId, StudentId};
//!
//! fn roster(class_id: ClassId) { /* ... */ }
//!
//! let class_id = ClassId::new();
//! roster(class_id);               // OK
//! // roster(StudentId::new());    // Compile error! Type mismatch.
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Defines a UUID-backed id newtype with serde, sqlx and OpenAPI support.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        #[schema(value_type = String, format = "uuid")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID.
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an ID from a u128 value (fixtures and seeds).
            #[inline]
            pub const fn from_u128(v: u128) -> Self {
                Self(Uuid::from_u128(v))
            }

            #[inline]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            #[inline]
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            #[inline]
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Id of one semester of one academic year.
    AcademicPeriodId
);

define_id!(
    /// Id of a teacher account.
    TeacherId
);

define_id!(
    /// Id of a class (rombel).
    ClassId
);

define_id!(
    /// Id of a student.
    StudentId
);

define_id!(
    /// Id of a teacher-assignment row.
    AssignmentId
);

define_id!(
    /// Id of a report-card grade row (`nilai_eraport`).
    GradeRecordId
);

define_id!(
    /// Id of a learning objective (TP).
    ObjectiveId
);

define_id!(
    /// Id of an objective checkmark row (`nilai_eraport_detail`).
    ObjectiveDetailId
);

define_id!(
    /// Id of one attendance observation.
    AttendanceRecordId
);
