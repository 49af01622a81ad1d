//! Data access for periods, rosters, grades and attendance.
//!
//! Services never talk to the database directly; they go through
//! [`AcademicStore`], which is implemented by [`PgStore`] for production and by
//! [`MemoryStore`] in tests (behind the `test-utils` feature).
//!
//! Stores return rows as they are stored. Legacy representations (textual
//! semesters, string scores, Indonesian status codes) are decoded into the
//! typed models at this boundary; subject names are left as recorded and only
//! compared through their lookup keys.

use async_trait::async_trait;

use eraport_core::PageRequest;
use eraport_models::attendance::{AttendanceFilter, AttendanceRecord, NewAttendanceRecord};
use eraport_models::grades::{GradeRecordWithObjectives, NewGradeRecord};
use eraport_models::ids::{AcademicPeriodId, ClassId, GradeRecordId, TeacherId};
use eraport_models::periods::{AcademicPeriod, NewAcademicPeriod};
use eraport_models::students::{ClassRef, Student};
use eraport_models::assignments::TeacherAssignment;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed row: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Unique-constraint violations surface as [`StoreError::Conflict`].
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return StoreError::Conflict(db_err.message().to_string());
        }
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait AcademicStore: Send + Sync {
    /// All periods, ordered by year then semester.
    async fn list_periods(&self) -> Result<Vec<AcademicPeriod>, StoreError>;

    async fn find_period(
        &self,
        period_id: AcademicPeriodId,
    ) -> Result<Option<AcademicPeriod>, StoreError>;

    /// Inserts an inactive period. (year, semester) clashes are `Conflict`.
    async fn insert_period(&self, period: NewAcademicPeriod)
    -> Result<AcademicPeriod, StoreError>;

    /// Makes `period_id` the only active period. `None` if it does not exist.
    async fn activate_period(
        &self,
        period_id: AcademicPeriodId,
    ) -> Result<Option<AcademicPeriod>, StoreError>;

    /// Assignment rows of a period, optionally narrowed to a teacher and/or class.
    async fn list_assignments(
        &self,
        teacher_id: Option<TeacherId>,
        class_id: Option<ClassId>,
        period_id: AcademicPeriodId,
    ) -> Result<Vec<TeacherAssignment>, StoreError>;

    async fn list_classes(&self, class_ids: &[ClassId]) -> Result<Vec<ClassRef>, StoreError>;

    /// Every student of a class, active or not.
    async fn list_students(&self, class_id: ClassId) -> Result<Vec<Student>, StoreError>;

    /// Grade records of a class and period with their objective details.
    ///
    /// `subject_keys` narrows to records whose subject lookup key is listed.
    async fn list_grade_records(
        &self,
        class_id: ClassId,
        period_id: AcademicPeriodId,
        subject_keys: Option<&[String]>,
    ) -> Result<Vec<GradeRecordWithObjectives>, StoreError>;

    /// Upserts on (student, subject, period) and replaces the objective details.
    async fn upsert_grade_record(
        &self,
        record: NewGradeRecord,
    ) -> Result<GradeRecordWithObjectives, StoreError>;

    /// Deletes grade records (objective details cascade). Returns rows removed.
    async fn delete_grade_records(&self, ids: &[GradeRecordId]) -> Result<u64, StoreError>;

    /// One page of attendance rows, ordered by (date, student, id).
    async fn fetch_attendance_page(
        &self,
        filter: &AttendanceFilter,
        page: PageRequest,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Upserts on (student, date, subject).
    async fn upsert_attendance(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError>;
}
