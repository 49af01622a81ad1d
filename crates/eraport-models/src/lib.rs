//! # E-Raport Models
//!
//! Domain models and DTOs for the e-raport engine.
//!
//! Every entity that crosses a crate boundary lives here: database rows,
//! request/response DTOs and the report shapes produced by the aggregators.
//!
//! # Modules
//!
//! - [`ids`]: UUID newtypes that keep entity ids apart at compile time
//! - [`periods`]: academic periods, semesters and period validation
//! - [`assignments`]: teacher assignments and teacher-load responses
//! - [`students`]: students and class references
//! - [`subjects`]: subject normalization DTOs
//! - [`grades`]: grade records, completion reports and duplicate cleanup
//! - [`attendance`]: attendance records, filters and summaries
//! - [`ledger`]: ranked grade ledger
//! - [`diagnostics`]: failures recovered from during aggregation
//!
//! # Example
//!
//! ```ignore
//! use eraport_models::periods::Semester;
//!
//! let semester: Semester = serde_json::from_str(r#""Genap""#)?;
//! assert_eq!(semester.number(), 2);
//! ```

pub mod assignments;
pub mod attendance;
pub mod diagnostics;
pub mod grades;
pub mod ids;
pub mod ledger;
pub mod periods;
pub mod students;
pub mod subjects;

pub use assignments::{
    TeacherAssignment, TeacherClassesResponse, TeacherLoadQuery, TeacherSubjectsResponse,
};
pub use attendance::{
    AttendanceFilter, AttendanceKind, AttendanceRecord, AttendanceReport, AttendanceStatus,
    MonthlyAttendanceReport, MonthlyQuery, NewAttendanceRecord, RecordAttendanceDto,
    StudentDetail, StudentSummary, SubjectScope, SummaryQuery,
};
pub use diagnostics::{FailureScope, FetchFailure};
pub use grades::{
    CleanDuplicatesDto, CleanupReport, CompletionQuery, CompletionReport, CompletionStatus,
    GradeRecord, GradeRecordWithObjectives, NewGradeRecord, NewObjectiveDetail, ObjectiveDetail,
    ObjectiveInput, SaveGradeDto, SubjectCompletion,
};
pub use ledger::{LedgerQuery, LedgerReport, RankedRow};
pub use periods::{
    AcademicPeriod, CreatePeriodDto, NewAcademicPeriod, PeriodContext, PeriodQuery,
    PeriodValidation, Semester,
};
pub use students::{ClassRef, Student, active_roster};
pub use subjects::{NormalizeQuery, NormalizedSubject, SubjectListResponse};
