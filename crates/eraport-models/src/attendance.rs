//! Attendance domain models and DTOs.
//!
//! One attendance record is one observation of one student on one date. Rows
//! without a subject are daily (homeroom) check-ins; rows with a subject were
//! taken during that subject's lesson.

use chrono::{DateTime, NaiveDate, Utc};
use eraport_core::serde::deserialize_optional_trimmed;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::diagnostics::FetchFailure;
use crate::ids::{AcademicPeriodId, AttendanceRecordId, ClassId, StudentId};

/// Attendance status of one observation.
///
/// Legacy rows store Indonesian words or single-letter codes (`Hadir`, `H`,
/// `Izin`, `S`, `Alpa`, ...); all of them deserialize here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Hadir
    Present,
    /// Izin
    Excused,
    /// Sakit
    Sick,
    /// Alpa
    Absent,
}

impl AttendanceStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Excused => "excused",
            AttendanceStatus::Sick => "sick",
            AttendanceStatus::Absent => "absent",
        }
    }

    /// Parses the canonical names and every legacy spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "present" | "hadir" | "h" => Some(AttendanceStatus::Present),
            "excused" | "izin" | "ijin" | "i" => Some(AttendanceStatus::Excused),
            "sick" | "sakit" | "s" => Some(AttendanceStatus::Sick),
            "absent" | "alpa" | "alpha" | "alfa" | "a" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        AttendanceStatus::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid attendance status '{}'", raw)))
    }
}

/// Whether an observation is a daily check-in or a lesson check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceKind {
    Daily,
    Subject,
}

/// One attendance observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    pub id: AttendanceRecordId,
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub period_id: AcademicPeriodId,
    pub date: NaiveDate,
    /// Subject as recorded; `None` for daily check-ins
    pub subject: Option<String>,
    pub status: AttendanceStatus,
    pub recorded_at: DateTime<Utc>,
}

impl AttendanceRecord {
    #[must_use]
    pub fn kind(&self) -> AttendanceKind {
        match self.subject {
            Some(_) => AttendanceKind::Subject,
            None => AttendanceKind::Daily,
        }
    }
}

/// Which attendance rows a query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectScope {
    /// Daily rows only (no subject)
    Daily,
    /// Lesson rows whose subject lookup key is one of `keys`.
    ///
    /// Keys are produced by the subject normalizer so that every alias of a
    /// canonical subject selects the same rows.
    Subject { keys: Vec<String> },
}

/// Store-level filter for paging through attendance rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub period_id: AcademicPeriodId,
    pub class_id: ClassId,
    pub scope: SubjectScope,
    /// Inclusive lower date bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub to: Option<NaiveDate>,
}

impl AttendanceFilter {
    /// Whether `date` lies inside the optional bounding box.
    #[must_use]
    pub fn admits_date(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Per-student attendance counts over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StudentSummary {
    pub student_id: StudentId,
    pub student_name: String,
    pub present: usize,
    pub excused: usize,
    pub sick: usize,
    pub absent: usize,
    /// round(present / effective_days * 100), clamped to 0..=100
    pub percentage: u8,
}

/// Semester attendance summary for one class.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceReport {
    pub period_id: AcademicPeriodId,
    pub class_id: ClassId,
    /// Canonical subject, `None` for daily attendance
    pub subject: Option<String>,
    /// Distinct dates present in the fetched rows
    pub effective_days: usize,
    /// Students with at least one record, ordered by name
    pub students: Vec<StudentSummary>,
    /// `false` when paging stopped early on a failed page
    pub complete: bool,
    pub pages_read: usize,
    pub failures: Vec<FetchFailure>,
}

/// Per-student monthly detail: counts plus the status of every recorded day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StudentDetail {
    #[serde(flatten)]
    pub summary: StudentSummary,
    #[schema(value_type = Object)]
    pub daily_status: BTreeMap<NaiveDate, AttendanceStatus>,
}

/// Attendance detail of one calendar month for one class.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyAttendanceReport {
    pub month: u32,
    pub year: i32,
    pub period_id: AcademicPeriodId,
    pub class_id: ClassId,
    pub subject: Option<String>,
    pub effective_days: usize,
    pub students: Vec<StudentDetail>,
    pub complete: bool,
    pub pages_read: usize,
    pub failures: Vec<FetchFailure>,
}

/// Query parameters for the semester summary.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct SummaryQuery {
    pub period_id: AcademicPeriodId,
    pub class_id: ClassId,
    /// Subject to summarize; omit (or leave blank) for daily attendance
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub subject: Option<String>,
}

/// Query parameters for the monthly detail.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct MonthlyQuery {
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    pub period_id: AcademicPeriodId,
    pub class_id: ClassId,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub subject: Option<String>,
}

/// DTO for one check-in.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordAttendanceDto {
    pub student_id: StudentId,
    pub class_id: ClassId,
    /// Lesson subject; omit for a daily check-in
    #[validate(length(min = 1, max = 120))]
    pub subject: Option<String>,
    pub status: AttendanceStatus,
    /// Defaults to today in the school's time zone
    pub date: Option<NaiveDate>,
}

/// Row handed to the store; upserted on (student, date, subject).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendanceRecord {
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub period_id: AcademicPeriodId,
    pub date: NaiveDate,
    pub subject: Option<String>,
    pub status: AttendanceStatus,
}
