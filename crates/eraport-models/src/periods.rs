//! Academic period domain models and DTOs.
//!
//! An academic period is one semester of one academic year (e.g. "2025/2026",
//! semester 1). Grades and attendance are always scoped to a period. Exactly one
//! period is active system-wide; it decides the default selection in pickers and
//! which academic year still accepts new data.

use chrono::{DateTime, NaiveDate, Utc};
use eraport_core::PeriodError;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::ids::AcademicPeriodId;

/// Semester within an academic year.
///
/// Legacy rows carry the semester as `1`, `"2"`, `"Ganjil"`, `"genap"`,
/// `"Semester 1"`, `"II"` and so on; all of them deserialize here. Serialization
/// always produces the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Semester {
    /// Semester 1 (ganjil)
    Odd = 1,
    /// Semester 2 (genap)
    Even = 2,
}

impl Semester {
    #[must_use]
    pub fn number(self) -> i16 {
        self as i16
    }

    #[must_use]
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Semester::Odd),
            2 => Some(Semester::Even),
            _ => None,
        }
    }

    /// Parses any of the textual semester spellings found in legacy data.
    #[must_use]
    pub fn parse_legacy(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        let key = lowered
            .strip_prefix("semester")
            .map(str::trim)
            .unwrap_or(lowered.as_str());

        match key {
            "1" | "i" | "ganjil" | "odd" => Some(Semester::Odd),
            "2" | "ii" | "genap" | "even" => Some(Semester::Even),
            _ => None,
        }
    }

    /// Indonesian label used on report cards.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Semester::Odd => "Ganjil",
            Semester::Even => "Genap",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for Semester {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.number())
    }
}

impl<'de> Deserialize<'de> for Semester {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Semester::from_number(n)
                .ok_or_else(|| de::Error::custom(format!("invalid semester number {}", n))),
            Raw::Text(s) => Semester::parse_legacy(&s)
                .ok_or_else(|| de::Error::custom(format!("invalid semester '{}'", s))),
        }
    }
}

/// One semester of one academic year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AcademicPeriod {
    /// Stable identifier, never reused
    pub id: AcademicPeriodId,
    /// Academic year label, e.g. "2025/2026"
    pub year: String,
    /// Semester number (1 = ganjil, 2 = genap)
    #[schema(value_type = i16, minimum = 1, maximum = 2)]
    pub semester: Semester,
    /// First calendar day of the semester
    pub start_date: NaiveDate,
    /// Last calendar day of the semester
    pub end_date: NaiveDate,
    /// Whether this is the single active period
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AcademicPeriod {
    /// Whether `date` falls inside `[start_date, end_date]`.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Checks the "YYYY/YYYY" academic year format with consecutive years.
pub fn validate_academic_year(year: &str) -> Result<(), ValidationError> {
    let invalid = || {
        let mut error = ValidationError::new("academic_year");
        error.message = Some("year must look like 2025/2026".into());
        error
    };

    let (first, second) = year.split_once('/').ok_or_else(invalid)?;
    if first.len() != 4 || second.len() != 4 {
        return Err(invalid());
    }
    let first: i32 = first.parse().map_err(|_| invalid())?;
    let second: i32 = second.parse().map_err(|_| invalid())?;
    if second != first + 1 {
        return Err(invalid());
    }
    Ok(())
}

#[allow(clippy::ptr_arg)]
fn validate_year_field(year: &String) -> Result<(), ValidationError> {
    validate_academic_year(year)
}

/// DTO for opening a new semester.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePeriodDto {
    /// Academic year label, "YYYY/YYYY" with consecutive years
    #[validate(custom(function = "validate_year_field"))]
    pub year: String,
    /// Semester (1/2, or "ganjil"/"genap")
    #[schema(value_type = i16, minimum = 1, maximum = 2)]
    pub semester: Semester,
    pub start_date: NaiveDate,
    /// Must be after `start_date`
    pub end_date: NaiveDate,
}

/// Row handed to the store when a period is created.
#[derive(Debug, Clone)]
pub struct NewAcademicPeriod {
    pub year: String,
    pub semester: Semester,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Outcome of checking whether a period accepts new grade/attendance data.
///
/// Returned rather than raised so callers can simply disable a save button.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodValidation {
    pub period_id: AcademicPeriodId,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<PeriodError>,
}

impl PeriodValidation {
    pub fn accepted(period_id: AcademicPeriodId) -> Self {
        Self {
            period_id,
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(period_id: AcademicPeriodId, reason: PeriodError) -> Self {
        Self {
            period_id,
            valid: false,
            reason: Some(reason),
        }
    }

    /// Turns a rejection into an error for write paths.
    pub fn into_result(self) -> Result<(), PeriodError> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

/// Resolved period information handed to aggregators for one request.
///
/// Built by the period resolver and cached until the next period transition.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PeriodContext {
    /// The single active period
    pub active: AcademicPeriod,
    /// Every period of the active academic year, semester ascending
    pub year_periods: Vec<AcademicPeriod>,
    /// When this context was resolved
    pub resolved_at: DateTime<Utc>,
}

impl PeriodContext {
    /// Whether `period_id` belongs to the active academic year.
    #[must_use]
    pub fn in_active_year(&self, period_id: AcademicPeriodId) -> bool {
        self.year_periods.iter().any(|p| p.id == period_id)
    }

    #[must_use]
    pub fn period(&self, period_id: AcademicPeriodId) -> Option<&AcademicPeriod> {
        self.year_periods.iter().find(|p| p.id == period_id)
    }
}

/// Query parameters for period endpoints that need a period id.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct PeriodQuery {
    pub period_id: AcademicPeriodId,
}
