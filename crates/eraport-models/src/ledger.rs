//! Grade ledger (leger nilai) models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AcademicPeriodId, ClassId, StudentId};

/// One student's line in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RankedRow {
    pub student_id: StudentId,
    pub student_name: String,
    /// Latest score per canonical subject
    #[schema(value_type = Object)]
    pub scores: BTreeMap<String, f64>,
    /// Rounded sum of all subject scores
    pub sum: i64,
    /// Mean over the scored subjects, two decimals
    pub average: f64,
    /// 1, 2 or 3 for the top three rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u8>,
}

/// Ranked ledger of one class for one period.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerReport {
    pub class_id: ClassId,
    pub period_id: AcademicPeriodId,
    /// Subject columns in curriculum order
    pub subjects: Vec<String>,
    /// Rows with a positive sum, sum descending
    pub rows: Vec<RankedRow>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct LedgerQuery {
    pub class_id: ClassId,
    pub period_id: AcademicPeriodId,
}
