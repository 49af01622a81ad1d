//! Diagnostics attached to partial aggregation results.
//!
//! Aggregations recover from store failures locally (one subject, one page) and
//! keep going. A failed roster fetch is not recoverable: every denominator
//! depends on it. Whatever failed is listed here so the caller can tell a partial
//! report apart from a complete one.

use serde::Serialize;
use utoipa::ToSchema;

/// The unit of work that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureScope {
    /// Grade records of one subject
    Subject { subject: String },
    /// One page of attendance rows
    Page { index: usize, offset: i64 },
}

/// A store failure that was recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FetchFailure {
    pub scope: FailureScope,
    pub message: String,
}

impl FetchFailure {
    pub fn new(scope: FailureScope, message: impl Into<String>) -> Self {
        Self {
            scope,
            message: message.into(),
        }
    }
}
