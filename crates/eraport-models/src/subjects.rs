//! Subject name DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct NormalizeQuery {
    /// Subject name as typed
    #[validate(length(max = 200))]
    pub name: String,
}

/// Result of normalizing one subject name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NormalizedSubject {
    pub input: String,
    pub canonical: String,
    /// Whether the name matched the alias table; unknown names pass through
    pub known: bool,
    /// Position in the curriculum order, `None` for unknown subjects
    pub curriculum_rank: Option<usize>,
}

/// Canonical subjects in curriculum order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubjectListResponse {
    pub subjects: Vec<String>,
}
