use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationErrors;

/// Failures raised while resolving or validating an academic period.
///
/// `NoActivePeriod` is fatal for the operation that needed a period and must be
/// propagated so the caller can block the whole screen. The other two kinds are
/// also returned as plain values from input validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeriodError {
    #[error("no active academic year configured")]
    NoActivePeriod,
    #[error("academic period {period_id} not found")]
    PeriodNotFound { period_id: Uuid },
    #[error("academic period {period_id} is not part of the active academic year")]
    PeriodNotEditable { period_id: Uuid },
}

impl PeriodError {
    pub fn status(&self) -> StatusCode {
        match self {
            PeriodError::NoActivePeriod => StatusCode::SERVICE_UNAVAILABLE,
            PeriodError::PeriodNotFound { .. } => StatusCode::NOT_FOUND,
            PeriodError::PeriodNotEditable { .. } => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    /// Returns the period error carried by this error, if any.
    pub fn period_error(&self) -> Option<&PeriodError> {
        self.error.downcast_ref::<PeriodError>()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.error.downcast_ref::<PeriodError>() {
            Some(period_error) => Json(json!({
                "error": self.error.to_string(),
                "kind": period_error,
            })),
            None => Json(json!({
                "error": self.error.to_string()
            })),
        };

        (self.status, body).into_response()
    }
}

/// Anything convertible into `anyhow::Error` becomes an `AppError`.
///
/// Period errors and validation errors keep their own status codes; everything
/// else is reported as an internal error.
impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        let status = if let Some(period_error) = error.downcast_ref::<PeriodError>() {
            period_error.status()
        } else if error.downcast_ref::<ValidationErrors>().is_some() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        Self { status, error }
    }
}
