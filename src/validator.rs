//! Request extractors that deserialize and then validate.
//!
//! Malformed input is a 400; well-formed input that breaks a validation rule
//! is a 422 with every failing field listed.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use eraport_core::AppError;

/// Flattens (possibly nested) validation errors into `field: message` pairs.
fn collect_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    match &error.message {
                        Some(message) => out.push(format!("{}: {}", path, message)),
                        None => out.push(format!("{} is invalid", path)),
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

pub fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_errors("", errors, &mut messages);
    messages.sort();
    messages.join(", ")
}

fn validate<T: Validate>(value: &T) -> Result<(), AppError> {
    value
        .validate()
        .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))
}

/// Name of the field serde reported as missing, if that is the failure.
fn missing_field(body: &str) -> Option<&str> {
    body.split("missing field `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let body = rejection.body_text();
    match missing_field(&body) {
        Some(field) => AppError::bad_request(anyhow!("{} is required", field)),
        None => AppError::bad_request(anyhow!("Invalid request body: {}", body)),
    }
}

fn query_rejection(rejection: QueryRejection) -> AppError {
    let body = rejection.body_text();
    match missing_field(&body) {
        Some(field) => AppError::bad_request(anyhow!("{} is required", field)),
        None => AppError::bad_request(anyhow!("Invalid query string: {}", body)),
    }
}

/// JSON body extractor that runs `Validate` after deserializing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        validate(&value)?;
        Ok(ValidatedJson(value))
    }
}

/// Query-string extractor that runs `Validate` after deserializing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(query_rejection)?;
        validate(&value)?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Inner {
        #[validate(range(min = 1, max = 12))]
        month: u32,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Outer {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(nested)]
        items: Vec<Inner>,
    }

    #[test]
    fn test_missing_field_is_extracted() {
        assert_eq!(
            missing_field("Failed to deserialize query string: missing field `class_id`"),
            Some("class_id")
        );
        assert_eq!(missing_field("invalid type: string"), None);
    }

    #[test]
    fn test_format_errors_walks_nested_lists() {
        let value = Outer {
            name: String::new(),
            items: vec![Inner { month: 3 }, Inner { month: 13 }],
        };
        let errors = value.validate().unwrap_err();
        let message = format_errors(&errors);
        assert!(message.contains("name: must not be empty"), "{message}");
        assert!(message.contains("items[1].month is invalid"), "{message}");
    }
}
