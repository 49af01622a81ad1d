//! # E-Raport Core
//!
//! Core types, errors, and utilities shared by every e-raport crate.
//!
//! - [`errors`]: [`AppError`] with HTTP response conversion and the typed
//!   [`PeriodError`] kinds raised by period resolution
//! - [`pagination`]: sequential page cursors for stores that cap page size
//! - [`serde`]: lenient deserializers for legacy rows and query strings
//!
//! # Example
//!
//! ```ignore
//! use eraport_core::{AppError, PeriodError};
//!
//! let error: AppError = PeriodError::NoActivePeriod.into();
//! assert_eq!(error.status, axum::http::StatusCode::SERVICE_UNAVAILABLE);
//! ```

pub mod errors;
pub mod pagination;
pub mod serde;

pub use errors::{AppError, PeriodError};
pub use pagination::{PageCursor, PageRequest};
