//! Subject data models and DTOs.
//!
//! Re-exports the subject DTOs from the `eraport-models` crate.

pub use eraport_models::subjects::*;
