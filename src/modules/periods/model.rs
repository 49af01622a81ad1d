//! Academic period data models and DTOs.
//!
//! This module re-exports period models from the `eraport-models` crate.

pub use eraport_models::periods::*;
