pub use eraport_models::attendance::*;
pub use eraport_models::diagnostics::{FailureScope, FetchFailure};
