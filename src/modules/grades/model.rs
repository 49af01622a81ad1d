pub use eraport_models::diagnostics::{FailureScope, FetchFailure};
pub use eraport_models::grades::*;
