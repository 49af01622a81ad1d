pub use eraport_models::assignments::*;
pub use eraport_models::students::ClassRef;
