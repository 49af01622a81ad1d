pub use eraport_models::ledger::*;
