//! Grade ledger (leger nilai) module.
//!
//! One row per active student with the latest score of every subject, the
//! rounded sum, the average over scored subjects and the top-three ranks.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_ledger_router;
pub use service::LedgerService;
