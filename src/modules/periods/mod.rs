//! Academic periods module.
//!
//! Resolves the active academic year and semester, validates that incoming
//! grade and attendance data targets an editable period, and performs period
//! transitions. Every other module asks this one for a [`PeriodContext`]
//! instead of reading the period table itself.
//!
//! [`PeriodContext`]: model::PeriodContext

pub mod cache;
pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use cache::PeriodCache;
pub use router::init_periods_router;
pub use service::PeriodService;
