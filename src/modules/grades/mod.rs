//! Grades module.
//!
//! Report-card grade entry and the completion overview built on top of it:
//! per subject, how many active students have a score and a finished
//! achievement description, and whether legacy data holds duplicates.

pub mod autosave;
pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use autosave::{AutosaveDebouncer, grade_autosave};
pub use router::init_grades_router;
pub use service::GradeService;
