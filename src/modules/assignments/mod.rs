//! Teacher assignments module.
//!
//! Answers "which classes and subjects may this teacher act on in this
//! period". Results are deduplicated by value because the assignment table
//! tolerates repeated rows.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_teachers_router;
pub use service::AssignmentService;
