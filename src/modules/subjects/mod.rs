//! Subjects module.
//!
//! Maps the many spellings teachers type for a subject ("MTK", "matematika",
//! "Matematika (Umum)") onto one canonical report-card name, and defines the
//! curriculum order used for report columns.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_subjects_router;
pub use service::{
    SubjectService, canonical_key, canonical_subjects, compare_subjects, curriculum_rank, normalize,
    subject_key, subject_keys,
};
