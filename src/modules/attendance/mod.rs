//! Attendance module.
//!
//! Check-in writes plus the semester summary and monthly detail reports.
//! Reports read every matching row page by page before aggregating, because
//! the hosted store silently truncates large result sets.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_attendance_router;
pub use service::{AttendanceService, attendance_percentage};
