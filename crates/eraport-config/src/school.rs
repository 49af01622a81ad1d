//! School-local settings.
//!
//! # Environment Variables
//!
//! - `SCHOOL_UTC_OFFSET_HOURS`: offset of the school's time zone (default: 7, WIB)
//! - `AUTOSAVE_QUIET_MS`: quiet period before a grade edit is saved (default: 800)

use chrono::{FixedOffset, Offset, Utc};
use std::time::Duration;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchoolConfig {
    /// Whole hours east of UTC, -12..=14
    pub utc_offset_hours: i32,
    pub autosave_quiet_ms: u64,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 7,
            autosave_quiet_ms: 800,
        }
    }
}

impl SchoolConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            utc_offset_hours: env_or("SCHOOL_UTC_OFFSET_HOURS", defaults.utc_offset_hours)
                .clamp(-12, 14),
            autosave_quiet_ms: env_or("AUTOSAVE_QUIET_MS", defaults.autosave_quiet_ms),
        }
    }

    /// The school's fixed UTC offset.
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours.clamp(-12, 14) * 3600)
            .unwrap_or_else(|| Utc.fix())
    }

    #[must_use]
    pub fn autosave_quiet_period(&self) -> Duration {
        Duration::from_millis(self.autosave_quiet_ms)
    }
}
