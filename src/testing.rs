//! Fixtures shared by unit and integration tests.
//!
//! Available under `cfg(test)` and the `test-utils` feature.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

use eraport_config::{CorsConfig, SchoolConfig, StoreConfig};
use eraport_models::attendance::{AttendanceRecord, AttendanceStatus};
use eraport_models::grades::{GradeRecord, ObjectiveDetail};
use eraport_models::ids::{
    AcademicPeriodId, AttendanceRecordId, ClassId, GradeRecordId, ObjectiveDetailId, ObjectiveId,
    StudentId,
};
use eraport_models::periods::{AcademicPeriod, Semester};
use eraport_models::students::{ClassRef, Student};

use crate::clock::FixedClock;
use crate::modules::periods::PeriodCache;
use crate::state::AppState;
use crate::store::MemoryStore;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

pub fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .expect("valid fixture instant")
}

pub fn period(
    year: &str,
    semester: Semester,
    start: NaiveDate,
    end: NaiveDate,
    is_active: bool,
) -> AcademicPeriod {
    AcademicPeriod {
        id: AcademicPeriodId::new(),
        year: year.to_string(),
        semester,
        start_date: start,
        end_date: end,
        is_active,
        created_at: instant(2025, 6, 1, 0),
        updated_at: instant(2025, 6, 1, 0),
    }
}

/// 2024/2025 (both semesters, inactive) plus 2025/2026 with semester 1 active.
pub struct PeriodFixture {
    pub previous_odd: AcademicPeriod,
    pub previous_even: AcademicPeriod,
    pub odd: AcademicPeriod,
    pub even: AcademicPeriod,
}

impl PeriodFixture {
    pub fn new() -> Self {
        Self {
            previous_odd: period(
                "2024/2025",
                Semester::Odd,
                date(2024, 7, 15),
                date(2024, 12, 20),
                false,
            ),
            previous_even: period(
                "2024/2025",
                Semester::Even,
                date(2025, 1, 6),
                date(2025, 6, 20),
                false,
            ),
            odd: period(
                "2025/2026",
                Semester::Odd,
                date(2025, 7, 14),
                date(2025, 12, 19),
                true,
            ),
            even: period(
                "2025/2026",
                Semester::Even,
                date(2026, 1, 5),
                date(2026, 6, 19),
                false,
            ),
        }
    }

    pub async fn seed(&self, store: &MemoryStore) {
        // Inserted out of order on purpose; readers must sort.
        store.add_period(self.even.clone()).await;
        store.add_period(self.previous_odd.clone()).await;
        store.add_period(self.odd.clone()).await;
        store.add_period(self.previous_even.clone()).await;
    }
}

impl Default for PeriodFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn class(name: &str) -> ClassRef {
    ClassRef {
        id: ClassId::new(),
        name: name.to_string(),
        is_active: true,
    }
}

pub fn student(class_id: ClassId, name: &str) -> Student {
    Student {
        id: StudentId::new(),
        class_id,
        name: name.to_string(),
        is_active: true,
    }
}

pub fn grade(
    student_id: StudentId,
    class_id: ClassId,
    subject: &str,
    period: &AcademicPeriod,
    final_score: Option<f64>,
    description: Option<&str>,
) -> GradeRecord {
    GradeRecord {
        id: GradeRecordId::new(),
        student_id,
        class_id,
        subject: subject.to_string(),
        period_id: period.id,
        semester: period.semester,
        final_score,
        achievement_description: description.map(str::to_string),
        created_at: instant(2025, 9, 1, 1),
        updated_at: instant(2025, 9, 1, 1),
    }
}

pub fn objective(record: &GradeRecord, achieved: Option<bool>) -> ObjectiveDetail {
    ObjectiveDetail {
        id: ObjectiveDetailId::new(),
        grade_record_id: record.id,
        objective_id: ObjectiveId::new(),
        achieved,
    }
}

pub fn attendance(
    student_id: StudentId,
    class_id: ClassId,
    period_id: AcademicPeriodId,
    date: NaiveDate,
    subject: Option<&str>,
    status: AttendanceStatus,
) -> AttendanceRecord {
    AttendanceRecord {
        id: AttendanceRecordId::new(),
        student_id,
        class_id,
        period_id,
        date,
        subject: subject.map(str::to_string),
        status,
        recorded_at: instant(2025, 9, 1, 0),
    }
}

/// Application state over a fresh [`MemoryStore`] and a clock pinned to
/// 2025-09-15 09:00 WIB.
pub fn memory_state() -> (AppState, MemoryStore, FixedClock) {
    let store = MemoryStore::new();
    let clock = FixedClock::new(instant(2025, 9, 15, 2));
    let state = AppState {
        store: Arc::new(store.clone()),
        clock: Arc::new(clock.clone()),
        periods: PeriodCache::new(),
        cors_config: CorsConfig::from_list("http://localhost:5173"),
        store_config: StoreConfig::default(),
        school_config: SchoolConfig::default(),
    };
    (state, store, clock)
}
