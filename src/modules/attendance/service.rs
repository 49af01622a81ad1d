use anyhow::anyhow;
use chrono::{FixedOffset, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, instrument, warn};

use eraport_core::{AppError, PageCursor};
use eraport_models::ids::{AcademicPeriodId, ClassId, StudentId};
use eraport_models::students::{Student, active_roster};

use crate::clock::{Clock, school_date};
use crate::metrics::{track_attendance_pages, track_attendance_recorded, track_fetch_failure};
use crate::modules::attendance::model::{
    AttendanceFilter, AttendanceRecord, AttendanceReport, AttendanceStatus, FailureScope,
    FetchFailure, MonthlyAttendanceReport, NewAttendanceRecord, RecordAttendanceDto,
    StudentDetail, StudentSummary, SubjectScope,
};
use crate::modules::periods::{PeriodCache, PeriodService};
use crate::modules::subjects::{normalize, subject_keys};
use crate::store::AcademicStore;

/// round(present / effective_days * 100), 0 without effective days, never above 100.
pub fn attendance_percentage(present: usize, effective_days: usize) -> u8 {
    if effective_days == 0 {
        return 0;
    }
    let percentage = (present as f64 / effective_days as f64 * 100.0).round();
    percentage.clamp(0.0, 100.0) as u8
}

/// Rows read for one report and how the read went.
struct Collected {
    rows: Vec<AttendanceRecord>,
    complete: bool,
    pages_read: usize,
    failures: Vec<FetchFailure>,
}

/// Store filter for an optional subject, plus the canonical subject name.
fn scope_for(subject: Option<&str>) -> (SubjectScope, Option<String>) {
    match subject.map(str::trim).filter(|s| !s.is_empty()) {
        None => (SubjectScope::Daily, None),
        Some(raw) => (
            SubjectScope::Subject {
                keys: subject_keys(raw),
            },
            Some(normalize(raw)),
        ),
    }
}

/// First and last day of a calendar month.
fn month_bounds(month: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

#[derive(Default)]
struct Tally {
    present: usize,
    excused: usize,
    sick: usize,
    absent: usize,
    daily_status: BTreeMap<NaiveDate, AttendanceStatus>,
}

impl Tally {
    fn add(&mut self, record: &AttendanceRecord) {
        match record.status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Excused => self.excused += 1,
            AttendanceStatus::Sick => self.sick += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
        self.daily_status.insert(record.date, record.status);
    }
}

/// Per-student tallies in roster order; students without rows are omitted.
fn tally(rows: &[AttendanceRecord], roster: &[Student]) -> (usize, Vec<StudentDetail>) {
    let effective_days = rows
        .iter()
        .map(|r| r.date)
        .collect::<BTreeSet<_>>()
        .len();

    let mut by_student: HashMap<StudentId, Tally> = HashMap::new();
    for record in rows {
        by_student.entry(record.student_id).or_default().add(record);
    }

    let students = roster
        .iter()
        .filter_map(|student| {
            let tally = by_student.remove(&student.id)?;
            Some(StudentDetail {
                summary: StudentSummary {
                    student_id: student.id,
                    student_name: student.name.clone(),
                    present: tally.present,
                    excused: tally.excused,
                    sick: tally.sick,
                    absent: tally.absent,
                    percentage: attendance_percentage(tally.present, effective_days),
                },
                daily_status: tally.daily_status,
            })
        })
        .collect();

    (effective_days, students)
}

pub struct AttendanceService;

impl AttendanceService {
    /// Reads every page of `filter` in order until a short page arrives.
    ///
    /// A failed page ends the read; what was fetched so far is kept and the
    /// result is marked incomplete.
    async fn collect(
        store: &dyn AcademicStore,
        filter: &AttendanceFilter,
        page_size: usize,
    ) -> Collected {
        let mut cursor = PageCursor::new(page_size as i64);
        let mut rows = Vec::new();
        let mut failures = Vec::new();
        let mut complete = true;

        while let Some(page) = cursor.next_page() {
            match store.fetch_attendance_page(filter, page).await {
                Ok(batch) => {
                    cursor.advance(batch.len());
                    rows.extend(batch);
                }
                Err(e) => {
                    warn!(
                        page = page.index,
                        offset = page.offset,
                        error = %e,
                        "attendance page failed; report will be partial"
                    );
                    track_fetch_failure("page");
                    failures.push(FetchFailure::new(
                        FailureScope::Page {
                            index: page.index,
                            offset: page.offset,
                        },
                        e.to_string(),
                    ));
                    complete = false;
                    cursor.stop();
                }
            }
        }

        let pages_read = cursor.pages_read();
        track_attendance_pages(pages_read, complete);

        Collected {
            rows,
            complete,
            pages_read,
            failures,
        }
    }

    /// Semester summary for a class. `subject = None` summarizes daily
    /// check-ins; a subject selects lesson check-ins under any of its aliases.
    #[instrument(skip(store))]
    pub async fn summarize(
        store: &dyn AcademicStore,
        page_size: usize,
        period_id: AcademicPeriodId,
        class_id: ClassId,
        subject: Option<&str>,
    ) -> Result<AttendanceReport, AppError> {
        let roster = active_roster(store.list_students(class_id).await?);
        let (scope, subject) = scope_for(subject);
        let filter = AttendanceFilter {
            period_id,
            class_id,
            scope,
            from: None,
            to: None,
        };

        let collected = Self::collect(store, &filter, page_size).await;
        let (effective_days, students) = tally(&collected.rows, &roster);

        Ok(AttendanceReport {
            period_id,
            class_id,
            subject,
            effective_days,
            students: students.into_iter().map(|d| d.summary).collect(),
            complete: collected.complete,
            pages_read: collected.pages_read,
            failures: collected.failures,
        })
    }

    /// One calendar month of a period, with each student's status per day.
    #[instrument(skip(store))]
    pub async fn detail_for_month(
        store: &dyn AcademicStore,
        page_size: usize,
        month: u32,
        year: i32,
        period_id: AcademicPeriodId,
        class_id: ClassId,
        subject: Option<&str>,
    ) -> Result<MonthlyAttendanceReport, AppError> {
        let (from, to) = month_bounds(month, year)
            .ok_or_else(|| AppError::bad_request(anyhow!("Invalid month {}/{}", month, year)))?;

        let roster = active_roster(store.list_students(class_id).await?);
        let (scope, subject) = scope_for(subject);
        let filter = AttendanceFilter {
            period_id,
            class_id,
            scope,
            from: Some(from),
            to: Some(to),
        };

        let collected = Self::collect(store, &filter, page_size).await;
        let (effective_days, students) = tally(&collected.rows, &roster);

        Ok(MonthlyAttendanceReport {
            month,
            year,
            period_id,
            class_id,
            subject,
            effective_days,
            students,
            complete: collected.complete,
            pages_read: collected.pages_read,
            failures: collected.failures,
        })
    }

    /// Records a check-in against the active period.
    ///
    /// The date defaults to today in the school's time zone and must fall
    /// within the active period. A second check-in for the same student, date
    /// and subject overwrites the first.
    #[instrument(skip(store, cache, clock, dto), fields(student_id = %dto.student_id, status = %dto.status))]
    pub async fn record_attendance(
        store: &dyn AcademicStore,
        cache: &PeriodCache,
        clock: &dyn Clock,
        offset: FixedOffset,
        dto: RecordAttendanceDto,
    ) -> Result<AttendanceRecord, AppError> {
        let context = PeriodService::context(store, cache, clock).await?;
        let date = dto
            .date
            .unwrap_or_else(|| school_date(clock.now(), offset));
        if !context.active.contains_date(date) {
            return Err(AppError::unprocessable(anyhow!(
                "{} is outside the active period ({} to {})",
                date,
                context.active.start_date,
                context.active.end_date
            )));
        }
        let subject = dto
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(normalize);

        let record = store
            .upsert_attendance(NewAttendanceRecord {
                student_id: dto.student_id,
                class_id: dto.class_id,
                period_id: context.active.id,
                date,
                subject,
                status: dto.status,
            })
            .await?;

        track_attendance_recorded(record.status.as_str());
        info!(date = %record.date, "attendance recorded");
        Ok(record)
    }
}
