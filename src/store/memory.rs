//! In-memory store for tests.
//!
//! Behaves like [`PgStore`](super::PgStore) for every query the services issue,
//! including the store-side row cap, and can be told to fail specific subject
//! or page fetches so recovery paths can be exercised.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use eraport_core::PageRequest;
use eraport_models::assignments::TeacherAssignment;
use eraport_models::attendance::{
    AttendanceFilter, AttendanceRecord, NewAttendanceRecord, SubjectScope,
};
use eraport_models::grades::{
    GradeRecord, GradeRecordWithObjectives, NewGradeRecord, ObjectiveDetail,
};
use eraport_models::ids::{
    AcademicPeriodId, AssignmentId, AttendanceRecordId, ClassId, GradeRecordId,
    ObjectiveDetailId, TeacherId,
};
use eraport_models::periods::{AcademicPeriod, NewAcademicPeriod};
use eraport_models::students::{ClassRef, Student};

use super::{AcademicStore, StoreError};
use crate::modules::subjects::subject_key;

#[derive(Debug, Default)]
struct Tables {
    periods: Vec<AcademicPeriod>,
    classes: Vec<ClassRef>,
    students: Vec<Student>,
    assignments: Vec<TeacherAssignment>,
    grades: Vec<GradeRecord>,
    objectives: Vec<ObjectiveDetail>,
    attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Default)]
struct Faults {
    /// Subject lookup keys whose grade fetch fails
    subjects: HashSet<String>,
    /// Attendance page indexes that fail
    pages: HashSet<usize>,
    roster: bool,
    /// Rows returned per page at most, like a hosted store's cap
    row_cap: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    faults: Arc<RwLock<Faults>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    pub async fn add_period(&self, period: AcademicPeriod) {
        self.tables.write().await.periods.push(period);
    }

    pub async fn add_class(&self, class: ClassRef) {
        self.tables.write().await.classes.push(class);
    }

    pub async fn add_student(&self, student: Student) {
        self.tables.write().await.students.push(student);
    }

    pub async fn add_assignment(
        &self,
        teacher_id: TeacherId,
        class_id: ClassId,
        subject: &str,
        period_id: AcademicPeriodId,
    ) {
        self.tables.write().await.assignments.push(TeacherAssignment {
            id: AssignmentId::new(),
            teacher_id,
            class_id,
            subject: subject.to_string(),
            period_id,
        });
    }

    /// Inserts a grade record as-is, bypassing the upsert key (legacy duplicates).
    pub async fn add_grade_record(&self, record: GradeRecord, objectives: Vec<ObjectiveDetail>) {
        let mut tables = self.tables.write().await;
        tables.grades.push(record);
        tables.objectives.extend(objectives);
    }

    pub async fn add_attendance(&self, record: AttendanceRecord) {
        self.tables.write().await.attendance.push(record);
    }

    pub async fn add_attendance_batch(&self, records: impl IntoIterator<Item = AttendanceRecord>) {
        self.tables.write().await.attendance.extend(records);
    }

    pub async fn grade_records(&self) -> Vec<GradeRecord> {
        self.tables.read().await.grades.clone()
    }

    pub async fn attendance_records(&self) -> Vec<AttendanceRecord> {
        self.tables.read().await.attendance.clone()
    }

    pub async fn objective_count(&self) -> usize {
        self.tables.read().await.objectives.len()
    }

    /// Grade fetches for this subject (any spelling) fail from now on.
    pub async fn fail_subject(&self, subject: &str) {
        self.faults.write().await.subjects.insert(subject_key(subject));
    }

    /// Attendance page `index` fails from now on.
    pub async fn fail_page(&self, index: usize) {
        self.faults.write().await.pages.insert(index);
    }

    pub async fn fail_roster(&self) {
        self.faults.write().await.roster = true;
    }

    /// Truncates every attendance page to `cap` rows.
    pub async fn cap_rows(&self, cap: usize) {
        self.faults.write().await.row_cap = Some(cap);
    }
}

fn sort_periods(periods: &mut [AcademicPeriod]) {
    periods.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then(a.semester.cmp(&b.semester))
            .then(a.start_date.cmp(&b.start_date))
    });
}

fn attendance_matches(filter: &AttendanceFilter, record: &AttendanceRecord) -> bool {
    if record.period_id != filter.period_id
        || record.class_id != filter.class_id
        || !filter.admits_date(record.date)
    {
        return false;
    }
    match (&filter.scope, &record.subject) {
        (SubjectScope::Daily, None) => true,
        (SubjectScope::Subject { keys }, Some(subject)) => keys.contains(&subject_key(subject)),
        _ => false,
    }
}

#[async_trait]
impl AcademicStore for MemoryStore {
    async fn list_periods(&self) -> Result<Vec<AcademicPeriod>, StoreError> {
        let mut periods = self.tables.read().await.periods.clone();
        sort_periods(&mut periods);
        Ok(periods)
    }

    async fn find_period(
        &self,
        period_id: AcademicPeriodId,
    ) -> Result<Option<AcademicPeriod>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.periods.iter().find(|p| p.id == period_id).cloned())
    }

    async fn insert_period(
        &self,
        period: NewAcademicPeriod,
    ) -> Result<AcademicPeriod, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .periods
            .iter()
            .any(|p| p.year == period.year && p.semester == period.semester)
        {
            return Err(StoreError::Conflict(format!(
                "period {} semester {} already exists",
                period.year, period.semester
            )));
        }

        let now = Self::now();
        let created = AcademicPeriod {
            id: AcademicPeriodId::new(),
            year: period.year,
            semester: period.semester,
            start_date: period.start_date,
            end_date: period.end_date,
            is_active: false,
            created_at: now,
            updated_at: now,
        };
        tables.periods.push(created.clone());
        Ok(created)
    }

    async fn activate_period(
        &self,
        period_id: AcademicPeriodId,
    ) -> Result<Option<AcademicPeriod>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.periods.iter().any(|p| p.id == period_id) {
            return Ok(None);
        }

        let now = Self::now();
        let mut activated = None;
        for period in tables.periods.iter_mut() {
            if period.id == period_id {
                period.is_active = true;
                period.updated_at = now;
                activated = Some(period.clone());
            } else if period.is_active {
                period.is_active = false;
                period.updated_at = now;
            }
        }
        Ok(activated)
    }

    async fn list_assignments(
        &self,
        teacher_id: Option<TeacherId>,
        class_id: Option<ClassId>,
        period_id: AcademicPeriodId,
    ) -> Result<Vec<TeacherAssignment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .iter()
            .filter(|a| a.period_id == period_id)
            .filter(|a| teacher_id.is_none_or(|t| a.teacher_id == t))
            .filter(|a| class_id.is_none_or(|c| a.class_id == c))
            .cloned()
            .collect())
    }

    async fn list_classes(&self, class_ids: &[ClassId]) -> Result<Vec<ClassRef>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .classes
            .iter()
            .filter(|c| class_ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_students(&self, class_id: ClassId) -> Result<Vec<Student>, StoreError> {
        if self.faults.read().await.roster {
            return Err(StoreError::Unavailable("roster fetch failed".to_string()));
        }
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .filter(|s| s.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn list_grade_records(
        &self,
        class_id: ClassId,
        period_id: AcademicPeriodId,
        subject_keys: Option<&[String]>,
    ) -> Result<Vec<GradeRecordWithObjectives>, StoreError> {
        if let Some(keys) = subject_keys {
            let faults = self.faults.read().await;
            if let Some(failing) = keys.iter().find(|k| faults.subjects.contains(*k)) {
                return Err(StoreError::Unavailable(format!(
                    "grade fetch for {} timed out",
                    failing
                )));
            }
        }

        let tables = self.tables.read().await;
        Ok(tables
            .grades
            .iter()
            .filter(|g| g.class_id == class_id && g.period_id == period_id)
            .filter(|g| subject_keys.is_none_or(|keys| keys.contains(&subject_key(&g.subject))))
            .map(|g| GradeRecordWithObjectives {
                record: g.clone(),
                objectives: tables
                    .objectives
                    .iter()
                    .filter(|o| o.grade_record_id == g.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn upsert_grade_record(
        &self,
        record: NewGradeRecord,
    ) -> Result<GradeRecordWithObjectives, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Self::now();

        let existing = tables.grades.iter_mut().find(|g| {
            g.student_id == record.student_id
                && g.subject == record.subject
                && g.period_id == record.period_id
        });

        let saved = match existing {
            Some(grade) => {
                grade.class_id = record.class_id;
                grade.semester = record.semester;
                grade.final_score = record.final_score;
                grade.achievement_description = record.achievement_description.clone();
                grade.updated_at = now;
                grade.clone()
            }
            None => {
                let grade = GradeRecord {
                    id: GradeRecordId::new(),
                    student_id: record.student_id,
                    class_id: record.class_id,
                    subject: record.subject.clone(),
                    period_id: record.period_id,
                    semester: record.semester,
                    final_score: record.final_score,
                    achievement_description: record.achievement_description.clone(),
                    created_at: now,
                    updated_at: now,
                };
                tables.grades.push(grade.clone());
                grade
            }
        };

        tables.objectives.retain(|o| o.grade_record_id != saved.id);
        let objectives: Vec<ObjectiveDetail> = record
            .objectives
            .iter()
            .map(|o| ObjectiveDetail {
                id: ObjectiveDetailId::new(),
                grade_record_id: saved.id,
                objective_id: o.objective_id,
                achieved: o.achieved,
            })
            .collect();
        tables.objectives.extend(objectives.iter().cloned());

        Ok(GradeRecordWithObjectives {
            record: saved,
            objectives,
        })
    }

    async fn delete_grade_records(&self, ids: &[GradeRecordId]) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.grades.len();
        tables.grades.retain(|g| !ids.contains(&g.id));
        tables.objectives.retain(|o| !ids.contains(&o.grade_record_id));
        Ok((before - tables.grades.len()) as u64)
    }

    async fn fetch_attendance_page(
        &self,
        filter: &AttendanceFilter,
        page: PageRequest,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let faults = self.faults.read().await;
        if faults.pages.contains(&page.index) {
            return Err(StoreError::Unavailable(format!(
                "attendance page {} failed",
                page.index
            )));
        }

        let tables = self.tables.read().await;
        let mut rows: Vec<&AttendanceRecord> = tables
            .attendance
            .iter()
            .filter(|r| attendance_matches(filter, r))
            .collect();
        rows.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(a.student_id.cmp(&b.student_id))
                .then(a.id.cmp(&b.id))
        });

        let limit = match faults.row_cap {
            Some(cap) => (page.limit.max(0) as usize).min(cap),
            None => page.limit.max(0) as usize,
        };
        Ok(rows
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn upsert_attendance(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Self::now();

        if let Some(existing) = tables.attendance.iter_mut().find(|r| {
            r.student_id == record.student_id
                && r.date == record.date
                && r.subject == record.subject
        }) {
            existing.class_id = record.class_id;
            existing.period_id = record.period_id;
            existing.status = record.status;
            existing.recorded_at = now;
            return Ok(existing.clone());
        }

        let created = AttendanceRecord {
            id: AttendanceRecordId::new(),
            student_id: record.student_id,
            class_id: record.class_id,
            period_id: record.period_id,
            date: record.date,
            subject: record.subject,
            status: record.status,
            recorded_at: now,
        };
        tables.attendance.push(created.clone());
        Ok(created)
    }
}
