use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

use eraport_core::PageRequest;
use eraport_core::serde::parse_score;
use eraport_models::assignments::TeacherAssignment;
use eraport_models::attendance::{
    AttendanceFilter, AttendanceRecord, AttendanceStatus, NewAttendanceRecord, SubjectScope,
};
use eraport_models::grades::{
    GradeRecord, GradeRecordWithObjectives, NewGradeRecord, ObjectiveDetail,
};
use eraport_models::ids::{
    AcademicPeriodId, AttendanceRecordId, ClassId, GradeRecordId, ObjectiveDetailId, ObjectiveId,
    StudentId, TeacherId,
};
use eraport_models::periods::{AcademicPeriod, NewAcademicPeriod, Semester};
use eraport_models::students::{ClassRef, Student};

use super::{AcademicStore, StoreError};

/// Mirrors `subject_key` on the Rust side.
const SUBJECT_KEY_SQL: &str = r"upper(regexp_replace(btrim(subject), '\s+', ' ', 'g'))";

const PERIOD_COLUMNS: &str =
    "id, year, semester, start_date, end_date, is_active, created_at, updated_at";

const GRADE_COLUMNS: &str = "id, student_id, class_id, subject, period_id, semester, final_score, \
     achievement_description, created_at, updated_at";

const ATTENDANCE_COLUMNS: &str =
    "id, student_id, class_id, period_id, date, subject, status, recorded_at";

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct PeriodRow {
    id: AcademicPeriodId,
    year: String,
    semester: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PeriodRow> for AcademicPeriod {
    type Error = StoreError;

    fn try_from(row: PeriodRow) -> Result<Self, Self::Error> {
        let semester = Semester::parse_legacy(&row.semester).ok_or_else(|| {
            StoreError::Malformed(format!(
                "period {} has semester '{}'",
                row.id, row.semester
            ))
        })?;
        Ok(AcademicPeriod {
            id: row.id,
            year: row.year,
            semester,
            start_date: row.start_date,
            end_date: row.end_date,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct GradeRow {
    id: GradeRecordId,
    student_id: StudentId,
    class_id: ClassId,
    subject: String,
    period_id: AcademicPeriodId,
    semester: String,
    final_score: Option<String>,
    achievement_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<GradeRow> for GradeRecord {
    type Error = StoreError;

    fn try_from(row: GradeRow) -> Result<Self, Self::Error> {
        let semester = Semester::parse_legacy(&row.semester).ok_or_else(|| {
            StoreError::Malformed(format!(
                "grade record {} has semester '{}'",
                row.id, row.semester
            ))
        })?;
        Ok(GradeRecord {
            id: row.id,
            student_id: row.student_id,
            class_id: row.class_id,
            subject: row.subject,
            period_id: row.period_id,
            semester,
            final_score: row.final_score.as_deref().and_then(parse_score),
            achievement_description: row.achievement_description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ObjectiveRow {
    id: ObjectiveDetailId,
    grade_record_id: GradeRecordId,
    objective_id: ObjectiveId,
    achieved: Option<bool>,
}

impl From<ObjectiveRow> for ObjectiveDetail {
    fn from(row: ObjectiveRow) -> Self {
        ObjectiveDetail {
            id: row.id,
            grade_record_id: row.grade_record_id,
            objective_id: row.objective_id,
            achieved: row.achieved,
        }
    }
}

#[derive(Debug, FromRow)]
struct AttendanceRow {
    id: AttendanceRecordId,
    student_id: StudentId,
    class_id: ClassId,
    period_id: AcademicPeriodId,
    date: NaiveDate,
    subject: Option<String>,
    status: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::parse(&row.status).ok_or_else(|| {
            StoreError::Malformed(format!(
                "attendance record {} has status '{}'",
                row.id, row.status
            ))
        })?;
        Ok(AttendanceRecord {
            id: row.id,
            student_id: row.student_id,
            class_id: row.class_id,
            period_id: row.period_id,
            date: row.date,
            subject: row.subject,
            status,
            recorded_at: row.recorded_at,
        })
    }
}

/// Scores are stored as text; whole numbers are written without a fraction.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        score.to_string()
    }
}

fn to_uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|id| (*id).into()).collect()
}

impl PgStore {
    async fn objectives_for(
        &self,
        record_ids: &[GradeRecordId],
    ) -> Result<HashMap<GradeRecordId, Vec<ObjectiveDetail>>, StoreError> {
        if record_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ObjectiveRow>(
            r#"SELECT id, grade_record_id, objective_id, achieved
               FROM objective_details
               WHERE grade_record_id = ANY($1)
               ORDER BY grade_record_id, objective_id"#,
        )
        .bind(to_uuids(record_ids))
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<GradeRecordId, Vec<ObjectiveDetail>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.grade_record_id)
                .or_default()
                .push(row.into());
        }
        Ok(grouped)
    }
}

#[async_trait]
impl AcademicStore for PgStore {
    #[instrument(skip(self))]
    async fn list_periods(&self) -> Result<Vec<AcademicPeriod>, StoreError> {
        let rows = sqlx::query_as::<_, PeriodRow>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM academic_periods ORDER BY year, start_date"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut periods = rows
            .into_iter()
            .map(AcademicPeriod::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        periods.sort_by(|a, b| {
            a.year
                .cmp(&b.year)
                .then(a.semester.cmp(&b.semester))
                .then(a.start_date.cmp(&b.start_date))
        });
        Ok(periods)
    }

    #[instrument(skip(self))]
    async fn find_period(
        &self,
        period_id: AcademicPeriodId,
    ) -> Result<Option<AcademicPeriod>, StoreError> {
        let row = sqlx::query_as::<_, PeriodRow>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM academic_periods WHERE id = $1"
        ))
        .bind(period_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AcademicPeriod::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn insert_period(
        &self,
        period: NewAcademicPeriod,
    ) -> Result<AcademicPeriod, StoreError> {
        let row = sqlx::query_as::<_, PeriodRow>(&format!(
            r#"INSERT INTO academic_periods (year, semester, start_date, end_date)
               VALUES ($1, $2, $3, $4)
               RETURNING {PERIOD_COLUMNS}"#
        ))
        .bind(&period.year)
        .bind(period.semester.number().to_string())
        .bind(period.start_date)
        .bind(period.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        row.try_into()
    }

    #[instrument(skip(self))]
    async fn activate_period(
        &self,
        period_id: AcademicPeriodId,
    ) -> Result<Option<AcademicPeriod>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM academic_periods WHERE id = $1)",
        )
        .bind(period_id)
        .fetch_one(&mut *tx)
        .await?;

        if !exists {
            tx.rollback().await?;
            return Ok(None);
        }

        // The partial unique index allows a single active row, so clear first.
        sqlx::query(
            "UPDATE academic_periods SET is_active = FALSE, updated_at = NOW() \
             WHERE is_active AND id <> $1",
        )
        .bind(period_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, PeriodRow>(&format!(
            r#"UPDATE academic_periods
               SET is_active = TRUE, updated_at = NOW()
               WHERE id = $1
               RETURNING {PERIOD_COLUMNS}"#
        ))
        .bind(period_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into().map(Some)
    }

    #[instrument(skip(self))]
    async fn list_assignments(
        &self,
        teacher_id: Option<TeacherId>,
        class_id: Option<ClassId>,
        period_id: AcademicPeriodId,
    ) -> Result<Vec<TeacherAssignment>, StoreError> {
        let assignments = sqlx::query_as::<_, TeacherAssignment>(
            r#"SELECT id, teacher_id, class_id, subject, period_id
               FROM teacher_assignments
               WHERE period_id = $1
                 AND ($2::uuid IS NULL OR teacher_id = $2)
                 AND ($3::uuid IS NULL OR class_id = $3)"#,
        )
        .bind(period_id)
        .bind(teacher_id)
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    #[instrument(skip(self))]
    async fn list_classes(&self, class_ids: &[ClassId]) -> Result<Vec<ClassRef>, StoreError> {
        if class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let classes = sqlx::query_as::<_, ClassRef>(
            "SELECT id, name, is_active FROM classes WHERE id = ANY($1)",
        )
        .bind(to_uuids(class_ids))
        .fetch_all(&self.pool)
        .await?;

        Ok(classes)
    }

    #[instrument(skip(self))]
    async fn list_students(&self, class_id: ClassId) -> Result<Vec<Student>, StoreError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, class_id, name, is_active FROM students WHERE class_id = $1",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    #[instrument(skip(self))]
    async fn list_grade_records(
        &self,
        class_id: ClassId,
        period_id: AcademicPeriodId,
        subject_keys: Option<&[String]>,
    ) -> Result<Vec<GradeRecordWithObjectives>, StoreError> {
        let rows = sqlx::query_as::<_, GradeRow>(&format!(
            r#"SELECT {GRADE_COLUMNS}
               FROM grade_records
               WHERE class_id = $1
                 AND period_id = $2
                 AND ($3::text[] IS NULL OR {SUBJECT_KEY_SQL} = ANY($3))
               ORDER BY student_id, updated_at, id"#
        ))
        .bind(class_id)
        .bind(period_id)
        .bind(subject_keys.map(<[String]>::to_vec))
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(GradeRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let ids: Vec<GradeRecordId> = records.iter().map(|r| r.id).collect();
        let mut objectives = self.objectives_for(&ids).await?;

        Ok(records
            .into_iter()
            .map(|record| GradeRecordWithObjectives {
                objectives: objectives.remove(&record.id).unwrap_or_default(),
                record,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn upsert_grade_record(
        &self,
        record: NewGradeRecord,
    ) -> Result<GradeRecordWithObjectives, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, GradeRow>(&format!(
            r#"INSERT INTO grade_records
                   (student_id, class_id, subject, period_id, semester, final_score, achievement_description)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (student_id, subject, period_id) DO UPDATE
               SET class_id = EXCLUDED.class_id,
                   semester = EXCLUDED.semester,
                   final_score = EXCLUDED.final_score,
                   achievement_description = EXCLUDED.achievement_description,
                   updated_at = NOW()
               RETURNING {GRADE_COLUMNS}"#
        ))
        .bind(record.student_id)
        .bind(record.class_id)
        .bind(&record.subject)
        .bind(record.period_id)
        .bind(record.semester.number().to_string())
        .bind(record.final_score.map(format_score))
        .bind(&record.achievement_description)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        let saved = GradeRecord::try_from(row)?;

        sqlx::query("DELETE FROM objective_details WHERE grade_record_id = $1")
            .bind(saved.id)
            .execute(&mut *tx)
            .await?;

        let mut objectives = Vec::with_capacity(record.objectives.len());
        for objective in &record.objectives {
            let row = sqlx::query_as::<_, ObjectiveRow>(
                r#"INSERT INTO objective_details (grade_record_id, objective_id, achieved)
                   VALUES ($1, $2, $3)
                   RETURNING id, grade_record_id, objective_id, achieved"#,
            )
            .bind(saved.id)
            .bind(objective.objective_id)
            .bind(objective.achieved)
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;
            objectives.push(row.into());
        }

        tx.commit().await?;

        Ok(GradeRecordWithObjectives {
            record: saved,
            objectives,
        })
    }

    #[instrument(skip(self))]
    async fn delete_grade_records(&self, ids: &[GradeRecordId]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM grade_records WHERE id = ANY($1)")
            .bind(to_uuids(ids))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn fetch_attendance_page(
        &self,
        filter: &AttendanceFilter,
        page: PageRequest,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let (daily, keys) = match &filter.scope {
            SubjectScope::Daily => (true, Vec::new()),
            SubjectScope::Subject { keys } => (false, keys.clone()),
        };

        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"SELECT {ATTENDANCE_COLUMNS}
               FROM attendance_records
               WHERE period_id = $1
                 AND class_id = $2
                 AND (($3 AND subject IS NULL)
                      OR (NOT $3 AND subject IS NOT NULL AND {SUBJECT_KEY_SQL} = ANY($4)))
                 AND ($5::date IS NULL OR date >= $5)
                 AND ($6::date IS NULL OR date <= $6)
               ORDER BY date, student_id, id
               LIMIT $7 OFFSET $8"#
        ))
        .bind(filter.period_id)
        .bind(filter.class_id)
        .bind(daily)
        .bind(keys)
        .bind(filter.from)
        .bind(filter.to)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn upsert_attendance(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"INSERT INTO attendance_records (student_id, class_id, period_id, date, subject, status)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT ON CONSTRAINT attendance_records_student_date_subject DO UPDATE
               SET class_id = EXCLUDED.class_id,
                   period_id = EXCLUDED.period_id,
                   status = EXCLUDED.status,
                   recorded_at = NOW()
               RETURNING {ATTENDANCE_COLUMNS}"#
        ))
        .bind(record.student_id)
        .bind(record.class_id)
        .bind(record.period_id)
        .bind(record.date)
        .bind(&record.subject)
        .bind(record.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_score_drops_whole_fraction() {
        assert_eq!(format_score(85.0), "85");
        assert_eq!(format_score(85.5), "85.5");
        assert_eq!(parse_score(&format_score(72.25)), Some(72.25));
    }

    #[test]
    fn test_period_row_decodes_legacy_semester() {
        let row = PeriodRow {
            id: AcademicPeriodId::from_u128(1),
            year: "2025/2026".to_string(),
            semester: "Genap".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 20).unwrap(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let period = AcademicPeriod::try_from(row).unwrap();
        assert_eq!(period.semester, Semester::Even);
    }

    #[test]
    fn test_attendance_row_rejects_unknown_status() {
        let row = AttendanceRow {
            id: AttendanceRecordId::from_u128(1),
            student_id: StudentId::from_u128(2),
            class_id: ClassId::from_u128(3),
            period_id: AcademicPeriodId::from_u128(4),
            date: NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
            subject: None,
            status: "terlambat".to_string(),
            recorded_at: Utc::now(),
        };
        assert!(matches!(
            AttendanceRecord::try_from(row),
            Err(StoreError::Malformed(_))
        ));
    }
}
