use anyhow::anyhow;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};
use validator::Validate;

use eraport_core::{AppError, PeriodError};
use eraport_models::ids::{AcademicPeriodId, ClassId, GradeRecordId, StudentId, TeacherId};
use eraport_models::students::active_roster;

use crate::clock::Clock;
use crate::metrics::{
    track_duplicates_cleaned, track_duplicates_detected, track_fetch_failure, track_grade_saved,
};
use crate::modules::assignments::AssignmentService;
use crate::modules::grades::model::{
    CleanupReport, CompletionReport, CompletionStatus, FailureScope, FetchFailure, GradeRecord,
    GradeRecordWithObjectives, NewGradeRecord, NewObjectiveDetail, ObjectiveInput, SaveGradeDto,
    SubjectCompletion,
};
use crate::modules::periods::{PeriodCache, PeriodService};
use crate::modules::subjects::{SubjectService, canonical_key, normalize, subject_keys};
use crate::store::AcademicStore;
use crate::validator::format_errors;

/// Placeholder descriptions teachers leave behind instead of real text.
fn is_blank_description(description: Option<&str>) -> bool {
    match description.map(str::trim) {
        None => true,
        Some(text) => {
            text.is_empty() || text == "-" || text.eq_ignore_ascii_case("null")
        }
    }
}

/// A score counts once it is present and above zero.
pub fn is_scored(record: &GradeRecord) -> bool {
    record.final_score.is_some_and(|score| score > 0.0)
}

/// Every objective assessed (vacuously true without objectives) and a
/// non-placeholder description.
pub fn is_described(entry: &GradeRecordWithObjectives) -> bool {
    entry.objectives.iter().all(|o| o.achieved.is_some())
        && !is_blank_description(entry.record.achievement_description.as_deref())
}

/// Composes the achievement description from objective checkmarks.
///
/// Returns `None` while any objective is unassessed, or when there are none.
pub fn derive_description(objectives: &[ObjectiveInput]) -> Option<String> {
    if objectives.is_empty() || objectives.iter().any(|o| o.achieved.is_none()) {
        return None;
    }

    let achieved: Vec<&str> = objectives
        .iter()
        .filter(|o| o.achieved == Some(true))
        .map(|o| o.description.trim())
        .collect();
    let needs_help: Vec<&str> = objectives
        .iter()
        .filter(|o| o.achieved == Some(false))
        .map(|o| o.description.trim())
        .collect();

    let mut sentences = Vec::new();
    if !achieved.is_empty() {
        sentences.push(format!(
            "Menunjukkan penguasaan yang baik dalam {}.",
            achieved.join(", ")
        ));
    }
    if !needs_help.is_empty() {
        sentences.push(format!("Perlu bantuan dalam {}.", needs_help.join(", ")));
    }
    Some(sentences.join(" "))
}

pub struct GradeService;

impl GradeService {
    /// Completion for the subjects a teacher is assigned in the class.
    #[instrument(skip(store))]
    pub async fn completion_for_teacher(
        store: &dyn AcademicStore,
        teacher_id: TeacherId,
        class_id: ClassId,
        period_id: AcademicPeriodId,
    ) -> Result<CompletionReport, AppError> {
        let subjects = AssignmentService::resolve_subjects_for_teacher_and_class(
            store, teacher_id, class_id, period_id,
        )
        .await?;
        Self::completion_for_subjects(store, class_id, period_id, &subjects).await
    }

    /// Completion for every subject assigned in the class.
    #[instrument(skip(store))]
    pub async fn completion_for_class(
        store: &dyn AcademicStore,
        class_id: ClassId,
        period_id: AcademicPeriodId,
    ) -> Result<CompletionReport, AppError> {
        let subjects =
            AssignmentService::resolve_subjects_for_class(store, class_id, period_id).await?;
        Self::completion_for_subjects(store, class_id, period_id, &subjects).await
    }

    /// Classifies each subject (normalized and deduplicated) against the
    /// active roster.
    ///
    /// Subjects are fetched concurrently; a subject whose fetch fails is left
    /// out of the rows and listed under `failures`.
    #[instrument(skip(store, raw_subjects), fields(subjects = raw_subjects.len()))]
    pub async fn completion_for_subjects(
        store: &dyn AcademicStore,
        class_id: ClassId,
        period_id: AcademicPeriodId,
        raw_subjects: &[String],
    ) -> Result<CompletionReport, AppError> {
        let roster = active_roster(store.list_students(class_id).await?);
        let active: HashSet<StudentId> = roster.iter().map(|s| s.id).collect();
        let total_students = roster.len();

        let subjects = SubjectService::canonical_set(raw_subjects.iter().map(String::as_str));

        let fetches = subjects.iter().map(|subject| async move {
            let keys = subject_keys(subject);
            let result = store
                .list_grade_records(class_id, period_id, Some(&keys))
                .await;
            (subject, result)
        });

        let mut rows = Vec::with_capacity(subjects.len());
        let mut failures = Vec::new();

        for (subject, result) in join_all(fetches).await {
            let entries = match result {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(subject = %subject, error = %e, "grade fetch failed; subject skipped");
                    track_fetch_failure("subject");
                    failures.push(FetchFailure::new(
                        FailureScope::Subject {
                            subject: subject.clone(),
                        },
                        e.to_string(),
                    ));
                    continue;
                }
            };

            let entries: Vec<&GradeRecordWithObjectives> = entries
                .iter()
                .filter(|e| active.contains(&e.record.student_id))
                .collect();
            let scored_count = entries.iter().filter(|e| is_scored(&e.record)).count();
            let described_count = entries.iter().filter(|e| is_described(e)).count();

            rows.push(SubjectCompletion {
                subject: subject.clone(),
                class_id,
                scored_count,
                described_count,
                total_students,
                status: CompletionStatus::classify(scored_count, total_students),
            });
        }

        let duplicates = rows
            .iter()
            .filter(|r| r.status == CompletionStatus::Duplicate)
            .count();
        if duplicates > 0 {
            warn!(duplicates, "subjects with more scored records than students");
        }
        track_duplicates_detected(duplicates);

        Ok(CompletionReport {
            class_id,
            period_id,
            total_students,
            subjects: rows,
            failures,
        })
    }

    /// Keeps the most recently updated record of every (student, subject)
    /// pair and deletes the others. Ties fall back to creation time, then id.
    #[instrument(skip(store))]
    pub async fn clean_duplicates(
        store: &dyn AcademicStore,
        class_id: ClassId,
        period_id: AcademicPeriodId,
    ) -> Result<CleanupReport, AppError> {
        let entries = store.list_grade_records(class_id, period_id, None).await?;

        let mut groups: HashMap<(StudentId, String), Vec<&GradeRecord>> = HashMap::new();
        for entry in &entries {
            let key = (entry.record.student_id, canonical_key(&entry.record.subject));
            groups.entry(key).or_default().push(&entry.record);
        }

        let mut affected_pairs = 0;
        let mut doomed: Vec<GradeRecordId> = Vec::new();
        for records in groups.values_mut().filter(|r| r.len() > 1) {
            affected_pairs += 1;
            records.sort_by(|a, b| {
                b.updated_at
                    .cmp(&a.updated_at)
                    .then(b.created_at.cmp(&a.created_at))
                    .then(b.id.cmp(&a.id))
            });
            doomed.extend(records.iter().skip(1).map(|r| r.id));
        }

        if doomed.is_empty() {
            return Ok(CleanupReport::default());
        }

        doomed.sort();
        let removed = store.delete_grade_records(&doomed).await?;
        track_duplicates_cleaned(removed as usize);
        info!(
            affected_pairs,
            removed_records = removed,
            "duplicate grade records removed"
        );

        Ok(CleanupReport {
            affected_pairs,
            removed_records: removed as usize,
            removed_ids: doomed,
        })
    }

    /// Saves one student's grade into an editable period.
    ///
    /// The subject is stored under its canonical name. Once every objective is
    /// assessed the description is derived from the checkmarks; until then the
    /// caller's text is kept.
    #[instrument(skip(store, cache, clock, dto), fields(student_id = %dto.student_id, subject = %dto.subject))]
    pub async fn save_grade(
        store: &dyn AcademicStore,
        cache: &PeriodCache,
        clock: &dyn Clock,
        dto: SaveGradeDto,
    ) -> Result<GradeRecordWithObjectives, AppError> {
        dto.validate()
            .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))?;

        PeriodService::validate_for_input(store, cache, clock, dto.period_id)
            .await?
            .into_result()?;

        let context = PeriodService::context(store, cache, clock).await?;
        let semester = match context.period(dto.period_id) {
            Some(period) => period.semester,
            None => {
                store
                    .find_period(dto.period_id)
                    .await?
                    .ok_or(PeriodError::PeriodNotFound {
                        period_id: dto.period_id.into_inner(),
                    })?
                    .semester
            }
        };

        let derived = derive_description(&dto.objectives);
        let derived_description = derived.is_some();
        let achievement_description = derived.or(dto.achievement_description);

        let saved = store
            .upsert_grade_record(NewGradeRecord {
                student_id: dto.student_id,
                class_id: dto.class_id,
                subject: normalize(dto.subject.trim()),
                period_id: dto.period_id,
                semester,
                final_score: dto.final_score,
                achievement_description,
                objectives: dto
                    .objectives
                    .iter()
                    .map(|o| NewObjectiveDetail {
                        objective_id: o.objective_id,
                        achieved: o.achieved,
                    })
                    .collect(),
            })
            .await?;

        track_grade_saved(derived_description);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;
    use crate::testing::{PeriodFixture, class, grade, instant, objective, student};
    use axum::http::StatusCode;
    use eraport_models::ids::ObjectiveId;

    struct Scenario {
        store: MemoryStore,
        periods: PeriodFixture,
        class_id: ClassId,
        students: Vec<StudentId>,
        teacher: TeacherId,
    }

    async fn scenario(student_count: usize) -> Scenario {
        let store = MemoryStore::new();
        let periods = PeriodFixture::new();
        periods.seed(&store).await;

        let x = class("X IPA 1");
        store.add_class(x.clone()).await;
        let mut students = Vec::new();
        for i in 0..student_count {
            let s = student(x.id, &format!("Siswa {}", i + 1));
            students.push(s.id);
            store.add_student(s).await;
        }
        let mut gone = student(x.id, "Pindahan");
        gone.is_active = false;
        store.add_student(gone).await;

        let teacher = TeacherId::new();
        Scenario {
            store,
            class_id: x.id,
            students,
            teacher,
            periods,
        }
    }

    fn input(achieved: Option<bool>, text: &str) -> ObjectiveInput {
        ObjectiveInput {
            objective_id: ObjectiveId::new(),
            description: text.to_string(),
            achieved,
        }
    }

    #[test]
    fn test_blank_descriptions() {
        for blank in [None, Some(""), Some("   "), Some("-"), Some(" - "), Some("NULL"), Some("null")] {
            assert!(is_blank_description(blank), "{blank:?}");
        }
        assert!(!is_blank_description(Some("Baik")));
    }

    #[test]
    fn test_derive_description_needs_every_objective() {
        let pending = vec![input(Some(true), "aljabar"), input(None, "geometri")];
        assert_eq!(derive_description(&pending), None);
        assert_eq!(derive_description(&[]), None);

        let done = vec![
            input(Some(true), "aljabar"),
            input(Some(false), "geometri"),
            input(Some(true), "statistika"),
        ];
        assert_eq!(
            derive_description(&done).unwrap(),
            "Menunjukkan penguasaan yang baik dalam aljabar, statistika. Perlu bantuan dalam geometri."
        );

        let all_good = vec![input(Some(true), "aljabar")];
        assert_eq!(
            derive_description(&all_good).unwrap(),
            "Menunjukkan penguasaan yang baik dalam aljabar."
        );
    }

    #[tokio::test]
    async fn test_alias_duplicates_are_flagged() {
        let s = scenario(3).await;
        let odd = &s.periods.odd;
        s.store
            .add_assignment(s.teacher, s.class_id, "MTK", odd.id)
            .await;
        s.store
            .add_assignment(s.teacher, s.class_id, "Matematika", odd.id)
            .await;

        for id in &s.students {
            s.store
                .add_grade_record(grade(*id, s.class_id, "MTK", odd, Some(80.0), Some("Baik")), vec![])
                .await;
        }
        // The same student saved again under the canonical spelling.
        s.store
            .add_grade_record(
                grade(s.students[0], s.class_id, "Matematika (Umum)", odd, Some(85.0), None),
                vec![],
            )
            .await;

        let report = GradeService::completion_for_teacher(&s.store, s.teacher, s.class_id, odd.id)
            .await
            .unwrap();
        assert_eq!(report.total_students, 3);
        assert_eq!(report.subjects.len(), 1);
        let row = &report.subjects[0];
        assert_eq!(row.subject, "Matematika (Umum)");
        assert_eq!(row.scored_count, 4);
        assert_eq!(row.status, CompletionStatus::Duplicate);
        assert!(report.has_duplicates());
    }

    #[tokio::test]
    async fn test_unknown_subject_spellings_form_one_row() {
        let s = scenario(2).await;
        let odd = &s.periods.odd;
        s.store
            .add_assignment(s.teacher, s.class_id, "Robotika", odd.id)
            .await;
        s.store
            .add_assignment(s.teacher, s.class_id, "ROBOTIKA", odd.id)
            .await;
        s.store
            .add_grade_record(grade(s.students[0], s.class_id, "Robotika", odd, Some(80.0), None), vec![])
            .await;

        let report = GradeService::completion_for_teacher(&s.store, s.teacher, s.class_id, odd.id)
            .await
            .unwrap();
        assert_eq!(report.subjects.len(), 1);
        assert_eq!(report.subjects[0].subject, "ROBOTIKA");
        assert_eq!(report.subjects[0].scored_count, 1);
        assert_eq!(report.subjects[0].status, CompletionStatus::Partial);
    }

    #[tokio::test]
    async fn test_partial_description_gating() {
        let s = scenario(2).await;
        let odd = &s.periods.odd;
        s.store
            .add_assignment(s.teacher, s.class_id, "Fisika", odd.id)
            .await;

        let pending = grade(s.students[0], s.class_id, "Fisika", odd, Some(78.0), Some("Cukup"));
        let objectives = vec![objective(&pending, Some(true)), objective(&pending, None)];
        s.store.add_grade_record(pending, objectives).await;

        let done = grade(s.students[1], s.class_id, "Fisika", odd, Some(90.0), Some("Baik"));
        let objectives = vec![objective(&done, Some(true)), objective(&done, Some(false))];
        s.store.add_grade_record(done, objectives).await;

        let report = GradeService::completion_for_class(&s.store, s.class_id, odd.id)
            .await
            .unwrap();
        let row = &report.subjects[0];
        assert_eq!(row.scored_count, 2);
        assert_eq!(row.described_count, 1);
        assert_eq!(row.status, CompletionStatus::Complete);
    }

    #[tokio::test]
    async fn test_zero_and_missing_scores_do_not_count() {
        let s = scenario(3).await;
        let odd = &s.periods.odd;
        s.store
            .add_assignment(s.teacher, s.class_id, "Biologi", odd.id)
            .await;
        s.store
            .add_assignment(s.teacher, s.class_id, "Kimia", odd.id)
            .await;

        s.store
            .add_grade_record(grade(s.students[0], s.class_id, "Biologi", odd, Some(0.0), None), vec![])
            .await;
        s.store
            .add_grade_record(grade(s.students[1], s.class_id, "Biologi", odd, None, None), vec![])
            .await;
        s.store
            .add_grade_record(grade(s.students[2], s.class_id, "Biologi", odd, Some(70.0), Some("-")), vec![])
            .await;

        let report = GradeService::completion_for_class(&s.store, s.class_id, odd.id)
            .await
            .unwrap();
        let subjects: Vec<(&str, CompletionStatus)> = report
            .subjects
            .iter()
            .map(|r| (r.subject.as_str(), r.status))
            .collect();
        assert_eq!(
            subjects,
            vec![
                ("Kimia", CompletionStatus::Empty),
                ("Biologi", CompletionStatus::Partial)
            ]
        );
        assert_eq!(report.subjects[1].described_count, 0);
    }

    #[tokio::test]
    async fn test_inactive_students_are_ignored() {
        let s = scenario(1).await;
        let odd = &s.periods.odd;
        s.store
            .add_assignment(s.teacher, s.class_id, "PJOK", odd.id)
            .await;
        let mut gone = student(s.class_id, "Keluar");
        gone.is_active = false;
        s.store.add_student(gone.clone()).await;

        s.store
            .add_grade_record(grade(s.students[0], s.class_id, "PJOK", odd, Some(88.0), None), vec![])
            .await;
        s.store
            .add_grade_record(grade(gone.id, s.class_id, "PJOK", odd, Some(75.0), None), vec![])
            .await;

        let report = GradeService::completion_for_class(&s.store, s.class_id, odd.id)
            .await
            .unwrap();
        assert_eq!(report.subjects[0].scored_count, 1);
        assert_eq!(report.subjects[0].status, CompletionStatus::Complete);
    }

    #[tokio::test]
    async fn test_failed_subject_is_reported_not_fatal() {
        let s = scenario(2).await;
        let odd = &s.periods.odd;
        for subject in ["MTK", "Fisika", "Sejarah"] {
            s.store
                .add_assignment(s.teacher, s.class_id, subject, odd.id)
                .await;
        }
        s.store.fail_subject("Fisika").await;

        let report = GradeService::completion_for_class(&s.store, s.class_id, odd.id)
            .await
            .unwrap();
        let names: Vec<&str> = report.subjects.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(names, vec!["Matematika (Umum)", "Sejarah"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].scope,
            FailureScope::Subject {
                subject: "Fisika".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_roster_failure_is_an_error() {
        let s = scenario(2).await;
        s.store.fail_roster().await;
        let err = GradeService::completion_for_class(&s.store, s.class_id, s.periods.odd.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_clean_duplicates_keeps_latest() {
        let s = scenario(2).await;
        let odd = &s.periods.odd;

        let mut old = grade(s.students[0], s.class_id, "MTK", odd, Some(60.0), None);
        old.updated_at = instant(2025, 9, 1, 1);
        let mut newer = grade(s.students[0], s.class_id, "Matematika (Umum)", odd, Some(80.0), None);
        newer.updated_at = instant(2025, 9, 10, 1);
        let mut oldest = grade(s.students[0], s.class_id, "matematika", odd, Some(50.0), None);
        oldest.updated_at = instant(2025, 8, 20, 1);
        let single = grade(s.students[1], s.class_id, "MTK", odd, Some(70.0), None);

        let old_objective = objective(&old, Some(true));
        s.store.add_grade_record(old.clone(), vec![old_objective]).await;
        s.store.add_grade_record(newer.clone(), vec![]).await;
        s.store.add_grade_record(oldest.clone(), vec![]).await;
        s.store.add_grade_record(single.clone(), vec![]).await;

        let report = GradeService::clean_duplicates(&s.store, s.class_id, odd.id)
            .await
            .unwrap();
        assert_eq!(report.affected_pairs, 1);
        assert_eq!(report.removed_records, 2);
        assert!(report.removed_ids.contains(&old.id));
        assert!(report.removed_ids.contains(&oldest.id));

        let remaining: Vec<GradeRecordId> =
            s.store.grade_records().await.iter().map(|g| g.id).collect();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains(&newer.id));
        assert!(remaining.contains(&single.id));
        assert_eq!(s.store.objective_count().await, 0);

        let again = GradeService::clean_duplicates(&s.store, s.class_id, odd.id)
            .await
            .unwrap();
        assert_eq!(again, CleanupReport::default());
    }

    #[tokio::test]
    async fn test_clean_duplicates_tie_breaks_on_created_at() {
        let s = scenario(1).await;
        let odd = &s.periods.odd;

        let mut first = grade(s.students[0], s.class_id, "Kimia", odd, Some(60.0), None);
        first.created_at = instant(2025, 8, 1, 0);
        let mut second = grade(s.students[0], s.class_id, "KIMIA", odd, Some(65.0), None);
        second.created_at = instant(2025, 8, 2, 0);
        s.store.add_grade_record(first.clone(), vec![]).await;
        s.store.add_grade_record(second.clone(), vec![]).await;

        let report = GradeService::clean_duplicates(&s.store, s.class_id, odd.id)
            .await
            .unwrap();
        assert_eq!(report.removed_ids, vec![first.id]);
    }

    fn save_dto(s: &Scenario, period_id: AcademicPeriodId) -> SaveGradeDto {
        SaveGradeDto {
            student_id: s.students[0],
            class_id: s.class_id,
            subject: "  mtk ".to_string(),
            period_id,
            final_score: Some(86.0),
            achievement_description: Some("Catatan guru".to_string()),
            objectives: vec![input(Some(true), "aljabar"), input(Some(false), "geometri")],
        }
    }

    #[tokio::test]
    async fn test_save_grade_normalizes_and_derives() {
        let s = scenario(1).await;
        let cache = PeriodCache::new();
        let clock = FixedClock::new(instant(2025, 9, 15, 2));

        let saved = GradeService::save_grade(&s.store, &cache, &clock, save_dto(&s, s.periods.even.id))
            .await
            .unwrap();
        assert_eq!(saved.record.subject, "Matematika (Umum)");
        assert_eq!(saved.record.semester, s.periods.even.semester);
        assert_eq!(saved.objectives.len(), 2);
        assert_eq!(
            saved.record.achievement_description.as_deref(),
            Some("Menunjukkan penguasaan yang baik dalam aljabar. Perlu bantuan dalam geometri.")
        );

        // Saving again upserts instead of adding a second record.
        let mut dto = save_dto(&s, s.periods.even.id);
        dto.objectives[1].achieved = None;
        let saved = GradeService::save_grade(&s.store, &cache, &clock, dto)
            .await
            .unwrap();
        assert_eq!(saved.record.achievement_description.as_deref(), Some("Catatan guru"));
        assert_eq!(s.store.grade_records().await.len(), 1);
        assert_eq!(s.store.objective_count().await, 2);
    }

    #[tokio::test]
    async fn test_save_grade_rejects_closed_periods() {
        let s = scenario(1).await;
        let cache = PeriodCache::new();
        let clock = FixedClock::new(instant(2025, 9, 15, 2));

        let err = GradeService::save_grade(
            &s.store,
            &cache,
            &clock,
            save_dto(&s, s.periods.previous_even.id),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = GradeService::save_grade(&s.store, &cache, &clock, save_dto(&s, AcademicPeriodId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(s.store.grade_records().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_grade_rejects_out_of_range_score() {
        let s = scenario(1).await;
        let cache = PeriodCache::new();
        let clock = FixedClock::new(instant(2025, 9, 15, 2));

        let mut dto = save_dto(&s, s.periods.odd.id);
        dto.final_score = Some(250.0);
        let err = GradeService::save_grade(&s.store, &cache, &clock, dto)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.error.to_string().contains("final_score"));
        assert!(s.store.grade_records().await.is_empty());
    }
}
