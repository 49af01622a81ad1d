use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

use eraport_core::AppError;
use eraport_models::grades::GradeRecord;
use eraport_models::ids::{AcademicPeriodId, ClassId, StudentId};
use eraport_models::students::active_roster;

use crate::modules::grades::service::is_scored;
use crate::modules::ledger::model::{LedgerReport, RankedRow};
use crate::modules::subjects::{SubjectService, canonical_key};
use crate::store::AcademicStore;

/// Rows that get a rank tag.
const RANKED_POSITIONS: usize = 3;

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether `candidate` supersedes `current` as a student's record for a subject.
fn is_newer(candidate: &GradeRecord, current: &GradeRecord) -> bool {
    (candidate.updated_at, candidate.created_at, candidate.id)
        > (current.updated_at, current.created_at, current.id)
}

pub struct LedgerService;

impl LedgerService {
    /// Builds the ranked ledger of a class.
    ///
    /// Rows with a sum of zero are dropped. The sort is stable, so students
    /// with equal sums keep their alphabetical order.
    #[instrument(skip(store))]
    pub async fn build_ledger(
        store: &dyn AcademicStore,
        class_id: ClassId,
        period_id: AcademicPeriodId,
    ) -> Result<LedgerReport, AppError> {
        let roster = active_roster(store.list_students(class_id).await?);
        let entries = store.list_grade_records(class_id, period_id, None).await?;

        let subjects =
            SubjectService::canonical_set(entries.iter().map(|e| e.record.subject.as_str()));
        let columns: HashMap<String, &str> = subjects
            .iter()
            .map(|subject| (canonical_key(subject), subject.as_str()))
            .collect();

        let mut latest: HashMap<(StudentId, String), &GradeRecord> = HashMap::new();
        for entry in &entries {
            let key = (entry.record.student_id, canonical_key(&entry.record.subject));
            let replace = latest
                .get(&key)
                .is_none_or(|current| is_newer(&entry.record, current));
            if replace {
                latest.insert(key, &entry.record);
            }
        }

        let mut scores_by_student: HashMap<StudentId, BTreeMap<String, f64>> = HashMap::new();
        for ((student_id, key), record) in &latest {
            let Some(column) = columns.get(key) else {
                continue;
            };
            if let Some(score) = record.final_score.filter(|_| is_scored(record)) {
                scores_by_student
                    .entry(*student_id)
                    .or_default()
                    .insert(column.to_string(), score);
            }
        }

        let mut rows: Vec<RankedRow> = roster
            .iter()
            .filter_map(|student| {
                let scores = scores_by_student.remove(&student.id).unwrap_or_default();
                let total: f64 = scores.values().sum();
                let sum = total.round() as i64;
                if sum <= 0 {
                    return None;
                }
                Some(RankedRow {
                    student_id: student.id,
                    student_name: student.name.clone(),
                    average: round_two(total / scores.len() as f64),
                    scores,
                    sum,
                    rank: None,
                })
            })
            .collect();

        rows.sort_by(|a, b| b.sum.cmp(&a.sum));
        for (position, row) in rows.iter_mut().take(RANKED_POSITIONS).enumerate() {
            row.rank = Some(position as u8 + 1);
        }

        debug!(rows = rows.len(), subjects = subjects.len(), "ledger built");
        Ok(LedgerReport {
            class_id,
            period_id,
            subjects,
            rows,
        })
    }
}
