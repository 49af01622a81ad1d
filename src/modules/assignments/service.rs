use std::collections::BTreeSet;
use tracing::{debug, instrument};

use eraport_core::AppError;
use eraport_models::ids::{AcademicPeriodId, ClassId, TeacherId};

use crate::modules::assignments::model::{ClassRef, TeacherAssignment};
use crate::store::AcademicStore;

pub struct AssignmentService;

impl AssignmentService {
    /// Distinct raw subject strings of the given rows, sorted lexically.
    fn distinct_subjects(assignments: &[TeacherAssignment]) -> Vec<String> {
        assignments
            .iter()
            .filter(|a| !a.subject.trim().is_empty())
            .map(|a| a.subject.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Active classes in which the teacher holds at least one assignment for
    /// the period, sorted by class name.
    #[instrument(skip(store))]
    pub async fn resolve_classes_for_teacher(
        store: &dyn AcademicStore,
        teacher_id: TeacherId,
        period_id: AcademicPeriodId,
    ) -> Result<Vec<ClassRef>, AppError> {
        let assignments = store
            .list_assignments(Some(teacher_id), None, period_id)
            .await?;
        if assignments.is_empty() {
            debug!("teacher has no assignments in period");
            return Ok(Vec::new());
        }

        let class_ids: Vec<ClassId> = assignments
            .iter()
            .map(|a| a.class_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut classes: Vec<ClassRef> = store
            .list_classes(&class_ids)
            .await?
            .into_iter()
            .filter(|c| c.is_active)
            .collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        classes.dedup_by(|a, b| a.id == b.id);

        Ok(classes)
    }

    /// Raw subjects the teacher teaches in the class during the period.
    ///
    /// Not normalized: "MTK" and "Matematika" are both returned if both were
    /// assigned.
    #[instrument(skip(store))]
    pub async fn resolve_subjects_for_teacher_and_class(
        store: &dyn AcademicStore,
        teacher_id: TeacherId,
        class_id: ClassId,
        period_id: AcademicPeriodId,
    ) -> Result<Vec<String>, AppError> {
        let assignments = store
            .list_assignments(Some(teacher_id), Some(class_id), period_id)
            .await?;
        Ok(Self::distinct_subjects(&assignments))
    }

    /// Raw subjects assigned to any teacher in the class during the period.
    #[instrument(skip(store))]
    pub async fn resolve_subjects_for_class(
        store: &dyn AcademicStore,
        class_id: ClassId,
        period_id: AcademicPeriodId,
    ) -> Result<Vec<String>, AppError> {
        let assignments = store
            .list_assignments(None, Some(class_id), period_id)
            .await?;
        Ok(Self::distinct_subjects(&assignments))
    }
}
