//! Debounced autosave for grade entry.
//!
//! A grade form fires an edit on every keystroke. The debouncer keeps a single
//! pending timer per edit session: each edit replaces the pending value and
//! restarts the timer, and the save runs once the session has been quiet for
//! the configured period. Closing the session flushes whatever is pending.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::modules::grades::model::SaveGradeDto;
use crate::modules::grades::service::GradeService;
use crate::state::AppState;

pub struct AutosaveDebouncer<T> {
    edits: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> AutosaveDebouncer<T> {
    /// Starts an edit session that hands the latest value to `save` after
    /// `quiet` without edits.
    pub fn spawn<F, Fut>(quiet: Duration, mut save: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (edits, mut rx) = mpsc::unbounded_channel::<T>();

        let worker = tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                let mut latest = first;
                loop {
                    match tokio::time::timeout(quiet, rx.recv()).await {
                        Ok(Some(next)) => latest = next,
                        Ok(None) => {
                            save(latest).await;
                            return;
                        }
                        Err(_) => {
                            save(latest).await;
                            break;
                        }
                    }
                }
            }
        });

        Self { edits, worker }
    }

    /// Records an edit. Returns `false` if the session has already ended.
    pub fn edit(&self, value: T) -> bool {
        self.edits.send(value).is_ok()
    }

    /// Ends the session, flushing a pending edit immediately.
    pub async fn finish(self) {
        drop(self.edits);
        if let Err(e) = self.worker.await {
            warn!(error = %e, "autosave worker ended abnormally");
        }
    }
}

/// Autosave session that persists grades through [`GradeService::save_grade`].
///
/// Failed saves are logged; the next edit retries with fresh data.
pub fn grade_autosave(state: &AppState) -> AutosaveDebouncer<SaveGradeDto> {
    let quiet = state.school_config.autosave_quiet_period();
    let state = state.clone();
    let save = move |dto: SaveGradeDto| {
        let state = state.clone();
        async move {
            let student_id = dto.student_id;
            match GradeService::save_grade(
                state.store.as_ref(),
                &state.periods,
                state.clock.as_ref(),
                dto,
            )
            .await
            {
                Ok(saved) => debug!(grade_id = %saved.record.id, "autosaved grade"),
                Err(e) => warn!(student_id = %student_id, error = %e.error, "autosave failed"),
            }
        }
    };
    AutosaveDebouncer::spawn(quiet, save)
}
