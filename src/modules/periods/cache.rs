use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::modules::periods::model::PeriodContext;

/// How long a resolved context is served before the store is read again.
///
/// Activations through the API invalidate immediately; the age limit bounds
/// how long a transition made by another process (the CLI) goes unnoticed.
pub const PERIOD_CACHE_TTL_SECS: i64 = 300;

/// Holds the last resolved [`PeriodContext`] until the next period transition.
///
/// Clones share the same slot, so invalidating through any handle is seen by
/// every reader in the process.
#[derive(Debug, Clone)]
pub struct PeriodCache {
    slot: Arc<RwLock<Option<PeriodContext>>>,
    ttl: TimeDelta,
}

impl Default for PeriodCache {
    fn default() -> Self {
        Self::with_ttl(TimeDelta::seconds(PERIOD_CACHE_TTL_SECS))
    }
}

impl PeriodCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: TimeDelta) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// The cached context, unless it is older than the TTL at `now`.
    pub async fn get(&self, now: DateTime<Utc>) -> Option<PeriodContext> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|context| now - context.resolved_at <= self.ttl)
            .cloned()
    }

    pub async fn store(&self, context: PeriodContext) {
        *self.slot.write().await = Some(context);
    }

    /// Drops the cached context; the next read resolves from the store.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}
