use std::sync::Arc;

use eraport_config::{CorsConfig, SchoolConfig, StoreConfig};
use eraport_db::PgPool;

use crate::clock::{Clock, SystemClock};
use crate::modules::periods::PeriodCache;
use crate::store::{AcademicStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AcademicStore>,
    pub clock: Arc<dyn Clock>,
    pub periods: PeriodCache,
    pub cors_config: CorsConfig,
    pub store_config: StoreConfig,
    pub school_config: SchoolConfig,
}

impl AppState {
    /// Production state over a PostgreSQL pool and the system clock.
    pub fn with_pool(pool: PgPool) -> Self {
        Self {
            store: Arc::new(PgStore::new(pool)),
            clock: Arc::new(SystemClock),
            periods: PeriodCache::new(),
            cors_config: CorsConfig::from_env(),
            store_config: StoreConfig::from_env(),
            school_config: SchoolConfig::from_env(),
        }
    }
}
