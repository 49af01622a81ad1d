//! # E-Raport DB
//!
//! Database pool and schema migrations for the e-raport engine.
//!
//! # Example
//!
//! ```ignore
//! use eraport_db::{init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = init_db_pool().await;
//!     run_migrations(&pool).await.expect("migrations failed");
//! }
//! ```

use std::env;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

/// Initializes a PostgreSQL connection pool from `DATABASE_URL`.
///
/// `DATABASE_MAX_CONNECTIONS` caps the pool size (default: 10).
///
/// # Panics
///
/// Panics if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
///
/// This function should be called once during start-up; the returned pool is
/// cheap to clone.
pub async fn init_db_pool() -> sqlx::PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

/// Applies the embedded migrations under `migrations/`.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
