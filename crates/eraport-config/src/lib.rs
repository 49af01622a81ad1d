//! # E-Raport Config
//!
//! Configuration types for the e-raport engine.
//!
//! Every structure is loaded from environment variables (after `.env` has been
//! read by the binary) and falls back to a default when a variable is missing
//! or does not parse:
//!
//! - [`cors`]: CORS allowed origins
//! - [`server`]: HTTP and metrics listener ports
//! - [`school`]: school time zone and autosave quiet period
//! - [`store`]: store paging limits
//!
//! # Example
//!
//! ```ignore
//! use eraport_config::{CorsConfig, SchoolConfig, ServerConfig, StoreConfig};
//!
//! let server = ServerConfig::from_env();
//! let school = SchoolConfig::from_env();
//! println!("serving on {} with UTC{:+}", server.port, school.utc_offset_hours);
//! ```

pub mod cors;
pub mod school;
pub mod server;
pub mod store;

pub use cors::CorsConfig;
pub use school::SchoolConfig;
pub use server::ServerConfig;
pub use store::StoreConfig;

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
