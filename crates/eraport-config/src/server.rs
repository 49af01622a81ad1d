//! Listener configuration.
//!
//! - `SERVER_PORT`: API listener port (default: 3000)
//! - `METRICS_PORT`: Prometheus listener port (default: 3001)

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            metrics_port: 3001,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("SERVER_PORT", defaults.port),
            metrics_port: env_or("METRICS_PORT", defaults.metrics_port),
        }
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    #[must_use]
    pub fn metrics_bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.metrics_port)
    }
}
