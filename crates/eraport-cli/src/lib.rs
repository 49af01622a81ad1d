//! # E-Raport CLI
//!
//! Database seeding utilities for e-raport testing and development.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use eraport_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(4); // 4 classes with defaults
//! seed_all(&pool, &period, config).await?;
//! ```

pub mod seeder;
