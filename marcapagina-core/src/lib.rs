//! # marcapagina-core
//!
//! Core library for marcapágina - a personal reading-habit tracker.
//!
//! This library provides:
//! - Domain types for books, reading sessions, highlights and goals
//! - Reading metrics and insights (streaks, pace, insights, recommendations,
//!   goal suggestions, the monthly story)
//! - Database storage layer with SQLite
//! - JSON export, configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! The calculators in [`analytics`] are pure functions over a snapshot of
//! sessions and books plus a [`Clock`]. The [`Database`] produces those
//! snapshots and owns every write.
//!
//! ## Example
//!
//! ```rust,no_run
//! use marcapagina_core::analytics::DashboardStats;
//! use marcapagina_core::{Config, Database};
//!
//! let config = Config::load().expect("failed to load config");
//! let clock = config.clock().expect("invalid calendar offset");
//!
//! let db = Database::open(&config.resolved_database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let sessions = db.list_sessions().expect("failed to read sessions");
//! let goal = db.active_goal().expect("failed to read goal");
//! let stats = DashboardStats::compute(&sessions, goal.as_ref(), &clock);
//! println!("{} pages today", stats.today_pages);
//! ```

// Re-export commonly used items at the crate root
pub use clock::Clock;
pub use config::Config;
pub use db::{Database, LoggedSession};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod format;
pub mod logging;
pub mod types;
