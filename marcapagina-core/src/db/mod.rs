//! Database layer for marcapágina
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository operations for books, sessions, highlights and goals
//! - Transactions around every multi-step write

pub mod repo;
pub mod schema;

pub use repo::{Database, LoggedSession};
