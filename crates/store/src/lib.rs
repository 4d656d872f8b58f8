//! Key-value backends for the bridge's persisted OAuth records.
//!
//! Provides an in-memory store for testing and a SQLite-backed store for production.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryKvStore;
pub use sqlite::SqliteKvStore;
