//! Configuration loading and hot-reloading for the telemost bridge.
//!
//! Uses figment for YAML + environment configuration with sensible defaults,
//! and notify + arc-swap so readers always hold an immutable snapshot while
//! a changed file publishes a fresh one.

pub mod schema;
pub mod watcher;

pub use schema::Config;
pub use watcher::ConfigWatcher;
