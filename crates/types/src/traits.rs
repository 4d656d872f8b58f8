//! Async traits for the host collaborators shared across all telemost crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `telemost-types`, not on each other.

use async_trait::async_trait;

pub use crate::error::Result;

/// Opaque key-value persistence.
///
/// Each call is atomic for its single key; no multi-key transactions are
/// offered or assumed.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Store (or overwrite) the value under `key`.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;
    /// Remove `key`. Returns `false` if nothing was stored.
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Posts a message into a chat channel on behalf of a user.
#[async_trait]
pub trait ChannelPoster: Send + Sync {
    async fn post(&self, channel_id: &str, user_id: &str, message: &str) -> Result<()>;
}

/// Read-only access to the bridge's bundled static files.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Read the file `name`, relative to the asset root.
    async fn read(&self, name: &str) -> Result<Vec<u8>>;
}
