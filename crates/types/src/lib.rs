//! Core types and traits for the telemost-bridge workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! bridge: the error taxonomy, the persisted OAuth records, the Telemost
//! meeting payloads, and the async traits for the host collaborators
//! (key-value store, channel posting, clock).

pub mod clock;
pub mod error;
pub mod meeting;
pub mod token;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TelemostError;
pub use meeting::{
    Cohost, LiveStream, LiveStreamRequest, Meeting, MeetingRequest, ProviderErrorBody,
};
pub use token::{OAuthState, UserToken};
pub use traits::{AssetSource, ChannelPoster, KvStore};
