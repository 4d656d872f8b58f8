//! Yandex OAuth implicit-grant flow and per-user token lifecycle.
//!
//! The browser leg is a three-hop dance: `/oauth/start` redirects to Yandex,
//! Yandex returns the token in the URL fragment of `/oauth/callback`, and the
//! page served there re-posts it to `/oauth/complete`. The [`SessionManager`]
//! owns both persisted records involved (pending state and user token).

pub mod callback;
pub mod manager;
pub mod state;
pub mod yandex;

pub use callback::{CompleteRequest, render_callback_page};
pub use manager::SessionManager;
