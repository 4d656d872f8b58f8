//! Random OAuth `state` generation.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore as _, rngs::OsRng};
use telemost_types::{TelemostError, traits::Result};

/// Number of random bytes behind each state token.
pub const STATE_BYTES: usize = 32;

/// Generate a base64url (unpadded) state from 32 bytes of OS randomness.
///
/// # Errors
///
/// Returns [`TelemostError::Internal`] if the OS random source fails.
pub fn random_state() -> Result<String> {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| TelemostError::Internal(format!("failed to generate OAuth state: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
