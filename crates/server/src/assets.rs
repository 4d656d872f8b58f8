//! Static files under `/assets/{name}`.

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::{path::PathBuf, sync::Arc};
use telemost_types::{AssetSource, TelemostError, traits::Result};

use crate::AppState;

/// Assets are immutable per release.
pub const CACHE_CONTROL: &str = "public, max-age=31536000";

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for DirAssets {
    async fn read(&self, name: &str) -> Result<Vec<u8>> {
        tokio::fs::read(self.root.join(name))
            .await
            .map_err(|e| TelemostError::Storage(format!("asset {name}: {e}")))
    }
}

/// A name is served only if it cannot leave the asset root.
#[must_use]
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

/// Content type by file extension.
#[must_use]
pub fn content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

pub async fn serve(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    if !is_safe_name(&name) {
        tracing::warn!(name = %name, "rejected asset path");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    match state.assets.read(&name).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, content_type(&name)),
                (header::CACHE_CONTROL, CACHE_CONTROL),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::debug!(name = %name, error = %e, "asset not found");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}
