use std::path::PathBuf;

use anyhow::Context as _;
use bytes::Bytes;
use uuid::Uuid;

use crate::domain::repository::BlobStore;
use crate::domain::types::ImageFormat;
use crate::error::ServiceError;

/// Images written under `root` as `<uuid>.<ext>`, served from `media_url`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    pub root: PathBuf,
    pub media_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, media_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            media_url: media_url.into(),
        }
    }
}

impl BlobStore for LocalBlobStore {
    async fn store_blob(&self, bytes: Bytes) -> Result<String, ServiceError> {
        let extension = ImageFormat::sniff(&bytes).map_or("bin", ImageFormat::extension);
        let reference = format!("{}.{extension}", Uuid::now_v7());
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create media root {}", self.root.display()))?;
        tokio::fs::write(self.root.join(&reference), &bytes)
            .await
            .with_context(|| format!("write blob {reference}"))?;
        tracing::debug!(%reference, size = bytes.len(), "blob stored");
        Ok(reference)
    }

    fn url_for(&self, reference: &str) -> String {
        format!("{}/{reference}", self.media_url.trim_end_matches('/'))
    }
}
