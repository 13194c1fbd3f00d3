// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory blob store that records every write for test assertions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;

use berth_core::{BerthError, BlobStore, FileContent, UploadId};

/// Everything stored under one upload id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredUpload {
    pub tar: Vec<u8>,
    pub files: BTreeMap<String, FileContent>,
}

/// A `BlobStore` backed by a map, with a failure switch for exercising the
/// abort-before-database path.
#[derive(Default)]
pub struct MemoryBlobStore {
    uploads: Mutex<BTreeMap<String, StoredUpload>>,
    failing: Mutex<bool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following write fail.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    /// Snapshot of what has been stored for one upload.
    pub async fn upload(&self, upload: &UploadId) -> Option<StoredUpload> {
        self.uploads.lock().await.get(&upload.0).cloned()
    }

    /// Number of uploads with at least one write.
    pub async fn upload_count(&self) -> usize {
        self.uploads.lock().await.len()
    }

    async fn check_failing(&self) -> Result<(), BerthError> {
        if *self.failing.lock().await {
            return Err(BerthError::BlobStore {
                message: "scripted blob store failure".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write_tar(
        &self,
        upload: &UploadId,
        mut archive: Box<dyn AsyncRead + Send + Unpin>,
    ) -> Result<(), BerthError> {
        self.check_failing().await?;
        let mut tar = Vec::new();
        archive
            .read_to_end(&mut tar)
            .await
            .map_err(|e| BerthError::BlobStore {
                message: "failed to read archive stream".to_string(),
                source: Some(Box::new(e)),
            })?;
        self.uploads
            .lock()
            .await
            .entry(upload.0.clone())
            .or_default()
            .tar = tar;
        Ok(())
    }

    async fn write_plugin_files(
        &self,
        upload: &UploadId,
        files: &BTreeMap<String, FileContent>,
    ) -> Result<(), BerthError> {
        self.check_failing().await?;
        self.uploads
            .lock()
            .await
            .entry(upload.0.clone())
            .or_default()
            .files = files.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_tar_and_files_per_upload() {
        let store = MemoryBlobStore::new();
        let upload = UploadId::generate();

        store
            .write_tar(&upload, Box::new(&b"tar bytes"[..]))
            .await
            .unwrap();
        let mut files = BTreeMap::new();
        files.insert(
            "manifest.json".to_string(),
            FileContent::Text("{}".to_string()),
        );
        store.write_plugin_files(&upload, &files).await.unwrap();

        let stored = store.upload(&upload).await.unwrap();
        assert_eq!(stored.tar, b"tar bytes");
        assert_eq!(stored.files, files);
        assert_eq!(store.upload_count().await, 1);
    }

    #[tokio::test]
    async fn failure_switch_rejects_writes() {
        let store = MemoryBlobStore::new();
        let upload = UploadId::generate();
        store.set_failing(true).await;

        let err = store
            .write_tar(&upload, Box::new(&b"x"[..]))
            .await
            .unwrap_err();
        assert!(matches!(err, BerthError::BlobStore { .. }));
        assert!(store.upload(&upload).await.is_none());
    }
}
