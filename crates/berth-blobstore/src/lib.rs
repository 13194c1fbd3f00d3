// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem implementation of the `BlobStore` capability.
//!
//! Lays packages out under `<root>/<upload-id>/`: the raw archive as
//! `archive.tar`, and the validated package files at their relative paths.
//! Writes are not transactional; the registry writes blobs before it writes
//! rows, so a failure here aborts the upload before the database is touched.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::debug;

use berth_core::{BerthError, BlobStore, FileContent, UploadId};

const ARCHIVE_NAME: &str = "archive.tar";

/// A blob store rooted at a local directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn upload_dir(&self, upload: &UploadId) -> PathBuf {
        self.root.join(&upload.0)
    }

    async fn write_file(&self, location: &Path, bytes: &[u8]) -> Result<(), BerthError> {
        if let Some(parent) = location.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| blob_error("failed to create blob directory", e))?;
        }
        let mut file = tokio::fs::File::create(location)
            .await
            .map_err(|e| blob_error("failed to create blob file", e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| blob_error("failed to write blob file", e))?;
        file.flush()
            .await
            .map_err(|e| blob_error("failed to flush blob file", e))?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write_tar(
        &self,
        upload: &UploadId,
        mut archive: Box<dyn AsyncRead + Send + Unpin>,
    ) -> Result<(), BerthError> {
        let dir = self.upload_dir(upload);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| blob_error("failed to create upload directory", e))?;
        let location = dir.join(ARCHIVE_NAME);
        let mut file = tokio::fs::File::create(&location)
            .await
            .map_err(|e| blob_error("failed to create archive blob", e))?;
        let written = tokio::io::copy(&mut archive, &mut file)
            .await
            .map_err(|e| blob_error("failed to store archive blob", e))?;
        file.flush()
            .await
            .map_err(|e| blob_error("failed to flush archive blob", e))?;
        debug!(upload = %upload, bytes = written, "archive blob stored");
        Ok(())
    }

    async fn write_plugin_files(
        &self,
        upload: &UploadId,
        files: &BTreeMap<String, FileContent>,
    ) -> Result<(), BerthError> {
        let dir = self.upload_dir(upload);
        for (path, content) in files {
            let relative = safe_relative_path(path)?;
            self.write_file(&dir.join(relative), content.as_bytes())
                .await?;
        }
        debug!(upload = %upload, files = files.len(), "package files stored");
        Ok(())
    }
}

/// File-map keys come from validated descriptors, but this is the process
/// boundary to the filesystem, so unsafe paths are refused again here.
fn safe_relative_path(path: &str) -> Result<PathBuf, BerthError> {
    let relative = Path::new(path);
    let safe = relative.components().all(|component| {
        matches!(component, Component::Normal(_))
    });
    if !safe || relative.as_os_str().is_empty() {
        return Err(BerthError::BlobStore {
            message: format!("unsafe blob path `{path}`"),
            source: None,
        });
    }
    Ok(relative.to_path_buf())
}

fn blob_error(message: &str, source: std::io::Error) -> BerthError {
    BerthError::BlobStore {
        message: message.to_string(),
        source: Some(Box::new(source)),
    }
}
