// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob store trait for the object storage backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::BerthError;
use crate::types::{FileContent, UploadId};

/// Object storage for accepted package uploads.
///
/// Everything belonging to one upload is keyed under its [`UploadId`]. Writes
/// either fully succeed or fail the upload; there is no partial-success
/// reporting and no read path here, since published files are served by a
/// separate delivery tier.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Stores the raw uploaded archive.
    async fn write_tar(
        &self,
        upload: &UploadId,
        archive: Box<dyn AsyncRead + Send + Unpin>,
    ) -> Result<(), BerthError>;

    /// Stores the validated package files, keyed by their relative paths.
    async fn write_plugin_files(
        &self,
        upload: &UploadId,
        files: &BTreeMap<String, FileContent>,
    ) -> Result<(), BerthError>;
}
