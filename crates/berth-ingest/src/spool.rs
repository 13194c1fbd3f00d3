// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scratch spooling of the inbound upload stream.
//!
//! The untrusted stream is copied into a uniquely named temp file before any
//! parsing happens, so extraction reads from local disk rather than from the
//! network. The returned [`TempPath`] deletes the file on drop, which covers
//! every exit path including panics.

use tempfile::{NamedTempFile, TempPath};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::debug;

use crate::error::IngestError;

/// Copies the upload stream into a fresh scratch file.
pub(crate) async fn spool_to_scratch<R>(mut reader: R) -> Result<TempPath, IngestError>
where
    R: AsyncRead + Unpin,
{
    let scratch = NamedTempFile::new().map_err(|source| IngestError::Spool { source })?;
    let (std_file, path) = scratch.into_parts();
    let mut file = tokio::fs::File::from_std(std_file);

    let written = tokio::io::copy(&mut reader, &mut file)
        .await
        .map_err(|source| IngestError::Spool { source })?;
    file.flush()
        .await
        .map_err(|source| IngestError::Spool { source })?;

    debug!(bytes = written, path = %path.display(), "upload spooled to scratch");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn spool_writes_stream_to_disk() {
        let payload = b"archive bytes".to_vec();
        let path = spool_to_scratch(payload.as_slice()).await.unwrap();
        let stored = std::fs::read(&path).unwrap();
        assert_eq!(stored, payload);
    }

    #[tokio::test]
    async fn scratch_file_is_removed_on_drop() {
        let path = spool_to_scratch(&b"x"[..]).await.unwrap();
        let location = PathBuf::from(&*path);
        assert!(location.exists());
        drop(path);
        assert!(!location.exists());
    }
}
