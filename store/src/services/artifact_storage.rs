//! Disk-backed archive storage
//!
//! Archives are written as `<uploads_dir>/<submission id><extension>` so the
//! client-supplied file name never reaches the file system.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreResult;
use crate::traits::ArtifactStorage;
use crate::types::StoredArtifact;
use shared::{ProcessId, process_debug};

/// Real artifact storage writing into an uploads directory
#[derive(Debug, Clone)]
pub struct DiskArtifactStorage {
    uploads_dir: PathBuf,
}

impl DiskArtifactStorage {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &PathBuf {
        &self.uploads_dir
    }

    fn artifact_path(&self, submission_id: &str, extension: &str) -> PathBuf {
        self.uploads_dir.join(format!("{submission_id}{extension}"))
    }
}

#[async_trait]
impl ArtifactStorage for DiskArtifactStorage {
    async fn save(&self, submission_id: &str, extension: &str, bytes: &[u8]) -> StoreResult<StoredArtifact> {
        fs::create_dir_all(&self.uploads_dir).await?;

        let path = self.artifact_path(submission_id, extension);
        let mut file = fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        process_debug!(ProcessId::current(), "📁 Stored artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(StoredArtifact {
            path,
            size: bytes.len() as u64,
        })
    }
}
