//! File-backed submission cache
//!
//! One JSON array per user at `<cache_dir>/user-<hex uid>.json`. The files
//! are user-editable, so every read goes back through strict validation.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

use shared::{ProcessId, Submission, process_debug, process_warn};
use crate::error::{ClientError, ClientResult};
use crate::services::decode_entries;
use crate::traits::SubmissionCache;

#[derive(Debug, Clone)]
pub struct FileSubmissionCache {
    cache_dir: PathBuf,
}

impl FileSubmissionCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Hex keeps the name file-system safe and distinct per uid
    pub fn path_for(&self, owner_id: &str) -> PathBuf {
        self.cache_dir.join(format!("user-{}.json", hex::encode(owner_id)))
    }
}

#[async_trait]
impl SubmissionCache for FileSubmissionCache {
    async fn load(&self, owner_id: &str) -> ClientResult<Vec<Submission>> {
        let path = self.path_for(owner_id);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(values)) => Ok(decode_entries(owner_id, values)),
            Ok(_) | Err(_) => {
                process_warn!(
                    ProcessId::current(),
                    "🗑️ Ignoring unreadable cache file {}",
                    path.display()
                );
                Ok(Vec::new())
            }
        }
    }

    async fn store(&self, owner_id: &str, submissions: &[Submission]) -> ClientResult<()> {
        fs::create_dir_all(&self.cache_dir).await?;

        let path = self.path_for(owner_id);
        let temp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(submissions).map_err(|e| ClientError::Storage(e.to_string()))?;

        fs::write(&temp, body).await?;
        fs::rename(&temp, &path).await?;

        process_debug!(
            ProcessId::current(),
            "💾 Cached {} submissions for {}",
            submissions.len(),
            owner_id
        );
        Ok(())
    }
}
