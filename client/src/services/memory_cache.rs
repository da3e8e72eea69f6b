//! In-memory submission cache
//!
//! Holds raw JSON like the file cache does, so the same validation runs on
//! read. Useful for embedding and for tests that need to plant bad entries.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use shared::Submission;
use crate::error::{ClientError, ClientResult};
use crate::services::decode_entries;
use crate::traits::SubmissionCache;

#[derive(Debug, Clone, Default)]
pub struct MemorySubmissionCache {
    entries: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    read_only: Arc<AtomicBool>,
}

impl MemorySubmissionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an unvalidated entry to an owner's list
    pub fn insert_raw(&self, owner_id: &str, entry: Value) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(owner_id.to_string())
            .or_default()
            .push(entry);
    }

    /// Make every subsequent `store` fail
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn raw_len(&self, owner_id: &str) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(owner_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl SubmissionCache for MemorySubmissionCache {
    async fn load(&self, owner_id: &str) -> ClientResult<Vec<Submission>> {
        let values = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(owner_id)
            .cloned()
            .unwrap_or_default();
        Ok(decode_entries(owner_id, values))
    }

    async fn store(&self, owner_id: &str, submissions: &[Submission]) -> ClientResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(ClientError::Storage("cache is read-only".to_string()));
        }

        let values = submissions
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(owner_id.to_string(), values);
        Ok(())
    }
}
