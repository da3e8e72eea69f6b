//! Service implementations
//!
//! Real implementations of the store and cache traits

pub mod file_cache;
pub mod http_store;
pub mod memory_cache;

#[cfg(test)]
pub mod tests;

use serde_json::Value;
use std::collections::HashSet;

use shared::{ProcessId, Submission, process_warn};

// Re-export service implementations
pub use file_cache::FileSubmissionCache;
pub use http_store::HttpSubmissionStore;
pub use memory_cache::MemorySubmissionCache;

/// Strictly decode an owner's raw cache entries. Malformed entries, entries
/// owned by someone else and repeated ids are dropped.
pub(crate) fn decode_entries(owner_id: &str, values: Vec<Value>) -> Vec<Submission> {
    let mut seen = HashSet::new();
    let mut submissions = Vec::with_capacity(values.len());

    for value in values {
        let submission = match serde_json::from_value::<Submission>(value) {
            Ok(submission) => submission,
            Err(e) => {
                process_warn!(ProcessId::current(), "🗑️ Dropping malformed cache entry: {}", e);
                continue;
            }
        };
        if !submission.is_owned_by(owner_id) {
            process_warn!(
                ProcessId::current(),
                "🗑️ Dropping cache entry {} owned by another user",
                submission.id
            );
            continue;
        }
        if seen.insert(submission.id.clone()) {
            submissions.push(submission);
        }
    }
    submissions
}
