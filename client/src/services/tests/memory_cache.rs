//! Tests for MemorySubmissionCache

use serde_json::json;

use crate::error::ClientError;
use crate::services::memory_cache::MemorySubmissionCache;
use crate::services::tests::fixtures::{completed, processing};
use crate::traits::SubmissionCache;

#[tokio::test]
async fn test_raw_entries_are_validated() {
    let cache = MemorySubmissionCache::new();
    cache.insert_raw("u1", serde_json::to_value(completed("a", "u1")).unwrap());
    cache.insert_raw("u1", json!({ "id": "b", "status": "Exploded" }));

    let loaded = cache.load("u1").await.unwrap();
    assert_eq!(loaded, vec![completed("a", "u1")]);
    assert_eq!(cache.raw_len("u1"), 2);
}

#[tokio::test]
async fn test_lists_are_per_owner() {
    let cache = MemorySubmissionCache::new();
    cache.store("u1", &[processing("a", "u1")]).await.unwrap();

    assert!(cache.load("u2").await.unwrap().is_empty());
    assert_eq!(cache.load("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_read_only_rejects_writes() {
    let cache = MemorySubmissionCache::new();
    cache.set_read_only(true);

    let err = cache.store("u1", &[processing("a", "u1")]).await.unwrap_err();
    assert!(matches!(err, ClientError::Storage(_)));
}
