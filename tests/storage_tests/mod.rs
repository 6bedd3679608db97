//! Tests for content storage backends
//!
//! These tests verify:
//! - Point reads, prefix scans and key listing
//! - Ordered operations inside one commit
//! - Commit log replay, torn tail truncation and compaction


use feedstore::storage::{ContentStorage, ContentStorageMutation};

// =============================================================================
// Helper Functions
// =============================================================================

/// Checks shared by every backend
pub fn exercise_basic_operations(storage: &dyn ContentStorage) {
    storage
        .commit(
            ContentStorageMutation::new()
                .upsert("a", b"1".to_vec())
                .upsert("sp::a", b"2".to_vec())
                .upsert("sp::b", b"3".to_vec())
                .upsert("ss::a", b"4".to_vec()),
        )
        .unwrap();

    let values = storage
        .get(&["a".to_string(), "missing".to_string()])
        .unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values["a"], b"1".to_vec());

    let props = storage.get_all("sp::").unwrap();
    assert_eq!(props.len(), 2);
    assert!(props.contains_key("sp::b"));

    let mut keys = storage.get_all_keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["a", "sp::a", "sp::b", "ss::a"]);
}
