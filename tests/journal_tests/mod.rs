//! Tests for journal storage backends
//!
//! These tests verify:
//! - Append, delete and copy semantics shared by every backend
//! - File naming, torn tail recovery and persistence across reopen

mod file_journal_tests;

use feedstore::journal::{JournalMutation, JournalStorage};

// =============================================================================
// Helper Functions
// =============================================================================

pub fn record(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

pub fn records(values: &[&str]) -> Vec<Vec<u8>> {
    values.iter().map(|v| record(v)).collect()
}

/// Checks shared by every backend
pub fn exercise_journal_semantics(storage: &dyn JournalStorage) {
    // Append creates
    assert!(!storage.exists("$HEAD").unwrap());
    storage
        .commit(JournalMutation::new("$HEAD").append(record("a")).append(record("b")))
        .unwrap();
    assert!(storage.exists("$HEAD").unwrap());
    assert_eq!(storage.read("$HEAD").unwrap(), records(&["a", "b"]));

    // Copy sees appends earlier in the same mutation
    storage
        .commit(JournalMutation::new("$HEAD").append(record("c")).copy("fork"))
        .unwrap();
    assert_eq!(storage.read("fork").unwrap(), records(&["a", "b", "c"]));

    // Forks are independent
    storage
        .commit(JournalMutation::new("$HEAD").append(record("d")))
        .unwrap();
    assert_eq!(storage.read("fork").unwrap().len(), 3);

    // Delete then append recreates empty-then-one
    storage
        .commit(JournalMutation::new("$HEAD").delete().append(Vec::new()))
        .unwrap();
    assert_eq!(storage.read("$HEAD").unwrap(), vec![Vec::<u8>::new()]);

    // Missing journals read empty
    assert!(storage.read("missing").unwrap().is_empty());

    let mut names = storage.get_all_journals().unwrap();
    names.sort();
    assert_eq!(names, vec!["$HEAD".to_string(), "fork".to_string()]);

    storage.delete_all().unwrap();
    assert!(storage.get_all_journals().unwrap().is_empty());
}
