//! File-backed journal storage

use std::fs::OpenOptions;
use std::io::Write;

use feedstore::config::SyncStrategy;
use feedstore::journal::{FileJournalStorage, JournalMutation, JournalStorage, MAX_JOURNAL_NAME_LEN};
use feedstore::FeedStoreError;
use tempfile::TempDir;

use super::{exercise_journal_semantics, record, records};

// =============================================================================
// Helper Functions
// =============================================================================

fn open(dir: &TempDir) -> FileJournalStorage {
    FileJournalStorage::open(dir.path(), SyncStrategy::EveryCommit).unwrap()
}

// =============================================================================
// Semantics Tests
// =============================================================================

#[test]
fn test_file_journal_semantics() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    exercise_journal_semantics(&storage);
}

#[test]
fn test_journal_file_name_is_hex() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    storage
        .commit(JournalMutation::new("$HEAD").append(record("a")))
        .unwrap();

    let path = storage.journal_path("$HEAD").unwrap();
    assert_eq!(path.file_name().unwrap(), "2448454144.journal");
    assert!(path.exists());
}

#[test]
fn test_names_with_separators_round_trip() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    storage
        .commit(JournalMutation::new("_session:a/b\\c").append(record("x")))
        .unwrap();

    assert_eq!(storage.get_all_journals().unwrap(), vec!["_session:a/b\\c".to_string()]);
}

#[test]
fn test_delete_removes_file() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    storage
        .commit(JournalMutation::new("gone").append(record("x")))
        .unwrap();

    storage.commit(JournalMutation::new("gone").delete()).unwrap();

    assert!(!storage.journal_path("gone").unwrap().exists());
    assert!(!storage.exists("gone").unwrap());
}

#[test]
fn test_longest_journal_name_is_accepted() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    let name = "n".repeat(MAX_JOURNAL_NAME_LEN);

    storage
        .commit(JournalMutation::new(name.as_str()).append(record("x")))
        .unwrap();

    assert_eq!(storage.read(&name).unwrap(), records(&["x"]));
    assert_eq!(storage.get_all_journals().unwrap(), vec![name]);
}

#[test]
fn test_overlong_journal_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    let name = "n".repeat(MAX_JOURNAL_NAME_LEN + 1);

    let result = storage.commit(JournalMutation::new(name.as_str()).append(record("x")));
    assert!(matches!(result, Err(FeedStoreError::Storage(_))));
    assert!(matches!(storage.read(&name), Err(FeedStoreError::Storage(_))));

    // Copying onto an over-long name fails before the source is touched
    storage
        .commit(JournalMutation::new("src").append(record("a")))
        .unwrap();
    let result = storage.commit(JournalMutation::new("src").copy(name.as_str()));
    assert!(matches!(result, Err(FeedStoreError::Storage(_))));
    assert_eq!(storage.read("src").unwrap(), records(&["a"]));
    assert_eq!(storage.get_all_journals().unwrap(), vec!["src".to_string()]);
}

#[test]
fn test_oversize_append_fails_and_keeps_journal() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    storage
        .commit(JournalMutation::new("j").append(record("a")))
        .unwrap();

    let big = vec![0u8; 65 * 1024 * 1024];
    let result = storage.commit(JournalMutation::new("j").append(big));
    assert!(matches!(result, Err(FeedStoreError::Storage(_))));

    storage
        .commit(JournalMutation::new("j").append(record("b")))
        .unwrap();
    drop(storage);

    let storage = open(&dir);
    assert_eq!(storage.recovery().journals_truncated, 0);
    assert_eq!(storage.read("j").unwrap(), records(&["a", "b"]));
}

#[test]
fn test_large_journal_copy_is_split_across_frames() {
    let dir = TempDir::new().unwrap();
    {
        let storage = open(&dir);
        // 5 x 15 MB: more than one frame can hold once copied
        for i in 0..5u8 {
            storage
                .commit(JournalMutation::new("big").append(vec![i; 15 * 1024 * 1024]))
                .unwrap();
        }
        storage.commit(JournalMutation::new("big").copy("fork")).unwrap();
    }

    let storage = open(&dir);

    assert_eq!(storage.recovery().journals_truncated, 0);
    let copied = storage.read("fork").unwrap();
    assert_eq!(copied.len(), 5);
    for (i, record) in copied.iter().enumerate() {
        assert_eq!(record.len(), 15 * 1024 * 1024);
        assert_eq!(record[0], i as u8);
    }
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let storage = open(&dir);
        storage
            .commit(JournalMutation::new("j").append(record("a")))
            .unwrap();
        storage
            .commit(JournalMutation::new("j").append(record("b")).append(record("c")))
            .unwrap();
        storage.commit(JournalMutation::new("j").copy("k")).unwrap();
    }

    let storage = open(&dir);

    assert_eq!(storage.recovery().journals_found, 2);
    assert_eq!(storage.recovery().journals_truncated, 0);
    assert_eq!(storage.read("j").unwrap(), records(&["a", "b", "c"]));
    assert_eq!(storage.read("k").unwrap(), records(&["a", "b", "c"]));
}

#[test]
fn test_torn_tail_truncated_on_open() {
    let dir = TempDir::new().unwrap();
    let path;
    {
        let storage = open(&dir);
        storage
            .commit(JournalMutation::new("j").append(record("a")))
            .unwrap();
        path = storage.journal_path("j").unwrap();
    }
    let good_len = std::fs::metadata(&path).unwrap().len();
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[0x05, 0x00, 0x00, 0x00, 0x12]).unwrap();
    drop(file);

    let storage = open(&dir);

    assert_eq!(storage.recovery().journals_truncated, 1);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), good_len);
    storage
        .commit(JournalMutation::new("j").append(record("b")))
        .unwrap();
    assert_eq!(storage.read("j").unwrap(), records(&["a", "b"]));
}

#[test]
fn test_unrelated_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
    std::fs::write(dir.path().join("zz.journal"), b"").unwrap();

    let storage = open(&dir);

    assert_eq!(storage.recovery().journals_found, 0);
    assert!(storage.get_all_journals().unwrap().is_empty());
}
