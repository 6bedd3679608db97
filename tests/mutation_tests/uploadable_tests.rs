//! Uploadable action cancellation

use feedstore::UploadableAction;

use super::store;

#[test]
fn test_upsert_then_remove_cancels() {
    let store = store();
    let changes = store
        .edit_uploadable_actions()
        .upsert(b"like".to_vec(), "a")
        .remove(b"like".to_vec(), "a")
        .finish();

    let sets = changes.get("a").unwrap();
    assert!(sets.upserts.is_empty());
    assert!(sets.removes.contains(&UploadableAction::new("a", b"like".to_vec())));

    assert!(store.commit_uploadable_actions(changes).is_success());
    assert!(store.get_all_uploadable_actions().unwrap().is_empty());
}

#[test]
fn test_remove_then_upsert_keeps() {
    let store = store();
    let _ = store
        .edit_uploadable_actions()
        .remove(b"like".to_vec(), "a")
        .upsert(b"like".to_vec(), "a")
        .commit();

    let actions = store.get_all_uploadable_actions().unwrap();
    assert_eq!(actions.len(), 1);
    assert!(actions.contains(&UploadableAction::new("a", b"like".to_vec())));
}

#[test]
fn test_distinct_payloads_are_independent() {
    let store = store();
    let changes = store
        .edit_uploadable_actions()
        .upsert(b"like".to_vec(), "a")
        .upsert(b"share".to_vec(), "a")
        .remove(b"share".to_vec(), "a")
        .finish();

    let sets = changes.get("a").unwrap();
    assert_eq!(sets.upserts.len(), 1);
    assert_eq!(sets.removes.len(), 1);
}

#[test]
fn test_storage_keys_differ_by_payload() {
    let like = UploadableAction::new("a", b"like".to_vec());
    let share = UploadableAction::new("a", b"share".to_vec());

    assert!(like.storage_key().starts_with("ua::a"));
    assert_eq!(like.storage_key().len(), "ua::a".len() + 8);
    assert_ne!(like.storage_key(), share.storage_key());
}
