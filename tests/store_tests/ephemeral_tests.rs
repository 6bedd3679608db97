//! Ephemeral mode

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use feedstore::keys::HEAD_SESSION_ID;
use feedstore::{ActionType, FeedStore, StoreListener, StreamStructure};

use super::{feature, ids, open_memory_store, shared_state};

#[derive(Default)]
struct CountingListener {
    calls: AtomicUsize,
}

impl StoreListener for CountingListener {
    fn on_switch_to_ephemeral_mode(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Mode Switch Tests
// =============================================================================

#[test]
fn test_switch_notifies_listeners_once() {
    let t = open_memory_store();
    let listener = Arc::new(CountingListener::default());
    t.store.register_listener(listener.clone());

    t.store.switch_to_ephemeral_mode();
    t.store.switch_to_ephemeral_mode();

    assert!(t.store.is_ephemeral_mode());
    assert_eq!(listener.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_switch_starts_empty_with_head() {
    let t = open_memory_store();
    let _ = t.store.edit_content().add("a", feature("a", b"p")).commit();

    t.store.switch_to_ephemeral_mode();

    assert!(t.store.get_payloads(&ids(&["a"])).unwrap().is_empty());
    assert!(t.store.session_exists(HEAD_SESSION_ID).unwrap());
}

#[test]
fn test_switch_leaves_persistent_storage_untouched() {
    let t = open_memory_store();
    let _ = t.store.edit_content().add("a", feature("a", b"p")).commit();

    t.store.switch_to_ephemeral_mode();
    let _ = t.store.edit_content().add("b", feature("b", b"q")).commit();

    assert_eq!(t.content.len(), 1);
}

// =============================================================================
// Ephemeral Store Tests
// =============================================================================

#[test]
fn test_ephemeral_reads_and_writes() {
    let store = FeedStore::ephemeral();
    let _ = store
        .edit_content()
        .add("p1", feature("p1", b"one"))
        .add("p2", shared_state("p2", b"two"))
        .commit();
    let _ = store.edit_semantic_properties().add("p1", b"sp".to_vec()).commit();
    let _ = store.edit_local_actions().add(ActionType::Dismiss, "p1").commit();
    let _ = store
        .edit_uploadable_actions()
        .upsert(b"like".to_vec(), "p1")
        .upsert(b"drop".to_vec(), "p1")
        .remove(b"drop".to_vec(), "p1")
        .commit();

    assert_eq!(store.get_payloads(&ids(&["p1", "p2"])).unwrap().len(), 1);
    assert_eq!(store.get_shared_states().unwrap().len(), 1);
    assert_eq!(store.get_semantic_properties(&ids(&["p1"])).unwrap().len(), 1);
    assert_eq!(store.get_all_dismiss_local_actions().unwrap().len(), 1);
    assert_eq!(store.get_all_uploadable_actions().unwrap().len(), 1);
}

#[test]
fn test_ephemeral_sessions_fork_and_remove() {
    let store = FeedStore::ephemeral();
    let _ = store
        .edit_session(HEAD_SESSION_ID)
        .add(StreamStructure::update_or_append("a", None))
        .commit();

    let session = store.create_new_session().unwrap();
    let _ = store
        .edit_session(HEAD_SESSION_ID)
        .add(StreamStructure::update_or_append("b", None))
        .commit();

    assert_eq!(store.get_stream_structures(&session).unwrap().len(), 1);
    assert_eq!(store.get_all_sessions().unwrap(), vec![session.clone()]);

    assert!(store.remove_session(&session).is_success());
    assert!(store.get_all_sessions().unwrap().is_empty());
}

#[test]
fn test_ephemeral_gc_is_noop() {
    let store = FeedStore::ephemeral();
    let _ = store.edit_content().add("a", feature("a", b"p")).commit();
    let _ = store.edit_local_actions().add(ActionType::Dismiss, "a").commit();

    let gc = store.trigger_content_gc(HashSet::new(), || HashSet::new(), false);
    gc();
    let actions = store.get_all_dismiss_local_actions().unwrap();
    let gc = store.trigger_local_action_gc(actions, Vec::new());
    gc();

    assert_eq!(store.get_payloads(&ids(&["a"])).unwrap().len(), 1);
    assert_eq!(store.get_all_dismiss_local_actions().unwrap().len(), 1);
}

#[test]
fn test_ephemeral_clear_all() {
    let store = FeedStore::ephemeral();
    let _ = store.edit_content().add("a", feature("a", b"p")).commit();
    let _ = store.create_new_session().unwrap();

    assert!(store.clear_all());

    assert!(store.get_payloads(&ids(&["a"])).unwrap().is_empty());
    assert!(store.get_all_sessions().unwrap().is_empty());
    assert!(store.session_exists(HEAD_SESSION_ID).unwrap());
}
