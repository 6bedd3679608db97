//! Session forking, removal and HEAD handling

use feedstore::keys::{HEAD_SESSION_ID, SESSION_NAME_PREFIX};
use feedstore::StreamStructure;

use super::open_memory_store;

fn append_to(t: &super::TestStore, session: &str, id: &str) {
    assert!(t
        .store
        .edit_session(session)
        .add(StreamStructure::update_or_append(id, None))
        .commit()
        .is_success());
}

// =============================================================================
// Fork Tests
// =============================================================================

#[test]
fn test_fork_copies_head() {
    let t = open_memory_store();
    append_to(&t, HEAD_SESSION_ID, "a");
    append_to(&t, HEAD_SESSION_ID, "b");

    let session = t.store.create_new_session().unwrap();

    assert!(session.starts_with(SESSION_NAME_PREFIX));
    assert_eq!(
        t.store.get_stream_structures(&session).unwrap(),
        t.store.get_stream_structures(HEAD_SESSION_ID).unwrap()
    );
}

#[test]
fn test_fork_is_isolated_from_head() {
    let t = open_memory_store();
    append_to(&t, HEAD_SESSION_ID, "a");
    let session = t.store.create_new_session().unwrap();

    append_to(&t, HEAD_SESSION_ID, "b");
    append_to(&t, &session, "c");

    let head: Vec<String> = t
        .store
        .get_stream_structures(HEAD_SESSION_ID)
        .unwrap()
        .iter()
        .map(|s| s.content_id.to_string())
        .collect();
    let fork: Vec<String> = t
        .store
        .get_stream_structures(&session)
        .unwrap()
        .iter()
        .map(|s| s.content_id.to_string())
        .collect();

    assert_eq!(head, vec!["a", "b"]);
    assert_eq!(fork, vec!["a", "c"]);
}

#[test]
fn test_new_session_ids_are_unique() {
    let t = open_memory_store();
    let first = t.store.create_new_session().unwrap();
    let second = t.store.create_new_session().unwrap();

    assert_ne!(first, second);
    let mut sessions = t.store.get_all_sessions().unwrap();
    sessions.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(sessions, expected);
}

// =============================================================================
// Removal Tests
// =============================================================================

#[test]
fn test_remove_session() {
    let t = open_memory_store();
    let session = t.store.create_new_session().unwrap();

    assert!(t.store.remove_session(&session).is_success());

    assert!(!t.store.get_all_sessions().unwrap().contains(&session));
    assert!(t.store.get_stream_structures(&session).unwrap().is_empty());
}

#[test]
#[should_panic(expected = "HEAD cannot be removed")]
fn test_remove_head_panics() {
    let t = open_memory_store();
    let _ = t.store.remove_session(HEAD_SESSION_ID);
}

// =============================================================================
// HEAD Tests
// =============================================================================

#[test]
fn test_clear_head_is_idempotent() {
    let t = open_memory_store();
    append_to(&t, HEAD_SESSION_ID, "a");

    for _ in 0..2 {
        assert!(t.store.clear_head().is_success());
        assert!(t.store.get_stream_structures(HEAD_SESSION_ID).unwrap().is_empty());
        assert!(t.store.session_exists(HEAD_SESSION_ID).unwrap());
    }
}

#[test]
fn test_empty_session_commit_creates_session() {
    let t = open_memory_store();

    assert!(t.store.edit_session("_session:manual").commit().is_success());

    assert!(t.store.session_exists("_session:manual").unwrap());
    assert!(t.store.get_stream_structures("_session:manual").unwrap().is_empty());
    assert_eq!(t.store.get_all_sessions().unwrap(), vec!["_session:manual".to_string()]);
}

#[test]
fn test_missing_session_reads_empty() {
    let t = open_memory_store();

    assert!(t.store.get_stream_structures("nope").unwrap().is_empty());
    assert!(!t.store.session_exists("nope").unwrap());
}

#[test]
fn test_structures_keep_commit_order() {
    let t = open_memory_store();
    let _ = t
        .store
        .edit_session(HEAD_SESSION_ID)
        .add(StreamStructure::update_or_append("a", None))
        .add(StreamStructure::update_or_append("b", Some("a".into())))
        .add(StreamStructure::remove("a", None))
        .commit();

    let structures = t.store.get_stream_structures(HEAD_SESSION_ID).unwrap();

    assert_eq!(structures.len(), 3);
    assert_eq!(structures[1].parent_content_id.as_deref(), Some("a"));
    assert_eq!(structures[2], StreamStructure::remove("a", None));
}
