//! Local action GC

use feedstore::ActionType;

use super::{ids, open_store};

#[test]
fn test_local_action_gc_keeps_valid_in_order() {
    let t = open_store();
    let _ = t
        .store
        .edit_local_actions()
        .add(ActionType::Dismiss, "X")
        .add(ActionType::Dismiss, "Y")
        .add(ActionType::Dismiss, "Z")
        .commit();

    let actions = t.store.get_all_dismiss_local_actions().unwrap();
    let gc = t.store.trigger_local_action_gc(actions, ids(&["X", "Z"]));
    gc();

    let kept: Vec<String> = t
        .store
        .get_all_dismiss_local_actions()
        .unwrap()
        .iter()
        .map(|a| a.content_id.to_string())
        .collect();
    assert_eq!(kept, vec!["X", "Z"]);
}

#[test]
fn test_local_action_gc_preserves_timestamps() {
    let t = open_store();
    let _ = t.store.edit_local_actions().add(ActionType::Dismiss, "X").commit();
    let before = t.store.get_all_dismiss_local_actions().unwrap();

    let gc = t.store.trigger_local_action_gc(before.clone(), ids(&["X"]));
    gc();

    assert_eq!(t.store.get_all_dismiss_local_actions().unwrap(), before);
}

#[test]
fn test_local_action_gc_with_no_valid_ids() {
    let t = open_store();
    let _ = t
        .store
        .edit_local_actions()
        .add(ActionType::Dismiss, "X")
        .add(ActionType::Dismiss, "Y")
        .commit();

    let actions = t.store.get_all_dismiss_local_actions().unwrap();
    let gc = t.store.trigger_local_action_gc(actions, Vec::new());
    gc();

    assert!(t.store.get_all_dismiss_local_actions().unwrap().is_empty());
}
