//! Content id interning

use feedstore::intern::Interner;
use feedstore::ContentId;

#[test]
fn test_equal_strings_share_allocation() {
    let interner = Interner::new();
    let a = interner.intern("content");
    let b = interner.intern(&String::from("content"));

    assert_eq!(a, b);
    assert!(a.ptr_eq(&b));
    assert_eq!(interner.len(), 1);
}

#[test]
fn test_intern_id_reuses_pool() {
    let interner = Interner::new();
    let pooled = interner.intern("x");

    let outside = ContentId::new("x");
    assert!(!outside.ptr_eq(&pooled));
    assert!(interner.intern_id(&outside).ptr_eq(&pooled));
}

#[test]
fn test_purge_drops_unused_entries() {
    let interner = Interner::new();
    let kept = interner.intern("kept");
    drop(interner.intern("dropped"));

    assert_eq!(interner.purge(), 1);
    assert_eq!(interner.len(), 1);
    assert!(interner.intern("kept").ptr_eq(&kept));
}

#[test]
fn test_interning_does_not_affect_equality() {
    let interner = Interner::new();
    assert_eq!(interner.intern("same"), ContentId::new("same"));
}
