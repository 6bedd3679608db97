//! Tests for mutation builders
//!
//! These tests verify:
//! - `finish()` yields the accumulated change set
//! - Change sets commit through the store's `commit_*` methods
//! - Uploadable upsert/remove cancellation

mod uploadable_tests;

use feedstore::{FeedStore, Payload};

// =============================================================================
// Helper Functions
// =============================================================================

pub fn store() -> FeedStore {
    FeedStore::ephemeral()
}

pub fn feature(id: &str) -> Payload {
    Payload::Feature {
        content_id: id.into(),
        parent_id: None,
        data: vec![1, 2, 3],
    }
}
