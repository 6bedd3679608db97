//! Tests for the FeedStore facade
//!
//! These tests verify:
//! - Reads and commits for every namespace
//! - Session forking, removal and HEAD handling
//! - Ephemeral mode and listener notification
//! - The main-thread guard

mod ephemeral_tests;
mod session_tests;

use std::sync::Arc;

use feedstore::clock::ManualClock;
use feedstore::journal::InMemoryJournalStorage;
use feedstore::storage::InMemoryContentStorage;
use feedstore::{Config, FeedStore, Payload, StreamSharedState};

// =============================================================================
// Helper Functions
// =============================================================================

/// Persistent store over in-memory backends, with handles to the backends
pub struct TestStore {
    pub store: FeedStore,
    pub content: Arc<InMemoryContentStorage>,
    pub journal: Arc<InMemoryJournalStorage>,
    pub clock: Arc<ManualClock>,
}

pub fn open_memory_store() -> TestStore {
    let content = Arc::new(InMemoryContentStorage::new());
    let journal = Arc::new(InMemoryJournalStorage::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let store = FeedStore::builder(Config::default())
        .storage(content.clone(), journal.clone())
        .clock(clock.clone())
        .build()
        .unwrap();
    TestStore {
        store,
        content,
        journal,
        clock,
    }
}

pub fn feature(id: &str, data: &[u8]) -> Payload {
    Payload::Feature {
        content_id: id.into(),
        parent_id: None,
        data: data.to_vec(),
    }
}

pub fn token(id: &str, data: &[u8]) -> Payload {
    Payload::Token {
        content_id: id.into(),
        parent_id: None,
        data: data.to_vec(),
    }
}

pub fn shared_state(id: &str, data: &[u8]) -> Payload {
    Payload::SharedState(StreamSharedState {
        content_id: id.into(),
        data: data.to_vec(),
    })
}

pub fn ids(values: &[&str]) -> Vec<feedstore::ContentId> {
    values.iter().map(|v| feedstore::ContentId::new(v)).collect()
}
