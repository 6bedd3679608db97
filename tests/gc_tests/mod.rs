//! Tests for garbage collection
//!
//! These tests verify:
//! - Content GC keeps accessible, reserved and protected keys
//! - Shared state retention with and without keep_shared_states
//! - Deferral behind a busy task queue
//! - Local action GC keeps valid actions in order

mod local_action_gc_tests;

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use feedstore::journal::InMemoryJournalStorage;
use feedstore::storage::InMemoryContentStorage;
use feedstore::task::{Task, TaskQueue};
use feedstore::{Config, ContentId, FeedStore, Payload, StreamSharedState};

// =============================================================================
// Helper Functions
// =============================================================================

pub struct TestStore {
    pub store: FeedStore,
    pub content: Arc<InMemoryContentStorage>,
}

pub fn open_store_with_queue(queue: Arc<dyn TaskQueue>, max_gc_attempts: u32) -> TestStore {
    let content = Arc::new(InMemoryContentStorage::new());
    let store = FeedStore::builder(Config::builder().max_gc_attempts(max_gc_attempts).build())
        .storage(content.clone(), Arc::new(InMemoryJournalStorage::new()))
        .task_queue(queue)
        .build()
        .unwrap();
    TestStore { store, content }
}

pub fn open_store() -> TestStore {
    open_store_with_queue(Arc::new(feedstore::ImmediateQueue), 10)
}

pub fn feature(id: &str) -> Payload {
    Payload::Feature {
        content_id: id.into(),
        parent_id: None,
        data: id.as_bytes().to_vec(),
    }
}

pub fn shared_state(id: &str) -> Payload {
    Payload::SharedState(StreamSharedState {
        content_id: id.into(),
        data: id.as_bytes().to_vec(),
    })
}

pub fn id_set(values: &[&str]) -> HashSet<ContentId> {
    values.iter().map(|v| ContentId::new(v)).collect()
}

pub fn ids(values: &[&str]) -> Vec<ContentId> {
    values.iter().map(|v| ContentId::new(v)).collect()
}

/// Queue that always reports a backlog and holds tasks until drained
#[derive(Default)]
pub struct BusyQueue {
    tasks: Mutex<Vec<Task>>,
}

impl BusyQueue {
    /// Run queued tasks until none are left; returns how many ran
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        loop {
            let batch: Vec<Task> = std::mem::take(&mut *self.tasks.lock());
            if batch.is_empty() {
                return ran;
            }
            for task in batch {
                task();
                ran += 1;
            }
        }
    }
}

impl TaskQueue for BusyQueue {
    fn execute(&self, _name: &'static str, task: Task) {
        self.tasks.lock().push(task);
    }

    fn has_backlog(&self) -> bool {
        true
    }
}
