//! Content id interning
//!
//! Hash-consing pool for content id strings. Decoding thousands of
//! structure records that name the same ids yields one shared allocation
//! per distinct id instead of one per record.
//!
//! Interning is an optimization only: equal ids compare equal whether or
//! not they came through the pool.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::ContentId;

/// Pool of shared content id strings
#[derive(Debug, Default)]
pub struct Interner {
    pool: Mutex<HashSet<Arc<str>>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the pooled instance equal to `value`, adding it if absent
    pub fn intern(&self, value: &str) -> ContentId {
        let mut pool = self.pool.lock();
        if let Some(existing) = pool.get(value) {
            return ContentId::from_arc(Arc::clone(existing));
        }
        let shared: Arc<str> = Arc::from(value);
        pool.insert(Arc::clone(&shared));
        ContentId::from_arc(shared)
    }

    /// Intern an id that is already a `ContentId`
    pub fn intern_id(&self, id: &ContentId) -> ContentId {
        let mut pool = self.pool.lock();
        if let Some(existing) = pool.get(id.as_str()) {
            return ContentId::from_arc(Arc::clone(existing));
        }
        pool.insert(Arc::clone(id.as_arc()));
        id.clone()
    }

    /// Drop pooled strings that nothing outside the pool references.
    ///
    /// Returns the number of entries removed.
    pub fn purge(&self) -> usize {
        let mut pool = self.pool.lock();
        let before = pool.len();
        pool.retain(|s| Arc::strong_count(s) > 1);
        before - pool.len()
    }

    pub fn len(&self) -> usize {
        self.pool.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.lock().is_empty()
    }
}
