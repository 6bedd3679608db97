//! Content garbage collector
//!
//! Single pass, no persistent state:
//! 1. Yield to pending queue work (bounded number of times)
//! 2. population = every content-storage key
//! 3. Drop accessible ids, reserved ids, and the semantic properties of
//!    accessible ids and of dismissed ids
//! 4. Drop every uploadable action key
//! 5. Drop shared states: all of them, or only those of accessible ids
//! 6. Delete what remains in one commit

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::codec;
use crate::error::Result;
use crate::keys::{
    semantic_properties_key, shared_state_key, DISMISS_ACTION_JOURNAL, SHARED_STATE_PREFIX,
    UPLOADABLE_ACTION_PREFIX,
};
use crate::model::ContentId;
use crate::storage::{ContentOperation, ContentStorageMutation};

use super::GcContext;

/// Produces the ids still reachable from live sessions, evaluated when the
/// pass actually runs
pub type AccessibleSupplier = Box<dyn Fn() -> HashSet<ContentId> + Send + Sync>;

/// Outcome of one collection pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GcStats {
    /// Keys present in content storage when the pass started
    pub population: usize,

    /// Keys deleted
    pub deleted: usize,
}

pub struct ContentGc {
    ctx: GcContext,
    reserved: HashSet<ContentId>,
    accessible: AccessibleSupplier,
    keep_shared_states: bool,
    attempts: AtomicU32,
}

impl ContentGc {
    pub fn new(
        ctx: GcContext,
        reserved: HashSet<ContentId>,
        accessible: AccessibleSupplier,
        keep_shared_states: bool,
    ) -> Self {
        Self {
            ctx,
            reserved,
            accessible,
            keep_shared_states,
            attempts: AtomicU32::new(0),
        }
    }

    /// Times this collector has deferred itself
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Collect now, or re-enqueue behind pending work while attempts remain
    pub fn run(self: Arc<Self>) {
        if self.ctx.task_queue.has_backlog() && self.attempts() < self.ctx.max_attempts {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(attempt, max = self.ctx.max_attempts, "deferring content GC");
            let queue = Arc::clone(&self.ctx.task_queue);
            queue.execute("content_gc", Box::new(move || self.run()));
            return;
        }

        match self.collect() {
            Ok(stats) => info!(
                population = stats.population,
                deleted = stats.deleted,
                "content GC finished"
            ),
            Err(e) => error!(error = %e, "content GC failed"),
        }
    }

    /// Run one collection pass immediately
    pub fn collect(&self) -> Result<GcStats> {
        let mut population: HashSet<String> =
            self.ctx.content.get_all_keys()?.into_iter().collect();
        let mut stats = GcStats {
            population: population.len(),
            deleted: 0,
        };

        let accessible = (self.accessible)();
        for id in &accessible {
            population.remove(id.as_str());
            population.remove(&semantic_properties_key(id));
        }
        for id in &self.reserved {
            population.remove(id.as_str());
        }

        // A dismissed item's semantic properties live as long as the action
        for id in self.dismissed_content_ids()? {
            population.remove(&semantic_properties_key(&id));
        }

        population.retain(|key| !key.starts_with(UPLOADABLE_ACTION_PREFIX));

        if self.keep_shared_states {
            population.retain(|key| !key.starts_with(SHARED_STATE_PREFIX));
        } else {
            for id in &accessible {
                population.remove(&shared_state_key(id));
            }
        }

        if population.is_empty() {
            return Ok(stats);
        }

        let mut mutation = ContentStorageMutation::new();
        for key in population {
            mutation.push(ContentOperation::Delete { key });
        }
        stats.deleted = mutation.len();
        self.ctx.content.commit(mutation)?;

        Ok(stats)
    }

    fn dismissed_content_ids(&self) -> Result<Vec<ContentId>> {
        let records = self.ctx.journal.read(DISMISS_ACTION_JOURNAL)?;
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            match codec::decode_local_action(&record, &self.ctx.interner) {
                Ok(action) => ids.push(action.content_id),
                Err(e) => warn!(error = %e, "skipping undecodable dismiss action"),
            }
        }
        Ok(ids)
    }
}
