//! Store Module
//!
//! The `FeedStore` facade over the two store modes.
//!
//! ## Responsibilities
//! - Read accessors for every namespace
//! - Builder factories and commit entry points
//! - GC triggers handed back to the caller as deferred tasks
//! - Switching to ephemeral mode and notifying listeners
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │        FeedStore         │
//!                 │   RwLock<StoreMode>      │
//!                 └────────────┬─────────────┘
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//!        ┌───────────────┐           ┌───────────────┐
//!        │  Persistent   │           │   Ephemeral   │
//!        │ content store │           │  in-memory    │
//!        │ journal store │           │  GC disabled  │
//!        └───────────────┘           └───────────────┘
//! ```

mod backend;
mod ephemeral;
mod persistent;

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{FeedStoreError, Result};
use crate::intern::Interner;
use crate::journal::{FileJournalStorage, JournalStorage};
use crate::keys::{HEAD_SESSION_ID, SESSION_NAME_PREFIX};
use crate::model::{
    ContentId, LocalAction, PayloadWithId, SemanticPropertiesWithId, StreamSharedState,
    StreamStructure, UploadableAction,
};
use crate::mutation::{
    CommitResult, ContentChanges, ContentMutation, LocalActionChanges, LocalActionMutation,
    SemanticPropertiesChanges, SemanticPropertiesMutation, SessionChanges, SessionMutation,
    UploadableActionChanges, UploadableActionMutation,
};
use crate::storage::{ContentStorage, FileContentStorage};
use crate::task::{ImmediateQueue, Task, TaskQueue};
use crate::thread::ThreadChecker;

use backend::StoreBackend;
use ephemeral::EphemeralStore;
use persistent::PersistentStore;

/// Observer of store-wide events
pub trait StoreListener: Send + Sync {
    /// Called once when the store drops to ephemeral mode
    fn on_switch_to_ephemeral_mode(&self);
}

pub(crate) enum StoreMode {
    Persistent(PersistentStore),
    Ephemeral(EphemeralStore),
}

impl StoreMode {
    fn backend(&self) -> &dyn StoreBackend {
        match self {
            StoreMode::Persistent(store) => store,
            StoreMode::Ephemeral(store) => store,
        }
    }
}

/// Local feed content store
pub struct FeedStore {
    mode: RwLock<StoreMode>,
    listeners: Mutex<Vec<Arc<dyn StoreListener>>>,
    clock: Arc<dyn Clock>,
    config: Config,
}

impl FeedStore {
    /// Open a persistent store with file-backed storage under `config.data_dir`
    ///
    /// Blocks on I/O; never call this on the main thread.
    pub fn open(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> FeedStoreBuilder {
        FeedStoreBuilder::new(config)
    }

    /// Store that keeps everything in memory from the start
    pub fn ephemeral() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::with_mode(
            StoreMode::Ephemeral(EphemeralStore::new(Arc::clone(&clock))),
            clock,
            Config::default(),
        )
    }

    fn with_mode(mode: StoreMode, clock: Arc<dyn Clock>, config: Config) -> Self {
        Self {
            mode: RwLock::new(mode),
            listeners: Mutex::new(Vec::new()),
            clock,
            config,
        }
    }

    fn with_backend<R>(&self, f: impl FnOnce(&dyn StoreBackend) -> R) -> R {
        let mode = self.mode.read();
        f(mode.backend())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Payloads for the ids that exist, in request order. Shared states are
    /// never returned here.
    pub fn get_payloads(&self, ids: &[ContentId]) -> Result<Vec<PayloadWithId>> {
        self.with_backend(|b| b.get_payloads(ids))
    }

    /// Every stored shared state. A single undecodable record fails the read.
    pub fn get_shared_states(&self) -> Result<Vec<StreamSharedState>> {
        self.with_backend(|b| b.get_shared_states())
    }

    /// Structures of a session in commit order; empty if it does not exist
    pub fn get_stream_structures(&self, session_id: &str) -> Result<Vec<StreamStructure>> {
        self.with_backend(|b| b.get_stream_structures(session_id))
    }

    /// Every session except HEAD
    pub fn get_all_sessions(&self) -> Result<Vec<String>> {
        self.with_backend(|b| b.get_all_sessions())
    }

    pub fn session_exists(&self, session_id: &str) -> Result<bool> {
        self.with_backend(|b| b.session_exists(session_id))
    }

    pub fn get_semantic_properties(
        &self,
        ids: &[ContentId],
    ) -> Result<Vec<SemanticPropertiesWithId>> {
        self.with_backend(|b| b.get_semantic_properties(ids))
    }

    pub fn get_all_dismiss_local_actions(&self) -> Result<Vec<LocalAction>> {
        self.with_backend(|b| b.get_all_dismiss_local_actions())
    }

    pub fn get_all_uploadable_actions(&self) -> Result<HashSet<UploadableAction>> {
        self.with_backend(|b| b.get_all_uploadable_actions())
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Fork HEAD into a new session and return its id
    pub fn create_new_session(&self) -> Result<String> {
        let session_id = format!("{}{}", SESSION_NAME_PREFIX, Uuid::new_v4().simple());
        self.with_backend(|b| b.create_new_session(session_id))
    }

    /// Remove a forked session.
    ///
    /// # Panics
    /// If `session_id` is HEAD. Use [`clear_head`](Self::clear_head) instead.
    pub fn remove_session(&self, session_id: &str) -> CommitResult {
        assert!(
            session_id != HEAD_SESSION_ID,
            "HEAD cannot be removed; use clear_head"
        );
        self.with_backend(|b| b.remove_session(session_id))
    }

    /// Reset HEAD to an empty session
    pub fn clear_head(&self) -> CommitResult {
        self.with_backend(|b| b.clear_head())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn edit_content(&self) -> ContentMutation<'_> {
        ContentMutation::new(self)
    }

    pub fn edit_session(&self, session_id: impl Into<String>) -> SessionMutation<'_> {
        SessionMutation::new(self, session_id)
    }

    pub fn edit_semantic_properties(&self) -> SemanticPropertiesMutation<'_> {
        SemanticPropertiesMutation::new(self)
    }

    pub fn edit_local_actions(&self) -> LocalActionMutation<'_> {
        LocalActionMutation::new(self)
    }

    pub fn edit_uploadable_actions(&self) -> UploadableActionMutation<'_> {
        UploadableActionMutation::new(self)
    }

    pub fn commit_content(&self, changes: ContentChanges) -> CommitResult {
        self.with_backend(|b| b.commit_content(changes))
    }

    pub fn commit_session(&self, changes: SessionChanges) -> CommitResult {
        self.with_backend(|b| b.commit_session(changes))
    }

    pub fn commit_semantic_properties(&self, changes: SemanticPropertiesChanges) -> CommitResult {
        self.with_backend(|b| b.commit_semantic_properties(changes))
    }

    pub fn commit_local_actions(&self, changes: LocalActionChanges) -> CommitResult {
        self.with_backend(|b| b.commit_local_actions(changes))
    }

    pub fn commit_uploadable_actions(&self, changes: UploadableActionChanges) -> CommitResult {
        self.with_backend(|b| b.commit_uploadable_actions(changes))
    }

    // =========================================================================
    // Garbage Collection
    // =========================================================================

    /// Build a content GC task.
    ///
    /// `accessible` runs when the task does, not now, so it sees the
    /// sessions as they are at collection time. In ephemeral mode the task
    /// does nothing.
    pub fn trigger_content_gc<F>(
        &self,
        reserved: HashSet<ContentId>,
        accessible: F,
        keep_shared_states: bool,
    ) -> Task
    where
        F: Fn() -> HashSet<ContentId> + Send + Sync + 'static,
    {
        self.with_backend(|b| b.content_gc(reserved, Box::new(accessible), keep_shared_states))
    }

    /// Build a task that prunes the dismiss journal down to actions on
    /// `valid_content_ids`. In ephemeral mode the task does nothing.
    pub fn trigger_local_action_gc(
        &self,
        actions: Vec<LocalAction>,
        valid_content_ids: Vec<ContentId>,
    ) -> Task {
        let valid = valid_content_ids.into_iter().collect();
        self.with_backend(|b| b.local_action_gc(actions, valid))
    }

    // =========================================================================
    // Mode
    // =========================================================================

    /// Drop to volatile in-memory storage.
    ///
    /// The ephemeral store starts empty apart from HEAD. Listeners are
    /// notified on the first switch only.
    pub fn switch_to_ephemeral_mode(&self) {
        {
            let mut mode = self.mode.write();
            if matches!(*mode, StoreMode::Ephemeral(_)) {
                return;
            }
            *mode = StoreMode::Ephemeral(EphemeralStore::new(Arc::clone(&self.clock)));
        }
        info!("feed store switched to ephemeral mode");

        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.on_switch_to_ephemeral_mode();
        }
    }

    pub fn is_ephemeral_mode(&self) -> bool {
        matches!(*self.mode.read(), StoreMode::Ephemeral(_))
    }

    pub fn register_listener(&self, listener: Arc<dyn StoreListener>) {
        self.listeners.lock().push(listener);
    }

    /// Wipe every namespace and recreate an empty HEAD
    pub fn clear_all(&self) -> bool {
        self.with_backend(|b| b.clear_all())
    }
}

impl std::fmt::Debug for FeedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedStore")
            .field("ephemeral", &self.is_ephemeral_mode())
            .field("data_dir", &self.config.data_dir)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Wires a [`FeedStore`] from its parts.
///
/// Anything not supplied gets a default: file-backed storages under the
/// configured data directory, an [`ImmediateQueue`], and the system clock.
pub struct FeedStoreBuilder {
    config: Config,
    content: Option<Arc<dyn ContentStorage>>,
    journal: Option<Arc<dyn JournalStorage>>,
    task_queue: Option<Arc<dyn TaskQueue>>,
    clock: Option<Arc<dyn Clock>>,
    interner: Option<Arc<Interner>>,
    ephemeral: bool,
}

impl FeedStoreBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            content: None,
            journal: None,
            task_queue: None,
            clock: None,
            interner: None,
            ephemeral: false,
        }
    }

    /// Use these storages instead of the file-backed defaults
    pub fn storage(
        mut self,
        content: Arc<dyn ContentStorage>,
        journal: Arc<dyn JournalStorage>,
    ) -> Self {
        self.content = Some(content);
        self.journal = Some(journal);
        self
    }

    pub fn task_queue(mut self, queue: Arc<dyn TaskQueue>) -> Self {
        self.task_queue = Some(queue);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share an interner with other stores
    pub fn interner(mut self, interner: Arc<Interner>) -> Self {
        self.interner = Some(interner);
        self
    }

    /// Start in ephemeral mode; no storage is opened
    pub fn ephemeral(mut self, enabled: bool) -> Self {
        self.ephemeral = enabled;
        self
    }

    pub fn build(self) -> Result<FeedStore> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        if self.ephemeral {
            let mode = StoreMode::Ephemeral(EphemeralStore::new(Arc::clone(&clock)));
            return Ok(FeedStore::with_mode(mode, clock, self.config));
        }

        let uses_files = self.content.is_none() || self.journal.is_none();
        if uses_files && self.config.data_dir.as_os_str().is_empty() {
            return Err(FeedStoreError::Config(
                "data_dir must be set for file-backed storage".to_string(),
            ));
        }

        let content: Arc<dyn ContentStorage> = match self.content {
            Some(content) => content,
            None => Arc::new(FileContentStorage::open(
                &self.config.content_log_path(),
                self.config.sync_strategy,
                self.config.compact_on_open,
            )?),
        };
        let journal: Arc<dyn JournalStorage> = match self.journal {
            Some(journal) => journal,
            None => Arc::new(FileJournalStorage::open(
                &self.config.journal_dir(),
                self.config.sync_strategy,
            )?),
        };

        let store = PersistentStore::new(
            content,
            journal,
            self.interner.unwrap_or_default(),
            Arc::clone(&clock),
            self.task_queue.unwrap_or_else(|| Arc::new(ImmediateQueue)),
            ThreadChecker::new(self.config.main_thread),
            self.config.max_gc_attempts,
        );
        store.ensure_head()?;

        info!(data_dir = %self.config.data_dir.display(), "feed store opened");
        Ok(FeedStore::with_mode(
            StoreMode::Persistent(store),
            clock,
            self.config,
        ))
    }
}
