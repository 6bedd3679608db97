//! Configuration for FeedStore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::thread::ThreadId;

/// Default number of times a content GC may yield to a busy task queue
pub const DEFAULT_MAX_GC_ATTEMPTS: u32 = 10;

/// Main configuration for a FeedStore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the file-backed storages.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── content.log      (content storage commit log)
    ///     └── journals/        (one file per journal)
    pub data_dir: PathBuf,

    /// How often the file backends fsync a commit
    pub sync_strategy: SyncStrategy,

    /// Rewrite the content log as a single snapshot when it is opened
    pub compact_on_open: bool,

    // -------------------------------------------------------------------------
    // Garbage Collection
    // -------------------------------------------------------------------------
    /// Number of times content GC re-enqueues itself behind pending work
    pub max_gc_attempts: u32,

    // -------------------------------------------------------------------------
    // Threading
    // -------------------------------------------------------------------------
    /// Thread that must never run blocking persistent operations
    pub main_thread: Option<ThreadId>,
}

/// Commit sync strategy for the file backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every commit (safest, slowest)
    EveryCommit,

    /// flush to the OS and let it decide when to write back
    OsDefault,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./feedstore_data"),
            sync_strategy: SyncStrategy::EveryCommit,
            compact_on_open: true,
            max_gc_attempts: DEFAULT_MAX_GC_ATTEMPTS,
            main_thread: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the content storage commit log
    pub fn content_log_path(&self) -> PathBuf {
        self.data_dir.join("content.log")
    }

    /// Directory holding one file per journal
    pub fn journal_dir(&self) -> PathBuf {
        self.data_dir.join("journals")
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the commit sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Enable or disable content log compaction on open
    pub fn compact_on_open(mut self, enabled: bool) -> Self {
        self.config.compact_on_open = enabled;
        self
    }

    /// Set how many times content GC may defer to pending work
    pub fn max_gc_attempts(mut self, attempts: u32) -> Self {
        self.config.max_gc_attempts = attempts;
        self
    }

    /// Set the thread on which persistent operations must not run
    pub fn main_thread(mut self, id: ThreadId) -> Self {
        self.config.main_thread = Some(id);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
