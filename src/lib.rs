//! # FeedStore
//!
//! Local persistence for a news feed:
//! - Content payloads, shared states and semantic properties
//! - Copy-on-write sessions forked from a canonical HEAD
//! - Local (dismiss) and uploadable actions
//! - Reachability-based garbage collection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        FeedStore                            │
//! │        reads · mutation builders · GC triggers              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ StoreMode
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Persistent  │          │  Ephemeral  │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!    ┌─────┴──────────────┐
//!    ▼                    ▼
//! ┌──────────────┐  ┌──────────────┐      ┌──────────────┐
//! │ContentStorage│  │JournalStorage│ ◄─── │  ContentGc / │
//! │  key/value   │  │ append-only  │      │LocalActionGc │
//! └──────────────┘  └──────────────┘      └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod keys;
pub mod model;
pub mod intern;
pub mod codec;
pub mod frame;

pub mod storage;
pub mod journal;
pub mod mutation;
pub mod store;
pub mod gc;

pub mod task;
pub mod clock;
pub mod thread;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FeedStoreError, Result};
pub use config::{Config, SyncStrategy};
pub use model::{
    ActionType, ContentId, LocalAction, Payload, PayloadWithId, SemanticPropertiesWithId,
    StreamSharedState, StreamStructure, StructureOperation, UploadableAction,
};
pub use mutation::CommitResult;
pub use store::{FeedStore, FeedStoreBuilder, StoreListener};
pub use task::{ImmediateQueue, Task, TaskQueue, WorkerQueue};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FeedStore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
