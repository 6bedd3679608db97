//! Garbage Collection Module
//!
//! ## Responsibilities
//! - Content GC: delete content-storage keys no live session or caller
//!   reservation can reach
//! - Local-action GC: rewrite an action journal keeping only actions on
//!   content that is still valid
//!
//! Both collectors are handed to the host as deferred [`Task`](crate::task::Task)s.

mod content;
mod local_action;

use std::sync::Arc;

use crate::intern::Interner;
use crate::journal::JournalStorage;
use crate::storage::ContentStorage;
use crate::task::TaskQueue;

pub use content::{AccessibleSupplier, ContentGc, GcStats};
pub use local_action::LocalActionGc;

/// Storage handles and scheduling shared by the collectors
#[derive(Clone)]
pub struct GcContext {
    pub content: Arc<dyn ContentStorage>,
    pub journal: Arc<dyn JournalStorage>,
    pub interner: Arc<Interner>,
    pub task_queue: Arc<dyn TaskQueue>,
    pub max_attempts: u32,
}
