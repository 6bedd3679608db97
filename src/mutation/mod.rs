//! Mutation Module
//!
//! Accumulate-then-commit builders for every writable namespace.
//!
//! A builder is obtained from [`FeedStore`](crate::FeedStore), filled with
//! fluent calls, and consumed by `commit()`. `finish()` instead yields the
//! plain change set, which the store's matching `commit_*` method accepts
//! directly. Builders are consumed either way, so a change set can only be
//! committed through a builder once.

mod content;
mod local_action;
mod semantic;
mod session;
mod uploadable;

pub use content::{ContentChanges, ContentMutation};
pub use local_action::{LocalActionChanges, LocalActionMutation};
pub use semantic::{SemanticPropertiesChanges, SemanticPropertiesMutation};
pub use session::{SessionChanges, SessionMutation};
pub use uploadable::{ActionSets, UploadableActionChanges, UploadableActionMutation};

use std::fmt::Display;

use tracing::error;

/// Outcome of a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum CommitResult {
    Success,
    Failure,
}

impl CommitResult {
    pub fn is_success(self) -> bool {
        self == CommitResult::Success
    }

    pub fn is_failure(self) -> bool {
        self == CommitResult::Failure
    }

    /// Collapse a storage result, logging the error on failure
    pub(crate) fn from_result<T, E: Display>(result: Result<T, E>, what: &str) -> Self {
        match result {
            Ok(_) => CommitResult::Success,
            Err(e) => {
                error!(commit = what, error = %e, "commit failed");
                CommitResult::Failure
            }
        }
    }
}
