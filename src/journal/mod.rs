//! Journal Module
//!
//! Named append-only record lists. Sessions and local actions are stored
//! as journals.
//!
//! ## Responsibilities
//! - Read a journal's records in append order
//! - Atomic commits of append / delete / copy operations
//! - Enumerate and wipe journals
//!
//! ## Backends
//! - [`InMemoryJournalStorage`] -- ordered map of record lists
//! - [`FileJournalStorage`] -- one framed file per journal

mod file;
mod memory;

use std::collections::BTreeMap;

use crate::error::Result;

pub use file::{FileJournalStorage, JournalRecovery, MAX_JOURNAL_NAME_LEN};
pub use memory::InMemoryJournalStorage;

/// Named append-only record storage.
///
/// A [`JournalMutation`] must be applied all-or-nothing, and a copy must
/// observe the source journal either entirely before or entirely after any
/// concurrent commit to it.
pub trait JournalStorage: Send + Sync {
    /// Records of `name` in append order; empty if the journal is missing
    fn read(&self, name: &str) -> Result<Vec<Vec<u8>>>;

    /// Whether the journal exists (an empty journal exists)
    fn exists(&self, name: &str) -> Result<bool>;

    /// Names of every journal
    fn get_all_journals(&self) -> Result<Vec<String>>;

    /// Apply a mutation atomically
    fn commit(&self, mutation: JournalMutation) -> Result<()>;

    /// Remove every journal
    fn delete_all(&self) -> Result<()>;
}

/// One change inside a journal commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalOperation {
    /// Append a record, creating the journal if needed
    Append(Vec<u8>),

    /// Remove the journal
    Delete,

    /// Copy the journal, as it stands at this point of the mutation, to `to`
    Copy { to: String },
}

/// Ordered operations against one journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalMutation {
    journal_name: String,
    operations: Vec<JournalOperation>,
}

impl JournalMutation {
    pub fn new(journal_name: impl Into<String>) -> Self {
        Self {
            journal_name: journal_name.into(),
            operations: Vec::new(),
        }
    }

    pub fn append(mut self, record: Vec<u8>) -> Self {
        self.push(JournalOperation::Append(record));
        self
    }

    pub fn delete(mut self) -> Self {
        self.push(JournalOperation::Delete);
        self
    }

    pub fn copy(mut self, to: impl Into<String>) -> Self {
        self.push(JournalOperation::Copy { to: to.into() });
        self
    }

    pub fn push(&mut self, operation: JournalOperation) {
        self.operations.push(operation);
    }

    pub fn journal_name(&self) -> &str {
        &self.journal_name
    }

    pub fn operations(&self) -> &[JournalOperation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// True if every operation is an append
    pub fn is_append_only(&self) -> bool {
        self.operations
            .iter()
            .all(|op| matches!(op, JournalOperation::Append(_)))
    }
}

/// Apply a mutation to an in-memory view of the journals
pub(crate) fn apply_mutation(
    journals: &mut BTreeMap<String, Vec<Vec<u8>>>,
    mutation: &JournalMutation,
) {
    let name = mutation.journal_name();
    for operation in mutation.operations() {
        match operation {
            JournalOperation::Append(record) => {
                journals
                    .entry(name.to_string())
                    .or_default()
                    .push(record.clone());
            }
            JournalOperation::Delete => {
                journals.remove(name);
            }
            JournalOperation::Copy { to } => {
                let records = journals.get(name).cloned().unwrap_or_default();
                journals.insert(to.clone(), records);
            }
        }
    }
}
