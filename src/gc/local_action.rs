//! Local action garbage collector

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::codec;
use crate::error::Result;
use crate::journal::{JournalMutation, JournalStorage};
use crate::model::{ContentId, LocalAction};

/// Rewrites one action journal with only the actions on valid content.
///
/// Journals cannot drop records by index, so the journal is deleted and the
/// survivors re-appended in their original order, all in one commit.
pub struct LocalActionGc {
    journal: Arc<dyn JournalStorage>,
    journal_name: String,
    actions: Vec<LocalAction>,
    valid_content_ids: HashSet<ContentId>,
}

impl LocalActionGc {
    pub fn new(
        journal: Arc<dyn JournalStorage>,
        journal_name: impl Into<String>,
        actions: Vec<LocalAction>,
        valid_content_ids: HashSet<ContentId>,
    ) -> Self {
        Self {
            journal,
            journal_name: journal_name.into(),
            actions,
            valid_content_ids,
        }
    }

    /// Rewrite the journal. Returns the number of actions kept.
    pub fn run(&self) -> Result<usize> {
        let mut mutation = JournalMutation::new(self.journal_name.as_str()).delete();
        let mut kept = 0;
        for action in &self.actions {
            if self.valid_content_ids.contains(&action.content_id) {
                mutation = mutation.append(codec::encode(action)?);
                kept += 1;
            }
        }
        self.journal.commit(mutation)?;

        info!(
            journal = %self.journal_name,
            kept,
            dropped = self.actions.len() - kept,
            "local action GC finished"
        );
        Ok(kept)
    }
}
