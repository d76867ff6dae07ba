use serde::{Deserialize, Serialize};

use crate::entry::{EntryType, LedgerEntry, LedgerKey};

/// The net outcome for one key over one compaction window.
///
/// Only the last mutation observed for the key determines the effect. A
/// deleted key is still emitted, with `deleted = true` and no final state,
/// so consumers learn the key no longer exists rather than hearing nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetEffect {
    pub key: LedgerKey,
    /// State after the last mutation; absent when the key was deleted.
    pub final_state: Option<LedgerEntry>,
    pub deleted: bool,
    /// Sequence of the last mutation folded into this effect.
    pub last_seq: u64,
}

impl NetEffect {
    /// The entry type this effect routes on.
    pub fn entry_type(&self) -> EntryType {
        self.key.entry_type()
    }
}
