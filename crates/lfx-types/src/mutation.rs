use serde::{Deserialize, Serialize};

use crate::entry::{LedgerEntry, LedgerKey};

/// How a mutation changed its entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    Created,
    Updated,
    Removed,
}

/// One observed change to one logical key in one ledger.
///
/// Records are produced in ledger replay order and consumed immediately by
/// the compactor. `entry` carries the post-mutation state for `Created`
/// and `Updated`, and is absent for `Removed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub key: LedgerKey,
    pub kind: MutationKind,
    pub entry: Option<LedgerEntry>,
    /// Sequence of the ledger in which the mutation was observed.
    pub seq: u64,
}

impl MutationRecord {
    /// A key came into existence with the given state.
    pub fn created(entry: LedgerEntry, seq: u64) -> Self {
        Self {
            key: entry.key.clone(),
            kind: MutationKind::Created,
            entry: Some(entry),
            seq,
        }
    }

    /// An existing key took on new state.
    pub fn updated(entry: LedgerEntry, seq: u64) -> Self {
        Self {
            key: entry.key.clone(),
            kind: MutationKind::Updated,
            entry: Some(entry),
            seq,
        }
    }

    /// A key ceased to exist.
    pub fn removed(key: LedgerKey, seq: u64) -> Self {
        Self {
            key,
            kind: MutationKind::Removed,
            entry: None,
            seq,
        }
    }
}
