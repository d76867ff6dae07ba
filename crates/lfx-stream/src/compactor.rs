use std::collections::HashMap;

use lfx_types::{LedgerKey, MutationKind, MutationRecord, NetEffect};

/// Folds an ordered run of mutations into one net effect per key.
///
/// Only the most recent mutation for a key survives; superseded state is
/// dropped immediately, so memory stays bounded by the number of distinct
/// keys touched. A removal replaces the effect with a deletion marker
/// rather than erasing the key: consumers must learn the key no longer
/// exists, even when it was also created inside the same window.
#[derive(Default)]
pub struct ChangeCompactor {
    effects: HashMap<LedgerKey, NetEffect>,
}

impl ChangeCompactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one mutation. Mutations must arrive in replay order; the
    /// caller's sequential ledger walk is what guarantees that.
    pub fn add(&mut self, mutation: MutationRecord) {
        let MutationRecord {
            key,
            kind,
            entry,
            seq,
        } = mutation;

        let effect = match kind {
            MutationKind::Created | MutationKind::Updated => NetEffect {
                key: key.clone(),
                final_state: entry,
                deleted: false,
                last_seq: seq,
            },
            MutationKind::Removed => NetEffect {
                key: key.clone(),
                final_state: None,
                deleted: true,
                last_seq: seq,
            },
        };
        self.effects.insert(key, effect);
    }

    /// Number of distinct keys touched so far.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Drain the accumulated net effects. Order across keys is arbitrary.
    pub fn into_effects(self) -> Vec<NetEffect> {
        self.effects.into_values().collect()
    }
}
