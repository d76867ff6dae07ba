use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category of a ledger entry, used to route compacted changes to the
/// consumer that handles that category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntryType {
    Account,
    Offer,
    Trustline,
    Data,
}

impl EntryType {
    /// Every entry type, in routing order.
    pub const ALL: [EntryType; 4] = [
        EntryType::Account,
        EntryType::Offer,
        EntryType::Trustline,
        EntryType::Data,
    ];
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryType::Account => "account",
            EntryType::Offer => "offer",
            EntryType::Trustline => "trustline",
            EntryType::Data => "data",
        };
        f.write_str(name)
    }
}

/// Opaque identity of a logical ledger entry.
///
/// Equality defines "same logical entity": two mutations with equal keys
/// touch the same entry and compact against each other. The identifier
/// bytes are never interpreted.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    entry_type: EntryType,
    id: Vec<u8>,
}

impl LedgerKey {
    pub fn new(entry_type: EntryType, id: impl Into<Vec<u8>>) -> Self {
        Self {
            entry_type,
            id: id.into(),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn id(&self) -> &[u8] {
        &self.id
    }
}

impl fmt::Debug for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedgerKey({}:{})", self.entry_type, hex::encode(&self.id))
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entry_type, hex::encode(&self.id))
    }
}

/// Full state of a ledger entry at a point in time.
///
/// The state payload is carried opaquely; shaping it into per-entity flat
/// records is the downstream consumer's concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Identity of the entry this state belongs to.
    pub key: LedgerKey,
    /// Sequence of the ledger that last modified this entry.
    pub last_modified_seq: u64,
    /// Decoded entry state.
    pub state: Value,
}

impl LedgerEntry {
    pub fn new(key: LedgerKey, last_modified_seq: u64, state: Value) -> Self {
        Self {
            key,
            last_modified_seq,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_with_same_bytes_are_equal() {
        let a = LedgerKey::new(EntryType::Account, b"GA7".to_vec());
        let b = LedgerKey::new(EntryType::Account, b"GA7".to_vec());
        assert_eq!(a, b);
    }

    #[test]
    fn keys_differ_by_entry_type() {
        let a = LedgerKey::new(EntryType::Account, b"same".to_vec());
        let b = LedgerKey::new(EntryType::Offer, b"same".to_vec());
        assert_ne!(a, b);
    }

    #[test]
    fn key_display_includes_type_and_hex() {
        let key = LedgerKey::new(EntryType::Offer, vec![0xab, 0xcd]);
        assert_eq!(format!("{key}"), "offer:abcd");
    }
}
