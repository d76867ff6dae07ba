use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use lfx_types::MutationRecord;

use crate::error::{SourceError, SourceResult};
use crate::traits::LedgerSource;

#[derive(Clone, Debug)]
struct FixtureLedger {
    close_time: DateTime<Utc>,
    mutations: Vec<MutationRecord>,
}

/// In-memory, BTreeMap-backed ledger source.
///
/// Intended for tests and embedding. Ledgers are held behind a `RwLock`;
/// lookups are counted so callers can assert how many round trips a cache
/// or search actually issued, and individual sequences can be marked
/// unavailable to simulate transport failure.
pub struct InMemoryLedgerSource {
    ledgers: RwLock<BTreeMap<u64, FixtureLedger>>,
    unavailable: RwLock<HashSet<u64>>,
    close_time_lookups: AtomicU64,
    mutation_lookups: AtomicU64,
}

impl InMemoryLedgerSource {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self {
            ledgers: RwLock::new(BTreeMap::new()),
            unavailable: RwLock::new(HashSet::new()),
            close_time_lookups: AtomicU64::new(0),
            mutation_lookups: AtomicU64::new(0),
        }
    }

    /// Create a source whose ledgers `first_seq..first_seq + count` close at
    /// regular intervals starting from `first_close`. No mutations attached.
    pub fn with_regular_intervals(
        first_seq: u64,
        count: u64,
        first_close: DateTime<Utc>,
        interval: Duration,
    ) -> Self {
        let source = Self::new();
        for i in 0..count {
            source.insert_ledger(first_seq + i, first_close + interval * i as i32, Vec::new());
        }
        source
    }

    /// Insert or replace a ledger at the given sequence.
    pub fn insert_ledger(
        &self,
        seq: u64,
        close_time: DateTime<Utc>,
        mutations: Vec<MutationRecord>,
    ) {
        self.ledgers.write().expect("lock poisoned").insert(
            seq,
            FixtureLedger {
                close_time,
                mutations,
            },
        );
    }

    /// Attach mutations to an already-inserted ledger.
    pub fn set_mutations(&self, seq: u64, mutations: Vec<MutationRecord>) {
        if let Some(ledger) = self.ledgers.write().expect("lock poisoned").get_mut(&seq) {
            ledger.mutations = mutations;
        }
    }

    /// Make every lookup of `seq` fail `Unavailable` until cleared.
    pub fn set_unavailable(&self, seq: u64) {
        self.unavailable.write().expect("lock poisoned").insert(seq);
    }

    /// Clear a previous `set_unavailable`.
    pub fn clear_unavailable(&self, seq: u64) {
        self.unavailable.write().expect("lock poisoned").remove(&seq);
    }

    /// Number of `close_time_of` calls issued so far.
    pub fn close_time_lookups(&self) -> u64 {
        self.close_time_lookups.load(Ordering::Relaxed)
    }

    /// Number of `mutations_of` calls issued so far.
    pub fn mutation_lookups(&self) -> u64 {
        self.mutation_lookups.load(Ordering::Relaxed)
    }

    /// Number of ledgers currently stored.
    pub fn len(&self) -> usize {
        self.ledgers.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the source holds no ledgers.
    pub fn is_empty(&self) -> bool {
        self.ledgers.read().expect("lock poisoned").is_empty()
    }

    fn check_available(&self, seq: u64) -> SourceResult<()> {
        if self.unavailable.read().expect("lock poisoned").contains(&seq) {
            return Err(SourceError::Unavailable(format!(
                "simulated transport failure for ledger {seq}"
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryLedgerSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerSource for InMemoryLedgerSource {
    async fn latest_sequence(&self) -> SourceResult<u64> {
        self.ledgers
            .read()
            .expect("lock poisoned")
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| SourceError::Unavailable("source holds no ledgers".into()))
    }

    async fn close_time_of(&self, seq: u64) -> SourceResult<DateTime<Utc>> {
        self.close_time_lookups.fetch_add(1, Ordering::Relaxed);
        self.check_available(seq)?;
        self.ledgers
            .read()
            .expect("lock poisoned")
            .get(&seq)
            .map(|ledger| ledger.close_time)
            .ok_or(SourceError::NotFound { seq })
    }

    async fn mutations_of(&self, seq: u64) -> SourceResult<Vec<MutationRecord>> {
        self.mutation_lookups.fetch_add(1, Ordering::Relaxed);
        self.check_available(seq)?;
        self.ledgers
            .read()
            .expect("lock poisoned")
            .get(&seq)
            .map(|ledger| ledger.mutations.clone())
            .ok_or(SourceError::NotFound { seq })
    }
}

impl std::fmt::Debug for InMemoryLedgerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedgerSource")
            .field("ledger_count", &self.len())
            .finish()
    }
}
