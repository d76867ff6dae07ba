use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lfx_types::MutationRecord;

use crate::error::SourceResult;

/// Decoded view of an append-only ledger network.
///
/// All implementations must satisfy these invariants:
/// - Sequences are totally ordered and close times are monotonic
///   non-decreasing in sequence.
/// - `close_time_of` and `mutations_of` fail `NotFound` for sequences the
///   network has never closed, and `Unavailable` on transport failure.
/// - `mutations_of` returns records in the ledger's internal replay order;
///   compaction correctness depends on that order.
/// - Lookups are side-effect free and may be issued concurrently.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Sequence of the latest ledger known to the source.
    async fn latest_sequence(&self) -> SourceResult<u64>;

    /// Wall-clock instant at which the given ledger was finalized.
    async fn close_time_of(&self, seq: u64) -> SourceResult<DateTime<Utc>>;

    /// Entry mutations recorded while replaying the given ledger.
    async fn mutations_of(&self, seq: u64) -> SourceResult<Vec<MutationRecord>>;
}
