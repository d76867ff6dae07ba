use thiserror::Error;

use lfx_source::SourceError;
use lfx_types::EntryType;

/// Errors produced by the scan driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("invalid scan window: start {start} must be at most end {end}")]
    InvalidWindow { start: u64, end: u64 },

    /// A ledger fetch failed. The scan aborts rather than skipping the
    /// ledger: a silently incomplete change set is worse than a visible
    /// failure.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("consumer for {entry_type} entries went away mid-scan")]
    SinkClosed { entry_type: EntryType },
}

pub type StreamResult<T> = Result<T, StreamError>;
