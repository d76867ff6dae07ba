use thiserror::Error;

/// Errors produced by ledger source lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The requested sequence does not exist in network history. A caller
    /// contract violation; never retried internally.
    #[error("ledger {seq} does not exist in network history")]
    NotFound { seq: u64 },

    /// Transport failure or timeout. Potentially transient; the retry
    /// decision belongs to the caller.
    #[error("ledger source unavailable: {0}")]
    Unavailable(String),
}

pub type SourceResult<T> = Result<T, SourceError>;
