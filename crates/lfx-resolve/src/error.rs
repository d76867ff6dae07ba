use chrono::{DateTime, Utc};
use thiserror::Error;

use lfx_source::SourceError;
use lfx_types::BoundsError;

/// Errors produced while resolving instants to sequences.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("start time {start} must be less than or equal to the end time {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("network bounds error: {0}")]
    Bounds(#[from] BoundsError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
