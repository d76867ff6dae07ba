use thiserror::Error;

use lfx_resolve::ResolveError;
use lfx_stream::StreamError;

/// Errors surfaced to export jobs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("stream error: {0}")]
    Stream(#[from] StreamError),
}

pub type ExportResult<T> = Result<T, ExportError>;
