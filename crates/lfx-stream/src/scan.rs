use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use lfx_source::{LedgerSource, SourceError, SourceResult};
use lfx_types::{EntryType, MutationRecord};

use crate::compactor::ChangeCompactor;
use crate::config::ScanConfig;
use crate::error::{StreamError, StreamResult};
use crate::fanout::{ScanOutcome, TypedFanOut};
use crate::sink::EffectSink;

/// How a completed scan ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Every ledger in the window was read and every effect offered.
    Drained,
    /// The cancellation signal stopped the scan early.
    Cancelled,
}

/// Counters reported by a completed scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanSummary {
    pub ledgers_read: u64,
    pub effects_delivered: u64,
    pub windows_flushed: u64,
    pub termination: Termination,
}

/// Drive one scan over `[start_seq, end_seq]`.
///
/// A single task pulls ledgers in sequence order (compaction correctness
/// depends on that order), folds each ledger's mutations into the current
/// compaction window, and flushes the window's net effects through the
/// fan-out at each window boundary. Any fetch failure aborts the whole
/// scan; cancellation stops further fetches, flushes what was already
/// compacted, and closes every sink.
///
/// On return the fan-out has reached `Closed` whatever happened; the
/// result is an error only for failed termination.
pub async fn run_scan(
    source: Arc<dyn LedgerSource>,
    start_seq: u64,
    end_seq: u64,
    sinks: HashMap<EntryType, Arc<dyn EffectSink>>,
    cancel: CancellationToken,
    config: ScanConfig,
) -> StreamResult<ScanSummary> {
    if start_seq > end_seq {
        return Err(StreamError::InvalidWindow {
            start: start_seq,
            end: end_seq,
        });
    }

    let mut fan_out = TypedFanOut::new(sinks);
    let window_size = config.window_size.max(1);

    let mut compactor = ChangeCompactor::new();
    let mut ledgers_read = 0u64;
    let mut windows_flushed = 0u64;
    let mut window_start = start_seq;
    let mut cancelled = false;

    info!(start_seq, end_seq, window_size, "scan started");

    let mut seq = start_seq;
    while seq <= end_seq {
        if cancel.is_cancelled() {
            cancelled = true;
            info!(seq, "cancellation observed, no further ledgers will be fetched");
            break;
        }

        let mutations = match fetch_mutations(source.as_ref(), seq, &config).await {
            Ok(mutations) => mutations,
            Err(err) => {
                error!(seq, %err, "ledger fetch failed, aborting scan");
                fan_out.finish(ScanOutcome::Failed);
                return Err(err.into());
            }
        };

        for mutation in mutations {
            compactor.add(mutation);
        }
        ledgers_read += 1;

        let window_full = seq + 1 - window_start >= window_size;
        if window_full || seq == end_seq {
            flush_window(&mut fan_out, &mut compactor, window_start, seq).await?;
            windows_flushed += 1;
            window_start = seq + 1;
        }
        seq += 1;
    }

    // Effects compacted before the cancellation are still offered.
    if cancelled && !compactor.is_empty() {
        flush_window(&mut fan_out, &mut compactor, window_start, seq).await?;
        windows_flushed += 1;
    }

    let termination = if cancelled {
        Termination::Cancelled
    } else {
        Termination::Drained
    };
    fan_out.finish(match termination {
        Termination::Drained => ScanOutcome::Drained,
        Termination::Cancelled => ScanOutcome::Cancelled,
    });

    let summary = ScanSummary {
        ledgers_read,
        effects_delivered: fan_out.delivered(),
        windows_flushed,
        termination,
    };
    info!(
        ledgers_read = summary.ledgers_read,
        effects_delivered = summary.effects_delivered,
        windows_flushed = summary.windows_flushed,
        ?termination,
        "scan finished"
    );
    Ok(summary)
}

async fn fetch_mutations(
    source: &dyn LedgerSource,
    seq: u64,
    config: &ScanConfig,
) -> SourceResult<Vec<MutationRecord>> {
    match config.fetch_timeout {
        Some(limit) => match tokio::time::timeout(limit, source.mutations_of(seq)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Unavailable(format!(
                "fetch of ledger {seq} timed out after {limit:?}"
            ))),
        },
        None => source.mutations_of(seq).await,
    }
}

/// Drain the compactor and offer every effect to its sink. A failed offer
/// closes all sinks and surfaces as failed termination.
async fn flush_window(
    fan_out: &mut TypedFanOut,
    compactor: &mut ChangeCompactor,
    window_start: u64,
    window_end: u64,
) -> StreamResult<()> {
    let effects = std::mem::take(compactor).into_effects();
    debug!(
        window_start,
        window_end,
        effects = effects.len(),
        "flushing compaction window"
    );
    for effect in effects {
        if let Err(err) = fan_out.dispatch(effect).await {
            error!(%err, "delivery failed, aborting scan");
            fan_out.finish(ScanOutcome::Failed);
            return Err(err);
        }
    }
    Ok(())
}
