use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use lfx_types::{EntryType, NetEffect};

use crate::error::{StreamError, StreamResult};
use crate::sink::EffectSink;

/// Lifecycle of one scan's delivery side.
///
/// `Idle -> Streaming -> {Drained | Cancelled | Failed} -> Closed`.
/// `Streaming` is entered once the first sink accepts a delivery; `Closed`
/// is terminal, and every sink is guaranteed closed by the time it is
/// reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Streaming,
    Drained,
    Cancelled,
    Failed,
    Closed,
}

/// How a scan's delivery side terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Drained,
    Cancelled,
    Failed,
}

/// Routes net effects to the sink configured for their entry type.
///
/// Types with no configured sink are dropped: callers opt into only the
/// entry types they need. The fan-out owns exactly one `close` per sink,
/// issued on `finish` regardless of the outcome; `finish` is itself
/// idempotent.
pub struct TypedFanOut {
    sinks: HashMap<EntryType, Arc<dyn EffectSink>>,
    state: ScanState,
    delivered: u64,
    dropped: u64,
}

impl TypedFanOut {
    pub fn new(sinks: HashMap<EntryType, Arc<dyn EffectSink>>) -> Self {
        Self {
            sinks,
            state: ScanState::Idle,
            delivered: 0,
            dropped: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Effects accepted by a sink so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Effects dropped because no sink was configured for their type.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Offer one effect to its type's sink, blocking on that sink's queue
    /// until the consumer takes delivery.
    pub async fn dispatch(&mut self, effect: NetEffect) -> StreamResult<()> {
        let entry_type = effect.entry_type();
        match self.sinks.get(&entry_type) {
            Some(sink) => {
                sink.send(effect)
                    .await
                    .map_err(|_| StreamError::SinkClosed { entry_type })?;
                self.delivered += 1;
                if self.state == ScanState::Idle {
                    self.state = ScanState::Streaming;
                }
            }
            None => {
                self.dropped += 1;
                debug!(%entry_type, "no sink configured, effect dropped");
            }
        }
        Ok(())
    }

    /// Record the terminal outcome and close every sink. Idempotent; only
    /// the first call transitions and closes.
    pub fn finish(&mut self, outcome: ScanOutcome) {
        if self.state == ScanState::Closed {
            return;
        }
        self.state = match outcome {
            ScanOutcome::Drained => ScanState::Drained,
            ScanOutcome::Cancelled => ScanState::Cancelled,
            ScanOutcome::Failed => ScanState::Failed,
        };
        for sink in self.sinks.values() {
            sink.close();
        }
        self.state = ScanState::Closed;
    }
}
