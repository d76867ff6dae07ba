use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use lfx_types::NetEffect;

/// The consumer behind a sink is gone; nothing further can be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("consumer dropped its end of the sink")]
pub struct SinkClosed;

/// Delivery target for net effects of one entry type.
///
/// `send` blocks until the consumer takes delivery; the bounded handoff
/// behind it is the backpressure mechanism, so a slow consumer slows the
/// driver instead of growing a buffer. `close` is idempotent and ends the
/// consumer's stream; the fan-out issues exactly one close per sink, no
/// matter how the scan terminates.
#[async_trait]
pub trait EffectSink: Send + Sync {
    async fn send(&self, effect: NetEffect) -> Result<(), SinkClosed>;
    fn close(&self);
}

/// Bounded-queue sink handing effects to one consumer task.
///
/// The receiver half is owned by the consumer; once `close` runs (or the
/// sink is dropped) the receiver drains whatever is buffered and then
/// observes end of stream.
pub struct ChannelSink {
    tx: Mutex<Option<mpsc::Sender<NetEffect>>>,
}

impl ChannelSink {
    /// Create a sink with the given queue capacity, returning the consumer
    /// half alongside it.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<NetEffect>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    fn sender(&self) -> Option<mpsc::Sender<NetEffect>> {
        self.tx.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl EffectSink for ChannelSink {
    async fn send(&self, effect: NetEffect) -> Result<(), SinkClosed> {
        match self.sender() {
            Some(tx) => tx.send(effect).await.map_err(|_| SinkClosed),
            None => Err(SinkClosed),
        }
    }

    fn close(&self) {
        self.tx.lock().expect("lock poisoned").take();
    }
}
