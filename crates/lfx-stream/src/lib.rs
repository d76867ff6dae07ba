//! Change compaction and typed fan-out for ledgerflux.
//!
//! One driver task pulls ledgers sequentially, folds their entry mutations
//! into per-key net effects, and hands the effects to per-entry-type
//! consumers over bounded queues:
//! - [`ChangeCompactor`] — last-mutation-wins reduction per key
//! - [`EffectSink`] / [`ChannelSink`] — bounded handoff to one consumer
//! - [`TypedFanOut`] — per-type routing and sink lifecycle
//! - [`run_scan`] — the scan driver with window flushes, per-fetch
//!   timeouts, and cancellation

pub mod compactor;
pub mod config;
pub mod error;
pub mod fanout;
pub mod scan;
pub mod sink;

pub use compactor::ChangeCompactor;
pub use config::ScanConfig;
pub use error::{StreamError, StreamResult};
pub use fanout::{ScanOutcome, ScanState, TypedFanOut};
pub use scan::{run_scan, ScanSummary, Termination};
pub use sink::{ChannelSink, EffectSink, SinkClosed};
