//! High-level export surface for ledgerflux.
//!
//! Export jobs consume exactly two operations: resolve a wall-clock window
//! to a sequence window, and stream the compacted changes of a sequence
//! window to per-entry-type consumers. [`LedgerExporter`] wires the shared
//! close-point cache, the range resolver, and the scan driver behind those
//! two calls, plus the convenience that chains them.

pub mod error;
pub mod exporter;

pub use error::{ExportError, ExportResult};
pub use exporter::{ExportConfig, LedgerExporter};
