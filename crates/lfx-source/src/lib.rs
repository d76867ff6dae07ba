//! Ledger source boundary for ledgerflux.
//!
//! Everything upstream of this workspace — archive protocol, replay engine
//! lifecycle, wire decoding — sits behind the [`LedgerSource`] trait. This
//! crate provides:
//! - The [`LedgerSource`] async trait and its error taxonomy
//! - [`InMemoryLedgerSource`] for tests and embedding
//! - [`ClosePointCache`], the memoizing (sequence → close time) cache with
//!   single-flight population

pub mod cache;
pub mod error;
pub mod memory;
pub mod traits;

pub use cache::ClosePointCache;
pub use error::{SourceError, SourceResult};
pub use memory::InMemoryLedgerSource;
pub use traits::LedgerSource;
