//! Foundation types for ledgerflux.
//!
//! This crate provides the data model shared by every other ledgerflux
//! crate: the close-time curve of the network, the identity of logical
//! ledger entries, and the raw/compacted change records that flow through
//! the export pipeline.
//!
//! # Key Types
//!
//! - [`ClosePoint`] — one observed (sequence, close time) pair
//! - [`NetworkBounds`] — the usable edges of the network's history
//! - [`EntryType`] / [`LedgerKey`] / [`LedgerEntry`] — entry identity and state
//! - [`MutationRecord`] — one observed change to one key in one ledger
//! - [`NetEffect`] — the compacted net outcome for one key over a window

pub mod effect;
pub mod entry;
pub mod error;
pub mod mutation;
pub mod point;

pub use effect::NetEffect;
pub use entry::{EntryType, LedgerEntry, LedgerKey};
pub use error::BoundsError;
pub use mutation::{MutationKind, MutationRecord};
pub use point::{ClosePoint, NetworkBounds};
