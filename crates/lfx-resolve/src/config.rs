use chrono::Duration;

/// Sequence of the earliest ledger with a meaningful close time on the
/// public network. The genesis ledger closes at the Unix epoch and is
/// never part of a resolution.
pub const FIRST_TRACKED_SEQ: u64 = 2;

/// Tuning for instant-to-sequence resolution.
#[derive(Clone, Copy, Debug)]
pub struct ResolverConfig {
    /// Average wall-clock interval between ledger closes. Seeds the
    /// extrapolation step; correctness never depends on it.
    pub avg_close_interval: Duration,
    /// Earliest sequence whose close time is meaningful. Fixture networks
    /// override this to wherever their history starts.
    pub first_tracked_seq: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            avg_close_interval: Duration::seconds(5),
            first_tracked_seq: FIRST_TRACKED_SEQ,
        }
    }
}
