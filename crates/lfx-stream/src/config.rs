use std::time::Duration;

/// Tuning for the scan driver.
#[derive(Clone, Copy, Debug)]
pub struct ScanConfig {
    /// Ledgers folded into one compaction window before effects are
    /// flushed to the sinks. A window at least as large as the scanned
    /// range compacts the whole range into a single flush.
    pub window_size: u64,
    /// Bound on one ledger fetch. A timeout surfaces as an unavailable
    /// source and aborts the scan; retrying is the caller's decision.
    pub fetch_timeout: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_size: 64,
            fetch_timeout: None,
        }
    }
}
