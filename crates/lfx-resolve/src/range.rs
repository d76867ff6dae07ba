use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use lfx_source::ClosePointCache;
use lfx_types::NetworkBounds;

use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::interpolate::InterpolationResolver;

/// Resolves a wall-clock time window into the tightest ledger-sequence
/// window that contains it.
///
/// Bounds are rebuilt per call (the network keeps closing ledgers), both
/// instants are clamped into them, and each edge is resolved independently.
/// Monotonicity of close times guarantees `start_seq <= end_seq` whenever
/// `start_time <= end_time`; nothing further is enforced.
pub struct RangeResolver {
    cache: Arc<ClosePointCache>,
    config: ResolverConfig,
}

impl RangeResolver {
    pub fn new(cache: Arc<ClosePointCache>, config: ResolverConfig) -> Self {
        Self { cache, config }
    }

    /// Current usable edges of the network's history: the first tracked
    /// sequence and the latest the source knows about.
    pub async fn network_bounds(&self) -> ResolveResult<NetworkBounds> {
        let begin = self.cache.get(self.config.first_tracked_seq).await?;
        let latest = self.cache.latest_sequence().await?;
        let end = self.cache.get(latest).await?;
        let bounds = NetworkBounds::new(begin, end)?;
        debug!(begin = %bounds.begin(), end = %bounds.end(), "network bounds built");
        Ok(bounds)
    }

    /// Resolve `(start_time, end_time)` to `(start_seq, end_seq)`.
    pub async fn resolve_range(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> ResolveResult<(u64, u64)> {
        if start_time > end_time {
            return Err(ResolveError::InvalidRange {
                start: start_time,
                end: end_time,
            });
        }

        let bounds = self.network_bounds().await?;
        let start_time = bounds.clamp(start_time);
        let end_time = bounds.clamp(end_time);

        let resolver = InterpolationResolver::new(&self.cache, &self.config);
        let start_seq = resolver.find_sequence_for_instant(start_time, &bounds).await?;
        let end_seq = resolver.find_sequence_for_instant(end_time, &bounds).await?;

        info!(
            %start_time,
            %end_time,
            start_seq,
            end_seq,
            "time range resolved"
        );
        Ok((start_seq, end_seq))
    }
}
