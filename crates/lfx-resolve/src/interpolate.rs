use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use lfx_source::ClosePointCache;
use lfx_types::NetworkBounds;

use crate::config::ResolverConfig;
use crate::error::ResolveResult;

/// Searches the close-time curve for the first ledger closed at or after a
/// target instant.
///
/// The fast path extrapolates linearly from the average close interval and
/// verifies each candidate against its predecessor. When close-time jitter
/// makes the estimate oscillate, the search falls back to a binary search
/// over the tightest bracket observed so far; the fallback is the
/// correctness backstop and terminates in logarithmically many probes.
pub struct InterpolationResolver<'a> {
    cache: &'a ClosePointCache,
    avg_close_interval: Duration,
}

impl<'a> InterpolationResolver<'a> {
    pub fn new(cache: &'a ClosePointCache, config: &ResolverConfig) -> Self {
        Self {
            cache,
            avg_close_interval: config.avg_close_interval,
        }
    }

    /// Find the smallest sequence whose close time is at or after `target`.
    ///
    /// `target` must already be clamped into the bounds by the caller.
    /// Returns the unique `s` with `close_time(s-1) < target <= close_time(s)`,
    /// where a target at or before the begin point's close time resolves to
    /// the begin sequence itself.
    pub async fn find_sequence_for_instant(
        &self,
        target: DateTime<Utc>,
        bounds: &NetworkBounds,
    ) -> ResolveResult<u64> {
        let begin = bounds.begin();
        let end = bounds.end();

        if target <= begin.close_time {
            return Ok(begin.seq);
        }

        // Bracket maintained across probes: close_time(lo) < target and
        // close_time(hi) >= target. Every probe tightens it, so the
        // fallback always searches the smallest interval known so far.
        let mut lo = begin.seq;
        let mut hi = end.seq;

        let mut visited: HashSet<u64> = HashSet::new();
        let mut candidate = begin.seq + 1;

        loop {
            visited.insert(candidate);

            let point = self.cache.get(candidate).await?;
            let prev = self.cache.get(candidate - 1).await?;

            if prev.close_time < target && target <= point.close_time {
                return Ok(candidate);
            }

            if point.close_time >= target {
                hi = hi.min(candidate);
            } else {
                lo = lo.max(candidate);
            }
            if prev.close_time >= target {
                hi = hi.min(candidate - 1);
            } else {
                lo = lo.max(candidate - 1);
            }

            let delta = target - point.close_time;
            let avg_secs = self.avg_close_interval.num_seconds().max(1);
            let mut offset = delta.num_seconds() / avg_secs;
            if offset == 0 {
                // The estimate must always move; step one ledger toward
                // the target.
                offset = if delta > Duration::zero() { 1 } else { -1 };
            }

            let next = candidate
                .saturating_add_signed(offset)
                .clamp(begin.seq + 1, end.seq);

            if visited.contains(&next) {
                debug!(
                    candidate,
                    next, lo, hi, "extrapolation cycled, switching to bisection"
                );
                return self.bisect(target, lo, hi).await;
            }
            candidate = next;
        }
    }

    /// Binary search under the invariant
    /// `close_time(lo) < target <= close_time(hi)`.
    async fn bisect(&self, target: DateTime<Utc>, mut lo: u64, mut hi: u64) -> ResolveResult<u64> {
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            let point = self.cache.get(mid).await?;
            if point.close_time >= target {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Ok(hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use lfx_source::{InMemoryLedgerSource, LedgerSource};
    use lfx_types::ClosePoint;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn cache_for(source: Arc<InMemoryLedgerSource>) -> ClosePointCache {
        ClosePointCache::new(source as Arc<dyn LedgerSource>)
    }

    async fn bounds_of(cache: &ClosePointCache, begin: u64, end: u64) -> NetworkBounds {
        let begin = cache.get(begin).await.unwrap();
        let end = cache.get(end).await.unwrap();
        NetworkBounds::new(begin, end).unwrap()
    }

    fn resolver(cache: &ClosePointCache) -> InterpolationResolver<'_> {
        InterpolationResolver::new(cache, &ResolverConfig::default())
    }

    #[tokio::test]
    async fn exact_close_time_resolves_to_that_sequence() {
        let source = Arc::new(InMemoryLedgerSource::with_regular_intervals(
            2,
            20,
            at(1000),
            Duration::seconds(5),
        ));
        let cache = cache_for(source);
        let bounds = bounds_of(&cache, 2, 21).await;

        // Ledger 6 closes at 1020.
        let seq = resolver(&cache)
            .find_sequence_for_instant(at(1020), &bounds)
            .await
            .unwrap();
        assert_eq!(seq, 6);
    }

    #[tokio::test]
    async fn instant_between_closes_resolves_to_next_sequence() {
        let source = Arc::new(InMemoryLedgerSource::with_regular_intervals(
            2,
            20,
            at(1000),
            Duration::seconds(5),
        ));
        let cache = cache_for(source);
        let bounds = bounds_of(&cache, 2, 21).await;

        // 1022 falls between ledger 6 (1020) and ledger 7 (1025).
        let seq = resolver(&cache)
            .find_sequence_for_instant(at(1022), &bounds)
            .await
            .unwrap();
        assert_eq!(seq, 7);
    }

    #[tokio::test]
    async fn target_at_begin_close_resolves_to_begin() {
        let source = Arc::new(InMemoryLedgerSource::with_regular_intervals(
            2,
            20,
            at(1000),
            Duration::seconds(5),
        ));
        let cache = cache_for(source);
        let bounds = bounds_of(&cache, 2, 21).await;

        let seq = resolver(&cache)
            .find_sequence_for_instant(at(1000), &bounds)
            .await
            .unwrap();
        assert_eq!(seq, 2);
    }

    #[tokio::test]
    async fn target_at_end_close_resolves_within_bounds() {
        let source = Arc::new(InMemoryLedgerSource::with_regular_intervals(
            2,
            20,
            at(1000),
            Duration::seconds(5),
        ));
        let cache = cache_for(source);
        let bounds = bounds_of(&cache, 2, 21).await;

        // Ledger 21 closes at 1095.
        let seq = resolver(&cache)
            .find_sequence_for_instant(at(1095), &bounds)
            .await
            .unwrap();
        assert_eq!(seq, 21);
    }

    #[tokio::test]
    async fn plateau_resolves_to_first_sequence_at_target() {
        // Ledgers 3, 4, and 5 all close at the same instant.
        let source = Arc::new(InMemoryLedgerSource::new());
        source.insert_ledger(2, at(1000), Vec::new());
        source.insert_ledger(3, at(1010), Vec::new());
        source.insert_ledger(4, at(1010), Vec::new());
        source.insert_ledger(5, at(1010), Vec::new());
        source.insert_ledger(6, at(1020), Vec::new());
        let cache = cache_for(source);
        let bounds = bounds_of(&cache, 2, 6).await;

        let seq = resolver(&cache)
            .find_sequence_for_instant(at(1010), &bounds)
            .await
            .unwrap();
        assert_eq!(seq, 3);
    }

    #[tokio::test]
    async fn oscillating_estimate_falls_back_to_bisection() {
        // Close times jump far from the 5s average, so the linear estimate
        // leaps over the answer from both sides and revisits a candidate.
        let source = Arc::new(InMemoryLedgerSource::new());
        source.insert_ledger(2, at(0), Vec::new());
        source.insert_ledger(3, at(10), Vec::new());
        source.insert_ledger(4, at(1000), Vec::new());
        source.insert_ledger(5, at(1010), Vec::new());
        source.insert_ledger(6, at(2000), Vec::new());
        let cache = cache_for(source);
        let bounds = bounds_of(&cache, 2, 6).await;

        let seq = resolver(&cache)
            .find_sequence_for_instant(at(1005), &bounds)
            .await
            .unwrap();
        assert_eq!(seq, 5);
    }

    #[tokio::test]
    async fn source_failure_aborts_resolution() {
        let source = Arc::new(InMemoryLedgerSource::with_regular_intervals(
            2,
            20,
            at(1000),
            Duration::seconds(5),
        ));
        let cache = cache_for(Arc::clone(&source));
        let bounds = bounds_of(&cache, 2, 21).await;

        source.set_unavailable(10);
        let result = resolver(&cache)
            .find_sequence_for_instant(at(1041), &bounds)
            .await;
        assert!(matches!(
            result,
            Err(crate::error::ResolveError::Source(_))
        ));
    }

    /// Reference answer: linear scan for the unique sequence with
    /// `close_time(s-1) < target <= close_time(s)`.
    fn expected_sequence(points: &[ClosePoint], target: DateTime<Utc>) -> u64 {
        let begin = points[0];
        if target <= begin.close_time {
            return begin.seq;
        }
        for pair in points.windows(2) {
            if pair[0].close_time < target && target <= pair[1].close_time {
                return pair[1].seq;
            }
        }
        points[points.len() - 1].seq
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn resolution_matches_linear_scan(
            gaps in prop::collection::vec(0i64..40, 4..60),
            target_offset in 0i64..2400,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async move {
                let source = Arc::new(InMemoryLedgerSource::new());
                let mut close = at(1000);
                let mut points = Vec::new();
                for (i, gap) in gaps.iter().enumerate() {
                    let seq = 2 + i as u64;
                    source.insert_ledger(seq, close, Vec::new());
                    points.push(ClosePoint::new(seq, close));
                    close += Duration::seconds(*gap);
                }

                let cache = ClosePointCache::new(
                    Arc::clone(&source) as Arc<dyn LedgerSource>
                );
                let begin = points[0];
                let end = points[points.len() - 1];
                let bounds = NetworkBounds::new(begin, end).unwrap();

                let target = bounds.clamp(at(1000) + Duration::seconds(target_offset));
                let resolved = resolver(&cache)
                    .find_sequence_for_instant(target, &bounds)
                    .await
                    .unwrap();

                assert_eq!(resolved, expected_sequence(&points, target));
            });
        }
    }
}
