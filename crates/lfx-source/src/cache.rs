use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::debug;

use lfx_types::ClosePoint;

use crate::error::{SourceError, SourceResult};
use crate::traits::LedgerSource;

/// Memoizing (sequence → close time) cache over a [`LedgerSource`].
///
/// Population is single-flight: concurrent lookups of the same sequence
/// issue exactly one source call, with the losers awaiting the winner's
/// result. A failed population leaves the slot empty, so a later lookup
/// retries instead of caching the error.
///
/// The cache is read-heavy and safe to share across concurrent
/// resolutions. Settled slots beyond `capacity` are evicted least recently
/// used first, which keeps long-lived processes bounded; one resolution
/// never comes close to the default capacity.
pub struct ClosePointCache {
    source: Arc<dyn LedgerSource>,
    capacity: usize,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<u64, Arc<OnceCell<ClosePoint>>>,
    stamps: HashMap<u64, u64>,
    tick: u64,
}

impl ClosePointCache {
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Create a cache with the default capacity.
    pub fn new(source: Arc<dyn LedgerSource>) -> Self {
        Self::with_capacity(source, Self::DEFAULT_CAPACITY)
    }

    /// Create a cache holding at most `capacity` settled points.
    pub fn with_capacity(source: Arc<dyn LedgerSource>, capacity: usize) -> Self {
        Self {
            source,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Look up the close point for `seq`, fetching it from the source on
    /// first access.
    pub async fn get(&self, seq: u64) -> SourceResult<ClosePoint> {
        let cell = {
            let mut state = self.state.lock().expect("lock poisoned");
            state.tick += 1;
            let tick = state.tick;
            state.stamps.insert(seq, tick);
            Arc::clone(state.slots.entry(seq).or_default())
        };

        let point = cell
            .get_or_try_init(|| async {
                let close_time = self.source.close_time_of(seq).await?;
                debug!(seq, %close_time, "close point fetched");
                Ok::<_, SourceError>(ClosePoint::new(seq, close_time))
            })
            .await?;
        let point = *point;

        self.evict_over_capacity(seq);
        Ok(point)
    }

    /// Sequence of the latest ledger known to the source. Never cached:
    /// the network keeps closing ledgers underneath us.
    pub async fn latest_sequence(&self) -> SourceResult<u64> {
        self.source.latest_sequence().await
    }

    /// Number of slots currently held, settled or in flight.
    pub fn len(&self) -> usize {
        self.state.lock().expect("lock poisoned").slots.len()
    }

    /// Returns `true` if nothing has been looked up yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_over_capacity(&self, keep: u64) {
        let mut state = self.state.lock().expect("lock poisoned");
        while state.slots.len() > self.capacity {
            let victim = state
                .slots
                .keys()
                .filter(|&&seq| seq != keep)
                .min_by_key(|&&seq| state.stamps.get(&seq).copied().unwrap_or(0))
                .copied();
            match victim {
                Some(seq) => {
                    state.slots.remove(&seq);
                    state.stamps.remove(&seq);
                    debug!(seq, "close point evicted");
                }
                None => break,
            }
        }
    }
}

impl std::fmt::Debug for ClosePointCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosePointCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedgerSource;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn fixture(count: u64) -> Arc<InMemoryLedgerSource> {
        Arc::new(InMemoryLedgerSource::with_regular_intervals(
            2,
            count,
            at(1000),
            Duration::seconds(5),
        ))
    }

    #[tokio::test]
    async fn second_lookup_hits_the_cache() {
        let source = fixture(10);
        let cache = ClosePointCache::new(Arc::clone(&source) as Arc<dyn LedgerSource>);

        let first = cache.get(4).await.unwrap();
        let second = cache.get(4).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.close_time_lookups(), 1);
    }

    #[tokio::test]
    async fn concurrent_lookups_issue_one_source_call() {
        let source = fixture(10);
        let cache = Arc::new(ClosePointCache::new(
            Arc::clone(&source) as Arc<dyn LedgerSource>
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move { cache.get(6).await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(source.close_time_lookups(), 1);
    }

    #[tokio::test]
    async fn failed_population_is_retried() {
        let source = fixture(10);
        let cache = ClosePointCache::new(Arc::clone(&source) as Arc<dyn LedgerSource>);

        source.set_unavailable(4);
        assert!(matches!(
            cache.get(4).await,
            Err(SourceError::Unavailable(_))
        ));

        source.clear_unavailable(4);
        let point = cache.get(4).await.unwrap();
        assert_eq!(point.seq, 4);
        assert_eq!(source.close_time_lookups(), 2);
    }

    #[tokio::test]
    async fn not_found_is_propagated() {
        let source = fixture(10);
        let cache = ClosePointCache::new(source as Arc<dyn LedgerSource>);
        assert_eq!(
            cache.get(999).await,
            Err(SourceError::NotFound { seq: 999 })
        );
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let source = fixture(10);
        let cache = ClosePointCache::with_capacity(Arc::clone(&source) as Arc<dyn LedgerSource>, 2);

        cache.get(2).await.unwrap();
        cache.get(3).await.unwrap();
        cache.get(4).await.unwrap(); // evicts 2
        assert_eq!(cache.len(), 2);

        // 2 was evicted, so this goes back to the source.
        cache.get(2).await.unwrap();
        assert_eq!(source.close_time_lookups(), 4);
    }
}
