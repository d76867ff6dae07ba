use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use lfx_resolve::{RangeResolver, ResolverConfig};
use lfx_source::{ClosePointCache, LedgerSource};
use lfx_stream::{run_scan, EffectSink, ScanConfig, ScanSummary};
use lfx_types::EntryType;

use crate::error::ExportResult;

/// Configuration for one exporter instance.
#[derive(Clone, Copy, Debug)]
pub struct ExportConfig {
    pub resolver: ResolverConfig,
    pub scan: ScanConfig,
    /// Close points retained by the shared cache across resolutions.
    pub cache_capacity: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            scan: ScanConfig::default(),
            cache_capacity: ClosePointCache::DEFAULT_CAPACITY,
        }
    }
}

/// The export surface over one ledger source.
///
/// Owns the close-point cache for its whole lifetime, so repeated
/// resolutions in a long-lived process reuse earlier lookups. The cache is
/// read-heavy and safe under concurrent resolutions; population is
/// single-flight.
pub struct LedgerExporter {
    source: Arc<dyn LedgerSource>,
    resolver: RangeResolver,
    scan_config: ScanConfig,
}

impl LedgerExporter {
    pub fn new(source: Arc<dyn LedgerSource>, config: ExportConfig) -> Self {
        let cache = Arc::new(ClosePointCache::with_capacity(
            Arc::clone(&source),
            config.cache_capacity,
        ));
        let resolver = RangeResolver::new(cache, config.resolver);
        Self {
            source,
            resolver,
            scan_config: config.scan,
        }
    }

    /// Resolve a wall-clock window to the tightest sequence window that
    /// contains it, clamped to the network's known lifetime.
    pub async fn resolve_range(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> ExportResult<(u64, u64)> {
        Ok(self.resolver.resolve_range(start_time, end_time).await?)
    }

    /// Scan `[start_seq, end_seq]`, compact each window's mutations, and
    /// deliver the net effects to the configured per-type sinks. Returns
    /// once every sink is closed; the result is an error only when the
    /// scan failed.
    pub async fn stream_compacted_changes(
        &self,
        start_seq: u64,
        end_seq: u64,
        sinks: HashMap<EntryType, Arc<dyn EffectSink>>,
        cancel: CancellationToken,
    ) -> ExportResult<ScanSummary> {
        Ok(run_scan(
            Arc::clone(&self.source),
            start_seq,
            end_seq,
            sinks,
            cancel,
            self.scan_config,
        )
        .await?)
    }

    /// Resolve a wall-clock window and stream its compacted changes; the
    /// composition every export job performs.
    pub async fn export_window(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        sinks: HashMap<EntryType, Arc<dyn EffectSink>>,
        cancel: CancellationToken,
    ) -> ExportResult<ScanSummary> {
        let (start_seq, end_seq) = self.resolve_range(start_time, end_time).await?;
        info!(start_seq, end_seq, "exporting resolved window");
        self.stream_compacted_changes(start_seq, end_seq, sinks, cancel)
            .await
    }
}
