//! Scan driver.
//!
//! Walks a postcode range one postcode at a time, resolves each through the
//! [`Fetcher`], merges the records into a [`LocationTree`], and exports the
//! finished tree once at the end. Any fetch, cache-setup or export failure
//! aborts the whole scan.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{CacheConfig, CacheError, CacheStore};
use crate::domain::{InvalidRange, PostcodeRange};
use crate::export::{ExportError, ExportMode, Exporter};
use crate::fetch::{CachePolicy, FetchError, Fetcher, Origin, PostcodeSource};
use crate::pos::PosError;
use crate::tree::LocationTree;

/// Default output file.
pub const DEFAULT_OUTPUT: &str = "all.json";

/// Errors that abort a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid scan range: {0}")]
    Range(#[from] InvalidRange),

    #[error("failed to create postcode client: {0}")]
    Client(#[from] PosError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Everything a scan needs to know.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Postcodes to visit.
    pub range: PostcodeRange,

    /// Pause after each network request.
    pub interval: Duration,

    /// Destination of the exported document.
    pub output: PathBuf,

    /// Where lookups are cached.
    pub cache: CacheConfig,

    /// How cached entries are used.
    pub policy: CachePolicy,

    /// Shape of the exported document.
    pub mode: ExportMode,

    /// Merge every cached entry before scanning, and skip postcodes that
    /// snapshot already covers. The export then includes cached postcodes
    /// outside the range too.
    pub include_cached: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            range: PostcodeRange::default(),
            interval: Duration::ZERO,
            output: PathBuf::from(DEFAULT_OUTPUT),
            cache: CacheConfig::disabled(),
            policy: CachePolicy::default(),
            mode: ExportMode::default(),
            include_cached: false,
        }
    }
}

/// Counts of how each postcode was resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Postcodes resolved from the cache.
    pub from_cache: usize,

    /// Postcodes resolved with a request to the service.
    pub from_network: usize,

    /// Postcodes skipped because the preloaded snapshot already had them.
    pub already_known: usize,

    /// Resolved postcodes without any locations.
    pub empty: usize,

    /// Cache entries merged before scanning.
    pub preloaded: usize,
}

impl ScanSummary {
    /// Postcodes in the range that were visited.
    pub fn visited(&self) -> usize {
        self.from_cache + self.from_network + self.already_known
    }
}

/// Result of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Where the document was written.
    pub output: PathBuf,

    pub summary: ScanSummary,

    /// Distinct (state, postcode, city, location) entries exported.
    pub locations: usize,
}

/// Runs scans against a postcode source.
pub struct Scanner<S> {
    fetcher: Fetcher<S>,
    config: ScanConfig,
}

impl<S: PostcodeSource> Scanner<S> {
    pub fn new(source: S, config: ScanConfig) -> Self {
        let cache = CacheStore::new(config.cache.clone());
        let fetcher = Fetcher::new(source, cache)
            .with_policy(config.policy)
            .with_interval(config.interval);
        Self { fetcher, config }
    }

    /// Scan the configured range and write the export.
    ///
    /// The destination and the cache directory are prepared before the
    /// first postcode is resolved, so setup problems fail fast.
    pub async fn run(&self) -> Result<ScanReport, ScanError> {
        let exporter = Exporter::create(&self.config.output)?;
        self.fetcher.cache().initialize()?;

        let mut tree = LocationTree::new();
        let mut summary = ScanSummary::default();

        if self.config.include_cached && self.config.policy.reuses_records() {
            summary.preloaded = self.preload(&mut tree)?;
        }

        let range = self.config.range;
        let total = range.len();
        for (idx, postcode) in range.iter().enumerate() {
            if self.config.include_cached && tree.exists(postcode.as_str()) {
                debug!(%postcode, "already in cache snapshot");
                summary.already_known += 1;
                continue;
            }

            let fetched = self.fetcher.fetch(&postcode).await?;
            debug!(
                "[{}/{total}] {postcode}: {} records",
                idx + 1,
                fetched.records.len()
            );

            match fetched.origin {
                Origin::Cache => summary.from_cache += 1,
                Origin::Network => summary.from_network += 1,
            }
            if fetched.records.is_empty() {
                summary.empty += 1;
            }

            tree.store_all(&fetched.records);
        }

        let output = exporter.export(&tree, self.config.mode)?;
        let locations = tree.location_count();

        info!(
            visited = summary.visited(),
            from_cache = summary.from_cache,
            from_network = summary.from_network,
            already_known = summary.already_known,
            empty = summary.empty,
            states = tree.len(),
            locations,
            "scan finished"
        );

        Ok(ScanReport {
            output,
            summary,
            locations,
        })
    }

    /// Merge every cached entry into the tree.
    fn preload(&self, tree: &mut LocationTree) -> Result<usize, CacheError> {
        let entries = self.fetcher.cache().entries()?;
        for (_, entry) in &entries {
            tree.store_all(entry.records());
        }
        info!(entries = entries.len(), "loaded cache snapshot");
        Ok(entries.len())
    }
}
