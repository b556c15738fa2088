//! Cache-aware postcode fetching.
//!
//! A postcode is resolved either from the disk cache or with exactly one
//! request to the lookup service. Network results are written back to the
//! cache, and every network request is followed by the configured pause so
//! long scans stay polite.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStore};
use crate::domain::{Postcode, Record};
use crate::pos::PosError;

/// Something that can look up the records for a postcode.
///
/// This abstraction allows the fetcher to be tested with mock data.
pub trait PostcodeSource {
    /// Fetch every record registered under `postcode`.
    ///
    /// An empty list means the postcode has no locations.
    fn lookup(
        &self,
        postcode: &Postcode,
    ) -> impl Future<Output = Result<Vec<Record>, PosError>> + Send;
}

/// How cached entries are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Use every cached entry, including known-empty postcodes.
    #[default]
    Reuse,
    /// Use cached records, but ask the service again about known-empty postcodes.
    RefetchEmpty,
    /// Ask the service again about cached records, but keep skipping
    /// known-empty postcodes.
    Bypass,
    /// Ignore every cached entry and always ask the service.
    BypassAll,
}

impl CachePolicy {
    fn accepts(self, entry: &CacheEntry) -> bool {
        match self {
            CachePolicy::Reuse => true,
            CachePolicy::RefetchEmpty => !entry.is_empty(),
            CachePolicy::Bypass => entry.is_empty(),
            CachePolicy::BypassAll => false,
        }
    }

    /// Whether cached records are trusted as they are.
    pub fn reuses_records(self) -> bool {
        matches!(self, CachePolicy::Reuse | CachePolicy::RefetchEmpty)
    }
}

/// Where a fetched result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Network,
}

/// The resolved records for one postcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub postcode: Postcode,
    pub records: Vec<Record>,
    pub origin: Origin,
}

/// A lookup that failed. Always fatal to the scan.
#[derive(Debug, thiserror::Error)]
#[error("failed to fetch postcode {postcode}: {source}")]
pub struct FetchError {
    pub postcode: Postcode,
    #[source]
    pub source: PosError,
}

/// Resolves postcodes through the cache and the lookup service.
pub struct Fetcher<S> {
    source: S,
    cache: CacheStore,
    policy: CachePolicy,
    interval: Duration,
}

impl<S: PostcodeSource> Fetcher<S> {
    /// Create a fetcher that reuses cached entries and doesn't pause.
    pub fn new(source: S, cache: CacheStore) -> Self {
        Self {
            source,
            cache,
            policy: CachePolicy::default(),
            interval: Duration::ZERO,
        }
    }

    /// Set how cached entries are used.
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the pause after each network request.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Resolve the records for a postcode.
    ///
    /// A usable cache entry is returned without a request or a pause.
    /// Otherwise the service is asked once, the pause is awaited, and the
    /// answer is cached. Failing to write the cache is logged and ignored.
    pub async fn fetch(&self, postcode: &Postcode) -> Result<Fetched, FetchError> {
        if let Some(entry) = self.cached(postcode) {
            debug!(%postcode, records = entry.records().len(), "found cached response");
            return Ok(Fetched {
                postcode: *postcode,
                records: entry.into_records(),
                origin: Origin::Cache,
            });
        }

        info!(%postcode, "fetching");
        let records = self
            .source
            .lookup(postcode)
            .await
            .map_err(|source| FetchError {
                postcode: *postcode,
                source,
            })?;

        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }

        if let Err(e) = self.cache.set(postcode, &records) {
            warn!(%postcode, error = %e, "failed to cache response");
        }

        Ok(Fetched {
            postcode: *postcode,
            records,
            origin: Origin::Network,
        })
    }

    fn cached(&self, postcode: &Postcode) -> Option<CacheEntry> {
        if self.policy == CachePolicy::BypassAll {
            return None;
        }
        self.cache
            .get(postcode)
            .filter(|entry| self.policy.accepts(entry))
    }
}
