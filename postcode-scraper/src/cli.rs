//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::builder::{OsStringValueParser, TypedValueParser};

use crate::cache::CacheConfig;
use crate::domain::{InvalidRange, MAX_POSTCODE, PostcodeRange};
use crate::export::ExportMode;
use crate::fetch::CachePolicy;
use crate::pos::PosClientConfig;
use crate::scan::{DEFAULT_OUTPUT, ScanConfig};

/// Command-line arguments for the postcode scraper.
#[derive(Debug, Parser)]
#[command(
    name = "postcode-scraper",
    version,
    about = "Scan Malaysian postcodes and export their locations as sorted JSON"
)]
pub struct CliArgs {
    /// First postcode to scan.
    #[arg(long, default_value_t = 0)]
    pub start: u32,

    /// Last postcode to scan (inclusive).
    #[arg(long, default_value_t = MAX_POSTCODE)]
    pub end: u32,

    /// Distance between scanned postcodes.
    #[arg(long, default_value_t = 1)]
    pub step: u32,

    /// Pause after each request to the postcode API, in milliseconds.
    #[arg(long = "interval", value_name = "MILLIS", default_value_t = 0)]
    pub interval_ms: u64,

    /// Output file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub out: PathBuf,

    /// Directory for cached responses; caching is off when unset or empty.
    #[arg(
        long = "cache-dir",
        env = "POSTCODE_SCRAPER_CACHE_DIR",
        value_name = "PATH",
        value_parser = OsStringValueParser::new().map(PathBuf::from)
    )]
    pub cache_dir: Option<PathBuf>,

    /// Fetch cached postcodes again; known-empty ones stay skipped unless
    /// combined with `--refetch-empty`.
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Fetch postcodes previously found to be empty again.
    #[arg(long = "refetch-empty")]
    pub refetch_empty: bool,

    /// Only print warnings and errors.
    #[arg(long, short)]
    pub quiet: bool,

    /// Export (postcode, city) pairs without location names.
    #[arg(long = "no-locations")]
    pub no_locations: bool,

    /// Also export every cached postcode, skipping those already cached.
    #[arg(long = "include-cached")]
    pub include_cached: bool,

    /// Override the postcode API base URL.
    #[arg(long = "base-url", env = "POSTCODE_SCRAPER_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long = "timeout-secs", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Serve responses from `{postcode}.json` files in this directory instead of the API.
    #[arg(long = "mock-dir", value_name = "PATH")]
    pub mock_dir: Option<PathBuf>,
}

impl CliArgs {
    /// Build the scan configuration, validating the range.
    pub fn scan_config(&self) -> Result<ScanConfig, InvalidRange> {
        Ok(ScanConfig {
            range: PostcodeRange::new(self.start, self.end, self.step)?,
            interval: Duration::from_millis(self.interval_ms),
            output: self.out.clone(),
            cache: self
                .cache_dir
                .as_ref()
                .map_or_else(CacheConfig::disabled, CacheConfig::new),
            policy: self.cache_policy(),
            mode: if self.no_locations {
                ExportMode::WithoutLocations
            } else {
                ExportMode::Full
            },
            include_cached: self.include_cached,
        })
    }

    /// Build the API client configuration.
    pub fn client_config(&self) -> PosClientConfig {
        let config = PosClientConfig::new().with_timeout(self.timeout_secs);
        match &self.base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    fn cache_policy(&self) -> CachePolicy {
        match (self.no_cache, self.refetch_empty) {
            (true, true) => CachePolicy::BypassAll,
            (true, false) => CachePolicy::Bypass,
            (false, true) => CachePolicy::RefetchEmpty,
            (false, false) => CachePolicy::Reuse,
        }
    }
}
