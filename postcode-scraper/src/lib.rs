//! Postcode scraper.
//!
//! Walks the 5-digit postcode space against the Pos Malaysia postcode API,
//! merges the returned locations into a deduplicated state → postcode →
//! city → location tree, and exports it as deterministic, sorted JSON.
//! Responses are cached on disk per postcode, so interrupted scans resume
//! without asking the API again.

pub mod cache;
pub mod cli;
pub mod domain;
pub mod export;
pub mod fetch;
pub mod pos;
pub mod scan;
pub mod telemetry;
pub mod tree;
