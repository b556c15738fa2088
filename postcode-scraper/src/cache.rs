//! Disk cache for postcode lookups.
//!
//! Each looked-up postcode gets one file in the cache directory, named after
//! the postcode and holding the JSON array the service returned. An empty
//! array records a postcode known to have no locations, so the same entry
//! type covers both "known records" and "known empty".
//!
//! Older scans kept known-empty postcodes in a separate comma-joined `skips`
//! file. It is folded into regular entries when the cache is initialized.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Postcode, Record};

/// Name of the legacy known-empty list inside the cache directory.
pub const SKIP_LIST_FILE: &str = "skips";

/// Errors from cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache directory could not be created
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    /// An entry or listing could not be read
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// An entry could not be written
    #[error("failed to write cache entry {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    /// An entry could not be serialized
    #[error("failed to serialize cache entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Memoized result of looking up one postcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Record>", into = "Vec<Record>")]
pub enum CacheEntry {
    /// The service had no locations for the postcode.
    Empty,
    /// The exact records the service returned.
    Records(Vec<Record>),
}

impl CacheEntry {
    /// The cached records; empty for a known-empty postcode.
    pub fn records(&self) -> &[Record] {
        match self {
            CacheEntry::Empty => &[],
            CacheEntry::Records(records) => records,
        }
    }

    pub fn into_records(self) -> Vec<Record> {
        match self {
            CacheEntry::Empty => Vec::new(),
            CacheEntry::Records(records) => records,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CacheEntry::Empty)
    }
}

impl From<Vec<Record>> for CacheEntry {
    fn from(records: Vec<Record>) -> Self {
        if records.is_empty() {
            CacheEntry::Empty
        } else {
            CacheEntry::Records(records)
        }
    }
}

impl From<CacheEntry> for Vec<Record> {
    fn from(entry: CacheEntry) -> Self {
        entry.into_records()
    }
}

/// Configuration for the postcode cache.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Cache directory; `None` disables caching.
    pub dir: Option<PathBuf>,
}

impl CacheConfig {
    /// Cache in the given directory. An empty path disables caching.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if dir.as_os_str().is_empty() {
            return Self::disabled();
        }
        Self { dir: Some(dir) }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }
}

/// Disk cache of postcode lookups.
#[derive(Debug, Clone)]
pub struct CacheStore {
    config: CacheConfig,
}

impl CacheStore {
    /// Create a new cache with the given config.
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// The cache directory, if caching is enabled.
    pub fn dir(&self) -> Option<&Path> {
        self.config.dir.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Create the cache directory and import any legacy skip list.
    ///
    /// Safe to call more than once.
    pub fn initialize(&self) -> Result<(), CacheError> {
        let Some(dir) = self.dir() else {
            return Ok(());
        };

        std::fs::create_dir_all(dir).map_err(|source| CacheError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        self.import_skip_list()
    }

    /// Look up a cached entry.
    ///
    /// Returns `None` if caching is disabled, the entry doesn't exist, or
    /// the entry can't be decoded.
    pub fn get(&self, postcode: &Postcode) -> Option<CacheEntry> {
        let path = self.entry_path(postcode)?;
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring undecodable cache entry");
                None
            }
        }
    }

    /// Store the records returned for a postcode, replacing any prior entry.
    ///
    /// Does nothing when caching is disabled. The entry is written to a
    /// temporary file first and renamed into place, so readers never see a
    /// partial entry.
    pub fn set(&self, postcode: &Postcode, records: &[Record]) -> Result<(), CacheError> {
        let Some(path) = self.entry_path(postcode) else {
            return Ok(());
        };

        let json = serde_json::to_vec(records)?;

        let tmp_path = path.with_file_name(format!(".{postcode}.tmp"));
        std::fs::write(&tmp_path, json).map_err(|source| CacheError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|source| CacheError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(())
    }

    /// Every decodable entry in the cache, in postcode order.
    pub fn entries(&self) -> Result<Vec<(Postcode, CacheEntry)>, CacheError> {
        let Some(dir) = self.dir() else {
            return Ok(Vec::new());
        };

        let listing = std::fs::read_dir(dir).map_err(|source| CacheError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        for item in listing {
            let item = item.map_err(|source| CacheError::Read {
                path: dir.to_path_buf(),
                source,
            })?;
            let Some(postcode) = item
                .file_name()
                .to_str()
                .and_then(|name| Postcode::parse(name).ok())
            else {
                continue;
            };
            if let Some(entry) = self.get(&postcode) {
                entries.push((postcode, entry));
            }
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    /// Path of the entry file for a postcode.
    fn entry_path(&self, postcode: &Postcode) -> Option<PathBuf> {
        self.dir().map(|dir| dir.join(postcode.as_str()))
    }

    /// Turn the legacy skip list into empty entries.
    ///
    /// Postcodes that already have an entry keep it.
    fn import_skip_list(&self) -> Result<(), CacheError> {
        let Some(dir) = self.dir() else {
            return Ok(());
        };

        let path = dir.join(SKIP_LIST_FILE);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(CacheError::Read { path, source }),
        };

        let mut imported = 0;
        for postcode in parse_skip_list(&contents) {
            if self.get(&postcode).is_none() {
                self.set(&postcode, &[])?;
                imported += 1;
            }
        }

        if imported > 0 {
            info!(imported, "imported known-empty postcodes from legacy skip list");
        }
        Ok(())
    }
}

/// Parse a comma-joined list of postcodes, ignoring anything malformed.
fn parse_skip_list(contents: &str) -> Vec<Postcode> {
    contents
        .split(',')
        .filter_map(|s| Postcode::parse(s.trim()).ok())
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn arb_postcode() -> impl Strategy<Value = Postcode> {
        "[0-9]{5}".prop_map(|s| Postcode::parse(&s).unwrap())
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        let text = "[A-Za-z0-9 &'()/.-]{0,12}";
        ("[0-9]{5}", text, text, text).prop_map(|(postcode, location, post_office, state)| {
            Record::new(postcode, location, post_office, state)
        })
    }

    proptest! {
        /// Whatever is stored comes back unchanged, and an empty list is a known-empty entry
        #[test]
        fn stored_entry_reads_back(
            postcode in arb_postcode(),
            records in prop::collection::vec(arb_record(), 0..5),
        ) {
            let dir = tempdir().unwrap();
            let cache = CacheStore::new(CacheConfig::new(dir.path()));
            cache.initialize().unwrap();

            cache.set(&postcode, &records).unwrap();
            let entry = cache.get(&postcode).unwrap();

            prop_assert_eq!(entry.is_empty(), records.is_empty());
            prop_assert_eq!(entry.into_records(), records);
        }
    }
}
