//! Mock postcode client for running without API access.
//!
//! Serves canned responses, either registered in memory or loaded from a
//! directory of JSON files, as if they were live API responses.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{Postcode, Record};
use crate::fetch::PostcodeSource;

use super::error::PosError;

/// Mock postcode client.
///
/// Postcodes without a registered response answer with an empty list, the
/// same way the real service answers for unassigned postcodes. Clones share
/// the lookup counter.
#[derive(Debug, Clone, Default)]
pub struct MockPosClient {
    responses: HashMap<Postcode, Vec<Record>>,
    failing: HashSet<Postcode>,
    lookups: Arc<AtomicUsize>,
}

impl MockPosClient {
    /// Create a mock client with no registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client by loading JSON files from a directory.
    ///
    /// Expects files named `{postcode}.json` (e.g., `50450.json`), each
    /// holding the JSON array the real service would return.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, PosError> {
        let data_dir = data_dir.as_ref();
        let mut client = Self::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| PosError::Mock {
            message: format!("failed to read mock data directory {}: {e}", data_dir.display()),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| PosError::Mock {
                message: format!("failed to read directory entry: {e}"),
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            // Files whose stem isn't a postcode are not mock responses
            let Some(postcode) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Postcode::parse(s).ok())
            else {
                continue;
            };

            let json = std::fs::read_to_string(&path).map_err(|e| PosError::Mock {
                message: format!("failed to read {}: {e}", path.display()),
            })?;

            let records: Vec<Record> = serde_json::from_str(&json).map_err(|e| PosError::Mock {
                message: format!("failed to parse {}: {e}", path.display()),
            })?;

            client.responses.insert(postcode, records);
        }

        Ok(client)
    }

    /// Register the response for a postcode.
    pub fn with_response(mut self, postcode: Postcode, records: Vec<Record>) -> Self {
        self.responses.insert(postcode, records);
        self
    }

    /// Make lookups for a postcode fail with a server error.
    pub fn with_failure(mut self, postcode: Postcode) -> Self {
        self.failing.insert(postcode);
        self
    }

    /// Number of lookups served so far, across all clones.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl PostcodeSource for MockPosClient {
    async fn lookup(&self, postcode: &Postcode) -> Result<Vec<Record>, PosError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(postcode) {
            return Err(PosError::Api {
                status: 500,
                message: format!("mock failure for {postcode}"),
            });
        }

        Ok(self.responses.get(postcode).cloned().unwrap_or_default())
    }
}
