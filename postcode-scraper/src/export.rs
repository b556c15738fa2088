//! Deterministic JSON export of a [`LocationTree`].
//!
//! The tree's maps iterate in arbitrary order, so every level is collected
//! and sorted before encoding:
//!
//! - states ascending
//! - postcodes ascending within a state
//! - cities ascending within a postcode
//! - locations ascending within a city
//!
//! The reduced export drops location names and lists (postcode, city) pairs
//! per state, sorted by postcode then city. All sorts are stable, so the same
//! tree always encodes to the same bytes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::tree::LocationTree;

/// Errors from writing the export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The destination could not be created
    #[error("failed to create export file {path}: {source}")]
    Create { path: PathBuf, source: io::Error },

    /// The document could not be written
    #[error("failed to write export file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    /// The document could not be encoded
    #[error("failed to encode export: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Shape of the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// States → postcodes → cities → locations.
    #[default]
    Full,
    /// States → (postcode, city) pairs, without location names.
    WithoutLocations,
}

#[derive(Debug, Serialize)]
pub struct ExportCity<'a> {
    pub city: &'a str,
    pub locations: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ExportPostcode<'a> {
    pub postcode: &'a str,
    pub cities: Vec<ExportCity<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ExportState<'a> {
    pub state: &'a str,
    pub postcodes: Vec<ExportPostcode<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ExportPostcodeCity<'a> {
    pub postcode: &'a str,
    pub city: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ExportStateWithoutLocations<'a> {
    pub state: &'a str,
    pub postcodes: Vec<ExportPostcodeCity<'a>>,
}

/// Build the full document, sorted at every level.
pub fn full_document(tree: &LocationTree) -> Vec<ExportState<'_>> {
    let mut states: Vec<ExportState<'_>> = tree
        .states()
        .map(|(state, state_node)| {
            let mut postcodes: Vec<ExportPostcode<'_>> = state_node
                .postcodes()
                .map(|(postcode, postcode_node)| {
                    let mut cities: Vec<ExportCity<'_>> = postcode_node
                        .cities()
                        .map(|(city, city_node)| {
                            let mut locations: Vec<&str> = city_node.locations().collect();
                            locations.sort();
                            ExportCity { city, locations }
                        })
                        .collect();
                    cities.sort_by(|a, b| a.city.cmp(b.city));
                    ExportPostcode { postcode, cities }
                })
                .collect();
            postcodes.sort_by(|a, b| a.postcode.cmp(b.postcode));
            ExportState { state, postcodes }
        })
        .collect();
    states.sort_by(|a, b| a.state.cmp(b.state));
    states
}

/// Build the reduced document: (postcode, city) pairs per state.
pub fn document_without_locations(tree: &LocationTree) -> Vec<ExportStateWithoutLocations<'_>> {
    let mut states: Vec<ExportStateWithoutLocations<'_>> = tree
        .states()
        .map(|(state, state_node)| {
            let mut postcodes: Vec<ExportPostcodeCity<'_>> = state_node
                .postcodes()
                .flat_map(|(postcode, postcode_node)| {
                    postcode_node
                        .cities()
                        .map(move |(city, _)| ExportPostcodeCity { postcode, city })
                })
                .collect();
            postcodes.sort_by(|a, b| (a.postcode, a.city).cmp(&(b.postcode, b.city)));
            ExportStateWithoutLocations { state, postcodes }
        })
        .collect();
    states.sort_by(|a, b| a.state.cmp(b.state));
    states
}

/// Encode the tree as compact JSON followed by a newline.
///
/// Text is emitted as plain UTF-8; characters such as `&`, `<` and `>` are
/// not escaped.
pub fn render(tree: &LocationTree, mode: ExportMode) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = match mode {
        ExportMode::Full => serde_json::to_vec(&full_document(tree))?,
        ExportMode::WithoutLocations => serde_json::to_vec(&document_without_locations(tree))?,
    };
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes the final document to its destination.
///
/// The destination is created up front, so an unwritable path fails before
/// any scanning time is spent. Exporting consumes the exporter: the document
/// is written and flushed exactly once.
#[derive(Debug)]
pub struct Exporter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Exporter {
    /// Create (or truncate) the destination file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| ExportError::Create {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Encode the tree and write it to the destination.
    pub fn export(mut self, tree: &LocationTree, mode: ExportMode) -> Result<PathBuf, ExportError> {
        let bytes = render(tree, mode)?;

        self.writer
            .write_all(&bytes)
            .and_then(|()| self.writer.flush())
            .map_err(|source| ExportError::Write {
                path: self.path.clone(),
                source,
            })?;

        Ok(self.path)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::Record;
    use proptest::prelude::*;

    fn arb_record() -> impl Strategy<Value = Record> {
        ("[A-C]", "0000[0-4]", "[a-d]{1,3}", "[a-d ]{1,4}")
            .prop_map(|(state, postcode, city, location)| {
                Record::new(postcode, location, city, state)
            })
    }

    proptest! {
        /// Insertion order never changes the exported bytes
        #[test]
        fn export_is_deterministic(
            records in prop::collection::vec(arb_record(), 0..30),
            shuffle in prop::collection::vec(any::<prop::sample::Index>(), 0..30),
        ) {
            let mut forward = LocationTree::new();
            forward.store_all(&records);

            let mut reordered = records.clone();
            for (i, idx) in shuffle.iter().enumerate() {
                if reordered.is_empty() {
                    break;
                }
                let len = reordered.len();
                let j = idx.index(len);
                reordered.swap(i % len, j);
            }
            let mut other = LocationTree::new();
            other.store_all(&reordered);

            for mode in [ExportMode::Full, ExportMode::WithoutLocations] {
                prop_assert_eq!(render(&forward, mode).unwrap(), render(&other, mode).unwrap());
                prop_assert_eq!(render(&forward, mode).unwrap(), render(&forward, mode).unwrap());
            }
        }

        /// Every level of the full export is in ascending order
        #[test]
        fn full_export_is_sorted(records in prop::collection::vec(arb_record(), 0..30)) {
            let mut tree = LocationTree::new();
            tree.store_all(&records);
            let doc = full_document(&tree);

            prop_assert!(doc.windows(2).all(|w| w[0].state < w[1].state));
            for state in &doc {
                prop_assert!(state.postcodes.windows(2).all(|w| w[0].postcode < w[1].postcode));
                for postcode in &state.postcodes {
                    prop_assert!(postcode.cities.windows(2).all(|w| w[0].city < w[1].city));
                    for city in &postcode.cities {
                        prop_assert!(city.locations.windows(2).all(|w| w[0] < w[1]));
                    }
                }
            }
        }

        /// The reduced export lists exactly one pair per (state, postcode, city)
        #[test]
        fn reduced_export_is_sorted_and_unique(
            records in prop::collection::vec(arb_record(), 0..30),
        ) {
            let mut tree = LocationTree::new();
            tree.store_all(&records);
            let doc = document_without_locations(&tree);

            for state in &doc {
                prop_assert!(state
                    .postcodes
                    .windows(2)
                    .all(|w| (w[0].postcode, w[0].city) < (w[1].postcode, w[1].city)));
            }
        }
    }
}
