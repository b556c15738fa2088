//! Deduplicated location hierarchy.
//!
//! Records are merged into a tree keyed state → postcode → city, with a set
//! of location names at each leaf. Every level is keyed uniquely and leaves
//! are sets, so merging is an idempotent union: storing a record twice
//! leaves the tree unchanged. All fields are trimmed before insertion.
//!
//! The tree only grows. Ordering is not tracked here; the exporter sorts.

use std::collections::{HashMap, HashSet};

use crate::domain::Record;

/// Root of the hierarchy: states by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationTree {
    states: HashMap<String, StateNode>,
}

/// Postcodes recorded under one state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateNode {
    postcodes: HashMap<String, PostcodeNode>,
}

/// Cities (post offices) recorded under one postcode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostcodeNode {
    cities: HashMap<String, CityNode>,
}

/// Location names recorded under one city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityNode {
    locations: HashSet<String>,
}

impl LocationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one record, creating intermediate levels as needed.
    pub fn store(&mut self, record: &Record) {
        let record = record.trimmed();
        self.states
            .entry(record.state)
            .or_default()
            .postcodes
            .entry(record.postcode)
            .or_default()
            .cities
            .entry(record.post_office)
            .or_default()
            .locations
            .insert(record.location);
    }

    /// Merge every record.
    pub fn store_all<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) {
        for record in records {
            self.store(record);
        }
    }

    /// Whether the postcode has been recorded under any state.
    pub fn exists(&self, postcode: &str) -> bool {
        self.states
            .values()
            .any(|state| state.postcodes.contains_key(postcode))
    }

    pub fn state(&self, name: &str) -> Option<&StateNode> {
        self.states.get(name)
    }

    /// States in unspecified order.
    pub fn states(&self) -> impl Iterator<Item = (&str, &StateNode)> {
        self.states.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Total number of distinct (state, postcode, city, location) entries.
    pub fn location_count(&self) -> usize {
        self.states
            .values()
            .flat_map(|s| s.postcodes.values())
            .flat_map(|p| p.cities.values())
            .map(CityNode::len)
            .sum()
    }
}

impl StateNode {
    pub fn postcode(&self, postcode: &str) -> Option<&PostcodeNode> {
        self.postcodes.get(postcode)
    }

    /// Postcodes in unspecified order.
    pub fn postcodes(&self) -> impl Iterator<Item = (&str, &PostcodeNode)> {
        self.postcodes.iter().map(|(pc, node)| (pc.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.postcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postcodes.is_empty()
    }
}

impl PostcodeNode {
    pub fn city(&self, name: &str) -> Option<&CityNode> {
        self.cities.get(name)
    }

    /// Cities in unspecified order.
    pub fn cities(&self) -> impl Iterator<Item = (&str, &CityNode)> {
        self.cities.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl CityNode {
    pub fn contains(&self, location: &str) -> bool {
        self.locations.contains(location)
    }

    /// Locations in unspecified order.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Small alphabets so generated records collide often
    fn arb_record() -> impl Strategy<Value = Record> {
        ("[AB]", "0000[1-3]", "[XYZ]", "[pq]{1,2}")
            .prop_map(|(state, postcode, city, location)| {
                Record::new(postcode, location, city, state)
            })
    }

    fn padding() -> impl Strategy<Value = String> {
        "[ \t\n]{0,2}"
    }

    proptest! {
        /// Storing a batch twice yields the same tree as storing it once
        #[test]
        fn merge_is_idempotent(records in prop::collection::vec(arb_record(), 0..20)) {
            let mut once = LocationTree::new();
            once.store_all(&records);

            let mut twice = once.clone();
            twice.store_all(&records);

            prop_assert_eq!(once, twice);
        }

        /// Insertion order doesn't affect the resulting tree
        #[test]
        fn merge_is_order_independent(records in prop::collection::vec(arb_record(), 0..20)) {
            let mut forward = LocationTree::new();
            forward.store_all(&records);

            let mut backward = LocationTree::new();
            backward.store_all(records.iter().rev());

            prop_assert_eq!(forward, backward);
        }

        /// Padding any field with whitespace lands in the same position
        #[test]
        fn padded_record_matches_trimmed(
            r in arb_record(),
            pads in prop::collection::vec(padding(), 8),
        ) {
            let padded = Record::new(
                format!("{}{}{}", pads[0], r.postcode, pads[1]),
                format!("{}{}{}", pads[2], r.location, pads[3]),
                format!("{}{}{}", pads[4], r.post_office, pads[5]),
                format!("{}{}{}", pads[6], r.state, pads[7]),
            );

            let mut plain = LocationTree::new();
            plain.store(&r);

            let mut both = plain.clone();
            both.store(&padded);

            prop_assert_eq!(plain, both);
        }

        /// Every stored postcode is found
        #[test]
        fn stored_postcodes_exist(records in prop::collection::vec(arb_record(), 1..20)) {
            let mut tree = LocationTree::new();
            tree.store_all(&records);

            for r in &records {
                prop_assert!(tree.exists(&r.postcode));
            }
        }
    }
}
