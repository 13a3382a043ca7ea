//! Lookup index - resolve composite keys to rows without a linear scan
//!
//! Built once per request from the lookup table when the function asks for
//! `CACHE`. Only the first row carrying a given key is indexed, so an indexed
//! lookup resolves to the same row a top-to-bottom scan would find.

use std::collections::HashMap;

/// Composite key → position of the first lookup row with that key.
#[derive(Debug, Clone, Default)]
pub struct LookupIndex {
    positions: HashMap<String, usize>,
}

impl LookupIndex {
    /// Index keys given in row order.
    pub fn build<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut positions = HashMap::new();
        for (position, key) in keys.into_iter().enumerate() {
            positions.entry(key).or_insert(position);
        }
        Self { positions }
    }

    /// Row position for `key`, if any row carries it.
    pub fn get(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
