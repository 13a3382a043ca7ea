//! Exact-match join.

use super::{composite_key, project};
use crate::cache::LookupIndex;
use crate::models::{OutputTable, Table};
use crate::transform::dsl::{ExactLookupSpec, TrimMode};

/// Join `source` against `lookup` on equal composite keys.
///
/// The first lookup row carrying a key wins, with or without the index.
///
/// ```
/// use lookupmask::transform::dsl::parse_lookup;
/// use lookupmask::transform::join::exact_lookup;
/// use lookupmask::Table;
///
/// let spec = parse_lookup("LOOKUP(id, DEST=(val), tbl(id, VALUES=(val)))").unwrap();
/// let source = Table::from_records(&["id", "name"], &[&["1", "Ann"]]);
/// let lookup = Table::from_records(&["id", "val"], &[&["1", "X"]]);
///
/// let output = exact_lookup(&spec, &source, &lookup);
/// assert_eq!(output.headers, vec!["name", "val"]);
/// assert_eq!(output.rows, vec![vec!["Ann", "X"]]);
/// ```
pub fn exact_lookup(spec: &ExactLookupSpec, source: &Table, lookup: &Table) -> OutputTable {
    let source_keys = source.resolve_columns(&spec.source_search_columns);
    let lookup_keys = lookup.resolve_columns(&spec.lookup_search_columns);
    let values = lookup.resolve_columns(&spec.lookup_value_columns);

    let index = spec.cache_enabled.then(|| {
        LookupIndex::build(
            lookup
                .rows
                .iter()
                .map(|row| composite_key(row, &lookup_keys, TrimMode::None)),
        )
    });

    project(
        source,
        lookup,
        &source_keys,
        &values,
        spec.output_columns(),
        |row| {
            let key = composite_key(row, &source_keys, TrimMode::None);
            match &index {
                Some(index) => index.get(&key),
                None => lookup
                    .rows
                    .iter()
                    .position(|candidate| composite_key(candidate, &lookup_keys, TrimMode::None) == key),
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::dsl::parse_lookup;

    fn lookup_table() -> Table {
        Table::from_records(
            &["code", "label"],
            &[&["A", "first"], &["B", "only"], &["A", "second"]],
        )
    }

    #[test]
    fn test_first_match_regardless_of_cache() {
        let source = Table::from_records(&["code", "n"], &[&["A", "1"], &["B", "2"]]);

        for cache in ["CACHE", "NOCACHE"] {
            let spec = parse_lookup(&format!(
                "LOOKUP(code, DEST=(label), t(code, VALUES=(label)), {})",
                cache
            ))
            .unwrap();
            let output = exact_lookup(&spec, &source, &lookup_table());

            assert_eq!(output.rows[0], vec!["1", "first"], "{}", cache);
            assert_eq!(output.rows[1], vec!["2", "only"], "{}", cache);
        }
    }

    #[test]
    fn test_cached_and_linear_are_identical() {
        let source = Table::from_records(
            &["code", "n"],
            &[&["A", "1"], &["Z", "2"], &["B", "3"], &["", "4"]],
        );
        let cached =
            parse_lookup("LOOKUP(code, DEST=(label), t(code, VALUES=(label), CACHE))").unwrap();
        let linear = ExactLookupSpec {
            cache_enabled: false,
            ..cached.clone()
        };

        assert_eq!(
            exact_lookup(&cached, &source, &lookup_table()),
            exact_lookup(&linear, &source, &lookup_table())
        );
    }

    #[test]
    fn test_no_match_gives_empty_cells() {
        let source = Table::from_records(&["code", "n"], &[&["Q", "1"]]);
        let spec = parse_lookup("LOOKUP(code, t(code, label))").unwrap();
        let output = exact_lookup(&spec, &source, &lookup_table());

        assert_eq!(output.headers, vec!["n", "label"]);
        assert_eq!(output.rows, vec![vec!["1", ""]]);
    }

    #[test]
    fn test_composite_keys_and_positional_projection() {
        let source = Table::from_records(
            &["First", "Last", "age"],
            &[&["ann", "lee", "30"], &["bob", "ray", "41"]],
        );
        let lookup = Table::from_records(
            &["fname", "lname", "town", "zip"],
            &[&["bob", "ray", "Oslo", "0150"], &["ann", "lee", "Rome", "00100"]],
        );
        let spec = parse_lookup(
            "LOOKUP(SRCSEARCH=(first, last), DEST=(city, postcode), \
             people(LKPSEARCH=(fname, lname), VALUES=(town, zip)))",
        )
        .unwrap();

        let output = exact_lookup(&spec, &source, &lookup);
        assert_eq!(output.headers, vec!["age", "city", "postcode"]);
        assert_eq!(output.rows[0], vec!["30", "Rome", "00100"]);
        assert_eq!(output.rows[1], vec!["41", "Oslo", "0150"]);
    }

    #[test]
    fn test_no_normalization() {
        let source = Table::from_records(&["id", "n"], &[&[" 1", "a"], &["x", "b"]]);
        let lookup = Table::from_records(&["id", "v"], &[&["1", "one"], &["X", "ex"]]);
        let spec = parse_lookup("LOOKUP(id, t(id, v))").unwrap();

        let output = exact_lookup(&spec, &source, &lookup);
        assert_eq!(output.rows, vec![vec!["a", ""], vec!["b", ""]]);
    }
}
