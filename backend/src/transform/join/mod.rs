//! Join engines.
//!
//! Each engine takes a parsed function plus the source and lookup
//! tables and produces an [`OutputTable`]. Engines never fail on data:
//! missing cells and unmatched keys become empty strings. Column presence is
//! checked beforehand by [`crate::validation`].
//!
//! - `exact`: equal composite keys
//! - `random`: uniform sampling from the lookup table
//! - `hash`: equal digests of normalized, salted composite keys

pub mod exact;
pub mod hash;
pub mod random;

pub use exact::exact_lookup;
pub use hash::{DigestAlgorithm, HashJoin};
pub use random::random_lookup;

use rand::Rng;

use crate::error::AlgorithmError;
use crate::models::{cell, OutputTable, Row, Table};
use crate::transform::dsl::{LookupSpec, TrimMode};

/// Placed between the parts of a composite key so `"ab" + "c"` and
/// `"a" + "bc"` stay distinct.
pub const KEY_SEPARATOR: char = '\u{1f}';

/// Run the engine matching the parsed function's dialect.
///
/// `rng` is only consumed by the random dialect.
pub fn run_join<R>(
    spec: &LookupSpec,
    source: &Table,
    lookup: &Table,
    rng: &mut R,
) -> Result<OutputTable, AlgorithmError>
where
    R: Rng + ?Sized,
{
    match spec {
        LookupSpec::Exact(spec) => Ok(exact_lookup(spec, source, lookup)),
        LookupSpec::Random(spec) => Ok(random_lookup(spec, source, lookup, rng)),
        LookupSpec::Hash(spec) => Ok(HashJoin::new(spec)?.run(source, lookup)),
    }
}

/// Join the (normalized) cells of `columns` into one key.
pub fn composite_key(row: &Row, columns: &[Option<String>], trim: TrimMode) -> String {
    let mut key = String::new();
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(&trim.apply(cell(row, column.as_deref())));
    }
    key
}

/// Source headers that are carried through unchanged: all but the search keys.
fn passthrough_columns(source: &Table, search: &[Option<String>]) -> Vec<String> {
    source
        .headers
        .iter()
        .filter(|h| !search.iter().any(|s| s.as_deref() == Some(h.as_str())))
        .cloned()
        .collect()
}

/// Shared projection of the exact and hash engines.
///
/// Output row = passthrough cells, then value column `i` of the matched
/// lookup row for every output column `i` (or `""` without a match).
fn project<F>(
    source: &Table,
    lookup: &Table,
    search: &[Option<String>],
    values: &[Option<String>],
    output_columns: &[String],
    mut find: F,
) -> OutputTable
where
    F: FnMut(&Row) -> Option<usize>,
{
    let passthrough = passthrough_columns(source, search);

    let mut headers = passthrough.clone();
    headers.extend(output_columns.iter().cloned());

    let rows = source
        .rows
        .iter()
        .map(|row| {
            let matched = find(row).and_then(|i| lookup.rows.get(i));
            let mut out: Vec<String> = passthrough
                .iter()
                .map(|h| cell(row, Some(h.as_str())).to_string())
                .collect();
            out.extend(values.iter().map(|value| {
                matched
                    .map(|m| cell(m, value.as_deref()).to_string())
                    .unwrap_or_default()
            }));
            out
        })
        .collect();

    OutputTable { headers, rows }
}
