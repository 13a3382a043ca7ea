//! Random-sample join.

use rand::Rng;

use crate::models::{cell, OutputTable, Table};
use crate::transform::dsl::RandomLookupSpec;

/// Replace every destination cell with a value drawn from `lookup`.
///
/// Each destination cell draws `max(limit, 1)` rows uniformly and keeps the
/// last draw. Destination `i` reads value column `i`. Other columns are
/// copied, and the header is the source header. An empty lookup table
/// yields empty cells and consumes no randomness.
pub fn random_lookup<R>(
    spec: &RandomLookupSpec,
    source: &Table,
    lookup: &Table,
    rng: &mut R,
) -> OutputTable
where
    R: Rng + ?Sized,
{
    let values = lookup.resolve_columns(&spec.lookup_value_columns);
    let destinations = spec.output_columns();

    // Per source column: the lookup value column it is drawn from, if any.
    let targets: Vec<Option<Option<&str>>> = source
        .headers
        .iter()
        .map(|header| {
            let wanted = header.trim().to_lowercase();
            destinations
                .iter()
                .position(|d| d.trim().to_lowercase() == wanted)
                .map(|i| values.get(i).and_then(|v| v.as_deref()))
        })
        .collect();

    let draws = spec.draw_count();
    let rows = source
        .rows
        .iter()
        .map(|row| {
            source
                .headers
                .iter()
                .zip(&targets)
                .map(|(header, target)| match target {
                    Some(value) => draw(lookup, *value, draws, rng),
                    None => cell(row, Some(header.as_str())).to_string(),
                })
                .collect()
        })
        .collect();

    OutputTable {
        headers: source.headers.clone(),
        rows,
    }
}

fn draw<R>(lookup: &Table, column: Option<&str>, draws: u32, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    if lookup.is_empty() {
        return String::new();
    }

    let mut picked = "";
    for _ in 0..draws {
        let row = &lookup.rows[rng.gen_range(0..lookup.len())];
        picked = cell(row, column);
    }
    picked.to_string()
}
