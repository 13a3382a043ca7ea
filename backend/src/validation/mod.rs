//! Column presence validation.
//!
//! Every column a parsed function names must exist in the header of the
//! table it belongs to. The check runs before any join so that one report
//! lists every missing column across both files.
//!
//! # Column roles
//!
//! | Dialect       | Source table     | Lookup table                 |
//! |---------------|------------------|------------------------------|
//! | `LOOKUP`      | search columns   | search columns, value columns |
//! | `HASH_LOOKUP` | search columns   | search columns, value columns |
//! | `RAND_LOOKUP` | destinations     | value columns                |
//!
//! Header names are compared case-insensitively after trimming.
//!
//! # Example
//!
//! ```
//! use lookupmask::transform::dsl::parse_lookup;
//! use lookupmask::validation::validate_columns;
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let spec = parse_lookup("LOOKUP(id, t(id, val))").unwrap();
//! let source = vec!["ID".to_string(), "name".to_string()];
//! let lookup = vec!["id".to_string()];
//!
//! let errors = rt.block_on(validate_columns(&spec, &source, &lookup));
//! assert_eq!(errors[0].to_string(), "Missing lookup value column in lookup CSV: val");
//! ```

use std::fmt;

use crate::error::ColumnError;
use crate::transform::dsl::{ExactLookupSpec, HashLookupSpec, LookupSpec, RandomLookupSpec};

/// Which input table a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableSide {
    Source,
    Lookup,
}

impl fmt::Display for TableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableSide::Source => "source",
            TableSide::Lookup => "lookup",
        })
    }
}

/// What a column is used for by the function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    SourceSearch,
    Destination,
    LookupSearch,
    LookupValue,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnRole::SourceSearch => "source search",
            ColumnRole::Destination => "destination",
            ColumnRole::LookupSearch => "lookup search",
            ColumnRole::LookupValue => "lookup value",
        })
    }
}

/// Columns a parsed function expects to find in each table.
pub trait ColumnRequirements {
    fn required_columns(&self, side: TableSide) -> Vec<(&str, ColumnRole)>;
}

fn tagged(columns: &[String], role: ColumnRole) -> impl Iterator<Item = (&str, ColumnRole)> {
    columns.iter().map(move |c| (c.as_str(), role))
}

impl ColumnRequirements for ExactLookupSpec {
    fn required_columns(&self, side: TableSide) -> Vec<(&str, ColumnRole)> {
        match side {
            TableSide::Source => tagged(&self.source_search_columns, ColumnRole::SourceSearch).collect(),
            TableSide::Lookup => tagged(&self.lookup_search_columns, ColumnRole::LookupSearch)
                .chain(tagged(&self.lookup_value_columns, ColumnRole::LookupValue))
                .collect(),
        }
    }
}

impl ColumnRequirements for HashLookupSpec {
    fn required_columns(&self, side: TableSide) -> Vec<(&str, ColumnRole)> {
        match side {
            TableSide::Source => tagged(&self.source_search_columns, ColumnRole::SourceSearch).collect(),
            TableSide::Lookup => tagged(&self.lookup_search_columns, ColumnRole::LookupSearch)
                .chain(tagged(&self.lookup_value_columns, ColumnRole::LookupValue))
                .collect(),
        }
    }
}

impl ColumnRequirements for RandomLookupSpec {
    fn required_columns(&self, side: TableSide) -> Vec<(&str, ColumnRole)> {
        match side {
            TableSide::Source => tagged(self.output_columns(), ColumnRole::Destination).collect(),
            TableSide::Lookup => tagged(&self.lookup_value_columns, ColumnRole::LookupValue).collect(),
        }
    }
}

impl ColumnRequirements for LookupSpec {
    fn required_columns(&self, side: TableSide) -> Vec<(&str, ColumnRole)> {
        match self {
            LookupSpec::Exact(spec) => spec.required_columns(side),
            LookupSpec::Random(spec) => spec.required_columns(side),
            LookupSpec::Hash(spec) => spec.required_columns(side),
        }
    }
}

/// One error per required column absent from `headers`.
pub fn check_headers(
    required: &[(&str, ColumnRole)],
    headers: &[String],
    side: TableSide,
) -> Vec<ColumnError> {
    let present: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    required
        .iter()
        .filter(|(column, _)| !present.contains(&column.trim().to_lowercase()))
        .map(|(column, role)| ColumnError {
            column: column.to_string(),
            role: *role,
            table: side,
        })
        .collect()
}

/// Check both tables concurrently and merge the results, source first.
///
/// Neither side short-circuits the other.
pub async fn validate_columns<S>(
    spec: &S,
    source_headers: &[String],
    lookup_headers: &[String],
) -> Vec<ColumnError>
where
    S: ColumnRequirements + Sync + ?Sized,
{
    let (mut errors, lookup_errors) = tokio::join!(
        async { check_headers(&spec.required_columns(TableSide::Source), source_headers, TableSide::Source) },
        async { check_headers(&spec.required_columns(TableSide::Lookup), lookup_headers, TableSide::Lookup) }
    );
    errors.extend(lookup_errors);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::dsl::{parse_function, parse_hash_lookup, parse_lookup, parse_rand_lookup};

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_one_missing_column_per_table() {
        let spec = parse_lookup("LOOKUP(c, t(x, VALUES=(z)))").unwrap();
        let errors = validate_columns(&spec, &headers(&["a", "b"]), &headers(&["x", "y"])).await;

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].table, TableSide::Source);
        assert_eq!(errors[0].column, "c");
        assert_eq!(errors[1].table, TableSide::Lookup);
        assert_eq!(errors[1].column, "z");
    }

    #[tokio::test]
    async fn test_case_insensitive_and_trimmed() {
        let spec = parse_lookup("LOOKUP(Id, DEST=(out), T(CODE, VALUES=(Label)))").unwrap();
        let errors =
            validate_columns(&spec, &headers(&[" id ", "x"]), &headers(&["code", "LABEL"])).await;
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[tokio::test]
    async fn test_destination_is_not_checked_for_exact() {
        let spec = parse_lookup("LOOKUP(id, DEST=(new_col), t(id, v))").unwrap();
        let errors = validate_columns(&spec, &headers(&["id"]), &headers(&["id", "v"])).await;
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_random_roles() {
        let spec = parse_rand_lookup("RAND_LOOKUP(t, DEST=(name, city), VALUES=(first, town))").unwrap();
        let errors = validate_columns(&spec, &headers(&["name"]), &headers(&["first"])).await;
        let msgs: Vec<String> = errors.iter().map(ToString::to_string).collect();

        assert_eq!(
            msgs,
            vec![
                "Missing destination column in source CSV: city",
                "Missing lookup value column in lookup CSV: town",
            ]
        );
    }

    #[tokio::test]
    async fn test_hash_roles_through_lookup_spec() {
        let spec = parse_function("HASH_LOOKUP(SRCSEARCH=(a, b), DEST=(d), t(LKPSEARCH=(x, y), VALUES=(v)))")
            .unwrap();
        let errors = validate_columns(&spec, &headers(&["a"]), &headers(&["y", "v"])).await;

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].role, ColumnRole::SourceSearch);
        assert_eq!(errors[0].column, "b");
        assert_eq!(errors[1].role, ColumnRole::LookupSearch);
        assert_eq!(errors[1].column, "x");
    }

    #[test]
    fn test_required_columns_order() {
        let spec = parse_hash_lookup("HASH_LOOKUP(k, DEST=(d), t(k, v))").unwrap();
        assert_eq!(
            spec.required_columns(TableSide::Lookup),
            vec![("k", ColumnRole::LookupSearch), ("v", ColumnRole::LookupValue)]
        );
    }
}
