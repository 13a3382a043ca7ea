//! Parsed lookup functions.
//!
//! A parsed function is built fresh by its parser for one request and handed
//! by reference to the column validator and the join engine. Nothing here
//! is shared between requests.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// The three function dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `LOOKUP(...)`
    Exact,
    /// `RAND_LOOKUP(...)`
    Random,
    /// `HASH_LOOKUP(...)`
    Hash,
}

impl Dialect {
    /// Function name as written in the DSL.
    pub fn function_name(&self) -> &'static str {
        match self {
            Dialect::Exact => "LOOKUP",
            Dialect::Random => "RAND_LOOKUP",
            Dialect::Hash => "HASH_LOOKUP",
        }
    }

    /// Required prefix, including the opening parenthesis.
    pub fn prefix(&self) -> &'static str {
        match self {
            Dialect::Exact => "LOOKUP(",
            Dialect::Random => "RAND_LOOKUP(",
            Dialect::Hash => "HASH_LOOKUP(",
        }
    }

    /// Sub-directory for this dialect's output files.
    pub fn output_dir(&self) -> &'static str {
        match self {
            Dialect::Exact => "lookup",
            Dialect::Random => "random_lookup",
            Dialect::Hash => "hash_lookup",
        }
    }

    /// Detect the dialect from the function prefix (case-insensitive).
    pub fn detect(function: &str) -> Option<Self> {
        let text = function.trim();
        [Dialect::Random, Dialect::Hash, Dialect::Exact]
            .into_iter()
            .find(|d| starts_with_ignore_case(text, d.prefix()))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// =============================================================================
// Exact
// =============================================================================

/// `LOOKUP(src, DEST=(..), table(search, VALUES=(..)), PRESERVE=(..))`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactLookupSpec {
    pub source_search_columns: Vec<String>,
    pub destination_columns: Vec<String>,
    pub lookup_table_name: String,
    pub lookup_search_columns: Vec<String>,
    pub lookup_value_columns: Vec<String>,
    pub cache_enabled: bool,
    /// Declared but not interpreted by the engine.
    pub preserve_options: Vec<String>,
}

impl ExactLookupSpec {
    /// Output names for the projected values: DEST if given, else VALUES.
    pub fn output_columns(&self) -> &[String] {
        output_columns(&self.destination_columns, &self.lookup_value_columns)
    }
}

// =============================================================================
// Random
// =============================================================================

/// Cell states a PRESERVE/IGNORE option can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankCondition {
    Spaces,
    Null,
    ZeroLen,
}

impl FromStr for BlankCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spaces" => Ok(BlankCondition::Spaces),
            "null" => Ok(BlankCondition::Null),
            "zero_len" => Ok(BlankCondition::ZeroLen),
            other => Err(other.to_string()),
        }
    }
}

/// `column(condition, ...)` inside `PRESERVE=` / `IGNORE=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionOption {
    pub column: String,
    pub conditions: Vec<BlankCondition>,
}

/// `RAND_LOOKUP(table, DEST=(..), VALUES=(..), limit, IGNORE=(..), PRESERVE=(..))`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomLookupSpec {
    pub lookup_table_name: String,
    pub destination_columns: Vec<String>,
    pub lookup_value_columns: Vec<String>,
    pub limit: u32,
    /// Validated, not consulted by the engine.
    pub preserve_options: Vec<ConditionOption>,
    /// Validated, not consulted by the engine.
    pub ignore_options: Vec<ConditionOption>,
}

impl RandomLookupSpec {
    pub fn output_columns(&self) -> &[String] {
        output_columns(&self.destination_columns, &self.lookup_value_columns)
    }

    /// Number of draws per cell; a limit of 0 still draws once.
    pub fn draw_count(&self) -> u32 {
        self.limit.max(1)
    }
}

// =============================================================================
// Hash
// =============================================================================

/// Key normalization for the hash dialect; exactly one mode is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrimMode {
    #[default]
    None,
    Trim,
    Upper,
}

impl TrimMode {
    pub fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            TrimMode::None => Cow::Borrowed(value),
            TrimMode::Trim => Cow::Borrowed(value.trim()),
            TrimMode::Upper => Cow::Owned(value.to_uppercase()),
        }
    }
}

impl FromStr for TrimMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(TrimMode::None),
            "TRIM" => Ok(TrimMode::Trim),
            "UPPER" => Ok(TrimMode::Upper),
            other => Err(other.to_string()),
        }
    }
}

pub const DEFAULT_ALGORITHM: &str = "SHA-256";

/// `HASH_LOOKUP(src, DEST=(..), TRIM=.., ALGO=.., SEED=.., table(search, value), CACHE)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashLookupSpec {
    pub source_search_columns: Vec<String>,
    pub destination_columns: Vec<String>,
    pub lookup_table_name: String,
    pub lookup_search_columns: Vec<String>,
    pub lookup_value_columns: Vec<String>,
    pub trim_characters: TrimMode,
    pub algorithm: String,
    pub seed: Option<String>,
    pub cache_enabled: bool,
    /// Declared but not interpreted by the engine.
    pub preserve_options: Vec<String>,
}

impl Default for HashLookupSpec {
    fn default() -> Self {
        Self {
            source_search_columns: Vec::new(),
            destination_columns: Vec::new(),
            lookup_table_name: String::new(),
            lookup_search_columns: Vec::new(),
            lookup_value_columns: Vec::new(),
            trim_characters: TrimMode::None,
            algorithm: DEFAULT_ALGORITHM.to_string(),
            seed: None,
            cache_enabled: false,
            preserve_options: Vec::new(),
        }
    }
}

impl HashLookupSpec {
    pub fn output_columns(&self) -> &[String] {
        output_columns(&self.destination_columns, &self.lookup_value_columns)
    }
}

// =============================================================================
// Any dialect
// =============================================================================

/// A parsed function of any dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dialect", rename_all = "snake_case")]
pub enum LookupSpec {
    Exact(ExactLookupSpec),
    Random(RandomLookupSpec),
    Hash(HashLookupSpec),
}

impl LookupSpec {
    pub fn dialect(&self) -> Dialect {
        match self {
            LookupSpec::Exact(_) => Dialect::Exact,
            LookupSpec::Random(_) => Dialect::Random,
            LookupSpec::Hash(_) => Dialect::Hash,
        }
    }

    pub fn lookup_table_name(&self) -> &str {
        match self {
            LookupSpec::Exact(s) => &s.lookup_table_name,
            LookupSpec::Random(s) => &s.lookup_table_name,
            LookupSpec::Hash(s) => &s.lookup_table_name,
        }
    }
}

fn output_columns<'a>(destination: &'a [String], values: &'a [String]) -> &'a [String] {
    if destination.is_empty() {
        values
    } else {
        destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_dialect() {
        assert_eq!(Dialect::detect("LOOKUP(a, t(b, c))"), Some(Dialect::Exact));
        assert_eq!(Dialect::detect("  rand_lookup(t, c)"), Some(Dialect::Random));
        assert_eq!(Dialect::detect("HASH_LOOKUP(a)"), Some(Dialect::Hash));
        assert_eq!(Dialect::detect("VLOOKUP(a)"), None);
        assert_eq!(Dialect::detect(""), None);
    }

    #[test]
    fn test_output_columns_fall_back_to_values() {
        let spec = ExactLookupSpec {
            lookup_value_columns: vec!["v".into()],
            ..Default::default()
        };
        assert_eq!(spec.output_columns(), ["v"]);

        let spec = ExactLookupSpec {
            destination_columns: vec!["d".into()],
            lookup_value_columns: vec!["v".into()],
            ..Default::default()
        };
        assert_eq!(spec.output_columns(), ["d"]);
    }

    #[test]
    fn test_draw_count_at_least_one() {
        let spec = RandomLookupSpec::default();
        assert_eq!(spec.draw_count(), 1);

        let spec = RandomLookupSpec {
            limit: 5,
            ..Default::default()
        };
        assert_eq!(spec.draw_count(), 5);
    }

    #[test]
    fn test_trim_mode() {
        assert_eq!(TrimMode::None.apply(" a "), " a ");
        assert_eq!(TrimMode::Trim.apply(" a "), "a");
        assert_eq!(TrimMode::Upper.apply(" a "), " A ");
        assert_eq!("upper".parse::<TrimMode>(), Ok(TrimMode::Upper));
        assert!("LOWER".parse::<TrimMode>().is_err());
    }

    #[test]
    fn test_blank_condition_parse() {
        assert_eq!("ZERO_LEN".parse::<BlankCondition>(), Ok(BlankCondition::ZeroLen));
        assert!("empty".parse::<BlankCondition>().is_err());
    }

    #[test]
    fn test_hash_default_algorithm() {
        assert_eq!(HashLookupSpec::default().algorithm, "SHA-256");
    }
}
