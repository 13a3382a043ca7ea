//! Lookup function mini-language.
//!
//! This module provides:
//! - `tokenizer`: top-level comma splitting with parenthesis depth tracking
//! - `token`: one-pass classification of raw arguments into [`Token`]s
//! - `spec`: the parsed, immutable function descriptions
//! - `exact`, `random`, `hash`: one parser per dialect
//!
//! ## Usage Flow
//!
//! ```text
//! function text → tokenizer → classify → dialect parser → LookupSpec
//! ```
//!
//! ## Example
//!
//! ```
//! use lookupmask::transform::dsl::{parse_function, Dialect};
//!
//! let spec = parse_function("RAND_LOOKUP(cities, city, 3)").unwrap();
//! assert_eq!(spec.dialect(), Dialect::Random);
//! assert_eq!(spec.lookup_table_name(), "cities");
//! ```

mod common;
pub mod exact;
pub mod hash;
pub mod random;
pub mod spec;
pub mod token;
pub mod tokenizer;

pub use exact::parse_lookup;
pub use hash::parse_hash_lookup;
pub use random::parse_rand_lookup;
pub use spec::{
    BlankCondition, ConditionOption, Dialect, ExactLookupSpec, HashLookupSpec, LookupSpec,
    RandomLookupSpec, TrimMode, DEFAULT_ALGORITHM,
};
pub use token::{classify, Keyword, Token};
pub use tokenizer::split_top_level;

use crate::error::{DslError, ParseResult};

/// Parse a function of any dialect, detected from its prefix.
pub fn parse_function(text: &str) -> ParseResult<LookupSpec> {
    match Dialect::detect(text) {
        Some(dialect) => parse_for(dialect, text),
        None if text.trim().is_empty() => {
            Err(vec![DslError::grammar("Function text cannot be empty")])
        }
        None => Err(vec![DslError::grammar(
            "Function must start with 'LOOKUP(', 'RAND_LOOKUP(' or 'HASH_LOOKUP('",
        )]),
    }
}

/// Parse `text` with one dialect's parser.
pub fn parse_for(dialect: Dialect, text: &str) -> ParseResult<LookupSpec> {
    match dialect {
        Dialect::Exact => parse_lookup(text).map(LookupSpec::Exact),
        Dialect::Random => parse_rand_lookup(text).map(LookupSpec::Random),
        Dialect::Hash => parse_hash_lookup(text).map(LookupSpec::Hash),
    }
}
