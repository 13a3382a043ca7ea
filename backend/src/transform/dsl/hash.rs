//! `HASH_LOOKUP(...)` parser.
//!
//! ```text
//! HASH_LOOKUP(src | SRCSEARCH=(a, b),
//!             DEST=(d),
//!             TRIM=NONE|TRIM|UPPER, ALGO=SHA-256, SEED=salt,
//!             table(search, value), CACHE|NOCACHE,
//!             PRESERVE=(opt, ...))
//! ```
//!
//! `DEST` and the table block are required; everything else is optional.

use super::common::{
    check_arity, function_args, require, set_columns, set_once, unrecognized, unsupported,
    LookupFields,
};
use super::spec::{Dialect, HashLookupSpec, TrimMode, DEFAULT_ALGORITHM};
use super::token::{classify, Keyword, Payload, Token};
use crate::error::{DslError, ParseResult};

const DIALECT: Dialect = Dialect::Hash;

/// Parse a hash-mediated lookup function.
pub fn parse_hash_lookup(text: &str) -> ParseResult<HashLookupSpec> {
    let args = function_args(text, DIALECT).map_err(|e| vec![e])?;

    let mut errors = Vec::new();
    let mut source: Option<Vec<String>> = None;
    let mut destination: Option<Vec<String>> = None;
    let mut preserve: Option<Vec<String>> = None;
    let mut trim: Option<TrimMode> = None;
    let mut algorithm: Option<String> = None;
    let mut seed: Option<String> = None;
    let mut lookup = LookupFields::default();

    let mut args = args.iter();
    if let Some(first) = args.next() {
        match classify(first) {
            Ok(Token::Name(column)) => source = Some(vec![column]),
            Ok(Token::Keyed {
                keyword: Keyword::SrcSearch,
                payload,
            }) => set_columns(&mut source, payload.columns(), Keyword::SrcSearch, &mut errors),
            Ok(_) => errors.push(DslError::grammar(format!(
                "First token must be a column name or SRCSEARCH=(...). Found: {}",
                first
            ))),
            Err(e) => errors.push(e),
        }
    }

    for raw in args {
        let token = match classify(raw) {
            Ok(token) => token,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        match token {
            Token::Keyed { keyword, payload } => match keyword {
                Keyword::SrcSearch => {
                    set_columns(&mut source, payload.columns(), keyword, &mut errors)
                }
                Keyword::Dest => {
                    set_columns(&mut destination, payload.columns(), keyword, &mut errors)
                }
                Keyword::LkpSearch => set_columns(
                    &mut lookup.search_columns,
                    payload.columns(),
                    keyword,
                    &mut errors,
                ),
                Keyword::Values => set_columns(
                    &mut lookup.value_columns,
                    payload.columns(),
                    keyword,
                    &mut errors,
                ),
                Keyword::Preserve => set_columns(
                    &mut preserve,
                    Ok(payload.items().to_vec()),
                    keyword,
                    &mut errors,
                ),
                Keyword::Trim => match parse_trim(&payload) {
                    Ok(mode) => set_once(&mut trim, mode, "TRIM=", &mut errors),
                    Err(e) => errors.push(e),
                },
                Keyword::Algo => match payload.single() {
                    Ok(name) => set_once(&mut algorithm, name.to_string(), "ALGO=", &mut errors),
                    Err(e) => errors.push(e),
                },
                Keyword::Seed => {
                    set_once(&mut seed, payload.raw().to_string(), "SEED=", &mut errors)
                }
                Keyword::Ignore => errors.push(unsupported(keyword, DIALECT)),
            },
            Token::Cache(enabled) => lookup.set_cache(enabled, &mut errors),
            Token::Block { name, args } => lookup.absorb_block(name, &args, &mut errors),
            Token::Number(_) | Token::Name(_) => errors.push(unrecognized(raw, DIALECT)),
        }
    }

    let source_search_columns = require(
        source,
        DIALECT,
        "source search column (first argument or SRCSEARCH=)",
        &mut errors,
    );
    let destination_columns = require(destination, DIALECT, "destination columns (DEST=)", &mut errors);
    let lookup_table_name = lookup.table_name.unwrap_or_else(|| {
        errors.push(DslError::MissingField {
            function: DIALECT.function_name(),
            field: "lookup table block table(search, value)",
        });
        String::new()
    });
    let lookup_search_columns = require(
        lookup.search_columns,
        DIALECT,
        "lookup search column (LKPSEARCH=)",
        &mut errors,
    );
    let lookup_value_columns = require(
        lookup.value_columns,
        DIALECT,
        "lookup value column (VALUES=)",
        &mut errors,
    );

    check_arity(
        ("DEST", &destination_columns),
        ("VALUES", &lookup_value_columns),
        &mut errors,
    );
    check_arity(
        ("SRCSEARCH", &source_search_columns),
        ("LKPSEARCH", &lookup_search_columns),
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(HashLookupSpec {
        source_search_columns,
        destination_columns,
        lookup_table_name,
        lookup_search_columns,
        lookup_value_columns,
        trim_characters: trim.unwrap_or_default(),
        algorithm: algorithm.unwrap_or_else(|| DEFAULT_ALGORITHM.to_string()),
        seed,
        cache_enabled: lookup.cache.unwrap_or(false),
        preserve_options: preserve.unwrap_or_default(),
    })
}

fn parse_trim(payload: &Payload) -> Result<TrimMode, DslError> {
    let value = payload.single()?;
    value.parse().map_err(|_| {
        DslError::grammar(format!(
            "Invalid TRIM= value '{}', expected NONE, TRIM or UPPER",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_function() {
        let spec = parse_hash_lookup(
            "HASH_LOOKUP(email, DEST=(alias), TRIM=UPPER, ALGO=SHA-512, SEED=s3cr3t, \
             users(email, alias), CACHE, PRESERVE=(nulls))",
        )
        .unwrap();

        assert_eq!(spec.source_search_columns, vec!["email"]);
        assert_eq!(spec.destination_columns, vec!["alias"]);
        assert_eq!(spec.trim_characters, TrimMode::Upper);
        assert_eq!(spec.algorithm, "SHA-512");
        assert_eq!(spec.seed.as_deref(), Some("s3cr3t"));
        assert_eq!(spec.lookup_table_name, "users");
        assert_eq!(spec.lookup_search_columns, vec!["email"]);
        assert_eq!(spec.lookup_value_columns, vec!["alias"]);
        assert!(spec.cache_enabled);
        assert_eq!(spec.preserve_options, vec!["nulls"]);
    }

    #[test]
    fn test_defaults() {
        let spec = parse_hash_lookup("HASH_LOOKUP(id, DEST=(v), t(id, v))").unwrap();

        assert_eq!(spec.trim_characters, TrimMode::None);
        assert_eq!(spec.algorithm, DEFAULT_ALGORITHM);
        assert_eq!(spec.seed, None);
        assert!(!spec.cache_enabled);
    }

    #[test]
    fn test_srcsearch_first_token() {
        let spec = parse_hash_lookup(
            "HASH_LOOKUP(SRCSEARCH=(a, b), DEST=(v), t(LKPSEARCH=(x, y), VALUES=(v)))",
        )
        .unwrap();
        assert_eq!(spec.source_search_columns, vec!["a", "b"]);
        assert_eq!(spec.lookup_search_columns, vec!["x", "y"]);
    }

    #[test]
    fn test_dest_is_required() {
        let errors = parse_hash_lookup("HASH_LOOKUP(id, t(id, v))").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("DEST="));
    }

    #[test]
    fn test_invalid_trim_mode() {
        let errors = parse_hash_lookup("HASH_LOOKUP(id, DEST=(v), TRIM=LOWER, t(id, v))").unwrap_err();
        assert!(errors[0].to_string().contains("LOWER"));
    }

    #[test]
    fn test_trim_modes_are_exclusive() {
        let errors =
            parse_hash_lookup("HASH_LOOKUP(id, DEST=(v), TRIM=TRIM, TRIM=UPPER, t(id, v))")
                .unwrap_err();
        assert!(errors[0].to_string().contains("TRIM= is specified more than once"));
    }

    #[test]
    fn test_bad_first_token_and_missing_source() {
        let errors = parse_hash_lookup("HASH_LOOKUP(t(id, v), DEST=(v))").unwrap_err();
        let msgs: Vec<String> = errors.iter().map(ToString::to_string).collect();

        assert!(msgs[0].starts_with("First token must be"));
        assert!(msgs.iter().any(|m| m.contains("source search column")));
        assert!(msgs.iter().any(|m| m.contains("lookup table block")));
    }

    #[test]
    fn test_ignore_not_supported() {
        let errors =
            parse_hash_lookup("HASH_LOOKUP(id, DEST=(v), IGNORE=(v(null)), t(id, v))").unwrap_err();
        assert!(errors[0].to_string().contains("IGNORE= is not supported by HASH_LOOKUP"));
    }

    #[test]
    fn test_case_sensitivity_of_prefix() {
        assert!(parse_hash_lookup("hash_lookup(id, dest=(v), t(id, v))").is_ok());
    }
}
