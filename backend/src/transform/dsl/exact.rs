//! `LOOKUP(...)` parser.
//!
//! ```text
//! LOOKUP(src | SRCSEARCH=(a, b),
//!        DEST=(d1, d2),
//!        table(search | LKPSEARCH=(x, y), value | VALUES=(v1, v2), CACHE),
//!        PRESERVE=(opt, ...))
//! ```

use super::common::{
    check_arity, function_args, require, set_columns, unrecognized, unsupported, LookupFields,
};
use super::spec::{Dialect, ExactLookupSpec};
use super::token::{classify, Keyword, Token};
use crate::error::{DslError, ParseResult};

const DIALECT: Dialect = Dialect::Exact;

/// Parse an exact-match lookup function.
///
/// Every defect found is reported; parsing does not stop at the first one.
///
/// ```
/// use lookupmask::transform::dsl::parse_lookup;
///
/// let spec = parse_lookup("LOOKUP(id, DEST=(val), tbl(id, VALUES=(val)))").unwrap();
/// assert_eq!(spec.lookup_table_name, "tbl");
/// assert_eq!(spec.lookup_value_columns, vec!["val"]);
/// ```
pub fn parse_lookup(text: &str) -> ParseResult<ExactLookupSpec> {
    let args = function_args(text, DIALECT).map_err(|e| vec![e])?;

    let mut errors = Vec::new();
    let mut source: Option<Vec<String>> = None;
    let mut destination: Option<Vec<String>> = None;
    let mut preserve: Option<Vec<String>> = None;
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
                "First argument must be a column name or SRCSEARCH=(...), found '{}'",
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
                Keyword::Trim | Keyword::Algo | Keyword::Seed | Keyword::Ignore => {
                    errors.push(unsupported(keyword, DIALECT))
                }
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
    let destination_columns = destination.unwrap_or_default();

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

    Ok(ExactLookupSpec {
        source_search_columns,
        destination_columns,
        lookup_table_name,
        lookup_search_columns,
        lookup_value_columns,
        cache_enabled: lookup.cache.unwrap_or(false),
        preserve_options: preserve.unwrap_or_default(),
    })
}
