//! `RAND_LOOKUP(...)` parser.
//!
//! ```text
//! RAND_LOOKUP(table,
//!             DEST=(d1, d2), VALUES=(v1, v2) | column,
//!             limit,
//!             IGNORE=(col(spaces, null)), PRESERVE=(col(zero_len)))
//! ```
//!
//! A bare `column` stands for `DEST=(column), VALUES=(column)`.

use super::common::{check_arity, function_args, require, set_once, unrecognized, unsupported};
use super::spec::{BlankCondition, ConditionOption, Dialect, RandomLookupSpec};
use super::token::{classify, Keyword, Payload, Token};
use crate::error::{DslError, ParseResult};

const DIALECT: Dialect = Dialect::Random;

/// Parse a random-sample lookup function.
pub fn parse_rand_lookup(text: &str) -> ParseResult<RandomLookupSpec> {
    let args = function_args(text, DIALECT).map_err(|e| vec![e])?;

    let mut errors = Vec::new();
    let mut table_name: Option<String> = None;
    let mut columns = TargetColumns::default();
    let mut limit: Option<u32> = None;
    let mut preserve: Option<Vec<ConditionOption>> = None;
    let mut ignore: Option<Vec<ConditionOption>> = None;

    let mut args = args.iter();
    if let Some(first) = args.next() {
        match classify(first) {
            Ok(Token::Name(name)) => table_name = Some(name),
            Ok(Token::Number(n)) => table_name = Some(n.to_string()),
            Ok(_) => errors.push(DslError::grammar(format!(
                "First argument of {} must be the lookup table name, found '{}'",
                DIALECT, first
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
                Keyword::Dest => match payload.columns() {
                    Ok(cols) => columns.set_destination(cols, &mut errors),
                    Err(e) => errors.push(e),
                },
                Keyword::Values => match payload.columns() {
                    Ok(cols) => columns.set_values(cols, &mut errors),
                    Err(e) => errors.push(e),
                },
                Keyword::Preserve => match condition_options(&payload) {
                    Ok(options) => set_once(&mut preserve, options, "PRESERVE=", &mut errors),
                    Err(e) => errors.extend(e),
                },
                Keyword::Ignore => match condition_options(&payload) {
                    Ok(options) => set_once(&mut ignore, options, "IGNORE=", &mut errors),
                    Err(e) => errors.extend(e),
                },
                Keyword::SrcSearch
                | Keyword::LkpSearch
                | Keyword::Trim
                | Keyword::Algo
                | Keyword::Seed => errors.push(unsupported(keyword, DIALECT)),
            },
            Token::Number(n) => set_once(&mut limit, n, "Limit", &mut errors),
            Token::Name(name) if name.chars().all(|c| c.is_ascii_digit()) => {
                errors.push(DslError::grammar(format!(
                    "Limit '{}' is too large for {}",
                    name, DIALECT
                )))
            }
            Token::Name(name) => columns.set_shorthand(name, &mut errors),
            Token::Cache(_) => errors.push(DslError::grammar(format!(
                "CACHE/NOCACHE is not supported by {}",
                DIALECT
            ))),
            Token::Block { .. } => errors.push(unrecognized(raw, DIALECT)),
        }
    }

    let lookup_table_name = table_name.unwrap_or_else(|| {
        errors.push(DslError::MissingField {
            function: DIALECT.function_name(),
            field: "lookup table name (first argument)",
        });
        String::new()
    });
    let lookup_value_columns = require(
        columns.values,
        DIALECT,
        "lookup value column (VALUES= or a bare column name)",
        &mut errors,
    );
    let destination_columns = columns.destination.unwrap_or_default();

    check_arity(
        ("DEST", &destination_columns),
        ("VALUES", &lookup_value_columns),
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(RandomLookupSpec {
        lookup_table_name,
        destination_columns,
        lookup_value_columns,
        limit: limit.unwrap_or(0),
        preserve_options: preserve.unwrap_or_default(),
        ignore_options: ignore.unwrap_or_default(),
    })
}

/// DEST/VALUES, either explicit or through the bare-column shorthand.
#[derive(Debug, Default)]
struct TargetColumns {
    destination: Option<Vec<String>>,
    values: Option<Vec<String>>,
    shorthand: Option<String>,
}

impl TargetColumns {
    fn set_destination(&mut self, cols: Vec<String>, errors: &mut Vec<DslError>) {
        if let Some(name) = &self.shorthand {
            errors.push(mixed_shorthand(name, Keyword::Dest));
            return;
        }
        set_once(&mut self.destination, cols, "DEST=", errors);
    }

    fn set_values(&mut self, cols: Vec<String>, errors: &mut Vec<DslError>) {
        if let Some(name) = &self.shorthand {
            errors.push(mixed_shorthand(name, Keyword::Values));
            return;
        }
        set_once(&mut self.values, cols, "VALUES=", errors);
    }

    fn set_shorthand(&mut self, name: String, errors: &mut Vec<DslError>) {
        if let Some(previous) = &self.shorthand {
            errors.push(DslError::grammar(format!(
                "Only one bare column is allowed in {}, found '{}' after '{}'",
                DIALECT, name, previous
            )));
            return;
        }
        if self.destination.is_some() || self.values.is_some() {
            errors.push(DslError::grammar(format!(
                "Bare column '{}' cannot be combined with DEST= or VALUES=",
                name
            )));
            return;
        }
        self.destination = Some(vec![name.clone()]);
        self.values = Some(vec![name.clone()]);
        self.shorthand = Some(name);
    }
}

fn mixed_shorthand(name: &str, keyword: Keyword) -> DslError {
    DslError::grammar(format!(
        "{} cannot be combined with bare column '{}'",
        keyword, name
    ))
}

/// Parse `col(cond, ...)` items of a PRESERVE=/IGNORE= payload.
fn condition_options(payload: &Payload) -> Result<Vec<ConditionOption>, Vec<DslError>> {
    let mut options = Vec::new();
    let mut errors = Vec::new();

    for item in payload.items() {
        let (column, args) = match classify(item) {
            Ok(Token::Block { name, args }) => (name, args),
            Ok(_) => {
                errors.push(DslError::grammar(format!(
                    "Invalid option '{}', expected column(spaces|null|zero_len, ...)",
                    item
                )));
                continue;
            }
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        if args.is_empty() {
            errors.push(DslError::grammar(format!(
                "Option '{}' names no condition",
                column
            )));
            continue;
        }

        let mut conditions = Vec::with_capacity(args.len());
        for arg in &args {
            match arg.parse::<BlankCondition>() {
                Ok(condition) => conditions.push(condition),
                Err(bad) => errors.push(DslError::grammar(format!(
                    "Unknown condition '{}' for column '{}', expected spaces, null or zero_len",
                    bad, column
                ))),
            }
        }
        options.push(ConditionOption { column, conditions });
    }

    if errors.is_empty() {
        Ok(options)
    } else {
        Err(errors)
    }
}
