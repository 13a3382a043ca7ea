//! Pieces shared by the three dialect parsers.

use super::spec::{starts_with_ignore_case, Dialect};
use super::token::{classify, Keyword, Token};
use super::tokenizer::{is_balanced, split_args};
use crate::error::DslError;

/// Check prefix and suffix, then return the top-level arguments.
pub(crate) fn function_args(text: &str, dialect: Dialect) -> Result<Vec<String>, DslError> {
    let text = text.trim();
    let prefix = dialect.prefix();

    if text.is_empty() {
        return Err(DslError::grammar("Function text cannot be empty"));
    }
    if !starts_with_ignore_case(text, prefix) {
        return Err(DslError::grammar(format!(
            "Function must start with '{}'",
            prefix
        )));
    }
    if !text.ends_with(')') {
        return Err(DslError::grammar(format!(
            "{} function must end with ')'",
            dialect
        )));
    }

    let body = text[prefix.len()..text.len() - 1].trim();
    if body.is_empty() {
        return Err(DslError::grammar(format!(
            "Function body is empty inside {}()",
            dialect
        )));
    }
    if !is_balanced(body, '(', ')') {
        return Err(DslError::grammar(format!(
            "Unbalanced parentheses inside {}()",
            dialect
        )));
    }

    Ok(split_args(body))
}

/// Store `value` unless the field was already given.
pub(crate) fn set_once<T>(slot: &mut Option<T>, value: T, field: &str, errors: &mut Vec<DslError>) {
    if slot.is_some() {
        errors.push(DslError::grammar(format!(
            "{} is specified more than once",
            field
        )));
    } else {
        *slot = Some(value);
    }
}

/// Store a column list payload, or record why it is not one.
pub(crate) fn set_columns(
    slot: &mut Option<Vec<String>>,
    payload: Result<Vec<String>, DslError>,
    keyword: Keyword,
    errors: &mut Vec<DslError>,
) {
    match payload {
        Ok(columns) => set_once(slot, columns, &keyword.to_string(), errors),
        Err(e) => errors.push(e),
    }
}

pub(crate) fn unsupported(keyword: Keyword, dialect: Dialect) -> DslError {
    DslError::grammar(format!("{} is not supported by {}", keyword, dialect))
}

pub(crate) fn unrecognized(raw: &str, dialect: Dialect) -> DslError {
    DslError::grammar(format!("Unrecognized or invalid part in {}: {}", dialect, raw.trim()))
}

/// Lookup-side fields of the exact and hash dialects.
///
/// They can arrive through the table block (`tbl(search, VALUES=(v), CACHE)`)
/// or as top-level arguments; each may be given once.
#[derive(Debug, Default)]
pub(crate) struct LookupFields {
    pub table_name: Option<String>,
    pub search_columns: Option<Vec<String>>,
    pub value_columns: Option<Vec<String>>,
    pub cache: Option<bool>,
}

impl LookupFields {
    pub fn set_cache(&mut self, enabled: bool, errors: &mut Vec<DslError>) {
        set_once(&mut self.cache, enabled, "CACHE/NOCACHE", errors);
    }

    /// Consume a `name(arg, ...)` block.
    ///
    /// The first bare name is the search column, the second the value column;
    /// `LKPSEARCH=`, `VALUES=` and cache flags may appear explicitly.
    pub fn absorb_block(&mut self, name: String, args: &[String], errors: &mut Vec<DslError>) {
        if let Some(existing) = &self.table_name {
            errors.push(DslError::grammar(format!(
                "Only one lookup table block is allowed, found '{}' after '{}'",
                name, existing
            )));
            return;
        }

        for arg in args {
            match classify(arg) {
                Ok(Token::Name(column)) => {
                    if self.search_columns.is_none() {
                        self.search_columns = Some(vec![column]);
                    } else if self.value_columns.is_none() {
                        self.value_columns = Some(vec![column]);
                    } else {
                        errors.push(DslError::grammar(format!(
                            "Unexpected extra column '{}' in lookup table block '{}'",
                            column, name
                        )));
                    }
                }
                Ok(Token::Keyed {
                    keyword: Keyword::LkpSearch,
                    payload,
                }) => set_columns(&mut self.search_columns, payload.columns(), Keyword::LkpSearch, errors),
                Ok(Token::Keyed {
                    keyword: Keyword::Values,
                    payload,
                }) => set_columns(&mut self.value_columns, payload.columns(), Keyword::Values, errors),
                Ok(Token::Cache(enabled)) => self.set_cache(enabled, errors),
                Ok(_) => errors.push(DslError::grammar(format!(
                    "Unsupported argument '{}' in lookup table block '{}'",
                    arg.trim(),
                    name
                ))),
                Err(e) => errors.push(e),
            }
        }

        self.table_name = Some(name);
    }
}

/// Record a missing-field error when `value` is absent or empty.
pub(crate) fn require<T>(
    value: Option<Vec<T>>,
    dialect: Dialect,
    field: &'static str,
    errors: &mut Vec<DslError>,
) -> Vec<T> {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            errors.push(DslError::MissingField {
                function: dialect.function_name(),
                field,
            });
            Vec::new()
        }
    }
}

/// Record an arity error when two non-empty positional lists differ in length.
pub(crate) fn check_arity(
    left: (&'static str, &[String]),
    right: (&'static str, &[String]),
    errors: &mut Vec<DslError>,
) {
    let (left_name, left_cols) = left;
    let (right_name, right_cols) = right;
    if !left_cols.is_empty() && !right_cols.is_empty() && left_cols.len() != right_cols.len() {
        errors.push(DslError::ArityMismatch {
            left: left_name,
            left_len: left_cols.len(),
            right: right_name,
            right_len: right_cols.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_args_prefix_and_suffix() {
        assert!(function_args("", Dialect::Exact).is_err());
        assert!(function_args("LOOKUP a", Dialect::Exact).is_err());
        assert!(function_args("LOOKUP(a", Dialect::Exact).is_err());
        assert!(function_args("LOOKUP()", Dialect::Exact).is_err());
        assert!(function_args("LOOKUP(a))", Dialect::Exact).is_err());
        assert!(function_args("HASH_LOOKUP(a)", Dialect::Exact).is_err());

        let args = function_args("  lookup( a , t(b, c) ) ", Dialect::Exact).unwrap();
        assert_eq!(args, vec!["a", "t(b, c)"]);
    }

    #[test]
    fn test_absorb_block_positional() {
        let mut fields = LookupFields::default();
        let mut errors = Vec::new();
        fields.absorb_block("t".into(), &["k".into(), "v".into(), "CACHE".into()], &mut errors);

        assert!(errors.is_empty());
        assert_eq!(fields.table_name.as_deref(), Some("t"));
        assert_eq!(fields.search_columns, Some(vec!["k".to_string()]));
        assert_eq!(fields.value_columns, Some(vec!["v".to_string()]));
        assert_eq!(fields.cache, Some(true));
    }

    #[test]
    fn test_absorb_block_rejects_second_block() {
        let mut fields = LookupFields::default();
        let mut errors = Vec::new();
        fields.absorb_block("t".into(), &["k".into()], &mut errors);
        fields.absorb_block("u".into(), &["k".into()], &mut errors);

        assert_eq!(errors.len(), 1);
        assert_eq!(fields.table_name.as_deref(), Some("t"));
    }

    #[test]
    fn test_absorb_block_collects_every_error() {
        let mut fields = LookupFields::default();
        let mut errors = Vec::new();
        fields.absorb_block(
            "t".into(),
            &["k".into(), "v".into(), "extra".into(), "SEED=x".into()],
            &mut errors,
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_check_arity() {
        let mut errors = Vec::new();
        let two = vec!["a".to_string(), "b".to_string()];
        let one = vec!["a".to_string()];

        check_arity(("DEST", &two), ("VALUES", &one), &mut errors);
        check_arity(("DEST", &[]), ("VALUES", &one), &mut errors);
        check_arity(("DEST", &one), ("VALUES", &one), &mut errors);
        assert_eq!(errors.len(), 1);
    }
}
