//! Token classification.
//!
//! Every raw argument produced by the tokenizer is classified once into a
//! [`Token`]; the dialect parsers then match on it instead of re-testing
//! string prefixes.

use std::fmt;

use super::tokenizer::{is_balanced, split_args, unwrap_parens};
use crate::error::DslError;

/// Recognized `KEY=` names (case-insensitive in function text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    SrcSearch,
    Dest,
    Trim,
    Algo,
    Seed,
    Preserve,
    Ignore,
    Values,
    LkpSearch,
}

impl Keyword {
    pub const ALL: [Keyword; 9] = [
        Keyword::SrcSearch,
        Keyword::Dest,
        Keyword::Trim,
        Keyword::Algo,
        Keyword::Seed,
        Keyword::Preserve,
        Keyword::Ignore,
        Keyword::Values,
        Keyword::LkpSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::SrcSearch => "SRCSEARCH",
            Keyword::Dest => "DEST",
            Keyword::Trim => "TRIM",
            Keyword::Algo => "ALGO",
            Keyword::Seed => "SEED",
            Keyword::Preserve => "PRESERVE",
            Keyword::Ignore => "IGNORE",
            Keyword::Values => "VALUES",
            Keyword::LkpSearch => "LKPSEARCH",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.as_str())
    }
}

/// Right-hand side of `KEY=value` or `KEY=(a, b)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    keyword: Keyword,
    raw: String,
    items: Vec<String>,
}

impl Payload {
    /// Unwrapped text: `a, b` for `(a, b)`, `a` for `a`.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The payload as a column list; every item must be a plain name.
    pub fn columns(&self) -> Result<Vec<String>, DslError> {
        match self
            .items
            .iter()
            .find(|item| item.contains(['(', ')', '=']))
        {
            Some(bad) => Err(DslError::grammar(format!(
                "Malformed {} payload: '{}' is not a column name",
                self.keyword, bad
            ))),
            None => Ok(self.items.clone()),
        }
    }

    /// The payload as exactly one value.
    pub fn single(&self) -> Result<&str, DslError> {
        match self.items.as_slice() {
            [only] => Ok(only),
            _ => Err(DslError::grammar(format!(
                "{} takes exactly one value, found '{}'",
                self.keyword, self.raw
            ))),
        }
    }
}

/// One classified argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `KEY=value` / `KEY=(a, b)`
    Keyed { keyword: Keyword, payload: Payload },
    /// `CACHE` (true) or `NOCACHE` (false)
    Cache(bool),
    /// A run of digits
    Number(u32),
    /// `name(arg, ...)`
    Block { name: String, args: Vec<String> },
    /// A bare column or table name
    Name(String),
}

/// Classify one trimmed argument.
pub fn classify(raw: &str) -> Result<Token, DslError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DslError::grammar("Empty argument (check for doubled commas)"));
    }
    if !is_balanced(text, '(', ')') {
        return Err(DslError::grammar(format!(
            "Unbalanced parentheses in '{}'",
            text
        )));
    }

    let eq = text.find('=');
    let paren = text.find('(');

    match (eq, paren) {
        (Some(eq), paren) if paren.map_or(true, |p| eq < p) => classify_keyed(text, eq),
        (_, Some(paren)) => classify_block(text, paren),
        _ => Ok(classify_word(text)),
    }
}

fn classify_keyed(text: &str, eq: usize) -> Result<Token, DslError> {
    let key = text[..eq].trim();
    let value = text[eq + 1..].trim();

    let keyword = Keyword::from_name(key).ok_or_else(|| {
        DslError::grammar(format!("Unrecognized keyword '{}' in '{}'", key, text))
    })?;

    if value.is_empty() {
        return Err(DslError::grammar(format!(
            "Missing value for {} in '{}'",
            keyword, text
        )));
    }

    let (raw, items) = if value.starts_with('(') {
        let inner = unwrap_parens(value).ok_or_else(|| {
            DslError::grammar(format!(
                "Malformed {} payload '{}', expected {}(col1, col2)",
                keyword,
                value,
                keyword.as_str()
            ))
        })?;
        let items = split_args(inner);
        if items.is_empty() {
            return Err(DslError::grammar(format!("Empty list in {}", keyword)));
        }
        if items.iter().any(|item| item.is_empty()) {
            return Err(DslError::grammar(format!(
                "Empty column name in {}({})",
                keyword, inner
            )));
        }
        (inner.to_string(), items)
    } else {
        (value.to_string(), vec![value.to_string()])
    };

    Ok(Token::Keyed {
        keyword,
        payload: Payload {
            keyword,
            raw,
            items,
        },
    })
}

fn classify_block(text: &str, paren: usize) -> Result<Token, DslError> {
    let name = text[..paren].trim();
    let malformed = || {
        DslError::grammar(format!(
            "Malformed block '{}', expected name(arg1, arg2, ...)",
            text
        ))
    };

    if name.is_empty() {
        return Err(DslError::grammar(format!(
            "Missing name before '(' in '{}'",
            text
        )));
    }
    let inner = unwrap_parens(&text[paren..]).ok_or_else(malformed)?;

    Ok(Token::Block {
        name: name.to_string(),
        args: split_args(inner),
    })
}

fn classify_word(text: &str) -> Token {
    if text.eq_ignore_ascii_case("CACHE") {
        return Token::Cache(true);
    }
    if text.eq_ignore_ascii_case("NOCACHE") {
        return Token::Cache(false);
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = text.parse() {
            return Token::Number(n);
        }
    }
    Token::Name(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(raw: &str) -> (Keyword, Payload) {
        match classify(raw).unwrap() {
            Token::Keyed { keyword, payload } => (keyword, payload),
            other => panic!("expected keyed token, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_case_insensitive() {
        assert_eq!(Keyword::from_name("srcsearch"), Some(Keyword::SrcSearch));
        assert_eq!(Keyword::from_name(" Values "), Some(Keyword::Values));
        assert_eq!(Keyword::from_name("LIMIT"), None);
    }

    #[test]
    fn test_keyed_list() {
        let (keyword, payload) = keyed("DEST=(a, b ,c)");
        assert_eq!(keyword, Keyword::Dest);
        assert_eq!(payload.items(), ["a", "b", "c"]);
        assert_eq!(payload.raw(), "a, b ,c");
    }

    #[test]
    fn test_keyed_bare_value_is_single_item() {
        let (keyword, payload) = keyed("dest = city");
        assert_eq!(keyword, Keyword::Dest);
        assert_eq!(payload.columns().unwrap(), vec!["city"]);
        assert_eq!(payload.single().unwrap(), "city");
    }

    #[test]
    fn test_keyed_nested_items() {
        let (_, payload) = keyed("IGNORE=(name(spaces,null), zip(zero_len))");
        assert_eq!(payload.items(), ["name(spaces,null)", "zip(zero_len)"]);
        assert!(payload.columns().is_err());
    }

    #[test]
    fn test_keyed_errors() {
        assert!(classify("FOO=(a)").is_err());
        assert!(classify("DEST=").is_err());
        assert!(classify("DEST=()").is_err());
        assert!(classify("DEST=(a,,b)").is_err());
        assert!(classify("DEST=(a)(b)").is_err());
        assert!(classify("DEST=(a").is_err());
    }

    #[test]
    fn test_single_rejects_lists() {
        let (_, payload) = keyed("ALGO=(SHA-256, SHA-512)");
        let err = payload.single().unwrap_err();
        assert!(err.to_string().contains("ALGO="));
    }

    #[test]
    fn test_block() {
        let token = classify("customers(id, VALUES=(name, city), CACHE)").unwrap();
        assert_eq!(
            token,
            Token::Block {
                name: "customers".into(),
                args: vec!["id".into(), "VALUES=(name, city)".into(), "CACHE".into()],
            }
        );
    }

    #[test]
    fn test_block_errors() {
        assert!(classify("(a, b)").is_err());
        assert!(classify("tbl(a) extra").is_err());
    }

    #[test]
    fn test_flags_numbers_and_names() {
        assert_eq!(classify("cache").unwrap(), Token::Cache(true));
        assert_eq!(classify("NOCACHE").unwrap(), Token::Cache(false));
        assert_eq!(classify("42").unwrap(), Token::Number(42));
        assert_eq!(classify("first_name").unwrap(), Token::Name("first_name".into()));
        // Too large for a limit: kept as a name so the dialect can reject it.
        assert_eq!(
            classify("99999999999").unwrap(),
            Token::Name("99999999999".into())
        );
    }

    #[test]
    fn test_empty_argument() {
        assert!(classify("   ").is_err());
    }
}
