//! Top-level argument splitting.
//!
//! Lookup functions nest argument lists (`tbl(a, VALUES=(b, c))`), so a
//! plain `split(',')` is not enough: commas only separate arguments at
//! nesting depth 0.

/// Split `input` on commas that sit outside any `open`/`close` pair.
///
/// Each part is trimmed. Empty input gives an empty list. Every top-level
/// comma separates two parts, so `"a,"` yields an empty last part.
///
/// ```
/// use lookupmask::transform::dsl::tokenizer::split_top_level;
///
/// assert_eq!(split_top_level("a,(b,c),d", '(', ')'), vec!["a", "(b,c)", "d"]);
/// ```
pub fn split_top_level(input: &str, open: char, close: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut current = String::new();

    for c in input.chars() {
        if c == open {
            depth += 1;
            current.push(c);
        } else if c == close {
            depth -= 1;
            current.push(c);
        } else if c == ',' && depth == 0 {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }

    if !parts.is_empty() || !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// [`split_top_level`] with round parentheses.
pub fn split_args(input: &str) -> Vec<String> {
    split_top_level(input, '(', ')')
}

/// True when every `open` has a matching `close` and depth never goes negative.
pub fn is_balanced(input: &str, open: char, close: char) -> bool {
    let mut depth: i32 = 0;
    for c in input.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

/// Strip one pair of enclosing parentheses, if the first `(` closes at the end.
///
/// `"(a, b)"` gives `Some("a, b")`; `"(a)(b)"` and `"a"` give `None`.
pub fn unwrap_parens(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    let inner = trimmed.strip_prefix('(')?.strip_suffix(')')?;

    // The opening paren must close at the very end, not earlier.
    let mut depth: i32 = 0;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }

    (depth == 0).then(|| inner.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_respects_nesting() {
        assert_eq!(split_args("a,(b,c),d"), vec!["a", "(b,c)", "d"]);
    }

    #[test]
    fn test_split_deep_nesting() {
        let parts = split_args("id, DEST=(x, y), tbl(k, VALUES=(x, y), CACHE)");
        assert_eq!(
            parts,
            vec!["id", "DEST=(x, y)", "tbl(k, VALUES=(x, y), CACHE)"]
        );
    }

    #[test]
    fn test_split_trims_parts() {
        assert_eq!(split_args("  a ,   b  "), vec!["a", "b"]);
    }

    #[test]
    fn test_split_empty_input() {
        assert!(split_args("").is_empty());
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn test_split_keeps_empty_parts() {
        assert_eq!(split_args("a,,b"), vec!["a", "", "b"]);
        assert_eq!(split_args("a,"), vec!["a", ""]);
        assert_eq!(split_args(","), vec!["", ""]);
    }

    #[test]
    fn test_split_custom_brackets() {
        assert_eq!(split_top_level("a,[b,c]", '[', ']'), vec!["a", "[b,c]"]);
    }

    #[test]
    fn test_balance() {
        assert!(is_balanced("a,(b,(c)),d", '(', ')'));
        assert!(is_balanced("", '(', ')'));
        assert!(!is_balanced("a,(b", '(', ')'));
        assert!(!is_balanced("a),(b", '(', ')'));
    }

    #[test]
    fn test_unwrap_parens() {
        assert_eq!(unwrap_parens("(a, b)"), Some("a, b"));
        assert_eq!(unwrap_parens(" ( a ) "), Some("a"));
        assert_eq!(unwrap_parens("(x(1), y(2))"), Some("x(1), y(2)"));
        assert_eq!(unwrap_parens("(a)(b)"), None);
        assert_eq!(unwrap_parens("a"), None);
        assert_eq!(unwrap_parens("(a"), None);
    }
}
