//! Argument values and the coercion grammar applied to whole tokens.

use std::fmt;

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl Value {
    /// Coerce a raw token.
    ///
    /// Tried in order: integer, float, quoted string, `[a, b]` / `(a, b)` list, bare string.
    pub fn coerce(token: &str) -> Value {
        let trimmed = token.trim();
        if let Ok(int) = trimmed.parse::<i64>() {
            return Value::Int(int);
        }
        if looks_numeric(trimmed) {
            if let Ok(float) = trimmed.parse::<f64>() {
                return Value::Float(float);
            }
        }
        if let Some(inner) = strip_quotes(trimmed) {
            return Value::Str(inner.to_string());
        }
        if let Some(inner) = strip_delimiters(trimmed) {
            let items = inner
                .split(',')
                .map(|item| item.trim())
                .map(|item| strip_quotes(item).unwrap_or(item).trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            return Value::List(items);
        }
        Value::Str(trimmed.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// `true`/`false`, `yes`/`no` and `1`/`0` read as booleans.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Int(1) => Some(true),
            Value::Int(0) => Some(false),
            Value::Str(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "t" => Some(true),
                "false" | "no" | "n" | "f" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Elements as strings; a single scalar becomes a one-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Value::List(items) => items.clone(),
            other => vec![other.to_string()],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// True for integer or decimal literals, optionally signed and with an exponent.
///
/// Rejects words like `inf` and `nan` that `f64::from_str` would otherwise accept.
pub fn looks_numeric(token: &str) -> bool {
    let body = token.strip_prefix(['-', '+']).unwrap_or(token);
    !body.is_empty()
        && body.chars().any(|c| c.is_ascii_digit())
        && body.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '.')
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && body.parse::<f64>().is_ok()
}

fn strip_quotes(token: &str) -> Option<&str> {
    if token.len() >= 2 {
        for quote in ['\'', '"'] {
            if token.starts_with(quote) && token.ends_with(quote) {
                return Some(&token[1..token.len() - 1]);
            }
        }
    }
    None
}

fn strip_delimiters(token: &str) -> Option<&str> {
    if token.len() >= 2
        && ((token.starts_with('[') && token.ends_with(']'))
            || (token.starts_with('(') && token.ends_with(')')))
    {
        return Some(&token[1..token.len() - 1]);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_integers_before_floats() {
        assert_eq!(Value::coerce("42"), Value::Int(42));
        assert_eq!(Value::coerce("-3"), Value::Int(-3));
        assert_eq!(Value::coerce("0.25"), Value::Float(0.25));
        assert_eq!(Value::coerce("1e-4"), Value::Float(1e-4));
    }

    #[test]
    fn test_coerce_lists_and_tuples() {
        assert_eq!(
            Value::coerce("[a, b]"),
            Value::List(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            Value::coerce("(100, 50)"),
            Value::List(vec!["100".to_string(), "50".to_string()])
        );
        assert_eq!(
            Value::coerce("['x', ,\"y\"]"),
            Value::List(vec!["x".to_string(), "y".to_string()])
        );
        assert_eq!(Value::coerce("[]"), Value::List(vec![]));
    }

    #[test]
    fn test_coerce_strings() {
        assert_eq!(Value::coerce("'quoted text'"), Value::Str("quoted text".to_string()));
        assert_eq!(Value::coerce("nan"), Value::Str("nan".to_string()));
        assert_eq!(Value::coerce("iris"), Value::Str("iris".to_string()));
        assert_eq!(Value::coerce("[open"), Value::Str("[open".to_string()));
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("-3"));
        assert!(looks_numeric("+2.5"));
        assert!(looks_numeric(".5"));
        assert!(!looks_numeric("-"));
        assert!(!looks_numeric("--n"));
        assert!(!looks_numeric("-inf"));
        assert!(!looks_numeric("e5"));
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(Value::coerce("true").as_bool(), Some(true));
        assert_eq!(Value::coerce("0").as_bool(), Some(false));
        assert_eq!(Value::coerce("maybe").as_bool(), None);
    }
}
