//! Statement splitting, case folding and shell-style tokenization.

use crate::error::ParseError;
use crate::shell::envelope::Diagnostics;

/// Note emitted when a statement is folded to lowercase.
pub const LOWERCASE_NOTE: &str = "Command will be converted to lowercase.";

/// Split a raw line into `;`-separated statements, trimmed. Blank pieces are kept.
///
/// A `;` inside single or double quotes does not separate statements.
pub fn split_statements(line: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (index, c) in line.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ';') => {
                statements.push(line[start..index].trim());
                start = index + 1;
            }
            (None, _) => {}
        }
    }
    statements.push(line[start..].trim());
    statements
}

/// Lowercase a statement, noting it when anything changed.
pub fn fold_case(statement: &str, diagnostics: &mut Diagnostics) -> String {
    if statement.chars().any(char::is_uppercase) {
        diagnostics.note(LOWERCASE_NOTE);
    }
    statement.to_lowercase()
}

/// Tokenize a statement honoring quotes, then rejoin bracketed list literals.
pub fn tokenize(statement: &str) -> Result<Vec<String>, ParseError> {
    let tokens = shell_words::split(statement)
        .map_err(|_| ParseError::UnbalancedQuotes(statement.to_string()))?;
    Ok(recombine_lists(tokens))
}

/// Merge tokens belonging to one `[ ... ]` literal, joined by a single space.
///
/// A token opens a literal when it starts with `[`, or is a flag whose `=value` part
/// starts with `[`, and does not already end with `]`. An unterminated literal absorbs
/// the rest of the statement.
pub fn recombine_lists(tokens: Vec<String>) -> Vec<String> {
    let mut combined = Vec::with_capacity(tokens.len());
    let mut open: Option<String> = None;

    for token in tokens {
        match open.take() {
            Some(mut pending) => {
                pending.push(' ');
                pending.push_str(&token);
                if token.ends_with(']') {
                    combined.push(pending);
                } else {
                    open = Some(pending);
                }
            }
            None => {
                if opens_list(&token) && !token.ends_with(']') {
                    open = Some(token);
                } else {
                    combined.push(token);
                }
            }
        }
    }

    if let Some(pending) = open {
        combined.push(pending);
    }
    combined
}

fn opens_list(token: &str) -> bool {
    if token.starts_with('[') {
        return true;
    }
    token.starts_with('-')
        && token
            .split_once('=')
            .is_some_and(|(_, value)| value.starts_with('['))
}
