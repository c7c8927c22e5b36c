//! Statement parser: one line of text to a [`Command`].

use crate::error::ParseError;
use crate::shell::envelope::Diagnostics;
use crate::shell::registry::Registry;
use crate::shell::tokenize::{fold_case, tokenize};
use crate::shell::value::{looks_numeric, Value};
use std::collections::BTreeMap;

/// A parsed statement: command name, positional arguments and keyword flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub positional: Vec<Value>,
    pub keywords: BTreeMap<String, Value>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional: Vec::new(),
            keywords: BTreeMap::new(),
        }
    }
}

/// Parses statements against a registry of known command names.
pub struct Parser<'a> {
    registry: &'a Registry,
    fold_case: bool,
}

impl<'a> Parser<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            fold_case: true,
        }
    }

    pub fn with_fold_case(mut self, fold_case: bool) -> Self {
        self.fold_case = fold_case;
        self
    }

    pub fn parse(&self, line: &str, diagnostics: &mut Diagnostics) -> Result<Command, ParseError> {
        let statement = if self.fold_case {
            fold_case(line, diagnostics)
        } else {
            line.to_string()
        };

        let mut tokens = tokenize(&statement)?.into_iter();
        let name = tokens.next().ok_or(ParseError::Empty)?;
        if !self.registry.exists(&name) {
            return Err(ParseError::UnknownCommand(name));
        }

        let mut command = Command::new(name);
        let rest: Vec<String> = tokens.collect();
        let mut index = 0;
        while index < rest.len() {
            let token = &rest[index];
            index += 1;

            if !is_flag(token) {
                command.positional.push(Value::coerce(token));
                continue;
            }

            let (key, inline) = split_flag(token)?;
            let raw = match inline {
                Some(value) => value,
                None => {
                    let next = rest
                        .get(index)
                        .filter(|next| !is_flag(next))
                        .ok_or_else(|| ParseError::MissingFlagValue(key.clone()))?;
                    index += 1;
                    next.clone()
                }
            };

            if command.keywords.insert(key.clone(), Value::coerce(&raw)).is_some() {
                diagnostics.warn(format!(
                    "Flag --{} given more than once; using the last value.",
                    key
                ));
            }
        }

        tracing::debug!(
            command = %command.name,
            positional = command.positional.len(),
            keywords = command.keywords.len(),
            "Parsed statement"
        );
        Ok(command)
    }
}

/// A token starting with `-` that is not a numeric literal.
pub fn is_flag(token: &str) -> bool {
    token.starts_with('-') && !looks_numeric(token)
}

/// Split `--key=value` / `-k value` into a normalised key and an optional inline value.
fn split_flag(token: &str) -> Result<(String, Option<String>), ParseError> {
    let body = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
        .unwrap_or(token);

    let (key, value) = match body.split_once('=') {
        Some((key, value)) => (key, Some(value.to_string())),
        None => (body, None),
    };

    let valid = !key.is_empty()
        && !key.starts_with('-')
        && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(ParseError::MalformedFlag(token.to_string()));
    }
    if matches!(value.as_deref(), Some("")) {
        return Err(ParseError::MissingFlagValue(key.replace('-', "_")));
    }

    Ok((key.replace('-', "_"), value))
}
