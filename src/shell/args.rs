//! Typed argument access used by command decoders.

use crate::error::ParseError;
use crate::shell::envelope::Diagnostics;
use crate::shell::parse::Command;
use crate::shell::value::Value;
use std::collections::{BTreeMap, VecDeque};

/// Consumes a [`Command`]'s arguments. Whatever is left at [`ArgReader::finish`] is reported.
#[derive(Debug)]
pub struct ArgReader {
    command: String,
    positional: VecDeque<Value>,
    keywords: BTreeMap<String, Value>,
}

impl ArgReader {
    pub fn new(command: Command) -> Self {
        Self {
            command: command.name,
            positional: command.positional.into(),
            keywords: command.keywords,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Next positional, falling back to the keyword `name`.
    pub fn next(&mut self, name: &str) -> Option<Value> {
        self.positional
            .pop_front()
            .or_else(|| self.keywords.remove(name))
    }

    pub fn required(&mut self, name: &str) -> Result<Value, ParseError> {
        self.next(name).ok_or_else(|| ParseError::MissingArgument {
            command: self.command.clone(),
            name: name.to_string(),
        })
    }

    /// A required argument rendered as text (numbers are accepted, e.g. alias `2024`).
    pub fn required_str(&mut self, name: &str) -> Result<String, ParseError> {
        match self.required(name)? {
            Value::List(_) => Err(self.invalid(name, "expected a single value, got a list")),
            value => Ok(value.to_string()),
        }
    }

    pub fn optional_str(&mut self, name: &str) -> Result<Option<String>, ParseError> {
        match self.next(name) {
            None => Ok(None),
            Some(Value::List(_)) => Err(self.invalid(name, "expected a single value, got a list")),
            Some(value) => Ok(Some(value.to_string())),
        }
    }

    /// Optional argument as a list; a scalar becomes a one-element list.
    pub fn optional_list(&mut self, name: &str) -> Option<Vec<String>> {
        self.next(name).map(|value| value.to_list())
    }

    pub fn optional_usize(&mut self, name: &str) -> Result<Option<usize>, ParseError> {
        match self.next(name) {
            None => Ok(None),
            Some(value) => self.to_usize(name, &value).map(Some),
        }
    }

    /// Keyword-only lookups: never consume positionals.
    pub fn keyword(&mut self, name: &str) -> Option<Value> {
        self.keywords.remove(name)
    }

    pub fn keyword_bool(&mut self, name: &str) -> Result<Option<bool>, ParseError> {
        match self.keywords.remove(name) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.invalid(name, &format!("expected true or false, got {}", value))),
        }
    }

    pub fn keyword_usize(&mut self, name: &str) -> Result<Option<usize>, ParseError> {
        match self.keywords.remove(name) {
            None => Ok(None),
            Some(value) => self.to_usize(name, &value).map(Some),
        }
    }

    pub fn keyword_u64(&mut self, name: &str) -> Result<Option<u64>, ParseError> {
        match self.keywords.remove(name) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .and_then(|v| u64::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| {
                    self.invalid(name, &format!("expected a non-negative integer, got {}", value))
                }),
        }
    }

    pub fn keyword_str(&mut self, name: &str) -> Option<String> {
        self.keywords.remove(name).map(|value| value.to_string())
    }

    /// Hand every remaining keyword to the caller (estimator hyperparameters).
    pub fn take_keywords(&mut self) -> BTreeMap<String, Value> {
        std::mem::take(&mut self.keywords)
    }

    /// Warn about anything no decoder consumed.
    pub fn finish(self, diagnostics: &mut Diagnostics) {
        let mut extra: Vec<String> = self.positional.iter().map(Value::to_string).collect();
        extra.extend(
            self.keywords
                .iter()
                .map(|(key, value)| format!("--{}={}", key, value)),
        );
        if !extra.is_empty() {
            diagnostics.warn(format!(
                "extra arguments {} will be ignored.",
                extra.join(", ")
            ));
        }
    }

    fn to_usize(&self, name: &str, value: &Value) -> Result<usize, ParseError> {
        value
            .as_i64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| {
                self.invalid(name, &format!("expected a non-negative integer, got {}", value))
            })
    }

    fn invalid(&self, name: &str, reason: &str) -> ParseError {
        ParseError::InvalidArgument {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
