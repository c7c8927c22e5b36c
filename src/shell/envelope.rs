//! Result envelope and the per-call diagnostics collector.
//!
//! Handlers and the helpers they call push warnings and notes into a [`Diagnostics`]
//! value they receive by `&mut`. The dispatcher then moves the collector into
//! [`Envelope::seal`], so nothing emitted during one statement can leak into the next.

use comfy_table::Table;
use owo_colors::AnsiColors;
use std::collections::HashSet;
use std::fmt;

/// Warnings and notes gathered while one statement runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<String>,
    notes: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.notes.is_empty()
    }
}

/// Primary payload of an envelope.
#[derive(Debug, Clone, Default)]
pub enum Output {
    #[default]
    Empty,
    Text(String),
    Table(Table),
}

impl Output {
    pub fn is_empty(&self) -> bool {
        match self {
            Output::Empty => true,
            Output::Text(text) => text.trim().is_empty(),
            Output::Table(_) => false,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Empty => Ok(()),
            Output::Text(text) => write!(f, "{}", text),
            Output::Table(table) => write!(f, "{}", table),
        }
    }
}

/// Colors used when the envelope is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayColors {
    pub primary: AnsiColors,
    pub warning: AnsiColors,
    pub note: AnsiColors,
}

impl Default for DisplayColors {
    fn default() -> Self {
        Self {
            primary: AnsiColors::Default,
            warning: AnsiColors::Yellow,
            note: AnsiColors::Cyan,
        }
    }
}

/// Everything a command hands back for display.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    pub primary: Output,
    /// Newline-separated warning lines, never containing duplicates once sealed
    pub warning: String,
    /// Newline-separated note lines, never containing duplicates once sealed
    pub note: String,
    pub colors: DisplayColors,
}

impl Envelope {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            primary: Output::Text(text.into()),
            ..Self::default()
        }
    }

    pub fn table(table: Table) -> Self {
        Self {
            primary: Output::Table(table),
            ..Self::default()
        }
    }

    pub fn with_warning(mut self, message: impl AsRef<str>) -> Self {
        push_line(&mut self.warning, message.as_ref());
        self
    }

    pub fn with_note(mut self, message: impl AsRef<str>) -> Self {
        push_line(&mut self.note, message.as_ref());
        self
    }

    /// Fold a finished call's diagnostics into `base` and deduplicate by line.
    pub fn seal(base: impl Into<Envelope>, diagnostics: Diagnostics) -> Envelope {
        let mut envelope = base.into();
        for warning in diagnostics.warnings {
            push_line(&mut envelope.warning, &warning);
        }
        for note in diagnostics.notes {
            push_line(&mut envelope.note, &note);
        }
        envelope.warning = dedup_lines(&envelope.warning);
        envelope.note = dedup_lines(&envelope.note);
        envelope
    }

    /// Rendered primary result, if there is one.
    pub fn primary_text(&self) -> Option<String> {
        if self.primary.is_empty() {
            None
        } else {
            Some(self.primary.to_string())
        }
    }

    pub fn warning_lines(&self) -> impl Iterator<Item = &str> {
        self.warning.lines().filter(|line| !line.trim().is_empty())
    }

    pub fn note_lines(&self) -> impl Iterator<Item = &str> {
        self.note.lines().filter(|line| !line.trim().is_empty())
    }
}

impl From<String> for Envelope {
    fn from(text: String) -> Self {
        Envelope::text(text)
    }
}

impl From<&str> for Envelope {
    fn from(text: &str) -> Self {
        Envelope::text(text)
    }
}

impl From<Table> for Envelope {
    fn from(table: Table) -> Self {
        Envelope::table(table)
    }
}

impl From<Output> for Envelope {
    fn from(primary: Output) -> Self {
        Self {
            primary,
            ..Self::default()
        }
    }
}

fn push_line(buffer: &mut String, message: &str) {
    if message.trim().is_empty() {
        return;
    }
    if !buffer.is_empty() && !buffer.ends_with('\n') {
        buffer.push('\n');
    }
    buffer.push_str(message.trim_end());
}

/// Drop repeated lines, keeping the first occurrence of each.
pub fn dedup_lines(text: &str) -> String {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_deduplicates_repeated_warnings() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn("extra arguments will be ignored.");
        diagnostics.warn("extra arguments will be ignored.");
        diagnostics.note("CI: [0.9, 1.0]");

        let envelope = Envelope::seal("done", diagnostics);
        assert_eq!(envelope.warning, "extra arguments will be ignored.");
        assert_eq!(envelope.note, "CI: [0.9, 1.0]");
        assert_eq!(envelope.primary_text().as_deref(), Some("done"));
    }

    #[test]
    fn test_seal_merges_handler_and_collected_messages() {
        let base = Envelope::text("ok").with_warning("first").with_note("n1");
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn("second");
        diagnostics.warn("first");
        diagnostics.note("n1\nn2");

        let envelope = Envelope::seal(base, diagnostics);
        assert_eq!(envelope.warning_lines().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(envelope.note_lines().collect::<Vec<_>>(), vec!["n1", "n2"]);
    }

    #[test]
    fn test_empty_envelope_has_no_primary() {
        let envelope = Envelope::seal(Envelope::empty(), Diagnostics::new());
        assert!(envelope.primary_text().is_none());
        assert!(envelope.warning.is_empty());
        assert!(envelope.note.is_empty());
    }

    #[test]
    fn test_dedup_lines_skips_blank_lines() {
        assert_eq!(dedup_lines("a\n\nb\na\n"), "a\nb");
    }
}
