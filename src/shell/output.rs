//! Rendering envelopes and errors to the terminal.

use crate::error::ShellError;
use crate::shell::envelope::{Diagnostics, Envelope};
use owo_colors::{AnsiColors, OwoColorize};
use std::io::{self, Write};

/// Writes envelopes as warnings, then the primary result, then notes.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn envelope(&self, out: &mut dyn Write, envelope: &Envelope) -> io::Result<()> {
        for line in envelope.warning_lines() {
            self.line(out, &format!("Warning: {}", line), envelope.colors.warning)?;
        }
        if let Some(primary) = envelope.primary_text() {
            if envelope.colors.primary == AnsiColors::Default {
                writeln!(out, "{}", primary)?;
            } else {
                self.line(out, &primary, envelope.colors.primary)?;
            }
        }
        for line in envelope.note_lines() {
            self.line(out, &format!("Note: {}", line), envelope.colors.note)?;
        }
        Ok(())
    }

    /// Diagnostics gathered before a failure, then the error itself.
    pub fn failure(
        &self,
        out: &mut dyn Write,
        diagnostics: Diagnostics,
        err: &ShellError,
    ) -> io::Result<()> {
        let gathered = Envelope::seal(Envelope::empty(), diagnostics);
        self.envelope(out, &gathered)?;
        self.line(out, &format!("Error: {}", err), AnsiColors::Red)
    }

    fn line(&self, out: &mut dyn Write, text: &str, color: AnsiColors) -> io::Result<()> {
        if self.color {
            writeln!(out, "{}", text.color(color))
        } else {
            writeln!(out, "{}", text)
        }
    }
}
