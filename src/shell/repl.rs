//! The read-dispatch-render loop and its line sources.

use crate::error::ShellError;
use crate::session::Session;
use crate::shell::envelope::Diagnostics;
use crate::shell::output::Renderer;
use crate::shell::parse::Parser;
use crate::shell::route::Dispatcher;
use crate::shell::tokenize::split_statements;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Statement that ends the session. Checked before parsing and never case folded.
pub const EXIT: &str = "exit";

/// Where lines come from: the terminal, a script file or a `-c` argument.
pub trait LineSource {
    /// Next line, or `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError>;

    fn add_history(&mut self, _line: &str) {}
}

/// Lines from any buffered reader. No prompt is printed.
pub struct ScriptSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> ScriptSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ScriptSource<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, ShellError> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| ShellError::Input(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Interactive terminal input with persistent history.
pub struct EditorSource {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl EditorSource {
    pub fn new(history: Option<PathBuf>) -> Result<Self, ShellError> {
        let mut editor = DefaultEditor::new()
            .map_err(|e| ShellError::Input(format!("Failed to start line editor: {}", e)))?;
        if let Some(path) = &history {
            if editor.load_history(path).is_err() {
                tracing::debug!(path = %path.display(), "No history loaded");
            }
        }
        Ok(Self { editor, history })
    }

    /// Write history back to disk. Failures are logged, never fatal.
    pub fn save_history(&mut self) {
        let Some(path) = &self.history else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = self.editor.save_history(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to save history");
        }
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl+C abandons the current line only
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(ShellError::Input(e.to_string())),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

impl Drop for EditorSource {
    fn drop(&mut self) {
        self.save_history();
    }
}

/// Whether the loop keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// One interactive or scripted session writing to `out`.
pub struct Shell<W: Write> {
    dispatcher: Dispatcher,
    session: Session,
    renderer: Renderer,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(dispatcher: Dispatcher, session: Session, renderer: Renderer, out: W) -> Self {
        Self {
            dispatcher,
            session,
            renderer,
            out,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Read and run lines until `exit` or end of input.
    pub fn run(&mut self, source: &mut dyn LineSource) -> Result<(), ShellError> {
        tracing::info!(workspace = %self.session.workspace_root().display(), "Shell started");
        let prompt = self.session.config().shell.prompt.clone();
        loop {
            let Some(line) = source.read_line(&prompt)? else {
                break;
            };
            if !line.trim().is_empty() {
                source.add_history(line.trim());
            }
            if self.run_line(&line)? == Flow::Stop {
                break;
            }
        }
        tracing::info!("Shell stopped");
        Ok(())
    }

    /// Run every `;`-separated statement of one line.
    ///
    /// Statement errors are rendered and swallowed; only output failures are returned.
    pub fn run_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        for statement in split_statements(line) {
            if statement == EXIT {
                return Ok(Flow::Stop);
            }
            if statement.is_empty() {
                continue;
            }
            self.run_statement(statement)?;
        }
        self.out.flush()?;
        Ok(Flow::Continue)
    }

    fn run_statement(&mut self, statement: &str) -> Result<(), ShellError> {
        let mut diagnostics = Diagnostics::new();
        let parsed = Parser::new(self.dispatcher.registry())
            .with_fold_case(self.session.config().shell.fold_case)
            .parse(statement, &mut diagnostics);
        let result = match parsed {
            Ok(command) => self
                .dispatcher
                .execute(command, &mut self.session, &mut diagnostics),
            Err(err) => Err(err.into()),
        };
        match result {
            Ok(envelope) => self.renderer.envelope(&mut self.out, &envelope)?,
            Err(err) => self.renderer.failure(&mut self.out, diagnostics, &err)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use crate::shell::registry::Registry;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn shell(temp: &TempDir) -> Shell<Vec<u8>> {
        let session = Session::new(temp.path().to_path_buf(), ShellConfig::default(), None);
        Shell::new(
            Dispatcher::new(Registry::standard().unwrap()),
            session,
            Renderer::new(false),
            Vec::new(),
        )
    }

    fn printed(shell: &Shell<Vec<u8>>) -> String {
        String::from_utf8(shell.output().clone()).unwrap()
    }

    #[test]
    fn test_exit_stops_remaining_statements() {
        let temp = TempDir::new().unwrap();
        let mut shell = shell(&temp);
        let flow = shell.run_line("create p1 regression; exit; create p2 r").unwrap();
        assert_eq!(flow, Flow::Stop);
        assert_eq!(
            printed(&shell),
            "Project created successfully. p1 is now the current project.\n"
        );
        assert!(shell.session().store.get("p2").is_none());
    }

    #[test]
    fn test_blank_statements_are_noops() {
        let temp = TempDir::new().unwrap();
        let mut shell = shell(&temp);
        assert_eq!(shell.run_line(";;").unwrap(), Flow::Continue);
        assert_eq!(printed(&shell), "");
    }

    #[test]
    fn test_errors_render_and_continue() {
        let temp = TempDir::new().unwrap();
        let mut shell = shell(&temp);
        shell.run_line("chproj Nonexistingproject; pcp").unwrap();
        assert_eq!(
            printed(&shell),
            "Note: Command will be converted to lowercase.\n\
             Error: Project nonexistingproject does not exist.\n\
             No current project set.\n"
        );
    }

    #[test]
    fn test_script_source_runs_until_eof() {
        let temp = TempDir::new().unwrap();
        let mut shell = shell(&temp);
        let mut source = ScriptSource::new(Cursor::new("create p1 r\nlistproj\n"));
        shell.run(&mut source).unwrap();
        let text = printed(&shell);
        assert!(text.contains("Projects in use: [p1]"));
    }

    #[test]
    fn test_exit_is_case_sensitive() {
        let temp = TempDir::new().unwrap();
        let mut shell = shell(&temp);
        assert_eq!(shell.run_line("EXIT").unwrap(), Flow::Continue);
        assert!(printed(&shell).contains("Error: Command exit does not exist."));
    }
}
