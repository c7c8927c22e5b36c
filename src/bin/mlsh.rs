//! mlsh binary
//!
//! Starts the experimentation shell interactively, on a script file, or on statements
//! passed with `-c`.

use anyhow::Context;
use clap::Parser;
use mlsh::config::ConfigLoader;
use mlsh::logging::{init_logging, resolve_log_file_path, LoggingConfig};
use mlsh::session::Session;
use mlsh::shell::{Dispatcher, EditorSource, Registry, Renderer, ScriptSource, Shell};
use std::fs::File;
use std::io::{self, BufReader, Cursor};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// Interactive shell for small machine-learning experiments
#[derive(Parser, Debug)]
#[command(name = "mlsh", version)]
#[command(about = "Interactive shell for small machine-learning experimentation projects")]
struct Cli {
    /// Workspace root directory
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print results without color
    #[arg(long, default_value = "false")]
    no_color: bool,

    /// Run these `;`-separated statements and exit
    #[arg(short = 'c', conflicts_with = "script")]
    statements: Option<String>,

    /// Run statements from a file, one line at a time
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("mlsh starting");

    let session = match Session::open(cli.workspace.clone(), cli.config.clone()) {
        Ok(session) => session,
        Err(e) => {
            error!("Error opening session: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli, session) {
        error!("Shell failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli, session: Session) -> anyhow::Result<()> {
    let color = !cli.no_color && session.config().shell.color;
    let history = session.config().shell.history_path();
    let registry = Registry::standard()?;
    let mut shell = Shell::new(
        Dispatcher::new(registry),
        session,
        Renderer::new(color),
        io::stdout(),
    );

    if let Some(statements) = &cli.statements {
        shell.run(&mut ScriptSource::new(Cursor::new(statements.as_bytes())))?;
    } else if let Some(path) = &cli.script {
        let file = File::open(path)
            .with_context(|| format!("Failed to open script {}", path.display()))?;
        shell.run(&mut ScriptSource::new(BufReader::new(file)))?;
    } else {
        let mut source = EditorSource::new(history)?;
        shell.run(&mut source)?;
    }
    Ok(())
}

/// Build logging configuration from CLI args and the config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if cli.no_color {
        config.color = false;
    }

    if config.enabled && config.output == "file" {
        config.file = Some(resolve_log_file_path(
            cli.log_file.clone(),
            config.file.clone(),
            &cli.workspace,
        ));
    } else if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_logging_config_default() {
        let temp = tempfile::tempdir().unwrap();
        let ws = temp.path().to_string_lossy();
        let cli = Cli::try_parse_from(["mlsh", "--workspace", ws.as_ref()]).unwrap();
        let config = build_logging_config(&cli);
        assert!(config.enabled, "default should have logging enabled");
        assert_eq!(config.output, "file", "default output should be file");
        assert_eq!(config.level, "info", "default level should be info");
        assert!(config.file.is_some(), "file output should get a resolved path");
    }

    #[test]
    fn test_build_logging_config_quiet() {
        let temp = tempfile::tempdir().unwrap();
        let ws = temp.path().to_string_lossy();
        let cli = Cli::try_parse_from(["mlsh", "--workspace", ws.as_ref(), "--quiet"]).unwrap();
        let config = build_logging_config(&cli);
        assert!(!config.enabled, "quiet should disable logging");
    }

    #[test]
    fn test_build_logging_config_verbose_and_overrides() {
        let temp = tempfile::tempdir().unwrap();
        let ws = temp.path().to_string_lossy();
        let cli = Cli::try_parse_from([
            "mlsh",
            "--workspace",
            ws.as_ref(),
            "--verbose",
            "--log-output",
            "stderr",
            "--log-format",
            "json",
        ])
        .unwrap();
        let config = build_logging_config(&cli);
        assert_eq!(config.level, "debug", "verbose should set level to debug");
        assert_eq!(config.output, "stderr");
        assert_eq!(config.format, "json");
    }

    #[test]
    fn test_statements_and_script_conflict() {
        let result = Cli::try_parse_from(["mlsh", "-c", "listproj", "--script", "run.mlsh"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_statements_flag() {
        let cli = Cli::try_parse_from(["mlsh", "-c", "create p1 r; pcp"]).unwrap();
        assert_eq!(cli.statements.as_deref(), Some("create p1 r; pcp"));
        assert_eq!(cli.workspace, PathBuf::from("."));
    }
}
