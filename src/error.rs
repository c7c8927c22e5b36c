//! Error types for the mlsh experimentation shell.

use thiserror::Error;

/// Errors raised while turning a statement into a typed command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Command must be first argument. Empty commands are not allowed.")]
    Empty,

    #[error("Command {0} does not exist.")]
    UnknownCommand(String),

    #[error("Flag {0} requires a value.")]
    MissingFlagValue(String),

    #[error("Malformed flag: {0}")]
    MalformedFlag(String),

    #[error("Unbalanced quotes in statement: {0}")]
    UnbalancedQuotes(String),

    #[error("Missing required argument '{name}' for command {command}.")]
    MissingArgument { command: String, name: String },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },
}

/// Persistence-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unexpected file {0} in project directory.")]
    UnexpectedFile(String),
}

impl From<csv::Error> for StorageError {
    fn from(err: csv::Error) -> Self {
        StorageError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Errors surfaced by shell commands.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// Business-rule violations: unknown project, missing data, wrong project type.
    #[error("{0}")]
    Validation(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),
}

impl ShellError {
    pub fn validation(message: impl Into<String>) -> Self {
        ShellError::Validation(message.into())
    }
}

impl From<config::ConfigError> for ShellError {
    fn from(err: config::ConfigError) -> Self {
        ShellError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::Storage(StorageError::IoError(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_bare() {
        let err = ShellError::validation("Project p1 not found.");
        assert_eq!(err.to_string(), "Project p1 not found.");
    }

    #[test]
    fn test_unknown_command_names_command() {
        let err: ShellError = ParseError::UnknownCommand("frobnicate".to_string()).into();
        assert!(err.to_string().contains("frobnicate"));
    }
}
