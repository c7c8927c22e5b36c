//! mlsh: an interactive shell for small machine-learning experiments.
//!
//! Statements typed at the prompt are parsed into typed actions and run against a
//! session of projects. Each project holds a data frame, the design matrix built
//! from it, cross-validated model logs and queued text plots.

pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod ml;
pub mod project;
pub mod session;
pub mod shell;
