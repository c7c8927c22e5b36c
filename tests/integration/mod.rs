//! Integration tests for the mlsh experimentation shell

mod config_commands;
mod ml_pipeline;
mod plotting;
mod project_lifecycle;
mod shell_session;
pub mod test_utils;

pub use test_utils::*;
