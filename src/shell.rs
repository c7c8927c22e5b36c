//! Shell core: statement grammar, command registry, dispatch and the interactive loop.
//! Handlers live in `commands`; this module only parses, routes and renders.

pub mod action;
pub mod args;
pub mod envelope;
pub mod help;
pub mod output;
pub mod parse;
pub mod registry;
pub mod repl;
pub mod route;
pub mod tokenize;
pub mod value;

pub use envelope::{Diagnostics, Envelope, Output};
pub use output::Renderer;
pub use parse::{Command, Parser};
pub use registry::Registry;
pub use repl::{EditorSource, Flow, LineSource, ScriptSource, Shell};
pub use route::Dispatcher;
