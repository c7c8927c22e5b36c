//! Property-based tests for the statement grammar and diagnostics

mod dedup;
mod grammar;
