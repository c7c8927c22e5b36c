//! Command handlers. Each takes the session first and returns an envelope for display.

pub mod data;
pub mod modelling;
pub mod plotting;
pub mod projects;
pub mod settings;
