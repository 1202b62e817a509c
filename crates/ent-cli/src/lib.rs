//! Entrustory CLI library components.
//!
//! This library exposes internal CLI modules for testing purposes.

pub mod commands;
pub mod report;
pub mod runtime;
