//! Task log analyzer CLI library.
//!
//! This crate provides the CLI interface for the task log analyzer.

mod cli;
pub mod commands;
mod config;
pub mod input;

pub use cli::Cli;
pub use config::Config;
