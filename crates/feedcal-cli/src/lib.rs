//! Command-line front end for calendar feeds.
//!
//! This crate provides the `feedcal` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod secret;
pub mod session;

pub use cli::Cli;
pub use error::{CliError, CliResult};
