//! medkg CLI library.
//!
//! Command-line interface for building per-patient knowledge graphs and
//! cohort-averaged graphs: argument parsing, TOML configuration and command
//! execution.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
