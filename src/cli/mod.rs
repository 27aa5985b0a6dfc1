//! CLI module for bookshelf
//!
//! Provides command-line interface for:
//! - serve: Create missing collections and run the HTTP server
//! - init: Create missing collections only
//! - routes: Print the endpoint table

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, routes, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
