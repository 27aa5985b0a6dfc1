//! CLI argument definitions using clap
//!
//! Commands:
//! - bookshelf serve [--host <h>] [--port <p>] [--data-dir <dir>] [--public-dir <dir>]
//! - bookshelf init [--data-dir <dir>]
//! - bookshelf routes

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bookshelf - books and users over flat JSON files
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Address to bind (overrides the default 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Directory holding the collection files (overrides DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory served as static files (overrides PUBLIC_DIR)
        #[arg(long)]
        public_dir: Option<PathBuf>,
    },

    /// Create empty collections without starting the server
    Init {
        /// Directory holding the collection files (overrides DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Print the endpoint table and exit
    Routes,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
