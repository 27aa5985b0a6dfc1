//! CLI command implementations
//!
//! Configuration is resolved as defaults, then environment, then flags.

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::http_server::{HttpServer, ServerConfig, COLLECTIONS, ENDPOINTS};
use crate::store::RecordStore;

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            host,
            port,
            data_dir,
            public_dir,
        } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(dir) = public_dir {
                config.public_dir = dir;
            }
            serve(config)
        }
        Command::Init { data_dir } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            init(config.data_dir)
        }
        Command::Routes => {
            routes();
            Ok(())
        }
    }
}

/// Install the global log subscriber; `RUST_LOG` overrides the default level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be set when commands run inside tests
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Start the HTTP server and block until it stops
pub fn serve(config: ServerConfig) -> CliResult<()> {
    init_logging();
    let server = HttpServer::with_config(config);

    runtime()?.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Create every missing collection under `data_dir`
pub fn init(data_dir: PathBuf) -> CliResult<()> {
    init_logging();
    let store = RecordStore::local(&data_dir);

    runtime()?.block_on(async {
        for resource in COLLECTIONS {
            if store.initialize(resource).await? {
                info!(resource, dir = %data_dir.display(), "created");
            } else {
                info!(resource, dir = %data_dir.display(), "already present");
            }
        }
        Ok::<(), CliError>(())
    })
}

/// Print the endpoint table
pub fn routes() {
    for endpoint in ENDPOINTS {
        println!("{}", endpoint);
    }
}
