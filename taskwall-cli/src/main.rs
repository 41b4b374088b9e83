//! taskwall CLI - serve the kanban board HTTP API
//!
//! Usage:
//!   taskwall serve                    # serve on 127.0.0.1:3030
//!   taskwall --debug serve            # debug logging to console
//!   RUST_LOG=taskwall=debug taskwall  # fine-grained log control

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use taskwall_server::{run_server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "taskwall",
    author,
    version,
    about = "Kanban board service backed by SQLite"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to bind the HTTP server to
    #[arg(long, default_value_t = 3030)]
    port: u16,

    /// Path to the SQLite database backing the board
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Title reported for the board aggregate
    #[arg(long, default_value = "kanban")]
    board_title: String,
}

fn init_tracing(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

async fn serve(args: ServeArgs) -> Result<()> {
    let db_path = match args.db_path {
        Some(path) => path,
        None => default_db_path().context("could not determine home directory")?,
    };

    let config = ServerConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], args.port)),
        db_path,
        board_title: args.board_title,
    };

    tracing::info!(
        db = %config.db_path.display(),
        "starting taskwall server on {}",
        config.bind_addr
    );

    run_server(config).await?;
    Ok(())
}

fn default_db_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".taskwall").join("board.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    match cli.command {
        Commands::Serve(args) => serve(args).await,
    }
}
