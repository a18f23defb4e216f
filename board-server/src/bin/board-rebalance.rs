//! Offline maintenance for a board database.
//!
//! Rewrites the order keys of one collection to short, evenly spread values.

use std::path::PathBuf;
use std::process::ExitCode;

use board_server::commands;
use board_server::config::ServerConfig;
use board_server::AppState;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "board-rebalance", about = "Rebalance order keys in a board database")]
struct Args {
    /// JSON config file; defaults apply to anything it leaves out
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Target,
}

#[derive(Subcommand, Debug)]
enum Target {
    /// Rebalance the lists of a board
    Lists {
        #[arg(long)]
        board: u32,
    },
    /// Rebalance the notes of a list
    Notes {
        #[arg(long)]
        list: u32,
    },
}

fn load_config(args: &Args) -> Result<ServerConfig, String> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(db) = &args.db {
        config = config.with_db_path(db.clone());
    }
    Ok(config)
}

async fn run(args: Args) -> Result<usize, String> {
    let config = load_config(&args)?;
    if let Some(dir) = config.log_dir.clone() {
        rolling_logger::init_logger(dir, "board-rebalance").map_err(|e| e.to_string())?;
    }

    let state = AppState::open(config).await?;
    let rewritten = match args.cmd {
        Target::Lists { board } => commands::rebalance_lists(&state, board).await?,
        Target::Notes { list } => commands::rebalance_notes(&state, list).await?,
    };
    state.close().await;
    Ok(rewritten)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(count) => {
            rolling_logger::info(&format!("Rebalanced {} keys", count));
            println!("rebalanced {} keys", count);
            ExitCode::SUCCESS
        }
        Err(e) => {
            rolling_logger::error(&format!("Rebalance failed: {}", e));
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
