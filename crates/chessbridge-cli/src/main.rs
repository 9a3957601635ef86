use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Drive a native chess engine module from the command line.
///
/// The module is located with --module: either the shared library itself
/// or a directory holding it (and optionally an engine.toml manifest).
///
/// EXAMPLES:
///     chessbridge check --module ./engine
///     chessbridge analyze --module ./engine --depth 6
///     chessbridge moves --module ./engine --fen "<FEN>"
///     chessbridge play --module ./engine e2e4 e7e5
#[derive(Parser)]
#[command(name = "chessbridge")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log output (-v for info, -vv for debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a position
    ///
    /// Reports best move, evaluation, legal moves and game state.
    ///
    /// EXAMPLES:
    ///     chessbridge analyze --module ./engine
    ///     chessbridge analyze --module ./engine --fen "<FEN>" --json
    #[command(visible_alias = "a")]
    Analyze {
        /// Engine module (library file or directory)
        #[arg(long, short = 'm')]
        module: PathBuf,
        /// Position to analyze
        #[arg(long, default_value = commands::START_FEN)]
        fen: String,
        /// Search depth in plies
        #[arg(long, short = 'd', default_value_t = chessbridge_runtime::DEFAULT_SEARCH_DEPTH)]
        depth: u32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the legal moves of a position, one per line
    Moves {
        /// Engine module (library file or directory)
        #[arg(long, short = 'm')]
        module: PathBuf,
        /// Position to list moves for
        #[arg(long, default_value = commands::START_FEN)]
        fen: String,
    },

    /// Print the best move of a position
    Bestmove {
        /// Engine module (library file or directory)
        #[arg(long, short = 'm')]
        module: PathBuf,
        /// Position to search
        #[arg(long, default_value = commands::START_FEN)]
        fen: String,
        /// Search depth in plies
        #[arg(long, short = 'd', default_value_t = chessbridge_runtime::DEFAULT_SEARCH_DEPTH)]
        depth: u32,
    },

    /// Play moves from a position and print the resulting FEN
    ///
    /// Stops at the first move the engine rejects.
    Play {
        /// Engine module (library file or directory)
        #[arg(long, short = 'm')]
        module: PathBuf,
        /// Starting position
        #[arg(long, default_value = commands::START_FEN)]
        fen: String,
        /// Moves in coordinate notation (e.g. e2e4 e7e8q)
        #[arg(required = true)]
        moves: Vec<String>,
    },

    /// Load a module and report how its symbols were bound
    #[command(visible_alias = "c")]
    Check {
        /// Engine module (library file or directory)
        #[arg(long, short = 'm')]
        module: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            module,
            fen,
            depth,
            json,
        } => commands::analyze::run(&module, &fen, depth, json),
        Commands::Moves { module, fen } => commands::moves::run(&module, &fen),
        Commands::Bestmove { module, fen, depth } => {
            commands::bestmove::run(&module, &fen, depth)
        }
        Commands::Play { module, fen, moves } => commands::play::run(&module, &fen, &moves),
        Commands::Check { module } => commands::check::run(&module),
    }
}
