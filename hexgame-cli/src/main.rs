//! HEXGAME CLI - Command-line interface
//!
//! Commands:
//! - play: Play against the computer (default)
//! - match: Let the computer play itself

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexgame_cli::match_cmd::{self, MatchArgs};
use hexgame_cli::Repl;
use hexgame_core::{Color, GameConfig};

#[derive(Parser)]
#[command(name = "hexgame")]
#[command(about = "Hex against a minimax computer player")]
struct Cli {
    /// Board dimension (4-26)
    #[arg(short = 'n', long = "size")]
    size: Option<usize>,

    /// Search depth of the computer player
    #[arg(short, long)]
    difficulty: Option<u32>,

    /// Play Black; the computer opens as White
    #[arg(short, long)]
    black: bool,

    /// Enable the swap rule
    #[arg(short, long)]
    swap: bool,

    /// Seed for the computer's random opening moves
    #[arg(long)]
    seed: Option<u64>,

    /// Game settings JSON file (flags override it)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the computer on stdin/stdout
    Play,
    /// Computer vs computer
    Match(MatchArgs),
}

fn main() -> Result<()> {
    // Logs go to stderr so the board on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Match(args)) => match_cmd::run(args.clone(), cli.seed),
        Some(Commands::Play) | None => {
            let config = build_config(&cli)?;
            tracing::debug!("starting game: {:?}", config);
            let mut repl = Repl::new(config, io::stdin().lock(), io::stdout().lock())?;
            repl.run()
        }
    }
}

/// Settings file (or defaults) with command-line overrides applied
fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Some(size) = cli.size {
        config.size = size;
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if cli.black {
        config.human = Color::Black;
    }
    if cli.swap {
        config.swap_rule = true;
    }
    if let Some(seed) = cli.seed {
        config.search.seed = seed;
    }

    config.validate().context("Invalid game settings")?;
    Ok(config)
}
