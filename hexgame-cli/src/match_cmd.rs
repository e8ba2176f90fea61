//! Match command - computer plays itself
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use hexgame_core::{Color, Deadline, Game, GameConfig, Heuristic};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Clone, Debug)]
pub struct MatchArgs {
    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Board dimension
    #[arg(long, default_value = "7")]
    pub size: usize,

    /// Search depth for White
    #[arg(long, default_value = "2")]
    pub white_depth: u32,

    /// Search depth for Black
    #[arg(long, default_value = "2")]
    pub black_depth: u32,

    /// Thinking time per move, in milliseconds
    #[arg(long, default_value = "500")]
    pub move_ms: u64,

    /// Use the longest-chain evaluation instead of shortest path
    #[arg(long)]
    pub longest_chain: bool,

    /// Play games on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    winner: Option<Color>,
    moves: usize,
    path_len: usize,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    white_wins: usize,
    black_wins: usize,
    unfinished: usize,
    avg_moves: f32,
    finished_at: DateTime<Local>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// This function reads like a table of contents:
/// 1. Check the settings
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    GameConfig::with_size(args.size)
        .with_difficulty(args.white_depth.max(args.black_depth))
        .validate()
        .context("Invalid match settings")?;

    tracing::info!(
        "Starting match: {} games on {}x{} (depth {} vs {}, {}ms per move)",
        args.games,
        args.size,
        args.size,
        args.white_depth,
        args.black_depth,
        args.move_ms
    );

    let results = play_match(&args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(args: &MatchArgs, seed: Option<u64>) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let seeds: Vec<u64> = (0..args.games).map(|_| rng.gen()).collect();
    let progress = create_progress(args.games, args.json);

    let play = |(index, &seed): (usize, &u64)| {
        let record = play_single_game(args, index + 1, seed);
        progress.inc(1);
        record
    };

    let games: Vec<GameRecord> = if args.parallel {
        seeds.par_iter().enumerate().map(play).collect::<Result<_>>()?
    } else {
        seeds.iter().enumerate().map(play).collect::<Result<_>>()?
    };
    progress.finish_and_clear();

    for record in &games {
        tracing::info!(
            "Game {}: {:?} after {} moves",
            record.game_number,
            record.winner,
            record.moves
        );
    }

    Ok(compute_match_statistics(games))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one computer-vs-computer game to completion
fn play_single_game(args: &MatchArgs, game_number: usize, seed: u64) -> Result<GameRecord> {
    let mut config = GameConfig::with_size(args.size)
        .with_difficulty(args.white_depth.max(args.black_depth))
        .with_seed(seed);
    if args.longest_chain {
        config.search.heuristic = Heuristic::LongestChain;
    }
    let mut game = Game::new(config)?;
    let budget = Duration::from_millis(args.move_ms);

    while !game.is_over() {
        let depth = match game.to_move() {
            Color::White => args.white_depth,
            Color::Black => args.black_depth,
        };
        game.engine_move(depth, Deadline::after(budget))
            .with_context(|| format!("Game {} stopped", game_number))?;
    }

    let (winner, path_len) = match game.winning_path() {
        Some((color, path)) => (Some(color), path.len()),
        None => (None, 0),
    };

    Ok(GameRecord {
        game_number,
        winner,
        moves: game.ledger().len(),
        path_len,
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let white_wins = games
        .iter()
        .filter(|g| g.winner == Some(Color::White))
        .count();
    let black_wins = games
        .iter()
        .filter(|g| g.winner == Some(Color::Black))
        .count();
    let unfinished = games.iter().filter(|g| g.winner.is_none()).count();

    let total_moves: usize = games.iter().map(|g| g.moves).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        games,
        white_wins,
        black_wins,
        unfinished,
        avg_moves,
        finished_at: Local::now(),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Game counter on stderr, hidden for JSON output
fn create_progress(games: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(games as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} games ({elapsed_precise})") {
        bar.set_style(style);
    }
    bar
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        winner: Option<Color>,
        moves: usize,
        path_len: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        white_wins: usize,
        black_wins: usize,
        unfinished: usize,
        avg_moves: f32,
        white_win_rate: f32,
        finished_at: DateTime<Local>,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        total_games: total,
        white_wins: results.white_wins,
        black_wins: results.black_wins,
        unfinished: results.unfinished,
        avg_moves: results.avg_moves,
        white_win_rate: percent(results.white_wins, total) / 100.0,
        finished_at: results.finished_at,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                winner: g.winner,
                moves: g.moves,
                path_len: g.path_len,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ({}) ===", results.finished_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Total games: {}", total);
    println!(
        "White wins:  {} ({:.1}%)",
        results.white_wins,
        percent(results.white_wins, total)
    );
    println!(
        "Black wins:  {} ({:.1}%)",
        results.black_wins,
        percent(results.black_wins, total)
    );
    if results.unfinished > 0 {
        println!("Unfinished:  {}", results.unfinished);
    }
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        match game.winner {
            Some(color) => println!(
                "  Game {}: {} wins in {} moves (path of {})",
                game.game_number, color, game.moves, game.path_len
            ),
            None => println!("  Game {}: unfinished after {} moves", game.game_number, game.moves),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
