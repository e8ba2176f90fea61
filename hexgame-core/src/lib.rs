//! HEXGAME Core - Hex engine and computer player
//!
//! This crate provides the core game logic for HEXGAME:
//! - Board geometry (N×N rhombus with hexagonal adjacency)
//! - Move ledger with undo and the swap rule
//! - Connection oracle (the win test)
//! - Shortest-path and longest-chain position evaluation
//! - Time-bounded alpha-beta search with iterative deepening
//! - Game sessions with binary snapshots

pub mod board;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod eval;
pub mod ledger;
pub mod search;
pub mod session;
pub mod snapshot;

// Re-exports for convenient access
pub use board::{Board, Cell, Color, Coord, MAX_SIZE, MIN_SIZE};
pub use clock::{Deadline, TimeControl, TimeGovernor};
pub use config::{GameConfig, SearchConfig, DEFAULT_SIZE};
pub use connectivity::{is_connected, winner, winning_path};
pub use error::{GameError, Result};
pub use eval::{evaluate, Heuristic, WIN_VALUE};
pub use ledger::{Ledger, Move};
pub use search::{Decision, MoveSource, SearchOutcome, Searcher, Verdict};
pub use session::{Game, SearchReport};
pub use snapshot::Snapshot;
