//! Game session: board, move ledger, side to move and the computer player

use std::path::Path;
use std::time::Duration;

use crate::board::{Board, Color, Coord};
use crate::clock::{Deadline, TimeGovernor};
use crate::config::{validate_difficulty, GameConfig};
use crate::connectivity;
use crate::error::{GameError, Result};
use crate::ledger::{Ledger, Move};
use crate::search::{MoveSource, SearchOutcome, Searcher};
use crate::snapshot::Snapshot;

/// What the computer played and how it got there
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub mv: Move,
    pub source: MoveSource,
    /// Present when the move came from a search
    pub outcome: Option<SearchOutcome>,
    pub budget: Duration,
    pub elapsed: Duration,
}

/// A single game between a human and the computer
#[derive(Clone, Debug)]
pub struct Game {
    config: GameConfig,
    board: Board,
    ledger: Ledger,
    to_move: Color,
    searcher: Searcher,
    governor: TimeGovernor,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            board: Board::new(config.size)?,
            ledger: Ledger::new(),
            to_move: Color::White,
            searcher: Searcher::new(&config.search),
            governor: TimeGovernor::new(config.time.clone()),
            config,
        })
    }

    /// Start over with new settings; the current game is kept if they are invalid
    pub fn restart(&mut self, config: GameConfig) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn human(&self) -> Color {
        self.config.human
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    pub fn is_human_turn(&self) -> bool {
        self.to_move == self.config.human
    }

    pub fn winner(&self) -> Option<Color> {
        connectivity::winner(&self.board)
    }

    pub fn is_over(&self) -> bool {
        self.winner().is_some()
    }

    /// Winner and its connecting path, from the starting side to the finishing side
    pub fn winning_path(&self) -> Option<(Color, Vec<Coord>)> {
        let color = self.winner()?;
        let mut path = connectivity::winning_path(&self.board, color)?;
        path.reverse();
        Some((color, path))
    }

    // ------------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------------

    /// Place a stone for `color`, which must be the side to move
    pub fn apply_move(&mut self, color: Color, coord: Coord) -> Result<Move> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if color != self.to_move {
            return Err(GameError::WrongTurn {
                expected: self.to_move,
                got: color,
            });
        }
        self.board.set(coord, color)?;
        let mv = self.ledger.append(coord, color);
        self.to_move = color.opponent();
        Ok(mv)
    }

    /// Human move
    pub fn play(&mut self, coord: Coord) -> Result<Move> {
        self.apply_move(self.config.human, coord)
    }

    /// Computer move under the game clock at the configured difficulty
    pub fn request_computer_move(&mut self) -> Result<SearchReport> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if self.is_human_turn() {
            return Err(GameError::UnavailableFeature("cont"));
        }
        let deadline = self
            .governor
            .next_deadline(self.board.size(), self.board.stone_count());
        let report = self.engine_move(self.config.difficulty, deadline)?;
        self.governor.record(report.elapsed);
        Ok(report)
    }

    /// Let the engine play for the side to move, whoever controls it
    pub fn engine_move(&mut self, depth: u32, deadline: Deadline) -> Result<SearchReport> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let color = self.to_move;
        let decision = self
            .searcher
            .choose_move(&mut self.board, color, depth, deadline)
            .ok_or(GameError::GameOver)?;
        let elapsed = deadline.elapsed();
        let mv = self.apply_move(color, decision.coord)?;

        tracing::info!(
            "{} plays {} ({:?}, {:.2}s of {:.2}s)",
            color,
            mv.coord,
            decision.source,
            elapsed.as_secs_f64(),
            deadline.budget().as_secs_f64()
        );

        Ok(SearchReport {
            mv,
            source: decision.source,
            outcome: decision.outcome,
            budget: deadline.budget(),
            elapsed,
        })
    }

    /// Best move for the human, searched under the full per-move limit
    pub fn suggest(&mut self) -> Result<Coord> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if !self.is_human_turn() {
            return Err(GameError::UnavailableFeature("suggest"));
        }
        let deadline = Deadline::after(self.governor.control().suggestion_budget());
        let outcome = self.searcher.iterative_deepening(
            &mut self.board,
            self.config.human,
            self.config.difficulty,
            deadline,
        );
        outcome.best_move.ok_or(GameError::GameOver)
    }

    /// Take back exactly one ply
    pub fn retract_last(&mut self) -> Result<Move> {
        let mv = *self.ledger.last().ok_or(GameError::EmptyLedger)?;
        self.board.clear(mv.coord)?;
        self.ledger.remove_last()?;
        self.to_move = mv.color;
        Ok(mv)
    }

    /// Take back the human's last move along with any computer reply.
    ///
    /// Leaves the side that made the earliest retracted move to play, or
    /// White when the board empties. A loaded position keeps its own side.
    pub fn undo_last(&mut self) -> Result<Vec<Move>> {
        let last = *self.ledger.last().ok_or(GameError::EmptyLedger)?;
        let human = self.config.human;
        if self.ledger.len() == 1 && last.color != human {
            return Err(GameError::NoPriorMove);
        }

        let plies = if last.color == human { 1 } else { 2 };
        let mut removed = Vec::with_capacity(plies);
        for _ in 0..plies {
            removed.push(self.retract_last()?);
        }

        if self.board.stone_count() == 0 {
            self.to_move = Color::White;
        }
        Ok(removed)
    }

    /// Mirror the opponent's opening stone and take it over
    pub fn try_swap(&mut self) -> Result<Move> {
        let first = match self.ledger.first() {
            Some(&mv)
                if self.config.swap_rule
                    && self.ledger.len() == 1
                    && mv.color == self.to_move.opponent() =>
            {
                mv
            }
            _ => return Err(GameError::InvalidSwapState),
        };
        // A loaded position may already hold a stone on the mirrored cell
        let target = first.coord.transposed();
        if target != first.coord && !self.board.is_empty_at(target) {
            return Err(GameError::InvalidSwapState);
        }

        let (old, new) = self.ledger.swap_first()?;
        self.board.clear(old.coord)?;
        self.board.set(new.coord, new.color)?;
        self.to_move = new.color.opponent();
        Ok(new)
    }

    pub fn swap_available(&self) -> bool {
        self.config.swap_rule && !self.ledger.swapped()
    }

    // ------------------------------------------------------------------------
    // Settings and persistence
    // ------------------------------------------------------------------------

    pub fn set_difficulty(&mut self, difficulty: u32) -> Result<()> {
        validate_difficulty(difficulty, self.board.size())?;
        self.config.difficulty = difficulty;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.board.clone(), self.to_move)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.snapshot().write_to(path)?;
        tracing::debug!("saved {}x{} position to {}", self.size(), self.size(), path.display());
        Ok(())
    }

    /// Replace the position with a saved one; the ledger and clock start fresh
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let snapshot = Snapshot::read_from(path)?;
        self.restore(snapshot);
        tracing::debug!("loaded {}x{} position from {}", self.size(), self.size(), path.display());
        Ok(())
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        let size = snapshot.board.size();
        self.config.size = size;
        self.config.difficulty = self.config.difficulty.min((size * size) as u32);
        self.board = snapshot.board;
        self.to_move = snapshot.to_move;
        self.ledger.clear();
        self.governor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(size: usize) -> Game {
        Game::new(GameConfig::with_size(size)).unwrap()
    }

    fn black_game(size: usize) -> Game {
        Game::new(GameConfig::with_size(size).with_human(Color::Black).with_swap_rule(true)).unwrap()
    }

    #[test]
    fn test_new_game() {
        let g = game(7);
        assert_eq!(g.size(), 7);
        assert_eq!(g.to_move(), Color::White);
        assert!(g.ledger().is_empty());
        assert!(g.is_human_turn());
        assert!(Game::new(GameConfig::with_size(30)).is_err());

        let mut copy = g.clone();
        copy.play(Coord::new(3, 3)).unwrap();
        assert!(g.ledger().is_empty());
        assert!(format!("{:?}", copy).starts_with("Game {"));
    }

    #[test]
    fn test_apply_and_retract_restore_state() {
        let mut g = game(5);
        g.play(Coord::new(2, 2)).unwrap();
        let board = g.board().clone();
        let ledger = g.ledger().clone();
        let to_move = g.to_move();

        g.apply_move(Color::Black, Coord::new(1, 3)).unwrap();
        let mv = g.retract_last().unwrap();

        assert_eq!(mv, Move::new(Coord::new(1, 3), Color::Black));
        assert_eq!(g.board(), &board);
        assert_eq!(g.ledger(), &ledger);
        assert_eq!(g.to_move(), to_move);
    }

    #[test]
    fn test_move_errors() {
        let mut g = game(5);
        assert!(matches!(
            g.apply_move(Color::Black, Coord::new(0, 0)),
            Err(GameError::WrongTurn { expected: Color::White, got: Color::Black })
        ));
        assert!(matches!(g.play(Coord::new(5, 0)), Err(GameError::InvalidCoordinate { .. })));

        g.play(Coord::new(0, 0)).unwrap();
        assert!(matches!(
            g.apply_move(Color::Black, Coord::new(0, 0)),
            Err(GameError::OccupiedCell(_))
        ));
        // Failed moves leave the turn unchanged
        assert_eq!(g.to_move(), Color::Black);
        assert_eq!(g.ledger().len(), 1);
    }

    #[test]
    fn test_game_over_blocks_moves() {
        let mut g = game(4);
        for r in 0..3 {
            g.apply_move(Color::White, Coord::new(r, 1)).unwrap();
            g.apply_move(Color::Black, Coord::new(r, 3)).unwrap();
        }
        g.apply_move(Color::White, Coord::new(3, 1)).unwrap();

        assert_eq!(g.winner(), Some(Color::White));
        let (color, path) = g.winning_path().unwrap();
        assert_eq!(color, Color::White);
        let expected: Vec<_> = (0..4).map(|r| Coord::new(r, 1)).collect();
        assert_eq!(path, expected);

        assert!(matches!(g.apply_move(Color::Black, Coord::new(3, 3)), Err(GameError::GameOver)));
        assert!(matches!(g.request_computer_move(), Err(GameError::GameOver)));
    }

    #[test]
    fn test_computer_move_needs_its_turn() {
        let mut g = game(5);
        assert!(matches!(g.request_computer_move(), Err(GameError::UnavailableFeature(_))));

        g.play(Coord::new(0, 0)).unwrap();
        let report = g.request_computer_move().unwrap();
        assert_eq!(report.mv.color, Color::Black);
        assert_eq!(report.source, MoveSource::Opening);
        assert_eq!(report.mv.coord, Coord::new(2, 2));
        assert_eq!(g.to_move(), Color::White);
        assert!(matches!(g.suggest(), Ok(_)));
    }

    #[test]
    fn test_suggest_leaves_board() {
        let mut g = black_game(5);
        assert!(matches!(g.suggest(), Err(GameError::UnavailableFeature(_))));
        g.apply_move(Color::White, Coord::new(2, 2)).unwrap();
        let before = g.board().clone();

        let coord = g.suggest().unwrap();
        assert_eq!(g.board(), &before);
        assert!(g.board().is_empty_at(coord));
        assert_eq!(g.ledger().len(), 1);
    }

    #[test]
    fn test_undo_removes_reply_and_move() {
        let mut g = game(5);
        assert!(matches!(g.undo_last(), Err(GameError::EmptyLedger)));

        g.play(Coord::new(0, 0)).unwrap();
        g.request_computer_move().unwrap();
        let removed = g.undo_last().unwrap();

        assert_eq!(removed.len(), 2);
        assert!(g.ledger().is_empty());
        assert_eq!(g.board().stone_count(), 0);
        assert_eq!(g.to_move(), Color::White);
    }

    #[test]
    fn test_undo_needs_human_move() {
        let mut g = black_game(5);
        g.request_computer_move().unwrap();
        assert!(matches!(g.undo_last(), Err(GameError::NoPriorMove)));

        g.play(Coord::new(0, 0)).unwrap();
        let removed = g.undo_last().unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(g.ledger().len(), 1);
        assert_eq!(g.to_move(), Color::Black);
    }

    #[test]
    fn test_swap_once() {
        let mut g = black_game(5);
        g.apply_move(Color::White, Coord::new(0, 1)).unwrap();

        let mv = g.try_swap().unwrap();
        assert_eq!(mv, Move::new(Coord::new(1, 0), Color::Black));
        assert_eq!(g.board().cell(Coord::new(1, 0)), crate::board::Cell::Black);
        assert!(g.board().is_empty_at(Coord::new(0, 1)));
        assert_eq!(g.to_move(), Color::White);
        assert!(matches!(g.try_swap(), Err(GameError::InvalidSwapState)));

        // Undoing the swapped stone re-arms the rule
        g.undo_last().unwrap();
        assert!(g.ledger().is_empty());
        assert_eq!(g.to_move(), Color::White);
        assert!(g.swap_available());
        g.apply_move(Color::White, Coord::new(3, 1)).unwrap();
        assert!(g.try_swap().is_ok());
    }

    #[test]
    fn test_swap_requires_rule_and_single_move() {
        let mut g = Game::new(GameConfig::with_size(5).with_human(Color::Black)).unwrap();
        g.apply_move(Color::White, Coord::new(0, 1)).unwrap();
        assert!(matches!(g.try_swap(), Err(GameError::InvalidSwapState)));

        let mut g = black_game(5);
        assert!(matches!(g.try_swap(), Err(GameError::InvalidSwapState)));
        g.apply_move(Color::White, Coord::new(0, 1)).unwrap();
        g.apply_move(Color::Black, Coord::new(2, 2)).unwrap();
        assert!(matches!(g.try_swap(), Err(GameError::InvalidSwapState)));
    }

    #[test]
    fn test_set_difficulty() {
        let mut g = game(4);
        g.set_difficulty(16).unwrap();
        assert_eq!(g.difficulty(), 16);
        assert!(g.set_difficulty(17).is_err());
        assert!(g.set_difficulty(0).is_err());
        assert_eq!(g.difficulty(), 16);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("hexgame-session-{}.bin", std::process::id()));
        let mut g = game(6);
        g.play(Coord::new(1, 1)).unwrap();
        g.apply_move(Color::Black, Coord::new(2, 3)).unwrap();
        g.save(&path).unwrap();

        let mut other = game(9);
        other.set_difficulty(70).unwrap();
        other.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(other.board(), g.board());
        assert_eq!(other.to_move(), Color::White);
        assert_eq!(other.size(), 6);
        assert_eq!(other.config().size, 6);
        assert_eq!(other.difficulty(), 36);
        assert!(other.ledger().is_empty());
    }

    #[test]
    fn test_failed_load_keeps_game() {
        let path = std::env::temp_dir().join(format!("hexgame-session-bad-{}.bin", std::process::id()));
        std::fs::write(&path, [5u8, b'w', b'n']).unwrap();

        let mut g = game(5);
        g.play(Coord::new(0, 0)).unwrap();
        let before = g.board().clone();

        assert!(matches!(g.load(&path), Err(GameError::PersistenceFormat(_))));
        std::fs::remove_file(&path).ok();
        assert_eq!(g.board(), &before);
        assert_eq!(g.ledger().len(), 1);
        assert_eq!(g.to_move(), Color::Black);
    }

    #[test]
    fn test_undo_after_load_keeps_loaded_side() {
        let mut board = Board::new(5).unwrap();
        board.set(Coord::new(0, 0), Color::White).unwrap();
        let mut g = Game::new(GameConfig::with_size(5).with_human(Color::Black)).unwrap();
        g.restore(Snapshot::new(board.clone(), Color::Black));

        g.play(Coord::new(1, 1)).unwrap();
        g.request_computer_move().unwrap();
        let removed = g.undo_last().unwrap();

        assert_eq!(removed.len(), 2);
        assert_eq!(g.board(), &board);
        assert!(g.ledger().is_empty());
        assert_eq!(g.to_move(), Color::Black);
    }

    #[test]
    fn test_swap_onto_occupied_mirror_is_rejected() {
        let mut board = Board::new(5).unwrap();
        board.set(Coord::new(3, 1), Color::Black).unwrap();
        board.set(Coord::new(4, 4), Color::White).unwrap();
        let mut g = black_game(5);
        g.restore(Snapshot::new(board, Color::White));

        g.apply_move(Color::White, Coord::new(1, 3)).unwrap();
        let board_before = g.board().clone();
        let ledger_before = g.ledger().clone();

        assert!(matches!(g.try_swap(), Err(GameError::InvalidSwapState)));
        assert_eq!(g.board(), &board_before);
        assert_eq!(g.ledger(), &ledger_before);
        assert!(!g.ledger().swapped());
        assert_eq!(g.to_move(), Color::Black);
        assert!(g.swap_available());
    }
}
