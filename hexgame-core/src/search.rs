//! Time-bounded alpha-beta search with iterative deepening

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Coord, Trial};
use crate::clock::Deadline;
use crate::config::SearchConfig;
use crate::connectivity::is_connected;
use crate::eval::{evaluate, Heuristic, WIN_VALUE};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Boards at least this large open at the center
const CENTER_OPENING_MIN_SIZE: usize = 5;

/// Boards larger than this play their first N moves at random
const RANDOM_OPENING_MAX_SIZE: usize = 10;

// ============================================================================
// RESULTS
// ============================================================================

/// Value of a root search
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Best heuristic value found
    Ordinary(i32),
    /// The chosen move wins
    ForcedWin,
    /// The opponent has an immediate winning reply; the chosen move blocks it
    ForcedLoss,
}

impl Verdict {
    /// Proven outcome: deeper search cannot change it
    pub fn is_decisive(self) -> bool {
        match self {
            Verdict::Ordinary(v) => v == WIN_VALUE || v == -WIN_VALUE,
            Verdict::ForcedWin | Verdict::ForcedLoss => true,
        }
    }

    pub fn is_forced(self) -> bool {
        matches!(self, Verdict::ForcedWin | Verdict::ForcedLoss)
    }

    pub fn value(self) -> i32 {
        match self {
            Verdict::Ordinary(v) => v,
            Verdict::ForcedWin => WIN_VALUE,
            Verdict::ForcedLoss => -WIN_VALUE,
        }
    }
}

/// Result of a fixed-depth or iterative search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Best root move, `None` only when the board is full
    pub best_move: Option<Coord>,
    pub verdict: Verdict,
    /// Depth of the pass that produced `best_move`
    pub depth: u32,
    /// Nodes visited (all passes for iterative deepening)
    pub nodes: u64,
    /// The deadline cut the pass short
    pub interrupted: bool,
    /// Root moves whose subtree was searched to completion
    pub root_moves_searched: usize,
}

/// How a computer move was picked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveSource {
    /// Fixed opening cell near the center
    Opening,
    /// Random early move on a large board
    Random,
    /// Minimax search
    Search,
}

/// A chosen computer move
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub coord: Coord,
    pub source: MoveSource,
    pub outcome: Option<SearchOutcome>,
}

// ============================================================================
// SEARCHER
// ============================================================================

/// Alpha-beta player
#[derive(Clone, Debug)]
pub struct Searcher {
    pub heuristic: Heuristic,
    rng: ChaCha8Rng,
}

impl Searcher {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            heuristic: config.heuristic,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    pub fn with_seed(heuristic: Heuristic, seed: u64) -> Self {
        Self {
            heuristic,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Pick a move for `color`: opening policy first, then iterative deepening
    pub fn choose_move(
        &mut self,
        board: &mut Board,
        color: Color,
        max_depth: u32,
        deadline: Deadline,
    ) -> Option<Decision> {
        if let Some((coord, source)) = self.opening_move(board, board.stone_count()) {
            return Some(Decision {
                coord,
                source,
                outcome: None,
            });
        }

        let outcome = self.iterative_deepening(board, color, max_depth, deadline);
        outcome.best_move.map(|coord| Decision {
            coord,
            source: MoveSource::Search,
            outcome: Some(outcome),
        })
    }

    /// Moves that skip the search: center on the first two plies, random
    /// on the first N plies of a large board
    pub fn opening_move(&mut self, board: &Board, moves_played: usize) -> Option<(Coord, MoveSource)> {
        let n = board.size();

        if n >= CENTER_OPENING_MIN_SIZE && moves_played < 2 {
            let row = n / 2;
            let col = row - usize::from(n % 2 == 0);
            let center = Coord::new(row, col);
            if board.is_empty_at(center) {
                return Some((center, MoveSource::Opening));
            }
            let shift = 1 + usize::from(n > 5 && n % 2 == 1);
            let beside = Coord::new(row - shift, col + 1);
            if board.is_empty_at(beside) {
                return Some((beside, MoveSource::Opening));
            }
        }

        if n > RANDOM_OPENING_MAX_SIZE && moves_played < n {
            let empty: Vec<Coord> = board.empty_cells().collect();
            return empty
                .choose(&mut self.rng)
                .map(|&coord| (coord, MoveSource::Random));
        }

        None
    }

    /// Deepen from 1 to `max_depth` until a pass proves the outcome or the
    /// deadline passes.
    ///
    /// An interrupted pass only replaces the previous result when it found a
    /// forced outcome or when no earlier pass completed a root move.
    pub fn iterative_deepening(
        &self,
        board: &mut Board,
        color: Color,
        max_depth: u32,
        deadline: Deadline,
    ) -> SearchOutcome {
        let empty = board.empty_cells().count() as u32;
        let max_depth = max_depth.min(empty).max(1);
        let mut best: Option<SearchOutcome> = None;
        let mut nodes = 0;

        for depth in 1..=max_depth {
            let outcome = self.search(board, color, depth, deadline);
            nodes += outcome.nodes;

            tracing::debug!(
                "depth {}: {:?} at {:?} ({} nodes{})",
                depth,
                outcome.verdict,
                outcome.best_move,
                outcome.nodes,
                if outcome.interrupted { ", interrupted" } else { "" }
            );

            let usable = outcome.verdict.is_forced()
                || (outcome.root_moves_searched > 0 && (!outcome.interrupted || best.is_none()));
            if !usable {
                break;
            }

            let stop = outcome.interrupted || outcome.verdict.is_decisive();
            best = Some(outcome);
            if stop {
                break;
            }
        }

        let mut outcome = best.unwrap_or_else(|| {
            tracing::warn!("search deadline passed before depth 1 completed");
            self.fallback(board, color)
        });
        outcome.nodes = nodes;
        outcome
    }

    /// One minimax pass of exactly `depth` plies from the root
    pub fn search(&self, board: &mut Board, color: Color, depth: u32, deadline: Deadline) -> SearchOutcome {
        let mut pass = Pass {
            color,
            heuristic: self.heuristic,
            deadline,
            nodes: 0,
            interrupted: false,
        };
        pass.root(board, depth.max(1))
    }

    /// First empty cell, used when nothing was searched in time
    fn fallback(&self, board: &Board, color: Color) -> SearchOutcome {
        SearchOutcome {
            best_move: board.empty_cells().next(),
            verdict: Verdict::Ordinary(evaluate(board, color, self.heuristic)),
            depth: 0,
            nodes: 0,
            interrupted: true,
            root_moves_searched: 0,
        }
    }
}

/// First cell where `color` would connect immediately
pub fn immediate_win(board: &mut Board, color: Color) -> Option<Coord> {
    for index in 0..board.area() {
        let coord = board.coord_at(index);
        if !board.is_empty_at(coord) {
            continue;
        }
        let trial = Trial::place(board, coord, color);
        if is_connected(&trial, color) {
            return Some(coord);
        }
    }
    None
}

// ============================================================================
// MINIMAX WITH ALPHA-BETA
// ============================================================================

/// State for one fixed-depth pass
struct Pass {
    color: Color,
    heuristic: Heuristic,
    deadline: Deadline,
    nodes: u64,
    interrupted: bool,
}

impl Pass {
    fn outcome(&self, best_move: Option<Coord>, verdict: Verdict, depth: u32, searched: usize) -> SearchOutcome {
        SearchOutcome {
            best_move,
            verdict,
            depth,
            nodes: self.nodes,
            interrupted: self.interrupted,
            root_moves_searched: searched,
        }
    }

    /// Maximizing root: the only level that records a move
    fn root(&mut self, board: &mut Board, depth: u32) -> SearchOutcome {
        let opponent = self.color.opponent();
        let mut best_move = board.empty_cells().next();
        let mut best = -WIN_VALUE;
        let mut alpha = -WIN_VALUE;
        let mut searched = 0;

        for index in 0..board.area() {
            let coord = board.coord_at(index);
            if !board.is_empty_at(coord) {
                continue;
            }
            if self.deadline.expired() {
                self.interrupted = true;
                break;
            }
            self.nodes += 1;

            let value = {
                let mut trial = Trial::place(board, coord, self.color);
                if is_connected(&trial, self.color) {
                    WIN_VALUE
                } else {
                    if depth > 1 {
                        if let Some(reply) = immediate_win(&mut trial, opponent) {
                            // Nothing else matters until that cell is taken
                            return self.outcome(Some(reply), Verdict::ForcedLoss, depth, searched);
                        }
                    }
                    self.minimax(&mut trial, depth - 1, false, alpha, WIN_VALUE)
                }
            };

            // A child cut off by the deadline has no reliable value
            if self.interrupted {
                break;
            }
            searched += 1;

            if value > best {
                best = value;
                best_move = Some(coord);
                if value == WIN_VALUE {
                    return self.outcome(best_move, Verdict::ForcedWin, depth, searched);
                }
            }
            alpha = alpha.max(value);
        }

        let verdict = if searched == 0 {
            Verdict::Ordinary(evaluate(board, self.color, self.heuristic))
        } else {
            Verdict::Ordinary(best)
        };
        self.outcome(best_move, verdict, depth, searched)
    }

    /// Fail-soft minimax below the root, scored for the root's color
    fn minimax(&mut self, board: &mut Board, depth: u32, maximizing: bool, mut alpha: i32, mut beta: i32) -> i32 {
        self.nodes += 1;

        if depth == 0 {
            return evaluate(board, self.color, self.heuristic);
        }

        let mover = if maximizing { self.color } else { self.color.opponent() };
        let mut best: Option<i32> = None;

        for index in 0..board.area() {
            let coord = board.coord_at(index);
            if !board.is_empty_at(coord) {
                continue;
            }
            if self.deadline.expired() {
                self.interrupted = true;
                break;
            }

            let value = {
                let mut trial = Trial::place(board, coord, mover);
                self.minimax(&mut trial, depth - 1, !maximizing, alpha, beta)
            };

            if maximizing {
                best = Some(best.map_or(value, |b| b.max(value)));
                alpha = alpha.max(value);
            } else {
                best = Some(best.map_or(value, |b| b.min(value)));
                beta = beta.min(value);
            }

            if alpha >= beta {
                break;
            }
        }

        // Full board or no time: fall back to the static value
        best.unwrap_or_else(|| evaluate(board, self.color, self.heuristic))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::winner;
    use std::time::{Duration, Instant};

    fn board_with(size: usize, stones: &[(usize, usize, Color)]) -> Board {
        let mut board = Board::new(size).unwrap();
        for &(r, c, color) in stones {
            board.set(Coord::new(r, c), color).unwrap();
        }
        board
    }

    fn searcher() -> Searcher {
        Searcher::with_seed(Heuristic::ShortestPath, 42)
    }

    #[test]
    fn test_search_returns_move_and_restores_board() {
        let mut board = board_with(5, &[(2, 2, Color::White), (1, 3, Color::Black)]);
        let before = board.clone();

        let outcome = searcher().iterative_deepening(&mut board, Color::White, 2, Deadline::unbounded());

        assert_eq!(board, before);
        let mv = outcome.best_move.expect("empty cells remain");
        assert!(board.is_empty_at(mv));
        assert!(!outcome.interrupted);
        assert!(outcome.nodes > 0);
    }

    #[test]
    fn test_takes_immediate_win() {
        let mut board = board_with(
            5,
            &[
                (0, 2, Color::White),
                (1, 2, Color::White),
                (2, 2, Color::White),
                (3, 2, Color::White),
                (0, 0, Color::Black),
                (1, 0, Color::Black),
                (2, 0, Color::Black),
                (3, 0, Color::Black),
            ],
        );

        let outcome = searcher().iterative_deepening(&mut board, Color::White, 3, Deadline::unbounded());
        assert_eq!(outcome.verdict, Verdict::ForcedWin);
        assert_eq!(outcome.depth, 1);

        board.set(outcome.best_move.unwrap(), Color::White).unwrap();
        assert!(is_connected(&board, Color::White));
    }

    #[test]
    fn test_blocks_immediate_threat() {
        let mut board = board_with(
            5,
            &[
                (2, 0, Color::Black),
                (2, 1, Color::Black),
                (2, 2, Color::Black),
                (2, 3, Color::Black),
                (1, 4, Color::White),
                (0, 1, Color::White),
                (3, 3, Color::White),
            ],
        );
        let before = board.clone();

        let outcome = searcher().iterative_deepening(&mut board, Color::White, 3, Deadline::unbounded());
        assert_eq!(board, before);
        assert_eq!(outcome.verdict, Verdict::ForcedLoss);
        assert_eq!(outcome.best_move, Some(Coord::new(2, 4)));
    }

    #[test]
    fn test_zero_deadline_falls_back() {
        let mut board = board_with(7, &[(3, 3, Color::White), (2, 4, Color::Black)]);
        let before = board.clone();

        let outcome = searcher().iterative_deepening(&mut board, Color::Black, 5, Deadline::after(Duration::ZERO));
        assert_eq!(board, before);
        assert!(outcome.interrupted);
        assert_eq!(outcome.best_move, Some(Coord::new(0, 0)));
    }

    #[test]
    fn test_short_deadline_honored() {
        let mut board = board_with(9, &[(4, 4, Color::White), (3, 5, Color::Black)]);
        let before = board.clone();
        let budget = Duration::from_millis(30);

        let start = Instant::now();
        let outcome = searcher().iterative_deepening(&mut board, Color::White, 40, Deadline::after(budget));
        let spent = start.elapsed();

        assert_eq!(board, before);
        assert!(spent < budget + Duration::from_millis(500), "took {:?}", spent);
        assert!(outcome.best_move.is_some());
    }

    #[test]
    fn test_full_board_has_no_move() {
        let mut board = Board::new(4).unwrap();
        for i in 0..16 {
            let color = if (i / 4) % 2 == 0 { Color::White } else { Color::Black };
            board.set(board.coord_at(i), color).unwrap();
        }
        let mut s = searcher();
        assert!(s.choose_move(&mut board, Color::White, 3, Deadline::unbounded()).is_none());
    }

    #[test]
    fn test_center_opening() {
        let mut s = searcher();
        let board = Board::new(7).unwrap();
        assert_eq!(s.opening_move(&board, 0), Some((Coord::new(3, 3), MoveSource::Opening)));

        let board = Board::new(6).unwrap();
        assert_eq!(s.opening_move(&board, 0), Some((Coord::new(3, 2), MoveSource::Opening)));

        let board = board_with(7, &[(3, 3, Color::White)]);
        assert_eq!(s.opening_move(&board, 1), Some((Coord::new(1, 4), MoveSource::Opening)));

        let board = board_with(5, &[(2, 2, Color::White)]);
        assert_eq!(s.opening_move(&board, 1), Some((Coord::new(1, 3), MoveSource::Opening)));

        // Small boards and later plies search instead
        assert_eq!(s.opening_move(&Board::new(4).unwrap(), 0), None);
        assert_eq!(s.opening_move(&Board::new(7).unwrap(), 2), None);
    }

    #[test]
    fn test_random_opening_reproducible() {
        let board = board_with(13, &[(6, 6, Color::White), (5, 7, Color::Black)]);
        let first = searcher().opening_move(&board, 2);
        let second = searcher().opening_move(&board, 2);
        assert_eq!(first, second);

        let (coord, source) = first.unwrap();
        assert_eq!(source, MoveSource::Random);
        assert!(board.is_empty_at(coord));

        assert_eq!(searcher().opening_move(&board, 13), None);
    }

    #[test]
    fn test_verdict_decisive() {
        assert!(Verdict::ForcedWin.is_decisive());
        assert!(Verdict::ForcedLoss.is_decisive());
        assert!(Verdict::Ordinary(-WIN_VALUE).is_decisive());
        assert!(!Verdict::Ordinary(3).is_decisive());
        assert_eq!(Verdict::ForcedLoss.value(), -WIN_VALUE);
    }

    // ------------------------------------------------------------------------
    // Plain minimax reference (no pruning)
    // ------------------------------------------------------------------------

    fn plain(board: &mut Board, color: Color, depth: u32, maximizing: bool) -> i32 {
        if depth == 0 {
            return evaluate(board, color, Heuristic::ShortestPath);
        }
        let cells: Vec<Coord> = board.empty_cells().collect();
        if cells.is_empty() {
            return evaluate(board, color, Heuristic::ShortestPath);
        }
        let mover = if maximizing { color } else { color.opponent() };
        let values = cells.into_iter().map(|coord| {
            board.set(coord, mover).unwrap();
            let v = plain(board, color, depth - 1, !maximizing);
            board.clear(coord).unwrap();
            v
        });
        let values: Vec<i32> = values.collect();
        if maximizing {
            values.into_iter().max().unwrap()
        } else {
            values.into_iter().min().unwrap()
        }
    }

    fn plain_root(board: &mut Board, color: Color, depth: u32) -> (Option<Coord>, Verdict) {
        let cells: Vec<Coord> = board.empty_cells().collect();
        let mut best_move = cells.first().copied();
        let mut best = -WIN_VALUE;

        for coord in cells {
            board.set(coord, color).unwrap();
            let value = if is_connected(board, color) {
                WIN_VALUE
            } else {
                if depth > 1 {
                    if let Some(reply) = immediate_win(board, color.opponent()) {
                        board.clear(coord).unwrap();
                        return (Some(reply), Verdict::ForcedLoss);
                    }
                }
                plain(board, color, depth - 1, false)
            };
            board.clear(coord).unwrap();

            if value > best {
                best = value;
                best_move = Some(coord);
                if value == WIN_VALUE {
                    return (best_move, Verdict::ForcedWin);
                }
            }
        }

        (best_move, Verdict::Ordinary(best))
    }

    fn random_position(rng: &mut ChaCha8Rng, size: usize, empty: usize) -> Board {
        loop {
            let mut board = Board::new(size).unwrap();
            let mut cells: Vec<usize> = (0..board.area()).collect();
            cells.shuffle(rng);
            for (k, &i) in cells.iter().take(board.area() - empty).enumerate() {
                let color = if k % 2 == 0 { Color::White } else { Color::Black };
                board.set(board.coord_at(i), color).unwrap();
            }
            if winner(&board).is_none() {
                return board;
            }
        }
    }

    #[test]
    fn test_pruning_matches_plain_minimax() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let s = searcher();

        for trial in 0..24 {
            let size = if trial % 2 == 0 { 4 } else { 5 };
            let empty = rng.gen_range(5..=7);
            let mut board = random_position(&mut rng, size, empty);
            let color = if rng.gen::<bool>() { Color::White } else { Color::Black };

            for depth in 1..=4 {
                let before = board.clone();
                let outcome = s.search(&mut board, color, depth, Deadline::unbounded());
                assert_eq!(board, before);

                let expected = plain_root(&mut board, color, depth);
                assert_eq!(
                    (outcome.best_move, outcome.verdict),
                    expected,
                    "trial {} depth {}",
                    trial,
                    depth
                );
            }
        }
    }
}
