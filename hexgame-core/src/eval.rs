//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell, Color, Coord};
use crate::connectivity::is_connected;

/// Win value (effectively infinite). Costs and scores saturate here.
pub const WIN_VALUE: i32 = i32::MAX;

/// Static evaluation strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Difference in cells still needed to connect (default)
    #[default]
    ShortestPath,
    /// Difference in the largest same-colored group
    LongestChain,
}

/// Evaluate `board` from `perspective`'s point of view.
///
/// Returns exactly `WIN_VALUE` / `-WIN_VALUE` when a side has already
/// connected, otherwise a heuristic score where only the ordering matters.
pub fn evaluate(board: &Board, perspective: Color, heuristic: Heuristic) -> i32 {
    if is_connected(board, perspective) {
        return WIN_VALUE;
    }
    if is_connected(board, perspective.opponent()) {
        return -WIN_VALUE;
    }

    match heuristic {
        Heuristic::ShortestPath => hexes_needed_difference(board, perspective),
        Heuristic::LongestChain => longest_chain_difference(board, perspective),
    }
}

// ============================================================================
// SHORTEST PATH
// ============================================================================

/// Saturating distance addition
fn add(a: i32, b: i32) -> i32 {
    if a == WIN_VALUE || b == WIN_VALUE {
        WIN_VALUE
    } else {
        a + b
    }
}

/// Cost of stepping onto `(row, col)` for `color`, or `None` off the board
fn transition_cost(board: &Board, row: isize, col: isize, color: Color) -> Option<i32> {
    if !board.in_bounds(row, col) {
        return None;
    }
    let cell = board.cell(Coord::new(row as usize, col as usize));
    Some(match cell.color() {
        None => 1,
        Some(c) if c == color => 0,
        Some(_) => WIN_VALUE,
    })
}

/// One-pass cost matrix for a color
struct CostSweep<'a> {
    board: &'a Board,
    color: Color,
    cost: Vec<i32>,
}

impl<'a> CostSweep<'a> {
    /// Seed the starting edge with entry costs, everything else unreachable
    fn new(board: &'a Board, color: Color) -> Self {
        let n = board.size();
        let mut cost = vec![WIN_VALUE; n * n];
        for k in 0..n {
            let (row, col) = match color {
                Color::White => (0, k),
                Color::Black => (k, 0),
            };
            // The seed cell is always on the board
            cost[row * n + col] =
                transition_cost(board, row as isize, col as isize, color).unwrap_or(WIN_VALUE);
        }
        Self { board, color, cost }
    }

    fn relax(&mut self, from: Coord, dr: isize, dc: isize) {
        let row = from.row as isize + dr;
        let col = from.col as isize + dc;
        if let Some(step) = transition_cost(self.board, row, col, self.color) {
            let n = self.board.size();
            let target = row as usize * n + col as usize;
            let source = self.board.index_of(from);
            self.cost[target] = self.cost[target].min(add(self.cost[source], step));
        }
    }

    /// Cells still needed to reach the finishing edge
    fn run(mut self) -> i32 {
        let n = self.board.size();
        let blocker = Cell::from(self.color.opponent());

        for outer in 0..n {
            for inner in 0..n {
                let from = match self.color {
                    Color::White => Coord::new(outer, inner),
                    Color::Black => Coord::new(inner, outer),
                };
                if self.board.cell(from) == blocker {
                    continue;
                }
                match self.color {
                    Color::White => {
                        self.relax(from, 0, 1); // right
                        self.relax(from, 0, -1); // left
                        self.relax(from, 1, -1); // down-left
                        self.relax(from, 1, 0); // down
                    }
                    Color::Black => {
                        self.relax(from, -1, 0); // up
                        self.relax(from, 1, 0); // down
                        self.relax(from, 0, 1); // right
                        self.relax(from, -1, 1); // up-right
                    }
                }
            }
        }

        (0..n)
            .map(|k| match self.color {
                Color::White => self.cost[(n - 1) * n + k],
                Color::Black => self.cost[k * n + n - 1],
            })
            .min()
            .unwrap_or(WIN_VALUE)
    }
}

/// Number of cells `color` still needs to connect, by forward relaxation.
///
/// A single sweep in the direction of travel, so it can overestimate paths
/// that have to double back.
pub fn hexes_needed(board: &Board, color: Color) -> i32 {
    CostSweep::new(board, color).run()
}

fn hexes_needed_difference(board: &Board, perspective: Color) -> i32 {
    let own = hexes_needed(board, perspective);
    let theirs = hexes_needed(board, perspective.opponent());
    // Both lie in [0, WIN_VALUE], so the difference cannot overflow
    theirs - own
}

// ============================================================================
// LONGEST CHAIN
// ============================================================================

/// Size of the largest connected group of `color`'s stones
pub fn longest_chain(board: &Board, color: Color) -> usize {
    let stone = Cell::from(color);
    let mut visited = vec![false; board.area()];
    let mut stack = Vec::new();
    let mut best = 0;

    for start in 0..board.area() {
        if visited[start] || board.cells()[start] != stone {
            continue;
        }
        visited[start] = true;
        stack.push(board.coord_at(start));
        let mut size = 0;

        while let Some(coord) = stack.pop() {
            size += 1;
            for next in board.neighbors(coord) {
                let i = board.index_of(next);
                if !visited[i] && board.cells()[i] == stone {
                    visited[i] = true;
                    stack.push(next);
                }
            }
        }

        best = best.max(size);
    }

    best
}

fn longest_chain_difference(board: &Board, perspective: Color) -> i32 {
    longest_chain(board, perspective) as i32 - longest_chain(board, perspective.opponent()) as i32
}
