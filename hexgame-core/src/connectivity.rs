//! Side-to-side connection check (the authoritative win test)

use crate::board::{Board, Cell, Color, Coord};

/// Whether `color` has joined its two sides
pub fn is_connected(board: &Board, color: Color) -> bool {
    Walk::new(board, color).run().is_some()
}

/// The connecting path, ordered from the finishing side back to the starting side
pub fn winning_path(board: &Board, color: Color) -> Option<Vec<Coord>> {
    Walk::new(board, color).run()
}

/// The color that has connected its sides, if any
pub fn winner(board: &Board) -> Option<Color> {
    [Color::White, Color::Black]
        .into_iter()
        .find(|&color| is_connected(board, color))
}

/// Cell on `color`'s starting side at position `k`
fn starting_cell(color: Color, k: usize) -> Coord {
    match color {
        Color::White => Coord::new(0, k),
        Color::Black => Coord::new(k, 0),
    }
}

fn is_finishing(board: &Board, color: Color, coord: Coord) -> bool {
    let last = board.size() - 1;
    match color {
        Color::White => coord.row == last,
        Color::Black => coord.col == last,
    }
}

/// Depth-first search state for one oracle call
struct Walk<'a> {
    board: &'a Board,
    color: Color,
    stone: Cell,
    visited: Vec<bool>,
    path: Vec<Coord>,
}

impl<'a> Walk<'a> {
    fn new(board: &'a Board, color: Color) -> Self {
        Self {
            board,
            color,
            stone: Cell::from(color),
            visited: vec![false; board.area()],
            path: Vec::new(),
        }
    }

    fn run(mut self) -> Option<Vec<Coord>> {
        for k in 0..self.board.size() {
            let start = starting_cell(self.color, k);
            if self.board.cell(start) != self.stone || self.visited[self.board.index_of(start)] {
                continue;
            }
            self.path.clear();
            if self.visit(start) {
                return Some(self.path);
            }
        }
        None
    }

    /// Returns true once a finishing cell is reached; cells on the path are
    /// appended while unwinding.
    fn visit(&mut self, coord: Coord) -> bool {
        self.visited[self.board.index_of(coord)] = true;

        let mut reached = is_finishing(self.board, self.color, coord);
        if !reached {
            let board = self.board;
            for next in board.neighbors(coord) {
                if board.cell(next) == self.stone
                    && !self.visited[board.index_of(next)]
                    && self.visit(next)
                {
                    reached = true;
                    break;
                }
            }
        }

        if reached {
            self.path.push(coord);
        }
        reached
    }
}
