//! Square Hex board with hexagonal adjacency

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Smallest supported board dimension
pub const MIN_SIZE: usize = 4;

/// Largest supported board dimension (one column letter per column)
pub const MAX_SIZE: usize = 26;

/// Neighbor offsets (drow, dcol) in enumeration order.
/// Index: 0=down, 1=right, 2=left, 3=down-left, 4=up, 5=up-right
pub const NEIGHBOR_OFFSETS: [(isize, isize); 6] = [
    (1, 0),   // down
    (0, 1),   // right
    (0, -1),  // left
    (1, -1),  // down-left
    (-1, 0),  // up
    (-1, 1),  // up-right
];

/// Player color.
///
/// White connects the top row to the bottom row and moves first; Black
/// connects the left column to the right column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Single-byte tag used by the board snapshot format
    pub fn tag(self) -> u8 {
        match self {
            Color::White => b'w',
            Color::Black => b'b',
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'w' => Some(Color::White),
            b'b' => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("White"),
            Color::Black => f.write_str("Black"),
        }
    }
}

/// State of a single cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    White,
    Black,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::White => Some(Color::White),
            Cell::Black => Some(Color::Black),
        }
    }

    /// Snapshot tag: `n` for empty, otherwise the color tag
    pub fn tag(self) -> u8 {
        self.color().map_or(b'n', Color::tag)
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'n' => Some(Cell::Empty),
            _ => Color::from_tag(tag).map(Cell::from),
        }
    }
}

impl From<Color> for Cell {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Cell::White,
            Color::Black => Cell::Black,
        }
    }
}

/// Zero-based board coordinates.
///
/// The textual form is the column letter followed by the 1-based row,
/// so `Coord::new(1, 2)` prints as `C2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Reflect across the board diagonal (used by the swap rule)
    pub fn transposed(self) -> Self {
        Self::new(self.col, self.row)
    }

    /// Parse `<letter><number>` notation such as `C2` or `K11`.
    ///
    /// Only the syntax is checked here; bounds depend on the board.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let letter = chars.next()?;
        if !letter.is_ascii_uppercase() {
            return None;
        }
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let row: usize = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(Self::new(row - 1, (letter as u8 - b'A') as usize))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = (b'A' + self.col as u8) as char;
        write!(f, "{}{}", letter, self.row + 1)
    }
}

/// N×N grid of cells, stored row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board of the given dimension
    pub fn new(size: usize) -> Result<Self> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GameError::Configuration(format!(
                "board dimension {} outside [{}, {}]",
                size, MIN_SIZE, MAX_SIZE
            )));
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
        })
    }

    /// Build a board from row-major cells (length must be `size * size`)
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Result<Self> {
        let mut board = Self::new(size)?;
        if cells.len() != board.cells.len() {
            return Err(GameError::Configuration(format!(
                "expected {} cells, got {}",
                board.cells.len(),
                cells.len()
            )));
        }
        board.cells = cells;
        Ok(board)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        let n = self.size as isize;
        (0..n).contains(&row) && (0..n).contains(&col)
    }

    fn check(&self, coord: Coord) -> Result<usize> {
        if coord.row < self.size && coord.col < self.size {
            Ok(self.index_of(coord))
        } else {
            Err(GameError::invalid_coordinate(coord.row as isize, coord.col as isize))
        }
    }

    /// Checked cell lookup
    pub fn get(&self, coord: Coord) -> Result<Cell> {
        self.check(coord).map(|i| self.cells[i])
    }

    /// Cell lookup for coordinates already known to be on the board
    pub fn cell(&self, coord: Coord) -> Cell {
        self.cells[self.index_of(coord)]
    }

    pub fn is_empty_at(&self, coord: Coord) -> bool {
        self.cell(coord).is_empty()
    }

    /// Place a stone on an empty cell
    pub fn set(&mut self, coord: Coord, color: Color) -> Result<()> {
        let index = self.check(coord)?;
        if !self.cells[index].is_empty() {
            return Err(GameError::OccupiedCell(coord));
        }
        self.cells[index] = Cell::from(color);
        Ok(())
    }

    /// Remove a stone, returning its color
    pub fn clear(&mut self, coord: Coord) -> Result<Color> {
        let index = self.check(coord)?;
        let color = self.cells[index]
            .color()
            .ok_or_else(|| GameError::invalid_coordinate(coord.row as isize, coord.col as isize))?;
        self.cells[index] = Cell::Empty;
        Ok(color)
    }

    /// Unchecked write used by speculative search
    pub(crate) fn put(&mut self, coord: Coord, cell: Cell) {
        let index = self.index_of(coord);
        self.cells[index] = cell;
    }

    /// In-bounds neighbors in the fixed order down, right, left, down-left, up, up-right
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        let row = coord.row as isize;
        let col = coord.col as isize;
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let (r, c) = (row + dr, col + dc);
            self.in_bounds(r, c).then(|| Coord::new(r as usize, c as usize))
        })
    }

    pub fn index_of(&self, coord: Coord) -> usize {
        coord.row * self.size + coord.col
    }

    pub fn coord_at(&self, index: usize) -> Coord {
        Coord::new(index / self.size, index % self.size)
    }

    /// Empty cells in row-major order
    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(i, _)| self.coord_at(i))
    }

    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row of cells
    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }
}

/// A speculative stone that is lifted again when the guard drops.
///
/// Search code reaches the board through the guard, so every exit path
/// (return, cutoff, deadline) restores the cell.
pub(crate) struct Trial<'a> {
    board: &'a mut Board,
    coord: Coord,
}

impl<'a> Trial<'a> {
    /// `coord` must be empty
    pub(crate) fn place(board: &'a mut Board, coord: Coord, color: Color) -> Self {
        debug_assert!(board.is_empty_at(coord));
        board.put(coord, Cell::from(color));
        Self { board, coord }
    }
}

impl Deref for Trial<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Trial<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        self.board.put(self.coord, Cell::Empty);
    }
}
