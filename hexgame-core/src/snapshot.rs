//! Binary game snapshot: dimension byte, side-to-move tag, then one tag per cell
//!
//! Layout: `[N][w|b][N*N bytes of n|w|b]`, cells row-major. The move
//! ledger is not stored.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::board::{Board, Cell, Color, MAX_SIZE, MIN_SIZE};
use crate::error::{GameError, Result};

/// A restorable position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub to_move: Color,
}

impl Snapshot {
    pub fn new(board: Board, to_move: Color) -> Self {
        Self { board, to_move }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.board.area());
        bytes.push(self.board.size() as u8);
        bytes.push(self.to_move.tag());
        bytes.extend(self.board.cells().iter().map(|cell| cell.tag()));
        bytes
    }

    /// Parse a snapshot, rejecting bad dimensions, unknown tags, truncation
    /// and trailing bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (&size, rest) = bytes
            .split_first()
            .ok_or_else(|| GameError::PersistenceFormat("missing board dimension".into()))?;
        let size = size as usize;
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GameError::PersistenceFormat(format!(
                "board dimension {} outside [{}, {}]",
                size, MIN_SIZE, MAX_SIZE
            )));
        }

        let (&tag, cells) = rest
            .split_first()
            .ok_or_else(|| GameError::PersistenceFormat("missing side to move".into()))?;
        let to_move = Color::from_tag(tag)
            .ok_or_else(|| GameError::PersistenceFormat(format!("bad side-to-move tag {:#04x}", tag)))?;

        let area = size * size;
        if cells.len() < area {
            return Err(GameError::PersistenceFormat(format!(
                "expected {} cells, found {}",
                area,
                cells.len()
            )));
        }
        if cells.len() > area {
            return Err(GameError::PersistenceFormat(format!(
                "{} trailing bytes",
                cells.len() - area
            )));
        }

        let cells = cells
            .iter()
            .enumerate()
            .map(|(i, &tag)| {
                Cell::from_tag(tag).ok_or_else(|| {
                    GameError::PersistenceFormat(format!("bad cell tag {:#04x} at offset {}", tag, i + 2))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let board = Board::from_cells(size, cells)?;
        Ok(Self { board, to_move })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(&self.encode())?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;
        Self::decode(&bytes)
    }
}
