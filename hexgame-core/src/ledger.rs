//! Ordered record of the moves played in a game

use serde::{Deserialize, Serialize};

use crate::board::{Color, Coord};
use crate::error::{GameError, Result};

/// A stone placed by a player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub coord: Coord,
    pub color: Color,
}

impl Move {
    pub const fn new(coord: Coord, color: Color) -> Self {
        Self { coord, color }
    }
}

/// Moves in play order.
///
/// The ledger only tracks coordinates; keeping the board in step with it is
/// the session's job.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    moves: Vec<Move>,
    swapped: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, coord: Coord, color: Color) -> Move {
        let mv = Move::new(coord, color);
        self.moves.push(mv);
        mv
    }

    /// Remove and return the most recent move
    pub fn remove_last(&mut self) -> Result<Move> {
        let mv = self.moves.pop().ok_or(GameError::EmptyLedger)?;
        if self.moves.is_empty() {
            // The swapped stone is gone, so the rule can apply again
            self.swapped = false;
        }
        Ok(mv)
    }

    /// Apply the swap rule to the single opening move.
    ///
    /// Returns the replaced move and its mirrored, recolored replacement.
    pub fn swap_first(&mut self) -> Result<(Move, Move)> {
        if self.swapped || self.moves.len() != 1 {
            return Err(GameError::InvalidSwapState);
        }
        let old = self.moves[0];
        let new = Move::new(old.coord.transposed(), old.color.opponent());
        self.moves[0] = new;
        self.swapped = true;
        Ok((old, new))
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn first(&self) -> Option<&Move> {
        self.moves.first()
    }

    /// Whether the swap rule has been applied to the current opening move
    pub fn swapped(&self) -> bool {
        self.swapped
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.swapped = false;
    }
}
