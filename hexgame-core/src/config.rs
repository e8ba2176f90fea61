//! Game configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{Color, MAX_SIZE, MIN_SIZE};
use crate::clock::TimeControl;
use crate::error::{GameError, Result};
use crate::eval::Heuristic;

/// Board dimension used when none is given
pub const DEFAULT_SIZE: usize = 11;

/// Search settings for the computer player
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Static evaluation used at the search horizon
    pub heuristic: Heuristic,
    /// Seed for the random opening moves on large boards
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::ShortestPath,
            seed: 42,
        }
    }
}

/// Settings for one game session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board dimension (N×N)
    pub size: usize,
    /// Maximum search depth for the computer
    pub difficulty: u32,
    /// Color played by the human
    pub human: Color,
    /// Whether the swap rule may be used
    pub swap_rule: bool,
    pub search: SearchConfig,
    pub time: TimeControl,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            difficulty: 1,
            human: Color::White,
            swap_rule: false,
            search: SearchConfig::default(),
            time: TimeControl::default(),
        }
    }
}

impl GameConfig {
    /// Create config for the given board size
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Set the search depth
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the human's color
    pub fn with_human(mut self, human: Color) -> Self {
        self.human = human;
        self
    }

    /// Enable or disable the swap rule
    pub fn with_swap_rule(mut self, swap_rule: bool) -> Self {
        self.swap_rule = swap_rule;
        self
    }

    /// Set the opening seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.search.seed = seed;
        self
    }

    /// Check dimension and difficulty bounds
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&self.size) {
            return Err(GameError::Configuration(format!(
                "board dimension {} outside [{}, {}]",
                self.size, MIN_SIZE, MAX_SIZE
            )));
        }
        validate_difficulty(self.difficulty, self.size)
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Difficulty must be positive and no deeper than the number of cells
pub fn validate_difficulty(difficulty: u32, size: usize) -> Result<()> {
    let max = (size * size) as u32;
    if difficulty == 0 || difficulty > max {
        return Err(GameError::Configuration(format!(
            "difficulty {} outside [1, {}]",
            difficulty, max
        )));
    }
    Ok(())
}
