//! Move time budgeting

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Thinking-time policy for the computer player
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeControl {
    /// Ceiling for a single move, in seconds
    pub move_limit_secs: f64,
    /// Total budget per game is this many seconds per board dimension
    pub per_dimension_secs: f64,
    /// Below this many remaining seconds the computer plays at minimal speed
    pub hurry_threshold_secs: f64,
    /// Boards at least this large use the reduced ceiling early on
    pub large_board: usize,
}

impl Default for TimeControl {
    fn default() -> Self {
        Self {
            move_limit_secs: 30.0,
            per_dimension_secs: 30.0,
            hurry_threshold_secs: 20.0,
            large_board: 11,
        }
    }
}

impl TimeControl {
    /// Total computer budget for a game on an N×N board
    pub fn total_budget(&self, dimension: usize) -> Duration {
        Duration::from_secs_f64(self.per_dimension_secs * dimension as f64)
    }

    /// Per-move ceiling given the time already spent this game
    pub fn allocate_move_budget(
        &self,
        dimension: usize,
        moves_played: usize,
        total_elapsed: Duration,
    ) -> Duration {
        let remaining = self.total_budget(dimension).as_secs_f64() - total_elapsed.as_secs_f64();

        if remaining <= self.hurry_threshold_secs {
            return Duration::from_secs_f64(dimension as f64 / (2.0 * self.move_limit_secs));
        }

        let many_moves_left = 2 * dimension * dimension / 3 >= moves_played;
        let secs = if dimension >= self.large_board && many_moves_left {
            self.move_limit_secs / 3.0
        } else {
            // Leave room for the search to notice the deadline and unwind
            let margin = if dimension > self.large_board { 5.0 } else { 2.0 };
            (self.move_limit_secs - margin).max(0.0)
        };
        Duration::from_secs_f64(secs)
    }

    /// Ceiling used when suggesting a move to the human
    pub fn suggestion_budget(&self) -> Duration {
        Duration::from_secs_f64(self.move_limit_secs)
    }
}

/// Tracks the computer's cumulative thinking time over one game
#[derive(Clone, Debug, Default)]
pub struct TimeGovernor {
    control: TimeControl,
    elapsed: Duration,
}

impl TimeGovernor {
    pub fn new(control: TimeControl) -> Self {
        Self {
            control,
            elapsed: Duration::ZERO,
        }
    }

    pub fn control(&self) -> &TimeControl {
        &self.control
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Deadline for the next computer move
    pub fn next_deadline(&self, dimension: usize, moves_played: usize) -> Deadline {
        Deadline::after(
            self.control
                .allocate_move_budget(dimension, moves_played, self.elapsed),
        )
    }

    pub fn record(&mut self, spent: Duration) {
        self.elapsed += spent;
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// A cutoff measured from a single clock sample
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// A deadline far enough away to never trigger in practice
    pub fn unbounded() -> Self {
        Self::after(Duration::from_secs(60 * 60 * 24 * 365))
    }

    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}
