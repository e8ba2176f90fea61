//! HEXGAME CLI - interactive play and self-play matches
//!
//! Modules:
//! - repl: directive loop for human vs computer games
//! - render: ASCII board drawing
//! - match_cmd: computer vs computer matches

pub mod match_cmd;
pub mod render;
pub mod repl;

pub use repl::{Directive, DirectiveError, Repl};
