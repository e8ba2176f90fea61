//! Interactive directive loop
//!
//! Reads one directive per line, applies it to the game and writes the
//! board, moves and error messages to the output stream.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use hexgame_core::{Color, Coord, Game, GameConfig, GameError, MAX_SIZE, MIN_SIZE};

use crate::render::render_board;

// ============================================================================
// DIRECTIVES
// ============================================================================

/// A parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    NewGame {
        human: Option<Color>,
        swap_rule: Option<bool>,
        size: Option<usize>,
    },
    Play(Coord),
    Cont,
    Undo,
    Suggest,
    Level(Option<u32>),
    Swap,
    Save(PathBuf),
    Load(PathBuf),
    ShowState,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("Invalid directive")]
    Invalid,
    #[error("Invalid move")]
    InvalidMove,
    #[error("Invalid dimension")]
    InvalidDimension,
}

fn no_args(args: &[&str], directive: Directive) -> Result<Directive, DirectiveError> {
    if args.is_empty() {
        Ok(directive)
    } else {
        Err(DirectiveError::Invalid)
    }
}

fn one_arg<'a>(args: &[&'a str]) -> Result<&'a str, DirectiveError> {
    match args {
        [arg] => Ok(*arg),
        _ => Err(DirectiveError::Invalid),
    }
}

fn is_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn digits(text: &str) -> Result<u32, DirectiveError> {
    if !is_number(text) {
        return Err(DirectiveError::Invalid);
    }
    text.parse().map_err(|_| DirectiveError::Invalid)
}

impl Directive {
    pub fn parse(line: &str) -> Result<Self, DirectiveError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let (&name, args) = words.split_first().ok_or(DirectiveError::Invalid)?;

        match name {
            "newgame" => parse_newgame(args),
            "play" => {
                let text = one_arg(args)?;
                Coord::parse(text).map(Directive::Play).ok_or(DirectiveError::InvalidMove)
            }
            "cont" => no_args(args, Directive::Cont),
            "undo" => no_args(args, Directive::Undo),
            "suggest" => no_args(args, Directive::Suggest),
            "level" => match args {
                [] => Ok(Directive::Level(None)),
                [depth] => digits(depth).map(|d| Directive::Level(Some(d))),
                _ => Err(DirectiveError::Invalid),
            },
            "swap" => no_args(args, Directive::Swap),
            "save" => one_arg(args).map(|path| Directive::Save(PathBuf::from(path))),
            "load" => one_arg(args).map(|path| Directive::Load(PathBuf::from(path))),
            "showstate" => no_args(args, Directive::ShowState),
            "quit" => no_args(args, Directive::Quit),
            _ => Err(DirectiveError::Invalid),
        }
    }

    /// Still accepted once the game has been won
    pub fn allowed_after_win(&self) -> bool {
        matches!(self, Directive::NewGame { .. } | Directive::Level(_) | Directive::Quit)
    }
}

/// `newgame [white|black [swapon|swapoff [N]]]`
fn parse_newgame(args: &[&str]) -> Result<Directive, DirectiveError> {
    if args.len() > 3 {
        return Err(DirectiveError::Invalid);
    }

    let human = match args.first() {
        None => None,
        Some(&"white") => Some(Color::White),
        Some(&"black") => Some(Color::Black),
        Some(_) => return Err(DirectiveError::Invalid),
    };
    let swap_rule = match args.get(1) {
        None => None,
        Some(&"swapon") => Some(true),
        Some(&"swapoff") => Some(false),
        Some(_) => return Err(DirectiveError::Invalid),
    };
    let size = match args.get(2) {
        None => None,
        Some(text) => {
            if !is_number(text) {
                return Err(DirectiveError::Invalid);
            }
            // Too many digits for usize is still just an out-of-range board
            let size = text.parse::<usize>().unwrap_or(usize::MAX);
            if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
                return Err(DirectiveError::InvalidDimension);
            }
            Some(size)
        }
    };

    Ok(Directive::NewGame {
        human,
        swap_rule,
        size,
    })
}

/// Stable wording for errors shown to the player
pub fn describe(err: &GameError) -> String {
    match err {
        GameError::InvalidCoordinate { .. } => "Invalid move".to_string(),
        GameError::OccupiedCell(_) => "Position occupied".to_string(),
        GameError::WrongTurn { .. } => "It's not your turn to make a move".to_string(),
        GameError::EmptyLedger => "No moves have been played yet".to_string(),
        GameError::NoPriorMove => "You need to make a move first".to_string(),
        GameError::InvalidSwapState => "swap directive is not available".to_string(),
        GameError::UnavailableFeature(name) => format!("{} directive is not available", name),
        GameError::GameOver => "The game is over".to_string(),
        GameError::Configuration(_) => "Invalid game difficulty".to_string(),
        GameError::PersistenceFormat(_) | GameError::Io(_) => "File cannot be opened".to_string(),
    }
}

// ============================================================================
// LOOP
// ============================================================================

pub enum Flow {
    Continue,
    Quit,
}

/// Directive loop over any line source and sink
pub struct Repl<R, W> {
    game: Game,
    /// Settings that a bare `newgame` returns to
    base: GameConfig,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(base: GameConfig, input: R, output: W) -> Result<Self> {
        let game = Game::new(base.clone())?;
        Ok(Self {
            game,
            base,
            input,
            output,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run until `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.announce_turn()?;
            let Some(line) = self.prompt()? else {
                return Ok(());
            };

            let flow = match Directive::parse(&line) {
                Ok(directive) => self.execute(directive)?,
                Err(err) => {
                    writeln!(self.output, "{}", err)?;
                    Flow::Continue
                }
            };
            if let Flow::Quit = flow {
                return Ok(());
            }

            if self.game.is_over() {
                self.announce_winner()?;
                if let Flow::Quit = self.after_win()? {
                    return Ok(());
                }
            }
        }
    }

    /// Only `newgame`, `level` and `quit` are taken until the board is reset
    fn after_win(&mut self) -> Result<Flow> {
        loop {
            let Some(line) = self.prompt()? else {
                return Ok(Flow::Quit);
            };
            match Directive::parse(&line) {
                Ok(directive) if directive.allowed_after_win() => {
                    self.game.restart(self.game.config().clone())?;
                    return self.execute(directive);
                }
                _ => writeln!(self.output, "{}", DirectiveError::Invalid)?,
            }
        }
    }

    fn prompt(&mut self) -> Result<Option<String>> {
        write!(self.output, "> ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn role(&self, color: Color) -> &'static str {
        if color == self.game.human() {
            "human"
        } else {
            "computer"
        }
    }

    fn announce_turn(&mut self) -> Result<()> {
        let color = self.game.to_move();
        let role = self.role(color);
        writeln!(self.output, "{} player ({}) plays now", color, role)?;
        Ok(())
    }

    fn announce_winner(&mut self) -> Result<()> {
        if let Some((color, path)) = self.game.winning_path() {
            let role = self.role(color);
            let cells: Vec<String> = path.iter().map(Coord::to_string).collect();
            writeln!(self.output, "{} player ({}) wins with path {}", color, role, cells.join("-"))?;
        }
        Ok(())
    }

    fn show_board(&mut self) -> Result<()> {
        write!(self.output, "{}", render_board(self.game.board()))?;
        Ok(())
    }

    fn report(&mut self, err: &GameError) -> Result<()> {
        tracing::debug!("directive failed: {}", err);
        writeln!(self.output, "{}", describe(err))?;
        Ok(())
    }

    /// Apply one directive; game errors are reported, not returned
    pub fn execute(&mut self, directive: Directive) -> Result<Flow> {
        match directive {
            Directive::NewGame {
                human,
                swap_rule,
                size,
            } => {
                let mut config = self.base.clone();
                if let Some(human) = human {
                    config.human = human;
                }
                if let Some(swap_rule) = swap_rule {
                    config.swap_rule = swap_rule;
                }
                if let Some(size) = size {
                    config.size = size;
                    config.difficulty = config.difficulty.min((size * size) as u32);
                }
                match self.game.restart(config) {
                    Ok(()) => self.show_board()?,
                    Err(err) => self.report(&err)?,
                }
            }
            Directive::Play(coord) => match self.game.play(coord) {
                Ok(mv) => {
                    self.show_board()?;
                    writeln!(self.output, "Move played: {}", mv.coord)?;
                }
                Err(err) => self.report(&err)?,
            },
            Directive::Cont => match self.game.request_computer_move() {
                Ok(report) => {
                    self.show_board()?;
                    writeln!(self.output, "Move played: {}", report.mv.coord)?;
                }
                Err(err) => self.report(&err)?,
            },
            Directive::Undo => match self.game.undo_last() {
                Ok(_) => self.show_board()?,
                Err(err) => self.report(&err)?,
            },
            Directive::Suggest => match self.game.suggest() {
                Ok(coord) => writeln!(self.output, "You may play at {}", coord)?,
                Err(err) => self.report(&err)?,
            },
            Directive::Level(None) => {
                writeln!(self.output, "Current game difficulty: {}", self.game.difficulty())?;
            }
            Directive::Level(Some(depth)) => match self.game.set_difficulty(depth) {
                Ok(()) => writeln!(self.output, "New game difficulty: {}", depth)?,
                Err(err) => self.report(&err)?,
            },
            Directive::Swap => match self.game.try_swap() {
                Ok(_) => {
                    self.show_board()?;
                    writeln!(self.output, "Move played: swap")?;
                }
                Err(err) => self.report(&err)?,
            },
            Directive::Save(path) => {
                if let Err(err) = self.game.save(&path) {
                    self.report(&err)?;
                }
            }
            Directive::Load(path) => match self.game.load(&path) {
                Ok(()) => self.show_board()?,
                Err(err) => self.report(&err)?,
            },
            Directive::ShowState => self.show_board()?,
            Directive::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_directives() {
        assert_eq!(Directive::parse("cont\n"), Ok(Directive::Cont));
        assert_eq!(Directive::parse("  undo  "), Ok(Directive::Undo));
        assert_eq!(Directive::parse("play C2"), Ok(Directive::Play(Coord::new(1, 2))));
        assert_eq!(Directive::parse("level"), Ok(Directive::Level(None)));
        assert_eq!(Directive::parse("level 3"), Ok(Directive::Level(Some(3))));
        assert_eq!(Directive::parse("save game.bin"), Ok(Directive::Save("game.bin".into())));
        assert_eq!(Directive::parse("quit"), Ok(Directive::Quit));
    }

    #[test]
    fn test_parse_rejects_extra_or_bad_args() {
        assert_eq!(Directive::parse(""), Err(DirectiveError::Invalid));
        assert_eq!(Directive::parse("cont now"), Err(DirectiveError::Invalid));
        assert_eq!(Directive::parse("play"), Err(DirectiveError::Invalid));
        assert_eq!(Directive::parse("play c2"), Err(DirectiveError::InvalidMove));
        assert_eq!(Directive::parse("play C0"), Err(DirectiveError::InvalidMove));
        assert_eq!(Directive::parse("level x"), Err(DirectiveError::Invalid));
        assert_eq!(Directive::parse("jump"), Err(DirectiveError::Invalid));
    }

    #[test]
    fn test_parse_newgame() {
        assert_eq!(
            Directive::parse("newgame"),
            Ok(Directive::NewGame { human: None, swap_rule: None, size: None })
        );
        assert_eq!(
            Directive::parse("newgame black swapon 7"),
            Ok(Directive::NewGame {
                human: Some(Color::Black),
                swap_rule: Some(true),
                size: Some(7)
            })
        );
        assert_eq!(Directive::parse("newgame red"), Err(DirectiveError::Invalid));
        assert_eq!(Directive::parse("newgame white swapoff 3"), Err(DirectiveError::InvalidDimension));
        assert_eq!(Directive::parse("newgame white swapoff 27"), Err(DirectiveError::InvalidDimension));
        assert_eq!(
            Directive::parse("newgame white swapoff 99999999999999999999999"),
            Err(DirectiveError::InvalidDimension)
        );
        assert_eq!(Directive::parse("newgame white swapoff 7x"), Err(DirectiveError::Invalid));
        assert_eq!(Directive::parse("newgame white swapoff 7 x"), Err(DirectiveError::Invalid));
    }

    #[test]
    fn test_describe_messages() {
        assert_eq!(describe(&GameError::EmptyLedger), "No moves have been played yet");
        assert_eq!(describe(&GameError::UnavailableFeature("cont")), "cont directive is not available");
        assert_eq!(describe(&GameError::InvalidSwapState), "swap directive is not available");
    }
}
