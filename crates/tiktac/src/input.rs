//! Commands typed at the interactive prompt.

use derive_more::{Display, Error};
use std::str::FromStr;
use tiktac_rules::{GameMode, OpponentType};

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Play the cell with this index.
    Cell(usize),
    /// Play the cell at `row,col`.
    Coords(usize, usize),
    /// New game, same settings.
    Reset,
    /// New game with this grid size and optional win length.
    Size(usize, Option<usize>),
    /// Switch rule variant.
    Mode(GameMode),
    /// Switch opponent.
    Opponent(OpponentType),
    /// Sound on or off.
    Sound(bool),
    /// Vibration on or off.
    Haptics(bool),
    /// Show the scoreboard.
    Stats,
    /// Zero the scoreboard.
    ResetStats,
    /// Show the command list.
    Help,
    /// Leave.
    Quit,
}

impl Input {
    /// Board index this input plays on a `grid_size` board, if it is a move.
    ///
    /// Coordinates off the board map to an index past the end so the engine
    /// reports them as out of bounds.
    pub fn target(&self, grid_size: usize) -> Option<usize> {
        match *self {
            Input::Cell(index) => Some(index),
            Input::Coords(row, col) if row < grid_size && col < grid_size => Some(row * grid_size + col),
            Input::Coords(..) => Some(grid_size * grid_size),
            _ => None,
        }
    }
}

/// Unrecognized input line.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{}", message)]
pub struct InputError {
    /// What was wrong.
    pub message: String,
}

impl InputError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Help text for the prompt.
pub const HELP: &str = "\
Commands:
  <index> | <row>,<col>     play a cell
  reset                     new game
  size <n> [<win>]          new game on an n x n board
  mode <name>               classic misere fading gravity blocked speed fog bomb chaos ultimate
  opponent pvp|easy|hard    choose who plays O
  sound on|off              toggle sound cues
  haptics on|off            toggle vibration cues
  stats                     show the scoreboard
  reset-stats               zero the scoreboard
  help                      show this list
  quit                      leave";

fn number(word: &str) -> Result<usize, InputError> {
    word.trim()
        .parse()
        .map_err(|_| InputError::new(format!("'{}' is not a number", word.trim())))
}

fn switch(word: Option<&str>) -> Result<bool, InputError> {
    match word {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(InputError::new("expected 'on' or 'off'")),
    }
}

impl FromStr for Input {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim().to_lowercase();
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(InputError::new("empty input"));
        };
        let arg = words.next();

        let input = match head {
            "reset" => Input::Reset,
            "stats" => Input::Stats,
            "reset-stats" => Input::ResetStats,
            "help" | "?" => Input::Help,
            "quit" | "exit" | "q" => Input::Quit,
            "size" => {
                let grid = number(arg.ok_or_else(|| InputError::new("size needs a grid size"))?)?;
                let win = words.next().map(number).transpose()?;
                Input::Size(grid, win)
            }
            "mode" => {
                let name = arg.ok_or_else(|| InputError::new("mode needs a name"))?;
                Input::Mode(
                    name.parse()
                        .map_err(|_| InputError::new(format!("unknown mode '{}'", name)))?,
                )
            }
            "opponent" => {
                let name = arg.ok_or_else(|| InputError::new("opponent needs pvp, easy or hard"))?;
                Input::Opponent(
                    name.parse()
                        .map_err(|_| InputError::new(format!("unknown opponent '{}'", name)))?,
                )
            }
            "sound" => Input::Sound(switch(arg)?),
            "haptics" => Input::Haptics(switch(arg)?),
            cell => match cell.split_once(',') {
                Some((row, col)) => Input::Coords(number(row)?, number(col)?),
                None => Input::Cell(number(cell)?),
            },
        };
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves() {
        assert_eq!("4".parse::<Input>(), Ok(Input::Cell(4)));
        assert_eq!(" 1,2 ".parse::<Input>(), Ok(Input::Coords(1, 2)));
        assert_eq!(Input::Coords(1, 2).target(3), Some(5));
        assert_eq!(Input::Coords(3, 0).target(3), Some(9));
        assert_eq!(Input::Reset.target(3), None);
    }

    #[test]
    fn test_commands() {
        assert_eq!("size 5 4".parse::<Input>(), Ok(Input::Size(5, Some(4))));
        assert_eq!("size 4".parse::<Input>(), Ok(Input::Size(4, None)));
        assert_eq!("mode Gravity".parse::<Input>(), Ok(Input::Mode(GameMode::Gravity)));
        assert_eq!("opponent hard".parse::<Input>(), Ok(Input::Opponent(OpponentType::AiHard)));
        assert_eq!("sound off".parse::<Input>(), Ok(Input::Sound(false)));
        assert_eq!("haptics on".parse::<Input>(), Ok(Input::Haptics(true)));
        assert_eq!("reset-stats".parse::<Input>(), Ok(Input::ResetStats));
        assert_eq!("quit".parse::<Input>(), Ok(Input::Quit));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("".parse::<Input>().is_err());
        assert!("mode tetris".parse::<Input>().is_err());
        assert!("sound loud".parse::<Input>().is_err());
        assert!("a,b".parse::<Input>().is_err());
        assert!("size".parse::<Input>().is_err());
    }
}
