//! Movement actions and grid coordinates.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A cell position. `(0, 0)` is the bottom-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Apply an action's offset. Returns `None` when the result would be
    /// negative; the upper bound is the maze's business.
    pub fn offset(self, action: Action) -> Option<Coordinate> {
        let (dx, dy) = action.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Coordinate { x, y })
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four moves available in a grid maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// All actions in canonical order. Greedy ties resolve to the earliest.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// `(dx, dy)` offset of the action.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (0, 1),
            Action::Down => (0, -1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
        }
    }

    /// Position of the action in [`Action::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }

    pub const fn from_index(index: usize) -> Option<Action> {
        match index {
            0 => Some(Action::Up),
            1 => Some(Action::Down),
            2 => Some(Action::Left),
            3 => Some(Action::Right),
            _ => None,
        }
    }

    pub const fn arrow(self) -> char {
        match self {
            Action::Up => '▲',
            Action::Down => '▼',
            Action::Left => '◄',
            Action::Right => '►',
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        }
    }

    /// Parse a single-character glyph: `U D L R` (any case) or an arrow.
    pub fn from_glyph(glyph: char) -> Option<Action> {
        match glyph {
            'U' | 'u' | '▲' | '↑' | '^' => Some(Action::Up),
            'D' | 'd' | '▼' | '↓' | 'v' => Some(Action::Down),
            'L' | 'l' | '◄' | '←' | '<' => Some(Action::Left),
            'R' | 'r' | '►' | '→' | '>' => Some(Action::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && let Some(action) = Action::from_glyph(c)
        {
            return Ok(action);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "up" => Ok(Action::Up),
            "down" => Ok(Action::Down),
            "left" => Ok(Action::Left),
            "right" => Ok(Action::Right),
            other => Err(format!(
                "unknown action '{other}'. Expected up, down, left or right"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()), Some(action));
        }
        assert_eq!(Action::from_index(4), None);
    }

    #[test]
    fn test_offset_rejects_negative() {
        let origin = Coordinate::new(0, 0);
        assert_eq!(origin.offset(Action::Left), None);
        assert_eq!(origin.offset(Action::Down), None);
        assert_eq!(origin.offset(Action::Up), Some(Coordinate::new(0, 1)));
        assert_eq!(origin.offset(Action::Right), Some(Coordinate::new(1, 0)));
    }

    #[test]
    fn test_parse_action() {
        assert_eq!("U".parse::<Action>().unwrap(), Action::Up);
        assert_eq!("►".parse::<Action>().unwrap(), Action::Right);
        assert_eq!("Left".parse::<Action>().unwrap(), Action::Left);
        assert!("sideways".parse::<Action>().is_err());
    }
}
