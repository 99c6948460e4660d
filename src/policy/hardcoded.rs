//! Fixed per-cell policy.

use std::collections::HashMap;

use crate::{
    Error, Result,
    maze::{Action, Coordinate, Maze, State},
    ports::Policy,
};

/// A policy given as an explicit `Coordinate -> Option<Action>` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardcodedPolicy {
    actions: HashMap<Coordinate, Option<Action>>,
}

impl HardcodedPolicy {
    pub fn new(actions: HashMap<Coordinate, Option<Action>>) -> Self {
        Self { actions }
    }

    /// Parse a policy from display rows, top row first.
    ///
    /// Each non-whitespace character is one cell: `U D L R`, the arrows
    /// `▲ ▼ ◄ ►`, `^ v < >`, or `X`, `·`, `.` for "no action".
    ///
    /// ```
    /// use mazerl::{maze::{Action, Coordinate}, policy::HardcodedPolicy};
    ///
    /// let policy = HardcodedPolicy::from_rows(&["RX", "UU"]).unwrap();
    /// assert_eq!(policy.get(Coordinate::new(0, 1)), Some(Some(Action::Right)));
    /// assert_eq!(policy.get(Coordinate::new(1, 1)), Some(None));
    /// ```
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height = rows.len();
        let mut width = None;
        let mut actions = HashMap::new();

        for (row, line) in rows.iter().enumerate() {
            let glyphs: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            match width {
                None => width = Some(glyphs.len()),
                Some(w) if w != glyphs.len() => {
                    return Err(Error::InvalidConfiguration {
                        message: format!(
                            "policy row {row} has {} cells, expected {w}",
                            glyphs.len()
                        ),
                    });
                }
                Some(_) => {}
            }

            let y = height - 1 - row;
            for (x, &glyph) in glyphs.iter().enumerate() {
                let action = match glyph {
                    'X' | 'x' | '·' | '.' => None,
                    other => Some(Action::from_glyph(other).ok_or(Error::InvalidPolicyGlyph {
                        glyph: other,
                        row,
                        column: x,
                    })?),
                };
                actions.insert(Coordinate::new(x, y), action);
            }
        }

        Ok(Self { actions })
    }

    /// `None` if the cell has no entry, `Some(None)` if it prescribes no action.
    pub fn get(&self, coordinate: Coordinate) -> Option<Option<Action>> {
        self.actions.get(&coordinate).copied()
    }

    pub fn insert(&mut self, coordinate: Coordinate, action: Option<Action>) {
        self.actions.insert(coordinate, action);
    }
}

impl Policy for HardcodedPolicy {
    fn select_action(&mut self, _maze: &Maze, state: &State) -> Result<Option<Action>> {
        if state.terminal {
            return Ok(None);
        }
        self.get(state.position).ok_or(Error::MissingPolicyEntry {
            coordinate: state.position,
        })
    }

    fn name(&self) -> &str {
        "Hardcoded"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::MazeKind;

    #[test]
    fn test_rows_are_read_top_down() {
        let policy = HardcodedPolicy::from_rows(&["RRRX", "UUUU", "UULL", "XUUU"]).unwrap();
        assert_eq!(policy.get(Coordinate::new(0, 3)), Some(Some(Action::Right)));
        assert_eq!(policy.get(Coordinate::new(3, 3)), Some(None));
        assert_eq!(policy.get(Coordinate::new(3, 1)), Some(Some(Action::Left)));
        assert_eq!(policy.get(Coordinate::new(0, 0)), Some(None));
        assert_eq!(policy.get(Coordinate::new(4, 0)), None);
    }

    #[test]
    fn test_arrow_glyphs() {
        let policy = HardcodedPolicy::from_rows(&["▲ ►", "◄ ·"]).unwrap();
        assert_eq!(policy.get(Coordinate::new(1, 1)), Some(Some(Action::Right)));
        assert_eq!(policy.get(Coordinate::new(0, 0)), Some(Some(Action::Left)));
        assert_eq!(policy.get(Coordinate::new(1, 0)), Some(None));
    }

    #[test]
    fn test_bad_glyph_is_reported() {
        let err = HardcodedPolicy::from_rows(&["RQ"]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidPolicyGlyph {
                glyph: 'Q',
                row: 0,
                column: 1
            }
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(HardcodedPolicy::from_rows(&["RR", "R"]).is_err());
    }

    #[test]
    fn test_missing_entry() {
        let maze = Maze::uniform(2, 1, 0.0, MazeKind::Bounded).unwrap();
        let mut policy = HardcodedPolicy::from_rows(&["R"]).unwrap();
        let state = *maze.state(Coordinate::new(1, 0)).unwrap();
        let err = policy.select_action(&maze, &state).unwrap_err();
        assert!(matches!(err, Error::MissingPolicyEntry { .. }));
    }
}
