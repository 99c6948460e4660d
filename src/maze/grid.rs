//! Grid maze with strict, bounded and stochastic movement.

use std::fmt;

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use super::{Action, Coordinate, State};
use crate::{Error, Result, render, types::UnitInterval};

/// How a maze resolves a move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MazeKind {
    /// Moving off the grid is an error.
    Strict,
    /// Moving off the grid leaves the agent where it was.
    Bounded,
    /// Bounded, and with probability `slip` the intended action is replaced
    /// by a uniformly random one (which may be the same action).
    Stochastic { slip: UnitInterval },
}

impl MazeKind {
    pub fn name(&self) -> &'static str {
        match self {
            MazeKind::Strict => "strict",
            MazeKind::Bounded => "bounded",
            MazeKind::Stochastic { .. } => "stochastic",
        }
    }
}

/// A rectangular grid of [`State`]s.
///
/// Rewards are supplied column-major as `rewards[x][y]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maze {
    width: usize,
    height: usize,
    kind: MazeKind,
    /// Indexed `x * height + y`
    states: Vec<State>,
}

impl Maze {
    /// Build a maze from a `rewards[x][y]` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] if `rewards` is not `width` columns of
    /// `height` entries, or if either dimension is zero.
    pub fn new(width: usize, height: usize, rewards: &[Vec<f64>], kind: MazeKind) -> Result<Self> {
        check_shape(width, height, rewards)?;

        let mut states = Vec::with_capacity(width * height);
        for (x, column) in rewards.iter().enumerate() {
            for (y, &reward) in column.iter().enumerate() {
                states.push(State::new(Coordinate::new(x, y), reward, false));
            }
        }

        Ok(Self {
            width,
            height,
            kind,
            states,
        })
    }

    /// A maze where every cell has the same reward.
    pub fn uniform(width: usize, height: usize, reward: f64, kind: MazeKind) -> Result<Self> {
        let rewards = vec![vec![reward; height]; width];
        Self::new(width, height, &rewards, kind)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn kind(&self) -> MazeKind {
        self.kind
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.x < self.width && coordinate.y < self.height
    }

    fn index(&self, coordinate: Coordinate) -> Result<usize> {
        if self.contains(coordinate) {
            Ok(coordinate.x * self.height + coordinate.y)
        } else {
            Err(self.out_of_bounds(coordinate))
        }
    }

    fn out_of_bounds(&self, coordinate: Coordinate) -> Error {
        Error::OutOfBounds {
            coordinate,
            width: self.width,
            height: self.height,
        }
    }

    /// Look up the state at `coordinate`.
    pub fn state(&self, coordinate: Coordinate) -> Result<&State> {
        let idx = self.index(coordinate)?;
        Ok(&self.states[idx])
    }

    /// Find a state by value (position, reward and terminal flag).
    pub fn find(&self, state: &State) -> Result<&State> {
        self.states
            .iter()
            .find(|candidate| *candidate == state)
            .ok_or_else(|| Error::StateNotFound {
                state: state.to_string(),
            })
    }

    /// All states, column by column.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn set_terminal(&mut self, coordinate: Coordinate) -> Result<()> {
        let idx = self.index(coordinate)?;
        self.states[idx].terminal = true;
        Ok(())
    }

    /// Replace every reward. `rewards` must match the maze's shape.
    pub fn set_rewards(&mut self, rewards: &[Vec<f64>]) -> Result<()> {
        check_shape(self.width, self.height, rewards)?;
        for state in &mut self.states {
            state.reward = rewards[state.position.x][state.position.y];
        }
        Ok(())
    }

    /// Resolve `action` from `from`.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfBounds`] if `from` is not inside the maze
    /// - [`Error::InvalidMove`] if the maze is strict and the move leaves it
    pub fn step<R: Rng + ?Sized>(
        &self,
        from: Coordinate,
        action: Action,
        rng: &mut R,
    ) -> Result<Coordinate> {
        self.index(from)?;

        match self.kind {
            MazeKind::Strict => self.intended(from, action).ok_or(Error::InvalidMove {
                from,
                action,
                width: self.width,
                height: self.height,
            }),
            MazeKind::Bounded => Ok(self.intended(from, action).unwrap_or(from)),
            MazeKind::Stochastic { slip } => {
                let action = if rng.random::<f64>() < slip.value() {
                    Action::ALL.choose(rng).copied().unwrap_or(action)
                } else {
                    action
                };
                Ok(self.intended(from, action).unwrap_or(from))
            }
        }
    }

    /// Like [`Maze::step`], also returning the reward of the destination.
    pub fn step_reward<R: Rng + ?Sized>(
        &self,
        from: Coordinate,
        action: Action,
        rng: &mut R,
    ) -> Result<(Coordinate, f64)> {
        let destination = self.step(from, action, rng)?;
        Ok((destination, self.state(destination)?.reward))
    }

    /// Deterministic target of `action`, if it stays inside the grid.
    pub fn intended(&self, from: Coordinate, action: Action) -> Option<Coordinate> {
        from.offset(action).filter(|c| self.contains(*c))
    }

    /// Deterministic outcome of every action the maze allows from `state`,
    /// paired with the state it lands in. Slips are not applied.
    ///
    /// A strict maze only lists moves that stay on the grid. Bounded and
    /// stochastic mazes list all four, with a wall bump landing back on
    /// `state`. Terminal states have no destinations.
    pub fn destinations(&self, state: &State) -> Result<Vec<(Action, State)>> {
        if state.terminal {
            return Ok(Vec::new());
        }

        let from = state.position;
        let destinations: Vec<(Action, State)> = Action::ALL
            .iter()
            .filter_map(|&action| {
                let target = match self.kind {
                    MazeKind::Strict => self.intended(from, action),
                    MazeKind::Bounded | MazeKind::Stochastic { .. } => {
                        Some(self.intended(from, action).unwrap_or(from))
                    }
                };
                target
                    .and_then(|c| self.state(c).ok())
                    .map(|s| (action, *s))
            })
            .collect();

        if destinations.is_empty() {
            return Err(Error::NoAvailableActions {
                coordinate: state.position,
            });
        }
        Ok(destinations)
    }

    /// Actions an agent may choose at `coordinate`.
    ///
    /// A strict maze only offers moves that stay on the grid; bounded and
    /// stochastic mazes offer all four.
    pub fn available_actions(&self, coordinate: Coordinate) -> Vec<Action> {
        match self.kind {
            MazeKind::Strict => Action::ALL
                .iter()
                .copied()
                .filter(|&a| self.intended(coordinate, a).is_some())
                .collect(),
            MazeKind::Bounded | MazeKind::Stochastic { .. } => Action::ALL.to_vec(),
        }
    }

    /// Render the maze with an agent highlighted at `agent`.
    pub fn render_with_agent(&self, agent: Option<Coordinate>) -> String {
        render::maze_table(self, agent).to_string()
    }
}

fn check_shape(width: usize, height: usize, rewards: &[Vec<f64>]) -> Result<()> {
    let columns_ok = rewards.len() == width && rewards.iter().all(|c| c.len() == height);
    if width == 0 || height == 0 || !columns_ok {
        let got = match rewards.first() {
            Some(first) => format!("{}x{}", rewards.len(), first.len()),
            None => "0x0".to_string(),
        };
        return Err(Error::InvalidShape {
            expected_width: width,
            expected_height: height,
            got,
        });
    }
    Ok(())
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render::maze_table(self, None))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn corridor(kind: MazeKind) -> Maze {
        let rewards = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        Maze::new(3, 2, &rewards, kind).unwrap()
    }

    #[test]
    fn test_rewards_are_column_major() {
        let maze = corridor(MazeKind::Bounded);
        assert_eq!(maze.state(Coordinate::new(0, 1)).unwrap().reward, 2.0);
        assert_eq!(maze.state(Coordinate::new(2, 0)).unwrap().reward, 5.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let rewards = vec![vec![1.0, 2.0], vec![3.0]];
        let err = Maze::new(2, 2, &rewards, MazeKind::Bounded).unwrap_err();
        assert!(matches!(err, Error::InvalidShape { .. }));
    }

    #[test]
    fn test_set_terminal_out_of_range() {
        let mut maze = corridor(MazeKind::Bounded);
        assert!(maze.set_terminal(Coordinate::new(3, 0)).is_err());
        maze.set_terminal(Coordinate::new(2, 1)).unwrap();
        assert!(maze.state(Coordinate::new(2, 1)).unwrap().terminal);
    }

    #[test]
    fn test_set_rewards() {
        let mut maze = corridor(MazeKind::Bounded);
        maze.set_rewards(&[vec![0.0, 0.0], vec![0.0, 9.0], vec![0.0, 0.0]])
            .unwrap();
        assert_eq!(maze.state(Coordinate::new(1, 1)).unwrap().reward, 9.0);
        assert!(maze.set_rewards(&[vec![0.0]]).is_err());
    }

    #[test]
    fn test_strict_step_off_grid_errors() {
        let maze = corridor(MazeKind::Strict);
        let mut rng = StdRng::seed_from_u64(1);
        let err = maze
            .step(Coordinate::new(0, 0), Action::Left, &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMove { .. }));
        assert_eq!(
            maze.step(Coordinate::new(0, 0), Action::Up, &mut rng).unwrap(),
            Coordinate::new(0, 1)
        );
    }

    #[test]
    fn test_bounded_step_stays_in_place() {
        let maze = corridor(MazeKind::Bounded);
        let mut rng = StdRng::seed_from_u64(1);
        let top_right = Coordinate::new(2, 1);
        assert_eq!(maze.step(top_right, Action::Up, &mut rng).unwrap(), top_right);
        assert_eq!(maze.step(top_right, Action::Right, &mut rng).unwrap(), top_right);
        assert_eq!(
            maze.step(top_right, Action::Left, &mut rng).unwrap(),
            Coordinate::new(1, 1)
        );
    }

    #[test]
    fn test_step_from_outside_errors() {
        let maze = corridor(MazeKind::Bounded);
        let mut rng = StdRng::seed_from_u64(1);
        let err = maze
            .step(Coordinate::new(7, 7), Action::Up, &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
    }

    #[test]
    fn test_stochastic_without_slip_is_deterministic() {
        let maze = corridor(MazeKind::Stochastic {
            slip: UnitInterval::ZERO,
        });
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(
                maze.step(Coordinate::new(0, 0), Action::Right, &mut rng)
                    .unwrap(),
                Coordinate::new(1, 0)
            );
        }
    }

    #[test]
    fn test_full_slip_stays_on_grid_and_varies() {
        let maze = corridor(MazeKind::Stochastic {
            slip: UnitInterval::ONE,
        });
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let c = maze
                .step(Coordinate::new(1, 0), Action::Right, &mut rng)
                .unwrap();
            assert!(maze.contains(c));
            seen.insert(c);
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_step_reward() {
        let maze = corridor(MazeKind::Bounded);
        let mut rng = StdRng::seed_from_u64(1);
        let (c, r) = maze
            .step_reward(Coordinate::new(0, 0), Action::Right, &mut rng)
            .unwrap();
        assert_eq!(c, Coordinate::new(1, 0));
        assert_eq!(r, 3.0);
    }

    #[test]
    fn test_destinations() {
        let mut maze = corridor(MazeKind::Strict);
        let corner = *maze.state(Coordinate::new(0, 0)).unwrap();
        let dests = maze.destinations(&corner).unwrap();
        let actions: Vec<Action> = dests.iter().map(|(a, _)| *a).collect();
        assert_eq!(actions, vec![Action::Up, Action::Right]);

        maze.set_terminal(Coordinate::new(0, 0)).unwrap();
        let terminal = *maze.state(Coordinate::new(0, 0)).unwrap();
        assert!(maze.destinations(&terminal).unwrap().is_empty());
    }

    #[test]
    fn test_bounded_destinations_include_wall_bumps() {
        let maze = corridor(MazeKind::Bounded);
        let corner = *maze.state(Coordinate::new(0, 0)).unwrap();
        let targets: Vec<(Action, Coordinate)> = maze
            .destinations(&corner)
            .unwrap()
            .into_iter()
            .map(|(a, s)| (a, s.position))
            .collect();
        assert_eq!(
            targets,
            vec![
                (Action::Up, Coordinate::new(0, 1)),
                (Action::Down, Coordinate::new(0, 0)),
                (Action::Left, Coordinate::new(0, 0)),
                (Action::Right, Coordinate::new(1, 0)),
            ]
        );
    }

    #[test]
    fn test_single_cell_maze_has_no_actions() {
        let maze = Maze::uniform(1, 1, 0.0, MazeKind::Strict).unwrap();
        let only = *maze.state(Coordinate::new(0, 0)).unwrap();
        assert!(matches!(
            maze.destinations(&only),
            Err(Error::NoAvailableActions { .. })
        ));
    }

    #[test]
    fn test_available_actions_by_kind() {
        let strict = corridor(MazeKind::Strict);
        assert_eq!(
            strict.available_actions(Coordinate::new(0, 0)),
            vec![Action::Up, Action::Right]
        );
        let bounded = corridor(MazeKind::Bounded);
        assert_eq!(bounded.available_actions(Coordinate::new(0, 0)).len(), 4);
    }

    #[test]
    fn test_find() {
        let maze = corridor(MazeKind::Bounded);
        let probe = State::new(Coordinate::new(1, 1), 4.0, false);
        assert_eq!(maze.find(&probe).unwrap().position, Coordinate::new(1, 1));
        let missing = State::new(Coordinate::new(1, 1), 99.0, false);
        assert!(maze.find(&missing).is_err());
    }
}
