//! Value iteration and greedy policy extraction.
//!
//! The model is built from [`Maze::destinations`]: the intended destination
//! of an action is reached with probability `p`, and each of the other
//! `n - 1` destinations with probability `(1 - p) / (n - 1)`.

use std::collections::HashMap;

use crate::{
    Error, Result,
    maze::{Action, Coordinate, Maze, State},
    ports::Policy,
    render::{self, GridTable},
    types::{NonNegative, UnitInterval},
};

/// Parameters for [`OptimalPolicy::solve`].
#[derive(Debug, Clone, Copy)]
pub struct ValueIterationConfig {
    /// Stop once the largest change in a sweep drops below this
    pub threshold: NonNegative,
    pub discount: UnitInterval,
    /// Probability that an action reaches its intended destination
    pub success_probability: UnitInterval,
    pub max_sweeps: usize,
    /// Keep a snapshot of the values after every sweep
    pub record_history: bool,
}

impl ValueIterationConfig {
    pub const DEFAULT_MAX_SWEEPS: usize = 100_000;

    pub fn new(threshold: f64, discount: f64, success_probability: f64) -> Result<Self> {
        Ok(Self {
            threshold: NonNegative::new("threshold", threshold)?,
            discount: UnitInterval::new("discount", discount)?,
            success_probability: UnitInterval::new("probability", success_probability)?,
            max_sweeps: Self::DEFAULT_MAX_SWEEPS,
            record_history: false,
        })
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    pub fn with_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }
}

/// Values after one sweep.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub index: usize,
    pub delta: f64,
    pub values: HashMap<Coordinate, f64>,
}

/// Optimal policy for a known maze, found by value iteration.
#[derive(Debug, Clone)]
pub struct OptimalPolicy {
    config: ValueIterationConfig,
    values: HashMap<Coordinate, f64>,
    actions: HashMap<Coordinate, Option<Action>>,
    sweeps: usize,
    history: Vec<Sweep>,
}

impl OptimalPolicy {
    /// Run value iteration on `maze` and extract the greedy policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConverged`] if the values are still moving by at
    /// least `threshold` after `max_sweeps` sweeps.
    pub fn solve(maze: &Maze, config: ValueIterationConfig) -> Result<Self> {
        let model = Model::build(maze, config)?;
        let mut values: HashMap<Coordinate, f64> =
            maze.states().map(|s| (s.position, 0.0)).collect();
        let mut history = Vec::new();
        let mut sweeps = 0;
        let mut last_delta = f64::INFINITY;

        loop {
            if sweeps >= config.max_sweeps {
                return Err(Error::NotConverged {
                    sweeps,
                    delta: last_delta,
                });
            }

            let mut delta: f64 = 0.0;
            let mut next = values.clone();
            for state in maze.states() {
                let value = if state.terminal {
                    0.0
                } else {
                    model
                        .action_returns(state.position, &values)
                        .map(|(_, q)| q)
                        .fold(f64::NEG_INFINITY, f64::max)
                };
                delta = delta.max((values[&state.position] - value).abs());
                next.insert(state.position, value);
            }
            values = next;
            sweeps += 1;
            last_delta = delta;

            tracing::trace!(sweep = sweeps, delta, "value iteration sweep");
            if config.record_history {
                history.push(Sweep {
                    index: sweeps,
                    delta,
                    values: values.clone(),
                });
            }

            if delta < config.threshold.value() {
                break;
            }
        }

        tracing::debug!(sweeps, "value iteration converged");

        let actions = maze
            .states()
            .map(|state| (state.position, model.best_action(state, &values)))
            .collect();

        Ok(Self {
            config,
            values,
            actions,
            sweeps,
            history,
        })
    }

    pub fn values(&self) -> &HashMap<Coordinate, f64> {
        &self.values
    }

    pub fn value(&self, coordinate: Coordinate) -> Option<f64> {
        self.values.get(&coordinate).copied()
    }

    pub fn action(&self, coordinate: Coordinate) -> Option<Action> {
        self.actions.get(&coordinate).copied().flatten()
    }

    /// Number of sweeps until convergence.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Per-sweep snapshots; empty unless `record_history` was set.
    pub fn history(&self) -> &[Sweep] {
        &self.history
    }

    pub fn config(&self) -> &ValueIterationConfig {
        &self.config
    }

    pub fn value_table(&self, maze: &Maze) -> GridTable {
        render::value_table(maze, |c| self.value(c))
    }

    pub fn policy_table(&self, maze: &Maze) -> GridTable {
        render::policy_table(maze, |c| self.action(c))
    }
}

impl Policy for OptimalPolicy {
    fn select_action(&mut self, _maze: &Maze, state: &State) -> Result<Option<Action>> {
        if state.terminal {
            return Ok(None);
        }
        Ok(self.action(state.position))
    }

    fn name(&self) -> &str {
        "Optimal"
    }
}

/// Destinations of every non-terminal state, with the transition
/// probabilities implied by the success probability.
struct Model {
    destinations: HashMap<Coordinate, Vec<(Action, Coordinate, f64)>>,
    discount: f64,
    success: f64,
}

impl Model {
    fn build(maze: &Maze, config: ValueIterationConfig) -> Result<Self> {
        let mut destinations = HashMap::new();
        for state in maze.states().filter(|s| !s.terminal) {
            let reachable = maze
                .destinations(state)?
                .into_iter()
                .map(|(action, next)| (action, next.position, next.reward))
                .collect();
            destinations.insert(state.position, reachable);
        }
        Ok(Self {
            destinations,
            discount: config.discount.value(),
            success: config.success_probability.value(),
        })
    }

    /// Expected return of each available action in `from`.
    fn action_returns<'a>(
        &'a self,
        from: Coordinate,
        values: &'a HashMap<Coordinate, f64>,
    ) -> impl Iterator<Item = (Action, f64)> + 'a {
        let reachable = self
            .destinations
            .get(&from)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let n = reachable.len();
        let backup = move |to: Coordinate, reward: f64| {
            reward + self.discount * values.get(&to).copied().unwrap_or(0.0)
        };

        reachable.iter().enumerate().map(move |(i, &(action, to, reward))| {
            if n == 1 {
                return (action, backup(to, reward));
            }
            let slip = (1.0 - self.success) / (n - 1) as f64;
            let expected: f64 = reachable
                .iter()
                .enumerate()
                .map(|(j, &(_, other, other_reward))| {
                    let p = if i == j { self.success } else { slip };
                    p * backup(other, other_reward)
                })
                .sum();
            (action, expected)
        })
    }

    /// Argmax over available actions; ties go to the earliest action.
    fn best_action(&self, state: &State, values: &HashMap<Coordinate, f64>) -> Option<Action> {
        if state.terminal {
            return None;
        }
        let mut best: Option<(Action, f64)> = None;
        for (action, q) in self.action_returns(state.position, values) {
            if best.is_none_or(|(_, best_q)| q > best_q) {
                best = Some((action, q));
            }
        }
        best.map(|(action, _)| action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::MazeKind;

    fn assignment_maze() -> Maze {
        let rewards = vec![
            vec![10.0, -1.0, -1.0, -1.0],
            vec![-2.0, -1.0, -1.0, -1.0],
            vec![-1.0, -1.0, -10.0, -1.0],
            vec![-1.0, -1.0, -10.0, 40.0],
        ];
        let mut maze = Maze::new(4, 4, &rewards, MazeKind::Bounded).unwrap();
        maze.set_terminal(Coordinate::new(0, 0)).unwrap();
        maze.set_terminal(Coordinate::new(3, 3)).unwrap();
        maze
    }

    #[test]
    fn test_terminal_values_stay_zero() {
        let maze = assignment_maze();
        let config = ValueIterationConfig::new(0.01, 0.9, 1.0).unwrap();
        let policy = OptimalPolicy::solve(&maze, config).unwrap();
        assert_eq!(policy.value(Coordinate::new(0, 0)), Some(0.0));
        assert_eq!(policy.value(Coordinate::new(3, 3)), Some(0.0));
        assert_eq!(policy.action(Coordinate::new(3, 3)), None);
    }

    #[test]
    fn test_deterministic_values() {
        let maze = assignment_maze();
        let config = ValueIterationConfig::new(1e-9, 0.9, 1.0).unwrap();
        let policy = OptimalPolicy::solve(&maze, config).unwrap();

        // One step from the +40 terminal
        let below_goal = policy.value(Coordinate::new(3, 2)).unwrap();
        assert!((below_goal - 40.0).abs() < 1e-9);
        assert_eq!(policy.action(Coordinate::new(3, 2)), Some(Action::Up));

        // One step from the +10 terminal, but (1,1) is worth more
        let right_of_start = policy.value(Coordinate::new(1, 0)).unwrap();
        assert!(right_of_start > 10.0);
    }

    #[test]
    fn test_start_heads_towards_goal() {
        let maze = assignment_maze();
        let config = ValueIterationConfig::new(0.001, 0.9, 1.0).unwrap();
        let policy = OptimalPolicy::solve(&maze, config).unwrap();
        // Up and Right are equally good from the start
        assert!(matches!(
            policy.action(Coordinate::new(2, 0)),
            Some(Action::Up | Action::Right)
        ));
        assert_eq!(policy.action(Coordinate::new(3, 0)), Some(Action::Up));
        assert_eq!(policy.action(Coordinate::new(3, 1)), Some(Action::Up));
    }

    #[test]
    fn test_single_destination_is_certain() {
        let rewards = vec![vec![0.0], vec![5.0]];
        let mut maze = Maze::new(2, 1, &rewards, MazeKind::Strict).unwrap();
        maze.set_terminal(Coordinate::new(1, 0)).unwrap();
        let config = ValueIterationConfig::new(1e-9, 1.0, 0.5).unwrap();
        let policy = OptimalPolicy::solve(&maze, config).unwrap();
        assert!((policy.value(Coordinate::new(0, 0)).unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_slip_mixes_destinations() {
        // From the middle of a 3x1 strip: right gives 10, left gives 0
        let rewards = vec![vec![0.0], vec![0.0], vec![10.0]];
        let mut maze = Maze::new(3, 1, &rewards, MazeKind::Strict).unwrap();
        maze.set_terminal(Coordinate::new(0, 0)).unwrap();
        maze.set_terminal(Coordinate::new(2, 0)).unwrap();
        let config = ValueIterationConfig::new(1e-9, 1.0, 0.8).unwrap();
        let policy = OptimalPolicy::solve(&maze, config).unwrap();
        let middle = policy.value(Coordinate::new(1, 0)).unwrap();
        assert!((middle - 8.0).abs() < 1e-9);
        assert_eq!(policy.action(Coordinate::new(1, 0)), Some(Action::Right));
    }

    #[test]
    fn test_bounded_wall_bump_is_planned_for() {
        // Bumping the wall from (0,0) re-enters the +5 cell forever
        let rewards = vec![vec![5.0], vec![0.0]];
        let mut maze = Maze::new(2, 1, &rewards, MazeKind::Bounded).unwrap();
        maze.set_terminal(Coordinate::new(1, 0)).unwrap();
        let config = ValueIterationConfig::new(1e-9, 0.9, 1.0).unwrap();
        let policy = OptimalPolicy::solve(&maze, config).unwrap();

        let value = policy.value(Coordinate::new(0, 0)).unwrap();
        assert!((value - 50.0).abs() < 1e-6);
        assert_eq!(policy.action(Coordinate::new(0, 0)), Some(Action::Up));
    }

    #[test]
    fn test_bounded_slip_spreads_over_all_actions() {
        // Middle of a bounded 3x1 strip: four destinations, two of them
        // bumping back into the middle
        let rewards = vec![vec![0.0], vec![0.0], vec![10.0]];
        let mut maze = Maze::new(3, 1, &rewards, MazeKind::Bounded).unwrap();
        maze.set_terminal(Coordinate::new(0, 0)).unwrap();
        maze.set_terminal(Coordinate::new(2, 0)).unwrap();
        let config = ValueIterationConfig::new(1e-12, 1.0, 0.8).unwrap();
        let policy = OptimalPolicy::solve(&maze, config).unwrap();

        // V = 0.8 * 10 + (0.2 / 3) * (V + V + 0)
        let expected = 8.0 / (1.0 - 0.4 / 3.0);
        let middle = policy.value(Coordinate::new(1, 0)).unwrap();
        assert!((middle - expected).abs() < 1e-9);
        assert_eq!(policy.action(Coordinate::new(1, 0)), Some(Action::Right));
    }

    #[test]
    fn test_history_is_recorded() {
        let maze = assignment_maze();
        let config = ValueIterationConfig::new(0.01, 0.9, 1.0)
            .unwrap()
            .with_history(true);
        let policy = OptimalPolicy::solve(&maze, config).unwrap();
        assert_eq!(policy.history().len(), policy.sweeps());
        assert!(policy.history().last().unwrap().delta < 0.01);
    }

    #[test]
    fn test_not_converged() {
        let maze = assignment_maze();
        let config = ValueIterationConfig::new(0.0, 1.0, 1.0)
            .unwrap()
            .with_max_sweeps(2);
        let err = OptimalPolicy::solve(&maze, config).unwrap_err();
        assert!(matches!(err, Error::NotConverged { sweeps: 2, .. }));
    }

    #[test]
    fn test_invalid_discount() {
        assert!(ValueIterationConfig::new(0.01, 1.5, 1.0).is_err());
        assert!(ValueIterationConfig::new(-1.0, 0.9, 1.0).is_err());
    }
}
