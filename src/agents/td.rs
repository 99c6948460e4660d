//! TD(0) policy evaluation.

use std::collections::HashMap;

use crate::{
    Result,
    maze::{Action, Coordinate, Maze, State, Transition},
    ports::{Learner, Policy},
    types::UnitInterval,
};

/// Follows a [`Policy`] and learns its state values.
///
/// `V(s) ← V(s) + α[r + γV(s') − V(s)]`, with `V` zero-initialised the
/// first time a state is seen and terminal states contributing `0`.
pub struct TemporalDifferenceAgent {
    policy: Box<dyn Policy>,
    values: HashMap<Coordinate, f64>,
    alpha: UnitInterval,
    gamma: UnitInterval,
}

impl TemporalDifferenceAgent {
    pub fn new(policy: Box<dyn Policy>, alpha: f64, gamma: f64) -> Result<Self> {
        Ok(Self {
            policy,
            values: HashMap::new(),
            alpha: UnitInterval::new("alpha", alpha)?,
            gamma: UnitInterval::new("gamma", gamma)?,
        })
    }

    /// Change α and γ while keeping the values learned so far.
    pub fn set_params(&mut self, alpha: f64, gamma: f64) -> Result<()> {
        self.alpha = UnitInterval::new("alpha", alpha)?;
        self.gamma = UnitInterval::new("gamma", gamma)?;
        Ok(())
    }

    pub fn alpha(&self) -> f64 {
        self.alpha.value()
    }

    pub fn gamma(&self) -> f64 {
        self.gamma.value()
    }

    pub fn values(&self) -> &HashMap<Coordinate, f64> {
        &self.values
    }

    pub fn value(&self, coordinate: Coordinate) -> Option<f64> {
        self.values.get(&coordinate).copied()
    }
}

impl Learner for TemporalDifferenceAgent {
    fn select_action(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>> {
        if !state.terminal {
            self.values.entry(state.position).or_insert(0.0);
        }
        self.policy.select_action(maze, state)
    }

    fn learn(&mut self, _maze: &Maze, transition: &Transition) -> Result<Option<Action>> {
        let next = *self.values.entry(transition.to).or_insert(0.0);
        let bootstrap = if transition.terminal { 0.0 } else { next };
        let target = transition.reward + self.gamma.value() * bootstrap;

        let v = self.values.entry(transition.from).or_insert(0.0);
        *v += self.alpha.value() * (target - *v);
        Ok(None)
    }

    fn name(&self) -> &str {
        "TD(0)"
    }

    fn reset(&mut self) -> Result<()> {
        self.values.clear();
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn state_value(&self, coordinate: Coordinate) -> Option<f64> {
        self.value(coordinate)
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.policy.set_rng_seed(seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{maze::MazeKind, policy::HardcodedPolicy};

    fn step(from: (usize, usize), to: (usize, usize), reward: f64, terminal: bool) -> Transition {
        Transition {
            step: 0,
            from: from.into(),
            action: Action::Right,
            reward,
            to: to.into(),
            terminal,
        }
    }

    #[test]
    fn test_td_update_arithmetic() {
        let maze = Maze::uniform(3, 1, 0.0, MazeKind::Bounded).unwrap();
        let policy = HardcodedPolicy::from_rows(&["RRR"]).unwrap();
        let mut agent = TemporalDifferenceAgent::new(Box::new(policy), 0.5, 0.9).unwrap();

        agent.learn(&maze, &step((1, 0), (2, 0), 4.0, false)).unwrap();
        // V(1) = 0 + 0.5 * (4 + 0.9 * 0 - 0) = 2
        assert!((agent.value(Coordinate::new(1, 0)).unwrap() - 2.0).abs() < 1e-12);

        agent.learn(&maze, &step((0, 0), (1, 0), -1.0, false)).unwrap();
        // V(0) = 0 + 0.5 * (-1 + 0.9 * 2 - 0) = 0.4
        assert!((agent.value(Coordinate::new(0, 0)).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_contributes_zero() {
        let maze = Maze::uniform(2, 1, 0.0, MazeKind::Bounded).unwrap();
        let policy = HardcodedPolicy::from_rows(&["RX"]).unwrap();
        let mut agent = TemporalDifferenceAgent::new(Box::new(policy), 1.0, 1.0).unwrap();
        agent.values.insert(Coordinate::new(1, 0), 100.0);
        agent.learn(&maze, &step((0, 0), (1, 0), 5.0, true)).unwrap();
        assert!((agent.value(Coordinate::new(0, 0)).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_select_action_initialises_value() {
        let maze = Maze::uniform(2, 1, 0.0, MazeKind::Bounded).unwrap();
        let policy = HardcodedPolicy::from_rows(&["RX"]).unwrap();
        let mut agent = TemporalDifferenceAgent::new(Box::new(policy), 0.1, 1.0).unwrap();
        let start = *maze.state(Coordinate::new(0, 0)).unwrap();
        assert_eq!(
            agent.select_action(&maze, &start).unwrap(),
            Some(Action::Right)
        );
        assert_eq!(agent.state_value(Coordinate::new(0, 0)), Some(0.0));
    }

    #[test]
    fn test_set_params_keeps_values() {
        let maze = Maze::uniform(2, 1, 0.0, MazeKind::Bounded).unwrap();
        let policy = HardcodedPolicy::from_rows(&["RR"]).unwrap();
        let mut agent = TemporalDifferenceAgent::new(Box::new(policy), 1.0, 1.0).unwrap();
        agent.learn(&maze, &step((0, 0), (1, 0), 3.0, false)).unwrap();
        agent.set_params(0.1, 0.5).unwrap();
        assert_eq!(agent.gamma(), 0.5);
        assert!((agent.value(Coordinate::new(0, 0)).unwrap() - 3.0).abs() < 1e-12);
        assert!(agent.set_params(0.1, 2.0).is_err());
    }
}
