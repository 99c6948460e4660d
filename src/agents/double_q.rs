//! Double Q-learning.

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{
    control::AgentState,
    params::{LearningParams, build_rng, epsilon_greedy},
    table::ActionValueTable,
};
use crate::{
    Error, Result,
    maze::{Action, Coordinate, Maze, State, Transition},
    ports::Learner,
};

/// Double Q-learning agent
///
/// Behaves ε-greedily on `Q₁ + Q₂`. Each step a fair coin picks the table to
/// update; that table chooses `a* = argmax Q(s', ·)` and the other table
/// evaluates it, which removes the maximisation bias of plain Q-learning.
#[derive(Debug, Clone)]
pub struct DoubleQAgent {
    first: ActionValueTable,
    second: ActionValueTable,
    params: LearningParams,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl DoubleQAgent {
    pub fn new(params: LearningParams) -> Self {
        Self {
            first: ActionValueTable::new(),
            second: ActionValueTable::new(),
            params,
            epsilon: params.epsilon.value(),
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn first(&self) -> &ActionValueTable {
        &self.first
    }

    pub fn second(&self) -> &ActionValueTable {
        &self.second
    }

    /// `Q₁ + Q₂`, the values the behaviour policy acts on.
    pub fn combined(&self) -> ActionValueTable {
        self.first.sum(&self.second)
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        self.params = self.params.with_gamma(gamma)?;
        Ok(())
    }

    fn visit(&mut self, coordinate: Coordinate) {
        self.first.visit(coordinate);
        self.second.visit(coordinate);
    }

    pub(crate) fn export_state(&self) -> AgentState {
        AgentState {
            tables: vec![self.first.clone(), self.second.clone()],
            params: self.params,
            epsilon: self.epsilon,
            rng_seed: self.rng_seed,
        }
    }

    pub(crate) fn from_state(state: AgentState) -> Result<Self> {
        let [first, second]: [ActionValueTable; 2] =
            state
                .tables
                .try_into()
                .map_err(|tables: Vec<ActionValueTable>| Error::InvalidConfiguration {
                    message: format!(
                        "double Q agent needs 2 action-value tables, found {}",
                        tables.len()
                    ),
                })?;
        Ok(Self {
            first,
            second,
            params: state.params,
            epsilon: state.epsilon,
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        })
    }
}

impl Learner for DoubleQAgent {
    fn select_action(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>> {
        if state.terminal {
            return Ok(None);
        }
        let coordinate = state.position;
        self.visit(coordinate);
        let a = self.first.values(coordinate);
        let b = self.second.values(coordinate);
        let available = maze.available_actions(coordinate);
        epsilon_greedy(&mut self.rng, self.epsilon, &available, |action| {
            a[action.index()] + b[action.index()]
        })
        .map(Some)
        .ok_or(Error::NoAvailableActions { coordinate })
    }

    fn learn(&mut self, maze: &Maze, transition: &Transition) -> Result<Option<Action>> {
        self.visit(transition.to);

        let (update, evaluate) = if self.rng.random::<bool>() {
            (&mut self.second, &self.first)
        } else {
            (&mut self.first, &self.second)
        };

        let bootstrap = if transition.terminal {
            0.0
        } else {
            update
                .greedy(transition.to, &maze.available_actions(transition.to))
                .map_or(0.0, |best| evaluate.value(transition.to, best))
        };

        let target = transition.reward + self.params.gamma.value() * bootstrap;
        update.update(
            transition.from,
            transition.action,
            target,
            self.params.alpha.value(),
        );
        Ok(None)
    }

    fn end_episode(&mut self) -> Result<()> {
        self.epsilon = self.params.decayed(self.epsilon);
        Ok(())
    }

    fn name(&self) -> &str {
        "Double Q-Learning"
    }

    fn reset(&mut self) -> Result<()> {
        self.first.clear();
        self.second.clear();
        self.epsilon = self.params.epsilon.value();
        self.rng = build_rng(self.rng_seed);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn action_values(&self, coordinate: Coordinate) -> Option<[f64; 4]> {
        let a = self.first.get(coordinate)?;
        let b = self.second.values(coordinate);
        Some(std::array::from_fn(|i| a[i] + b[i]))
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        Ok(())
    }
}
