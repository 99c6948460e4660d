//! SARSA and Q-learning agents
//!
//! Both agents keep a single [`ActionValueTable`] and explore ε-greedily.
//! They differ only in the bootstrap target:
//!
//! | Agent | Target |
//! |-------|--------|
//! | SARSA | `r + γ Q(s', a')` for the `a'` it will actually take |
//! | Q-learning | `r + γ max_a Q(s', a)` |

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{
    params::{LearningParams, build_rng, epsilon_greedy},
    table::ActionValueTable,
};
use crate::{
    Error, Result,
    maze::{Action, Coordinate, Maze, State, Transition},
    ports::Learner,
};

/// Snapshot of a tabular control agent, used by the save format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentState {
    pub tables: Vec<ActionValueTable>,
    pub params: LearningParams,
    pub epsilon: f64,
    pub rng_seed: Option<u64>,
}

/// Table, exploration rate and RNG shared by the single-table agents.
#[derive(Debug, Clone)]
struct ControlCore {
    table: ActionValueTable,
    params: LearningParams,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl ControlCore {
    fn new(params: LearningParams) -> Self {
        Self {
            table: ActionValueTable::new(),
            params,
            epsilon: params.epsilon.value(),
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    /// ε-greedy action in `coordinate`, visiting it first.
    fn explore(&mut self, maze: &Maze, coordinate: Coordinate) -> Result<Action> {
        let values = *self.table.visit(coordinate);
        let available = maze.available_actions(coordinate);
        epsilon_greedy(&mut self.rng, self.epsilon, &available, |a| {
            values[a.index()]
        })
        .ok_or(Error::NoAvailableActions { coordinate })
    }

    fn select(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>> {
        if state.terminal {
            return Ok(None);
        }
        self.explore(maze, state.position).map(Some)
    }

    fn decay_epsilon(&mut self) {
        self.epsilon = self.params.decayed(self.epsilon);
    }

    fn reset(&mut self) {
        self.table.clear();
        self.epsilon = self.params.epsilon.value();
        self.rng = build_rng(self.rng_seed);
    }

    fn export_state(&self) -> AgentState {
        AgentState {
            tables: vec![self.table.clone()],
            params: self.params,
            epsilon: self.epsilon,
            rng_seed: self.rng_seed,
        }
    }

    fn from_state(state: AgentState) -> Result<Self> {
        let table = state
            .tables
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidConfiguration {
                message: "saved agent has no action-value table".to_string(),
            })?;
        Ok(Self {
            table,
            params: state.params,
            epsilon: state.epsilon,
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        })
    }
}

/// SARSA agent (on-policy TD control)
///
/// After every transition it picks `a'` ε-greedily in `s'`, updates towards
/// `Q(s', a')` and commits to `a'` as its next action.
#[derive(Debug, Clone)]
pub struct SarsaAgent {
    core: ControlCore,
}

impl SarsaAgent {
    pub fn new(params: LearningParams) -> Self {
        Self {
            core: ControlCore::new(params),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.core.seed(seed);
        self
    }

    pub fn table(&self) -> &ActionValueTable {
        &self.core.table
    }

    pub fn params(&self) -> &LearningParams {
        &self.core.params
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.core.epsilon
    }

    /// Switch to a new discount factor, keeping the learned values.
    pub fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        self.core.params = self.core.params.with_gamma(gamma)?;
        Ok(())
    }

    pub(crate) fn export_state(&self) -> AgentState {
        self.core.export_state()
    }

    pub(crate) fn from_state(state: AgentState) -> Result<Self> {
        Ok(Self {
            core: ControlCore::from_state(state)?,
        })
    }
}

impl Learner for SarsaAgent {
    fn select_action(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>> {
        self.core.select(maze, state)
    }

    fn learn(&mut self, maze: &Maze, transition: &Transition) -> Result<Option<Action>> {
        let (next_action, next_q) = if transition.terminal {
            (None, 0.0)
        } else {
            let a = self.core.explore(maze, transition.to)?;
            (Some(a), self.core.table.value(transition.to, a))
        };

        let target = transition.reward + self.core.params.gamma.value() * next_q;
        self.core.table.update(
            transition.from,
            transition.action,
            target,
            self.core.params.alpha.value(),
        );
        Ok(next_action)
    }

    fn end_episode(&mut self) -> Result<()> {
        self.core.decay_epsilon();
        Ok(())
    }

    fn name(&self) -> &str {
        "SARSA"
    }

    fn reset(&mut self) -> Result<()> {
        self.core.reset();
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn action_values(&self, coordinate: Coordinate) -> Option<[f64; 4]> {
        self.core.table.get(coordinate)
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.core.seed(seed);
        Ok(())
    }
}

/// Q-learning agent (off-policy TD control, SARSAMAX)
///
/// Learns `Q*` by bootstrapping from the best action in `s'`, whatever the
/// agent does next.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    core: ControlCore,
}

impl QLearningAgent {
    pub fn new(params: LearningParams) -> Self {
        Self {
            core: ControlCore::new(params),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.core.seed(seed);
        self
    }

    pub fn table(&self) -> &ActionValueTable {
        &self.core.table
    }

    pub fn params(&self) -> &LearningParams {
        &self.core.params
    }

    pub fn epsilon(&self) -> f64 {
        self.core.epsilon
    }

    pub fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        self.core.params = self.core.params.with_gamma(gamma)?;
        Ok(())
    }

    pub(crate) fn export_state(&self) -> AgentState {
        self.core.export_state()
    }

    pub(crate) fn from_state(state: AgentState) -> Result<Self> {
        Ok(Self {
            core: ControlCore::from_state(state)?,
        })
    }
}

impl Learner for QLearningAgent {
    fn select_action(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>> {
        self.core.select(maze, state)
    }

    fn learn(&mut self, maze: &Maze, transition: &Transition) -> Result<Option<Action>> {
        self.core.table.visit(transition.to);
        let max_next_q = if transition.terminal {
            0.0
        } else {
            self.core
                .table
                .max(transition.to, &maze.available_actions(transition.to))
        };

        let target = transition.reward + self.core.params.gamma.value() * max_next_q;
        self.core.table.update(
            transition.from,
            transition.action,
            target,
            self.core.params.alpha.value(),
        );
        Ok(None)
    }

    fn end_episode(&mut self) -> Result<()> {
        self.core.decay_epsilon();
        Ok(())
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn reset(&mut self) -> Result<()> {
        self.core.reset();
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn action_values(&self, coordinate: Coordinate) -> Option<[f64; 4]> {
        self.core.table.get(coordinate)
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.core.seed(seed);
        Ok(())
    }
}
