//! Policy port - maps states to actions

use crate::{
    Result,
    maze::{Action, Maze, State},
};

/// A (possibly stochastic) mapping from states to actions.
pub trait Policy: Send {
    /// Action to take in `state`; `None` where the policy prescribes no
    /// action (terminal states).
    fn select_action(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>>;

    fn name(&self) -> &str;

    /// Seed the policy's random number generator, if it has one.
    fn set_rng_seed(&mut self, _seed: u64) {}
}
