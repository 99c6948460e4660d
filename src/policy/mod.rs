//! Policies: fixed rules mapping maze states to actions.
//!
//! | Policy | Source of actions |
//! |--------|-------------------|
//! | [`RandomPolicy`] | uniform over the maze's available actions |
//! | [`HardcodedPolicy`] | a per-cell table, usually parsed from display rows |
//! | [`OptimalPolicy`] | value iteration against the maze model |
//! | [`GreedyPolicy`] | argmax of a learned [`ActionValueTable`] |
//!
//! [`ActionValueTable`]: crate::agents::ActionValueTable

pub mod greedy;
pub mod hardcoded;
pub mod optimal;
pub mod random;

pub use greedy::GreedyPolicy;
pub use hardcoded::HardcodedPolicy;
pub use optimal::{OptimalPolicy, ValueIterationConfig};
pub use random::RandomPolicy;

use crate::{
    Result,
    maze::Maze,
    ports::Policy,
    render::{self, GridTable},
};

/// Render the action `policy` picks in every cell; terminal cells show `✕`.
///
/// Stochastic policies are sampled once per cell.
pub fn render_policy(maze: &Maze, policy: &mut dyn Policy) -> Result<GridTable> {
    let mut actions = Vec::with_capacity(maze.width() * maze.height());
    for state in maze.states() {
        actions.push((state.position, policy.select_action(maze, state)?));
    }

    Ok(render::policy_table(maze, |coordinate| {
        actions
            .iter()
            .find(|(c, _)| *c == coordinate)
            .and_then(|(_, action)| *action)
    }))
}
