//! Learner port - abstraction for agents driven through a maze
//!
//! The training pipeline owns the episode loop. A learner only chooses
//! actions and digests the transitions the pipeline hands back, which keeps
//! every algorithm (fixed policy, TD(0), SARSA, Q-learning, double Q) behind
//! one interface.

use crate::{
    Result,
    maze::{Action, Coordinate, Maze, State, Transition},
};

/// Learner trait - Unified interface for all maze agents
///
/// # Episode protocol
///
/// 1. If the previous [`Learner::learn`] returned `Some(action)`, the
///    pipeline executes that action; otherwise it calls
///    [`Learner::select_action`].
/// 2. `None` from `select_action` ends the episode.
/// 3. The pipeline steps the maze and calls [`Learner::learn`] with the
///    resulting [`Transition`].
/// 4. After the final step the pipeline calls [`Learner::end_episode`].
///
/// # Examples
///
/// ```no_run
/// use mazerl::{maze::Maze, ports::Learner};
///
/// fn greedy_action(learner: &mut dyn Learner, maze: &Maze) -> mazerl::Result<()> {
///     let start = *maze.state((0, 0).into())?;
///     let _ = learner.select_action(maze, &start)?;
///     Ok(())
/// }
/// ```
pub trait Learner: Send {
    /// Choose an action in `state`, or `None` if no action applies.
    fn select_action(&mut self, maze: &Maze, state: &State) -> Result<Option<Action>>;

    /// Update from one transition.
    ///
    /// On-policy learners return the action they have committed to for the
    /// next step. The default does nothing and commits to nothing.
    fn learn(&mut self, _maze: &Maze, _transition: &Transition) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Called once after every episode.
    fn end_episode(&mut self) -> Result<()> {
        Ok(())
    }

    /// Get the learner's name.
    fn name(&self) -> &str;

    /// Forget everything learned and restore initial parameters.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// Enable downcasting to concrete types.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Action values `[up, down, left, right]` for a state, if the learner
    /// keeps them and has visited the state.
    fn action_values(&self, _coordinate: Coordinate) -> Option<[f64; 4]> {
        None
    }

    /// State value, for learners that estimate `V(s)`.
    fn state_value(&self, _coordinate: Coordinate) -> Option<f64> {
        None
    }

    /// Seed the learner's internal random number generator.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }
}
