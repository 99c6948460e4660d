//! Observer port - abstraction for training observation and data collection
//!
//! Observers are composed onto a training pipeline to collect progress,
//! metrics or trajectories without coupling the episode loop to any output
//! format.

use crate::{Result, maze::Transition, pipeline::EpisodeSummary};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - once
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(episode, transition)` - once per step
///    - `on_episode_end(episode, summary)`
/// 3. `on_training_end()` - once
///
/// # Examples
///
/// ```no_run
/// use mazerl::{pipeline::EpisodeSummary, ports::Observer};
///
/// struct CountTerminal {
///     reached: usize,
/// }
///
/// impl Observer for CountTerminal {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         summary: &EpisodeSummary,
///     ) -> mazerl::Result<()> {
///         if summary.reached_terminal {
///             self.reached += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after the maze has resolved a step, before the learner
    /// updates from it.
    fn on_step(&mut self, _episode: usize, _transition: &Transition) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _episode: usize, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
