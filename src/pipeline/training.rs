//! Episode-driving training pipeline

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    agents::{ActionValueTable, PolicyAgent, build_rng},
    maze::{Coordinate, Maze, Transition},
    policy::GreedyPolicy,
    ports::{Learner, Observer},
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of episodes
    pub episodes: usize,

    /// Random seed; the maze uses `seed` and the learner `seed + 1`
    pub seed: Option<u64>,

    /// Episodes are cut off after this many steps
    pub max_steps: usize,

    /// Every episode starts here
    pub start: Coordinate,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            seed: None,
            max_steps: 10_000,
            start: Coordinate::new(0, 0),
        }
    }
}

/// Outcome of one episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    /// Undiscounted sum of rewards
    pub total_return: f64,
    pub final_position: Coordinate,
    pub reached_terminal: bool,
    /// Stopped by `max_steps`
    pub truncated: bool,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes run
    pub episodes: usize,

    pub total_steps: usize,

    pub mean_return: f64,

    pub mean_steps: f64,

    /// Fraction of episodes that ended in a terminal state
    pub terminal_rate: f64,

    /// Number of episodes cut off by `max_steps`
    pub truncated: usize,

    pub best_return: f64,

    pub worst_return: f64,
}

impl TrainingResult {
    /// Aggregate episode summaries.
    pub fn from_summaries(summaries: &[EpisodeSummary]) -> Self {
        let episodes = summaries.len();
        let total_steps: usize = summaries.iter().map(|s| s.steps).sum();
        let total_return: f64 = summaries.iter().map(|s| s.total_return).sum();
        let reached = summaries.iter().filter(|s| s.reached_terminal).count();
        let truncated = summaries.iter().filter(|s| s.truncated).count();
        let best_return = summaries
            .iter()
            .map(|s| s.total_return)
            .fold(f64::NEG_INFINITY, f64::max);
        let worst_return = summaries
            .iter()
            .map(|s| s.total_return)
            .fold(f64::INFINITY, f64::min);

        let per_episode = |total: f64| {
            if episodes > 0 {
                total / episodes as f64
            } else {
                0.0
            }
        };

        Self {
            episodes,
            total_steps,
            mean_return: per_episode(total_return),
            mean_steps: per_episode(total_steps as f64),
            terminal_rate: per_episode(reached as f64),
            truncated,
            best_return: if episodes > 0 { best_return } else { 0.0 },
            worst_return: if episodes > 0 { worst_return } else { 0.0 },
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Training pipeline for a single learner in a maze
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
    rng: StdRng,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        let rng = build_rng(config.seed);
        Self {
            config,
            observers: Vec::new(),
            rng,
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run `config.episodes` episodes of `learner` in `maze`.
    ///
    /// # Errors
    ///
    /// Fails if the start lies outside the maze, or on the first error from
    /// the maze, the learner or an observer.
    pub fn run(&mut self, learner: &mut dyn Learner, maze: &Maze) -> Result<TrainingResult> {
        maze.state(self.config.start)?;
        self.seed_pair(learner)?;

        tracing::debug!(
            learner = learner.name(),
            episodes = self.config.episodes,
            maze = maze.kind().name(),
            "starting training"
        );

        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        let mut summaries = Vec::with_capacity(self.config.episodes);
        for episode in 0..self.config.episodes {
            let summary = self.run_episode(episode, learner, maze)?;

            for observer in &mut self.observers {
                observer.on_episode_end(episode, &summary)?;
            }
            summaries.push(summary);
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let truncated = summaries.iter().filter(|s| s.truncated).count();
        if truncated > 0 {
            tracing::warn!(
                truncated,
                max_steps = self.config.max_steps,
                "episodes were cut off before reaching a terminal state"
            );
        }

        Ok(TrainingResult::from_summaries(&summaries))
    }

    fn seed_pair(&mut self, learner: &mut dyn Learner) -> Result<()> {
        if let Some(seed) = self.config.seed {
            self.rng = StdRng::seed_from_u64(seed);
            learner.set_rng_seed(seed.wrapping_add(1))?;
        }
        Ok(())
    }

    fn run_episode(
        &mut self,
        episode: usize,
        learner: &mut dyn Learner,
        maze: &Maze,
    ) -> Result<EpisodeSummary> {
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut state = *maze.state(self.config.start)?;
        let mut pending = None;
        let mut steps = 0;
        let mut total_return = 0.0;
        let mut truncated = false;

        while !state.terminal {
            if steps >= self.config.max_steps {
                truncated = true;
                break;
            }

            let action = match pending.take() {
                Some(action) => action,
                None => match learner.select_action(maze, &state)? {
                    Some(action) => action,
                    None => break,
                },
            };

            let (to, reward) = maze.step_reward(state.position, action, &mut self.rng)?;
            let next = *maze.state(to)?;
            let transition = Transition {
                step: steps,
                from: state.position,
                action,
                reward,
                to,
                terminal: next.terminal,
            };

            for observer in &mut self.observers {
                observer.on_step(episode, &transition)?;
            }
            pending = learner.learn(maze, &transition)?;

            total_return += reward;
            steps += 1;
            state = next;
        }

        learner.end_episode()?;

        Ok(EpisodeSummary {
            episode,
            steps,
            total_return,
            final_position: state.position,
            reached_terminal: state.terminal,
            truncated,
        })
    }
}

/// Greedy snapshot of a learner's action values.
pub fn greedy_snapshot(learner: &dyn Learner, maze: &Maze) -> ActionValueTable {
    let mut table = ActionValueTable::new();
    for state in maze.states() {
        if let Some(values) = learner.action_values(state.position) {
            *table.visit(state.position) = values;
        }
    }
    table
}

/// Run `config.episodes` episodes acting greedily on `learner`'s action
/// values, without exploring or learning.
pub fn evaluate(learner: &dyn Learner, maze: &Maze, config: TrainingConfig) -> Result<TrainingResult> {
    let policy = GreedyPolicy::new(greedy_snapshot(learner, maze));
    evaluate_policy(policy, maze, config)
}

/// Like [`evaluate`], for a policy built directly from a table.
pub fn evaluate_policy(
    policy: GreedyPolicy,
    maze: &Maze,
    config: TrainingConfig,
) -> Result<TrainingResult> {
    let mut agent = PolicyAgent::new(Box::new(policy));
    TrainingPipeline::new(config).run(&mut agent, maze)
}
