//! Shared configuration handling for CLI commands
//!
//! Commands start from an [`ExperimentConfig`] (a file given with `--config`,
//! or the defaults) and apply command-line overrides on top.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::{
    app::ExperimentConfig,
    maze::{Coordinate, Maze, MazeKind},
    scenarios::{ASSIGNMENT_START, RANDOM_START, assignment_maze, random_maze},
    types::UnitInterval,
};

/// Slip probability of the stochastic preset
const PRESET_SLIP: f64 = 0.1;

/// Learning parameter overrides shared by `train` and friends
#[derive(Args, Debug, Clone, Default)]
pub struct LearningArgs {
    /// Learning rate α (0.0-1.0)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor γ (0.0-1.0)
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Initial exploration rate ε (0.0-1.0)
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Multiplicative ε decay per episode
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Lower bound for ε
    #[arg(long)]
    pub min_epsilon: Option<f64>,
}

impl LearningArgs {
    pub fn apply(&self, config: &mut ExperimentConfig) {
        let learning = &mut config.learning;
        if let Some(alpha) = self.alpha {
            learning.alpha = alpha;
        }
        if let Some(gamma) = self.gamma {
            learning.gamma = gamma;
        }
        if let Some(epsilon) = self.epsilon {
            learning.epsilon = epsilon;
        }
        if let Some(decay) = self.epsilon_decay {
            learning.epsilon_decay = decay;
        }
        if let Some(min) = self.min_epsilon {
            learning.min_epsilon = min;
        }
    }
}

/// Built-in mazes selectable with `--maze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MazePreset {
    /// 4×4 assignment maze, bounded moves
    Assignment,
    /// 4×4 assignment maze, slip 0.1
    Stochastic,
    /// 5×7 random stochastic maze drawn from the seed
    Random,
}

impl MazePreset {
    /// Build the preset maze and its start cell.
    pub fn build(self, seed: Option<u64>) -> crate::Result<(Maze, Coordinate)> {
        match self {
            MazePreset::Assignment => Ok((assignment_maze(MazeKind::Bounded)?, ASSIGNMENT_START)),
            MazePreset::Stochastic => {
                let slip = UnitInterval::new("slip", PRESET_SLIP)?;
                Ok((assignment_maze(MazeKind::Stochastic { slip })?, ASSIGNMENT_START))
            }
            MazePreset::Random => Ok((random_maze(seed)?, RANDOM_START)),
        }
    }
}

/// Read `--config` if given, else start from the defaults.
pub fn load_experiment(path: Option<&Path>) -> Result<ExperimentConfig> {
    match path {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ExperimentConfig::default()),
    }
}

/// The maze to run on and its start cell: a preset wins over the config.
pub fn resolve_maze(
    config: &ExperimentConfig,
    preset: Option<MazePreset>,
) -> Result<(Maze, Coordinate)> {
    match preset {
        Some(preset) => preset
            .build(config.seed)
            .with_context(|| format!("Failed to build {preset:?} maze")),
        None => {
            let maze = config.build_maze().context("Invalid [maze] configuration")?;
            Ok((maze, config.maze.start()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learning_overrides() {
        let mut config = ExperimentConfig::default();
        LearningArgs {
            alpha: Some(0.5),
            min_epsilon: Some(0.05),
            ..LearningArgs::default()
        }
        .apply(&mut config);

        assert_eq!(config.learning.alpha, 0.5);
        assert_eq!(config.learning.gamma, 0.9);
        assert_eq!(config.learning.min_epsilon, 0.05);
    }

    #[test]
    fn test_presets() {
        let config = ExperimentConfig::default();

        let (maze, start) = resolve_maze(&config, Some(MazePreset::Stochastic)).unwrap();
        assert_eq!(maze.kind().name(), "stochastic");
        assert_eq!(start, ASSIGNMENT_START);

        let (maze, start) = resolve_maze(&config, Some(MazePreset::Random)).unwrap();
        assert_eq!((maze.width(), maze.height()), (5, 7));
        assert_eq!(start, RANDOM_START);

        let (maze, start) = resolve_maze(&config, None).unwrap();
        assert_eq!(maze.kind(), MazeKind::Bounded);
        assert_eq!(start, ASSIGNMENT_START);
    }
}
