//! Configuration types for learner and experiment setup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    agents::{Algorithm, LearningParams},
    maze::{Coordinate, Maze, MazeKind},
    pipeline::TrainingConfig,
    scenarios::{ASSIGNMENT_REWARDS, ASSIGNMENT_START, ASSIGNMENT_TERMINALS},
    types::UnitInterval,
};

/// Configuration for creating a control learner.
///
/// # Examples
///
/// ```
/// use mazerl::agents::{Algorithm, LearningParams};
/// use mazerl::app::LearnerConfig;
///
/// let config = LearnerConfig::new(Algorithm::Sarsa)
///     .with_params(LearningParams::new(0.2, 0.9, 0.1)?)
///     .with_seed(42);
/// # Ok::<(), mazerl::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnerConfig {
    pub algorithm: Algorithm,
    pub params: LearningParams,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl LearnerConfig {
    /// Default parameters (α 0.1, γ 0.9, ε 0.1) and no seed.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            params: LearningParams::default(),
            seed: None,
        }
    }

    pub fn with_params(mut self, params: LearningParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Movement model named in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MazeKindName {
    Strict,
    Bounded,
    Stochastic,
}

/// The `[maze]` table. Defaults to the bounded assignment maze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MazeConfig {
    pub width: usize,
    pub height: usize,
    /// `rewards[x][y]`
    pub rewards: Vec<Vec<f64>>,
    pub terminals: Vec<[usize; 2]>,
    pub start: [usize; 2],
    pub kind: MazeKindName,
    /// Only read for stochastic mazes
    pub slip: f64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            rewards: ASSIGNMENT_REWARDS.iter().map(|c| c.to_vec()).collect(),
            terminals: ASSIGNMENT_TERMINALS.iter().map(|c| [c.x, c.y]).collect(),
            start: [ASSIGNMENT_START.x, ASSIGNMENT_START.y],
            kind: MazeKindName::Bounded,
            slip: 0.1,
        }
    }
}

impl MazeConfig {
    pub fn start(&self) -> Coordinate {
        Coordinate::new(self.start[0], self.start[1])
    }

    /// Build the maze, marking terminals and checking the start cell.
    pub fn build(&self) -> Result<Maze> {
        let kind = match self.kind {
            MazeKindName::Strict => MazeKind::Strict,
            MazeKindName::Bounded => MazeKind::Bounded,
            MazeKindName::Stochastic => MazeKind::Stochastic {
                slip: UnitInterval::new("slip", self.slip)?,
            },
        };
        let mut maze = Maze::new(self.width, self.height, &self.rewards, kind)?;
        for &[x, y] in &self.terminals {
            maze.set_terminal(Coordinate::new(x, y))?;
        }
        maze.state(self.start())?;
        Ok(maze)
    }
}

/// The `[learning]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LearningConfig {
    pub alpha: f64,
    pub gamma: f64,
    pub epsilon: f64,
    pub epsilon_decay: f64,
    pub min_epsilon: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.1,
            epsilon_decay: 1.0,
            min_epsilon: 0.0,
        }
    }
}

impl LearningConfig {
    pub fn params(&self) -> Result<LearningParams> {
        LearningParams::new(self.alpha, self.gamma, self.epsilon)?
            .with_epsilon_decay(self.epsilon_decay, self.min_epsilon)
    }
}

/// An experiment read from a TOML or JSON file.
///
/// Every field is optional; missing values fall back to the assignment maze
/// with α 0.1, γ 0.9, ε 0.1 and 1000 episodes.
///
/// ```
/// use mazerl::app::ExperimentConfig;
///
/// let config = ExperimentConfig::from_toml_str(r#"
///     episodes = 50
///     [learning]
///     alpha = 0.5
/// "#)?;
/// assert_eq!(config.episodes, 50);
/// assert_eq!(config.learning.gamma, 0.9);
/// # Ok::<(), mazerl::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub episodes: usize,
    pub seed: Option<u64>,
    pub max_steps: usize,
    pub maze: MazeConfig,
    pub learning: LearningConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let training = TrainingConfig::default();
        Self {
            episodes: training.episodes,
            seed: training.seed,
            max_steps: training.max_steps,
            maze: MazeConfig::default(),
            learning: LearningConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a config file, choosing the format by extension (`.toml` or
    /// `.json`).
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {}", path.display()),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let config = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            _ => {
                return Err(Error::InvalidConfiguration {
                    message: format!(
                        "unsupported config format for {} (expected .toml or .json)",
                        path.display()
                    ),
                });
            }
        };
        tracing::debug!(path = %path.display(), "loaded experiment config");
        Ok(config)
    }

    pub fn build_maze(&self) -> Result<Maze> {
        self.maze.build()
    }

    pub fn learning_params(&self) -> Result<LearningParams> {
        self.learning.params()
    }

    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            episodes: self.episodes,
            seed: self.seed,
            max_steps: self.max_steps,
            start: self.maze.start(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const FULL_TOML: &str = r#"
episodes = 200
seed = 7
max_steps = 500

[maze]
width = 3
height = 2
rewards = [[-1, -1], [-1, -1], [-1, 10]]
terminals = [[2, 1]]
start = [0, 0]
kind = "stochastic"
slip = 0.2

[learning]
alpha = 0.3
gamma = 0.95
epsilon = 0.2
epsilon_decay = 0.99
min_epsilon = 0.01
"#;

    #[test]
    fn test_defaults_build_assignment_maze() {
        let config = ExperimentConfig::default();
        let maze = config.build_maze().unwrap();
        assert_eq!(maze.width(), 4);
        assert_eq!(maze.kind(), MazeKind::Bounded);
        assert!(maze.state(Coordinate::new(3, 3)).unwrap().terminal);
        assert_eq!(config.training_config().start, Coordinate::new(2, 0));
    }

    #[test]
    fn test_full_toml() {
        let config = ExperimentConfig::from_toml_str(FULL_TOML).unwrap();
        assert_eq!(config.episodes, 200);
        assert_eq!(config.seed, Some(7));

        let maze = config.build_maze().unwrap();
        assert_eq!((maze.width(), maze.height()), (3, 2));
        assert_eq!(maze.kind().name(), "stochastic");
        let goal = maze.state(Coordinate::new(2, 1)).unwrap();
        assert!(goal.terminal);
        assert_eq!(goal.reward, 10.0);

        let params = config.learning_params().unwrap();
        assert_eq!(params.alpha.value(), 0.3);
        assert_eq!(params.min_epsilon.value(), 0.01);

        let training = config.training_config();
        assert_eq!(training.max_steps, 500);
        assert_eq!(training.start, Coordinate::new(0, 0));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(ExperimentConfig::from_toml_str("episodes = 1\nlearning_rate = 0.5").is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = ExperimentConfig::from_toml_str("[learning]\nalpha = 1.5").unwrap();
        assert!(matches!(
            config.learning_params(),
            Err(Error::InvalidParameter { .. })
        ));

        let config = ExperimentConfig::from_toml_str("[maze]\nstart = [9, 9]").unwrap();
        assert!(matches!(config.build_maze(), Err(Error::OutOfBounds { .. })));

        let config = ExperimentConfig::from_toml_str("[maze]\nwidth = 5").unwrap();
        assert!(matches!(config.build_maze(), Err(Error::InvalidShape { .. })));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = TempDir::new().unwrap();

        let json_path = dir.path().join("experiment.json");
        std::fs::write(&json_path, r#"{"episodes": 12, "learning": {"gamma": 1.0}}"#).unwrap();
        let config = ExperimentConfig::load(&json_path).unwrap();
        assert_eq!(config.episodes, 12);
        assert_eq!(config.learning.gamma, 1.0);

        let toml_path = dir.path().join("experiment.toml");
        std::fs::write(&toml_path, FULL_TOML).unwrap();
        assert_eq!(ExperimentConfig::load(&toml_path).unwrap().episodes, 200);

        let yaml_path = dir.path().join("experiment.yaml");
        std::fs::write(&yaml_path, "episodes: 3").unwrap();
        assert!(matches!(
            ExperimentConfig::load(&yaml_path),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
