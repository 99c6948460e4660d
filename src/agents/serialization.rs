//! Versioned save format for trained control agents.

use serde::{Deserialize, Serialize};

use super::{
    control::{AgentState, QLearningAgent, SarsaAgent},
    double_q::DoubleQAgent,
    table::ActionValueTable,
};
use crate::{
    Error, Result,
    maze::{Coordinate, Maze},
    ports::Learner,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Sarsa,
    QLearning,
    DoubleQ,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Sarsa => "SARSA",
            Algorithm::QLearning => "Q-Learning",
            Algorithm::DoubleQ => "Double Q-Learning",
        }
    }
}

/// How and where a learner was trained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Number of episodes trained
    pub episodes: Option<usize>,
    pub seed: Option<u64>,
    /// The maze the learner was trained on
    pub maze: Option<Maze>,
    /// Where training episodes started
    #[serde(default)]
    pub start: Option<Coordinate>,
    /// Seconds since the Unix epoch
    pub saved_at: Option<String>,
}

impl TrainingMetadata {
    pub fn new(episodes: usize, seed: Option<u64>, maze: &Maze) -> Self {
        let saved_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs().to_string());
        Self {
            episodes: Some(episodes),
            seed,
            maze: Some(maze.clone()),
            start: None,
            saved_at,
        }
    }

    pub fn with_start(mut self, start: Coordinate) -> Self {
        self.start = Some(start);
        self
    }
}

/// Serializable snapshot of a trained SARSA, Q-learning or double Q agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedLearner {
    pub version: u32,
    pub algorithm: Algorithm,
    state: AgentState,
    pub metadata: TrainingMetadata,
}

/// A learner restored from a [`SavedLearner`].
pub enum LoadedLearner {
    Sarsa(SarsaAgent),
    QLearning(QLearningAgent),
    DoubleQ(DoubleQAgent),
}

impl LoadedLearner {
    pub fn into_box(self) -> Box<dyn Learner> {
        match self {
            LoadedLearner::Sarsa(agent) => Box::new(agent),
            LoadedLearner::QLearning(agent) => Box::new(agent),
            LoadedLearner::DoubleQ(agent) => Box::new(agent),
        }
    }
}

impl SavedLearner {
    /// Current save format version
    pub const VERSION: u32 = 1;

    pub fn from_sarsa(agent: &SarsaAgent, metadata: TrainingMetadata) -> Self {
        Self::with_state(Algorithm::Sarsa, agent.export_state(), metadata)
    }

    pub fn from_q_learning(agent: &QLearningAgent, metadata: TrainingMetadata) -> Self {
        Self::with_state(Algorithm::QLearning, agent.export_state(), metadata)
    }

    pub fn from_double_q(agent: &DoubleQAgent, metadata: TrainingMetadata) -> Self {
        Self::with_state(Algorithm::DoubleQ, agent.export_state(), metadata)
    }

    /// Snapshot any supported learner, found by downcasting.
    pub fn from_learner(learner: &dyn Learner, metadata: TrainingMetadata) -> Result<Self> {
        let any = learner.as_any();
        if let Some(agent) = any.downcast_ref::<SarsaAgent>() {
            Ok(Self::from_sarsa(agent, metadata))
        } else if let Some(agent) = any.downcast_ref::<QLearningAgent>() {
            Ok(Self::from_q_learning(agent, metadata))
        } else if let Some(agent) = any.downcast_ref::<DoubleQAgent>() {
            Ok(Self::from_double_q(agent, metadata))
        } else {
            Err(Error::InvalidConfiguration {
                message: format!("learner '{}' cannot be saved", learner.name()),
            })
        }
    }

    fn with_state(algorithm: Algorithm, state: AgentState, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            algorithm,
            state,
            metadata,
        }
    }

    pub fn check_version(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedSaveVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(())
    }

    pub fn to_learner(&self) -> Result<LoadedLearner> {
        self.check_version()?;
        let state = self.state.clone();
        Ok(match self.algorithm {
            Algorithm::Sarsa => LoadedLearner::Sarsa(SarsaAgent::from_state(state)?),
            Algorithm::QLearning => LoadedLearner::QLearning(QLearningAgent::from_state(state)?),
            Algorithm::DoubleQ => LoadedLearner::DoubleQ(DoubleQAgent::from_state(state)?),
        })
    }

    /// The values a greedy policy should act on: the single table, or
    /// `Q₁ + Q₂` for double Q-learning.
    pub fn greedy_table(&self) -> ActionValueTable {
        let mut tables = self.state.tables.iter();
        let first = tables.next().cloned().unwrap_or_default();
        tables.fold(first, |acc, t| acc.sum(t))
    }

    /// Number of visited states in the greedy table.
    pub fn states_visited(&self) -> usize {
        self.greedy_table().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        agents::LearningParams,
        maze::{Action, Coordinate, MazeKind, Transition},
    };

    fn trained_q_agent() -> QLearningAgent {
        let maze = Maze::uniform(2, 2, -1.0, MazeKind::Bounded).unwrap();
        let mut agent = QLearningAgent::new(LearningParams::new(0.5, 0.9, 0.2).unwrap()).with_seed(7);
        let transition = Transition {
            step: 0,
            from: Coordinate::new(0, 0),
            action: Action::Up,
            reward: -1.0,
            to: Coordinate::new(0, 1),
            terminal: false,
        };
        agent.learn(&maze, &transition).unwrap();
        agent
    }

    #[test]
    fn test_q_learning_roundtrip() {
        let agent = trained_q_agent();
        let saved = SavedLearner::from_q_learning(&agent, TrainingMetadata::default());
        let bytes = rmp_serde::to_vec(&saved).unwrap();
        let loaded: SavedLearner = rmp_serde::from_slice(&bytes).unwrap();

        match loaded.to_learner().unwrap() {
            LoadedLearner::QLearning(restored) => {
                assert_eq!(restored.table(), agent.table());
                assert_eq!(restored.epsilon(), agent.epsilon());
            }
            _ => panic!("Expected Q-learning agent"),
        }
    }

    #[test]
    fn test_metadata_keeps_maze() {
        let maze = Maze::uniform(3, 2, 1.0, MazeKind::Stochastic {
            slip: crate::types::UnitInterval::new("slip", 0.1).unwrap(),
        })
        .unwrap();
        let agent = SarsaAgent::new(LearningParams::default());
        let saved = SavedLearner::from_sarsa(&agent, TrainingMetadata::new(10, Some(1), &maze));
        let bytes = rmp_serde::to_vec(&saved).unwrap();
        let loaded: SavedLearner = rmp_serde::from_slice(&bytes).unwrap();
        let restored_maze = loaded.metadata.maze.unwrap();
        assert_eq!(restored_maze.width(), 3);
        assert_eq!(restored_maze.kind(), maze.kind());
        assert_eq!(loaded.metadata.episodes, Some(10));
    }

    #[test]
    fn test_version_mismatch() {
        let agent = trained_q_agent();
        let mut saved = SavedLearner::from_q_learning(&agent, TrainingMetadata::default());
        saved.version = 99;
        assert!(matches!(
            saved.to_learner(),
            Err(Error::UnsupportedSaveVersion {
                found: 99,
                expected: 1
            })
        ));
    }

    #[test]
    fn test_from_learner_downcasts() {
        let agent = DoubleQAgent::new(LearningParams::default());
        let saved = SavedLearner::from_learner(&agent, TrainingMetadata::default()).unwrap();
        assert_eq!(saved.algorithm, Algorithm::DoubleQ);
        assert!(saved.greedy_table().is_empty());
    }
}
