//! In-memory learner repository for testing.
//!
//! Stores MessagePack bytes keyed by path, so tests exercise the same
//! serialization as the file adapter without touching the file system.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Result, agents::SavedLearner, error::Error, ports::LearnerRepository};

/// In-memory repository for testing.
///
/// All clones share the same underlying storage.
///
/// # Examples
///
/// ```
/// use mazerl::adapters::InMemoryRepository;
/// use mazerl::agents::{LearningParams, SarsaAgent, SavedLearner, TrainingMetadata};
/// use mazerl::ports::LearnerRepository;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let agent = SarsaAgent::new(LearningParams::default());
/// let saved = SavedLearner::from_sarsa(&agent, TrainingMetadata::default());
///
/// repo.save(&saved, Path::new("sarsa"))?;
/// let loaded = repo.load(Path::new("sarsa"))?;
/// assert_eq!(loaded.algorithm, saved.algorithm);
/// # Ok::<(), mazerl::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.storage
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Number of learners currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    pub fn clear(&self) {
        self.storage().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&key(path))
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl LearnerRepository for InMemoryRepository {
    fn save(&self, saved: &SavedLearner, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(saved).map_err(|e| Error::SerializationContext {
            operation: "serialize learner for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedLearner> {
        let storage = self.storage();
        let bytes = storage.get(&key(path)).ok_or_else(|| Error::Io {
            operation: format!("load learner from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        let saved: SavedLearner =
            rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
                operation: "deserialize learner from in-memory storage".to_string(),
                message: e.to_string(),
            })?;
        saved.check_version()?;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        agents::{Algorithm, LearningParams, QLearningAgent, SarsaAgent, TrainingMetadata},
        maze::{Action, Coordinate, Maze, MazeKind, Transition},
        ports::Learner,
    };

    fn corridor() -> Maze {
        let mut maze = Maze::uniform(2, 1, -1.0, MazeKind::Bounded).unwrap();
        maze.set_terminal(Coordinate::new(1, 0)).unwrap();
        maze
    }

    fn trained_q() -> SavedLearner {
        let maze = corridor();
        let mut agent = QLearningAgent::new(LearningParams::new(0.5, 1.0, 0.0).unwrap());
        let transition = Transition {
            step: 0,
            from: Coordinate::new(0, 0),
            action: Action::Right,
            reward: -1.0,
            to: Coordinate::new(1, 0),
            terminal: true,
        };
        agent.learn(&maze, &transition).unwrap();
        SavedLearner::from_q_learning(&agent, TrainingMetadata::new(1, Some(3), &maze))
    }

    #[test]
    fn test_snapshot_survives_storage() {
        let repo = InMemoryRepository::new();
        let path = Path::new("runs/corridor.msgpack");
        assert!(!repo.contains(path));

        let saved = trained_q();
        repo.save(&saved, path).unwrap();
        assert!(repo.contains(path));

        let loaded = repo.load(path).unwrap();
        assert_eq!(loaded.algorithm, Algorithm::QLearning);
        assert_eq!(loaded.metadata.seed, Some(3));
        assert_eq!(loaded.greedy_table(), saved.greedy_table());
        assert_eq!(
            loaded.greedy_table().value(Coordinate::new(0, 0), Action::Right),
            -0.5
        );
    }

    #[test]
    fn test_missing_key_is_io_error() {
        let repo = InMemoryRepository::new();
        let err = repo.load(Path::new("never-saved")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_saving_twice_overwrites() {
        let repo = InMemoryRepository::new();
        let path = Path::new("agent");
        repo.save(&trained_q(), path).unwrap();
        let sarsa = SarsaAgent::new(LearningParams::default());
        repo.save(&SavedLearner::from_sarsa(&sarsa, TrainingMetadata::default()), path)
            .unwrap();

        assert_eq!(repo.count(), 1);
        assert_eq!(repo.load(path).unwrap().algorithm, Algorithm::Sarsa);

        repo.clear();
        assert_eq!(repo.count(), 0);
    }

    #[test]
    fn test_clones_see_each_others_writes() {
        let writer = InMemoryRepository::new();
        let reader = writer.clone();
        writer.save(&trained_q(), Path::new("shared")).unwrap();
        assert!(reader.contains(Path::new("shared")));
    }
}
