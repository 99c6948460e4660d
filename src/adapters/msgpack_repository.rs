//! MessagePack implementation of the learner repository.

use std::{fs::File, io::BufWriter, path::Path};

use crate::{Result, agents::SavedLearner, error::Error, ports::LearnerRepository};

/// MessagePack-based learner repository.
///
/// # Examples
///
/// ```no_run
/// use mazerl::adapters::MsgPackRepository;
/// use mazerl::agents::{LearningParams, QLearningAgent, SavedLearner, TrainingMetadata};
/// use mazerl::ports::LearnerRepository;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let agent = QLearningAgent::new(LearningParams::default());
/// let saved = SavedLearner::from_q_learning(&agent, TrainingMetadata::default());
///
/// repo.save(&saved, Path::new("trained.msgpack"))?;
/// let loaded = repo.load(Path::new("trained.msgpack"))?;
/// # Ok::<(), mazerl::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl LearnerRepository for MsgPackRepository {
    fn save(&self, saved: &SavedLearner, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write_named(&mut writer, saved).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize learner to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;

        std::io::Write::flush(&mut writer).map_err(|source| Error::Io {
            operation: format!("flush file {path:?}"),
            source,
        })
    }

    fn load(&self, path: &Path) -> Result<SavedLearner> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let saved: SavedLearner =
            rmp_serde::decode::from_read(&file).map_err(|e| Error::SerializationContext {
                operation: "deserialize learner from MessagePack".to_string(),
                message: e.to_string(),
            })?;

        saved.check_version()?;
        Ok(saved)
    }
}
