//! Repository port for learner persistence.

use std::path::Path;

use crate::{Result, agents::SavedLearner};

/// Port for persisting and loading trained learners.
///
/// # Examples
///
/// ```no_run
/// use mazerl::{agents::SavedLearner, ports::LearnerRepository};
/// use std::path::Path;
///
/// fn archive<R: LearnerRepository>(
///     repo: &R,
///     saved: &SavedLearner,
///     path: &Path,
/// ) -> mazerl::Result<()> {
///     repo.save(saved, path)
/// }
/// ```
pub trait LearnerRepository {
    /// Save a learner snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be written or serialization fails.
    fn save(&self, saved: &SavedLearner, path: &Path) -> Result<()>;

    /// Load a learner snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is corrupted, or was
    /// written by an unsupported format version.
    fn load(&self, path: &Path) -> Result<SavedLearner>;
}
