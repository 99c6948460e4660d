//! Dependency injection container for the mazerl application.
//!
//! The container owns infrastructure dependencies (persistence, default
//! seeding) and provides factory methods for learners.

use std::{path::Path, sync::Arc};

use super::config::LearnerConfig;
use crate::{
    Result,
    adapters::MsgPackRepository,
    agents::{
        Algorithm, DoubleQAgent, LoadedLearner, QLearningAgent, SarsaAgent, SavedLearner,
        TrainingMetadata,
    },
    ports::{Learner, LearnerRepository},
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use mazerl::agents::Algorithm;
/// use mazerl::app::{App, LearnerConfig};
///
/// let app = App::new();
/// let learner = app.create_learner(LearnerConfig::new(Algorithm::QLearning).with_seed(42));
/// assert_eq!(learner.name(), "Q-Learning");
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use mazerl::adapters::InMemoryRepository;
/// use mazerl::app::App;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    learner_repository: Arc<dyn LearnerRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults: [`MsgPackRepository`] and
    /// no default seed.
    pub fn new() -> Self {
        Self {
            learner_repository: Arc::new(MsgPackRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing an app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn learner_repository(&self) -> Arc<dyn LearnerRepository + Send + Sync> {
        Arc::clone(&self.learner_repository)
    }

    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }

    /// Create a fresh control learner.
    ///
    /// The config's seed wins over the app default. With neither, the learner
    /// is seeded from the thread RNG.
    pub fn create_learner(&self, config: LearnerConfig) -> Box<dyn Learner> {
        let seed = config
            .seed
            .or(self.default_seed)
            .unwrap_or_else(rand::random);

        match config.algorithm {
            Algorithm::Sarsa => Box::new(SarsaAgent::new(config.params).with_seed(seed)),
            Algorithm::QLearning => Box::new(QLearningAgent::new(config.params).with_seed(seed)),
            Algorithm::DoubleQ => Box::new(DoubleQAgent::new(config.params).with_seed(seed)),
        }
    }

    /// Load a saved learner snapshot without restoring the agent.
    pub fn load_saved(&self, path: &Path) -> Result<SavedLearner> {
        self.learner_repository.load(path)
    }

    /// Load and restore a learner from persistent storage.
    pub fn load_learner(&self, path: &Path) -> Result<LoadedLearner> {
        self.load_saved(path)?.to_learner()
    }

    /// Snapshot `learner` with its training metadata and persist it.
    ///
    /// # Errors
    ///
    /// Fails for learners without a save format (TD evaluation, fixed
    /// policies) and on IO or serialization errors.
    pub fn save_learner(
        &self,
        learner: &dyn Learner,
        metadata: TrainingMetadata,
        path: &Path,
    ) -> Result<SavedLearner> {
        let saved = SavedLearner::from_learner(learner, metadata)?;
        self.learner_repository.save(&saved, path)?;
        tracing::info!(
            algorithm = saved.algorithm.name(),
            path = %path.display(),
            "saved learner"
        );
        Ok(saved)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing an app with custom dependencies.
///
/// ```
/// use mazerl::adapters::InMemoryRepository;
/// use mazerl::app::AppBuilder;
///
/// let app = AppBuilder::new()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// assert_eq!(app.default_seed(), Some(42));
/// ```
pub struct AppBuilder {
    learner_repository: Option<Arc<dyn LearnerRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            learner_repository: None,
            default_seed: None,
        }
    }

    pub fn with_repository<R: LearnerRepository + Send + Sync + 'static>(
        mut self,
        repo: R,
    ) -> Self {
        self.learner_repository = Some(Arc::new(repo));
        self
    }

    /// Seed every learner created by this app that has no seed of its own.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app. Uses [`MsgPackRepository`] if no repository was set.
    pub fn build(self) -> App {
        App {
            learner_repository: self
                .learner_repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
