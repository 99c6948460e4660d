//! Training and evaluation pipeline
//!
//! This module provides:
//! - An episode loop that drives any [`Learner`] through a maze
//! - Greedy evaluation of learned action values
//! - Observers recording progress, metrics and trajectories

pub mod observers;
pub mod training;

pub use observers::{EpisodeRecord, JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{
    EpisodeSummary, TrainingConfig, TrainingPipeline, TrainingResult, evaluate, evaluate_policy,
    greedy_snapshot,
};

pub use crate::ports::{Learner, Observer};
