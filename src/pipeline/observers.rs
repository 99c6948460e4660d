//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    collections::VecDeque,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::training::EpisodeSummary;
use crate::{Result, maze::Transition, ports::Observer};

/// Complete observation of a training episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub steps: usize,
    pub total_return: f64,
    pub reached_terminal: bool,
    pub truncated: bool,
    pub transitions: Vec<Transition>,
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    reached: usize,
    recent_return: f64,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            reached: 0,
            recent_return: 0.0,
        }
    }

    fn message(&self) -> String {
        format!("terminal {} | last return {:.2}", self.reached, self.recent_return)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, summary: &EpisodeSummary) -> Result<()> {
        if summary.reached_terminal {
            self.reached += 1;
        }
        self.recent_return = summary.total_return;

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks returns and episode lengths
pub struct MetricsObserver {
    returns: Vec<f64>,
    steps: Vec<usize>,
    reached: usize,
    window: usize,
    recent: VecDeque<f64>,
    moving_average: Vec<f64>,
}

impl MetricsObserver {
    pub const DEFAULT_WINDOW: usize = 100;

    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::with_window(Self::DEFAULT_WINDOW)
    }

    /// Moving average over the last `window` episodes.
    pub fn with_window(window: usize) -> Self {
        Self {
            returns: Vec::new(),
            steps: Vec::new(),
            reached: 0,
            window: window.max(1),
            recent: VecDeque::new(),
            moving_average: Vec::new(),
        }
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Moving average of returns, one entry per episode.
    pub fn moving_average(&self) -> &[f64] {
        &self.moving_average
    }

    pub fn mean_return(&self) -> f64 {
        if self.returns.is_empty() {
            0.0
        } else {
            self.returns.iter().sum::<f64>() / self.returns.len() as f64
        }
    }

    pub fn mean_steps(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.steps.iter().sum::<usize>() as f64 / self.steps.len() as f64
        }
    }

    pub fn terminal_rate(&self) -> f64 {
        if self.returns.is_empty() {
            0.0
        } else {
            self.reached as f64 / self.returns.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.returns.len(),
            mean_return: self.mean_return(),
            mean_steps: self.mean_steps(),
            terminal_rate: self.terminal_rate(),
            final_moving_average: self.moving_average.last().copied().unwrap_or(0.0),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub mean_return: f64,
    pub mean_steps: f64,
    pub terminal_rate: f64,
    pub final_moving_average: f64,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, _episode: usize, summary: &EpisodeSummary) -> Result<()> {
        self.returns.push(summary.total_return);
        self.steps.push(summary.steps);
        if summary.reached_terminal {
            self.reached += 1;
        }

        self.recent.push_back(summary.total_return);
        if self.recent.len() > self.window {
            self.recent.pop_front();
        }
        let average = self.recent.iter().sum::<f64>() / self.recent.len() as f64;
        self.moving_average.push(average);
        Ok(())
    }
}

/// JSONL observer - Exports one JSON object per episode, with its transitions
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_transitions: Vec<Transition>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self {
            writer,
            current_transitions: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.current_transitions.clear();
        Ok(())
    }

    fn on_step(&mut self, _episode: usize, transition: &Transition) -> Result<()> {
        self.current_transitions.push(*transition);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, summary: &EpisodeSummary) -> Result<()> {
        let record = EpisodeRecord {
            episode,
            steps: summary.steps,
            total_return: summary.total_return,
            reached_terminal: summary.reached_terminal,
            truncated: summary.truncated,
            transitions: std::mem::take(&mut self.current_transitions),
        };

        // Write as JSONL (one JSON object per line)
        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;

        Ok(())
    }
}

/// Shares an observer with the caller, who can read it back after the run.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use mazerl::pipeline::{MetricsObserver, TrainingConfig, TrainingPipeline};
///
/// let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
/// let pipeline = TrainingPipeline::new(TrainingConfig::default())
///     .with_observer(Box::new(Arc::clone(&metrics)));
/// # drop(pipeline);
/// ```
impl<O: Observer> Observer for Arc<Mutex<O>> {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        lock(self).on_training_start(total_episodes)
    }

    fn on_episode_start(&mut self, episode: usize) -> Result<()> {
        lock(self).on_episode_start(episode)
    }

    fn on_step(&mut self, episode: usize, transition: &Transition) -> Result<()> {
        lock(self).on_step(episode, transition)
    }

    fn on_episode_end(&mut self, episode: usize, summary: &EpisodeSummary) -> Result<()> {
        lock(self).on_episode_end(episode, summary)
    }

    fn on_training_end(&mut self) -> Result<()> {
        lock(self).on_training_end()
    }
}

fn lock<O>(shared: &Mutex<O>) -> std::sync::MutexGuard<'_, O> {
    shared
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
