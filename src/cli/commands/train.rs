//! Train command - Train a control learner on a maze

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    agents::{Algorithm, TrainingMetadata},
    app::{App, LearnerConfig},
    cli::{
        config::{LearningArgs, MazePreset, load_experiment, resolve_maze},
        output::{print_kv, print_result, print_section, print_subsection},
    },
    pipeline::{
        JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver, TrainingPipeline,
        TrainingResult, greedy_snapshot,
    },
    policy::render_policy,
    render,
};

#[derive(Parser, Debug)]
#[command(about = "Train a learner", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Type of learner to train
    #[arg(value_enum)]
    pub learner: LearnerType,

    /// Experiment config file (.toml or .json)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    #[command(flatten)]
    pub learning: LearningArgs,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Cut episodes off after this many steps
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Use a built-in maze instead of the config's
    #[arg(long, value_enum)]
    pub maze: Option<MazePreset>,

    /// Output file for the trained learner (MessagePack)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Optional file for JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LearnerType {
    /// Q-learning (off-policy TD control)
    QLearning,
    /// SARSA (on-policy TD control)
    Sarsa,
    /// Double Q-learning (two tables, decoupled selection and evaluation)
    DoubleQ,
}

impl From<LearnerType> for Algorithm {
    fn from(learner: LearnerType) -> Self {
        match learner {
            LearnerType::QLearning => Algorithm::QLearning,
            LearnerType::Sarsa => Algorithm::Sarsa,
            LearnerType::DoubleQ => Algorithm::DoubleQ,
        }
    }
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    training: TrainingResult,
    metrics: MetricsSummary,
    metadata: SummaryMetadata,
}

#[derive(Debug, Serialize)]
struct SummaryMetadata {
    learner: String,
    maze: String,
    width: usize,
    height: usize,
    alpha: f64,
    gamma: f64,
    epsilon: f64,
    seed: Option<u64>,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Trailing separator or no file name: treat as a directory.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut experiment = load_experiment(args.config.as_deref())?;
    args.learning.apply(&mut experiment);
    if let Some(episodes) = args.episodes {
        experiment.episodes = episodes;
    }
    if let Some(seed) = args.seed {
        experiment.seed = Some(seed);
    }
    if let Some(max_steps) = args.max_steps {
        experiment.max_steps = max_steps;
    }
    if experiment.episodes == 0 {
        return Err(anyhow!("--episodes must be at least 1"));
    }

    let params = experiment
        .learning_params()
        .context("Invalid learning parameters")?;
    let (maze, start) = resolve_maze(&experiment, args.maze)?;
    let mut config = experiment.training_config();
    config.start = start;

    let algorithm = Algorithm::from(args.learner);
    let app = App::new();
    let mut learner_config = LearnerConfig::new(algorithm).with_params(params);
    if let Some(seed) = experiment.seed {
        learner_config = learner_config.with_seed(seed);
    }
    let mut learner = app.create_learner(learner_config);

    print_section(&format!("Training {}", algorithm.name()));
    print_kv("Maze", &format!("{}×{} {}", maze.width(), maze.height(), maze.kind().name()));
    print_kv("Start", &start.to_string());
    print_kv(
        "Parameters",
        &format!(
            "α = {}, γ = {}, ε = {}",
            params.alpha.value(),
            params.gamma.value(),
            params.epsilon.value()
        ),
    );
    if let Some(seed) = experiment.seed {
        print_kv("Seed", &seed.to_string());
    }
    println!("{}", render::maze_table(&maze, Some(start)));

    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    let mut pipeline =
        TrainingPipeline::new(config).with_observer(Box::new(Arc::clone(&metrics)));
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(observations_path) = &args.observations {
        let jsonl_observer = JsonlObserver::new(observations_path).with_context(|| {
            format!("Failed to create observations file {}", observations_path.display())
        })?;
        pipeline = pipeline.with_observer(Box::new(jsonl_observer));
    }

    let result = pipeline.run(learner.as_mut(), &maze)?;
    let metrics = metrics
        .lock()
        .map_err(|_| anyhow!("metrics observer lock poisoned"))?
        .summary();

    print_section("Training Complete");
    print_result(&result);
    print_kv("Final moving avg", &format!("{:.3}", metrics.final_moving_average));

    let table = greedy_snapshot(learner.as_ref(), &maze);
    print_subsection("Action values");
    println!(
        "{}",
        render::action_value_table(&maze, |c| table.get(c), 2)
    );
    print_subsection("Greedy policy");
    println!("{}", render_policy(&maze, &mut table.derive_policy(&maze))?);

    if let Some(output_path) = &args.output {
        let metadata =
            TrainingMetadata::new(experiment.episodes, experiment.seed, &maze).with_start(start);
        let saved = app
            .save_learner(learner.as_ref(), metadata, output_path)
            .with_context(|| format!("Failed to save learner to {}", output_path.display()))?;
        println!("\n✓ Learner saved to: {}", output_path.display());
        print_kv("Algorithm", saved.algorithm.name());
        print_kv("States visited", &saved.states_visited().to_string());
    }

    if let Some(raw) = &args.summary {
        let summary_path = sanitize_summary_path(raw);
        if summary_path.as_path() != raw.as_path() {
            println!("\nNormalizing summary path to {}", summary_path.display());
        }
        if let Some(parent) = summary_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let summary = TrainingSummaryFile {
            training: result,
            metrics,
            metadata: SummaryMetadata {
                learner: algorithm.name().to_string(),
                maze: maze.kind().name().to_string(),
                width: maze.width(),
                height: maze.height(),
                alpha: params.alpha.value(),
                gamma: params.gamma.value(),
                epsilon: params.epsilon.value(),
                seed: experiment.seed,
            },
        };

        let file = File::create(&summary_path)?;
        to_writer_pretty(file, &summary)?;
        println!("Summary written to {}", summary_path.display());
    }

    Ok(())
}
