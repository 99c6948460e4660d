//! Evaluate command - Run a saved learner greedily

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::{
    app::App,
    cli::{
        config::{MazePreset, load_experiment, resolve_maze},
        output::{print_kv, print_result, print_section, print_subsection},
    },
    maze::Coordinate,
    pipeline::{TrainingConfig, evaluate_policy},
    policy::{GreedyPolicy, render_policy},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained learner")]
pub struct EvaluateArgs {
    /// Path to trained learner file
    pub learner: PathBuf,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Random seed for the maze
    #[arg(long)]
    pub seed: Option<u64>,

    /// Cut episodes off after this many steps
    #[arg(long, default_value_t = 1_000)]
    pub max_steps: usize,

    /// Evaluate on this config's maze instead of the one saved with the learner
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Evaluate on a built-in maze instead of the one saved with the learner
    #[arg(long, value_enum)]
    pub maze: Option<MazePreset>,

    /// Export the evaluation result as JSON
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    println!("Loading trained learner from: {}", args.learner.display());
    let saved = App::new()
        .load_saved(&args.learner)
        .with_context(|| format!("Failed to load learner from {}", args.learner.display()))?;

    print_section("Loaded Learner");
    print_kv("Algorithm", saved.algorithm.name());
    if let Some(episodes) = saved.metadata.episodes {
        print_kv("Episodes trained", &episodes.to_string());
    }
    if let Some(seed) = saved.metadata.seed {
        print_kv("Training seed", &seed.to_string());
    }
    if let Some(saved_at) = &saved.metadata.saved_at {
        print_kv("Saved at", saved_at);
    }
    print_kv("States visited", &saved.states_visited().to_string());

    let (maze, start) = if args.config.is_some() || args.maze.is_some() {
        let mut experiment = load_experiment(args.config.as_deref())?;
        if args.seed.is_some() {
            experiment.seed = args.seed;
        }
        resolve_maze(&experiment, args.maze)?
    } else {
        let maze = saved.metadata.maze.clone().ok_or_else(|| {
            anyhow!("Saved learner has no maze; pass --config or --maze to choose one")
        })?;
        let start = saved.metadata.start.unwrap_or(Coordinate::new(0, 0));
        (maze, start)
    };

    let config = TrainingConfig {
        episodes: args.episodes,
        seed: args.seed,
        max_steps: args.max_steps,
        start,
    };

    print_section("Evaluation");
    print_kv("Maze", &format!("{}×{} {}", maze.width(), maze.height(), maze.kind().name()));
    print_kv("Start", &start.to_string());

    let table = saved.greedy_table();
    print_subsection("Greedy policy");
    println!("{}", render_policy(&maze, &mut table.derive_policy(&maze))?);

    let result = evaluate_policy(GreedyPolicy::new(table), &maze, config)?;
    print_subsection("Results");
    print_result(&result);

    if let Some(path) = &args.export {
        result
            .save(path)
            .with_context(|| format!("Failed to export results to {}", path.display()))?;
        println!("\n✓ Results exported to: {}", path.display());
    }

    Ok(())
}
