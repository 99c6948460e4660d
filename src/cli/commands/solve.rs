//! Solve command - Value iteration on a known maze

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        config::{MazePreset, load_experiment, resolve_maze},
        output::{print_kv, print_section, print_subsection},
    },
    policy::{OptimalPolicy, ValueIterationConfig},
    render,
};

#[derive(Parser, Debug)]
#[command(about = "Compute the optimal policy by value iteration")]
pub struct SolveArgs {
    /// Experiment config file (.toml or .json) describing the maze
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Use a built-in maze instead of the config's
    #[arg(long, value_enum)]
    pub maze: Option<MazePreset>,

    /// Seed for the random maze preset
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop once the largest change in a sweep falls below this
    #[arg(long, default_value_t = 0.01)]
    pub threshold: f64,

    /// Discount factor γ (0.0-1.0)
    #[arg(long, default_value_t = 0.9)]
    pub discount: f64,

    /// Probability that the intended action is carried out (0.0-1.0)
    #[arg(long, default_value_t = 1.0)]
    pub probability: f64,

    /// Give up after this many sweeps
    #[arg(long, default_value_t = ValueIterationConfig::DEFAULT_MAX_SWEEPS)]
    pub max_sweeps: usize,

    /// Print the values after every sweep
    #[arg(long, default_value_t = false)]
    pub show_sweeps: bool,
}

pub fn execute(args: SolveArgs) -> Result<()> {
    let mut experiment = load_experiment(args.config.as_deref())?;
    if args.seed.is_some() {
        experiment.seed = args.seed;
    }
    let (maze, start) = resolve_maze(&experiment, args.maze)?;

    let config = ValueIterationConfig::new(args.threshold, args.discount, args.probability)
        .context("Invalid value iteration parameters")?
        .with_max_sweeps(args.max_sweeps)
        .with_history(args.show_sweeps);

    print_section("Value Iteration");
    print_kv("Maze", &format!("{}×{} {}", maze.width(), maze.height(), maze.kind().name()));
    print_kv("Threshold", &args.threshold.to_string());
    print_kv("Discount", &args.discount.to_string());
    print_kv("Success prob.", &args.probability.to_string());
    println!("{}", render::maze_table(&maze, Some(start)));

    let optimal = OptimalPolicy::solve(&maze, config)?;

    if args.show_sweeps {
        for sweep in optimal.history() {
            print_subsection(&format!("Sweep {} (Δ = {:.6})", sweep.index, sweep.delta));
            println!(
                "{}",
                render::value_table(&maze, |c| sweep.values.get(&c).copied())
            );
        }
    }

    print_subsection(&format!("Converged after {} sweeps", optimal.sweeps()));
    println!("{}", optimal.value_table(&maze));
    print_subsection("Optimal policy");
    println!("{}", optimal.policy_table(&maze));
    if let Some(value) = optimal.value(start) {
        print_kv("Value at start", &format!("{value:.4}"));
    }

    Ok(())
}
