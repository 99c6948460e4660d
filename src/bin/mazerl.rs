//! mazerl CLI - tabular reinforcement learning on grid mazes
//!
//! This CLI provides a unified interface for:
//! - Training SARSA, Q-learning and double Q-learning agents
//! - Evaluating saved agents greedily
//! - Solving mazes by value iteration
//! - Running the canned assignment scenarios
//! - Exporting action values and checking documentation navigation scripts

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use mazerl::cli::commands::{evaluate, export, navcheck, scenario, solve, train};

#[derive(Parser)]
#[command(name = "mazerl")]
#[command(version, about = "Tabular reinforcement learning on grid mazes", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a learner (Q-learning, SARSA, double Q-learning)
    Train(Box<train::TrainArgs>),

    /// Evaluate a trained learner greedily
    Evaluate(evaluate::EvaluateArgs),

    /// Compute the optimal policy by value iteration
    Solve(solve::SolveArgs),

    /// Run a canned experiment
    Scenario(scenario::ScenarioArgs),

    /// Export a learner's action values as CSV
    Export(export::ExportArgs),

    /// Validate Doxygen navigation scripts
    Navcheck(navcheck::NavcheckArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "mazerl=info",
        1 => "mazerl=debug",
        _ => "mazerl=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Train(args) => train::execute(*args),
        Commands::Evaluate(args) => evaluate::execute(args),
        Commands::Solve(args) => solve::execute(args),
        Commands::Scenario(args) => scenario::execute(args),
        Commands::Export(args) => export::execute(args),
        Commands::Navcheck(args) => navcheck::execute(args),
    }
}
