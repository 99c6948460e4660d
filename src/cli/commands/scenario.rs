//! Scenario command - Run one of the canned assignment experiments

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::output::{print_kv, print_section},
    scenarios::{ScenarioKind, run_scenario},
};

#[derive(Parser, Debug)]
#[command(about = "Run a canned experiment (a, b, c, d, e or random)")]
pub struct ScenarioArgs {
    /// Scenario to run
    pub kind: ScenarioKind,

    /// Episodes per training phase
    #[arg(long, short = 'e', default_value_t = 1000)]
    pub episodes: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show progress bars
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

pub fn execute(args: ScenarioArgs) -> Result<()> {
    print_section(&format!("Scenario {}", args.kind));
    print_kv("Description", args.kind.description());
    print_kv("Episodes", &args.episodes.to_string());
    if let Some(seed) = args.seed {
        print_kv("Seed", &seed.to_string());
    }

    let report = run_scenario(args.kind, args.episodes, args.seed, args.progress)?;
    print!("{report}");
    Ok(())
}
