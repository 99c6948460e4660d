//! Export command - Write a saved learner's action values as CSV

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{agents::SavedLearner, app::App, maze::Action};

#[derive(Parser, Debug)]
#[command(about = "Export a learner's action-value table as CSV")]
pub struct ExportArgs {
    /// Path to trained learner file
    pub learner: PathBuf,

    /// Output CSV file
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

/// One CSV row per visited state.
#[derive(Debug, Serialize)]
struct ExportRow {
    x: usize,
    y: usize,
    up: f64,
    down: f64,
    left: f64,
    right: f64,
    /// Empty for terminal states
    greedy: Option<&'static str>,
}

fn rows(saved: &SavedLearner) -> Vec<ExportRow> {
    let table = saved.greedy_table();
    let maze = saved.metadata.maze.as_ref();

    table
        .iter()
        .map(|(coordinate, values)| {
            let available = match maze {
                Some(maze) => match maze.state(coordinate) {
                    Ok(state) if state.terminal => Vec::new(),
                    _ => maze.available_actions(coordinate),
                },
                None => Action::ALL.to_vec(),
            };
            ExportRow {
                x: coordinate.x,
                y: coordinate.y,
                up: values[Action::Up.index()],
                down: values[Action::Down.index()],
                left: values[Action::Left.index()],
                right: values[Action::Right.index()],
                greedy: table.greedy(coordinate, &available).map(|a| a.as_str()),
            }
        })
        .collect()
}

pub fn execute(args: ExportArgs) -> Result<()> {
    let saved = App::new()
        .load_saved(&args.learner)
        .with_context(|| format!("Failed to load learner from {}", args.learner.display()))?;

    let rows = rows(&saved);
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!(
        "✓ {} action values ({} states) exported to: {}",
        saved.algorithm.name(),
        rows.len(),
        args.output.display()
    );
    Ok(())
}
