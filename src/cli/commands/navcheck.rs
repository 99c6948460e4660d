//! Navcheck command - Validate Doxygen navigation scripts

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use serde::Serialize;

use crate::{
    cli::output::{print_kv, print_subsection},
    docnav::{self, NavDiff, NavIssue},
};

#[derive(Parser, Debug)]
#[command(about = "Validate navigation scripts such as namespaces_dup.js")]
pub struct NavcheckArgs {
    /// Scripts to check; with exactly two, their namespaces are also diffed
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Print a JSON report instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    variable: String,
    entries: usize,
    issues: Vec<NavIssue>,
}

#[derive(Debug, Serialize)]
struct Report {
    files: Vec<FileReport>,
    diff: Option<NavDiff>,
}

impl Report {
    fn issue_count(&self) -> usize {
        self.files.iter().map(|f| f.issues.len()).sum()
    }
}

fn build_report(files: &[PathBuf]) -> Result<Report> {
    let mut scripts = Vec::with_capacity(files.len());
    for path in files {
        let script = docnav::load_nav_script(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        scripts.push(script);
    }

    let diff = match scripts.as_slice() {
        [left, right] => Some(docnav::diff(&left.entries, &right.entries)),
        _ => None,
    };

    let files = files
        .iter()
        .zip(&scripts)
        .map(|(path, script)| FileReport {
            path: path.clone(),
            variable: script.variable.clone(),
            entries: script.entries.len(),
            issues: docnav::validate(&script.entries),
        })
        .collect();

    Ok(Report { files, diff })
}

fn print_text(report: &Report) {
    for file in &report.files {
        print_subsection(&file.path.display().to_string());
        print_kv("Variable", &file.variable);
        print_kv("Entries", &file.entries.to_string());
        if file.issues.is_empty() {
            println!("  {}", "✓ well-formed".green());
        } else {
            for issue in &file.issues {
                println!("  {} {issue}", "✗".red());
            }
        }
    }

    if let Some(diff) = &report.diff {
        print_subsection("Differences");
        print!("{diff}");
    }
}

pub fn execute(args: NavcheckArgs) -> Result<()> {
    let report = build_report(&args.files)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }

    let issues = report.issue_count();
    if issues > 0 {
        bail!("{issues} structural issue(s) found");
    }
    Ok(())
}
