//! Catgate CLI binary entry point.
//! Delegates to modules for run/analyze/validate and prints results.

mod aggregate;
mod cli;
mod config;
mod diff;
mod models;
mod output;
mod parse;
mod report;
mod runner;
mod utils;

use clap::Parser;
use cli::{Cli, Commands};
use std::fs;

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Run {
            repo_root,
            app_dir,
            data_dir,
            out_dir,
            project,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                app_dir.as_deref(),
                data_dir.as_deref(),
                out_dir.as_deref(),
                None,
                project.as_deref(),
                None,
                None,
            );
            if config::load_config(&eff.repo_root).is_none() {
                eprintln!(
                    "{} {}",
                    crate::utils::note_prefix(),
                    "No catgate.toml found; using defaults."
                );
            }
            if !eff.app_dir.is_dir() {
                eprintln!(
                    "{} {}",
                    crate::utils::error_prefix(),
                    format!(
                        "The application folder does not exist: {}",
                        eff.app_dir.display()
                    )
                );
                std::process::exit(2);
            }
            let projects = require_projects(&eff);
            eprintln!(
                "{} {}",
                crate::utils::info_prefix(),
                format!("Total target projects found: {}", projects.len())
            );
            let mut failures = 0usize;
            for p in &projects {
                eprintln!(
                    "{} {}",
                    crate::utils::info_prefix(),
                    format!("Running analyzer for project '{}'", p)
                );
                if let Err(e) = runner::run_analyzer(&eff, p) {
                    eprintln!("{} {}", crate::utils::error_prefix(), e);
                    failures += 1;
                }
            }
            if failures > 0 {
                std::process::exit(1);
            }
        }
        Commands::Analyze {
            repo_root,
            data_dir,
            out_dir,
            project,
            output,
            no_persist,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                None,
                data_dir.as_deref(),
                out_dir.as_deref(),
                None,
                project.as_deref(),
                output.as_deref(),
                if no_persist { Some(false) } else { None },
            );
            if config::load_config(&eff.repo_root).is_none() && eff.output != "json" {
                eprintln!(
                    "{} {}",
                    crate::utils::note_prefix(),
                    "No catgate.toml found; using defaults."
                );
            }
            let projects = require_projects(&eff);
            let (reports, matrix) = runner::analyze_all(&eff, &projects);

            let summary_path = eff.out_dir.join("summary.csv");
            if let Err(e) = fs::create_dir_all(&eff.out_dir)
                .and_then(|_| fs::write(&summary_path, report::render_summary_csv(&matrix)))
            {
                eprintln!(
                    "{} {}",
                    crate::utils::error_prefix(),
                    format!("Failed to write summary file: {}", e)
                );
                std::process::exit(2);
            }
            if eff.output != "json" {
                eprintln!(
                    "{} {}",
                    crate::utils::info_prefix(),
                    format!("Global summary written to: {}", summary_path.display())
                );
            }
            output::print_analyze(&reports, &matrix, &eff.output);
            if reports.iter().any(|r| r.error.is_some()) {
                std::process::exit(1);
            }
        }
        Commands::Validate {
            repo_root,
            data_dir,
            out_dir,
            baseline_dir,
            project,
            output,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                None,
                data_dir.as_deref(),
                out_dir.as_deref(),
                baseline_dir.as_deref(),
                project.as_deref(),
                output.as_deref(),
                None,
            );
            if config::load_config(&eff.repo_root).is_none() && eff.output != "json" {
                eprintln!(
                    "{} {}",
                    crate::utils::note_prefix(),
                    "No catgate.toml found; using defaults."
                );
            }
            let projects = require_projects(&eff);
            let reports = runner::validate_all(&eff, &projects);

            let results_path = eff.out_dir.join("validation.md");
            if let Err(e) = fs::create_dir_all(&eff.out_dir).and_then(|_| {
                fs::write(&results_path, report::render_validation_markdown(&reports))
            }) {
                eprintln!(
                    "{} {}",
                    crate::utils::error_prefix(),
                    format!("Failed to write validation results: {}", e)
                );
                std::process::exit(2);
            }
            if eff.output != "json" {
                eprintln!(
                    "{} {}",
                    crate::utils::info_prefix(),
                    format!("Validation results written to: {}", results_path.display())
                );
            }
            output::print_validate(&reports, &eff.output);
            if reports.iter().any(|r| !r.passed()) {
                std::process::exit(1);
            }
        }
    }
}

/// Discover candidate projects or exit with a usage error.
fn require_projects(eff: &config::Effective) -> Vec<String> {
    if !eff.data_dir.is_dir() {
        eprintln!(
            "{} {}",
            crate::utils::error_prefix(),
            format!(
                "The test data folder does not exist: {}",
                eff.data_dir.display()
            )
        );
        std::process::exit(2);
    }
    match runner::discover_projects(eff, eff.project.as_deref()) {
        Ok(projects) => {
            if projects.is_empty() {
                eprintln!(
                    "{} {}",
                    crate::utils::note_prefix(),
                    format!(
                        "No candidate projects found under {}",
                        eff.data_dir.display()
                    )
                );
            }
            projects
        }
        Err(e) => {
            eprintln!("{} {}", crate::utils::error_prefix(), e);
            std::process::exit(2);
        }
    }
}
