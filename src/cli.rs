//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "catgate",
    version,
    about = "Catgate — AppCat regression gate",
    long_about = "Catgate — a regression-testing harness for AppCat static-analysis output.\n\nRuns the analyzer against candidate projects, normalizes its YAML findings into keyed incident sets, and diffs them against stored baselines.\n\nConfiguration precedence: CLI > catgate.toml > defaults.",
    after_help = "Examples:\n  catgate run --app-dir /opt/appcat --data-dir projects --out-dir out\n  catgate analyze --out-dir out --output json\n  catgate validate --out-dir out --baseline-dir baseline --project proj1",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for running, analyzing, and validating.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current catgate version."
    )]
    Version,
    /// Run the external analyzer against candidate projects
    #[command(
        about = "Run the analyzer",
        long_about = "Invoke the AppCat binary for each candidate project, writing output.yaml per project under the output dir. Failures are per-project and never abort siblings.",
        after_help = "Examples:\n  catgate run --app-dir /opt/appcat\n  catgate run --project proj1"
    )]
    Run {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Folder containing the analyzer binary")]
        app_dir: Option<String>,
        #[arg(long, help = "Folder of candidate projects (default: projects)")]
        data_dir: Option<String>,
        #[arg(long, help = "Output folder (default: out)")]
        out_dir: Option<String>,
        #[arg(long, help = "Run a single named project instead of all")]
        project: Option<String>,
    },
    /// Parse analyzer output and report per-rule incident counts
    #[command(
        about = "Analyze findings",
        long_about = "Parse each project's output.yaml into a normalized incident set, persist per-incident audit records and per-project CSVs, and write the cross-project rule summary CSV.",
        after_help = "Examples:\n  catgate analyze --out-dir out\n  catgate analyze --project proj1 --output json --no-persist"
    )]
    Analyze {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Folder of candidate projects (default: projects)")]
        data_dir: Option<String>,
        #[arg(long, help = "Output folder (default: out)")]
        out_dir: Option<String>,
        #[arg(long, help = "Analyze a single named project instead of all")]
        project: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip writing per-incident audit records")]
        no_persist: bool,
    },
    /// Diff current findings against stored baselines
    #[command(
        about = "Validate against baselines",
        long_about = "Parse current and baseline documents per project, classify every incident key as matched/new/missing/changed, and report per-project pass/fail. A run with zero mismatches passes unconditionally.",
        after_help = "Examples:\n  catgate validate --baseline-dir baseline\n  catgate validate --project proj1 --output json"
    )]
    Validate {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Folder of candidate projects (default: projects)")]
        data_dir: Option<String>,
        #[arg(long, help = "Output folder (default: out)")]
        out_dir: Option<String>,
        #[arg(long, help = "Folder of accepted baselines (default: baseline)")]
        baseline_dir: Option<String>,
        #[arg(long, help = "Validate a single named project instead of all")]
        project: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
