//! Configuration discovery and effective settings resolution.
//!
//! Catgate reads `catgate.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `data_dir`: `projects`
//! - `out_dir`: `out`
//! - `baseline_dir`: `baseline`
//! - `app_dir`: `.`
//! - `output`: `human`
//! - `persist`: true (write per-incident audit records during analyze)
//! - `run.bin`: `appcat`
//! - `run.targets`: the standard migration target list
//!
//! Overrides precedence: CLI > config file > defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Analyzer targets passed to `appcat analyze --target` when none are
/// configured.
pub const DEFAULT_TARGETS: [&str; 8] = [
    "cloud-readiness",
    "linux",
    "azure-appservice",
    "azure-aks",
    "azure-container-apps",
    "openjdk11",
    "openjdk17",
    "openjdk21",
];

#[derive(Debug, Default, Deserialize, Clone)]
/// Analyzer invocation section under `[run]`.
pub struct RunCfg {
    /// Analyzer binary name inside `app_dir`.
    pub bin: Option<String>,
    /// Target flags passed to the analyzer, comma-joined.
    pub targets: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `catgate.toml|yaml`.
pub struct CatgateConfig {
    pub app_dir: Option<String>,
    pub data_dir: Option<String>,
    pub out_dir: Option<String>,
    pub baseline_dir: Option<String>,
    pub project: Option<String>,
    pub output: Option<String>,
    pub persist: Option<bool>,
    #[serde(default)]
    pub run: Option<RunCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub app_dir: PathBuf,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub baseline_dir: PathBuf,
    pub project: Option<String>,
    pub output: String,
    pub persist: bool,
    pub bin: String,
    pub targets: Vec<String>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `catgate.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("catgate.toml").exists()
            || cur.join("catgate.yaml").exists()
            || cur.join("catgate.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `CatgateConfig` from `catgate.toml` or `catgate.yaml|yml` if present.
pub fn load_config(root: &Path) -> Option<CatgateConfig> {
    let toml_path = root.join("catgate.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        let cfg: CatgateConfig = toml::from_str(&s).ok()?;
        return Some(cfg);
    }
    for yml in ["catgate.yaml", "catgate.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            let cfg: CatgateConfig = serde_yaml::from_str(&s).ok()?;
            return Some(cfg);
        }
    }
    None
}

fn resolve_dir(root: &Path, value: &str) -> PathBuf {
    let p = PathBuf::from(value);
    if p.is_absolute() {
        p
    } else {
        root.join(p)
    }
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
#[allow(clippy::too_many_arguments)]
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_app_dir: Option<&str>,
    cli_data_dir: Option<&str>,
    cli_out_dir: Option<&str>,
    cli_baseline_dir: Option<&str>,
    cli_project: Option<&str>,
    cli_output: Option<&str>,
    cli_persist: Option<bool>,
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();

    let app_dir = cli_app_dir
        .map(|s| s.to_string())
        .or(cfg.app_dir)
        .unwrap_or_else(|| ".".to_string());
    let data_dir = cli_data_dir
        .map(|s| s.to_string())
        .or(cfg.data_dir)
        .unwrap_or_else(|| "projects".to_string());
    let out_dir = cli_out_dir
        .map(|s| s.to_string())
        .or(cfg.out_dir)
        .unwrap_or_else(|| "out".to_string());
    let baseline_dir = cli_baseline_dir
        .map(|s| s.to_string())
        .or(cfg.baseline_dir)
        .unwrap_or_else(|| "baseline".to_string());

    let project = cli_project.map(|s| s.to_string()).or(cfg.project);
    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let persist = cli_persist.or(cfg.persist).unwrap_or(true);

    let bin = cfg
        .run
        .as_ref()
        .and_then(|r| r.bin.clone())
        .unwrap_or_else(|| "appcat".to_string());
    let targets = cfg
        .run
        .as_ref()
        .and_then(|r| r.targets.clone())
        .unwrap_or_else(|| DEFAULT_TARGETS.iter().map(|s| s.to_string()).collect());

    Effective {
        app_dir: resolve_dir(&repo_root, &app_dir),
        data_dir: resolve_dir(&repo_root, &data_dir),
        out_dir: resolve_dir(&repo_root, &out_dir),
        baseline_dir: resolve_dir(&repo_root, &baseline_dir),
        repo_root,
        project,
        output,
        persist,
        bin,
        targets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("catgate.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
data_dir = "candidates"
out_dir = "results"
output = "json"
persist = false
[run]
bin = "appcat-cli"
targets = ["linux", "openjdk17"]
    "#
        )
        .unwrap();

        let eff =
            resolve_effective(root.to_str(), None, None, None, None, None, None, None);
        assert_eq!(eff.data_dir, root.join("candidates"));
        assert_eq!(eff.out_dir, root.join("results"));
        assert_eq!(eff.output, "json");
        assert!(!eff.persist);
        assert_eq!(eff.bin, "appcat-cli");
        assert_eq!(eff.targets, vec!["linux", "openjdk17"]);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("catgate.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
baseline_dir: accepted
project: proj1
            "#
        )
        .unwrap();

        let eff =
            resolve_effective(root.to_str(), None, None, None, None, None, None, None);
        assert_eq!(eff.baseline_dir, root.join("accepted"));
        assert_eq!(eff.project.as_deref(), Some("proj1"));
        // Unspecified values fall back to defaults.
        assert_eq!(eff.data_dir, root.join("projects"));
        assert_eq!(eff.output, "human");
        assert!(eff.persist);
        assert_eq!(eff.bin, "appcat");
        assert_eq!(eff.targets.len(), DEFAULT_TARGETS.len());
    }

    #[test]
    fn test_cli_takes_precedence_over_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("catgate.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
data_dir = "candidates"
output = "json"
persist = true
            "#
        )
        .unwrap();

        let eff = resolve_effective(
            root.to_str(),
            None,
            Some("other"),
            None,
            None,
            Some("proj2"),
            Some("human"),
            Some(false),
        );
        assert_eq!(eff.data_dir, root.join("other"));
        assert_eq!(eff.project.as_deref(), Some("proj2"));
        assert_eq!(eff.output, "human");
        assert!(!eff.persist);
    }

    #[test]
    fn test_absolute_dirs_are_kept_as_is() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("catgate.toml"), "").unwrap();
        let abs = if cfg!(windows) { "C:\\data" } else { "/abs/data" };
        let eff = resolve_effective(
            root.to_str(),
            None,
            Some(abs),
            None,
            None,
            None,
            None,
            None,
        );
        assert_eq!(eff.data_dir, PathBuf::from(abs));
    }
}
