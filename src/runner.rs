//! Per-project pipeline: discovery, analyzer invocation, analyze and
//! validate stages.
//!
//! Projects are independent, so the analyze/validate stages fan out with
//! rayon and the resulting reports are reduced afterwards; the aggregate
//! merge is commutative, so no locking is needed. A project whose parse
//! fails is reported as an error outcome tagged with its name and never
//! aborts its siblings.

use crate::aggregate::RuleMatrix;
use crate::config::Effective;
use crate::diff::{self, DiffResult};
use crate::parse;
use crate::report;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Serialize)]
/// Outcome of one project's analyze or validate stage.
pub struct ProjectReport {
    pub project: String,
    pub total: usize,
    pub rule_counts: BTreeMap<String, usize>,
    pub duplicates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProjectReport {
    fn from_error(project: &str, message: String) -> Self {
        ProjectReport {
            project: project.to_string(),
            total: 0,
            rule_counts: BTreeMap::new(),
            duplicates: Vec::new(),
            diff: None,
            error: Some(message),
        }
    }

    /// True when the stage completed and, for validation, nothing drifted.
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.diff.as_ref().map_or(true, |d| d.passed())
    }

    pub fn status(&self) -> &'static str {
        if self.error.is_some() {
            "error"
        } else if self.passed() {
            "pass"
        } else {
            "fail"
        }
    }
}

/// Analyzer output folder for one project: `<out>/<project>/appcat_output`.
pub fn appcat_output_dir(eff: &Effective, project: &str) -> PathBuf {
    eff.out_dir.join(project).join("appcat_output")
}

/// Analysis artifacts folder: `<out>/<project>/analysis_output`.
pub fn analysis_output_dir(eff: &Effective, project: &str) -> PathBuf {
    eff.out_dir.join(project).join("analysis_output")
}

/// Baseline folder holding the accepted `output.yaml` for one project.
pub fn baseline_output_dir(eff: &Effective, project: &str) -> PathBuf {
    eff.baseline_dir.join(project)
}

/// Enumerate candidate projects under the data dir.
///
/// With `only` set, that single project must exist; otherwise every
/// non-hidden direct subdirectory is a candidate, sorted by name.
pub fn discover_projects(eff: &Effective, only: Option<&str>) -> Result<Vec<String>, String> {
    if let Some(name) = only {
        let path = eff.data_dir.join(name);
        if !path.is_dir() {
            return Err(format!(
                "project '{}' does not exist in the data folder {}",
                name,
                eff.data_dir.display()
            ));
        }
        return Ok(vec![name.to_string()]);
    }
    let entries = fs::read_dir(&eff.data_dir).map_err(|e| {
        format!(
            "failed to read data folder {}: {}",
            eff.data_dir.display(),
            e
        )
    })?;
    let mut names: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| !n.starts_with('.'))
        .collect();
    names.sort();
    Ok(names)
}

/// Invoke the external analyzer for one project.
///
/// Runs `<app_dir>/<bin> analyze --input ... --output ... --target ...
/// --overwrite` with inherited stdio; a non-zero exit is an error for this
/// project only.
pub fn run_analyzer(eff: &Effective, project: &str) -> Result<(), String> {
    let project_dir = eff.data_dir.join(project);
    if !project_dir.is_dir() {
        return Err(format!(
            "candidate project folder does not exist: {}",
            project_dir.display()
        ));
    }
    let output_dir = appcat_output_dir(eff, project);
    fs::create_dir_all(&output_dir)
        .map_err(|e| format!("failed to create output folder {}: {}", output_dir.display(), e))?;

    let bin = eff.app_dir.join(&eff.bin);
    let status = Command::new(&bin)
        .arg("analyze")
        .arg("--input")
        .arg(&project_dir)
        .arg("--output")
        .arg(&output_dir)
        .arg("--target")
        .arg(eff.targets.join(","))
        .arg("--overwrite")
        .current_dir(&eff.app_dir)
        .status()
        .map_err(|e| format!("failed to launch analyzer {}: {}", bin.display(), e))?;
    if !status.success() {
        return Err(format!(
            "analyzer failed for project '{}' ({})",
            project, status
        ));
    }
    Ok(())
}

/// Analyze one project: parse its analyzer output, persist audit records and
/// the per-project incidents CSV.
pub fn analyze_project(eff: &Effective, project: &str) -> ProjectReport {
    let set = match parse::load_output(&appcat_output_dir(eff, project), project) {
        Ok(s) => s,
        Err(e) => return ProjectReport::from_error(project, e.to_string()),
    };

    let analysis_dir = analysis_output_dir(eff, project);
    if eff.persist {
        if let Err(e) = parse::persist_incidents(&set, &analysis_dir) {
            return ProjectReport::from_error(
                project,
                format!("failed to write incident records: {e}"),
            );
        }
    }
    if let Err(e) = fs::create_dir_all(&analysis_dir).and_then(|_| {
        fs::write(
            analysis_dir.join("incidents_summary.csv"),
            report::render_incidents_csv(&set.rule_counts),
        )
    }) {
        return ProjectReport::from_error(project, format!("failed to write incidents summary: {e}"));
    }

    ProjectReport {
        project: project.to_string(),
        total: set.total,
        rule_counts: set.rule_counts,
        duplicates: set.duplicates,
        diff: None,
        error: None,
    }
}

/// Validate one project: parse current and baseline documents and diff them.
pub fn validate_project(eff: &Effective, project: &str) -> ProjectReport {
    let current = match parse::load_output(&appcat_output_dir(eff, project), project) {
        Ok(s) => s,
        Err(e) => return ProjectReport::from_error(project, e.to_string()),
    };
    let baseline = match parse::load_output(&baseline_output_dir(eff, project), project) {
        Ok(s) => s,
        Err(e) => return ProjectReport::from_error(project, format!("baseline: {e}")),
    };
    let result = diff::diff(&current, &baseline);
    ProjectReport {
        project: project.to_string(),
        total: current.total,
        rule_counts: current.rule_counts,
        duplicates: current.duplicates,
        diff: Some(result),
        error: None,
    }
}

/// Analyze all projects in parallel and fold their counts into a matrix.
///
/// Errored projects are excluded from aggregation (absent, not zeroed).
pub fn analyze_all(eff: &Effective, projects: &[String]) -> (Vec<ProjectReport>, RuleMatrix) {
    let reports: Vec<ProjectReport> = projects
        .par_iter()
        .map(|p| analyze_project(eff, p))
        .collect();
    let mut matrix = RuleMatrix::default();
    for r in &reports {
        if r.error.is_none() {
            matrix.merge(&r.project, &r.rule_counts);
        }
    }
    (reports, matrix)
}

/// Validate all projects in parallel.
pub fn validate_all(eff: &Effective, projects: &[String]) -> Vec<ProjectReport> {
    projects
        .par_iter()
        .map(|p| validate_project(eff, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve_effective;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
- name: security
  violations:
    sql-injection:
      incidents:
        - uri: /repo/proj1/src/A.java
          message: "M"
          lineNumber: 10
"#;

    fn effective(root: &std::path::Path) -> Effective {
        resolve_effective(root.to_str(), None, None, None, None, None, None, None)
    }

    fn write_output(dir: &std::path::Path, text: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(parse::OUTPUT_FILE), text).unwrap();
    }

    #[test]
    fn test_discover_projects_skips_hidden_and_files() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        fs::create_dir_all(eff.data_dir.join("proj2")).unwrap();
        fs::create_dir_all(eff.data_dir.join("proj1")).unwrap();
        fs::create_dir_all(eff.data_dir.join(".hidden")).unwrap();
        fs::write(eff.data_dir.join("notes.txt"), "x").unwrap();

        let projects = discover_projects(&eff, None).unwrap();
        assert_eq!(projects, vec!["proj1", "proj2"]);
    }

    #[test]
    fn test_discover_named_project_must_exist() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        fs::create_dir_all(eff.data_dir.join("proj1")).unwrap();

        assert_eq!(
            discover_projects(&eff, Some("proj1")).unwrap(),
            vec!["proj1"]
        );
        let err = discover_projects(&eff, Some("ghost")).unwrap_err();
        assert!(err.contains("ghost"));
    }

    #[test]
    fn test_analyze_project_writes_artifacts() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        write_output(&appcat_output_dir(&eff, "proj1"), SAMPLE);

        let report = analyze_project(&eff, "proj1");
        assert!(report.passed());
        assert_eq!(report.total, 1);
        assert_eq!(report.rule_counts["sql-injection"], 1);

        let analysis = analysis_output_dir(&eff, "proj1");
        assert!(analysis.join("incidents_summary.csv").exists());
        assert!(analysis.join("sql-injection_0.incident").exists());
    }

    #[test]
    fn test_analyze_project_missing_output_is_error() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        let report = analyze_project(&eff, "proj1");
        assert_eq!(report.status(), "error");
        assert!(report.error.as_deref().unwrap().contains("proj1"));
    }

    #[test]
    fn test_analyze_respects_persist_flag() {
        let dir = tempdir().unwrap();
        let mut eff = effective(dir.path());
        eff.persist = false;
        write_output(&appcat_output_dir(&eff, "proj1"), SAMPLE);

        let report = analyze_project(&eff, "proj1");
        assert!(report.passed());
        let analysis = analysis_output_dir(&eff, "proj1");
        assert!(analysis.join("incidents_summary.csv").exists());
        assert!(!analysis.join("sql-injection_0.incident").exists());
    }

    #[test]
    fn test_validate_project_passes_on_identical_documents() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        write_output(&appcat_output_dir(&eff, "proj1"), SAMPLE);
        write_output(&baseline_output_dir(&eff, "proj1"), SAMPLE);

        let report = validate_project(&eff, "proj1");
        assert_eq!(report.status(), "pass");
        assert_eq!(report.diff.as_ref().unwrap().matched, 1);
    }

    #[test]
    fn test_validate_project_fails_on_message_drift() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        write_output(&appcat_output_dir(&eff, "proj1"), SAMPLE);
        write_output(
            &baseline_output_dir(&eff, "proj1"),
            &SAMPLE.replace("\"M\"", "\"M2\""),
        );

        let report = validate_project(&eff, "proj1");
        assert_eq!(report.status(), "fail");
        let d = report.diff.as_ref().unwrap();
        assert_eq!(d.changed.len(), 1);
        assert!(d.new_keys.is_empty());
        assert!(d.missing_keys.is_empty());
    }

    #[test]
    fn test_validate_missing_baseline_is_error_not_pass() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        write_output(&appcat_output_dir(&eff, "proj1"), SAMPLE);

        let report = validate_project(&eff, "proj1");
        assert_eq!(report.status(), "error");
        assert!(report.error.as_deref().unwrap().starts_with("baseline:"));
    }

    #[test]
    fn test_analyze_all_aggregates_only_successful_projects() {
        let dir = tempdir().unwrap();
        let eff = effective(dir.path());
        write_output(&appcat_output_dir(&eff, "proj1"), SAMPLE);
        // proj2 has no analyzer output at all.
        fs::create_dir_all(appcat_output_dir(&eff, "proj2")).unwrap();

        let (reports, matrix) =
            analyze_all(&eff, &["proj1".to_string(), "proj2".to_string()]);
        assert_eq!(reports.len(), 2);
        assert_eq!(matrix.count("sql-injection", "proj1"), 1);
        assert!(matrix.projects().all(|p| p != "proj2"));
    }
}
