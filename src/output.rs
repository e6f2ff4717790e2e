//! Output rendering for analyze and validate commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-project fields and a top-level summary.

use crate::aggregate::RuleMatrix;
use crate::report;
use crate::runner::ProjectReport;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Print analyze results in the requested format.
pub fn print_analyze(reports: &[ProjectReport], matrix: &RuleMatrix, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_analyze_json(reports, matrix)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for r in reports {
                match &r.error {
                    Some(err) => {
                        let icon = if color {
                            "✖".red().to_string()
                        } else {
                            "✖".to_string()
                        };
                        println!("{} {} — {}", icon, r.project, err);
                    }
                    None => {
                        let icon = if color {
                            "◆".blue().to_string()
                        } else {
                            "◆".to_string()
                        };
                        println!(
                            "{} {} incidents={} rules={}",
                            icon,
                            r.project,
                            r.total,
                            r.rule_counts.len()
                        );
                        for dup in &r.duplicates {
                            println!("    duplicate incident: {}", dup);
                        }
                    }
                }
            }
            let errors = reports.iter().filter(|r| r.error.is_some()).count();
            let summary = format!(
                "— Summary — projects={} incidents={} errors={}",
                reports.len(),
                matrix.total(),
                errors
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Print validation results in the requested format.
///
/// Failing projects get a details block enumerating every new, missing, and
/// changed key; a run with zero mismatches reports an unconditional pass.
pub fn print_validate(reports: &[ProjectReport], output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_validate_json(reports)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for r in reports {
                let (icon, label) = match r.status() {
                    "pass" => ("✔", "pass"),
                    "error" => ("✖", "error"),
                    _ => ("✖", "fail"),
                };
                let icon = if color {
                    match label {
                        "pass" => icon.green().to_string(),
                        _ => icon.red().to_string(),
                    }
                } else {
                    icon.to_string()
                };
                let name = if color {
                    r.project.clone().bold().to_string()
                } else {
                    r.project.clone()
                };
                println!("{} {} ❲{}❳", icon, name, label);
                for line in report::report_details(r) {
                    println!("    {}", line);
                }
            }
            let passed = reports.iter().filter(|r| r.passed()).count();
            let errors = reports.iter().filter(|r| r.error.is_some()).count();
            let failed = reports.len() - passed - errors;
            let summary = format!(
                "— Summary — passed={} failed={} errors={} projects={}",
                passed,
                failed,
                errors,
                reports.len()
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Compose analyze JSON object (pure) for testing/snapshot purposes.
pub fn compose_analyze_json(reports: &[ProjectReport], matrix: &RuleMatrix) -> JsonVal {
    let rules: serde_json::Map<String, JsonVal> = matrix
        .rules()
        .map(|rule| {
            let row: serde_json::Map<String, JsonVal> = matrix
                .projects()
                .map(|p| (p.clone(), json!(matrix.count(rule, p))))
                .collect();
            (rule.clone(), JsonVal::Object(row))
        })
        .collect();
    let errors = reports.iter().filter(|r| r.error.is_some()).count();
    json!({
        "projects": reports,
        "rules": rules,
        "summary": {
            "projects": reports.len(),
            "incidents": matrix.total(),
            "errors": errors,
        }
    })
}

/// Compose validate JSON object (pure) for testing/snapshot purposes.
pub fn compose_validate_json(reports: &[ProjectReport]) -> JsonVal {
    let passed = reports.iter().filter(|r| r.passed()).count();
    let errors = reports.iter().filter(|r| r.error.is_some()).count();
    let items: Vec<JsonVal> = reports
        .iter()
        .map(|r| {
            let mut v = serde_json::to_value(r).unwrap();
            v["status"] = json!(r.status());
            v
        })
        .collect();
    json!({
        "projects": items,
        "summary": {
            "passed": passed,
            "failed": reports.len() - passed - errors,
            "errors": errors,
            "projects": reports.len(),
        }
    })
}
