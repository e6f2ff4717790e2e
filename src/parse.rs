//! Parser for analyzer output documents.
//!
//! Turns a raw rule-set document into a `NormalizedSet`: a de-duplicated
//! mapping from derived incident keys to incidents, plus per-rule occurrence
//! counts. The key function makes two independently-produced runs comparable
//! even when they reference different workspace roots.

use crate::models::{Incident, RawRuleSet};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name the analyzer writes its findings to inside its output folder.
pub const OUTPUT_FILE: &str = "output.yaml";

/// Extension used for per-incident audit records.
pub const INCIDENT_EXTENSION: &str = ".incident";

#[derive(Debug, thiserror::Error)]
/// Fatal conditions while producing a `NormalizedSet` for one project.
///
/// Each variant carries the project name so failures stay attributable when
/// many projects run in parallel. None of these is recoverable for the
/// affected project: no partial result is returned.
pub enum ParseError {
    #[error("no output.yaml found for project '{project}' in {}", dir.display())]
    MissingOutput { project: String, dir: PathBuf },
    #[error("failed to read analyzer output for project '{project}': {source}")]
    Io {
        project: String,
        #[source]
        source: std::io::Error,
    },
    #[error("analyzer output for project '{project}' is not a valid rule-set document: {source}")]
    Malformed {
        project: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default)]
/// The de-duplicated, keyed representation of all incidents from one parsed
/// document. Built fresh per parse; never mutated after construction.
///
/// `rule_counts` and `total` count occurrences as emitted by the tool,
/// duplicates included; `incidents` keeps the first occurrence per key.
/// Invariant: `total == rule_counts.values().sum()`.
pub struct NormalizedSet {
    pub incidents: BTreeMap<String, Incident>,
    pub rule_counts: BTreeMap<String, usize>,
    pub total: usize,
    /// Keys that occurred more than once; informational, not a failure.
    pub duplicates: Vec<String>,
}

/// Strip everything before the first occurrence of the project name token.
///
/// Absolute paths differ by machine/workspace root between runs; anchoring
/// on the project name makes the location stable. When the token does not
/// appear the raw location is used unchanged (fail-open).
pub fn normalize_location<'a>(uri: &'a str, project: &str) -> &'a str {
    if project.is_empty() {
        return uri;
    }
    match uri.find(project) {
        Some(start) => &uri[start..],
        None => uri,
    }
}

/// Stable identity for an incident across independent runs:
/// `ruleSet-rule-normalizedLocation-lineNumber`.
///
/// An unspecified line number renders as 0, matching the analyzer's own
/// integer default.
pub fn incident_key(incident: &Incident, project: &str) -> String {
    format!(
        "{}-{}-{}-{}",
        incident.rule_set,
        incident.rule,
        normalize_location(&incident.uri, project),
        incident.line_number.unwrap_or(0)
    )
}

fn parse_line_number(value: &serde_yaml::Value) -> Option<i64> {
    match value {
        serde_yaml::Value::Number(n) => n.as_i64(),
        serde_yaml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a rule-set document into a `NormalizedSet`.
///
/// Rule-sets are visited in document order; violation order within a
/// rule-set is irrelevant because counts are associative. A rule-set with no
/// violations or a violation with an empty incident list contributes zero
/// counts. A second incident producing an existing key is dropped and
/// recorded in `duplicates`.
pub fn parse_document(text: &str, project: &str) -> Result<NormalizedSet, ParseError> {
    // An entirely empty document is a valid zero-finding run.
    if text.trim().is_empty() {
        return Ok(NormalizedSet::default());
    }
    let doc: Vec<RawRuleSet> =
        serde_yaml::from_str(text).map_err(|e| ParseError::Malformed {
            project: project.to_string(),
            source: e,
        })?;

    let mut set = NormalizedSet::default();
    for section in doc {
        for (rule, violation) in &section.violations {
            for raw in &violation.incidents {
                set.total += 1;
                *set.rule_counts.entry(rule.clone()).or_insert(0) += 1;
                let incident = Incident {
                    rule_set: section.name.clone(),
                    rule: rule.clone(),
                    uri: raw.uri.clone(),
                    message: raw.message.clone(),
                    code_snip: raw.code_snip.clone(),
                    variables: raw.variables.clone(),
                    line_number: parse_line_number(&raw.line_number),
                };
                let key = incident_key(&incident, project);
                if set.incidents.contains_key(&key) {
                    set.duplicates.push(key);
                } else {
                    set.incidents.insert(key, incident);
                }
            }
        }
    }
    Ok(set)
}

/// Load and parse `output.yaml` from an analyzer output folder.
pub fn load_output(dir: &Path, project: &str) -> Result<NormalizedSet, ParseError> {
    let path = dir.join(OUTPUT_FILE);
    if !path.exists() {
        return Err(ParseError::MissingOutput {
            project: project.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    let text = fs::read_to_string(&path).map_err(|e| ParseError::Io {
        project: project.to_string(),
        source: e,
    })?;
    parse_document(&text, project)
}

/// Write one `<rule>_<n>.incident` audit record per incident into `dir`.
///
/// Consumed by external reviewers; a side effect on request, not part of the
/// parse contract.
pub fn persist_incidents(set: &NormalizedSet, dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut per_rule: BTreeMap<&str, usize> = BTreeMap::new();
    for incident in set.incidents.values() {
        let n = per_rule.entry(incident.rule.as_str()).or_insert(0);
        let name = format!("{}_{}{}", incident.rule, n, INCIDENT_EXTENSION);
        *n += 1;
        let body = serde_yaml::to_string(incident)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(dir.join(name), body)?;
    }
    Ok(())
}
