//! Shared data models: the analyzer's raw YAML document and the normalized
//! incident record.
//!
//! The raw types mirror the shape AppCat emits (`output.yaml`): an ordered
//! list of rule-sets, each with a name and a `violations` mapping from
//! rule-name to a list of incident records. `Incident` is the normalized,
//! immutable form carrying rule provenance; it is also the on-disk shape of
//! per-incident audit records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
/// One incident record as emitted by the analyzer.
///
/// `lineNumber` arrives as an arbitrary YAML value: the tool sometimes emits
/// strings or omits the field entirely, so it is normalized later rather
/// than parsed strictly here.
pub struct RawIncident {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "codeSnip")]
    pub code_snip: String,
    #[serde(default)]
    pub variables: serde_yaml::Value,
    #[serde(default, rename = "lineNumber")]
    pub line_number: serde_yaml::Value,
}

#[derive(Debug, Clone, Deserialize)]
/// A named violation: the list of incidents reported for one rule.
pub struct RawViolation {
    #[serde(default)]
    pub incidents: Vec<RawIncident>,
}

#[derive(Debug, Clone, Deserialize)]
/// One rule-set section of the analyzer document.
pub struct RawRuleSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub violations: BTreeMap<String, RawViolation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A normalized finding with full rule provenance. Immutable once parsed.
///
/// `variables` is semi-structured (mapping or scalar, varies per rule) and
/// is carried through without interpretation; it participates in no
/// comparison. `line_number` is `None` when the analyzer emitted a
/// non-numeric or absent value.
pub struct Incident {
    #[serde(rename = "ruleSet")]
    pub rule_set: String,
    pub rule: String,
    pub uri: String,
    pub message: String,
    #[serde(rename = "codeSnip")]
    pub code_snip: String,
    pub variables: serde_yaml::Value,
    #[serde(rename = "lineNumber")]
    pub line_number: Option<i64>,
}
