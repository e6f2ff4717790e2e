//! Cross-project aggregation of per-rule incident counts.
//!
//! Folds each project's rule→count mapping into a rule × project matrix for
//! tabular export. The merge is associative and commutative, so matrices can
//! be built incrementally as parses complete and combined in any order.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone)]
/// Rule rows × project columns, zero where a project reports nothing.
pub struct RuleMatrix {
    counts: BTreeMap<String, BTreeMap<String, usize>>,
    projects: BTreeSet<String>,
}

impl RuleMatrix {
    /// Fold one project's rule counts into the matrix.
    ///
    /// Registers the project column even when its counts are empty so a
    /// clean project still appears in the export.
    pub fn merge(&mut self, project: &str, rule_counts: &BTreeMap<String, usize>) {
        self.projects.insert(project.to_string());
        for (rule, count) in rule_counts {
            *self
                .counts
                .entry(rule.clone())
                .or_default()
                .entry(project.to_string())
                .or_insert(0) += count;
        }
    }

    /// Combine another matrix into this one.
    pub fn absorb(&mut self, other: RuleMatrix) {
        self.projects.extend(other.projects);
        for (rule, row) in other.counts {
            let dest = self.counts.entry(rule).or_default();
            for (project, count) in row {
                *dest.entry(project).or_insert(0) += count;
            }
        }
    }

    pub fn count(&self, rule: &str, project: &str) -> usize {
        self.counts
            .get(rule)
            .and_then(|row| row.get(project))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all counts across rules and projects.
    pub fn total(&self) -> usize {
        self.counts.values().flat_map(|row| row.values()).sum()
    }

    pub fn rules(&self) -> impl Iterator<Item = &String> {
        self.counts.keys()
    }

    pub fn projects(&self) -> impl Iterator<Item = &String> {
        self.projects.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
