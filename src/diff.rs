//! Baseline differ: classifies the current incident set against a baseline.
//!
//! Every key in the current set is matched, new, or changed; every baseline
//! key absent from the current set is missing. Mismatches are data, not
//! errors — this is the signal the harness exists to produce. The result is
//! a pure function of the two key sets and their message fields, independent
//! of iteration order.

use crate::parse::NormalizedSet;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// The two message versions of a changed incident.
pub struct MessageChange {
    pub baseline: String,
    pub current: String,
}

#[derive(Debug, Default, Serialize)]
/// Classification of one comparison between current and baseline sets.
///
/// Produced once per comparison and consumed immediately for reporting.
pub struct DiffResult {
    pub matched: usize,
    /// Keys present in current but not in baseline, sorted.
    pub new_keys: Vec<String>,
    /// Keys present in baseline but not in current, sorted.
    pub missing_keys: Vec<String>,
    /// Keys present in both whose messages differ. Only the message is
    /// compared; snippet and variables drift is tolerated on purpose.
    pub changed: BTreeMap<String, MessageChange>,
}

impl DiffResult {
    /// True iff there is nothing new, missing, or changed.
    pub fn passed(&self) -> bool {
        self.new_keys.is_empty() && self.missing_keys.is_empty() && self.changed.is_empty()
    }

    /// Total number of mismatched keys.
    pub fn mismatches(&self) -> usize {
        self.new_keys.len() + self.missing_keys.len() + self.changed.len()
    }
}

/// Compare `current` against `baseline`.
pub fn diff(current: &NormalizedSet, baseline: &NormalizedSet) -> DiffResult {
    let mut result = DiffResult::default();
    for (key, incident) in &current.incidents {
        match baseline.incidents.get(key) {
            None => result.new_keys.push(key.clone()),
            Some(base) if base.message != incident.message => {
                result.changed.insert(
                    key.clone(),
                    MessageChange {
                        baseline: base.message.clone(),
                        current: incident.message.clone(),
                    },
                );
            }
            Some(_) => result.matched += 1,
        }
    }
    for key in baseline.incidents.keys() {
        if !current.incidents.contains_key(key) {
            result.missing_keys.push(key.clone());
        }
    }
    result
}
