//! Report rendering: CSV summaries and the Markdown validation results.
//!
//! CSV output follows RFC 4180 escaping. The Markdown item format matches
//! what CI comments expect: a checked task-list entry per passing project
//! and a `<details>` block enumerating mismatch keys per failing one.

use crate::aggregate::RuleMatrix;
use crate::diff::DiffResult;
use crate::runner::ProjectReport;
use std::collections::BTreeMap;

/// Render the cross-project rule × project count matrix as CSV.
///
/// Header is `Rule,<project...>`; every cell is filled, zero where a project
/// reports no occurrences of a rule.
pub fn render_summary_csv(matrix: &RuleMatrix) -> String {
    let mut out = String::from("Rule");
    for project in matrix.projects() {
        out.push(',');
        out.push_str(&escape_csv_field(project));
    }
    out.push('\n');
    for rule in matrix.rules() {
        out.push_str(&escape_csv_field(rule));
        for project in matrix.projects() {
            out.push_str(&format!(",{}", matrix.count(rule, project)));
        }
        out.push('\n');
    }
    out
}

/// Render one project's rule→count mapping as `Rule,Incidents` CSV.
pub fn render_incidents_csv(rule_counts: &BTreeMap<String, usize>) -> String {
    let mut out = String::from("Rule,Incidents\n");
    for (rule, count) in rule_counts {
        out.push_str(&format!("{},{}\n", escape_csv_field(rule), count));
    }
    out
}

/// Enumerate a diff's mismatches as display lines, new then changed then
/// missing, each group in key order.
pub fn detail_lines(diff: &DiffResult) -> Vec<String> {
    let mut lines = Vec::new();
    for key in &diff.new_keys {
        lines.push(format!("[NEW] : {key}"));
    }
    for (key, change) in &diff.changed {
        lines.push(format!(
            "[WRONG] :{} message mismatch: {} != {}",
            key, change.current, change.baseline
        ));
    }
    for key in &diff.missing_keys {
        lines.push(format!("[MISS]: {key}"));
    }
    lines
}

/// Mismatch (or error) lines for a project report, empty when it passed.
pub fn report_details(report: &ProjectReport) -> Vec<String> {
    if let Some(err) = &report.error {
        return vec![format!("[ERROR] {err}")];
    }
    match &report.diff {
        Some(d) => detail_lines(d),
        None => Vec::new(),
    }
}

/// Render per-project validation results as a Markdown task list.
pub fn render_validation_markdown(reports: &[ProjectReport]) -> String {
    let mut out = String::new();
    for report in reports {
        if report.passed() {
            out.push_str(&format!("- [x] <b>{}</b>.\n", report.project));
        } else {
            let details = report_details(report).join("\n");
            out.push_str(&format!(
                "- [ ] :x: <b>{}</b>. \n\n  <details>\n  <summary> Details </summary>\n\n  {}\n\n</details>\n",
                report.project, details
            ));
        }
    }
    out
}

/// Escape a field for CSV according to RFC 4180: quote fields containing
/// commas, quotes, or newlines; double embedded quotes.
fn escape_csv_field(s: &str) -> String {
    let needs_quoting = s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r');
    if needs_quoting {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::MessageChange;

    fn counts(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
        pairs.iter().map(|(r, c)| (r.to_string(), *c)).collect()
    }

    #[test]
    fn test_summary_csv_zero_fills_missing_cells() {
        let mut m = RuleMatrix::default();
        m.merge("proj1", &counts(&[("sql-injection", 2)]));
        m.merge("proj2", &counts(&[("weak-hash", 1)]));
        let csv = render_summary_csv(&m);
        assert_eq!(
            csv,
            "Rule,proj1,proj2\nsql-injection,2,0\nweak-hash,0,1\n"
        );
    }

    #[test]
    fn test_csv_escaping_quotes_special_fields() {
        let mut m = RuleMatrix::default();
        m.merge("proj1", &counts(&[("rule,with,commas", 1)]));
        let csv = render_summary_csv(&m);
        assert!(csv.contains("\"rule,with,commas\",1"));

        let incidents = render_incidents_csv(&counts(&[("say \"hi\"", 2)]));
        assert!(incidents.contains("\"say \"\"hi\"\"\",2"));
    }

    #[test]
    fn test_incidents_csv_shape() {
        let csv = render_incidents_csv(&counts(&[("weak-hash", 1), ("sql-injection", 2)]));
        assert_eq!(csv, "Rule,Incidents\nsql-injection,2\nweak-hash,1\n");
    }

    #[test]
    fn test_detail_lines_cover_all_classifications() {
        let mut d = DiffResult::default();
        d.new_keys.push("k-new".into());
        d.missing_keys.push("k-miss".into());
        d.changed.insert(
            "k-chg".into(),
            MessageChange {
                baseline: "old".into(),
                current: "new".into(),
            },
        );
        let lines = detail_lines(&d);
        assert_eq!(
            lines,
            vec![
                "[NEW] : k-new",
                "[WRONG] :k-chg message mismatch: new != old",
                "[MISS]: k-miss",
            ]
        );
    }

    #[test]
    fn test_validation_markdown_pass_and_fail_items() {
        let pass = ProjectReport {
            project: "clean".into(),
            total: 0,
            rule_counts: BTreeMap::new(),
            duplicates: vec![],
            diff: Some(DiffResult::default()),
            error: None,
        };
        let mut failing_diff = DiffResult::default();
        failing_diff.new_keys.push("security-x-proj/A.java-1".into());
        let fail = ProjectReport {
            project: "drifted".into(),
            total: 1,
            rule_counts: BTreeMap::new(),
            duplicates: vec![],
            diff: Some(failing_diff),
            error: None,
        };
        let md = render_validation_markdown(&[pass, fail]);
        assert!(md.contains("- [x] <b>clean</b>."));
        assert!(md.contains("- [ ] :x: <b>drifted</b>."));
        assert!(md.contains("<details>"));
        assert!(md.contains("[NEW] : security-x-proj/A.java-1"));
    }

    #[test]
    fn test_error_report_renders_error_detail() {
        let report = ProjectReport {
            project: "broken".into(),
            total: 0,
            rule_counts: BTreeMap::new(),
            duplicates: vec![],
            diff: None,
            error: Some("no output.yaml found".into()),
        };
        assert_eq!(report_details(&report), vec!["[ERROR] no output.yaml found"]);
        let md = render_validation_markdown(&[report]);
        assert!(md.contains(":x: <b>broken</b>"));
    }
}
