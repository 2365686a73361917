//! Read-only view over a `get_status_overview` document.
//!
//! Shared by the review report and the status query. Every accessor
//! tolerates missing or mistyped fields.

use serde_json::Value;

use crate::bridge::ToolDocument;
use crate::bridge::protocol::{array_field, str_field};

/// Validation states counted as healthy.
const PASSING_STATES: [&str; 2] = ["passed", "success"];

#[derive(Debug, Clone, Copy)]
pub struct StatusOverview<'a> {
    doc: &'a ToolDocument,
}

impl<'a> StatusOverview<'a> {
    pub fn new(doc: &'a ToolDocument) -> Self {
        Self { doc }
    }

    /// `overall_status` uppercased, `UNKNOWN` when absent.
    pub fn overall_status(&self) -> String {
        self.doc
            .str_field("overall_status")
            .unwrap_or("unknown")
            .to_uppercase()
    }

    pub fn quality_gate(&self) -> Option<&'a Value> {
        self.doc.get("quality_gate").filter(|v| v.is_object())
    }

    pub fn quality_gate_state(&self) -> Option<&'a str> {
        self.quality_gate().and_then(|gate| str_field(gate, "state"))
    }

    pub fn quality_gate_failed_jobs(&self) -> Vec<&'a str> {
        self.quality_gate()
            .map(|gate| strings(array_field(gate, "failed_jobs")))
            .unwrap_or_default()
    }

    pub fn slices(&self) -> &'a [Value] {
        self.doc.array("by_slice")
    }

    /// Slices whose validation status is neither `passed` nor `success`.
    pub fn failing_slices(&self) -> Vec<&'a str> {
        self.slices()
            .iter()
            .filter(|entry| {
                !str_field(entry, "validation_status")
                    .is_some_and(|status| PASSING_STATES.contains(&status))
            })
            .map(|entry| str_field(entry, "slice").unwrap_or("?"))
            .collect()
    }

    pub fn top_risks(&self) -> &'a [Value] {
        self.doc.array("top_risks")
    }

    pub fn top_actions(&self) -> &'a [Value] {
        self.doc.array("top_actions")
    }

    pub fn ci_drift(&self) -> Option<&'a Value> {
        self.doc.get("ci_drift").filter(|v| !v.is_null())
    }
}

/// `**P1** [R-12] (severity=8): <action>`, with `, est: <estimate>` when known.
pub(crate) fn risk_line(risk: &Value) -> String {
    let mut line = format!(
        "**{}** [{}] (severity={}): {}",
        str_field(risk, "priority").unwrap_or("P2"),
        str_field(risk, "id").unwrap_or("unknown"),
        risk.get("severity").map(scalar_text).unwrap_or_else(|| "0".to_string()),
        str_field(risk, "recommended_action").unwrap_or(""),
    );
    if let Some(estimate) = str_field(risk, "estimate").filter(|e| !e.is_empty()) {
        line.push_str(", est: ");
        line.push_str(estimate);
    }
    line
}

/// Render a scalar without JSON quoting.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn strings(values: &[Value]) -> Vec<&str> {
    values.iter().filter_map(Value::as_str).collect()
}

/// Comma-separated list, or `None` when empty.
pub(crate) fn join_or_none<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn overview() -> ToolDocument {
        ToolDocument::new(json!({
            "overall_status": "degraded",
            "quality_gate": {"state": "failed", "failed_jobs": ["lint", 3, "test"]},
            "by_slice": [
                {"slice": "runtime", "validation_status": "passed"},
                {"slice": "tooling", "validation_status": "failed"},
                {"validation_status": "success"},
                {"slice": "docs"}
            ],
            "top_risks": [{"id": "R1"}],
            "ci_drift": null
        }))
    }

    #[test]
    fn reads_overall_status_and_gate() {
        let doc = overview();
        let view = StatusOverview::new(&doc);

        assert_eq!(view.overall_status(), "DEGRADED");
        assert_eq!(view.quality_gate_state(), Some("failed"));
        assert_eq!(view.quality_gate_failed_jobs(), vec!["lint", "test"]);
        assert_eq!(view.top_risks().len(), 1);
        assert!(view.top_actions().is_empty());
        assert!(view.ci_drift().is_none());
    }

    #[test]
    fn failing_slices_exclude_passed_and_success() {
        let doc = overview();
        assert_eq!(
            StatusOverview::new(&doc).failing_slices(),
            vec!["tooling", "docs"]
        );
    }

    #[test]
    fn missing_overall_status_is_unknown() {
        let doc = ToolDocument::new(json!({"raw_text": "garbled"}));
        let view = StatusOverview::new(&doc);
        assert_eq!(view.overall_status(), "UNKNOWN");
        assert!(view.quality_gate().is_none());
        assert!(view.failing_slices().is_empty());
    }

    #[rstest]
    #[case::full(
        json!({"priority": "P1", "id": "R-12", "severity": 8, "recommended_action": "Add tests", "estimate": "2h"}),
        "**P1** [R-12] (severity=8): Add tests, est: 2h"
    )]
    #[case::defaults(json!({}), "**P2** [unknown] (severity=0): ")]
    #[case::string_severity(
        json!({"id": "R2", "severity": "high", "recommended_action": "Split module"}),
        "**P2** [R2] (severity=high): Split module"
    )]
    fn formats_risk_lines(#[case] risk: Value, #[case] expected: &str) {
        assert_eq!(risk_line(&risk), expected);
    }

    #[test]
    fn join_or_none_handles_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(join_or_none(&empty), "None");
        assert_eq!(join_or_none(&["a", "b"]), "a, b");
    }
}
