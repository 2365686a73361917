//! Reviewer instructions accompanying the report.

use std::fmt::Write as _;

use super::report::ReviewSnapshot;
use crate::bridge::protocol::str_field;
use crate::overview::join_or_none;

/// Instructions used whenever the status overview is missing.
pub const UNAVAILABLE_INSTRUCTIONS: &str = "Brain MCP context is UNAVAILABLE for this PR.\n\
Reviewer, you MUST:\n\
- Rely solely on the diff and standard review practices.\n\
- NOT make claims about CI status, validation status, or module risk.\n";

/// Detailed instructions for a review with a status overview.
///
/// Falls back to [`UNAVAILABLE_INSTRUCTIONS`] when the overview is absent.
pub fn render_instructions(snapshot: &ReviewSnapshot, max_risks: usize) -> String {
    let Some(overview) = snapshot.status_overview() else {
        return UNAVAILABLE_INSTRUCTIONS.to_string();
    };

    let modules: &[String] = snapshot
        .impact
        .as_ref()
        .map(|impact| impact.modules.as_slice())
        .unwrap_or(&[]);
    let risk_ids: Vec<&str> = overview
        .top_risks()
        .iter()
        .take(max_risks)
        .filter_map(|risk| str_field(risk, "id"))
        .collect();

    let mut text = String::from("Brain MCP context for this PR (see BRAIN_QODO_CONTEXT.md):\n");
    let _ = writeln!(
        text,
        "- Overall codebase status: {} (failing slices: {})",
        overview.overall_status(),
        join_or_none(&overview.failing_slices())
    );
    if let Some(state) = overview.quality_gate_state() {
        let _ = writeln!(text, "- Quality gate: {}", state);
    }
    let _ = writeln!(text, "- Impacted modules: {}", join_or_none(modules));
    let _ = writeln!(text, "- Top risks in scope: {}", join_or_none(&risk_ids));

    text.push_str("\nReviewer, you MUST:\n");
    text.push_str("- Prioritize issues that affect these modules and risks.\n");
    text.push_str("- Explicitly mention if you rely on this Brain snapshot.\n");
    text.push_str("- If a section of the snapshot is unavailable, say so and limit your claims.\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ToolDocument;
    use crate::context::impact::{ImpactShape, ImpactedModules};
    use serde_json::json;

    #[test]
    fn missing_overview_yields_generic_text() {
        let snapshot = ReviewSnapshot {
            impact: Some(ImpactedModules {
                shape: ImpactShape::Flat,
                modules: vec!["crate::mod1".into()],
                total: 1,
            }),
            ..Default::default()
        };

        assert_eq!(render_instructions(&snapshot, 5), UNAVAILABLE_INSTRUCTIONS);
        assert!(UNAVAILABLE_INSTRUCTIONS.contains("standard review practices"));
    }

    #[test]
    fn summarizes_status_modules_and_risks() {
        let snapshot = ReviewSnapshot {
            overview: Some(ToolDocument::new(json!({
                "overall_status": "pass",
                "quality_gate": {"state": "success"},
                "by_slice": [{"slice": "runtime", "validation_status": "passed"}],
                "top_risks": [{"id": "R1"}, {"id": "R2"}, {"id": "R3"}]
            }))),
            impact: Some(ImpactedModules {
                shape: ImpactShape::Resolved,
                modules: vec!["crate::mod1".into(), "crate::mod2".into()],
                total: 2,
            }),
            ..Default::default()
        };

        let text = render_instructions(&snapshot, 2);

        assert!(text.contains("- Overall codebase status: PASS (failing slices: None)"));
        assert!(text.contains("- Quality gate: success"));
        assert!(text.contains("- Impacted modules: crate::mod1, crate::mod2"));
        assert!(text.contains("- Top risks in scope: R1, R2\n"));
        assert!(text.contains("Reviewer, you MUST:"));
    }

    #[test]
    fn absent_impact_lists_none() {
        let snapshot = ReviewSnapshot {
            overview: Some(ToolDocument::new(json!({"overall_status": "fail"}))),
            ..Default::default()
        };

        let text = render_instructions(&snapshot, 5);
        assert!(text.contains("- Impacted modules: None"));
        assert!(text.contains("- Top risks in scope: None"));
    }
}
