//! Markdown and headline formatting for direct queries.

use serde_json::Value;
use std::fmt::Write as _;

use crate::bridge::ToolDocument;
use crate::bridge::protocol::{array_field, str_field};
use crate::overview::{StatusOverview, risk_line, scalar_text, strings};

/// Entries shown per list in the overview.
const LIST_LIMIT: usize = 5;

/// One-line summary of the status overview.
pub fn build_headline(overview: &StatusOverview<'_>) -> String {
    let mut headline = format!("Brain status: {}", overview.overall_status());
    match overview.quality_gate_state() {
        Some("failed") => headline.push_str(", quality gate FAILING"),
        Some("success") => headline.push_str(", quality gate passing"),
        _ => {}
    }

    let failing = overview.failing_slices();
    if !failing.is_empty() {
        let _ = write!(
            headline,
            "; {} slice(s) failing validation ({})",
            failing.len(),
            failing.join(", ")
        );
    }
    headline
}

pub fn format_status_overview(overview: &StatusOverview<'_>) -> String {
    let mut md = String::from("# Codebase Health Overview\n\n");
    let _ = writeln!(md, "**Overall Status**: {}\n", overview.overall_status());

    if let Some(gate) = overview.quality_gate() {
        let _ = writeln!(
            md,
            "**Quality Gate (main)**: {}",
            str_field(gate, "state").unwrap_or("unknown")
        );
        let failed_jobs = overview.quality_gate_failed_jobs();
        if !failed_jobs.is_empty() {
            let _ = writeln!(md, "- Failed jobs: {}", failed_jobs.join(", "));
        }
        md.push('\n');
    }

    md.push_str("## Health by Slice\n\n");
    for slice in overview.slices() {
        let status = str_field(slice, "validation_status").unwrap_or("unknown");
        let marker = if status == "passed" { "PASS" } else { "FAIL" };
        let _ = writeln!(
            md,
            "- [{}] **{}**: {} | {} risk(s) | max severity: {}",
            marker,
            str_field(slice, "slice").unwrap_or("unknown"),
            status,
            slice
                .get("risk_count")
                .map(scalar_text)
                .unwrap_or_else(|| "0".to_string()),
            slice
                .get("top_risk_severity")
                .filter(|v| !v.is_null())
                .map(scalar_text)
                .unwrap_or_else(|| "N/A".to_string()),
        );
    }
    md.push('\n');

    md.push_str("## Top Risks (by severity)\n\n");
    let risks = overview.top_risks();
    if risks.is_empty() {
        md.push_str("No critical risks identified.\n");
    } else {
        for (idx, risk) in risks.iter().take(LIST_LIMIT).enumerate() {
            let _ = writeln!(md, "{}. {}", idx + 1, risk_line(risk));
        }
    }
    md.push('\n');

    if let Some(drift) = overview.ci_drift() {
        let degraded = drift.get("degraded_count").and_then(Value::as_u64).unwrap_or(0);
        if degraded > 0 {
            md.push_str("## CI Drift\n\n");
            let _ = writeln!(
                md,
                "{} job(s) with failures or performance degradation:",
                degraded
            );
            for job in array_field(drift, "jobs_with_drift").iter().take(LIST_LIMIT) {
                let _ = writeln!(md, "- {}", scalar_text(job));
            }
            md.push('\n');
        }
    }

    let actions = overview.top_actions();
    if !actions.is_empty() {
        md.push_str("## Top Actions\n\n");
        for action in actions.iter().take(LIST_LIMIT) {
            let _ = write!(md, "- {}", action_head(action));
            let _ = write!(md, ": {}", str_field(action, "summary").unwrap_or(""));
            if let Some(estimate) = estimate(action) {
                let _ = write!(md, " (est: {})", estimate);
            }
            md.push('\n');
        }
        md.push('\n');
    }

    md
}

pub fn format_next_actions(next_actions: &ToolDocument) -> String {
    let mut md = String::from("# Recommended Next Actions\n\n");

    if let Some(filter) = next_actions.str_field("slice_filter").filter(|f| !f.is_empty()) {
        let _ = writeln!(md, "_Filtered to slice: {}_\n", filter);
    }

    let reasoning = strings(next_actions.array("reasoning"));
    if !reasoning.is_empty() {
        md.push_str("**Ranking logic**:\n");
        for line in reasoning {
            let _ = writeln!(md, "- {}", line);
        }
        md.push('\n');
    }

    let actions = next_actions.array("actions");
    if actions.is_empty() {
        md.push_str("No open actions found.\n");
        return md;
    }

    md.push_str("## Actions (ranked)\n\n");
    for (idx, action) in actions.iter().enumerate() {
        let _ = write!(md, "{}. {}", idx + 1, action_head(action));
        if let Some(slice) = str_field(action, "slice").filter(|s| !s.is_empty()) {
            let _ = write!(md, " ({})", slice);
        }
        let _ = write!(md, ": {}", str_field(action, "summary").unwrap_or(""));
        if let Some(estimate) = estimate(action) {
            let _ = write!(md, ", est: {}", estimate);
        }
        md.push('\n');
    }
    md
}

fn action_head(action: &Value) -> String {
    format!(
        "**{}** [{}]",
        str_field(action, "priority").unwrap_or("P2"),
        str_field(action, "risk_id").unwrap_or("unknown")
    )
}

fn estimate(action: &Value) -> Option<&str> {
    str_field(action, "estimate").filter(|e| !e.is_empty())
}
