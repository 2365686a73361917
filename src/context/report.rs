//! Markdown rendering of the review report.
//!
//! Output depends only on its inputs: identical snapshots render to
//! byte-identical reports.

use serde_json::Value;
use std::fmt::Write as _;

use super::artifact::PrMetadata;
use super::impact::ImpactedModules;
use crate::bridge::ToolDocument;
use crate::bridge::protocol::{array_field, str_field};
use crate::overview::{StatusOverview, join_or_none, risk_line, scalar_text, strings};

/// Everything gathered from Brain MCP for one review.
#[derive(Debug, Clone, Default)]
pub struct ReviewSnapshot {
    pub overview: Option<ToolDocument>,
    pub impact: Option<ImpactedModules>,
    pub hotspots: Option<ToolDocument>,
    pub bundles: Option<ToolDocument>,
}

impl ReviewSnapshot {
    pub fn status_overview(&self) -> Option<StatusOverview<'_>> {
        self.overview.as_ref().map(StatusOverview::new)
    }
}

pub fn render_report(pr: &PrMetadata, snapshot: &ReviewSnapshot, max_risks: usize) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Brain MCP snapshot for PR #{}\n", pr.pr_number);
    if !pr.head_sha.is_empty() || !pr.base_sha.is_empty() {
        let _ = writeln!(md, "- Head: `{}`, base: `{}`", pr.head_sha, pr.base_sha);
    }
    let _ = writeln!(md, "- Changed files: {}\n", pr.changed_files.len());

    render_status(&mut md, snapshot, max_risks);
    render_impact(&mut md, snapshot.impact.as_ref());
    render_hotspots(&mut md, snapshot.hotspots.as_ref());
    render_bundles(&mut md, snapshot.bundles.as_ref());

    md.push_str("## Notes\n\n");
    md.push_str("- This snapshot is generated automatically by the Brain MCP bridge.\n");
    md.push_str(
        "- If it is missing or incomplete, the reviewer should state this limitation explicitly.\n",
    );
    md
}

/// Report written when no session could be established.
pub fn render_unavailable_stub(reason: &str) -> String {
    format!(
        "# Brain MCP Context Unavailable\n\n\
         Brain MCP could not be queried for this PR.\n\
         Reason: {}\n\n\
         Please rely on standard review practices.\n",
        reason
    )
}

fn render_status(md: &mut String, snapshot: &ReviewSnapshot, max_risks: usize) {
    md.push_str("## Codebase status\n\n");
    let Some(overview) = snapshot.status_overview() else {
        md.push_str(
            "Brain MCP is unavailable: the status overview could not be retrieved.\n\n",
        );
        return;
    };

    let _ = writeln!(
        md,
        "**Overall codebase status**: {}\n",
        overview.overall_status()
    );

    if let Some(state) = overview.quality_gate_state() {
        let _ = write!(md, "- Quality gate: {}", state);
        let failed_jobs = overview.quality_gate_failed_jobs();
        if !failed_jobs.is_empty() {
            let _ = write!(md, " (failed jobs: {})", failed_jobs.join(", "));
        }
        md.push('\n');
    }
    let _ = writeln!(
        md,
        "- Failing slices: {}",
        join_or_none(&overview.failing_slices())
    );

    let risks = overview.top_risks();
    if risks.is_empty() {
        md.push_str("- Top risks: None\n");
    } else {
        md.push_str("- Top risks:\n");
        for risk in risks.iter().take(max_risks) {
            let _ = writeln!(md, "  - {}", risk_line(risk));
        }
    }
    md.push('\n');
}

fn render_impact(md: &mut String, impact: Option<&ImpactedModules>) {
    md.push_str("## Impacted modules\n\n");
    match impact {
        None => md.push_str("Change impact data is unavailable.\n"),
        Some(impact) if impact.modules.is_empty() => {
            md.push_str("No impacted modules identified.\n")
        }
        Some(impact) => {
            for module in &impact.modules {
                let _ = writeln!(md, "- `{}`", module);
            }
            if impact.is_truncated() {
                let _ = writeln!(
                    md,
                    "\n_Showing {} of {} impacted modules._",
                    impact.modules.len(),
                    impact.total
                );
            }
        }
    }
    md.push('\n');
}

fn render_hotspots(md: &mut String, hotspots: Option<&ToolDocument>) {
    md.push_str("## Hotspots\n\n");
    match hotspots {
        None => md.push_str("Hotspot data is unavailable.\n"),
        Some(doc) => render_listing(md, doc, &["hotspots"], hotspot_line, "No hotspots reported."),
    }
    md.push('\n');
}

fn render_bundles(md: &mut String, bundles: Option<&ToolDocument>) {
    md.push_str("## Suggested bundles\n\n");
    match bundles {
        None => md.push_str("Bundle suggestions are unavailable.\n"),
        Some(doc) => render_listing(
            md,
            doc,
            &["bundles", "suggestions"],
            bundle_line,
            "No bundles suggested.",
        ),
    }
    md.push('\n');
}

/// Render the first list found under `keys`, or the raw text placeholder.
fn render_listing(
    md: &mut String,
    doc: &ToolDocument,
    keys: &[&str],
    line: fn(&Value) -> String,
    empty: &str,
) {
    if let Some(text) = doc.raw_text() {
        let _ = writeln!(md, "> {}", text.trim());
        return;
    }

    let items = keys
        .iter()
        .map(|key| doc.array(key))
        .find(|items| !items.is_empty())
        .unwrap_or(&[]);

    if items.is_empty() {
        let _ = writeln!(md, "{}", empty);
        return;
    }
    for item in items {
        let _ = writeln!(md, "- {}", line(item));
    }
}

fn hotspot_line(item: &Value) -> String {
    if let Some(name) = item.as_str() {
        return format!("`{}`", name);
    }
    let name = ["module_id", "id", "path", "name"]
        .iter()
        .find_map(|key| str_field(item, key))
        .unwrap_or("unknown");
    let mut line = format!("`{}`", name);
    if let Some(score) = item.get("score").filter(|v| !v.is_null()) {
        let _ = write!(line, " (score: {})", scalar_text(score));
    }
    if let Some(reason) = str_field(item, "reason").filter(|r| !r.is_empty()) {
        let _ = write!(line, ": {}", reason);
    }
    line
}

fn bundle_line(item: &Value) -> String {
    if let Some(name) = item.as_str() {
        return name.to_string();
    }
    let name = ["name", "id", "title"]
        .iter()
        .find_map(|key| str_field(item, key))
        .unwrap_or("bundle");
    let mut line = format!("**{}**", name);

    let members = ["modules", "paths", "files"]
        .iter()
        .map(|key| strings(array_field(item, key)))
        .find(|members| !members.is_empty())
        .unwrap_or_default();
    if !members.is_empty() {
        let _ = write!(line, ": {}", members.join(", "));
    }
    if let Some(rationale) = ["rationale", "reason"]
        .iter()
        .find_map(|key| str_field(item, key))
        .filter(|r| !r.is_empty())
    {
        let _ = write!(line, " ({})", rationale);
    }
    line
}
