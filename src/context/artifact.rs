use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pull request facts supplied by the review tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrMetadata {
    pub pr_number: u64,
    pub head_sha: String,
    pub base_sha: String,
    /// Paths relative to the repository root
    pub changed_files: Vec<String>,
}

/// How much Brain data made it into a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStatus {
    /// The status overview call returned data; other sections may still be missing
    Ok,
    /// Connected, but the status overview was missing
    Partial,
    /// Disabled, or the server could not be reached
    Unavailable,
}

/// Outcome of preparing Brain context for one review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextArtifact {
    pub status: ContextStatus,
    pub report_text: String,
    pub instructions_text: String,
    /// Where the report was written; `None` when no report was produced
    pub report_file_path: Option<PathBuf>,
}

impl ContextArtifact {
    pub fn disabled() -> Self {
        Self {
            status: ContextStatus::Unavailable,
            report_text: String::new(),
            instructions_text: String::new(),
            report_file_path: None,
        }
    }
}
