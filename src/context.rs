//! Review context composition.
//!
//! `prepare_context` turns a pull request into a [`ContextArtifact`]:
//! 1. Disabled configuration short-circuits to `unavailable`
//! 2. A session is opened (spawn + handshake under the call timeout)
//! 3. Status overview, change impact, hotspots and bundle suggestions are
//!    fetched one after another, each allowed to fail on its own
//! 4. The Markdown report is written to `<repo>/BRAIN_QODO_CONTEXT.md`
//!
//! No failure escapes: anything that goes wrong degrades the status instead.

mod artifact;
mod impact;
mod instructions;
mod report;

pub use artifact::{ContextArtifact, ContextStatus, PrMetadata};
pub use impact::{ImpactShape, ImpactedModules};
pub use instructions::{UNAVAILABLE_INSTRUCTIONS, render_instructions};
pub use report::{ReviewSnapshot, render_report, render_unavailable_stub};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bridge::{
    BrainClient, BridgeSession, BundleQuery, ChangeImpactQuery, Connector, HotspotsQuery,
    ProcessConnector, ToolCaller,
};
use crate::config::BridgeConfig;

/// File name of the report inside the repository root.
pub const CONTEXT_FILE_NAME: &str = "BRAIN_QODO_CONTEXT.md";

/// Depths used for change impact during a review.
const REVIEW_IMPACT_DEPTH: u32 = 1;

/// Prepare Brain context for a pull request using the configured binary.
pub async fn prepare_context(
    config: &BridgeConfig,
    pr: &PrMetadata,
    repo_path: &Path,
) -> ContextArtifact {
    let connector = Arc::new(ProcessConnector::from_config(config));
    ContextComposer::new(config.clone(), connector)
        .prepare(pr, repo_path)
        .await
}

/// Composer bound to a configuration and a way of connecting.
pub struct ContextComposer<K> {
    config: BridgeConfig,
    connector: Arc<K>,
}

impl<K: Connector> ContextComposer<K> {
    pub fn new(config: BridgeConfig, connector: Arc<K>) -> Self {
        Self { config, connector }
    }

    pub async fn prepare(&self, pr: &PrMetadata, repo_path: &Path) -> ContextArtifact {
        if !self.config.enable {
            log::debug!(
                target: "brain_bridge::context",
                "Brain MCP disabled; skipping context for PR #{}",
                pr.pr_number
            );
            return ContextArtifact::disabled();
        }

        let context_file = repo_path.join(CONTEXT_FILE_NAME);
        let task = tokio::spawn(compose(
            self.config.clone(),
            Arc::clone(&self.connector),
            pr.clone(),
            context_file.clone(),
        ));

        match task.await {
            Ok(artifact) => artifact,
            Err(join_error) => {
                log::error!(
                    target: "brain_bridge::context",
                    "Context composition for PR #{} failed: {}",
                    pr.pr_number,
                    join_error
                );
                unavailable(&context_file, &join_error.to_string()).await
            }
        }
    }
}

async fn compose<K: Connector>(
    config: BridgeConfig,
    connector: Arc<K>,
    pr: PrMetadata,
    context_file: PathBuf,
) -> ContextArtifact {
    let session = match BridgeSession::open(connector, &config).await {
        Ok(session) => session,
        Err(e) => {
            log::warn!(
                target: "brain_bridge::context",
                "Could not initialize Brain MCP client: {}",
                e
            );
            return unavailable(&context_file, &e.to_string()).await;
        }
    };

    let snapshot = collect_snapshot(session.client(), &config, &pr).await;
    session.close().await;

    let report_text = render_report(&pr, &snapshot, config.max_risks);
    write_report(&context_file, &report_text).await;

    let status = if snapshot.overview.is_some() {
        ContextStatus::Ok
    } else {
        ContextStatus::Partial
    };
    log::info!(
        target: "brain_bridge::context",
        "Prepared Brain context for PR #{} with status {:?}",
        pr.pr_number,
        status
    );

    ContextArtifact {
        status,
        instructions_text: render_instructions(&snapshot, config.max_risks),
        report_text,
        report_file_path: Some(context_file),
    }
}

/// Issue the review calls in order. Each call may independently yield nothing.
async fn collect_snapshot<C: ToolCaller>(
    client: &BrainClient<C>,
    config: &BridgeConfig,
    pr: &PrMetadata,
) -> ReviewSnapshot {
    let slice = config.default_slice.clone();

    let overview = client.get_status_overview(config.max_risks).await;

    let impact = client
        .get_change_impact(
            ChangeImpactQuery::for_paths(pr.changed_files.clone())
                .in_slice(slice.clone())
                .with_depths(REVIEW_IMPACT_DEPTH, REVIEW_IMPACT_DEPTH),
        )
        .await
        .map(|doc| ImpactedModules::from_document(&doc, config.max_modules));

    let hotspots = client
        .get_hotspots(HotspotsQuery {
            slice: Some(slice.clone()),
            limit: Some(config.max_risks),
        })
        .await;

    let bundles = client
        .get_bundle_suggestions(BundleQuery {
            slice: Some(slice),
            paths: Some(pr.changed_files.clone()),
            max_bundles: None,
        })
        .await;

    ReviewSnapshot {
        overview,
        impact,
        hotspots,
        bundles,
    }
}

/// Write the stub report and build the `unavailable` artifact.
async fn unavailable(context_file: &Path, reason: &str) -> ContextArtifact {
    let report_text = render_unavailable_stub(reason);
    write_report(context_file, &report_text).await;

    ContextArtifact {
        status: ContextStatus::Unavailable,
        report_text,
        instructions_text: UNAVAILABLE_INSTRUCTIONS.to_string(),
        report_file_path: None,
    }
}

async fn write_report(path: &Path, contents: &str) {
    if let Err(e) = tokio::fs::write(path, contents).await {
        log::error!(
            target: "brain_bridge::context",
            "Failed to write {}: {}",
            path.display(),
            e
        );
    }
}
