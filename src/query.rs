//! Direct Brain queries outside of a review.
//!
//! Both queries share one degradation ladder: disabled, then connect failure,
//! then missing data. Each rung answers `unavailable` with its own headline.
//! A panic while talking to the server is contained the same way.

mod format;

pub use format::{build_headline, format_next_actions, format_status_overview};

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::bridge::{BridgeSession, Connector, ProcessConnector, ToolDocument};
use crate::config::BridgeConfig;
use crate::overview::StatusOverview;

pub const NOT_ENABLED_HEADLINE: &str = "Brain MCP is not enabled";
pub const INIT_FAILED_HEADLINE: &str = "Brain MCP client failed to initialize";
pub const NO_DATA_HEADLINE: &str = "Brain MCP returned no data";
/// Prefix of the headline when a query task itself fails.
pub const QUERY_FAILED_HEADLINE: &str = "Brain query failed";

/// Default number of actions requested by `query_next_actions`.
pub const DEFAULT_MAX_ACTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Ok,
    Unavailable,
}

/// Answer to "what is the state of the codebase?".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusAnswer {
    pub status: QueryStatus,
    pub headline: String,
    pub summary_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub by_slice: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_risks: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_drift: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_gate: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_actions: Vec<Value>,
}

impl StatusAnswer {
    fn unavailable(headline: &str, summary_text: impl Into<String>) -> Self {
        Self {
            status: QueryStatus::Unavailable,
            headline: headline.to_string(),
            summary_text: summary_text.into(),
            by_slice: Vec::new(),
            top_risks: Vec::new(),
            ci_drift: None,
            quality_gate: None,
            top_actions: Vec::new(),
        }
    }

    fn from_overview(doc: &ToolDocument) -> Self {
        let overview = StatusOverview::new(doc);
        Self {
            status: QueryStatus::Ok,
            headline: build_headline(&overview),
            summary_text: format_status_overview(&overview),
            by_slice: overview.slices().to_vec(),
            top_risks: overview.top_risks().to_vec(),
            ci_drift: overview.ci_drift().cloned(),
            quality_gate: overview.quality_gate().cloned(),
            top_actions: overview.top_actions().to_vec(),
        }
    }
}

/// Answer to "what should be fixed next?".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextActionsAnswer {
    pub status: QueryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    pub summary_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasoning: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_filter: Option<String>,
}

impl NextActionsAnswer {
    fn unavailable(headline: &str, summary_text: impl Into<String>) -> Self {
        Self {
            status: QueryStatus::Unavailable,
            headline: Some(headline.to_string()),
            summary_text: summary_text.into(),
            actions: Vec::new(),
            reasoning: Vec::new(),
            slice_filter: None,
        }
    }

    fn from_document(doc: &ToolDocument) -> Self {
        Self {
            status: QueryStatus::Ok,
            headline: None,
            summary_text: format_next_actions(doc),
            actions: doc.array("actions").to_vec(),
            reasoning: doc.array("reasoning").to_vec(),
            slice_filter: doc.str_field("slice_filter").map(str::to_string),
        }
    }
}

pub async fn query_status(config: &BridgeConfig) -> StatusAnswer {
    query_status_with(config, Arc::new(ProcessConnector::from_config(config))).await
}

pub async fn query_status_with<K: Connector>(
    config: &BridgeConfig,
    connector: Arc<K>,
) -> StatusAnswer {
    if !config.enable {
        return StatusAnswer::unavailable(
            NOT_ENABLED_HEADLINE,
            "Brain MCP integration is disabled. Enable it with `brain.enable = true`.",
        );
    }

    match tokio::spawn(fetch_status(config.clone(), connector)).await {
        Ok(answer) => answer,
        Err(join_error) => {
            log::error!(
                target: "brain_bridge::query",
                "Status query failed: {}",
                join_error
            );
            StatusAnswer::unavailable(
                &format!("{}: {}", QUERY_FAILED_HEADLINE, join_error),
                format!("Error: {}", join_error),
            )
        }
    }
}

async fn fetch_status<K: Connector>(config: BridgeConfig, connector: Arc<K>) -> StatusAnswer {
    let session = match BridgeSession::open(connector, &config).await {
        Ok(session) => session,
        Err(e) => {
            log::warn!(
                target: "brain_bridge::query",
                "Status query could not connect: {}",
                e
            );
            return StatusAnswer::unavailable(
                INIT_FAILED_HEADLINE,
                format!("Could not connect to Brain MCP: {}", e),
            );
        }
    };

    let overview = session.client().get_status_overview(config.max_risks).await;
    session.close().await;

    match overview {
        Some(doc) => StatusAnswer::from_overview(&doc),
        None => StatusAnswer::unavailable(NO_DATA_HEADLINE, "Brain query failed."),
    }
}

pub async fn query_next_actions(
    config: &BridgeConfig,
    slice_filter: Option<&str>,
    max_actions: usize,
) -> NextActionsAnswer {
    let connector = Arc::new(ProcessConnector::from_config(config));
    query_next_actions_with(config, connector, slice_filter, max_actions).await
}

pub async fn query_next_actions_with<K: Connector>(
    config: &BridgeConfig,
    connector: Arc<K>,
    slice_filter: Option<&str>,
    max_actions: usize,
) -> NextActionsAnswer {
    if !config.enable {
        return NextActionsAnswer::unavailable(NOT_ENABLED_HEADLINE, "Brain MCP is not enabled.");
    }

    let task = tokio::spawn(fetch_next_actions(
        config.clone(),
        connector,
        slice_filter.map(str::to_string),
        max_actions,
    ));
    match task.await {
        Ok(answer) => answer,
        Err(join_error) => {
            log::error!(
                target: "brain_bridge::query",
                "Next-actions query failed: {}",
                join_error
            );
            NextActionsAnswer::unavailable(
                &format!("{}: {}", QUERY_FAILED_HEADLINE, join_error),
                format!("Error: {}", join_error),
            )
        }
    }
}

async fn fetch_next_actions<K: Connector>(
    config: BridgeConfig,
    connector: Arc<K>,
    slice_filter: Option<String>,
    max_actions: usize,
) -> NextActionsAnswer {
    let session = match BridgeSession::open(connector, &config).await {
        Ok(session) => session,
        Err(e) => {
            log::warn!(
                target: "brain_bridge::query",
                "Next-actions query could not connect: {}",
                e
            );
            return NextActionsAnswer::unavailable(
                INIT_FAILED_HEADLINE,
                format!("Could not connect to Brain MCP: {}", e),
            );
        }
    };

    let next_actions = session
        .client()
        .get_next_actions(slice_filter.as_deref(), max_actions)
        .await;
    session.close().await;

    match next_actions {
        Some(doc) => NextActionsAnswer::from_document(&doc),
        None => NextActionsAnswer::unavailable(NO_DATA_HEADLINE, "Brain query failed."),
    }
}
