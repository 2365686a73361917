//! Typed wrappers over the Brain MCP tools.
//!
//! Every method issues exactly one `tools/call` through the blocking-call
//! adapter and yields `None` when the call fails for any reason. Optional
//! arguments are left out of the payload when unset.

use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;

use super::adapter::BlockingCallAdapter;
use super::connector::ToolCaller;
use super::protocol::ToolDocument;
use crate::config::BridgeConfig;

pub const DEFAULT_DEPENDENCY_DEPTH: u32 = 2;
pub const DEFAULT_DEPENDENTS_DEPTH: u32 = 2;

/// Arguments of `get_change_impact`.
///
/// The server accepts either module ids or file paths; both may be set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeImpactQuery {
    pub slice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    pub dependency_depth: u32,
    pub dependents_depth: u32,
}

impl ChangeImpactQuery {
    pub fn for_paths(paths: Vec<String>) -> Self {
        Self {
            paths: Some(paths),
            ..Self::empty()
        }
    }

    pub fn for_modules(module_ids: Vec<String>) -> Self {
        Self {
            module_ids: Some(module_ids),
            ..Self::empty()
        }
    }

    pub fn in_slice(mut self, slice: impl Into<String>) -> Self {
        self.slice = slice.into();
        self
    }

    pub fn with_depths(mut self, dependency_depth: u32, dependents_depth: u32) -> Self {
        self.dependency_depth = dependency_depth;
        self.dependents_depth = dependents_depth;
        self
    }

    fn empty() -> Self {
        Self {
            slice: String::new(),
            module_ids: None,
            paths: None,
            dependency_depth: DEFAULT_DEPENDENCY_DEPTH,
            dependents_depth: DEFAULT_DEPENDENTS_DEPTH,
        }
    }
}

/// Arguments of `get_hotspots`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HotspotsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Arguments of `get_bundle_suggestions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BundleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bundles: Option<usize>,
}

#[derive(Serialize)]
struct ModuleArgs<'a> {
    slice: &'a str,
    module_id: &'a str,
}

#[derive(Serialize)]
struct NextActionsArgs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    slice_filter: Option<&'a str>,
    max_actions: usize,
}

/// Brain MCP tool façade bound to one connection.
pub struct BrainClient<C> {
    adapter: BlockingCallAdapter<C>,
    timeout: Duration,
    default_slice: String,
}

impl<C> std::fmt::Debug for BrainClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrainClient")
            .field("timeout", &self.timeout)
            .field("default_slice", &self.default_slice)
            .finish_non_exhaustive()
    }
}

impl<C: ToolCaller> BrainClient<C> {
    pub fn new(adapter: BlockingCallAdapter<C>, config: &BridgeConfig) -> Self {
        Self {
            adapter,
            timeout: config.call_timeout(),
            default_slice: config.default_slice.clone(),
        }
    }

    pub(crate) fn adapter(&self) -> &BlockingCallAdapter<C> {
        &self.adapter
    }

    pub fn default_slice(&self) -> &str {
        &self.default_slice
    }

    pub async fn get_change_impact(&self, mut query: ChangeImpactQuery) -> Option<ToolDocument> {
        query.slice = self.slice_or_default(Some(&query.slice));
        self.call_with("get_change_impact", &query).await
    }

    pub async fn get_ci_run_summary(&self) -> Option<ToolDocument> {
        self.call("get_ci_run_summary", json!({})).await
    }

    pub async fn get_brain_validation_status(&self) -> Option<ToolDocument> {
        self.call("get_brain_validation_status", json!({})).await
    }

    pub async fn get_module_contract(
        &self,
        module_id: &str,
        slice: Option<&str>,
    ) -> Option<ToolDocument> {
        self.call_for_module("get_module_contract", module_id, slice)
            .await
    }

    pub async fn get_module_risks(
        &self,
        module_id: &str,
        slice: Option<&str>,
    ) -> Option<ToolDocument> {
        self.call_for_module("get_module_risks", module_id, slice)
            .await
    }

    pub async fn get_hotspots(&self, mut query: HotspotsQuery) -> Option<ToolDocument> {
        query.slice = query.slice.map(|s| self.slice_or_default(Some(&s)));
        self.call_with("get_hotspots", &query).await
    }

    pub async fn get_bundle_suggestions(&self, mut query: BundleQuery) -> Option<ToolDocument> {
        query.slice = query.slice.map(|s| self.slice_or_default(Some(&s)));
        self.call_with("get_bundle_suggestions", &query).await
    }

    pub async fn get_status_overview(&self, top_n_risks: usize) -> Option<ToolDocument> {
        self.call("get_status_overview", json!({ "top_n_risks": top_n_risks }))
            .await
    }

    pub async fn get_next_actions(
        &self,
        slice_filter: Option<&str>,
        max_actions: usize,
    ) -> Option<ToolDocument> {
        let args = NextActionsArgs {
            slice_filter: slice_filter.filter(|s| !s.is_empty()),
            max_actions,
        };
        self.call_with("get_next_actions", &args).await
    }

    async fn call_for_module(
        &self,
        tool: &str,
        module_id: &str,
        slice: Option<&str>,
    ) -> Option<ToolDocument> {
        if module_id.is_empty() {
            log::debug!(
                target: "brain_bridge::adapter",
                "Skipping {} for empty module id",
                tool
            );
            return None;
        }
        let slice = self.slice_or_default(slice);
        let args = ModuleArgs {
            slice: &slice,
            module_id,
        };
        self.call_with(tool, &args).await
    }

    async fn call_with<A: Serialize>(&self, tool: &str, args: &A) -> Option<ToolDocument> {
        match serde_json::to_value(args) {
            Ok(arguments) => self.call(tool, arguments).await,
            Err(e) => {
                log::warn!(
                    target: "brain_bridge::adapter",
                    "Failed to encode arguments for {}: {}",
                    tool,
                    e
                );
                None
            }
        }
    }

    async fn call(&self, tool: &str, arguments: Value) -> Option<ToolDocument> {
        self.adapter.call_safe(tool, arguments, self.timeout).await
    }

    fn slice_or_default(&self, slice: Option<&str>) -> String {
        match slice {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => self.default_slice.clone(),
        }
    }
}
