//! Impacted-module extraction from `get_change_impact` documents.
//!
//! Two payload shapes are in circulation:
//! - `resolved_modules`: list of objects carrying `module_id` (or `id`),
//!   sometimes plain strings
//! - `impacted_modules`: list of plain module id strings, sometimes objects
//!
//! `resolved_modules` wins when both are present and it is a list.

use serde_json::Value;

use crate::bridge::ToolDocument;
use crate::bridge::protocol::str_field;

/// Which payload shape the module list was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactShape {
    Resolved,
    Flat,
    /// Neither key held a list
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactedModules {
    pub shape: ImpactShape,
    /// Module ids in server order, truncated
    pub modules: Vec<String>,
    /// Number of usable ids before truncation
    pub total: usize,
}

impl ImpactedModules {
    pub fn from_document(doc: &ToolDocument, max_modules: usize) -> Self {
        let (shape, entries) = match (
            doc.get("resolved_modules").and_then(Value::as_array),
            doc.get("impacted_modules").and_then(Value::as_array),
        ) {
            (Some(resolved), _) => (ImpactShape::Resolved, resolved.as_slice()),
            (None, Some(flat)) => (ImpactShape::Flat, flat.as_slice()),
            (None, None) => (ImpactShape::Unrecognized, &[][..]),
        };

        let ids: Vec<String> = entries.iter().filter_map(module_id).collect();
        let total = ids.len();

        log::debug!(
            target: "brain_bridge::context",
            "Change impact shape {:?} with {} module(s)",
            shape,
            total
        );

        Self {
            shape,
            modules: ids.into_iter().take(max_modules).collect(),
            total,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.total > self.modules.len()
    }
}

fn module_id(entry: &Value) -> Option<String> {
    let id = match entry {
        Value::String(s) => Some(s.as_str()),
        Value::Object(_) => str_field(entry, "module_id").or_else(|| str_field(entry, "id")),
        _ => None,
    };
    id.filter(|id| !id.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::resolved_objects(
        json!({"resolved_modules": [{"module_id": "crate::mod1"}, {"module_id": "crate::mod2"}]}),
        ImpactShape::Resolved,
        vec!["crate::mod1", "crate::mod2"]
    )]
    #[case::resolved_with_id_key_and_strings(
        json!({"resolved_modules": [{"id": "crate::a"}, "crate::b"]}),
        ImpactShape::Resolved,
        vec!["crate::a", "crate::b"]
    )]
    #[case::flat_strings(
        json!({"impacted_modules": ["crate::mod1", "crate::mod2", "crate::mod3"]}),
        ImpactShape::Flat,
        vec!["crate::mod1", "crate::mod2", "crate::mod3"]
    )]
    #[case::flat_objects(
        json!({"impacted_modules": [{"module_id": "crate::x"}, {"name": "ignored"}, 7]}),
        ImpactShape::Flat,
        vec!["crate::x"]
    )]
    #[case::resolved_preferred(
        json!({"resolved_modules": ["crate::r"], "impacted_modules": ["crate::f"]}),
        ImpactShape::Resolved,
        vec!["crate::r"]
    )]
    #[case::resolved_not_a_list(
        json!({"resolved_modules": "oops", "impacted_modules": ["crate::f"]}),
        ImpactShape::Flat,
        vec!["crate::f"]
    )]
    #[case::unrecognized(json!({"raw_text": "no impact"}), ImpactShape::Unrecognized, vec![])]
    fn detects_shape(
        #[case] payload: Value,
        #[case] shape: ImpactShape,
        #[case] expected: Vec<&str>,
    ) {
        let impact = ImpactedModules::from_document(&ToolDocument::new(payload), 10);

        assert_eq!(impact.shape, shape);
        assert_eq!(impact.modules, expected);
        assert!(!impact.is_truncated());
    }

    #[test]
    fn truncates_to_max_modules() {
        let doc = ToolDocument::new(json!({"impacted_modules": ["a", "b", "c"]}));

        let impact = ImpactedModules::from_document(&doc, 2);

        assert_eq!(impact.modules, vec!["a", "b"]);
        assert_eq!(impact.total, 3);
        assert!(impact.is_truncated());
    }
}
