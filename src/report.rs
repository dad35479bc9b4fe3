use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::Diagnostic;
use crate::kind::ComponentKind;

/// What happened to one target node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationResult {
    pub applied_canonical_keys: BTreeSet<String>,
    /// 1-based index of the accepted strategy; `None` when nothing was
    /// accepted or there was nothing to set.
    pub strategy_index_used: Option<usize>,
    pub rejected_keys: BTreeSet<String>,
    /// Text leaf name → written value.
    pub text_assignments: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReport {
    /// `root`, or `<kind>[<index>]` for nested targets.
    pub selector: String,
    pub result: ApplicationResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl NodeReport {
    pub const ROOT: &'static str = "root";

    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            result: ApplicationResult::default(),
            diagnostics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationReport {
    pub kind: ComponentKind,
    pub root: NodeReport,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<NodeReport>,
}

impl ApplicationReport {
    /// Every diagnostic, root first, each tagged with its node selector.
    pub fn diagnostics(&self) -> impl Iterator<Item = (&str, &Diagnostic)> {
        std::iter::once(&self.root)
            .chain(self.nested.iter())
            .flat_map(|node| {
                node.diagnostics
                    .iter()
                    .map(move |d| (node.selector.as_str(), d))
            })
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics().next().is_none()
    }

    pub fn node(&self, selector: &str) -> Option<&NodeReport> {
        std::iter::once(&self.root)
            .chain(self.nested.iter())
            .find(|node| node.selector == selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_are_tagged_with_selector() {
        let mut root = NodeReport::new(NodeReport::ROOT);
        root.diagnostics.push(Diagnostic::UnmappedKey {
            key: "onClick".to_string(),
        });
        let mut action = NodeReport::new("action[0]");
        action.diagnostics.push(Diagnostic::MissingTextLeaf {
            property: "children".to_string(),
        });
        let report = ApplicationReport {
            kind: ComponentKind::Container,
            root,
            nested: vec![action],
        };

        let selectors: Vec<_> = report.diagnostics().map(|(s, d)| (s, d.label())).collect();
        assert_eq!(
            selectors,
            vec![("root", "unmapped-key"), ("action[0]", "missing-text-leaf")]
        );
        assert!(!report.is_clean());
        assert!(report.node("action[0]").is_some());
        assert!(report.node("action[1]").is_none());
    }
}
