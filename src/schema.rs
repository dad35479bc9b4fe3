//! The target side of the pipeline: what a live component exposes, and the
//! collaborator trait through which it is mutated.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::error::{BridgeError, BridgeResult};
use crate::kind::NestedKind;
use crate::value::PropertyValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// One of a fixed set of display values.
    Variant,
    /// Free text, set verbatim.
    Text,
    Boolean,
}

/// Raw (possibly decorated) target property name → kind.
pub type PropertySchema = IndexMap<String, PropertyKind>;

/// Raw target property name → value, as handed to the target in one call.
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// A text-bearing leaf inside a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLeaf {
    pub name: String,
    /// Name of the dynamic variable the leaf's characters are bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_variable: Option<String>,
}

impl TextLeaf {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound_variable: None,
        }
    }

    pub fn bound_to(mut self, variable: impl Into<String>) -> Self {
        self.bound_variable = Some(variable.into());
        self
    }
}

/// The target refused a property map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct Rejection {
    pub reason: String,
}

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Any other failed call into the target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct CollaboratorError {
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A live, mutable component instance.
///
/// Calls are blocking. The schema is read once per application and never
/// cached by the engine.
pub trait TargetNode {
    fn available_properties(&self) -> Result<PropertySchema, CollaboratorError>;

    /// Set all properties in one call. The target may reject the combination.
    fn apply_properties(&mut self, properties: &PropertyMap) -> Result<(), Rejection>;

    fn text_leaves(&self) -> Vec<TextLeaf>;

    fn write_text(&mut self, leaf: &TextLeaf, value: &str) -> Result<(), CollaboratorError>;

    fn apply_image(&mut self, url: &str) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::new(format!(
            "target does not accept image fills ({})",
            url
        )))
    }

    /// The `index`-th nested target of `kind`, for container targets.
    fn nested_target(&mut self, _kind: NestedKind, _index: usize) -> Option<&mut Self>
    where
        Self: Sized,
    {
        None
    }
}

/// A recorded target schema, used for offline planning.
///
/// ```yaml
/// properties:
///   "✏️ initials#12:0": text
///   size: variant
/// text_leaves:
///   - name: label
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub properties: PropertySchema,
    #[serde(default)]
    pub text_leaves: Vec<TextLeaf>,
}

impl SchemaSnapshot {
    pub fn from_yaml_str(yaml: &str) -> BridgeResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| BridgeError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_from_yaml_keeps_order() {
        let snapshot = SchemaSnapshot::from_yaml_str(
            "properties:\n  \"✏️ initials#12:0\": text\n  size: variant\n  loading: boolean\ntext_leaves:\n  - name: label\n    bound_variable: children\n",
        )
        .unwrap();
        assert_eq!(snapshot.property_names(), vec!["✏️ initials#12:0", "size", "loading"]);
        assert_eq!(snapshot.properties["loading"], PropertyKind::Boolean);
        assert_eq!(
            snapshot.text_leaves,
            vec![TextLeaf::new("label").bound_to("children")]
        );
    }

    #[test]
    fn unknown_kind_is_config_error() {
        let err = SchemaSnapshot::from_yaml_str("properties:\n  size: dropdown\n").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
