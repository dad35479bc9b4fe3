use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kind::ComponentKind;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Hard failures. Everything recoverable is a [`Diagnostic`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Unknown component kind '{kind}'. Expected one of: {expected}")]
    UnknownKind { kind: String, expected: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to read target schema: {0}")]
    Schema(String),
}

impl From<serde_yaml::Error> for BridgeError {
    fn from(err: serde_yaml::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}

/// The requested tag does not occur in the pasted source.
///
/// Not an error in the pipeline sense: it is the expected answer for input
/// that does not contain the selected component, and carries an example of
/// the syntax the user should paste instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error(
    "No {tag} component found in the pasted code.\n\nMake sure your code includes something like:\n{example}"
)]
pub struct ParseMiss {
    pub kind: ComponentKind,
    pub tag: String,
    pub example: String,
}

impl ParseMiss {
    pub fn for_kind(kind: ComponentKind) -> Self {
        ParseMiss {
            kind,
            tag: kind.tag_name(),
            example: kind.example().to_string(),
        }
    }
}

/// Recoverable findings collected while mapping a descriptor onto a target.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Diagnostic {
    #[error("No mapping found for prop key '{key}'")]
    UnmappedKey { key: String },

    #[error("Property '{canonical}' (from '{key}') not found in available properties")]
    UnresolvedName { key: String, canonical: String },

    #[error("Some properties could not be set ({}): {reason}", keys.join(", "))]
    RejectedCombination { keys: Vec<String>, reason: String },

    #[error("No text leaf found for '{property}'")]
    MissingTextLeaf { property: String },

    #[error("{operation} failed: {reason}")]
    CollaboratorFailure { operation: String, reason: String },
}

impl Diagnostic {
    /// Short machine-friendly label, used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Diagnostic::UnmappedKey { .. } => "unmapped-key",
            Diagnostic::UnresolvedName { .. } => "unresolved-name",
            Diagnostic::RejectedCombination { .. } => "rejected-combination",
            Diagnostic::MissingTextLeaf { .. } => "missing-text-leaf",
            Diagnostic::CollaboratorFailure { .. } => "collaborator-failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_miss_message_names_the_tag_and_example() {
        let miss = ParseMiss::for_kind(ComponentKind::Action);
        let message = miss.to_string();
        assert!(message.starts_with("No Action component found"));
        assert!(message.contains("<Action size=\"lg\""));
    }

    #[test]
    fn rejected_combination_lists_keys() {
        let diag = Diagnostic::RejectedCombination {
            keys: vec!["size".to_string(), "variant".to_string()],
            reason: "no such variant".to_string(),
        };
        assert_eq!(
            diag.to_string(),
            "Some properties could not be set (size, variant): no such variant"
        );
        assert_eq!(diag.label(), "rejected-combination");
    }
}
