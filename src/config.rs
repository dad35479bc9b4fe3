//! Mapping configuration: the tables that translate semantic attributes into
//! the target design system's property names and display values.
//!
//! Every section is optional in YAML; an absent section keeps the builtin
//! table, a present one replaces it wholesale.
//!
//! ```yaml
//! properties:
//!   size: size
//!   radius: borderRadius
//! values:
//!   borderRadius:
//!     xl: "xl (12px)"
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{BridgeError, BridgeResult};
use crate::kind::ComponentKind;

/// Semantic attribute key → canonical target property name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMappingTable(BTreeMap<String, String>);

impl PropertyMappingTable {
    pub fn builtin() -> Self {
        const ENTRIES: &[(&str, &str)] = &[
            // avatar-like
            ("size", "size"),
            ("type", "type"),
            ("shape", "shape"),
            ("outline", "outline"),
            ("lowerBadge", "lower badge"),
            ("upperBadge", "upper badge"),
            ("initials", "initials"),
            // action
            ("variant", "variant"),
            ("intent", "intent"),
            ("state", "state"),
            ("loading", "loading"),
            ("disabled", "disabled"),
            ("With left icon", "With left icon"),
            ("With right icon", "With right icon"),
            // container
            ("padding", "padding"),
            ("borderRadius", "borderRadius"),
            ("borderColor", "borderColor"),
            ("Elevation", "Elevation"),
            ("elevation", "Elevation"),
            // text-bearing
            ("label", "label"),
            ("title", "title"),
            // legacy names still found in older snippets
            ("✏️ label", "label"),
            ("icon L", "icon L"),
            ("icon R", "icon R"),
        ];
        ENTRIES.iter().copied().collect()
    }

    pub fn canonical(&self, semantic: &str) -> Option<&str> {
        self.0.get(semantic).map(String::as_str)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PropertyMappingTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Canonical property → raw value → display value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueMappingTable(BTreeMap<String, BTreeMap<String, String>>);

impl ValueMappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (raw, display) in [
            ("0", "0 (0px)"),
            ("1", "1 (4px)"),
            ("2", "2 (8px)"),
            ("3", "3 (12px)"),
            ("4", "4 (16px)"),
            ("5", "5 (20px)"),
            ("6", "6 (24px)"),
            ("7", "7 (28px)"),
            ("8", "8 (32px)"),
        ] {
            table.insert("padding", raw, display);
        }
        for (raw, display) in [
            ("none", "None"),
            ("sm", "sm (4px)"),
            ("md", "md (8px)"),
            ("lg", "lg (12px)"),
            ("xl", "xl (12px)"),
            ("2xl", "2xl (16px)"),
            ("3xl", "3xl (24px)"),
            ("full", "Full"),
        ] {
            table.insert("borderRadius", raw, display);
        }
        for (raw, display) in [
            ("standard", "standard"),
            ("border", "standard"),
            ("error", "error"),
            ("success", "success"),
        ] {
            table.insert("borderColor", raw, display);
        }
        for (raw, display) in [
            ("none", "None"),
            ("on-top-of-bg", "On top of BG"),
            ("On top of BG", "On top of BG"),
        ] {
            table.insert("Elevation", raw, display);
        }
        table.insert("variant", "outline", "outlined");
        table
    }

    pub fn insert(
        &mut self,
        canonical: impl Into<String>,
        raw: impl Into<String>,
        display: impl Into<String>,
    ) {
        self.0
            .entry(canonical.into())
            .or_default()
            .insert(raw.into(), display.into());
    }

    pub fn display(&self, canonical: &str, raw: &str) -> Option<&str> {
        self.0
            .get(canonical)
            .and_then(|values| values.get(raw))
            .map(String::as_str)
    }

    pub fn has_property(&self, canonical: &str) -> bool {
        self.0.contains_key(canonical)
    }
}

/// A variant/intent pairing the target is known not to support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedPairing {
    pub variant: String,
    pub intent: String,
    pub replacement_intent: String,
}

/// Inputs of the fallback strategy chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyTables {
    /// Kinds that get the whole chain. Every other kind gets one attempt.
    pub fallback_kinds: Vec<ComponentKind>,
    pub variant_key: String,
    pub intent_key: String,
    pub unsupported_pairings: Vec<UnsupportedPairing>,
    /// Optional keys, lowest priority first. The first one present is dropped.
    pub optional_keys: Vec<String>,
    pub variant_substitutions: BTreeMap<String, String>,
    pub forced_variant: String,
    pub safe_defaults: IndexMap<String, String>,
}

impl Default for StrategyTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StrategyTables {
    pub fn builtin() -> Self {
        Self {
            fallback_kinds: vec![ComponentKind::Action],
            variant_key: "variant".to_string(),
            intent_key: "intent".to_string(),
            unsupported_pairings: vec![UnsupportedPairing {
                variant: "outlined".to_string(),
                intent: "secondary".to_string(),
                replacement_intent: "primary".to_string(),
            }],
            optional_keys: vec!["size".to_string()],
            variant_substitutions: [("text", "outlined")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            forced_variant: "filled".to_string(),
            safe_defaults: [
                ("variant", "filled"),
                ("intent", "primary"),
                ("size", "lg"),
                ("state", "default"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }
}

/// Semantic defaults merged into a kind's attributes when absent.
pub type KindDefaults = BTreeMap<ComponentKind, IndexMap<String, String>>;

fn builtin_defaults() -> KindDefaults {
    let action = [
        ("size", "lg"),
        ("variant", "filled"),
        ("intent", "primary"),
        ("state", "default"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    BTreeMap::from([(ComponentKind::Action, action)])
}

fn builtin_role_hints() -> BTreeMap<String, Vec<String>> {
    [
        ("children", &["label", "text", "button", "title", "heading"][..]),
        ("label", &["label"][..]),
        ("title", &["title", "heading"][..]),
        ("initials", &["initials"][..]),
    ]
    .into_iter()
    .map(|(k, hints)| (k.to_string(), hints.iter().map(|h| h.to_string()).collect()))
    .collect()
}

/// All tables the engine is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default = "PropertyMappingTable::builtin")]
    pub properties: PropertyMappingTable,
    #[serde(default = "ValueMappingTable::builtin")]
    pub values: ValueMappingTable,
    /// Canonical property → substrings looked for in text leaf names.
    #[serde(default = "builtin_role_hints")]
    pub role_hints: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub strategy: StrategyTables,
    #[serde(default = "builtin_defaults")]
    pub defaults: KindDefaults,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MappingConfig {
    pub fn builtin() -> Self {
        Self {
            properties: PropertyMappingTable::builtin(),
            values: ValueMappingTable::builtin(),
            role_hints: builtin_role_hints(),
            strategy: StrategyTables::builtin(),
            defaults: builtin_defaults(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> BridgeResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::builtin());
        }
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
}
