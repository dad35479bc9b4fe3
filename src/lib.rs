//! # markup-props
//!
//! Turns a pasted markup snippet into property assignments on a live
//! design-system component.
//!
//! ## Pipeline
//! - Locate the requested tag and parse its attributes into typed values
//! - For containers, scan the nested heading, text and action elements
//! - Resolve semantic keys to the target's (decorated) property names
//! - Normalize values into the display values the target expects
//! - Apply through an ordered fallback chain when the target rejects a
//!   combination, then write text and image content
//!
//! ## Example
//! ```ignore
//! use markup_props::{ComponentKind, Engine};
//!
//! let engine = Engine::default();
//! let request = engine
//!     .request(r#"<Action size="lg" intent="primary">Go</Action>"#, ComponentKind::Action)
//!     .expect("no Action tag");
//!
//! // `button` implements `TargetNode`
//! let report = engine.apply(&request, &mut button)?;
//! assert_eq!(report.root.result.strategy_index_used, Some(1));
//! ```

pub mod attributes;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod kind;
pub mod locator;
pub mod normalizer;
pub mod parser;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod strategy;
pub mod text_target;
pub mod value;

// --- Core types ---
pub use descriptor::{Attributes, ComponentDescriptor, InstantiationRequest};
pub use engine::{Completion, CompletionSink, Engine, EngineOptions, Outcome, Plan, PlannedText};
pub use error::{BridgeError, BridgeResult, Diagnostic, ParseMiss};
pub use kind::{ComponentKind, NestedKind};
pub use report::{ApplicationReport, ApplicationResult, NodeReport};
pub use value::{AttributeValue, PropertyValue};

// --- Target side ---
pub use schema::{
    CollaboratorError, PropertyKind, PropertyMap, PropertySchema, Rejection, SchemaSnapshot,
    TargetNode, TextLeaf,
};

// --- Configuration ---
pub use config::{MappingConfig, PropertyMappingTable, StrategyTables, ValueMappingTable};

/// Parse the first `kind` element with default settings.
pub fn parse_component(source: &str, kind: ComponentKind) -> Result<ComponentDescriptor, ParseMiss> {
    parser::parse_component(source, kind)
}

/// Parse `source` into an instantiation request with the builtin tables.
pub fn build_request(source: &str, kind: ComponentKind) -> Result<InstantiationRequest, ParseMiss> {
    Engine::default().request(source, kind)
}
