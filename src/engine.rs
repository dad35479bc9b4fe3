//! The full pipeline: markup → request → resolved properties → live target.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::attributes::AttributeParser;
use crate::config::MappingConfig;
use crate::descriptor::{Attributes, ComponentDescriptor, InstantiationRequest, CHILDREN_KEY};
use crate::error::{BridgeError, BridgeResult, Diagnostic, ParseMiss};
use crate::kind::{ComponentKind, NestedKind};
use crate::normalizer::ValueNormalizer;
use crate::parser::parse_component_with;
use crate::report::{ApplicationReport, NodeReport};
use crate::resolver::{match_target_name, PropertyNameResolver};
use crate::schema::{CollaboratorError, PropertyKind, PropertySchema, TargetNode, TextLeaf};
use crate::strategy::{ResolvedProperties, ResolvedProperty, Strategy, StrategySelector};
use crate::text_target::TextTargetResolver;
use crate::value::{AttributeValue, PropertyValue};

/// Attribute routed to the target's image fill instead of a property.
pub const IMAGE_URL_KEY: &str = "imageUrl";

/// Feature toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Walk the whole strategy chain instead of only the first strategy.
    pub fallback_strategies: bool,
    /// Merge the configured per-kind defaults into parsed attributes.
    pub apply_kind_defaults: bool,
    /// Translate `iconL`/`iconR` element references into boolean flags.
    pub icon_flags: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fallback_strategies: true,
            apply_kind_defaults: true,
            icon_flags: true,
        }
    }
}

/// A text value headed for one of the target's text leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedText {
    /// Raw target property name, when the text came from a text-kind property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub value: String,
}

impl PlannedText {
    fn unbound(value: String) -> Self {
        Self {
            target: None,
            value,
        }
    }
}

/// How one semantic attribute map lands on a given schema, without touching
/// any target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Variant and boolean properties, set through the strategy chain.
    pub properties: ResolvedProperties,
    /// Text property → value, written to text leaves, never through the chain.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub texts: IndexMap<String, PlannedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Signalled exactly once per [`Engine::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    /// The pipeline ran to the end. Recoverable problems are in the report.
    Completed,
    /// The requested tag was not in the source.
    Missed,
    /// A hard error, or the invocation unwound before finishing.
    Failed,
}

pub trait CompletionSink {
    fn complete(&mut self, completion: Completion);
}

impl<F: FnMut(Completion)> CompletionSink for F {
    fn complete(&mut self, completion: Completion) {
        self(completion)
    }
}

/// Sends `Failed` on drop unless [`finish`](Self::finish) was called.
struct CompletionGuard<'s, S: CompletionSink + ?Sized> {
    sink: &'s mut S,
    sent: bool,
}

impl<'s, S: CompletionSink + ?Sized> CompletionGuard<'s, S> {
    fn new(sink: &'s mut S) -> Self {
        Self { sink, sent: false }
    }

    fn finish(mut self, completion: Completion) {
        self.sent = true;
        self.sink.complete(completion);
    }
}

impl<S: CompletionSink + ?Sized> Drop for CompletionGuard<'_, S> {
    fn drop(&mut self) {
        if !self.sent {
            self.sent = true;
            tracing::warn!("invocation ended without completing");
            self.sink.complete(Completion::Failed);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied(ApplicationReport),
    Missed(ParseMiss),
}

#[derive(Debug, Clone)]
pub struct Engine {
    config: MappingConfig,
    options: EngineOptions,
    parser: AttributeParser,
    names: PropertyNameResolver,
    values: ValueNormalizer,
    strategies: StrategySelector,
    texts: TextTargetResolver,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(MappingConfig::builtin(), EngineOptions::default())
    }
}

impl Engine {
    pub fn new(config: MappingConfig, options: EngineOptions) -> Self {
        Self {
            parser: AttributeParser::new().with_icon_flags(options.icon_flags),
            names: PropertyNameResolver::new(config.properties.clone()),
            values: ValueNormalizer::new(config.values.clone()),
            strategies: StrategySelector::new(config.strategy.clone(), options.fallback_strategies),
            texts: TextTargetResolver::new(config.role_hints.clone()),
            config,
            options,
        }
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn parse(&self, source: &str, kind: ComponentKind) -> Result<ComponentDescriptor, ParseMiss> {
        if source.trim().is_empty() {
            return Err(ParseMiss::for_kind(kind));
        }
        parse_component_with(source, kind, &self.parser)
    }

    /// Parse `source` and build the request handed to the instantiation side.
    pub fn request(&self, source: &str, kind: ComponentKind) -> Result<InstantiationRequest, ParseMiss> {
        let descriptor = self.parse(source, kind)?;
        let mut semantic_props = descriptor.attributes;
        self.merge_defaults(kind, &mut semantic_props);
        Ok(InstantiationRequest {
            semantic_props,
            component_kind: kind,
            raw_source: source.to_string(),
        })
    }

    fn merge_defaults(&self, kind: ComponentKind, props: &mut Attributes) {
        if !self.options.apply_kind_defaults {
            return;
        }
        if let Some(defaults) = self.config.defaults.get(&kind) {
            for (key, value) in defaults {
                props
                    .entry(key.clone())
                    .or_insert_with(|| AttributeValue::from(value.as_str()));
            }
        }
    }

    /// Resolve and normalize `props` against `schema`.
    pub fn plan(&self, props: &Attributes, schema: &PropertySchema) -> Plan {
        let names: Vec<&str> = schema.keys().map(String::as_str).collect();
        let mut plan = Plan::default();

        for (key, value) in props {
            match key.as_str() {
                CHILDREN_KEY => {
                    plan.texts
                        .insert(key.clone(), PlannedText::unbound(value.to_string()));
                    continue;
                }
                IMAGE_URL_KEY => {
                    plan.image_url = Some(value.to_string());
                    continue;
                }
                _ => {}
            }

            match self.names.lookup(key, &names) {
                Ok(name) => {
                    if plan.properties.contains_key(&name.canonical)
                        || plan.texts.contains_key(&name.canonical)
                    {
                        tracing::debug!(key = %key, canonical = %name.canonical, "already set by a synonym");
                        continue;
                    }
                    let kind = schema
                        .get(name.target)
                        .copied()
                        .unwrap_or(PropertyKind::Variant);
                    if kind == PropertyKind::Text {
                        tracing::debug!(key = %key, target = name.target, "text property");
                        plan.texts.insert(
                            name.canonical,
                            PlannedText {
                                target: Some(name.target.to_string()),
                                value: value.to_string(),
                            },
                        );
                        continue;
                    }
                    let value = self.target_value(&name.canonical, kind, value);
                    tracing::debug!(key = %key, target = name.target, value = %value, "resolved property");
                    plan.properties.insert(
                        name.canonical.clone(),
                        ResolvedProperty {
                            canonical: name.canonical,
                            target: name.target.to_string(),
                            value,
                        },
                    );
                }
                // no such property, but a text leaf may still carry it
                Err(Diagnostic::UnresolvedName { canonical, .. })
                    if self.config.role_hints.contains_key(&canonical) =>
                {
                    plan.texts
                        .insert(canonical, PlannedText::unbound(value.to_string()));
                }
                Err(diagnostic) => plan.diagnostics.push(diagnostic),
            }
        }
        plan
    }

    /// Which of `leaves` a text value for `property` would be written to.
    /// `target` is the raw name of the text-kind property it came from, if any.
    pub fn text_target<'l>(
        &self,
        leaves: &'l [TextLeaf],
        property: &str,
        target: Option<&str>,
    ) -> Option<&'l TextLeaf> {
        self.texts.select_for(leaves, property, target)
    }

    fn target_value(&self, canonical: &str, kind: PropertyKind, value: &AttributeValue) -> PropertyValue {
        match kind {
            PropertyKind::Text => PropertyValue::String(value.to_string()),
            PropertyKind::Boolean => PropertyValue::Bool(truthy(value)),
            PropertyKind::Variant if value.is_literal() => {
                PropertyValue::String(self.values.normalize(canonical, &value.to_string()))
            }
            PropertyKind::Variant => PropertyValue::String(value.to_string()),
        }
    }

    /// Apply a request to a live target, then to the container's nested
    /// targets in source order.
    ///
    /// Only a failure to read the root target's schema is an error; every
    /// other problem is recorded in the report.
    pub fn apply<T: TargetNode>(
        &self,
        request: &InstantiationRequest,
        target: &mut T,
    ) -> BridgeResult<ApplicationReport> {
        let kind = request.component_kind;
        let root = self
            .apply_node(NodeReport::ROOT, Some(kind), &request.semantic_props, target)
            .map_err(|e| BridgeError::Schema(e.reason))?;

        let nested = if kind.has_nested_content() {
            self.apply_nested(request, target)
        } else {
            Vec::new()
        };

        let report = ApplicationReport { kind, root, nested };
        tracing::info!(
            kind = %kind,
            strategy = ?report.root.result.strategy_index_used,
            nested = report.nested.len(),
            diagnostics = report.diagnostics().count(),
            "applied"
        );
        Ok(report)
    }

    fn apply_nested<T: TargetNode>(&self, request: &InstantiationRequest, target: &mut T) -> Vec<NodeReport> {
        let descriptor = match self.parse(&request.raw_source, request.component_kind) {
            Ok(descriptor) => descriptor,
            Err(miss) => {
                tracing::debug!(tag = %miss.tag, "raw source has no container, skipping nested content");
                return Vec::new();
            }
        };

        let mut seen: BTreeMap<NestedKind, usize> = BTreeMap::new();
        let mut reports = Vec::new();

        for child in &descriptor.children {
            let Some(kind) = child.nested_kind() else {
                continue;
            };
            let slot = seen.entry(kind).or_insert(0);
            let index = *slot;
            *slot += 1;

            let selector = format!("{}[{}]", kind.label(), index);
            let Some(nested) = target.nested_target(kind, index) else {
                tracing::debug!(%selector, "no matching nested target, ignored");
                continue;
            };

            let mut props = child.attributes.clone();
            if let Some(component_kind) = kind.component_kind() {
                self.merge_defaults(component_kind, &mut props);
            }

            let report = match self.apply_node(&selector, kind.component_kind(), &props, nested) {
                Ok(report) => report,
                Err(e) => {
                    let diagnostic = Diagnostic::CollaboratorFailure {
                        operation: "read properties".to_string(),
                        reason: e.reason,
                    };
                    tracing::warn!(%selector, "{}", diagnostic);
                    let mut report = NodeReport::new(selector);
                    report.diagnostics.push(diagnostic);
                    report
                }
            };
            reports.push(report);
        }
        reports
    }

    fn apply_node<T: TargetNode>(
        &self,
        selector: &str,
        kind: Option<ComponentKind>,
        props: &Attributes,
        target: &mut T,
    ) -> Result<NodeReport, CollaboratorError> {
        let schema = target.available_properties()?;
        let Plan {
            properties,
            texts,
            image_url,
            mut diagnostics,
        } = self.plan(props, &schema);
        let mut report = NodeReport::new(selector);

        if !properties.is_empty() {
            let names: Vec<&str> = schema.keys().map(String::as_str).collect();
            let outcome = self.strategies.select(
                kind,
                &properties,
                |canonical| match_target_name(canonical, &names).map(str::to_string),
                |map| target.apply_properties(map),
            );

            let result = &mut report.result;
            result.strategy_index_used = outcome.used.map(Strategy::index);
            result.applied_canonical_keys = outcome.applied.keys().cloned().collect();
            result.rejected_keys = properties
                .keys()
                .filter(|key| !outcome.applied.contains_key(*key))
                .cloned()
                .collect();

            if !outcome.accepted() {
                let reason = match outcome.rejections.last() {
                    Some((_, rejection)) => rejection.reason.clone(),
                    None => "no strategy applied".to_string(),
                };
                diagnostics.push(Diagnostic::RejectedCombination {
                    keys: properties.keys().cloned().collect(),
                    reason,
                });
            }
        }

        if !texts.is_empty() {
            let leaves = target.text_leaves();
            for (property, text) in &texts {
                let Some(leaf) = self.text_target(&leaves, property, text.target.as_deref()) else {
                    diagnostics.push(Diagnostic::MissingTextLeaf {
                        property: property.clone(),
                    });
                    continue;
                };
                match target.write_text(leaf, &text.value) {
                    Ok(()) => {
                        report
                            .result
                            .text_assignments
                            .insert(leaf.name.clone(), text.value.clone());
                    }
                    Err(e) => diagnostics.push(Diagnostic::CollaboratorFailure {
                        operation: format!("write text to '{}'", leaf.name),
                        reason: e.reason,
                    }),
                }
            }
        }

        if let Some(url) = image_url {
            if let Err(e) = target.apply_image(&url) {
                diagnostics.push(Diagnostic::CollaboratorFailure {
                    operation: "apply image".to_string(),
                    reason: e.reason,
                });
            }
        }

        for diagnostic in &diagnostics {
            tracing::warn!(selector, kind = diagnostic.label(), "{}", diagnostic);
        }
        report.diagnostics = diagnostics;
        Ok(report)
    }

    /// Parse, apply and signal completion exactly once, whatever happens.
    pub fn run<T, S>(
        &self,
        source: &str,
        kind: ComponentKind,
        target: &mut T,
        sink: &mut S,
    ) -> BridgeResult<Outcome>
    where
        T: TargetNode,
        S: CompletionSink + ?Sized,
    {
        let guard = CompletionGuard::new(sink);

        let request = match self.request(source, kind) {
            Ok(request) => request,
            Err(miss) => {
                tracing::warn!(kind = %kind, "{}", miss);
                guard.finish(Completion::Missed);
                return Ok(Outcome::Missed(miss));
            }
        };

        match self.apply(&request, target) {
            Ok(report) => {
                guard.finish(Completion::Completed);
                Ok(Outcome::Applied(report))
            }
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "application failed");
                guard.finish(Completion::Failed);
                Err(e)
            }
        }
    }
}

fn truthy(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::Boolean(b) => *b,
        AttributeValue::Number(n) => *n != 0,
        AttributeValue::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "0" | "no" | "off"
        ),
        AttributeValue::ElementReference { .. } => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema(entries: &[(&str, PropertyKind)]) -> PropertySchema {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn empty_source_is_a_miss() {
        let miss = Engine::default().parse("   ", ComponentKind::Action).unwrap_err();
        assert!(miss.to_string().starts_with("No Action component found"));
    }

    #[test]
    fn request_merges_action_defaults_without_overriding() {
        let request = Engine::default()
            .request(r#"<Action intent="secondary">Go</Action>"#, ComponentKind::Action)
            .unwrap();
        let keys: Vec<_> = request.semantic_props.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["intent", "children", "size", "variant", "state"]);
        assert_eq!(request.semantic_props["intent"], AttributeValue::from("secondary"));
        assert_eq!(request.semantic_props["size"], AttributeValue::from("lg"));
    }

    #[test]
    fn defaults_can_be_disabled() {
        let engine = Engine::new(
            MappingConfig::builtin(),
            EngineOptions {
                apply_kind_defaults: false,
                ..EngineOptions::default()
            },
        );
        let request = engine.request("<Action loading>", ComponentKind::Action).unwrap();
        assert_eq!(request.semantic_props.len(), 1);
    }

    #[test]
    fn plan_converts_by_property_kind() {
        let mut props = Attributes::new();
        props.insert("padding".into(), AttributeValue::from("6"));
        props.insert("initials".into(), AttributeValue::from("AB"));
        props.insert("loading".into(), AttributeValue::from(true));
        props.insert("variant".into(), AttributeValue::from("outline"));
        props.insert("onClick".into(), AttributeValue::from("x"));
        props.insert("children".into(), AttributeValue::from("Go"));
        props.insert("imageUrl".into(), AttributeValue::from("https://img/1.png"));

        let plan = Engine::default().plan(
            &props,
            &schema(&[
                ("padding", PropertyKind::Variant),
                ("✏️ initials#1:0", PropertyKind::Text),
                ("loading", PropertyKind::Boolean),
                ("variant", PropertyKind::Variant),
            ]),
        );

        assert_eq!(plan.properties["padding"].value, PropertyValue::from("6 (24px)"));
        assert!(!plan.properties.contains_key("initials"));
        assert_eq!(
            plan.texts["initials"],
            PlannedText {
                target: Some("✏️ initials#1:0".to_string()),
                value: "AB".to_string(),
            }
        );
        assert_eq!(plan.properties["loading"].value, PropertyValue::Bool(true));
        assert_eq!(plan.properties["variant"].value, PropertyValue::from("outlined"));
        assert_eq!(plan.texts["children"], PlannedText::unbound("Go".to_string()));
        assert_eq!(plan.image_url.as_deref(), Some("https://img/1.png"));
        assert_eq!(
            plan.diagnostics,
            vec![Diagnostic::UnmappedKey {
                key: "onClick".to_string()
            }]
        );
    }

    #[test]
    fn text_property_is_not_normalized() {
        let mut props = Attributes::new();
        props.insert("padding".into(), AttributeValue::from("6"));
        let plan = Engine::default().plan(&props, &schema(&[("padding", PropertyKind::Text)]));
        assert!(plan.properties.is_empty());
        assert_eq!(plan.texts["padding"].value, "6");
    }

    #[test]
    fn unresolved_text_role_goes_to_a_leaf() {
        let mut props = Attributes::new();
        props.insert("label".into(), AttributeValue::from("Save"));
        props.insert("size".into(), AttributeValue::from("lg"));
        let plan = Engine::default().plan(&props, &schema(&[]));
        assert_eq!(plan.texts["label"].value, "Save");
        assert_eq!(
            plan.diagnostics,
            vec![Diagnostic::UnresolvedName {
                key: "size".to_string(),
                canonical: "size".to_string(),
            }]
        );
    }

    #[test]
    fn truthiness_of_non_boolean_values() {
        assert!(truthy(&AttributeValue::from("yes")));
        assert!(!truthy(&AttributeValue::from("False")));
        assert!(!truthy(&AttributeValue::from(0)));
        assert!(truthy(&AttributeValue::element("Spinner")));
    }
}
