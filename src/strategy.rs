//! Ordered fallback chain for applying a property map to a target that may
//! reject particular combinations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::StrategyTables;
use crate::kind::ComponentKind;
use crate::schema::{PropertyMap, Rejection};
use crate::value::PropertyValue;

/// One property after name resolution and value normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProperty {
    pub canonical: String,
    /// Raw target property name.
    pub target: String,
    pub value: PropertyValue,
}

/// Canonical name → resolved property, in attribute order.
pub type ResolvedProperties = IndexMap<String, ResolvedProperty>;

pub fn to_property_map(resolved: &ResolvedProperties) -> PropertyMap {
    resolved
        .values()
        .map(|p| (p.target.clone(), p.value.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    AsResolved,
    DowngradePairing,
    DropOptional,
    SubstituteVariant,
    ForceVariant,
    SafeDefaults,
}

impl Strategy {
    pub const CHAIN: [Strategy; 6] = [
        Strategy::AsResolved,
        Strategy::DowngradePairing,
        Strategy::DropOptional,
        Strategy::SubstituteVariant,
        Strategy::ForceVariant,
        Strategy::SafeDefaults,
    ];

    /// 1-based position in the chain.
    pub fn index(self) -> usize {
        match self {
            Strategy::AsResolved => 1,
            Strategy::DowngradePairing => 2,
            Strategy::DropOptional => 3,
            Strategy::SubstituteVariant => 4,
            Strategy::ForceVariant => 5,
            Strategy::SafeDefaults => 6,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::AsResolved => "as-resolved",
            Strategy::DowngradePairing => "downgrade-pairing",
            Strategy::DropOptional => "drop-optional",
            Strategy::SubstituteVariant => "substitute-variant",
            Strategy::ForceVariant => "force-variant",
            Strategy::SafeDefaults => "safe-defaults",
        };
        write!(f, "{} ({})", self.index(), name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategyOutcome {
    pub used: Option<Strategy>,
    /// The accepted properties, keyed by canonical name.
    pub applied: ResolvedProperties,
    /// Strategies the target was actually called with, in order.
    pub attempted: Vec<Strategy>,
    pub rejections: Vec<(Strategy, Rejection)>,
}

impl StrategyOutcome {
    pub fn accepted(&self) -> bool {
        self.used.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct StrategySelector {
    tables: StrategyTables,
    fallback: bool,
}

impl StrategySelector {
    pub fn new(tables: StrategyTables, fallback: bool) -> Self {
        Self { tables, fallback }
    }

    /// Whether `kind` gets more than the first strategy.
    pub fn falls_back(&self, kind: Option<ComponentKind>) -> bool {
        self.fallback && kind.is_some_and(|k| self.tables.fallback_kinds.contains(&k))
    }

    /// Walk the chain until `apply` accepts a candidate. Kinds outside the
    /// configured fallback kinds only get the first strategy.
    ///
    /// `resolve_target` maps a canonical name to the target's raw property
    /// name; it is needed for keys the resolved set does not already carry
    /// (the forced variant, the safe defaults).
    pub fn select<R, A>(
        &self,
        kind: Option<ComponentKind>,
        resolved: &ResolvedProperties,
        resolve_target: R,
        mut apply: A,
    ) -> StrategyOutcome
    where
        R: Fn(&str) -> Option<String>,
        A: FnMut(&PropertyMap) -> Result<(), Rejection>,
    {
        let mut outcome = StrategyOutcome::default();
        let mut tried: Vec<PropertyMap> = Vec::new();

        let chain: &[Strategy] = if self.falls_back(kind) {
            &Strategy::CHAIN
        } else {
            &Strategy::CHAIN[..1]
        };

        for &strategy in chain {
            let Some(candidate) = self.candidate(strategy, resolved, &resolve_target) else {
                tracing::debug!(%strategy, "not applicable");
                continue;
            };
            let map = to_property_map(&candidate);
            if map.is_empty() || tried.contains(&map) {
                tracing::debug!(%strategy, "nothing new to try");
                continue;
            }

            outcome.attempted.push(strategy);
            match apply(&map) {
                Ok(()) => {
                    tracing::info!(%strategy, properties = map.len(), "properties applied");
                    outcome.used = Some(strategy);
                    outcome.applied = candidate;
                    return outcome;
                }
                Err(rejection) => {
                    tracing::debug!(%strategy, reason = %rejection, "rejected");
                    outcome.rejections.push((strategy, rejection));
                    tried.push(map);
                }
            }
        }
        outcome
    }

    fn candidate<R>(
        &self,
        strategy: Strategy,
        resolved: &ResolvedProperties,
        resolve_target: &R,
    ) -> Option<ResolvedProperties>
    where
        R: Fn(&str) -> Option<String>,
    {
        let t = &self.tables;
        match strategy {
            Strategy::AsResolved => Some(resolved.clone()),

            Strategy::DowngradePairing => {
                let variant = value_of(resolved, &t.variant_key)?;
                let intent = value_of(resolved, &t.intent_key)?;
                let pairing = t
                    .unsupported_pairings
                    .iter()
                    .find(|p| p.variant == variant && p.intent == intent)?;
                let mut next = resolved.clone();
                set_value(&mut next, &t.intent_key, &pairing.replacement_intent);
                Some(next)
            }

            Strategy::DropOptional => {
                let key = t.optional_keys.iter().find(|k| resolved.contains_key(*k))?;
                let mut next = resolved.clone();
                next.shift_remove(key);
                Some(next)
            }

            Strategy::SubstituteVariant => {
                let variant = value_of(resolved, &t.variant_key)?;
                let substitute = t.variant_substitutions.get(variant)?;
                let mut next = resolved.clone();
                set_value(&mut next, &t.variant_key, substitute);
                Some(next)
            }

            Strategy::ForceVariant => {
                let mut next = resolved.clone();
                match next.get_mut(&t.variant_key) {
                    Some(existing) => existing.value = PropertyValue::from(t.forced_variant.as_str()),
                    None => {
                        let target = resolve_target(&t.variant_key)?;
                        next.insert(
                            t.variant_key.clone(),
                            ResolvedProperty {
                                canonical: t.variant_key.clone(),
                                target,
                                value: PropertyValue::from(t.forced_variant.as_str()),
                            },
                        );
                    }
                }
                Some(next)
            }

            Strategy::SafeDefaults => {
                let defaults: ResolvedProperties = t
                    .safe_defaults
                    .iter()
                    .filter_map(|(canonical, value)| {
                        let target = resolve_target(canonical)?;
                        Some((
                            canonical.clone(),
                            ResolvedProperty {
                                canonical: canonical.clone(),
                                target,
                                value: PropertyValue::from(value.as_str()),
                            },
                        ))
                    })
                    .collect();
                (!defaults.is_empty()).then_some(defaults)
            }
        }
    }
}

fn value_of<'a>(resolved: &'a ResolvedProperties, canonical: &str) -> Option<&'a str> {
    resolved.get(canonical).and_then(|p| p.value.as_str())
}

fn set_value(resolved: &mut ResolvedProperties, canonical: &str, value: &str) {
    if let Some(p) = resolved.get_mut(canonical) {
        p.value = PropertyValue::from(value);
    }
}
