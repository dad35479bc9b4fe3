use crate::config::PropertyMappingTable;
use crate::error::Diagnostic;

/// A semantic key resolved onto a live target property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName<'a> {
    pub canonical: String,
    /// The target's own (possibly decorated) property name.
    pub target: &'a str,
}

/// Maps semantic attribute keys onto target property names.
#[derive(Debug, Clone, Default)]
pub struct PropertyNameResolver {
    table: PropertyMappingTable,
}

impl PropertyNameResolver {
    pub fn new(table: PropertyMappingTable) -> Self {
        Self { table }
    }

    pub fn canonical(&self, semantic_key: &str) -> Option<&str> {
        self.table.canonical(semantic_key)
    }

    /// Target name for `semantic_key`, or `None` when unmapped or unresolved.
    pub fn resolve<'a>(&self, semantic_key: &str, available: &[&'a str]) -> Option<&'a str> {
        self.lookup(semantic_key, available).ok().map(|r| r.target)
    }

    /// Like [`resolve`](Self::resolve), but says why resolution failed.
    pub fn lookup<'a>(
        &self,
        semantic_key: &str,
        available: &[&'a str],
    ) -> Result<ResolvedName<'a>, Diagnostic> {
        let canonical = self
            .canonical(semantic_key)
            .ok_or_else(|| Diagnostic::UnmappedKey {
                key: semantic_key.to_string(),
            })?;

        match match_target_name(canonical, available) {
            Some(target) => Ok(ResolvedName {
                canonical: canonical.to_string(),
                target,
            }),
            None => Err(Diagnostic::UnresolvedName {
                key: semantic_key.to_string(),
                canonical: canonical.to_string(),
            }),
        }
    }
}

/// Finds `canonical` among `available`: exact name first, then the first
/// name whose normalized form equals the lower-cased canonical name.
pub fn match_target_name<'a>(canonical: &str, available: &[&'a str]) -> Option<&'a str> {
    if let Some(exact) = available.iter().find(|name| **name == canonical) {
        return Some(*exact);
    }
    let wanted = canonical.to_lowercase();
    available
        .iter()
        .find(|name| normalize_target_name(name) == wanted)
        .copied()
}

/// `"✏️ initials#262:0"` → `"initials"`: drop leading decoration and any
/// `#id` suffix, then trim and lower-case.
pub fn normalize_target_name(name: &str) -> String {
    let undecorated = name.trim_start_matches(|c: char| !(c.is_alphanumeric() || c == '_'));
    let base = undecorated.split('#').next().unwrap_or_default();
    base.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PropertyNameResolver {
        PropertyNameResolver::new(PropertyMappingTable::builtin())
    }

    #[test]
    fn decorated_name_resolves() {
        let available = ["✏️ initials#12:0"];
        assert_eq!(resolver().resolve("initials", &available), Some("✏️ initials#12:0"));
    }

    #[test]
    fn exact_name_preferred_over_normalized() {
        let available = ["🔘 size", "size"];
        assert_eq!(resolver().resolve("size", &available), Some("size"));
    }

    #[test]
    fn normalized_match_is_case_insensitive() {
        let available = ["Variant", "✨ Intent#4:2"];
        assert_eq!(resolver().resolve("variant", &available), Some("Variant"));
        assert_eq!(resolver().resolve("intent", &available), Some("✨ Intent#4:2"));
    }

    #[test]
    fn synonym_resolves_to_same_target() {
        let available = ["Elevation"];
        assert_eq!(resolver().resolve("elevation", &available), Some("Elevation"));
    }

    #[test]
    fn unmapped_and_unresolved_are_distinguished() {
        let available = ["size"];
        assert_eq!(
            resolver().lookup("onClick", &available),
            Err(Diagnostic::UnmappedKey {
                key: "onClick".to_string()
            })
        );
        assert_eq!(
            resolver().lookup("intent", &available),
            Err(Diagnostic::UnresolvedName {
                key: "intent".to_string(),
                canonical: "intent".to_string(),
            })
        );
    }

    #[test]
    fn normalization_strips_decoration() {
        assert_eq!(normalize_target_name("✏️ initials#262:0"), "initials");
        assert_eq!(normalize_target_name("🔁 Replace with Local component#1:2"), "replace with local component");
        assert_eq!(normalize_target_name("lower badge"), "lower badge");
        assert_eq!(normalize_target_name("###"), "");
    }
}
