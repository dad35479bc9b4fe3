use std::collections::BTreeMap;

use crate::resolver::normalize_target_name;
use crate::schema::TextLeaf;

/// Picks which text leaf of a target receives a text value.
#[derive(Debug, Clone, Default)]
pub struct TextTargetResolver {
    /// Property → substrings looked for in leaf names, most specific first.
    hints: BTreeMap<String, Vec<String>>,
}

impl TextTargetResolver {
    pub fn new(hints: BTreeMap<String, Vec<String>>) -> Self {
        let hints = hints
            .into_iter()
            .map(|(property, hints)| {
                (property, hints.into_iter().map(|h| h.to_lowercase()).collect())
            })
            .collect();
        Self { hints }
    }

    fn hints_for(&self, property: &str) -> &[String] {
        self.hints.get(property).map(Vec::as_slice).unwrap_or_default()
    }

    /// In order: the only leaf; a leaf bound to a variable named after the
    /// property (or one of its hints); a leaf whose name contains a hint;
    /// the first leaf.
    pub fn select<'l>(&self, leaves: &'l [TextLeaf], property: &str) -> Option<&'l TextLeaf> {
        self.select_for(leaves, property, None)
    }

    /// Like [`select`](Self::select), but a leaf bound to exactly `target`,
    /// the raw decorated property name, also counts as bound.
    pub fn select_for<'l>(
        &self,
        leaves: &'l [TextLeaf],
        property: &str,
        target: Option<&str>,
    ) -> Option<&'l TextLeaf> {
        if let [only] = leaves {
            return Some(only);
        }

        let hints = self.hints_for(property);
        let wanted = normalize_target_name(property);
        let bound = leaves.iter().find(|leaf| {
            leaf.bound_variable.as_deref().is_some_and(|var| {
                if target == Some(var) {
                    return true;
                }
                let var = normalize_target_name(var);
                var == wanted || hints.iter().any(|h| *h == var)
            })
        });
        if let Some(leaf) = bound {
            tracing::debug!(property, leaf = %leaf.name, "text leaf chosen by bound variable");
            return Some(leaf);
        }

        for hint in hints {
            if let Some(leaf) = leaves
                .iter()
                .find(|leaf| leaf.name.to_lowercase().contains(hint.as_str()))
            {
                tracing::debug!(property, leaf = %leaf.name, hint = %hint, "text leaf chosen by name");
                return Some(leaf);
            }
        }

        leaves.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingConfig;

    fn resolver() -> TextTargetResolver {
        TextTargetResolver::new(MappingConfig::builtin().role_hints)
    }

    #[test]
    fn single_leaf_always_wins() {
        let leaves = vec![TextLeaf::new("Icon glyph")];
        assert_eq!(resolver().select(&leaves, "children"), Some(&leaves[0]));
    }

    #[test]
    fn bound_variable_beats_name_hint() {
        let leaves = vec![
            TextLeaf::new("Label"),
            TextLeaf::new("Caption").bound_to("✏️ Title#3:1"),
        ];
        assert_eq!(resolver().select(&leaves, "title").unwrap().name, "Caption");
    }

    #[test]
    fn binding_to_the_decorated_property_name_wins() {
        let leaves = vec![
            TextLeaf::new("Badge"),
            TextLeaf::new("Initials text").bound_to("✏️ initials#12:0"),
        ];
        let chosen = resolver().select_for(&leaves, "initials", Some("✏️ initials#12:0"));
        assert_eq!(chosen.unwrap().name, "Initials text");
    }

    #[test]
    fn exact_target_binding_needs_no_name_match() {
        let leaves = vec![
            TextLeaf::new("A"),
            TextLeaf::new("B").bound_to("Caption#7:7"),
        ];
        assert_eq!(resolver().select(&leaves, "subtitle").unwrap().name, "A");
        let chosen = resolver().select_for(&leaves, "subtitle", Some("Caption#7:7"));
        assert_eq!(chosen.unwrap().name, "B");
    }

    #[test]
    fn unrelated_binding_is_ignored() {
        let leaves = vec![
            TextLeaf::new("Badge").bound_to("count"),
            TextLeaf::new("Button label"),
        ];
        assert_eq!(resolver().select(&leaves, "children").unwrap().name, "Button label");
    }

    #[test]
    fn earlier_hint_takes_priority() {
        let leaves = vec![TextLeaf::new("Heading"), TextLeaf::new("Text")];
        assert_eq!(resolver().select(&leaves, "children").unwrap().name, "Text");
    }

    #[test]
    fn falls_back_to_first_then_none() {
        let leaves = vec![TextLeaf::new("A"), TextLeaf::new("B")];
        assert_eq!(resolver().select(&leaves, "children").unwrap().name, "A");
        assert_eq!(resolver().select(&[], "children"), None);
    }
}
