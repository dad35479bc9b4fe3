use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;

/// The logical component kinds a user can select for a pasted snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Container,
    Action,
    Heading,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::Container,
        ComponentKind::Action,
        ComponentKind::Heading,
    ];

    /// Lower-case logical name, as selected by the user.
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Container => "container",
            ComponentKind::Action => "action",
            ComponentKind::Heading => "heading",
        }
    }

    /// Tag name searched for in the source (logical name, first letter capitalized).
    pub fn tag_name(self) -> String {
        capitalize(self.name())
    }

    /// Whether the nested content scanner runs for this kind.
    pub fn has_nested_content(self) -> bool {
        matches!(self, ComponentKind::Container)
    }

    /// Syntax example shown when the pasted source has no matching tag.
    pub fn example(self) -> &'static str {
        match self {
            ComponentKind::Container => {
                "<Container padding=\"6\" borderRadius=\"xl\">\n  <Heading>Card Title</Heading>\n  <Text>Card content</Text>\n  <Action>Action</Action>\n</Container>"
            }
            ComponentKind::Action => {
                "<Action size=\"lg\" intent=\"primary\" variant=\"filled\">Button Text</Action>"
            }
            ComponentKind::Heading => "<Heading name=\"John Doe\" size=\"large\" />",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComponentKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| BridgeError::UnknownKind {
                kind: wanted.to_string(),
                expected: ComponentKind::ALL
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Child tags recognised inside a container, in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedKind {
    Heading,
    Text,
    Action,
}

impl NestedKind {
    pub const ALL: [NestedKind; 3] = [NestedKind::Heading, NestedKind::Text, NestedKind::Action];

    pub fn tag_name(self) -> &'static str {
        match self {
            NestedKind::Heading => "Heading",
            NestedKind::Text => "Text",
            NestedKind::Action => "Action",
        }
    }

    pub fn from_tag(tag: &str) -> Option<NestedKind> {
        NestedKind::ALL.into_iter().find(|k| k.tag_name() == tag)
    }

    /// Only the first heading is taken; body text and actions may repeat.
    pub fn repeats(self) -> bool {
        !matches!(self, NestedKind::Heading)
    }

    /// Top-level kind whose defaults also apply to this nested kind.
    pub fn component_kind(self) -> Option<ComponentKind> {
        match self {
            NestedKind::Heading => Some(ComponentKind::Heading),
            NestedKind::Text => None,
            NestedKind::Action => Some(ComponentKind::Action),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NestedKind::Heading => "heading",
            NestedKind::Text => "text",
            NestedKind::Action => "action",
        }
    }
}

/// Upper-cases the first character, leaving the rest untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_str_is_case_insensitive() {
        assert_eq!("Container".parse::<ComponentKind>().unwrap(), ComponentKind::Container);
        assert_eq!(" action ".parse::<ComponentKind>().unwrap(), ComponentKind::Action);
        assert_eq!("HEADING".parse::<ComponentKind>().unwrap(), ComponentKind::Heading);
    }

    #[test]
    fn unknown_kind_lists_expected_names() {
        let err = "avatar".parse::<ComponentKind>().unwrap_err();
        assert_eq!(
            err,
            BridgeError::UnknownKind {
                kind: "avatar".to_string(),
                expected: "container, action, heading".to_string(),
            }
        );
    }

    #[test]
    fn tag_name_capitalizes_logical_name() {
        assert_eq!(ComponentKind::Container.tag_name(), "Container");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn examples_mention_their_tag() {
        for kind in ComponentKind::ALL {
            assert!(kind.example().contains(&kind.tag_name()));
        }
    }

    #[test]
    fn nested_kind_round_trips_through_tag() {
        for kind in NestedKind::ALL {
            assert_eq!(NestedKind::from_tag(kind.tag_name()), Some(kind));
        }
        assert_eq!(NestedKind::from_tag("text"), None);
        assert!(!NestedKind::Heading.repeats());
        assert!(NestedKind::Action.repeats());
    }
}
