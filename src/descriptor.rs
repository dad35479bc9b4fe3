use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::kind::{ComponentKind, NestedKind};
use crate::value::AttributeValue;

/// Attribute key holding a tag's cleaned inner text.
pub const CHILDREN_KEY: &str = "children";

/// Insertion-ordered attributes; the first occurrence of a key wins.
pub type Attributes = IndexMap<String, AttributeValue>;

/// One parsed markup element and the elements found inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub tag_name: String,
    pub attributes: Attributes,
    pub inner_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentDescriptor>,
}

impl ComponentDescriptor {
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Cleaned inner text, when the element had plain text content.
    pub fn text(&self) -> Option<&str> {
        self.attribute(CHILDREN_KEY).and_then(AttributeValue::as_str)
    }

    pub fn nested_kind(&self) -> Option<NestedKind> {
        NestedKind::from_tag(&self.tag_name)
    }

    /// Children of one nested kind, in source order.
    pub fn children_of(&self, kind: NestedKind) -> impl Iterator<Item = &ComponentDescriptor> {
        self.children
            .iter()
            .filter(move |child| child.tag_name == kind.tag_name())
    }
}

/// Everything the instantiation collaborator receives for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantiationRequest {
    pub semantic_props: Attributes,
    pub component_kind: ComponentKind,
    /// Forwarded verbatim so nested markup can be recovered downstream.
    pub raw_source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tag: &str, text: &str) -> ComponentDescriptor {
        let mut attributes = Attributes::new();
        attributes.insert(CHILDREN_KEY.to_string(), AttributeValue::from(text));
        ComponentDescriptor {
            tag_name: tag.to_string(),
            attributes,
            inner_text: text.to_string(),
            children: Vec::new(),
        }
    }

    #[test]
    fn children_of_filters_by_tag_in_order() {
        let container = ComponentDescriptor {
            tag_name: "Container".to_string(),
            attributes: Attributes::new(),
            inner_text: String::new(),
            children: vec![leaf("Text", "one"), leaf("Action", "go"), leaf("Text", "two")],
        };
        let texts: Vec<_> = container
            .children_of(NestedKind::Text)
            .filter_map(ComponentDescriptor::text)
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(container.children[1].nested_kind(), Some(NestedKind::Action));
    }
}
