use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed attribute value extracted from markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Boolean(bool),
    Number(i64),
    /// `key={<Name />}`; only the element name is kept.
    ElementReference { element: String },
}

impl AttributeValue {
    pub fn element(name: impl Into<String>) -> Self {
        AttributeValue::ElementReference {
            element: name.into(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value is eligible for display-value normalization.
    pub fn is_literal(&self) -> bool {
        matches!(self, AttributeValue::String(_) | AttributeValue::Number(_))
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Boolean(b) => write!(f, "{}", b),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::ElementReference { element } => write!(f, "<{} />", element),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Number(n)
    }
}

/// A value as handed to the target's property-set operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            PropertyValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_each_variant() {
        assert_eq!(AttributeValue::from("lg").to_string(), "lg");
        assert_eq!(AttributeValue::from(true).to_string(), "true");
        assert_eq!(AttributeValue::from(12).to_string(), "12");
        assert_eq!(AttributeValue::element("Plus").to_string(), "<Plus />");
    }

    #[test]
    fn untagged_yaml_keeps_variants_apart() {
        let yaml = "a: lg\nb: true\nc: 3\nd:\n  element: Plus\n";
        let parsed: std::collections::BTreeMap<String, AttributeValue> =
            serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed["a"], AttributeValue::from("lg"));
        assert_eq!(parsed["b"], AttributeValue::from(true));
        assert_eq!(parsed["c"], AttributeValue::from(3));
        assert_eq!(parsed["d"], AttributeValue::element("Plus"));
    }

    #[test]
    fn only_strings_and_numbers_are_literal() {
        assert!(AttributeValue::from("x").is_literal());
        assert!(AttributeValue::from(1).is_literal());
        assert!(!AttributeValue::from(false).is_literal());
        assert!(!AttributeValue::element("Plus").is_literal());
    }
}
