use crate::attributes::{clean_text, AttributeParser};
use crate::descriptor::{ComponentDescriptor, CHILDREN_KEY};
use crate::error::ParseMiss;
use crate::kind::{ComponentKind, NestedKind};
use crate::locator::{find_all_tags, find_tag, TagMatch};
use crate::value::AttributeValue;

/// Parse the first `kind` element in `source` into a descriptor.
pub fn parse_component(source: &str, kind: ComponentKind) -> Result<ComponentDescriptor, ParseMiss> {
    parse_component_with(source, kind, &AttributeParser::new())
}

pub fn parse_component_with(
    source: &str,
    kind: ComponentKind,
    parser: &AttributeParser,
) -> Result<ComponentDescriptor, ParseMiss> {
    let tag = kind.tag_name();
    let found = find_tag(source, &tag).ok_or_else(|| ParseMiss::for_kind(kind))?;

    let mut descriptor = describe(&tag, &found, parser);
    if kind.has_nested_content() {
        descriptor.children = scan_nested(found.inner, parser);
    }

    tracing::debug!(
        kind = %kind,
        attributes = descriptor.attributes.len(),
        children = descriptor.children.len(),
        "parsed component"
    );
    Ok(descriptor)
}

/// Collect heading, text and action elements inside a container's content.
///
/// Only the first heading is taken. The result is ordered by position in the
/// source, which is also the order in which nested targets get populated.
pub fn scan_nested(inner: &str, parser: &AttributeParser) -> Vec<ComponentDescriptor> {
    let mut found: Vec<(usize, ComponentDescriptor)> = Vec::new();

    for kind in NestedKind::ALL {
        let matches = if kind.repeats() {
            find_all_tags(inner, kind.tag_name())
        } else {
            find_tag(inner, kind.tag_name()).into_iter().collect()
        };
        for m in matches {
            found.push((m.start, describe(kind.tag_name(), &m, parser)));
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, d)| d).collect()
}

fn describe(tag: &str, found: &TagMatch<'_>, parser: &AttributeParser) -> ComponentDescriptor {
    let parsed = parser.parse(found.attributes);
    if !parsed.ignored.is_empty() {
        tracing::debug!(tag, ignored = ?parsed.ignored, "skipped attributes without a usable value");
    }

    let mut attributes = parsed.attributes;
    if !contains_markup(found.inner) && !attributes.contains_key(CHILDREN_KEY) {
        let text = clean_text(found.inner);
        if !text.is_empty() {
            attributes.insert(CHILDREN_KEY.to_string(), AttributeValue::String(text));
        }
    }

    ComponentDescriptor {
        tag_name: tag.to_string(),
        attributes,
        inner_text: found.inner.to_string(),
        children: Vec::new(),
    }
}

/// True when the text holds an element (`<X` or `</X`), not just a stray `<`.
fn contains_markup(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'<'
            && bytes
                .get(i + 1)
                .is_some_and(|&n| n.is_ascii_alphabetic() || n == b'/')
    })
}
