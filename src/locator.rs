//! Tag locator: finds `<Tag ...>...</Tag>` and `<Tag ... />` spans in pasted text.
//!
//! This is a scanner, not a grammar. Closing tags are matched by the first
//! `</Tag>` after the opening tag, so same-named tags nested inside each
//! other are not supported.

/// How the located element was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// `<Tag ... />`
    SelfClosing,
    /// `<Tag ...>...</Tag>`
    Paired,
    /// `<Tag ...>` with no closing tag; content runs to the next `<`.
    Unclosed,
}

/// One located element. All slices borrow from the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch<'a> {
    /// Raw attribute section, trimmed.
    pub attributes: &'a str,
    /// Raw content between the opening and closing tags.
    pub inner: &'a str,
    /// Byte offset of the `<` that opens the element.
    pub start: usize,
    /// Byte offset just past the element.
    pub end: usize,
    pub closing: Closing,
}

/// First occurrence of `tag` in `source`.
pub fn find_tag<'a>(source: &'a str, tag: &str) -> Option<TagMatch<'a>> {
    find_from(source, tag, 0)
}

/// Every non-overlapping occurrence of `tag`, in source order.
pub fn find_all_tags<'a>(source: &'a str, tag: &str) -> Vec<TagMatch<'a>> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(m) = find_from(source, tag, from) {
        from = m.end;
        found.push(m);
    }
    found
}

fn find_from<'a>(source: &'a str, tag: &str, from: usize) -> Option<TagMatch<'a>> {
    if tag.is_empty() || from >= source.len() {
        return None;
    }

    let opener = format!("<{}", tag);
    let bytes = source.as_bytes();
    let mut search = from;

    while let Some(rel) = source[search..].find(&opener) {
        let start = search + rel;
        let name_end = start + opener.len();

        // `<Action` must not match `<ActionBar`
        match bytes.get(name_end) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {}
            Some(_) => {
                search = name_end;
                continue;
            }
            None => return None,
        }

        let open = scan_open_tag(bytes, name_end);
        let attributes = source[name_end..open.attributes_end].trim();

        if open.self_closing {
            return Some(TagMatch {
                attributes,
                inner: "",
                start,
                end: open.end,
                closing: Closing::SelfClosing,
            });
        }

        if open.end >= source.len() && !open.terminated {
            return Some(TagMatch {
                attributes,
                inner: "",
                start,
                end: source.len(),
                closing: Closing::Unclosed,
            });
        }

        return Some(match find_closing(source, tag, open.end) {
            Some((close_start, close_end)) => TagMatch {
                attributes,
                inner: &source[open.end..close_start],
                start,
                end: close_end,
                closing: Closing::Paired,
            },
            None => {
                let inner_end = source[open.end..]
                    .find('<')
                    .map(|i| open.end + i)
                    .unwrap_or(source.len());
                TagMatch {
                    attributes,
                    inner: &source[open.end..inner_end],
                    start,
                    end: inner_end.max(open.end),
                    closing: Closing::Unclosed,
                }
            }
        });
    }

    None
}

struct OpenTag {
    attributes_end: usize,
    end: usize,
    self_closing: bool,
    terminated: bool,
}

/// Walks the attribute section of an opening tag.
///
/// Quoted strings and `{...}` expressions are skipped, so a `>` inside
/// `icon={<Plus />}` does not end the tag. Every delimiter is ASCII, so the
/// returned offsets always fall on UTF-8 character boundaries.
fn scan_open_tag(bytes: &[u8], from: usize) -> OpenTag {
    let len = bytes.len();
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    let mut i = from;

    while i < len {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'/' if depth == 0 && bytes.get(i + 1) == Some(&b'>') => {
                return OpenTag {
                    attributes_end: i,
                    end: i + 2,
                    self_closing: true,
                    terminated: true,
                };
            }
            b'>' if depth == 0 => {
                return OpenTag {
                    attributes_end: i,
                    end: i + 1,
                    self_closing: false,
                    terminated: true,
                };
            }
            _ => {}
        }
        i += 1;
    }

    OpenTag {
        attributes_end: len,
        end: len,
        self_closing: false,
        terminated: false,
    }
}

/// Finds `</tag>` (whitespace allowed before `>`), returning its byte span.
fn find_closing(source: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let closer = format!("</{}", tag);
    let bytes = source.as_bytes();
    let mut search = from;

    while let Some(rel) = source[search..].find(&closer) {
        let close_start = search + rel;
        let mut j = close_start + closer.len();
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) == Some(&b'>') {
            return Some((close_start, j + 1));
        }
        search = close_start + closer.len();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_paired_tag() {
        let src = r#"<Action size="lg" intent="primary">Go</Action>"#;
        let m = find_tag(src, "Action").unwrap();
        assert_eq!(m.attributes, r#"size="lg" intent="primary""#);
        assert_eq!(m.inner, "Go");
        assert_eq!(m.closing, Closing::Paired);
        assert_eq!((m.start, m.end), (0, src.len()));
    }

    #[test]
    fn finds_self_closing_tag() {
        let src = r#"  <Heading name="John Doe" size="large" />"#;
        let m = find_tag(src, "Heading").unwrap();
        assert_eq!(m.attributes, r#"name="John Doe" size="large""#);
        assert_eq!(m.inner, "");
        assert_eq!(m.closing, Closing::SelfClosing);
        assert_eq!(m.start, 2);
    }

    #[test]
    fn tag_without_attributes() {
        let m = find_tag("<Action>Go</Action>", "Action").unwrap();
        assert_eq!(m.attributes, "");
        assert_eq!(m.inner, "Go");
    }

    #[test]
    fn element_reference_does_not_end_opening_tag() {
        let src = r#"<Action iconL={<Plus />} size="md">Add</Action>"#;
        let m = find_tag(src, "Action").unwrap();
        assert_eq!(m.attributes, r#"iconL={<Plus />} size="md""#);
        assert_eq!(m.inner, "Add");
    }

    #[test]
    fn quoted_angle_bracket_does_not_end_opening_tag() {
        let src = r#"<Action title="a > b">Go</Action>"#;
        let m = find_tag(src, "Action").unwrap();
        assert_eq!(m.attributes, r#"title="a > b""#);
    }

    #[test]
    fn name_must_end_at_boundary() {
        let src = "<ActionBar>x</ActionBar><Action>y</Action>";
        let m = find_tag(src, "Action").unwrap();
        assert_eq!(m.inner, "y");
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(find_tag("<action>Go</action>", "Action").is_none());
    }

    #[test]
    fn missing_tag_is_none() {
        assert!(find_tag("<Container></Container>", "Action").is_none());
        assert!(find_tag("", "Action").is_none());
        assert!(find_tag("<Action>", "").is_none());
    }

    #[test]
    fn unclosed_tag_takes_content_up_to_next_tag() {
        let m = find_tag("<Action loading>", "Action").unwrap();
        assert_eq!(m.attributes, "loading");
        assert_eq!(m.inner, "");
        assert_eq!(m.closing, Closing::Unclosed);

        let m = find_tag("<Action>Go <Text>x</Text>", "Action").unwrap();
        assert_eq!(m.inner, "Go ");
    }

    #[test]
    fn truncated_opening_tag_is_unclosed() {
        let m = find_tag(r#"<Action size="lg""#, "Action").unwrap();
        assert_eq!(m.attributes, r#"size="lg""#);
        assert_eq!(m.closing, Closing::Unclosed);
    }

    #[test]
    fn closing_tag_tolerates_whitespace() {
        let m = find_tag("<Text>Body</Text >", "Text").unwrap();
        assert_eq!(m.inner, "Body");
        assert_eq!(m.closing, Closing::Paired);
    }

    #[test]
    fn find_all_preserves_order() {
        let src = "<Text>one</Text><Action>go</Action><Text>two</Text>";
        let inner: Vec<_> = find_all_tags(src, "Text").iter().map(|m| m.inner).collect();
        assert_eq!(inner, vec!["one", "two"]);
    }

    #[test]
    fn handles_multibyte_text() {
        let src = "<Text>Héllo — wörld</Text><Text>✏️</Text>";
        let inner: Vec<_> = find_all_tags(src, "Text").iter().map(|m| m.inner).collect();
        assert_eq!(inner, vec!["Héllo — wörld", "✏️"]);
    }
}
