//! Attribute tokenizer.
//!
//! Every attribute in the opening tag becomes exactly one token, and the
//! token's syntax alone decides its category:
//!
//! | syntax                      | value                |
//! |-----------------------------|----------------------|
//! | `key="v"`, `key='v'`, `key={"v"}` | string        |
//! | `key={<Name />}`            | element reference    |
//! | `key`, `key={true}`         | boolean              |
//! | `key={12}`                  | number               |
//!
//! Any other braced expression (`onClick={handler}`) is skipped and
//! reported. When a key repeats, the first value is kept.

use regex::Regex;
use std::sync::OnceLock;

use crate::descriptor::Attributes;
use crate::value::AttributeValue;

/// Element-reference keys that mean "show the left icon".
pub const LEFT_ICON_KEYS: &[&str] = &["iconL", "leftIcon"];
/// Element-reference keys that mean "show the right icon".
pub const RIGHT_ICON_KEYS: &[&str] = &["iconR", "rightIcon"];

pub const WITH_LEFT_ICON: &str = "With left icon";
pub const WITH_RIGHT_ICON: &str = "With right icon";

/// Result of parsing one attribute section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAttributes {
    pub attributes: Attributes,
    /// Raw text of attributes that carry no usable value.
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeParser {
    icon_flags: bool,
}

impl Default for AttributeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeParser {
    pub fn new() -> Self {
        Self { icon_flags: true }
    }

    /// Toggle translation of `iconL={<X />}` into the `With left icon` flag.
    pub fn with_icon_flags(mut self, enabled: bool) -> Self {
        self.icon_flags = enabled;
        self
    }

    pub fn parse(&self, input: &str) -> ParsedAttributes {
        let mut parsed = ParsedAttributes::default();

        for token in Tokenizer::new(input) {
            match token {
                Token::Attribute { key, raw } => match categorize(raw) {
                    Some(value) => self.insert(&mut parsed.attributes, key, value),
                    None => parsed.ignored.push(format!("{}={}", key, raw.source())),
                },
                Token::Stray(text) => parsed.ignored.push(text.to_string()),
            }
        }

        parsed
    }

    fn insert(&self, attributes: &mut Attributes, key: &str, value: AttributeValue) {
        let is_element = matches!(value, AttributeValue::ElementReference { .. });
        let (key, value) = if is_element && self.icon_flags && LEFT_ICON_KEYS.contains(&key) {
            (WITH_LEFT_ICON, AttributeValue::Boolean(true))
        } else if is_element && self.icon_flags && RIGHT_ICON_KEYS.contains(&key) {
            (WITH_RIGHT_ICON, AttributeValue::Boolean(true))
        } else {
            (key, value)
        };

        if attributes.contains_key(key) {
            tracing::debug!(key, "duplicate attribute ignored, first value wins");
            return;
        }
        attributes.insert(key.to_string(), value);
    }
}

/// Parse with default settings.
pub fn parse_attributes(input: &str) -> ParsedAttributes {
    AttributeParser::new().parse(input)
}

/// Strip `{" "}` / `{''}` interpolation artifacts, collapse whitespace, trim.
pub fn clean_text(text: &str) -> String {
    static EMPTY_INTERPOLATION: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();

    let empty = EMPTY_INTERPOLATION
        .get_or_init(|| Regex::new(r#"\{\s*['"`]\s*['"`]\s*\}"#).unwrap());
    let ws = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());

    let stripped = empty.replace_all(text, "");
    ws.replace_all(&stripped, " ").trim().to_string()
}

// ─── Tokenizer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawValue<'a> {
    /// `key` with no `=`
    Bare,
    /// `key="..."`, `key='...'`, or unquoted `key=value`
    Quoted(&'a str),
    /// `key={...}`, braces stripped
    Braced(&'a str),
}

impl RawValue<'_> {
    fn source(&self) -> String {
        match self {
            RawValue::Bare => String::new(),
            RawValue::Quoted(s) => format!("\"{}\"", s),
            RawValue::Braced(s) => format!("{{{}}}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Attribute { key: &'a str, raw: RawValue<'a> },
    /// Text that is not an attribute, e.g. a `{...props}` spread.
    Stray(&'a str),
}

struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Position just past the quote that closes the one at `from`.
    fn quoted_end(&self, from: usize) -> usize {
        let q = self.bytes[from];
        let mut i = from + 1;
        while i < self.bytes.len() && self.bytes[i] != q {
            i += 1;
        }
        (i + 1).min(self.bytes.len())
    }

    /// Position just past the `}` balancing the `{` at `from`.
    fn braced_end(&self, from: usize) -> usize {
        let mut depth = 0usize;
        let mut i = from;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'"' | b'\'' | b'`' => {
                    i = self.quoted_end(i);
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        self.bytes.len()
    }

    fn read_value(&mut self) -> RawValue<'a> {
        let start = self.pos;
        match self.peek() {
            Some(b'"') | Some(b'\'') => {
                let end = self.quoted_end(start);
                self.pos = end;
                let inner_end = if end > start + 1 && self.bytes[end - 1] == self.bytes[start] {
                    end - 1
                } else {
                    end
                };
                RawValue::Quoted(&self.input[start + 1..inner_end])
            }
            Some(b'{') => {
                let end = self.braced_end(start);
                self.pos = end;
                let inner_end = if self.bytes[end - 1] == b'}' { end - 1 } else { end };
                RawValue::Braced(&self.input[start + 1..inner_end])
            }
            Some(_) => {
                while self.pos < self.bytes.len()
                    && !self.bytes[self.pos].is_ascii_whitespace()
                    && self.bytes[self.pos] != b'/'
                {
                    self.pos += 1;
                }
                RawValue::Quoted(&self.input[start..self.pos])
            }
            None => RawValue::Quoted(""),
        }
    }
}

fn is_key_byte(b: u8) -> bool {
    !(b.is_ascii_whitespace() || matches!(b, b'=' | b'{' | b'}' | b'"' | b'\'' | b'`' | b'/' | b'<' | b'>'))
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            self.skip_whitespace();
            let b = self.peek()?;

            if b == b'/' {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            if !is_key_byte(b) {
                self.pos = match b {
                    b'{' => self.braced_end(start),
                    b'"' | b'\'' | b'`' => self.quoted_end(start),
                    _ => start + 1,
                };
                return Some(Token::Stray(&self.input[start..self.pos]));
            }

            while self.pos < self.bytes.len() && is_key_byte(self.bytes[self.pos]) {
                self.pos += 1;
            }
            let key = &self.input[start..self.pos];

            let after_key = self.pos;
            self.skip_whitespace();
            if self.peek() != Some(b'=') {
                self.pos = after_key;
                return Some(Token::Attribute {
                    key,
                    raw: RawValue::Bare,
                });
            }
            self.pos += 1;
            self.skip_whitespace();
            let raw = self.read_value();
            return Some(Token::Attribute { key, raw });
        }
    }
}

/// Decides the single category of one attribute value.
fn categorize(raw: RawValue<'_>) -> Option<AttributeValue> {
    match raw {
        RawValue::Bare => Some(AttributeValue::Boolean(true)),
        RawValue::Quoted(s) => Some(AttributeValue::String(s.to_string())),
        RawValue::Braced(expr) => categorize_expression(expr.trim()),
    }
}

fn categorize_expression(expr: &str) -> Option<AttributeValue> {
    if let Some(rest) = expr.strip_prefix('<') {
        let name: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
            .collect();
        return (!name.is_empty()).then(|| AttributeValue::element(name));
    }

    match expr {
        "true" => return Some(AttributeValue::Boolean(true)),
        "false" => return Some(AttributeValue::Boolean(false)),
        _ => {}
    }

    if let Ok(n) = expr.parse::<i64>() {
        return Some(AttributeValue::Number(n));
    }

    let bytes = expr.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'"' | b'\'' | b'`') {
            return Some(AttributeValue::String(expr[1..expr.len() - 1].to_string()));
        }
    }

    None
}
