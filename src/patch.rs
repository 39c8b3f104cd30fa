//! Attribute Injector
//!
//! Insertions are collected against offsets of the untouched source and
//! applied in one left-to-right pass, so no edit ever shifts another.

use serde_json::Value;

use crate::error::{Result, TransformError};
use crate::identity::InjectedAttribute;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Byte offset into the original text
    pub offset: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    insertions: Vec<Insertion>,
}

/// Output of `PatchSet::apply`; insertions are sorted by offset.
#[derive(Debug, Clone)]
pub struct Patched {
    pub code: String,
    pub insertions: Vec<Insertion>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.insertions.len()
    }

    pub fn insert(&mut self, offset: u32, text: String) {
        self.insertions.push(Insertion { offset, text });
    }

    pub fn inject(&mut self, offset: u32, attributes: &[InjectedAttribute]) {
        self.insert(offset, render_attributes(attributes));
    }

    pub fn apply(mut self, source: &str) -> Result<Patched> {
        self.insertions.sort_by_key(|ins| ins.offset);

        let extra: usize = self.insertions.iter().map(|ins| ins.text.len()).sum();
        let mut code = String::with_capacity(source.len() + extra);
        let mut cursor = 0usize;

        for ins in &self.insertions {
            let offset = ins.offset as usize;
            if offset > source.len() || !source.is_char_boundary(offset) {
                return Err(TransformError::Patch {
                    offset: ins.offset,
                    len: source.len(),
                });
            }
            code.push_str(&source[cursor..offset]);
            code.push_str(&ins.text);
            cursor = offset;
        }
        code.push_str(&source[cursor..]);

        Ok(Patched {
            code,
            insertions: self.insertions,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Renders attributes for splicing right after a tag name: each one is
/// preceded by a single space.
pub fn render_attributes(attributes: &[InjectedAttribute]) -> String {
    let mut out = String::new();
    for attr in attributes {
        out.push(' ');
        out.push_str(&render_attribute(attr));
    }
    out
}

/// JSX attribute strings have no escape sequences, so values that a
/// string cannot hold verbatim go into an expression container instead.
/// The container never holds a raw line terminator.
pub fn render_attribute(attr: &InjectedAttribute) -> String {
    if needs_expression(&attr.value) {
        let literal = Value::String(attr.value.clone())
            .to_string()
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029");
        format!("{}={{{}}}", attr.name, literal)
    } else {
        format!("{}=\"{}\"", attr.name, attr.value)
    }
}

fn needs_expression(value: &str) -> bool {
    value
        .chars()
        .any(|c| matches!(c, '"' | '\\' | '&' | '\n' | '\r' | '\u{2028}' | '\u{2029}'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attr(name: &str, value: &str) -> InjectedAttribute {
        InjectedAttribute {
            name: name.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_render_plain_value() {
        assert_eq!(render_attribute(&attr("data-x", "src/App.tsx")), "data-x=\"src/App.tsx\"");
    }

    #[test]
    fn test_render_escapes_quotes_and_backslashes() {
        assert_eq!(
            render_attribute(&attr("data-x", r#"C:\a "b""#)),
            r#"data-x={"C:\\a \"b\""}"#
        );
        assert_eq!(render_attribute(&attr("data-x", "a\nb")), r#"data-x={"a\nb"}"#);
    }

    #[test]
    fn test_render_escapes_unicode_line_separators() {
        assert_eq!(
            render_attribute(&attr("data-x", "a\u{2028}b\u{2029}")),
            r#"data-x={"a\u2028b\u2029"}"#
        );
    }

    #[test]
    fn test_render_attributes_leading_spaces() {
        let rendered = render_attributes(&[attr("a", "1"), attr("b", "2")]);
        assert_eq!(rendered, " a=\"1\" b=\"2\"");
    }

    #[test]
    fn test_apply_in_one_pass() {
        let source = "<a><b /></a>";
        let mut patches = PatchSet::new();
        // registered out of order on purpose
        patches.insert(5, " y".into());
        patches.insert(2, " x".into());
        let patched = patches.apply(source).unwrap();
        assert_eq!(patched.code, "<a x><b y /></a>");
        assert_eq!(patched.insertions[0].offset, 2);
    }

    #[test]
    fn test_apply_preserves_untouched_text() {
        let source = "line one\n  <div   className='x'>\n</div>";
        let at = source.find("<div").unwrap() as u32 + 4;
        let mut patches = PatchSet::new();
        patches.inject(at, &[attr("data-id", "1")]);
        let patched = patches.apply(source).unwrap();
        assert_eq!(
            patched.code,
            "line one\n  <div data-id=\"1\"   className='x'>\n</div>"
        );
        assert_eq!(&patched.code[..at as usize], &source[..at as usize]);
        assert_eq!(&patched.code[at as usize + 12..], &source[at as usize..]);
    }

    #[test]
    fn test_apply_rejects_bad_offsets() {
        let mut patches = PatchSet::new();
        patches.insert(99, "x".into());
        assert!(matches!(
            patches.apply("short"),
            Err(TransformError::Patch { offset: 99, len: 5 })
        ));

        let mut patches = PatchSet::new();
        patches.insert(1, "x".into());
        assert!(patches.apply("é").is_err());
    }
}
