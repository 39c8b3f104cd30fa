//! Syntax Provider
//!
//! Parses a source unit and lowers every markup node of the arena AST into
//! an owned `SyntaxTree`, so nothing downstream depends on the parser's
//! lifetimes. `OxcSyntaxProvider` is the oxc-backed implementation.

use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use std::fmt;

use crate::error::{Result, TransformError};
use crate::source::{SourceLocation, SourceUnit};

// ═══════════════════════════════════════════════════════════════════════════════
// MARKUP TREE
// ═══════════════════════════════════════════════════════════════════════════════

/// Element name exactly as written, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementName {
    /// `<div>`, `<Button>`
    Identifier(String),
    /// `<Motion.div>`, `<UI.Card.Header>`; segments in source order
    Member(Vec<String>),
    /// `<svg:rect>`
    Namespaced { namespace: String, name: String },
    /// `<this>` or a member chain rooted at `this`
    This,
    /// `<>...</>`
    Fragment,
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementName::Identifier(name) => f.write_str(name),
            ElementName::Member(segments) => f.write_str(&segments.join(".")),
            ElementName::Namespaced { namespace, name } => write!(f, "{}:{}", namespace, name),
            ElementName::This => f.write_str("this"),
            ElementName::Fragment => f.write_str("<>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    StringLiteral(String),
    /// Anything in braces, or a markup value. Never evaluated.
    Expression,
    /// Present without a value: `<input disabled />`
    Boolean,
}

#[derive(Debug, Clone)]
pub struct AttributeNode {
    pub name: String,
    pub namespaced: bool,
    pub value: AttributeValue,
    pub start: Option<u32>,
}

impl AttributeNode {
    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            AttributeValue::StringLiteral(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildNode {
    /// Raw JSX text, untrimmed
    Text(String),
    /// `{"literal"}`
    StringExpression(String),
    Other,
}

#[derive(Debug, Clone)]
pub struct ElementNode {
    pub name: ElementName,
    /// Non-spread attributes in source order
    pub attributes: Vec<AttributeNode>,
    pub spread_attributes: usize,
    pub children: Vec<ChildNode>,
    /// Byte offset of the `<`; `None` for nodes without a real span
    pub start: Option<u32>,
    /// Byte offset right after the tag name (and its type arguments)
    pub insert_at: u32,
}

impl ElementNode {
    pub fn attribute_count(&self) -> usize {
        self.attributes.len() + self.spread_attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeNode> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

/// Every markup node of one file, in document order (parents before children).
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    pub elements: Vec<ElementNode>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROVIDER
// ═══════════════════════════════════════════════════════════════════════════════

pub trait SyntaxProvider {
    fn parse(&self, unit: &SourceUnit<'_>) -> Result<SyntaxTree>;

    fn walk<'t>(&self, tree: &'t SyntaxTree) -> std::slice::Iter<'t, ElementNode> {
        tree.elements.iter()
    }

    fn position_of(&self, unit: &SourceUnit<'_>, offset: Option<u32>) -> Option<SourceLocation> {
        unit.locate(offset?)
    }
}

/// Parses the TypeScript + JSX superset regardless of the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcSyntaxProvider;

impl SyntaxProvider for OxcSyntaxProvider {
    fn parse(&self, unit: &SourceUnit<'_>) -> Result<SyntaxTree> {
        let allocator = Allocator::default();
        let source_type = SourceType::default()
            .with_module(true)
            .with_typescript(true)
            .with_jsx(true);
        let ret = Parser::new(&allocator, unit.text, source_type).parse();
        if ret.panicked || !ret.errors.is_empty() {
            let message = ret
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(TransformError::Parse {
                path: unit.path.to_string(),
                message,
            });
        }

        let mut collector = MarkupCollector::default();
        collector.visit_program(&ret.program);
        Ok(SyntaxTree {
            elements: collector.elements,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOWERING
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct MarkupCollector {
    elements: Vec<ElementNode>,
}

impl<'a> Visit<'a> for MarkupCollector {
    fn visit_jsx_element(&mut self, element: &JSXElement<'a>) {
        self.elements.push(lower_element(element));
        walk::walk_jsx_element(self, element);
    }

    fn visit_jsx_fragment(&mut self, fragment: &JSXFragment<'a>) {
        self.elements.push(ElementNode {
            name: ElementName::Fragment,
            attributes: Vec::new(),
            spread_attributes: 0,
            children: fragment.children.iter().map(lower_child).collect(),
            start: span_start(fragment.span),
            insert_at: fragment.opening_fragment.span.start + 1,
        });
        walk::walk_jsx_fragment(self, fragment);
    }
}

fn span_start(span: Span) -> Option<u32> {
    if span.end > span.start {
        Some(span.start)
    } else {
        None
    }
}

fn lower_element(element: &JSXElement<'_>) -> ElementNode {
    let opening = &element.opening_element;

    let mut attributes = Vec::new();
    let mut spread_attributes = 0;
    for item in &opening.attributes {
        match item {
            JSXAttributeItem::Attribute(attr) => attributes.push(lower_attribute(attr)),
            JSXAttributeItem::SpreadAttribute(_) => spread_attributes += 1,
        }
    }

    let insert_at = match &opening.type_arguments {
        Some(args) => args.span.end,
        None => opening.name.span().end,
    };

    ElementNode {
        name: lower_name(&opening.name),
        attributes,
        spread_attributes,
        children: element.children.iter().map(lower_child).collect(),
        start: span_start(element.span),
        insert_at,
    }
}

fn lower_name(name: &JSXElementName<'_>) -> ElementName {
    match name {
        JSXElementName::Identifier(id) => ElementName::Identifier(id.name.to_string()),
        JSXElementName::IdentifierReference(id) => ElementName::Identifier(id.name.to_string()),
        JSXElementName::NamespacedName(ns) => ElementName::Namespaced {
            namespace: ns.namespace.name.to_string(),
            name: ns.name.name.to_string(),
        },
        JSXElementName::MemberExpression(member) => {
            let mut segments = Vec::new();
            if collect_member_segments(member, &mut segments) {
                ElementName::Member(segments)
            } else {
                ElementName::This
            }
        }
        JSXElementName::ThisExpression(_) => ElementName::This,
    }
}

/// Returns false when the chain is rooted at `this`.
fn collect_member_segments(member: &JSXMemberExpression<'_>, segments: &mut Vec<String>) -> bool {
    let rooted = match &member.object {
        JSXMemberExpressionObject::IdentifierReference(id) => {
            segments.push(id.name.to_string());
            true
        }
        JSXMemberExpressionObject::MemberExpression(inner) => {
            collect_member_segments(inner, segments)
        }
        _ => false,
    };
    segments.push(member.property.name.to_string());
    rooted
}

fn lower_attribute(attr: &JSXAttribute<'_>) -> AttributeNode {
    let (name, namespaced) = match &attr.name {
        JSXAttributeName::Identifier(id) => (id.name.to_string(), false),
        JSXAttributeName::NamespacedName(ns) => {
            (format!("{}:{}", ns.namespace.name, ns.name.name), true)
        }
    };

    let value = match &attr.value {
        None => AttributeValue::Boolean,
        Some(JSXAttributeValue::StringLiteral(s)) => AttributeValue::StringLiteral(s.value.to_string()),
        Some(_) => AttributeValue::Expression,
    };

    AttributeNode {
        name,
        namespaced,
        value,
        start: span_start(attr.span),
    }
}

fn lower_child(child: &JSXChild<'_>) -> ChildNode {
    match child {
        JSXChild::Text(text) => ChildNode::Text(text.value.to_string()),
        JSXChild::ExpressionContainer(container) => match &container.expression {
            JSXExpression::StringLiteral(s) => ChildNode::StringExpression(s.value.to_string()),
            _ => ChildNode::Other,
        },
        _ => ChildNode::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SyntaxTree {
        let unit = SourceUnit::new(text, "test.tsx");
        OxcSyntaxProvider.parse(&unit).unwrap()
    }

    #[test]
    fn test_collects_elements_in_document_order() {
        let tree = parse("const a = <div><span>hi</span><Card.Header /></div>;");
        let names: Vec<_> = tree.elements.iter().map(|e| e.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                ElementName::Identifier("div".into()),
                ElementName::Identifier("span".into()),
                ElementName::Member(vec!["Card".into(), "Header".into()]),
            ]
        );
    }

    #[test]
    fn test_insert_point_follows_tag_name() {
        let src = "const a = <Button label=\"Save\" />;";
        let tree = parse(src);
        let button = &tree.elements[0];
        assert_eq!(&src[..button.insert_at as usize], "const a = <Button");
        assert_eq!(button.start, Some(10));
    }

    #[test]
    fn test_insert_point_skips_type_arguments() {
        let src = "const a = <List<Item> items={xs} />;";
        let tree = parse(src);
        assert_eq!(&src[..tree.elements[0].insert_at as usize], "const a = <List<Item>");
    }

    #[test]
    fn test_attribute_kinds() {
        let tree = parse("<button disabled label=\"Save\" onClick={go} {...rest} xlink:href=\"#a\" />");
        let el = &tree.elements[0];
        assert_eq!(el.spread_attributes, 1);
        assert_eq!(el.attribute_count(), 5);
        assert_eq!(el.attributes[0].value, AttributeValue::Boolean);
        assert_eq!(el.attributes[1].string_value(), Some("Save"));
        assert_eq!(el.attributes[2].value, AttributeValue::Expression);
        assert_eq!(el.attributes[3].name, "xlink:href");
        assert!(el.attributes[3].namespaced);
    }

    #[test]
    fn test_fragments_and_exotic_names() {
        let tree = parse("const a = <><svg:rect /><this.Item /></>;");
        assert_eq!(tree.elements[0].name, ElementName::Fragment);
        assert!(matches!(tree.elements[1].name, ElementName::Namespaced { .. }));
        assert_eq!(tree.elements[2].name, ElementName::This);
    }

    #[test]
    fn test_children() {
        let tree = parse("<p>  Hello {\"world\"} {count}</p>");
        assert_eq!(
            tree.elements[0].children,
            vec![
                ChildNode::Text("  Hello ".into()),
                ChildNode::StringExpression("world".into()),
                ChildNode::Text(" ".into()),
                ChildNode::Other,
            ]
        );
    }

    #[test]
    fn test_parse_error() {
        let unit = SourceUnit::new("const a = <div>;", "broken.tsx");
        let err = OxcSyntaxProvider.parse(&unit).unwrap_err();
        assert!(matches!(err, TransformError::Parse { ref path, .. } if path == "broken.tsx"));
    }
}
