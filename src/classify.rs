//! Element Classifier
//!
//! Decides, per markup node, whether it takes part in instrumentation.
//! Read-only over the tree; yields lazily in document order.

use crate::source::{SourceLocation, SourceUnit};
use crate::syntax::{ElementName, ElementNode, SyntaxProvider, SyntaxTree};

/// Named fragments reject unknown props at runtime, so they are treated
/// like `<>`. Matched by name only: imports are not inspected, so a user
/// component called `Fragment` is skipped as well.
const TRANSPARENT_NAMES: &[&str] = &["Fragment", "React.Fragment"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    AlreadyTagged,
    TransparentGroup,
    NoPosition,
    UnsupportedName,
}

#[derive(Debug, Clone)]
pub struct Classified<'t> {
    pub element: &'t ElementNode,
    /// Resolved name; `None` only for excluded nodes
    pub name: Option<String>,
    pub location: Option<SourceLocation>,
    pub exclusion: Option<Exclusion>,
}

impl Classified<'_> {
    pub fn is_included(&self) -> bool {
        self.exclusion.is_none()
    }
}

/// Simple identifiers verbatim, member chains joined with `.`; any other
/// shape has no name.
pub fn resolve_name(name: &ElementName) -> Option<String> {
    match name {
        ElementName::Identifier(id) => Some(id.clone()),
        ElementName::Member(segments) => Some(segments.join(".")),
        ElementName::Namespaced { .. } | ElementName::This | ElementName::Fragment => None,
    }
}

pub fn is_already_tagged(element: &ElementNode, prefix: &str) -> bool {
    element
        .attributes
        .iter()
        .any(|attr| !attr.namespaced && attr.name.starts_with(prefix))
}

pub fn classify<'t, P>(
    provider: &'t P,
    unit: &'t SourceUnit<'t>,
    tree: &'t SyntaxTree,
    prefix: &'t str,
) -> impl Iterator<Item = Classified<'t>> + 't
where
    P: SyntaxProvider + ?Sized,
{
    provider
        .walk(tree)
        .map(move |element| classify_element(provider, unit, element, prefix))
}

fn classify_element<'t, P>(
    provider: &P,
    unit: &SourceUnit<'_>,
    element: &'t ElementNode,
    prefix: &str,
) -> Classified<'t>
where
    P: SyntaxProvider + ?Sized,
{
    let name = resolve_name(&element.name);
    let location = provider.position_of(unit, element.start);

    let exclusion = if is_already_tagged(element, prefix) {
        Some(Exclusion::AlreadyTagged)
    } else if element.name == ElementName::Fragment
        || name
            .as_deref()
            .is_some_and(|n| TRANSPARENT_NAMES.contains(&n))
    {
        Some(Exclusion::TransparentGroup)
    } else if name.is_none() {
        Some(Exclusion::UnsupportedName)
    } else if location.is_none() {
        Some(Exclusion::NoPosition)
    } else {
        None
    };

    Classified {
        element,
        name,
        location,
        exclusion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{AttributeNode, AttributeValue, OxcSyntaxProvider};

    fn exclusions(src: &str) -> Vec<(String, Option<Exclusion>)> {
        let unit = SourceUnit::new(src, "test.tsx");
        let tree = OxcSyntaxProvider.parse(&unit).unwrap();
        classify(&OxcSyntaxProvider, &unit, &tree, "data-simplify")
            .map(|c| (c.element.name.to_string(), c.exclusion))
            .collect()
    }

    #[test]
    fn test_plain_elements_are_included() {
        assert_eq!(
            exclusions("<div><Button /></div>"),
            vec![("div".into(), None), ("Button".into(), None)]
        );
    }

    #[test]
    fn test_already_tagged_element_is_skipped() {
        let result = exclusions("<div data-simplify-id=\"a.tsx:1:1\"><span /></div>");
        assert_eq!(result[0].1, Some(Exclusion::AlreadyTagged));
        assert_eq!(result[1].1, None);
    }

    #[test]
    fn test_other_data_attributes_do_not_count_as_tagged() {
        let result = exclusions("<div data-testid=\"x\" data-component-name=\"y\" />");
        assert_eq!(result[0].1, None);
    }

    #[test]
    fn test_fragments_are_transparent() {
        let result = exclusions("<><Fragment><React.Fragment><p /></React.Fragment></Fragment></>");
        assert_eq!(
            result.iter().map(|r| r.1).collect::<Vec<_>>(),
            vec![
                Some(Exclusion::TransparentGroup),
                Some(Exclusion::TransparentGroup),
                Some(Exclusion::TransparentGroup),
                None,
            ]
        );
    }

    #[test]
    fn test_unsupported_names() {
        let result = exclusions("<g><svg:rect /><this.Row /></g>");
        assert_eq!(result[1].1, Some(Exclusion::UnsupportedName));
        assert_eq!(result[2].1, Some(Exclusion::UnsupportedName));
    }

    #[test]
    fn test_member_names_resolve_to_dotted_string() {
        let name = ElementName::Member(vec!["UI".into(), "Card".into(), "Header".into()]);
        assert_eq!(resolve_name(&name).as_deref(), Some("UI.Card.Header"));
    }

    #[test]
    fn test_missing_position_is_excluded() {
        let unit = SourceUnit::new("", "synthetic.tsx");
        let tree = SyntaxTree {
            elements: vec![ElementNode {
                name: ElementName::Identifier("div".into()),
                attributes: vec![AttributeNode {
                    name: "id".into(),
                    namespaced: false,
                    value: AttributeValue::Boolean,
                    start: None,
                }],
                spread_attributes: 0,
                children: vec![],
                start: None,
                insert_at: 0,
            }],
        };
        let classified: Vec<_> = classify(&OxcSyntaxProvider, &unit, &tree, "data-simplify").collect();
        assert_eq!(classified[0].exclusion, Some(Exclusion::NoPosition));
        assert!(!classified[0].is_included());
    }
}
