//! Identity & Snapshot Builder
//!
//! Turns a qualifying element into its identity string and the ordered list
//! of attributes to inject. Snapshots only ever capture static values.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use crate::classify::Classified;
use crate::config::TransformConfig;
use crate::error::TransformError;
use crate::source::{SourceLocation, SourceUnit};
use crate::syntax::{AttributeValue, ChildNode, ElementNode, SyntaxProvider};

/// Added to the parser's 0-based column so identities read 1-based.
pub const COLUMN_OFFSET: u32 = 1;

/// Recorded in place of any value that would need evaluation.
pub const EXPRESSION_SENTINEL: &str = "[expression]";

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementIdentity {
    pub path: String,
    pub line: u32,
    /// 0-based, as reported by the provider
    pub column: u32,
}

impl ElementIdentity {
    pub fn new(path: impl Into<String>, location: SourceLocation) -> Self {
        ElementIdentity {
            path: path.into(),
            line: location.line,
            column: location.column,
        }
    }
}

impl fmt::Display for ElementIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column + COLUMN_OFFSET)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedAttribute {
    pub name: String,
    pub value: String,
}

impl InjectedAttribute {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        InjectedAttribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Instrumentation {
    pub identity: ElementIdentity,
    pub attributes: Vec<InjectedAttribute>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct IdentityBuilder<'c, P: ?Sized> {
    provider: &'c P,
    unit: &'c SourceUnit<'c>,
    config: &'c TransformConfig,
    relative_path: String,
    file_name: String,
}

impl<'c, P: SyntaxProvider + ?Sized> IdentityBuilder<'c, P> {
    pub fn new(provider: &'c P, unit: &'c SourceUnit<'c>, config: &'c TransformConfig) -> Self {
        IdentityBuilder {
            provider,
            unit,
            config,
            relative_path: unit.relative_path(&config.base_directory),
            file_name: unit.file_name(),
        }
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// `None` when the element was excluded by the classifier.
    pub fn build(&self, classified: &Classified<'_>) -> Option<Instrumentation> {
        if !classified.is_included() {
            return None;
        }
        let name = classified.name.as_deref()?;
        let location = classified.location?;
        let element = classified.element;

        let identity = ElementIdentity::new(self.relative_path.clone(), location);
        let config = self.config;

        let mut attributes = vec![
            InjectedAttribute::new(config.attribute("id"), identity.to_string()),
            InjectedAttribute::new(config.attribute("name"), name),
            InjectedAttribute::new("data-component-path", self.relative_path.as_str()),
            InjectedAttribute::new("data-component-line", location.line.to_string()),
            InjectedAttribute::new("data-component-file", self.file_name.as_str()),
            InjectedAttribute::new("data-component-name", name),
        ];

        if config.include_static_snapshot && element.attribute_count() > 0 {
            match encode_json(&static_snapshot(element)) {
                Ok(encoded) => attributes.push(InjectedAttribute::new(config.attribute("props"), encoded)),
                Err(source) => {
                    let err = TransformError::SnapshotSerialization {
                        identity: identity.to_string(),
                        source,
                    };
                    warn!("{}", err);
                }
            }
        }

        if config.include_content_preview {
            self.push_content_preview(element, &identity, &mut attributes);
        }

        Some(Instrumentation {
            identity,
            attributes,
        })
    }

    fn push_content_preview(
        &self,
        element: &ElementNode,
        identity: &ElementIdentity,
        attributes: &mut Vec<InjectedAttribute>,
    ) {
        let preview = ContentPreview::of(element);
        if !preview.is_empty() {
            match encode_json(&preview) {
                Ok(encoded) => attributes.push(InjectedAttribute::new(
                    self.config.attribute("content"),
                    encoded,
                )),
                Err(e) => warn!("failed to serialize content preview for {}: {}", identity, e),
            }
        }

        let class_line = element
            .attribute("className")
            .and_then(|attr| self.provider.position_of(self.unit, attr.start));
        if let Some(location) = class_line {
            attributes.push(InjectedAttribute::new(
                self.config.attribute("classname-line"),
                location.line.to_string(),
            ));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SNAPSHOTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Static view of the element's own attributes, in source order.
/// Spread attributes carry no name and are left out.
pub fn static_snapshot(element: &ElementNode) -> Map<String, Value> {
    let mut props = Map::new();
    for attr in element.attributes.iter().filter(|attr| !attr.namespaced) {
        let value = match &attr.value {
            AttributeValue::StringLiteral(s) => Value::String(s.clone()),
            AttributeValue::Expression => Value::String(EXPRESSION_SENTINEL.to_string()),
            AttributeValue::Boolean => Value::Bool(true),
        };
        props.insert(attr.name.clone(), value);
    }
    props
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentPreview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl ContentPreview {
    pub fn of(element: &ElementNode) -> Self {
        let parts: Vec<&str> = element
            .children
            .iter()
            .filter_map(|child| match child {
                ChildNode::Text(text) | ChildNode::StringExpression(text) => Some(text.trim()),
                ChildNode::Other => None,
            })
            .filter(|text| !text.is_empty())
            .collect();

        ContentPreview {
            text: (!parts.is_empty()).then(|| parts.join(" ")),
            placeholder: element
                .attribute("placeholder")
                .and_then(|a| a.string_value())
                .map(str::to_string),
            class_name: element
                .attribute("className")
                .and_then(|a| a.string_value())
                .map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.placeholder.is_none() && self.class_name.is_none()
    }
}

/// Compact JSON, percent-encoded so it can sit inside a quoted attribute.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(urlencoding::encode(&json).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::syntax::OxcSyntaxProvider;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn config() -> TransformConfig {
        TransformConfig {
            base_directory: PathBuf::from("/repo"),
            ..TransformConfig::default()
        }
    }

    fn instrument(src: &str, config: &TransformConfig) -> Vec<Instrumentation> {
        let unit = SourceUnit::new(src, "/repo/src/App.tsx");
        let tree = OxcSyntaxProvider.parse(&unit).unwrap();
        let builder = IdentityBuilder::new(&OxcSyntaxProvider, &unit, config);
        classify(&OxcSyntaxProvider, &unit, &tree, &config.attribute_prefix)
            .filter_map(|c| builder.build(&c))
            .collect()
    }

    fn value_of<'i>(inst: &'i Instrumentation, name: &str) -> Option<&'i str> {
        inst.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    #[test]
    fn test_identity_display_is_one_based() {
        let identity = ElementIdentity::new("src/App.tsx", SourceLocation { line: 3, column: 2 });
        assert_eq!(identity.to_string(), "src/App.tsx:3:3");
    }

    #[test]
    fn test_display_attributes_in_order() {
        let config = config();
        let result = instrument("\n\n  <Button label=\"Save\" />", &config);
        let names: Vec<_> = result[0].attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "data-simplify-id",
                "data-simplify-name",
                "data-component-path",
                "data-component-line",
                "data-component-file",
                "data-component-name",
                "data-simplify-props",
            ]
        );
        assert_eq!(value_of(&result[0], "data-simplify-id"), Some("src/App.tsx:3:3"));
        assert_eq!(value_of(&result[0], "data-component-file"), Some("App.tsx"));
        assert_eq!(
            value_of(&result[0], "data-simplify-props"),
            Some("%7B%22label%22%3A%22Save%22%7D")
        );
    }

    #[test]
    fn test_snapshot_fidelity() {
        let config = config();
        let result = instrument("<Button disabled label=\"Save\" onClick={handler} />", &config);
        let encoded = value_of(&result[0], "data-simplify-props").unwrap();
        let decoded = urlencoding::decode(encoded).unwrap();
        assert_eq!(
            decoded,
            r#"{"disabled":true,"label":"Save","onClick":"[expression]"}"#
        );
    }

    #[test]
    fn test_snapshot_keeps_source_order() {
        let config = config();
        let result = instrument("<X zeta=\"1\" alpha=\"2\" zeta={y} />", &config);
        let encoded = value_of(&result[0], "data-simplify-props").unwrap();
        assert_eq!(
            urlencoding::decode(encoded).unwrap(),
            r#"{"zeta":"[expression]","alpha":"2"}"#
        );
    }

    #[test]
    fn test_element_valued_attribute_is_an_expression() {
        let config = config();
        let result = instrument("<X icon=<I /> />", &config);
        let encoded = value_of(&result[0], "data-simplify-props").unwrap();
        assert_eq!(urlencoding::decode(encoded).unwrap(), r#"{"icon":"[expression]"}"#);
    }

    #[test]
    fn test_no_snapshot_without_attributes() {
        let config = config();
        let result = instrument("<div />", &config);
        assert_eq!(value_of(&result[0], "data-simplify-props"), None);
    }

    #[test]
    fn test_spread_only_snapshot_is_empty_object() {
        let config = config();
        let result = instrument("<div {...rest} />", &config);
        assert_eq!(value_of(&result[0], "data-simplify-props"), Some("%7B%7D"));
    }

    #[test]
    fn test_snapshot_disabled() {
        let config = TransformConfig {
            include_static_snapshot: false,
            ..config()
        };
        let result = instrument("<Button label=\"Save\" />", &config);
        assert_eq!(result[0].attributes.len(), 6);
    }

    #[test]
    fn test_identities_are_unique() {
        let config = config();
        let result = instrument("<ul><li /><li /><li>\n<b /></li></ul>", &config);
        let mut ids: Vec<_> = result.iter().map(|i| i.identity.to_string()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(total, 5);
    }

    #[test]
    fn test_custom_prefix() {
        let config = TransformConfig {
            attribute_prefix: "data-trace".into(),
            ..config()
        };
        let result = instrument("<p />", &config);
        assert_eq!(result[0].attributes[0].name, "data-trace-id");
        assert_eq!(result[0].attributes[1].name, "data-trace-name");
    }

    #[test]
    fn test_content_preview() {
        let config = TransformConfig {
            include_content_preview: true,
            include_static_snapshot: false,
            ..config()
        };
        let src = "<input\n  placeholder=\"Email\"\n  className=\"field\"\n/>;\n<p>  Hello {\"big\"}   world {name}</p>;";
        let result = instrument(src, &config);

        let input = urlencoding::decode(value_of(&result[0], "data-simplify-content").unwrap())
            .unwrap()
            .into_owned();
        assert_eq!(input, r#"{"placeholder":"Email","className":"field"}"#);
        assert_eq!(value_of(&result[0], "data-simplify-classname-line"), Some("3"));

        let p = urlencoding::decode(value_of(&result[1], "data-simplify-content").unwrap())
            .unwrap()
            .into_owned();
        assert_eq!(p, r#"{"text":"Hello big world"}"#);
        assert_eq!(value_of(&result[1], "data-simplify-classname-line"), None);
    }

    #[test]
    fn test_empty_preview_is_omitted() {
        let config = TransformConfig {
            include_content_preview: true,
            ..config()
        };
        let result = instrument("<div>{value}</div>", &config);
        assert_eq!(value_of(&result[0], "data-simplify-content"), None);
    }
}
