//! Typed view over the built-in attribute set.

use serde_json::Value;

use crate::app::domain::delta::AttributeMap;
use crate::app::infrastructure::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Sub,
    Super,
}

/// Inline attributes every format knows how to wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineAttribute {
    Bold,
    Italic,
    Underline,
    Strike,
    Link(String),
    Color(String),
    Background(String),
    Font(String),
    Size(String),
    Script(Script),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    Inline(InlineAttribute),
    /// `header` and `align` apply to the whole section.
    Section,
    /// `false` or `null`: the attribute is switched off.
    Unset,
    /// Not a built-in; needs a registered processor.
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub fn name(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        [Align::Left, Align::Center, Align::Right, Align::Justify]
            .into_iter()
            .find(|align| align.name() == name)
    }
}

fn invalid(name: &str, value: &Value) -> RenderError {
    RenderError::InvalidAttribute {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn flag(name: &str, value: &Value, attribute: InlineAttribute) -> Result<AttributeKind, RenderError> {
    match value {
        Value::Bool(true) => Ok(AttributeKind::Inline(attribute)),
        _ => Err(invalid(name, value)),
    }
}

fn text(name: &str, value: &Value, build: fn(String) -> InlineAttribute) -> Result<AttributeKind, RenderError> {
    match value {
        Value::String(text) => Ok(AttributeKind::Inline(build(text.clone()))),
        _ => Err(invalid(name, value)),
    }
}

/// Sorts one attribute into built-in inline, section-level, off, or custom.
pub fn classify(name: &str, value: &Value) -> Result<AttributeKind, RenderError> {
    let known = matches!(
        name,
        "bold"
            | "italic"
            | "underline"
            | "strike"
            | "link"
            | "color"
            | "background"
            | "font"
            | "size"
            | "script"
            | "header"
            | "align"
    );
    if known && matches!(value, Value::Null | Value::Bool(false)) {
        return Ok(AttributeKind::Unset);
    }

    match name {
        "bold" => flag(name, value, InlineAttribute::Bold),
        "italic" => flag(name, value, InlineAttribute::Italic),
        "underline" => flag(name, value, InlineAttribute::Underline),
        "strike" => flag(name, value, InlineAttribute::Strike),
        "link" => text(name, value, InlineAttribute::Link),
        "color" => text(name, value, InlineAttribute::Color),
        "background" => text(name, value, InlineAttribute::Background),
        "font" => text(name, value, InlineAttribute::Font),
        "size" => text(name, value, InlineAttribute::Size),
        "script" => match value.as_str() {
            Some("sub") => Ok(AttributeKind::Inline(InlineAttribute::Script(Script::Sub))),
            Some("super") => Ok(AttributeKind::Inline(InlineAttribute::Script(Script::Super))),
            _ => Err(invalid(name, value)),
        },
        "header" | "align" => Ok(AttributeKind::Section),
        _ => Ok(AttributeKind::Custom),
    }
}

/// Heading level from a section's `header` attribute. Values outside 1..=6
/// are ignored.
pub fn header_level(attributes: &AttributeMap) -> Option<u8> {
    attributes
        .get("header")
        .and_then(Value::as_u64)
        .filter(|level| (1..=6).contains(level))
        .map(|level| level as u8)
}

pub fn align(attributes: &AttributeMap) -> Option<Align> {
    attributes.get("align").and_then(Value::as_str).and_then(Align::from_name)
}

/// Style string for a section. Only `align` contributes.
pub fn section_style(attributes: &AttributeMap) -> String {
    match align(attributes) {
        Some(align) => format!("text-align: {}", align.name()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> AttributeMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_classify_builtins() {
        assert_eq!(
            classify("bold", &json!(true)).unwrap(),
            AttributeKind::Inline(InlineAttribute::Bold)
        );
        assert_eq!(
            classify("link", &json!("https://a.test")).unwrap(),
            AttributeKind::Inline(InlineAttribute::Link("https://a.test".into()))
        );
        assert_eq!(
            classify("script", &json!("super")).unwrap(),
            AttributeKind::Inline(InlineAttribute::Script(Script::Super))
        );
        assert_eq!(classify("header", &json!(2)).unwrap(), AttributeKind::Section);
        assert_eq!(classify("align", &json!("center")).unwrap(), AttributeKind::Section);
    }

    #[test]
    fn test_classify_unset_and_custom() {
        assert_eq!(classify("bold", &json!(false)).unwrap(), AttributeKind::Unset);
        assert_eq!(classify("link", &Value::Null).unwrap(), AttributeKind::Unset);
        assert_eq!(classify("highlight", &json!(true)).unwrap(), AttributeKind::Custom);
    }

    #[test]
    fn test_classify_rejects_wrong_shapes() {
        assert!(matches!(
            classify("bold", &json!("yes")),
            Err(RenderError::InvalidAttribute { .. })
        ));
        assert!(classify("color", &json!([1, 2, 3])).is_err());
        assert!(classify("script", &json!("middle")).is_err());
    }

    #[test]
    fn test_section_attributes() {
        let attrs = map(json!({"header": 3, "align": "right"}));
        assert_eq!(header_level(&attrs), Some(3));
        assert_eq!(section_style(&attrs), "text-align: right");

        assert_eq!(header_level(&map(json!({"header": 7}))), None);
        assert_eq!(section_style(&map(json!({"align": "diagonal"}))), "");
        assert_eq!(section_style(&AttributeMap::new()), "");
    }
}
