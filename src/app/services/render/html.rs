//! Default HTML bundle with a stylesheet generated from the document theme.

use serde_json::Value;

use crate::app::domain::document::Document;
use crate::app::domain::theme::{ThemeKey, ThemeValue, font_family_css, property_string};

use super::attributes::{InlineAttribute, Script};
use super::format::MarkupFormat;

const DOCUMENT_CLASS: &str = "vox-document";
const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, Default)]
pub struct Html;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn styled_span(property: &str, value: &str, content: String) -> String {
    format!(
        "<span style=\"{}: {}\">{}</span>",
        property,
        escape_html(value),
        content
    )
}

fn size_value(size: &str) -> &str {
    match size {
        "small" => "0.75em",
        "large" => "1.5em",
        "huge" => "2.5em",
        other => other,
    }
}

fn style_attribute(style: &str) -> String {
    if style.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", escape_html(style))
    }
}

impl MarkupFormat for Html {
    fn escape(&self, text: &str) -> String {
        escape_html(text)
    }

    fn inline(&self, attribute: &InlineAttribute, content: String) -> String {
        match attribute {
            InlineAttribute::Bold => format!("<strong>{}</strong>", content),
            InlineAttribute::Italic => format!("<em>{}</em>", content),
            InlineAttribute::Underline => format!("<u>{}</u>", content),
            InlineAttribute::Strike => format!("<s>{}</s>", content),
            InlineAttribute::Link(href) => {
                format!("<a href=\"{}\">{}</a>", escape_html(href), content)
            }
            InlineAttribute::Color(color) => styled_span("color", color, content),
            InlineAttribute::Background(color) => styled_span("background-color", color, content),
            InlineAttribute::Font(name) => styled_span("font-family", &font_family_css(name), content),
            InlineAttribute::Size(size) => styled_span("font-size", size_value(size), content),
            InlineAttribute::Script(Script::Sub) => format!("<sub>{}</sub>", content),
            InlineAttribute::Script(Script::Super) => format!("<sup>{}</sup>", content),
        }
    }

    fn image(&self, data_uri: &str) -> String {
        format!("<img src=\"{}\">", escape_html(data_uri))
    }

    fn paragraph(&self, style: &str, content: &str) -> String {
        format!("<p{}>{}</p>", style_attribute(style), content)
    }

    fn header(&self, level: u8, style: &str, content: &str) -> String {
        format!("<h{level}{}>{}</h{level}>", style_attribute(style), content)
    }

    fn empty_line(&self, style: &str) -> String {
        format!("<p{}><br></p>", style_attribute(style))
    }

    fn section_separator(&self) -> &'static str {
        "\n"
    }

    fn document(&self, doc: &Document, body: &str) -> String {
        let title = doc.title.as_deref().unwrap_or(UNTITLED);
        let language = property_string(&doc.theme, doc.theme.resolve(ThemeKey::Language));

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str(&format!("<html lang=\"{}\">\n", escape_html(&language)));
        out.push_str("<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
        out.push_str("<style>\n");
        out.push_str(&stylesheet(doc));
        out.push_str("</style>\n</head>\n<body>\n");
        out.push_str(&format!("<div class=\"{}\">\n", DOCUMENT_CLASS));
        if !body.is_empty() {
            out.push_str(body);
            out.push('\n');
        }
        out.push_str("</div>\n</body>\n</html>\n");
        out
    }
}

fn theme_css(doc: &Document, key: ThemeKey) -> String {
    let value = doc.theme.resolve(key);
    let css = property_string(&doc.theme, value);
    match value {
        ThemeValue::Color(_) => format!("rgb({})", css),
        _ => css,
    }
}

/// Custom fonts referenced by the theme or by inline `font` attributes.
fn used_fonts(doc: &Document) -> Vec<(&str, &str)> {
    let in_theme = |name: &str| {
        doc.theme
            .iter()
            .any(|(_, value)| matches!(value, ThemeValue::Font(font) if font.font_name == name))
    };
    let in_text = |name: &str| {
        doc.operations.iter().any(|op| {
            op.attributes()
                .and_then(|attributes| attributes.get("font"))
                .and_then(Value::as_str)
                == Some(name)
        })
    };

    doc.fonts
        .iter()
        .filter(|(name, _)| in_theme(name.as_str()) || in_text(name.as_str()))
        .map(|(name, data)| (name.as_str(), data.as_str()))
        .collect()
}

fn font_face(name: &str, data: &str) -> String {
    let format = if data.starts_with("data:font/otf") {
        "opentype"
    } else {
        "truetype"
    };
    format!(
        "@font-face {{ font-family: {}; src: url({}) format('{}'); }}\n",
        font_family_css(name),
        data,
        format
    )
}

/// Stylesheet for the document wrapper, one rule per line.
pub fn stylesheet(doc: &Document) -> String {
    let mut css = String::new();
    for (name, data) in used_fonts(doc) {
        css.push_str(&font_face(name, data));
    }

    let root = format!(".{}", DOCUMENT_CLASS);
    css.push_str(&format!(
        "body {{ margin: 0; background-color: {}; }}\n",
        theme_css(doc, ThemeKey::BackgroundColor)
    ));
    css.push_str(&format!(
        "{} {{ box-sizing: border-box; max-width: {}; margin: 0 auto; padding: {}; \
         font-family: {}; font-size: {}; color: {}; line-height: {}; }}\n",
        root,
        theme_css(doc, ThemeKey::PageWidth),
        theme_css(doc, ThemeKey::PagePadding),
        theme_css(doc, ThemeKey::BaseFontFamily),
        theme_css(doc, ThemeKey::BaseFontSize),
        theme_css(doc, ThemeKey::BaseColor),
        theme_css(doc, ThemeKey::LineHeight),
    ));
    css.push_str(&format!(
        "{} p {{ margin: 0 0 {}; }}\n",
        root,
        theme_css(doc, ThemeKey::ParagraphSpacing)
    ));
    css.push_str(&format!(
        "{root} h1, {root} h2, {root} h3, {root} h4, {root} h5, {root} h6 \
         {{ font-family: {}; color: {}; margin: 0 0 {}; }}\n",
        theme_css(doc, ThemeKey::HeadingFontFamily),
        theme_css(doc, ThemeKey::HeadingColor),
        theme_css(doc, ThemeKey::ParagraphSpacing),
    ));
    for level in 1..=6 {
        if let Some(key) = ThemeKey::heading_size(level) {
            css.push_str(&format!(
                "{} h{} {{ font-size: {}; }}\n",
                root,
                level,
                theme_css(doc, key)
            ));
        }
    }
    css.push_str(&format!(
        "{} a {{ color: {}; }}\n",
        root,
        theme_css(doc, ThemeKey::LinkColor)
    ));
    css
}
