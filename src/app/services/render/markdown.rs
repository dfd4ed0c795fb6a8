//! Markdown bundle. Styling with no Markdown syntax (colors, fonts, sizes,
//! alignment) is dropped; underline and scripts fall back to inline HTML.

use crate::app::domain::document::Document;

use super::attributes::{InlineAttribute, Script};
use super::format::MarkupFormat;

#[derive(Debug, Clone, Copy, Default)]
pub struct Markdown;

const SPECIAL: &[char] = &['\\', '`', '*', '_', '[', ']', '<', '>', '#', '~', '|'];

pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl MarkupFormat for Markdown {
    fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    fn inline(&self, attribute: &InlineAttribute, content: String) -> String {
        match attribute {
            InlineAttribute::Bold => format!("**{}**", content),
            InlineAttribute::Italic => format!("_{}_", content),
            InlineAttribute::Underline => format!("<u>{}</u>", content),
            InlineAttribute::Strike => format!("~~{}~~", content),
            InlineAttribute::Link(href) => format!("[{}](<{}>)", content, href.replace('>', "%3E")),
            InlineAttribute::Script(Script::Sub) => format!("<sub>{}</sub>", content),
            InlineAttribute::Script(Script::Super) => format!("<sup>{}</sup>", content),
            InlineAttribute::Color(_)
            | InlineAttribute::Background(_)
            | InlineAttribute::Font(_)
            | InlineAttribute::Size(_) => content,
        }
    }

    fn image(&self, data_uri: &str) -> String {
        format!("![](<{}>)", data_uri)
    }

    fn paragraph(&self, _style: &str, content: &str) -> String {
        content.to_string()
    }

    fn header(&self, level: u8, _style: &str, content: &str) -> String {
        format!("{} {}", "#".repeat(level as usize), content)
    }

    fn empty_line(&self, _style: &str) -> String {
        "<br>".to_string()
    }

    fn section_separator(&self) -> &'static str {
        "\n\n"
    }

    fn document(&self, _doc: &Document, body: &str) -> String {
        if body.is_empty() {
            String::new()
        } else {
            format!("{}\n", body)
        }
    }

    fn supports_post_process(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("2 * 3 = 6"), "2 \\* 3 = 6");
        assert_eq!(escape_markdown("# not a heading"), "\\# not a heading");
        assert_eq!(escape_markdown("plain text"), "plain text");
    }

    #[test]
    fn test_inline_templates() {
        let md = Markdown;
        assert_eq!(md.inline(&InlineAttribute::Bold, "x".into()), "**x**");
        assert_eq!(md.inline(&InlineAttribute::Italic, "x".into()), "_x_");
        assert_eq!(
            md.inline(&InlineAttribute::Link("https://a.test".into()), "x".into()),
            "[x](<https://a.test>)"
        );
        assert_eq!(md.inline(&InlineAttribute::Color("red".into()), "x".into()), "x");
    }

    #[test]
    fn test_section_templates() {
        let md = Markdown;
        assert_eq!(md.header(3, "text-align: center", "Title"), "### Title");
        assert_eq!(md.paragraph("text-align: right", "body"), "body");
        assert_eq!(md.document(&Document::new(), ""), "");
        assert_eq!(md.document(&Document::new(), "a\n\nb"), "a\n\nb\n");
    }
}
