use crate::app::domain::document::Document;
use crate::app::domain::settings::OutputFormat;

use super::attributes::InlineAttribute;
use super::html::Html;
use super::markdown::Markdown;

/// A template bundle: how text, inline attributes, sections and the
/// surrounding document are written in one markup language.
pub trait MarkupFormat {
    fn escape(&self, text: &str) -> String;

    /// Wraps already-rendered inline content in one attribute.
    fn inline(&self, attribute: &InlineAttribute, content: String) -> String;

    /// An image whose source is a data URI.
    fn image(&self, data_uri: &str) -> String;

    fn paragraph(&self, style: &str, content: &str) -> String;

    fn header(&self, level: u8, style: &str, content: &str) -> String;

    /// A section with no inline content.
    fn empty_line(&self, style: &str) -> String;

    /// Separator placed between rendered sections.
    fn section_separator(&self) -> &'static str {
        ""
    }

    /// Wraps the rendered sections into a complete document.
    fn document(&self, doc: &Document, body: &str) -> String;

    /// Whether minify/pretty passes make sense for this markup.
    fn supports_post_process(&self) -> bool {
        true
    }
}

pub fn format_for(format: OutputFormat) -> Box<dyn MarkupFormat> {
    match format {
        OutputFormat::Html => Box::new(Html),
        OutputFormat::Markdown => Box::new(Markdown),
    }
}
