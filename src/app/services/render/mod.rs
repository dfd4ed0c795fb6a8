//! Document to markup.
//!
//! Operations are grouped into sections (see [`build_sections`]), each
//! section is rendered through a [`MarkupFormat`], and the result is wrapped
//! into a full document. Inline attributes are applied in the order they
//! appear in the attribute map, so the first attribute ends up innermost.

pub mod attributes;
pub mod format;
pub mod html;
pub mod markdown;
pub mod post;
pub mod sections;

use std::collections::HashMap;

use serde_json::Value;

use crate::app::domain::delta::{AttributeMap, InsertValue};
use crate::app::domain::document::Document;
use crate::app::domain::settings::{OutputFormat, PostProcess, Settings};
use crate::app::infrastructure::error::RenderError;

pub use attributes::{AttributeKind, InlineAttribute, classify};
pub use format::{MarkupFormat, format_for};
pub use html::Html;
pub use markdown::Markdown;
pub use sections::{Inline, Section, build_sections};

/// Handles a custom attribute: receives its value and the content rendered so far.
pub type AttributeProcessor = Box<dyn Fn(&Value, String) -> Result<String, RenderError>>;

/// Renders an embed kind from the embed's value.
pub type EmbedProcessor = Box<dyn Fn(&Value) -> Result<String, RenderError>>;

const IMAGE_EMBED: &str = "image";

pub struct Renderer {
    format: Box<dyn MarkupFormat>,
    processors: HashMap<String, AttributeProcessor>,
    embeds: HashMap<String, EmbedProcessor>,
    post_process: PostProcess,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self::with_format(format_for(format))
    }

    /// Uses a caller-supplied template bundle.
    pub fn with_format(format: Box<dyn MarkupFormat>) -> Self {
        Self {
            format,
            processors: HashMap::new(),
            embeds: HashMap::new(),
            post_process: PostProcess::None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.output_format).with_post_process(settings.post_process)
    }

    pub fn with_post_process(mut self, mode: PostProcess) -> Self {
        self.post_process = mode;
        self
    }

    /// Registers a handler for an attribute outside the built-in set.
    /// Built-in names cannot be overridden.
    pub fn register_attribute<F>(&mut self, name: impl Into<String>, processor: F) -> &mut Self
    where
        F: Fn(&Value, String) -> Result<String, RenderError> + 'static,
    {
        self.processors.insert(name.into(), Box::new(processor));
        self
    }

    /// Registers a handler for an embed kind. Takes precedence over the
    /// built-in `image` handling.
    pub fn register_embed<F>(&mut self, kind: impl Into<String>, processor: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<String, RenderError> + 'static,
    {
        self.embeds.insert(kind.into(), Box::new(processor));
        self
    }

    pub fn render(&self, doc: &Document) -> Result<String, RenderError> {
        let sections = build_sections(doc.operations.ops())?;
        let blocks = sections
            .iter()
            .map(|section| self.render_section(doc, section))
            .collect::<Result<Vec<_>, _>>()?;
        let body = blocks.join(self.format.section_separator());
        let markup = self.format.document(doc, &body);

        log::debug!(
            "rendered {} sections ({} bytes, {:?})",
            sections.len(),
            markup.len(),
            self.post_process
        );

        if self.format.supports_post_process() {
            Ok(post::apply(markup, self.post_process))
        } else {
            Ok(markup)
        }
    }

    pub fn render_section(&self, doc: &Document, section: &Section) -> Result<String, RenderError> {
        let style = attributes::section_style(&section.attributes);
        if section.content.is_empty() {
            return Ok(self.format.empty_line(&style));
        }

        let mut content = String::new();
        for inline in &section.content {
            content.push_str(&self.render_inline(doc, inline)?);
        }

        Ok(match attributes::header_level(&section.attributes) {
            Some(level) => self.format.header(level, &style, &content),
            None => self.format.paragraph(&style, &content),
        })
    }

    fn render_inline(&self, doc: &Document, inline: &Inline) -> Result<String, RenderError> {
        let content = match &inline.value {
            InsertValue::Text(text) => self.format.escape(text),
            InsertValue::Embed(embed) => self.render_embed(doc, embed)?,
        };
        self.apply_attributes(&inline.attributes, content)
    }

    fn apply_attributes(&self, attributes: &AttributeMap, mut content: String) -> Result<String, RenderError> {
        for (name, value) in attributes {
            content = match classify(name, value)? {
                AttributeKind::Inline(attribute) => self.format.inline(&attribute, content),
                AttributeKind::Section | AttributeKind::Unset => content,
                AttributeKind::Custom => match self.processors.get(name) {
                    Some(processor) => processor(value, content)?,
                    None => return Err(RenderError::UnknownAttribute(name.clone())),
                },
            };
        }
        Ok(content)
    }

    fn render_embed(&self, doc: &Document, embed: &AttributeMap) -> Result<String, RenderError> {
        let mut entries = embed.iter();
        let (kind, value) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => return Err(RenderError::InvalidEmbed(embed.len())),
        };

        if let Some(processor) = self.embeds.get(kind) {
            return processor(value);
        }
        if kind != IMAGE_EMBED {
            return Err(RenderError::UnknownEmbed(kind.clone()));
        }

        let id = value.as_u64().ok_or_else(|| RenderError::InvalidAttribute {
            name: IMAGE_EMBED.to_string(),
            value: value.to_string(),
        })?;
        let image = usize::try_from(id)
            .ok()
            .and_then(|index| doc.images.get(index))
            .ok_or(RenderError::MissingImage(id))?;
        Ok(self.format.image(&image.value))
    }
}

/// Renders with one of the bundled formats.
pub fn render(doc: &Document, format: OutputFormat, post_process: PostProcess) -> Result<String, RenderError> {
    Renderer::new(format).with_post_process(post_process).render(doc)
}
