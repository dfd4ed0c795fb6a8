//! Splits an operation sequence into block-level sections.

use crate::app::domain::delta::{AttributeMap, InsertValue, Operation};
use crate::app::infrastructure::error::RenderError;

/// A run of content with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Inline {
    pub value: InsertValue,
    pub attributes: AttributeMap,
}

/// One paragraph or heading. `attributes` come from the newline that closed it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub attributes: AttributeMap,
    pub content: Vec<Inline>,
}

impl Section {
    fn push_text(&mut self, text: &str, attributes: &AttributeMap) {
        if let Some(Inline {
            value: InsertValue::Text(last),
            attributes: last_attributes,
        }) = self.content.last_mut()
        {
            if last_attributes == attributes {
                last.push_str(text);
                return;
            }
        }
        self.content.push(Inline {
            value: InsertValue::Text(text.to_string()),
            attributes: attributes.clone(),
        });
    }
}

/// Groups inserts into sections. Each `\n` closes the current section with
/// the attributes of the insert it belongs to. A trailing section with no
/// content is dropped.
pub fn build_sections(ops: &[Operation]) -> Result<Vec<Section>, RenderError> {
    let mut sections = Vec::new();
    let mut current = Section::default();

    for op in ops {
        let (value, attributes) = match op {
            Operation::Insert { value, attributes } => (value, attributes),
            other => return Err(RenderError::UnexpectedOperation(other.kind_name())),
        };

        match value {
            InsertValue::Text(text) if text.contains('\n') => {
                for (index, segment) in text.split('\n').enumerate() {
                    if index > 0 {
                        current.attributes = attributes.clone();
                        sections.push(std::mem::take(&mut current));
                    }
                    if !segment.is_empty() {
                        current.push_text(segment, attributes);
                    }
                }
            }
            InsertValue::Text(text) => current.push_text(text, attributes),
            InsertValue::Embed(_) => current.content.push(Inline {
                value: value.clone(),
                attributes: attributes.clone(),
            }),
        }
    }

    if !current.content.is_empty() {
        sections.push(current);
    }
    Ok(sections)
}
