//! [`Document`] to `.vox` text.

use serde_json::{Value, json};

use crate::app::domain::delta::{AttributeMap, Operation};
use crate::app::domain::document::{Document, StackItem};

#[derive(Default)]
struct Writer {
    out: String,
}

impl Writer {
    fn line(&mut self, depth: usize, command: &str, arg: Option<&Value>) {
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.out.push_str(command);
        if let Some(arg) = arg {
            self.out.push(' ');
            self.out.push_str(&arg.to_string());
        }
        self.out.push('\n');
    }

    fn attributes(&mut self, depth: usize, attributes: &AttributeMap) {
        for (name, value) in attributes {
            self.line(depth, &command_token(name), Some(value));
        }
    }

    fn ops(&mut self, depth: usize, ops: &[Operation]) {
        for op in ops {
            match op {
                Operation::Insert { value, attributes } => {
                    self.line(depth, "I", Some(&value.to_json()));
                    self.attributes(depth + 1, attributes);
                }
                Operation::Retain { count, attributes } => {
                    self.line(depth, "R", Some(&json!(count)));
                    self.attributes(depth + 1, attributes);
                }
                Operation::Delete { count } => self.line(depth, "D", Some(&json!(count))),
            }
        }
    }

    fn stack(&mut self, name: &str, items: &[StackItem]) {
        self.line(1, name, None);
        for item in items {
            self.line(2, "@", Some(&json!([item.range.index, item.range.length])));
            self.ops(3, item.delta.ops());
        }
    }
}

/// Bare when the name is a single token, JSON-quoted otherwise.
fn command_token(name: &str) -> String {
    if name.is_empty() || name.starts_with('"') || name.contains(char::is_whitespace) {
        Value::String(name.to_string()).to_string()
    } else {
        name.to_string()
    }
}

/// Serializes every block, including empty ones.
pub fn write(doc: &Document) -> String {
    let mut writer = Writer::default();

    writer.line(0, "theme", None);
    for (key, value) in doc.theme.iter() {
        writer.line(1, key.name(), Some(&value.to_json()));
    }

    writer.line(0, "delta", None);
    writer.ops(1, doc.operations.ops());

    writer.line(0, "images", None);
    writer.line(1, "lookup", None);
    for (source, id) in &doc.images.lookup {
        let quoted = Value::String(source.clone()).to_string();
        writer.line(2, &quoted, Some(&json!(id)));
    }
    writer.line(1, "data", None);
    for image in &doc.images.data {
        writer.line(2, &image.hash.to_string(), Some(&Value::String(image.value.clone())));
    }

    writer.line(0, "fonts", None);
    for (name, data) in &doc.fonts {
        writer.line(1, &command_token(name), Some(&Value::String(data.clone())));
    }

    writer.line(0, "history", None);
    writer.stack("undo", &doc.history.undo);
    writer.stack("redo", &doc.history.redo);

    log::debug!("wrote document: {} bytes", writer.out.len());
    writer.out
}
