//! Block tree to [`Document`].

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use super::block::{Block, parse_blocks};
use crate::app::domain::assets::{FontTable, ImageData, ImageTable, content_hash};
use crate::app::domain::delta::{AttributeMap, Delta, InsertValue, Operation};
use crate::app::domain::document::{Document, History, SelectionRange, StackItem};
use crate::app::domain::theme::{Theme, ThemeKey, ThemeValue};
use crate::app::infrastructure::error::{ParseError, ParseErrorKind};
use crate::app::services::assets::is_valid_font_data;

const TOP_LEVEL: [&str; 5] = ["theme", "delta", "images", "fonts", "history"];

fn invalid(block: &Block, expected: &str) -> ParseError {
    block.error(ParseErrorKind::InvalidArgument {
        command: block.command.clone(),
        expected: expected.to_string(),
    })
}

fn unknown(block: &Block, context: &str) -> ParseError {
    block.error(ParseErrorKind::UnknownCommand {
        command: block.command.clone(),
        context: context.to_string(),
    })
}

fn expect_no_arg(block: &Block) -> Result<(), ParseError> {
    if block.arg.is_null() {
        Ok(())
    } else {
        Err(invalid(block, "no argument"))
    }
}

fn expect_no_body(block: &Block) -> Result<(), ParseError> {
    if block.body.is_empty() {
        Ok(())
    } else {
        Err(block.error(ParseErrorKind::UnexpectedBody(block.command.clone())))
    }
}

/// Bare (unquoted) command name, or `None` for quoted ones.
fn keyword(block: &Block) -> Option<&str> {
    (!block.quoted).then_some(block.command.as_str())
}

fn read_count(block: &Block) -> Result<usize, ParseError> {
    block
        .arg
        .as_u64()
        .filter(|&count| count > 0)
        .and_then(|count| usize::try_from(count).ok())
        .ok_or_else(|| invalid(block, "a positive integer"))
}

fn read_attributes(body: &[Block]) -> Result<AttributeMap, ParseError> {
    let mut attributes = AttributeMap::new();
    for block in body {
        expect_no_body(block)?;
        if attributes.contains_key(&block.command) {
            return Err(block.error(ParseErrorKind::DuplicateAttribute(block.command.clone())));
        }
        attributes.insert(block.command.clone(), block.arg.clone());
    }
    Ok(attributes)
}

fn read_delta(body: &[Block]) -> Result<Delta, ParseError> {
    let mut ops = Vec::with_capacity(body.len());
    for block in body {
        let op = match keyword(block) {
            Some("I") => {
                let value = InsertValue::from_json(&block.arg)
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| invalid(block, "a non-empty string or an embed object"))?;
                Operation::Insert {
                    value,
                    attributes: read_attributes(&block.body)?,
                }
            }
            Some("R") => Operation::Retain {
                count: read_count(block)?,
                attributes: read_attributes(&block.body)?,
            },
            Some("D") => {
                let count = read_count(block)?;
                expect_no_body(block)?;
                Operation::Delete { count }
            }
            _ => return Err(unknown(block, "delta")),
        };
        ops.push(op);
    }
    Ok(Delta::from_ops(ops))
}

fn read_theme(body: &[Block]) -> Result<Theme, ParseError> {
    let mut theme = Theme::new();
    for block in body {
        let key = ThemeKey::from_name(&block.command)
            .ok_or_else(|| block.error(ParseErrorKind::UnknownThemeKey(block.command.clone())))?;
        expect_no_body(block)?;
        if theme.get(key).is_some() {
            return Err(block.error(ParseErrorKind::DuplicateThemeKey(key.name().to_string())));
        }
        let mismatch = || {
            block.error(ParseErrorKind::ThemeTypeMismatch {
                key: key.name().to_string(),
                expected: key.property_type().name().to_string(),
            })
        };
        let value = ThemeValue::from_json(&block.arg)
            .filter(|value| value.property_type() == key.property_type())
            .ok_or_else(mismatch)?;
        theme.set(key, value).map_err(|_| mismatch())?;
    }
    Ok(theme)
}

/// Picks the named sub-blocks out of `parent`, each required exactly once.
fn named_children<'a, const N: usize>(
    parent: &'a Block,
    names: [&str; N],
) -> Result<[&'a Block; N], ParseError> {
    let mut found: [Option<&Block>; N] = [None; N];
    for block in &parent.body {
        let slot = keyword(block)
            .and_then(|name| names.iter().position(|candidate| *candidate == name))
            .ok_or_else(|| unknown(block, &parent.command))?;
        if found[slot].is_some() {
            return Err(block.error(ParseErrorKind::DuplicateBlock(block.command.clone())));
        }
        expect_no_arg(block)?;
        found[slot] = Some(block);
    }

    let mut children = [parent; N];
    for (index, slot) in found.into_iter().enumerate() {
        children[index] = slot.ok_or_else(|| {
            parent.error(ParseErrorKind::MissingBlock {
                parent: parent.command.clone(),
                child: names[index].to_string(),
            })
        })?;
    }
    Ok(children)
}

fn read_images(block: &Block) -> Result<ImageTable, ParseError> {
    let [lookup_block, data_block] = named_children(block, ["lookup", "data"])?;

    let mut data = Vec::with_capacity(data_block.body.len());
    for entry in &data_block.body {
        expect_no_body(entry)?;
        let hash = keyword(entry)
            .and_then(|command| command.parse::<i32>().ok())
            .ok_or_else(|| invalid(entry, "a decimal hash"))?;
        let value = entry
            .arg
            .as_str()
            .ok_or_else(|| invalid(entry, "a data URI string"))?;
        if content_hash(value) != hash {
            log::warn!("line {}: stored image hash {} does not match its data", entry.line, hash);
        }
        data.push(ImageData {
            hash,
            value: value.to_string(),
        });
    }

    let mut lookup = BTreeMap::new();
    for entry in &lookup_block.body {
        expect_no_body(entry)?;
        if !entry.quoted {
            return Err(invalid(entry, "a quoted source string"));
        }
        let id = entry
            .arg
            .as_u64()
            .and_then(|id| usize::try_from(id).ok())
            .filter(|&id| id < data.len())
            .ok_or_else(|| invalid(entry, "an existing image id"))?;
        if lookup.insert(entry.command.clone(), id).is_some() {
            return Err(entry.error(ParseErrorKind::DuplicateLookup(entry.command.clone())));
        }
    }

    Ok(ImageTable { lookup, data })
}

fn read_fonts(body: &[Block]) -> Result<FontTable, ParseError> {
    let mut fonts = FontTable::new();
    for block in body {
        expect_no_body(block)?;
        let data = block
            .arg
            .as_str()
            .ok_or_else(|| invalid(block, "a font data URI string"))?;
        if !is_valid_font_data(data) {
            log::warn!("line {}: font {:?} has malformed data", block.line, block.command);
        }
        if fonts.insert(block.command.clone(), data.to_string()).is_some() {
            return Err(block.error(ParseErrorKind::DuplicateFont(block.command.clone())));
        }
    }
    Ok(fonts)
}

fn read_range(block: &Block) -> Result<SelectionRange, ParseError> {
    let pair = match &block.arg {
        Value::Array(items) if items.len() == 2 => items
            .iter()
            .map(|item| item.as_u64().and_then(|n| usize::try_from(n).ok()))
            .collect::<Option<Vec<usize>>>(),
        _ => None,
    };
    match pair.as_deref() {
        Some(&[index, length]) => Ok(SelectionRange::new(index, length)),
        _ => Err(invalid(block, "[index, length]")),
    }
}

fn read_stack(block: &Block) -> Result<Vec<StackItem>, ParseError> {
    block
        .body
        .iter()
        .map(|entry| match keyword(entry) {
            Some("@") => Ok(StackItem {
                range: read_range(entry)?,
                delta: read_delta(&entry.body)?,
            }),
            _ => Err(unknown(entry, &block.command)),
        })
        .collect()
}

fn read_history(block: &Block) -> Result<History, ParseError> {
    let [undo, redo] = named_children(block, ["undo", "redo"])?;
    Ok(History {
        undo: read_stack(undo)?,
        redo: read_stack(redo)?,
    })
}

/// Parses a whole `.vox` file. Absent blocks take their empty defaults.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let blocks = parse_blocks(text)?;
    let mut seen = HashSet::new();
    let mut doc = Document::new();

    for block in &blocks {
        let name = keyword(block)
            .filter(|name| TOP_LEVEL.contains(name))
            .ok_or_else(|| unknown(block, "document"))?;
        if !seen.insert(name) {
            return Err(block.error(ParseErrorKind::DuplicateBlock(name.to_string())));
        }
        expect_no_arg(block)?;

        match name {
            "theme" => doc.theme = read_theme(&block.body)?,
            "delta" => doc.operations = read_delta(&block.body)?,
            "images" => doc.images = read_images(block)?,
            "fonts" => doc.fonts = read_fonts(&block.body)?,
            "history" => doc.history = read_history(block)?,
            _ => return Err(unknown(block, "document")),
        }
    }

    log::debug!(
        "parsed document: {} ops, {} theme keys, {} images, {} fonts",
        doc.operations.ops().len(),
        doc.theme.len(),
        doc.images.len(),
        doc.fonts.len()
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kind(text: &str) -> ParseErrorKind {
        parse(text).unwrap_err().kind
    }

    #[test]
    fn test_empty_text_is_blank_document() {
        let doc = parse("").unwrap();
        assert!(doc.is_blank());
        assert!(doc.history.is_empty());
    }

    #[test]
    fn test_duplicate_theme_block() {
        let err = parse("theme\ntheme\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DuplicateBlock("theme".to_string()));
        assert!(err.to_string().contains("duplicate theme block"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_unknown_top_level_command() {
        assert!(matches!(
            kind("title \"x\"\n"),
            ParseErrorKind::UnknownCommand { .. }
        ));
        assert!(matches!(
            kind("\"delta\"\n"),
            ParseErrorKind::UnknownCommand { .. }
        ));
    }

    #[test]
    fn test_top_level_arg_rejected() {
        assert!(matches!(kind("delta 1\n"), ParseErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_delta_ops() {
        let doc = parse("delta\n\tI \"Hi\"\n\t\tbold true\n\t\tcolor \"#f00\"\n\tR 2\n\tD 1\n\tI {\"image\": 0}\n")
            .unwrap();
        let ops = doc.operations.ops();
        assert_eq!(ops.len(), 4);
        let attributes = ops[0].attributes().unwrap();
        assert_eq!(attributes.keys().collect::<Vec<_>>(), ["bold", "color"]);
        assert_eq!(ops[1], Operation::retain(2));
        assert_eq!(ops[2], Operation::delete(1));
        assert_eq!(ops[3], Operation::embed("image", json!(0)));
    }

    #[test]
    fn test_duplicate_attribute() {
        let text = "delta\n\tI \"a\"\n\t\tbold true\n\t\tbold false\n";
        assert_eq!(kind(text), ParseErrorKind::DuplicateAttribute("bold".to_string()));
    }

    #[test]
    fn test_delete_rules() {
        assert!(matches!(kind("delta\n\tD \"3\"\n"), ParseErrorKind::InvalidArgument { .. }));
        assert!(matches!(kind("delta\n\tD 0\n"), ParseErrorKind::InvalidArgument { .. }));
        assert_eq!(
            kind("delta\n\tD 2\n\t\tbold true\n"),
            ParseErrorKind::UnexpectedBody("D".to_string())
        );
    }

    #[test]
    fn test_insert_rules() {
        assert!(matches!(kind("delta\n\tI \"\"\n"), ParseErrorKind::InvalidArgument { .. }));
        assert!(matches!(kind("delta\n\tI 5\n"), ParseErrorKind::InvalidArgument { .. }));
        assert!(matches!(kind("delta\n\tX 1\n"), ParseErrorKind::UnknownCommand { .. }));
    }

    #[test]
    fn test_theme_block() {
        let doc = parse("theme\n\tbaseFontSize {\"pt\": 11}\n\tlanguage \"fr\"\n").unwrap();
        assert_eq!(doc.theme.len(), 2);
        assert_eq!(
            doc.theme.get(ThemeKey::Language),
            Some(&ThemeValue::String("fr".to_string()))
        );
    }

    #[test]
    fn test_theme_errors() {
        assert_eq!(
            kind("theme\n\tlineHeight [1, 2, 3]\n"),
            ParseErrorKind::ThemeTypeMismatch {
                key: "lineHeight".to_string(),
                expected: "number".to_string(),
            }
        );
        assert_eq!(
            kind("theme\n\tfontColour [1, 2, 3]\n"),
            ParseErrorKind::UnknownThemeKey("fontColour".to_string())
        );
        assert_eq!(
            kind("theme\n\tlanguage \"a\"\n\tlanguage \"b\"\n"),
            ParseErrorKind::DuplicateThemeKey("language".to_string())
        );
    }

    #[test]
    fn test_images_block() {
        let value = "data:image/png;base64,AAAA";
        let text = format!(
            "images\n\tlookup\n\t\t\"https://example.test/a.png\" 0\n\tdata\n\t\t{} \"{}\"\n",
            content_hash(value),
            value
        );
        let doc = parse(&text).unwrap();
        assert_eq!(doc.images.data, vec![ImageData::new(value)]);
        assert_eq!(doc.images.lookup.get("https://example.test/a.png"), Some(&0));
    }

    #[test]
    fn test_images_errors() {
        assert!(matches!(
            kind("images\n\tlookup\n"),
            ParseErrorKind::MissingBlock { .. }
        ));
        assert_eq!(
            kind("images\n\tlookup\n\tlookup\n\tdata\n"),
            ParseErrorKind::DuplicateBlock("lookup".to_string())
        );
        assert!(matches!(
            kind("images\n\tlookup\n\t\t\"a\" 3\n\tdata\n"),
            ParseErrorKind::InvalidArgument { .. }
        ));
        assert!(matches!(
            kind("images\n\tlookup\n\tdata\n\t\tabc \"data:image/png;base64,\"\n"),
            ParseErrorKind::InvalidArgument { .. }
        ));
        let value = "data:image/png;base64,AA";
        let hash = content_hash(value);
        let text = format!(
            "images\n\tlookup\n\t\t\"a\" 0\n\t\t\"a\" 0\n\tdata\n\t\t{} \"{}\"\n",
            hash, value
        );
        assert_eq!(kind(&text), ParseErrorKind::DuplicateLookup("a".to_string()));
    }

    #[test]
    fn test_fonts_block() {
        let doc = parse("fonts\n\tLato \"data:font/ttf;base64,AAEAAA==\"\n\t\"Fira Sans\" \"data:font/otf;base64,T1RUTw==\"\n")
            .unwrap();
        assert_eq!(doc.fonts.len(), 2);
        assert!(doc.fonts.contains_key("Fira Sans"));
        assert_eq!(
            kind("fonts\n\tLato \"x\"\n\tLato \"y\"\n"),
            ParseErrorKind::DuplicateFont("Lato".to_string())
        );
        assert!(matches!(kind("fonts\n\tLato 3\n"), ParseErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_history_block() {
        let text = "history\n\tundo\n\t\t@ [3, 1]\n\t\t\tR 3\n\t\t\tI \"x\"\n\tredo\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.history.undo.len(), 1);
        assert_eq!(doc.history.undo[0].range, SelectionRange::new(3, 1));
        assert_eq!(doc.history.undo[0].delta.ops().len(), 2);
        assert!(doc.history.redo.is_empty());
    }

    #[test]
    fn test_history_errors() {
        assert!(matches!(
            kind("history\n\tundo\n\t\t@ [1]\n\tredo\n"),
            ParseErrorKind::InvalidArgument { .. }
        ));
        assert!(matches!(
            kind("history\n\tundo\n\t\tentry [1, 2]\n\tredo\n"),
            ParseErrorKind::UnknownCommand { .. }
        ));
        assert!(matches!(
            kind("history\n\tredo\n"),
            ParseErrorKind::MissingBlock { .. }
        ));
    }
}
