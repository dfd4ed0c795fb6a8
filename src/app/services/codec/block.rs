//! Line tokenizer and block tree for the tab-indented `.vox` grammar.

use serde_json::Value;

use crate::app::infrastructure::error::{ParseError, ParseErrorKind};

/// One node of the parsed file: a command, its JSON argument and the
/// lines indented beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub command: String,
    /// The command was written as a JSON string literal.
    pub quoted: bool,
    pub arg: Value,
    pub body: Vec<Block>,
    /// 1-based source line.
    pub line: usize,
}

impl Block {
    pub(crate) fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.line, kind)
    }
}

#[derive(Debug)]
struct Line {
    depth: usize,
    command: String,
    quoted: bool,
    arg: Value,
    number: usize,
}

/// Byte index just past the closing quote of a JSON string starting at 0.
fn quoted_token_end(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, ch) in text.char_indices().skip(1) {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(index + 1),
            _ => {}
        }
    }
    None
}

fn split_line(raw: &str, number: usize) -> Result<Option<Line>, ParseError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let depth = raw.chars().take_while(|&ch| ch == '\t').count();
    let content = raw[depth..].trim();

    let (command, quoted, rest) = if content.starts_with('"') {
        let end = quoted_token_end(content)
            .ok_or_else(|| ParseError::new(number, ParseErrorKind::UnterminatedCommand))?;
        let command: String = serde_json::from_str(&content[..end]).map_err(|e| {
            ParseError::new(
                number,
                ParseErrorKind::InvalidJson {
                    command: content[..end].to_string(),
                    message: e.to_string(),
                },
            )
        })?;
        (command, true, &content[end..])
    } else {
        match content.find(char::is_whitespace) {
            Some(split) => (content[..split].to_string(), false, &content[split..]),
            None => (content.to_string(), false, ""),
        }
    };

    let rest = rest.trim();
    let arg = if rest.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(rest).map_err(|e| {
            ParseError::new(
                number,
                ParseErrorKind::InvalidJson {
                    command: command.clone(),
                    message: e.to_string(),
                },
            )
        })?
    };

    Ok(Some(Line {
        depth,
        command,
        quoted,
        arg,
        number,
    }))
}

/// Consumes lines at `depth` or deeper. Stops, without consuming, at the
/// first shallower line.
fn parse_body(lines: &[Line], cursor: &mut usize, depth: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    while let Some(line) = lines.get(*cursor) {
        if line.depth < depth {
            break;
        }
        *cursor += 1;
        let body = match lines.get(*cursor) {
            Some(next) if next.depth > line.depth => parse_body(lines, cursor, next.depth),
            _ => Vec::new(),
        };
        blocks.push(Block {
            command: line.command.clone(),
            quoted: line.quoted,
            arg: line.arg.clone(),
            body,
            line: line.number,
        });
    }
    blocks
}

/// Splits `text` into top-level blocks. Blank lines are dropped entirely.
pub fn parse_blocks(text: &str) -> Result<Vec<Block>, ParseError> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        if let Some(line) = split_line(raw, index + 1)? {
            lines.push(line);
        }
    }
    let mut cursor = 0;
    Ok(parse_body(&lines, &mut cursor, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_and_arg() {
        let blocks = parse_blocks("I \"Hello world\"\nD 3\ntheme").unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].command, "I");
        assert_eq!(blocks[0].arg, json!("Hello world"));
        assert_eq!(blocks[1].arg, json!(3));
        assert_eq!(blocks[2].arg, Value::Null);
    }

    #[test]
    fn test_nested_bodies() {
        let text = "delta\n\tI \"a\"\n\t\tbold true\n\tD 1\nfonts\n";
        let blocks = parse_blocks(text).unwrap();
        assert_eq!(blocks.len(), 2);
        let delta = &blocks[0];
        assert_eq!(delta.body.len(), 2);
        assert_eq!(delta.body[0].body[0].command, "bold");
        assert_eq!(delta.body[0].body[0].arg, json!(true));
        assert!(delta.body[1].body.is_empty());
        assert!(blocks[1].body.is_empty());
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let text = "delta\n\n   \n\tI \"a\"\n\t\n\tD 1\n";
        let blocks = parse_blocks(text).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body.len(), 2);
        assert_eq!(blocks[0].body[1].line, 6);
    }

    #[test]
    fn test_quoted_command_with_spaces() {
        let blocks = parse_blocks("\"https://example.test/a b.png\" 0").unwrap();
        assert_eq!(blocks[0].command, "https://example.test/a b.png");
        assert!(blocks[0].quoted);
        assert_eq!(blocks[0].arg, json!(0));

        let blocks = parse_blocks("\"say \\\"hi\\\"\" 1").unwrap();
        assert_eq!(blocks[0].command, "say \"hi\"");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_blocks("\"open 1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedCommand);
    }

    #[test]
    fn test_invalid_json_argument() {
        let err = parse_blocks("delta\n\tI {not json}").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::InvalidJson { .. }));
    }

    #[test]
    fn test_shallower_line_ends_body() {
        let text = "a\n\t\tb\n\tc\nd";
        let blocks = parse_blocks(text).unwrap();
        // `b` opens a body at depth 2; `c` is shallower so it returns to `a`'s level.
        assert_eq!(blocks.iter().map(|b| b.command.as_str()).collect::<Vec<_>>(), ["a", "c", "d"]);
        assert_eq!(blocks[0].body[0].command, "b");
    }
}
