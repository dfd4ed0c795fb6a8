//! Passes over finished HTML.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::app::domain::settings::PostProcess;

/// Whitespace between two tags that spans a line break. Spaces on a single
/// line separate inline elements and are content.
static BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">[ \t\r]*\n\s*<").expect("inter-tag pattern is valid"));

const BLOCK_TAGS: &[&str] = &[
    "!doctype", "html", "head", "meta", "title", "style", "body", "div", "p", "h1", "h2", "h3",
    "h4", "h5", "h6",
];

const VOID_TAGS: &[&str] = &["!doctype", "meta"];

const INDENT: &str = "  ";

pub fn apply(markup: String, mode: PostProcess) -> String {
    match mode {
        PostProcess::None => markup,
        PostProcess::Minify => minify(&markup),
        PostProcess::Pretty => pretty(&markup),
    }
}

/// Drops line-breaking whitespace between adjacent tags.
pub fn minify(html: &str) -> String {
    BETWEEN_TAGS.replace_all(html.trim(), "><").into_owned()
}

enum Token<'a> {
    Tag { name: String, closing: bool, raw: &'a str },
    Text(&'a str),
}

fn tag_name(raw: &str) -> (String, bool) {
    let inner = raw.trim_start_matches('<');
    let closing = inner.starts_with('/');
    let name: String = inner
        .trim_start_matches('/')
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
        .collect();
    (name.to_ascii_lowercase(), closing)
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = html;

    while let Some(tag_start) = rest.find('<') {
        if tag_start > 0 {
            tokens.push(Token::Text(&rest[..tag_start]));
        }
        let tag_content = &rest[tag_start..];
        let tag_end = match tag_content.find('>') {
            Some(end) => end + 1,
            None => {
                tokens.push(Token::Text(tag_content));
                return tokens;
            }
        };
        let raw = &tag_content[..tag_end];
        let (name, closing) = tag_name(raw);
        tokens.push(Token::Tag { name, closing, raw });
        rest = &tag_content[tag_end..];
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    tokens
}

struct Printer {
    out: String,
    depth: usize,
    line_open: bool,
}

impl Printer {
    fn end_line(&mut self) {
        if self.line_open {
            self.out.push('\n');
            self.line_open = false;
        }
    }

    fn own_line(&mut self, raw: &str) {
        self.end_line();
        self.out.push_str(&INDENT.repeat(self.depth));
        self.out.push_str(raw);
        self.out.push('\n');
    }

    fn inline(&mut self, raw: &str) {
        if !self.line_open {
            self.out.push_str(&INDENT.repeat(self.depth));
            self.line_open = true;
        }
        self.out.push_str(raw);
    }
}

/// Puts each block-level tag on its own line, indenting children by two spaces.
/// Inline content of a block sits on one line beneath it.
pub fn pretty(html: &str) -> String {
    let mut printer = Printer {
        out: String::with_capacity(html.len() * 2),
        depth: 0,
        line_open: false,
    };

    for token in tokenize(&minify(html)) {
        match token {
            Token::Tag { name, closing, raw } if BLOCK_TAGS.contains(&name.as_str()) => {
                if closing {
                    printer.end_line();
                    printer.depth = printer.depth.saturating_sub(1);
                    printer.own_line(raw);
                } else {
                    printer.own_line(raw);
                    if !VOID_TAGS.contains(&name.as_str()) {
                        printer.depth += 1;
                    }
                }
            }
            Token::Tag { raw, .. } => printer.inline(raw),
            // Multi-line text only occurs inside <style>.
            Token::Text(text) if text.contains('\n') => {
                for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
                    printer.own_line(line);
                }
            }
            Token::Text(text) => {
                let text = if printer.line_open { text } else { text.trim_start() };
                if !text.is_empty() {
                    printer.inline(text);
                }
            }
        }
    }
    printer.end_line();
    printer.out
}
