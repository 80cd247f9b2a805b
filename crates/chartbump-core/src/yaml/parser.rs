//! Indentation-driven block parser
//!
//! Input is first checked with `serde_yaml` so malformed streams are rejected
//! with its diagnostics. The checked text is then walked line by line to build
//! a [`Node`] tree that still carries comments and scalar styles.

use serde::Deserialize;

use super::flow::{FlowParser, flow_extent, strip_flow_comment};
use super::node::{Node, ScalarStyle};
use super::scalar::{decode_double_quoted, decode_single_quoted, quoted_end};
use crate::error::{CoreError, Result};

/// Parse every document in a YAML stream
pub fn parse(input: &str) -> Result<Vec<Node>> {
    check_well_formed(input)?;

    split_documents(input)
        .into_iter()
        .map(|source| Parser::new(source.lines).document())
        .collect()
}

fn check_well_formed(input: &str) -> Result<()> {
    for document in serde_yaml::Deserializer::from_str(input) {
        serde_yaml::Value::deserialize(document)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    /// Text after the leading spaces, trailing whitespace removed
    text: &'a str,
}

impl<'a> Line<'a> {
    fn new(number: usize, raw: &'a str) -> Self {
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        Self {
            number,
            indent,
            text: raw[indent..].trim_end(),
        }
    }

    fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    fn is_comment(&self) -> bool {
        self.text.trim_start().starts_with('#')
    }

    fn is_content(&self) -> bool {
        !self.is_blank() && !self.is_comment()
    }
}

#[derive(Default)]
struct Source<'a> {
    lines: Vec<Line<'a>>,
    explicit: bool,
}

impl Source<'_> {
    fn exists(&self) -> bool {
        self.explicit || self.lines.iter().any(Line::is_content)
    }
}

fn marker_rest<'a>(raw: &'a str, marker: &str) -> Option<&'a str> {
    let rest = raw.strip_prefix(marker)?;
    (rest.is_empty() || rest.starts_with([' ', '\t'])).then_some(rest)
}

/// Split a stream on `---` and `...` markers
///
/// Comments above the first `---` belong to the document that follows it.
fn split_documents(input: &str) -> Vec<Source<'_>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut documents = Vec::new();
    let mut current = Source::default();

    for (idx, raw) in input.lines().enumerate() {
        let number = idx + 1;

        if let Some(rest) = marker_rest(raw, "---") {
            let carried = if current.exists() {
                documents.push(std::mem::take(&mut current));
                Vec::new()
            } else {
                std::mem::take(&mut current.lines)
            };
            current = Source {
                lines: carried,
                explicit: true,
            };
            let rest = rest.trim();
            if !rest.is_empty() {
                current.lines.push(Line::new(number, rest));
            }
            continue;
        }

        if marker_rest(raw, "...").is_some() {
            if current.exists() {
                documents.push(std::mem::take(&mut current));
            }
            current = Source::default();
            continue;
        }

        if raw.starts_with('%') && !current.exists() {
            continue;
        }

        current.lines.push(Line::new(number, raw));
    }

    if current.exists() {
        documents.push(current);
    }
    documents
}

fn join_comment(lines: Vec<String>) -> Option<String> {
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn merge_comments(first: Option<String>, second: Option<String>) -> Option<String> {
    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{}\n{}", a, b)),
        (a, b) => a.or(b),
    }
}

fn comment_text(text: &str) -> Option<String> {
    text.starts_with('#').then(|| text.to_string())
}

/// Put a comment found after a key or dash onto the node it introduces
fn attach_line_comment(node: &mut Node, comment: String) {
    node.line_comment = Some(match node.line_comment.take() {
        Some(existing) => format!("{} {}", comment, existing),
        None => comment,
    });
}

fn split_token(text: &str) -> (&str, &str) {
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    (&text[..end], &text[end..])
}

/// Split leading anchors and tags off a value
fn split_properties(text: &str) -> (Option<String>, &str) {
    let mut props = Vec::new();
    let mut rest = text;
    while rest.starts_with('&') || rest.starts_with('!') {
        let (token, tail) = split_token(rest);
        props.push(token);
        rest = tail.trim_start();
    }
    ((!props.is_empty()).then(|| props.join(" ")), rest)
}

fn is_sequence_entry(text: &str) -> bool {
    text == "-" || text.starts_with("- ") || text.starts_with("-\t")
}

/// Byte index of the `:` separating a block mapping key from its value
pub(crate) fn find_mapping_colon(text: &str) -> Option<usize> {
    if text.starts_with('"') || text.starts_with('\'') {
        let end = quoted_end(text)?;
        let after = &text[end..];
        let trimmed = after.trim_start();
        let rest = trimmed.strip_prefix(':')?;
        return (rest.is_empty() || rest.starts_with([' ', '\t']))
            .then_some(end + after.len() - trimmed.len());
    }

    if text.starts_with(['[', '{', '|', '>', '#']) {
        return None;
    }

    let mut prev_space = false;
    for (i, c) in text.char_indices() {
        if c == '#' && prev_space {
            return None;
        }
        if c == ':' {
            let next = text[i + 1..].chars().next();
            if next.is_none_or(char::is_whitespace) {
                return Some(i);
            }
        }
        prev_space = c.is_whitespace();
    }
    None
}

/// Split a plain scalar from its trailing comment
fn split_plain_comment(text: &str) -> (&str, Option<&str>) {
    let mut prev_space = false;
    for (i, c) in text.char_indices() {
        if c == '#' && prev_space {
            return (text[..i].trim_end(), Some(&text[i..]));
        }
        prev_space = c.is_whitespace();
    }
    (text, None)
}

fn trailing_comment(rest: &str, line: usize, what: &str) -> Result<Option<String>> {
    let rest = rest.trim_start();
    if rest.is_empty() {
        Ok(None)
    } else if rest.starts_with('#') {
        Ok(Some(rest.to_string()))
    } else {
        Err(CoreError::parse(format!("unexpected characters after {}", what), line))
    }
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    /// Comment lines waiting for the next node
    pending: Vec<String>,
}

impl<'a> Parser<'a> {
    fn new(lines: Vec<Line<'a>>) -> Self {
        Self {
            lines,
            pos: 0,
            pending: Vec::new(),
        }
    }

    fn document(mut self) -> Result<Node> {
        let head = self.leading_comments();

        if !self.lines[self.pos..].iter().any(Line::is_content) {
            self.skip_trivia();
            let mut foot = head;
            foot.append(&mut self.pending);
            let mut doc = Node::document(Node::scalar(""));
            doc.foot_comment = join_comment(foot);
            return Ok(doc);
        }

        let root = self.block(-1)?;

        self.skip_trivia();
        if let Some(line) = self.lines.get(self.pos) {
            return Err(CoreError::parse(
                format!("unexpected content '{}'", line.text),
                line.number,
            ));
        }

        let mut doc = Node::document(root);
        doc.head_comment = join_comment(head);
        doc.foot_comment = join_comment(std::mem::take(&mut self.pending));
        Ok(doc)
    }

    /// Comment groups separated from the first node by a blank line
    fn leading_comments(&mut self) -> Vec<String> {
        let mut head = Vec::new();

        while let Some(line) = self.lines.get(self.pos).copied() {
            if line.is_blank() {
                if !self.pending.is_empty() {
                    head.append(&mut self.pending);
                    head.push(String::new());
                }
            } else if line.is_comment() {
                self.pending.push(line.text.trim_start().to_string());
            } else {
                break;
            }
            self.pos += 1;
        }

        while head.last().is_some_and(String::is_empty) {
            head.pop();
        }
        head
    }

    fn skip_trivia(&mut self) {
        while let Some(line) = self.lines.get(self.pos).copied() {
            if line.is_comment() {
                self.pending.push(line.text.trim_start().to_string());
            } else if !line.is_blank() {
                break;
            }
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Result<Option<Line<'a>>> {
        self.skip_trivia();
        match self.lines.get(self.pos).copied() {
            Some(line) if line.text.starts_with('\t') => Err(CoreError::parse(
                "tab characters must not be used for indentation",
                line.number,
            )),
            other => Ok(other),
        }
    }

    fn take_pending(&mut self) -> Option<String> {
        join_comment(std::mem::take(&mut self.pending))
    }

    /// Parse the node starting on the next content line, if it is indented
    /// deeper than `parent`
    fn block(&mut self, parent: isize) -> Result<Node> {
        let Some(line) = self.peek()? else {
            return Ok(Node::scalar(""));
        };
        if line.indent as isize <= parent {
            return Ok(Node::scalar(""));
        }

        if is_sequence_entry(line.text) {
            return self.sequence(line.indent);
        }
        if is_explicit_key(line.text) {
            return Err(CoreError::parse(EXPLICIT_KEY, line.number));
        }
        if find_mapping_colon(line.text).is_some() {
            return self.mapping(line.indent);
        }

        let comment = self.take_pending();
        self.pos += 1;

        let (properties, text) = split_properties(line.text);
        let mut node = if text.is_empty() || text.starts_with('#') {
            let mut node = self.block(parent)?;
            if let Some(c) = comment_text(text) {
                attach_line_comment(&mut node, c);
            }
            node
        } else {
            self.inline(text, line, parent)?
        };

        if properties.is_some() {
            node.properties = properties;
        }
        node.head_comment = merge_comments(comment, node.head_comment.take());
        Ok(node)
    }

    fn sequence(&mut self, indent: usize) -> Result<Node> {
        let mut seq = Node::sequence();

        while let Some(line) = self.peek()? {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(CoreError::parse(
                    "bad indentation of a sequence entry",
                    line.number,
                ));
            }
            if !is_sequence_entry(line.text) {
                break;
            }

            let comment = self.take_pending();
            let content = line.text[1..].trim_start();

            let mut item = if content.is_empty() || content.starts_with('#') {
                self.pos += 1;
                let mut item = self.block(indent as isize)?;
                if let Some(c) = comment_text(content) {
                    attach_line_comment(&mut item, c);
                }
                item
            } else {
                // Re-read the rest of the entry as if it started its own line
                let offset = line.text.len() - content.len();
                self.lines[self.pos] = Line {
                    number: line.number,
                    indent: indent + offset,
                    text: content,
                };
                self.block(indent as isize)?
            };

            item.head_comment = merge_comments(comment, item.head_comment.take());
            seq.children.push(item);
        }

        Ok(seq)
    }

    fn mapping(&mut self, indent: usize) -> Result<Node> {
        let mut map = Node::mapping();

        while let Some(line) = self.peek()? {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(CoreError::parse("unexpected indentation", line.number));
            }

            if is_explicit_key(line.text) {
                return Err(CoreError::parse(EXPLICIT_KEY, line.number));
            }
            let colon = find_mapping_colon(line.text)
                .filter(|_| !is_sequence_entry(line.text))
                .ok_or_else(|| CoreError::parse("expected a mapping key", line.number))?;

            let mut key = parse_key(line.text[..colon].trim_end(), line.number)?;
            key.head_comment = self.take_pending();
            self.pos += 1;

            let value = self.value(line.text[colon + 1..].trim_start(), line, indent)?;
            map.children.push(key);
            map.children.push(value);
        }

        Ok(map)
    }

    /// Parse the value following `key:`; the key line is already consumed
    fn value(&mut self, rest: &'a str, line: Line<'a>, key_indent: usize) -> Result<Node> {
        let (properties, text) = split_properties(rest);

        let mut value = if text.is_empty() || text.starts_with('#') {
            // A sequence may sit at the same indentation as its key
            let mut value = match self.peek()? {
                Some(next) if next.indent == key_indent && is_sequence_entry(next.text) => {
                    self.sequence(key_indent)?
                }
                _ => self.block(key_indent as isize)?,
            };
            if let Some(c) = comment_text(text) {
                attach_line_comment(&mut value, c);
            }
            value
        } else {
            self.inline(text, line, key_indent as isize)?
        };

        if properties.is_some() {
            value.properties = properties;
        }
        Ok(value)
    }

    /// Parse a value that starts on an already consumed line
    fn inline(&mut self, text: &'a str, line: Line<'a>, parent: isize) -> Result<Node> {
        match text.as_bytes()[0] {
            b'|' | b'>' => self.block_scalar(text, line, parent),
            b'"' | b'\'' => self.quoted(text, line),
            b'[' | b'{' => self.flow(text, line),
            b'*' => {
                let (name, rest) = split_token(&text[1..]);
                let mut node = Node::styled_scalar(name, ScalarStyle::Alias);
                node.line_comment = trailing_comment(rest, line.number, "alias")?;
                Ok(node)
            }
            _ => self.plain(text, line, parent),
        }
    }

    fn plain(&mut self, text: &str, line: Line<'a>, parent: isize) -> Result<Node> {
        let (first, mut comment) = split_plain_comment(text);
        let mut value = first.to_string();

        while comment.is_none() {
            let Some(next) = self.lines.get(self.pos).copied() else {
                break;
            };
            if !next.is_content() || next.indent as isize <= parent {
                break;
            }
            if find_mapping_colon(next.text).is_some() {
                return Err(CoreError::parse(
                    "mapping values are not allowed in this context",
                    next.number,
                ));
            }
            let (more, more_comment) = split_plain_comment(next.text);
            value.push(' ');
            value.push_str(more);
            comment = more_comment;
            self.pos += 1;
        }

        let mut node = Node::scalar(value);
        node.line_comment = comment.map(str::to_string);
        if node.value.is_empty() {
            return Err(CoreError::parse("expected a scalar value", line.number));
        }
        Ok(node)
    }

    fn quoted(&mut self, text: &str, line: Line<'a>) -> Result<Node> {
        let mut buf = text.to_string();

        let end = loop {
            if let Some(end) = quoted_end(&buf) {
                break end;
            }
            let Some(next) = self.lines.get(self.pos).copied() else {
                return Err(CoreError::parse("unterminated quoted scalar", line.number));
            };
            self.pos += 1;
            if next.is_blank() {
                buf.push('\n');
            } else {
                if !buf.ends_with('\n') {
                    buf.push(' ');
                }
                buf.push_str(next.text.trim_start());
            }
        };

        let inner = &buf[1..end - 1];
        let mut node = if buf.starts_with('"') {
            Node::styled_scalar(decode_double_quoted(inner), ScalarStyle::DoubleQuoted)
        } else {
            Node::styled_scalar(decode_single_quoted(inner), ScalarStyle::SingleQuoted)
        };
        node.line_comment = trailing_comment(&buf[end..], line.number, "quoted scalar")?;
        Ok(node)
    }

    fn flow(&mut self, text: &str, line: Line<'a>) -> Result<Node> {
        let (buf, end) = match flow_extent(text) {
            Some(end) => (text.to_string(), end),
            None => {
                let mut buf = strip_flow_comment(text).to_string();
                let end = loop {
                    if let Some(end) = flow_extent(&buf) {
                        break end;
                    }
                    let Some(next) = self.lines.get(self.pos).copied() else {
                        return Err(CoreError::parse(
                            "unterminated flow collection",
                            line.number,
                        ));
                    };
                    self.pos += 1;
                    if next.is_content() {
                        buf.push(' ');
                        buf.push_str(strip_flow_comment(next.text.trim_start()));
                    }
                };
                (buf, end)
            }
        };

        let mut node = FlowParser::new(&buf[..end], line.number).parse()?;
        node.line_comment = trailing_comment(&buf[end..], line.number, "flow collection")?;
        Ok(node)
    }

    fn block_scalar(&mut self, text: &str, line: Line<'a>, parent: isize) -> Result<Node> {
        let (header, rest) = split_token(text);
        let indicator = &header[..1];

        let mut chomp = "";
        let mut explicit = None;
        for c in header[1..].chars() {
            match c {
                '-' => chomp = "-",
                '+' => chomp = "+",
                '1'..='9' => explicit = c.to_digit(10).map(|d| d as usize),
                _ => {
                    return Err(CoreError::parse(
                        format!("invalid block scalar header '{}'", header),
                        line.number,
                    ));
                }
            }
        }
        let line_comment = trailing_comment(rest, line.number, "block scalar header")?;

        let mut block_indent = explicit.map(|d| parent.max(0) as usize + d);
        let mut content: Vec<String> = Vec::new();

        while let Some(next) = self.lines.get(self.pos).copied() {
            if next.is_blank() {
                content.push(String::new());
                self.pos += 1;
                continue;
            }
            if next.indent as isize <= parent {
                break;
            }
            let indent = *block_indent.get_or_insert(next.indent);
            if next.indent < indent {
                break;
            }
            content.push(format!("{}{}", " ".repeat(next.indent - indent), next.text));
            self.pos += 1;
        }

        let mut trailing = 0;
        while content.last().is_some_and(String::is_empty) {
            content.pop();
            trailing += 1;
        }

        let mut value = if indicator == "|" {
            content.join("\n")
        } else {
            fold(&content)
        };
        match chomp {
            "-" => {}
            "+" if content.is_empty() => value.push_str(&"\n".repeat(trailing)),
            "+" => value.push_str(&"\n".repeat(trailing + 1)),
            _ if !content.is_empty() => value.push('\n'),
            _ => {}
        }

        let header = format!("{}{}", indicator, chomp);
        let style = if indicator == "|" {
            ScalarStyle::Literal { header }
        } else {
            ScalarStyle::Folded {
                header,
                lines: content.join("\n"),
            }
        };
        let mut node = Node::styled_scalar(value, style);
        node.line_comment = line_comment;
        Ok(node)
    }
}

/// Apply `>` line folding to block content with trailing blank lines removed
///
/// A break between two text lines becomes a space; blank lines stand for
/// themselves. Breaks next to more-indented lines are kept.
fn fold(lines: &[String]) -> String {
    let mut out = String::new();
    let mut previous: Option<bool> = None;
    let mut blanks = 0;

    for line in lines {
        if line.is_empty() {
            blanks += 1;
            continue;
        }
        let more_indented = line.starts_with([' ', '\t']);
        match previous {
            Some(prev_more) if prev_more || more_indented => {
                out.push_str(&"\n".repeat(blanks + 1));
            }
            Some(_) if blanks > 0 => out.push_str(&"\n".repeat(blanks)),
            Some(_) => out.push(' '),
            None => out.push_str(&"\n".repeat(blanks)),
        }
        out.push_str(line);
        previous = Some(more_indented);
        blanks = 0;
    }
    out
}

const EXPLICIT_KEY: &str = "explicit mapping keys ('? key') are not supported";

fn is_explicit_key(text: &str) -> bool {
    text == "?" || text.starts_with("? ") || text.starts_with("?\t")
}

fn parse_key(text: &str, line: usize) -> Result<Node> {
    let inner = |text: &str| text[1..text.len() - 1].to_string();

    if text.starts_with('"') && text.len() >= 2 {
        Ok(Node::styled_scalar(
            decode_double_quoted(&inner(text)),
            ScalarStyle::DoubleQuoted,
        ))
    } else if text.starts_with('\'') && text.len() >= 2 {
        Ok(Node::styled_scalar(
            decode_single_quoted(&inner(text)),
            ScalarStyle::SingleQuoted,
        ))
    } else if text.starts_with(['[', '{', '?']) {
        Err(CoreError::parse("complex mapping keys are not supported", line))
    } else {
        Ok(Node::scalar(text))
    }
}
