//! Block-style YAML writer
//!
//! Output uses two-space indentation. Comments, key order, scalar quoting
//! and flow collections are written back as stored on the nodes.

use super::node::{Node, NodeKind, ScalarStyle};
use super::scalar::{encode_double_quoted, encode_single_quoted, is_plain_safe};
use crate::error::{CoreError, Result};

/// Serialize documents to a YAML stream, separated by `---`
pub fn serialize(docs: &[Node]) -> Result<String> {
    let mut emitter = Emitter::default();

    for (index, doc) in docs.iter().enumerate() {
        validate_document(doc)?;
        if index > 0 || is_null_document(doc) {
            emitter.out.push_str("---\n");
        }
        emitter.document(doc);
    }

    Ok(emitter.out)
}

fn validate_document(doc: &Node) -> Result<()> {
    if doc.kind != NodeKind::Document {
        return Err(CoreError::serialize(format!(
            "expected a document node, found {:?}",
            doc.kind
        )));
    }
    if doc.children.len() != 1 {
        return Err(CoreError::serialize(format!(
            "document must have exactly one root node, found {}",
            doc.children.len()
        )));
    }
    validate_node(&doc.children[0])
}

fn validate_node(node: &Node) -> Result<()> {
    match node.kind {
        NodeKind::Document => Err(CoreError::serialize("document nested inside a document")),
        NodeKind::Scalar if !node.children.is_empty() => {
            Err(CoreError::serialize("scalar node cannot have children"))
        }
        NodeKind::Scalar => Ok(()),
        NodeKind::Mapping => {
            if node.children.len() % 2 != 0 {
                return Err(CoreError::serialize(
                    "mapping node must have an even number of children",
                ));
            }
            for (key, value) in node.entries() {
                if !key.is_scalar() {
                    return Err(CoreError::serialize("mapping keys must be scalars"));
                }
                validate_node(key)?;
                validate_node(value)?;
            }
            Ok(())
        }
        NodeKind::Sequence => node.children.iter().try_for_each(validate_node),
    }
}

fn is_null_document(doc: &Node) -> bool {
    let root = doc.root();
    root.is_scalar()
        && root.value.is_empty()
        && root.style == ScalarStyle::Plain
        && root.properties.is_none()
}

fn is_block_collection(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Mapping | NodeKind::Sequence)
        && !node.flow
        && !node.children.is_empty()
}

/// A block collection that can start on the same line as its `- `
fn is_compact(node: &Node) -> bool {
    is_block_collection(node) && node.properties.is_none() && node.line_comment.is_none()
}

/// Comments of the first entries in a chain of compact collections. They
/// are written above the `- ` line since nothing may precede the entry on
/// that line.
fn hoisted_comments(item: &Node) -> Vec<&str> {
    let mut comments = Vec::new();
    let mut node = item;
    while is_compact(node) {
        let first = &node.children[0];
        if let Some(c) = &first.head_comment {
            comments.push(c.as_str());
        }
        if node.is_mapping() {
            break;
        }
        node = first;
    }
    comments
}

fn comment_line(comment: &str) -> String {
    if comment.starts_with('#') {
        comment.to_string()
    } else {
        format!("# {}", comment)
    }
}

fn key_repr(key: &Node) -> String {
    match &key.style {
        ScalarStyle::SingleQuoted if !key.value.contains('\n') => encode_single_quoted(&key.value),
        ScalarStyle::Alias => format!("*{}", key.value),
        ScalarStyle::Plain if is_plain_safe(&key.value, false) => key.value.clone(),
        _ => encode_double_quoted(&key.value),
    }
}

fn scalar_repr(node: &Node, flow: bool) -> String {
    let value = &node.value;
    match &node.style {
        ScalarStyle::Plain if value.is_empty() => String::new(),
        ScalarStyle::Plain if is_plain_safe(value, flow) => value.clone(),
        ScalarStyle::SingleQuoted if !value.contains('\n') => encode_single_quoted(value),
        ScalarStyle::Alias => format!("*{}", value),
        _ => encode_double_quoted(value),
    }
}

/// Header for a block scalar; an indentation indicator is added when the
/// content itself starts with spaces
fn block_header(header: &str, value: &str) -> String {
    let leading_space = value
        .split('\n')
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with(' '));
    if leading_space && !header.is_empty() {
        format!("{}2{}", &header[..1], &header[1..])
    } else {
        header.to_string()
    }
}

fn flow_repr(node: &Node) -> String {
    match node.kind {
        NodeKind::Sequence => {
            let items: Vec<String> = node
                .children
                .iter()
                .map(|item| {
                    let repr = flow_item(item);
                    if repr.is_empty() { "null".to_string() } else { repr }
                })
                .collect();
            format!("[{}]", items.join(", "))
        }
        NodeKind::Mapping => {
            let entries: Vec<String> = node
                .entries()
                .map(|(key, value)| {
                    let key = flow_key(key);
                    match flow_item(value) {
                        repr if repr.is_empty() => key,
                        repr => format!("{}: {}", key, repr),
                    }
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        _ => scalar_repr(node, true),
    }
}

fn flow_key(key: &Node) -> String {
    match &key.style {
        ScalarStyle::Plain if is_plain_safe(&key.value, true) => key.value.clone(),
        ScalarStyle::Plain => encode_double_quoted(&key.value),
        _ => scalar_repr(key, true),
    }
}

fn flow_item(node: &Node) -> String {
    let repr = match node.kind {
        NodeKind::Mapping | NodeKind::Sequence => flow_repr(node),
        _ => scalar_repr(node, true),
    };
    match &node.properties {
        Some(props) if repr.is_empty() => props.clone(),
        Some(props) => format!("{} {}", props, repr),
        None => repr,
    }
}

/// Where a value is being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Document root, at the start of a line
    Root,
    /// After `key:`
    Value,
    /// After `-`; head comments are already written
    Item,
}

#[derive(Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat_n(' ', indent));
    }

    fn comment(&mut self, text: &str, indent: usize) {
        for line in text.split('\n') {
            if line.trim().is_empty() {
                self.out.push('\n');
            } else {
                self.pad(indent);
                self.out.push_str(&comment_line(line));
                self.out.push('\n');
            }
        }
    }

    fn finish_line(&mut self, parts: &[String], line_start: bool) {
        if parts.is_empty() {
            if !line_start {
                self.out.push('\n');
            }
            return;
        }
        if !line_start {
            self.out.push(' ');
        }
        self.out.push_str(&parts.join(" "));
        self.out.push('\n');
    }

    fn document(&mut self, doc: &Node) {
        if let Some(head) = &doc.head_comment {
            self.comment(head, 0);
            self.out.push('\n');
        }
        self.value(doc.root(), 0, Position::Root);
        if let Some(foot) = &doc.foot_comment {
            self.comment(foot, 0);
        }
    }

    fn mapping(&mut self, node: &Node, indent: usize, inline_first: bool) {
        for (i, (key, value)) in node.entries().enumerate() {
            if !(inline_first && i == 0) {
                if let Some(c) = &key.head_comment {
                    self.comment(c, indent);
                }
                self.pad(indent);
            }
            self.out.push_str(&key_repr(key));
            self.out.push(':');
            self.value(value, indent, Position::Value);
        }
    }

    fn sequence(&mut self, node: &Node, indent: usize, inline_first: bool) {
        for (i, item) in node.children.iter().enumerate() {
            if !(inline_first && i == 0) {
                if let Some(c) = &item.head_comment {
                    self.comment(c, indent);
                }
                for c in hoisted_comments(item) {
                    self.comment(c, indent);
                }
                self.pad(indent);
            }
            self.out.push('-');
            if is_compact(item) {
                self.out.push(' ');
                if item.is_mapping() {
                    self.mapping(item, indent + 2, true);
                } else {
                    self.sequence(item, indent + 2, true);
                }
            } else {
                self.value(item, indent, Position::Item);
            }
        }
    }

    /// Finish the current line with `node` and write its nested lines.
    /// `indent` is the indentation of the owning key or dash.
    fn value(&mut self, node: &Node, indent: usize, position: Position) {
        let line_start = position == Position::Root;
        let child_indent = if line_start { indent } else { indent + 2 };
        let mut parts: Vec<String> = node.properties.iter().cloned().collect();

        match node.kind {
            NodeKind::Mapping | NodeKind::Sequence if is_block_collection(node) => {
                parts.extend(node.line_comment.as_deref().map(comment_line));
                self.finish_line(&parts, line_start);
                if position != Position::Item {
                    if let Some(c) = &node.head_comment {
                        self.comment(c, child_indent);
                    }
                }
                if node.is_mapping() {
                    self.mapping(node, child_indent, false);
                } else {
                    self.sequence(node, child_indent, false);
                }
            }
            NodeKind::Mapping | NodeKind::Sequence => {
                parts.push(flow_repr(node));
                parts.extend(node.line_comment.as_deref().map(comment_line));
                self.finish_line(&parts, line_start);
            }
            NodeKind::Scalar => {
                let mut owner = indent;
                let mut at_start = line_start;
                let head = node.head_comment.as_deref().filter(|_| position != Position::Item);

                if let Some(comment) = head {
                    // The comment goes on its own line with the value below it
                    if !line_start {
                        self.finish_line(&parts, false);
                        parts.clear();
                        owner = child_indent;
                    }
                    self.comment(comment, owner);
                    if node.value.is_empty() && node.style == ScalarStyle::Plain {
                        return;
                    }
                    self.pad(owner);
                    at_start = true;
                }
                self.scalar(node, parts, owner, at_start);
            }
            NodeKind::Document => {}
        }
    }

    fn scalar(&mut self, node: &Node, mut parts: Vec<String>, owner: usize, line_start: bool) {
        match &node.style {
            ScalarStyle::Literal { header } => {
                let (chomp, body, blanks) = literal_body(header, &node.value);
                parts.push(block_header(&format!("|{}", chomp), body));
                self.block_scalar(node, parts, owner, line_start, body, blanks);
            }
            ScalarStyle::Folded { header, lines } => {
                let blanks = if header.ends_with('+') {
                    kept_blanks(&node.value, lines.is_empty())
                } else {
                    0
                };
                parts.push(block_header(header, lines));
                self.block_scalar(node, parts, owner, line_start, lines, blanks);
            }
            _ => {
                let repr = scalar_repr(node, false);
                if !repr.is_empty() {
                    parts.push(repr);
                }
                parts.extend(node.line_comment.as_deref().map(comment_line));
                self.finish_line(&parts, line_start);
            }
        }
    }

    /// Header line is in `parts`; writes the body lines and kept blank lines
    fn block_scalar(
        &mut self,
        node: &Node,
        mut parts: Vec<String>,
        owner: usize,
        line_start: bool,
        body: &str,
        blanks: usize,
    ) {
        parts.extend(node.line_comment.as_deref().map(comment_line));
        self.finish_line(&parts, line_start);
        if !body.is_empty() {
            for line in body.split('\n') {
                if !line.is_empty() {
                    self.pad(owner + 2);
                    self.out.push_str(line);
                }
                self.out.push('\n');
            }
        }
        for _ in 0..blanks {
            self.out.push('\n');
        }
    }
}

/// Chomping indicator, body lines and trailing blank lines for a literal
/// block holding `value`
///
/// The recorded indicator wins when it still describes the value.
fn literal_body<'v>(header: &str, value: &'v str) -> (&'static str, &'v str, usize) {
    let recorded = if header.contains('+') {
        "+"
    } else if header.contains('-') {
        "-"
    } else {
        ""
    };
    let body = value.trim_end_matches('\n');
    let breaks = value.len() - body.len();

    if body.is_empty() {
        return if breaks == 0 { (recorded, "", 0) } else { ("+", "", breaks) };
    }
    match breaks {
        0 => ("-", body, 0),
        1 if recorded == "+" => ("+", body, 0),
        1 => ("", body, 0),
        n => ("+", body, n - 1),
    }
}

/// Blank lines after the body of a `+` block
fn kept_blanks(value: &str, empty_body: bool) -> usize {
    let breaks = value.len() - value.trim_end_matches('\n').len();
    if empty_body { breaks } else { breaks.saturating_sub(1) }
}
