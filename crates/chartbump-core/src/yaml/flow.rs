//! Flow collections: `[a, b]` and `{key: value}`

use super::node::{Node, ScalarStyle};
use super::scalar::{decode_double_quoted, decode_single_quoted, quoted_end};
use crate::error::{CoreError, Result};

const INDICATORS: &str = ",[]{}";

/// Walk `text` outside of quoted scalars, calling `visit` with each byte
/// index and character until it returns `Some`
fn scan<T>(text: &str, mut visit: impl FnMut(usize, char) -> Option<T>) -> Option<T> {
    let mut chars = text.char_indices().peekable();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    while let Some((i, c)) = chars.next() {
        match quote {
            Some('"') => match c {
                '\\' => {
                    chars.next();
                }
                '"' => quote = None,
                _ => {}
            },
            Some(_) => {
                if c == '\'' {
                    if chars.peek().map(|&(_, n)| n) == Some('\'') {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => {
                // A quote only opens a scalar at the start of a token
                let token_start = prev.is_none_or(|p| "[{,:".contains(p));
                if (c == '"' || c == '\'') && token_start {
                    quote = Some(c);
                } else if let Some(found) = visit(i, c) {
                    return Some(found);
                }
            }
        }
        if !c.is_whitespace() {
            prev = Some(c);
        }
    }

    None
}

/// Byte index just past the bracket closing the collection that starts
/// `text`, or `None` while brackets are unbalanced
pub(crate) fn flow_extent(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    scan(text, |i, c| match c {
        '[' | '{' => {
            depth += 1;
            None
        }
        ']' | '}' => {
            depth = depth.saturating_sub(1);
            (depth == 0).then_some(i + 1)
        }
        _ => None,
    })
}

/// `text` without a trailing `# comment`
pub(crate) fn strip_flow_comment(text: &str) -> &str {
    let mut prev_space = true;
    let cut = scan(text, |i, c| {
        let hit = c == '#' && prev_space;
        prev_space = c.is_whitespace();
        hit.then_some(i)
    });
    match cut {
        Some(i) => text[..i].trim_end(),
        None => text,
    }
}

/// Recursive descent parser over a single flow collection
pub(crate) struct FlowParser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> FlowParser<'a> {
    pub(crate) fn new(src: &'a str, line: usize) -> Self {
        Self { src, pos: 0, line }
    }

    pub(crate) fn parse(mut self) -> Result<Node> {
        let node = self.node()?;
        self.skip_ws();
        if self.pos < self.src.len() {
            return Err(self.error("unexpected characters after flow collection"));
        }
        Ok(node)
    }

    fn error(&self, message: &str) -> CoreError {
        CoreError::parse(message, self.line)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn node(&mut self) -> Result<Node> {
        self.skip_ws();
        let properties = self.properties();

        let mut node = match self.peek() {
            Some('[') => self.sequence()?,
            Some('{') => self.mapping()?,
            Some('"') | Some('\'') => self.quoted()?,
            Some('*') => {
                self.bump();
                Node::styled_scalar(self.plain_text(), ScalarStyle::Alias)
            }
            Some(_) => {
                let text = self.plain_text();
                if text.is_empty() {
                    return Err(self.error("expected a flow value"));
                }
                Node::scalar(text)
            }
            None => return Err(self.error("unexpected end of flow collection")),
        };

        if properties.is_some() {
            node.properties = properties;
        }
        Ok(node)
    }

    fn properties(&mut self) -> Option<String> {
        let src = self.src;
        let mut props = Vec::new();

        while matches!(self.peek(), Some('&') | Some('!')) {
            let start = self.pos;
            while self
                .peek()
                .is_some_and(|c| !c.is_whitespace() && !INDICATORS.contains(c))
            {
                self.bump();
            }
            props.push(&src[start..self.pos]);
            self.skip_ws();
        }

        (!props.is_empty()).then(|| props.join(" "))
    }

    fn sequence(&mut self) -> Result<Node> {
        self.bump();
        let mut seq = Node::sequence();
        seq.flow = true;

        loop {
            self.skip_ws();
            if self.eat(']') {
                break;
            }

            let item = self.node()?;
            self.skip_ws();

            // `[key: value]` is a single-pair mapping
            let item = if self.eat(':') {
                let value = self.optional_value(']')?;
                let mut pair = Node::mapping();
                pair.flow = true;
                pair.children.push(item);
                pair.children.push(value);
                pair
            } else {
                item
            };
            seq.children.push(item);

            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                break;
            }
            return Err(self.error("expected ',' or ']' in flow sequence"));
        }

        Ok(seq)
    }

    fn mapping(&mut self) -> Result<Node> {
        self.bump();
        let mut map = Node::mapping();
        map.flow = true;

        loop {
            self.skip_ws();
            if self.eat('}') {
                break;
            }

            let key = self.node()?;
            if !key.is_scalar() {
                return Err(self.error("complex mapping keys are not supported"));
            }
            self.skip_ws();
            let value = if self.eat(':') {
                self.optional_value('}')?
            } else {
                Node::scalar("")
            };
            map.children.push(key);
            map.children.push(value);

            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                break;
            }
            return Err(self.error("expected ',' or '}' in flow mapping"));
        }

        Ok(map)
    }

    fn optional_value(&mut self, close: char) -> Result<Node> {
        self.skip_ws();
        match self.peek() {
            Some(',') => Ok(Node::scalar("")),
            Some(c) if c == close => Ok(Node::scalar("")),
            _ => self.node(),
        }
    }

    fn quoted(&mut self) -> Result<Node> {
        let src = self.src;
        let rest = &src[self.pos..];
        let end = quoted_end(rest).ok_or_else(|| self.error("unterminated quoted scalar"))?;
        let inner = &rest[1..end - 1];
        self.pos += end;

        Ok(if rest.starts_with('"') {
            Node::styled_scalar(decode_double_quoted(inner), ScalarStyle::DoubleQuoted)
        } else {
            Node::styled_scalar(decode_single_quoted(inner), ScalarStyle::SingleQuoted)
        })
    }

    fn plain_text(&mut self) -> String {
        let src = self.src;
        let start = self.pos;

        while let Some(c) = self.peek() {
            if INDICATORS.contains(c) {
                break;
            }
            if c == ':' {
                let next = src[self.pos + 1..].chars().next();
                if next.is_none_or(|n| n.is_whitespace() || INDICATORS.contains(n)) {
                    break;
                }
            }
            self.bump();
        }

        src[start..self.pos].trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::NodeKind;

    fn parse(src: &str) -> Node {
        FlowParser::new(src, 1).parse().unwrap()
    }

    #[test]
    fn test_flow_extent() {
        assert_eq!(flow_extent("[a, b] # tail"), Some(6));
        assert_eq!(flow_extent("{a: [1, 2]}"), Some(11));
        assert_eq!(flow_extent("[\"]\", b]"), Some(8));
        assert_eq!(flow_extent("[invalid"), None);
    }

    #[test]
    fn test_strip_flow_comment() {
        assert_eq!(strip_flow_comment("a, b, # trailing"), "a, b,");
        assert_eq!(strip_flow_comment("'#not', b"), "'#not', b");
        assert_eq!(strip_flow_comment("a#b"), "a#b");
    }

    #[test]
    fn test_parse_sequence() {
        let node = parse("[a, 'b c', \"d\"]");
        assert_eq!(node.kind, NodeKind::Sequence);
        assert!(node.flow);
        let values: Vec<_> = node.children.iter().map(|n| n.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b c", "d"]);
        assert_eq!(node.children[1].style, ScalarStyle::SingleQuoted);
    }

    #[test]
    fn test_parse_nested_mapping() {
        let node = parse("{name: app, ports: [80, 443], empty}");
        assert!(node.is_mapping());
        assert_eq!(node.lookup(&["name"]), "app");
        assert_eq!(node.get("ports").map(|p| p.children.len()), Some(2));
        assert_eq!(node.lookup(&["empty"]), "");
    }

    #[test]
    fn test_parse_url_value() {
        let node = parse("{url: https://example.com:8443/path}");
        assert_eq!(node.lookup(&["url"]), "https://example.com:8443/path");
    }

    #[test]
    fn test_parse_errors() {
        assert!(FlowParser::new("[a b", 3).parse().is_err());
        assert!(FlowParser::new("{a: 1 b: 2}", 3).parse().is_err());
        assert!(FlowParser::new("[a] extra", 3).parse().is_err());
    }
}
