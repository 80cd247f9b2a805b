//! YAML node tree
//!
//! A [`Node`] keeps everything needed to write a document back out the way
//! it was read: key order, comments, scalar quoting and flow style. Mapping
//! nodes store their entries as alternating key/value children.

use super::scalar::is_implicitly_typed;

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Mapping,
    Sequence,
    Scalar,
}

/// How a scalar was written in the source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// `|` block; the header keeps chomping/indentation indicators
    Literal { header: String },
    /// `>` block; `lines` keeps the source text, the node value is the
    /// folded result
    Folded { header: String, lines: String },
    /// `*name`; the value holds the anchor name
    Alias,
}

/// A node in a parsed YAML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,

    /// Child nodes. Mappings alternate key, value; sequences hold items;
    /// documents hold exactly one root value.
    pub children: Vec<Node>,

    /// Scalar value (decoded, without quotes)
    pub value: String,

    /// Scalar presentation
    pub style: ScalarStyle,

    /// Collection written in flow style (`[a, b]`, `{a: 1}`)
    pub flow: bool,

    /// Anchor and tag text preceding the value (`&base`, `!!str`)
    pub properties: Option<String>,

    /// Comment lines directly above the node, each starting with `#`
    pub head_comment: Option<String>,

    /// Comment on the same line as the node
    pub line_comment: Option<String>,

    /// Comment lines after the last content of a document
    pub foot_comment: Option<String>,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            value: String::new(),
            style: ScalarStyle::Plain,
            flow: false,
            properties: None,
            head_comment: None,
            line_comment: None,
            foot_comment: None,
        }
    }

    /// Create a document wrapping `root`
    pub fn document(root: Node) -> Self {
        let mut doc = Self::with_kind(NodeKind::Document);
        doc.children.push(root);
        doc
    }

    /// Create an empty block mapping
    pub fn mapping() -> Self {
        Self::with_kind(NodeKind::Mapping)
    }

    /// Create an empty block sequence
    pub fn sequence() -> Self {
        Self::with_kind(NodeKind::Sequence)
    }

    /// Create a plain scalar
    pub fn scalar(value: impl Into<String>) -> Self {
        let mut node = Self::with_kind(NodeKind::Scalar);
        node.value = value.into();
        node
    }

    /// Create a scalar with an explicit style
    pub fn styled_scalar(value: impl Into<String>, style: ScalarStyle) -> Self {
        let mut node = Self::scalar(value);
        node.style = style;
        node
    }

    /// Attach a head comment (builder style)
    pub fn with_head_comment(mut self, comment: impl Into<String>) -> Self {
        self.head_comment = Some(comment.into());
        self
    }

    pub fn is_mapping(&self) -> bool {
        self.kind == NodeKind::Mapping
    }

    pub fn is_scalar(&self) -> bool {
        self.kind == NodeKind::Scalar
    }

    /// The root value of a document, or the node itself for any other kind
    pub fn root(&self) -> &Node {
        match (self.kind, self.children.first()) {
            (NodeKind::Document, Some(root)) => root,
            _ => self,
        }
    }

    /// Mutable counterpart of [`Node::root`]
    pub fn root_mut(&mut self) -> &mut Node {
        if self.kind == NodeKind::Document && !self.children.is_empty() {
            &mut self.children[0]
        } else {
            self
        }
    }

    /// Iterate `(key, value)` pairs of a mapping; empty for other kinds
    pub fn entries(&self) -> impl Iterator<Item = (&Node, &Node)> {
        let children: &[Node] = if self.is_mapping() { &self.children } else { &[] };
        children.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// First key node of a mapping
    pub fn first_key(&self) -> Option<&Node> {
        self.entries().next().map(|(k, _)| k)
    }

    /// Value for `key` in a mapping
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries().find(|(k, _)| k.value == key).map(|(_, v)| v)
    }

    /// Mutable value for `key` in a mapping
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        if !self.is_mapping() {
            return None;
        }
        let idx = self
            .children
            .chunks_exact(2)
            .position(|pair| pair[0].value == key)?;
        self.children.get_mut(idx * 2 + 1)
    }

    /// Append a key/value pair to a mapping
    pub fn insert(&mut self, key: impl Into<String>, value: Node) {
        self.children.push(Node::scalar(key));
        self.children.push(value);
    }

    /// Scalar value at `path`, or an empty string if any segment is missing
    /// or the final node is not a scalar
    pub fn lookup(&self, path: &[&str]) -> &str {
        let mut node = self;
        for segment in path {
            match node.get(segment) {
                Some(next) => node = next,
                None => return "",
            }
        }
        if node.is_scalar() { &node.value } else { "" }
    }

    /// Assign a scalar at `path`, creating intermediate mappings as needed
    ///
    /// Existing siblings keep their order, values and comments. A
    /// non-mapping node in the way is replaced by an empty mapping. An
    /// existing scalar at the final segment keeps its style and comments.
    pub fn set(&mut self, path: &[&str], value: &str) {
        let Some((head, tail)) = path.split_first() else {
            self.assign(value);
            return;
        };

        if !self.is_mapping() {
            self.become_mapping();
        }

        if self.get(head).is_none() {
            let child = if tail.is_empty() {
                Node::scalar(value)
            } else {
                Node::mapping()
            };
            self.insert(*head, child);
        }

        if let Some(next) = self.get_mut(head) {
            next.set(tail, value);
        }
    }

    /// Store `value` as a string scalar
    ///
    /// Plain scalars that would load as another type (`1.10`, `2`, `true`)
    /// become double-quoted. A folded block turns into a literal one since
    /// its source lines no longer match the value.
    fn assign(&mut self, value: &str) {
        if !self.is_scalar() {
            self.kind = NodeKind::Scalar;
            self.children.clear();
            self.flow = false;
            self.style = ScalarStyle::Plain;
        }
        match &self.style {
            ScalarStyle::Alias => self.style = ScalarStyle::Plain,
            ScalarStyle::Folded { header, .. } => {
                self.style = ScalarStyle::Literal {
                    header: header.replacen('>', "|", 1),
                };
            }
            _ => {}
        }
        if self.style == ScalarStyle::Plain && is_implicitly_typed(value) {
            self.style = ScalarStyle::DoubleQuoted;
        }
        self.value = value.to_string();
    }

    fn become_mapping(&mut self) {
        self.kind = NodeKind::Mapping;
        self.children.clear();
        self.value.clear();
        self.style = ScalarStyle::Plain;
        self.flow = false;
    }
}
