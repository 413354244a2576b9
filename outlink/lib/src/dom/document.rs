//! Owned, mutable HTML tree.
//!
//! `scraper` parses HTML into a read-only DOM. Decoration needs to add
//! attributes and children, so the parsed tree is copied into a small arena
//! of owned nodes that can be mutated freely and serialized back to HTML.
//!
//! ## Trade-offs
//!
//! - Parsing goes through html5ever, so malformed markup is repaired the way a
//!   browser would repair it rather than rejected.
//! - Serialized output is normalized: attribute quoting, entity escaping and
//!   implied elements (`<tbody>`, `<html>`/`<body>` for full documents) follow
//!   the parser, not the original bytes.
//!
//! ## Examples
//!
//! ```rust
//! use outlink_lib::Document;
//!
//! let doc = Document::parse_fragment(r#"<p>See <a href="/about">about</a></p>"#);
//! assert_eq!(doc.to_html(), r#"<p>See <a href="/about">about</a></p>"#);
//! ```

use std::fmt::{self, Write as _};

use scraper::{ElementRef, Html, Node};

use super::{ElementContainer, NewElement};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is written without escaping.
///
/// Matches the set html5ever parses as raw text with scripting enabled, which
/// is how `scraper` parses.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "noscript",
];

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Content of a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document or fragment root. Never serialized itself.
    Root,
    Doctype(DoctypeData),
    Comment(String),
    Text(String),
    Element(ElementData),
}

/// A `<!DOCTYPE>` declaration, including legacy public and system ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeData {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

impl DoctypeData {
    fn write_to(&self, out: &mut String) {
        let _ = write!(out, "<!DOCTYPE {}", self.name);
        if !self.public_id.is_empty() {
            let _ = write!(out, " PUBLIC \"{}\"", self.public_id);
            if !self.system_id.is_empty() {
                let _ = write!(out, " \"{}\"", self.system_id);
            }
        } else if !self.system_id.is_empty() {
            let _ = write!(out, " SYSTEM \"{}\"", self.system_id);
        }
        out.push('>');
    }
}

/// Tag name and attributes of an element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    name: String,
    attributes: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in the order they will be serialized.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS
            .iter()
            .any(|void| self.name.eq_ignore_ascii_case(void))
    }

    fn is_raw_text(&self) -> bool {
        RAW_TEXT_ELEMENTS
            .iter()
            .any(|raw| self.name.eq_ignore_ascii_case(raw))
    }
}

impl From<NewElement> for ElementData {
    fn from(element: NewElement) -> Self {
        Self {
            name: element.tag,
            attributes: element.attributes,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeEntry {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An HTML document or fragment held as an arena of owned nodes.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeEntry>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new_fragment()
    }
}

impl Document {
    /// Creates an empty tree containing only the root node.
    pub fn new_fragment() -> Self {
        Self {
            nodes: vec![NodeEntry {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parses an HTML fragment, as if it were the content of a `<body>`.
    pub fn parse_fragment(html: &str) -> Self {
        let parsed = Html::parse_fragment(html);
        let mut document = Self::new_fragment();
        let root = document.root();

        // html5ever wraps fragments in a synthetic `<html>` element
        document.import_children(root, parsed.root_element());
        document
    }

    /// Parses a complete HTML document, including any doctype and comments
    /// ahead of the `<html>` element.
    pub fn parse_document(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut document = Self::new_fragment();
        let root = document.root();

        for child in parsed.tree.root().children() {
            match child.value() {
                Node::Doctype(doctype) => {
                    let data = DoctypeData {
                        name: doctype.name().to_string(),
                        public_id: doctype.public_id().to_string(),
                        system_id: doctype.system_id().to_string(),
                    };
                    document.push(root, NodeKind::Doctype(data));
                }
                Node::Comment(comment) => {
                    document.push(root, NodeKind::Comment(String::from(&*comment.comment)));
                }
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        document.import_element(root, element);
                    }
                }
                _ => {}
            }
        }

        document
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Content of the node `id`.
    ///
    /// ## Panics
    ///
    /// Panics if `id` is out of range for this document. A [`NodeId`] is only
    /// meaningful for the document that produced it; one taken from another
    /// document may panic or address an unrelated node.
    pub fn node(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.node(id) {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable access to an element node; `None` for other node kinds.
    ///
    /// ## Panics
    ///
    /// Panics if `id` is out of range for this document.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::name)
    }

    /// Direct children of `id`, in document order.
    ///
    /// ## Panics
    ///
    /// Panics if `id` is out of range for this document. A [`NodeId`] is only
    /// meaningful for the document that produced it; one taken from another
    /// document may panic or address an unrelated node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent of `id`, or `None` for the root.
    ///
    /// ## Panics
    ///
    /// Panics if `id` is out of range for this document. A [`NodeId`] is only
    /// meaningful for the document that produced it; one taken from another
    /// document may panic or address an unrelated node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Element children of `id`, skipping text and comments.
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            found.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }

        found
    }

    /// Elements below `id` with the given tag name, in document order.
    pub fn descendants_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node| {
                self.tag_name(*node)
                    .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            })
            .collect()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|data| data.attribute(name))
    }

    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.element(id)
            .map(|data| data.classes().collect())
            .unwrap_or_default()
    }

    /// Appends an element as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, element: ElementData) -> NodeId {
        self.push(parent, NodeKind::Element(element))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    /// Restricts element lookups to the subtree under `container`.
    pub fn scope(&mut self, container: NodeId) -> Scope<'_> {
        Scope {
            document: self,
            container,
        }
    }

    /// Serializes every node under the root back to HTML.
    pub fn to_html(&self) -> String {
        self.html_of(self.root())
    }

    /// Serializes the children of `id`, i.e. its inner HTML.
    pub fn inner_html(&self, id: NodeId) -> String {
        self.html_of(id)
    }

    /// Serializes `id` including its own tags.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id, false);
        out
    }

    fn html_of(&self, id: NodeId) -> String {
        let raw = self.element(id).is_some_and(ElementData::is_raw_text);
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(&mut out, *child, raw);
        }
        out
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn import_element(&mut self, parent: NodeId, element: ElementRef<'_>) {
        let value = element.value();
        let mut data = ElementData::new(value.name());
        // Keep namespace prefixes so `xlink:href` stays distinct from `href`
        for (name, attr) in value.attrs.iter() {
            let qualified = match &name.prefix {
                Some(prefix) => format!("{}:{}", prefix, name.local),
                None => name.local.to_string(),
            };
            data.set_attribute(&qualified, attr);
        }

        let id = self.append_child(parent, data);
        self.import_children(id, element);
    }

    fn import_children(&mut self, parent: NodeId, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    self.append_text(parent, &text.text);
                }
                Node::Comment(comment) => {
                    self.push(parent, NodeKind::Comment(String::from(&*comment.comment)));
                }
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.import_element(parent, child_element);
                    }
                }
                _ => {}
            }
        }
    }

    fn write_node(&self, out: &mut String, id: NodeId, raw_text: bool) {
        match self.node(id) {
            NodeKind::Root => {
                for child in self.children(id) {
                    self.write_node(out, *child, false);
                }
            }
            NodeKind::Doctype(doctype) => doctype.write_to(out),
            NodeKind::Comment(comment) => {
                let _ = write!(out, "<!--{comment}-->");
            }
            NodeKind::Text(text) if raw_text => out.push_str(text),
            NodeKind::Text(text) => out.push_str(&html_escape::encode_text(text)),
            NodeKind::Element(data) => {
                out.push('<');
                out.push_str(&data.name);
                for (name, value) in data.attributes() {
                    let _ = write!(
                        out,
                        " {}=\"{}\"",
                        name,
                        html_escape::encode_double_quoted_attribute(value)
                    );
                }
                out.push('>');

                if data.is_void() {
                    return;
                }

                let raw = data.is_raw_text();
                for child in self.children(id) {
                    self.write_node(out, *child, raw);
                }
                let _ = write!(out, "</{}>", data.name);
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

impl ElementContainer for Document {
    type Handle = NodeId;

    fn find_descendants(&self, tag: &str) -> Vec<NodeId> {
        self.descendants_by_tag(self.root(), tag)
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        Document::attribute(self, element, name)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        if let Some(data) = self.element_mut(element) {
            data.set_attribute(name, value);
        }
    }

    fn append_element(&mut self, parent: NodeId, element: NewElement) -> NodeId {
        self.append_child(parent, element.into())
    }
}

/// A [`Document`] viewed through one of its elements.
///
/// Lookups only see descendants of the container; mutations go straight to
/// the underlying document.
#[derive(Debug)]
pub struct Scope<'a> {
    document: &'a mut Document,
    container: NodeId,
}

impl Scope<'_> {
    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn document(&self) -> &Document {
        &*self.document
    }
}

impl ElementContainer for Scope<'_> {
    type Handle = NodeId;

    fn find_descendants(&self, tag: &str) -> Vec<NodeId> {
        self.document.descendants_by_tag(self.container, tag)
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.document.attribute(element, name)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        self.document.set_attribute(element, name, value);
    }

    fn append_element(&mut self, parent: NodeId, element: NewElement) -> NodeId {
        self.document.append_child(parent, element.into())
    }
}
