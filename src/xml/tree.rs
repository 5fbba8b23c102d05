//! Arena XML tree.
//!
//! Extraction needs things a streaming reader cannot give: parent links,
//! ancestor walks, subtree searches and lookups by id from anywhere in the
//! document. The tree is built once from `quick-xml` events and is immutable
//! afterwards, so it can be shared freely between extraction passes.
//!
//! ```text
//! XmlTree
//! ├── nodes: Vec<NodeData>   (document order, index = NodeId)
//! ├── namespaces             (seed context + xmlns declarations)
//! └── xmi_prefixes           (prefixes bound to an XMI namespace)
//! ```

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smol_str::SmolStr;

use super::namespace::NamespaceContext;
use crate::error::XmlError;

/// Index of an element in its tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
enum Content {
    Element(NodeId),
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    name: SmolStr,
    attributes: Vec<(SmolStr, String)>,
    parent: Option<NodeId>,
    content: Vec<Content>,
}

/// A parsed XML document.
#[derive(Debug)]
pub struct XmlTree {
    nodes: Vec<NodeData>,
    namespaces: NamespaceContext,
    xmi_prefixes: Vec<SmolStr>,
}

impl XmlTree {
    /// Parse a document using only the namespaces it declares.
    pub fn parse(input: &[u8]) -> Result<Self, XmlError> {
        Self::parse_with(input, &NamespaceContext::new())
    }

    /// Parse a document with a seed namespace context.
    ///
    /// Declarations found in the document extend (and override) the seed.
    pub fn parse_with(input: &[u8], seed: &NamespaceContext) -> Result<Self, XmlError> {
        let mut builder = TreeBuilder {
            nodes: Vec::new(),
            namespaces: seed.clone(),
            stack: Vec::new(),
        };

        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let id = builder.open(e).map_err(|m| {
                        XmlError::new(reader.buffer_position() as u64, m)
                    })?;
                    builder.stack.push(id);
                }
                Ok(Event::Empty(ref e)) => {
                    builder.open(e).map_err(|m| {
                        XmlError::new(reader.buffer_position() as u64, m)
                    })?;
                }
                Ok(Event::End(_)) => {
                    builder.stack.pop();
                }
                Ok(Event::Text(ref t)) => {
                    let text = t.unescape().map_err(|e| {
                        XmlError::new(reader.buffer_position() as u64, e.to_string())
                    })?;
                    builder.text(&text);
                }
                Ok(Event::CData(ref c)) => {
                    builder.text(&String::from_utf8_lossy(c));
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(XmlError::new(reader.error_position() as u64, e.to_string()));
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(&open) = builder.stack.last() {
            return Err(XmlError::new(
                reader.buffer_position() as u64,
                format!("unclosed element <{}>", builder.nodes[open.index()].name),
            ));
        }
        if builder.nodes.is_empty() {
            return Err(XmlError::new(0, "document has no root element"));
        }

        let xmi_prefixes = builder.namespaces.xmi_prefixes().map(SmolStr::new).collect();
        Ok(Self {
            nodes: builder.nodes,
            namespaces: builder.namespaces,
            xmi_prefixes,
        })
    }

    /// The document element.
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            id: NodeId(0),
        }
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    /// Every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = Node<'_>> {
        (0..self.nodes.len()).map(move |i| Node {
            tree: self,
            id: NodeId(i as u32),
        })
    }

    /// Every element with the given qualified name, in document order.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Node<'a>> {
        self.elements().filter(move |n| n.name() == name)
    }

    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

struct TreeBuilder {
    nodes: Vec<NodeData>,
    namespaces: NamespaceContext,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<NodeId, String> {
        let qname = e.name();
        let name = std::str::from_utf8(qname.as_ref())
            .map_err(|e| format!("Invalid tag name: {e}"))?;

        let mut attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| format!("Attribute error: {e}"))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| format!("Attribute key error: {e}"))?;
            let value = attr
                .unescape_value()
                .map_err(|e| format!("Attribute value error: {e}"))?
                .to_string();

            if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.namespaces.insert(prefix, value.clone());
            }
            attributes.push((SmolStr::new(key), value));
        }

        let id = NodeId(self.nodes.len() as u32);
        let parent = self.stack.last().copied();
        if let Some(p) = parent {
            self.nodes[p.index()].content.push(Content::Element(id));
        }
        self.nodes.push(NodeData {
            name: SmolStr::new(name),
            attributes,
            parent,
            content: Vec::new(),
        });
        Ok(id)
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&p) = self.stack.last() {
            self.nodes[p.index()].content.push(Content::Text(text.to_string()));
        }
    }
}

/// Borrowed handle to one element.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a XmlTree,
    id: NodeId,
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.xmi_id() {
            Some(id) => write!(f, "<{} xmi:id=\"{}\">", self.name(), id),
            None => write!(f, "<{}>", self.name()),
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl<'a> Node<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a XmlTree {
        self.tree
    }

    /// Qualified name as written, e.g. `packagedElement` or `Business_Document_Library:ASMA`.
    pub fn name(&self) -> &'a str {
        &self.tree.data(self.id).name
    }

    /// Name without its prefix.
    pub fn local_name(&self) -> &'a str {
        let name = self.name();
        name.split_once(':').map_or(name, |(_, local)| local)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == name
    }

    /// Attribute by its qualified name.
    pub fn attr(&self, key: &str) -> Option<&'a str> {
        self.tree
            .data(self.id)
            .attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.tree
            .data(self.id)
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Attribute in the XMI namespace, whatever prefix the document bound it to.
    pub fn xmi_attr(&self, local: &str) -> Option<&'a str> {
        let prefixes = &self.tree.xmi_prefixes;
        self.attributes().find_map(|(key, value)| {
            let (prefix, name) = key.split_once(':')?;
            (name == local && prefixes.iter().any(|p| p == prefix)).then_some(value)
        })
    }

    pub fn xmi_id(&self) -> Option<&'a str> {
        self.xmi_attr("id")
    }

    pub fn xmi_type(&self) -> Option<&'a str> {
        self.xmi_attr("type")
    }

    pub fn xmi_idref(&self) -> Option<&'a str> {
        self.xmi_attr("idref")
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.tree.data(self.id).parent.map(|id| self.tree.node(id))
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = Node<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Child elements in document order.
    pub fn children(self) -> impl Iterator<Item = Node<'a>> {
        let tree = self.tree;
        tree.data(self.id).content.iter().filter_map(move |c| match c {
            Content::Element(id) => Some(tree.node(*id)),
            Content::Text(_) => None,
        })
    }

    pub fn children_named(self, name: &'a str) -> impl Iterator<Item = Node<'a>> {
        self.children().filter(move |c| c.is(name))
    }

    pub fn child(&self, name: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.is(name))
    }

    /// Follow a path of child names, e.g. `["guard", "specification"]`.
    pub fn path(&self, names: &[&str]) -> Option<Node<'a>> {
        names.iter().try_fold(*self, |node, name| node.child(name))
    }

    /// All elements below this one in document order, excluding itself.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants {
            tree: self.tree,
            stack: self.children_rev(),
            prune: None,
        }
    }

    /// Like [`descendants`](Self::descendants) but without entering (or
    /// yielding) elements named `prune`.
    pub fn descendants_pruned(&self, prune: &'a str) -> Descendants<'a> {
        Descendants {
            tree: self.tree,
            stack: self.children_rev(),
            prune: Some(prune),
        }
    }

    pub fn descendants_named(self, name: &'a str) -> impl Iterator<Item = Node<'a>> {
        self.descendants().filter(move |n| n.is(name))
    }

    /// Concatenated text of the whole subtree.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for content in &self.tree.data(self.id).content {
            match content {
                Content::Text(t) => out.push_str(t),
                Content::Element(id) => self.tree.node(*id).collect_text(out),
            }
        }
    }

    fn children_rev(&self) -> Vec<NodeId> {
        self.children().map(|c| c.id).collect::<Vec<_>>().into_iter().rev().collect()
    }
}

/// Pre-order subtree iterator.
pub struct Descendants<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
    prune: Option<&'a str>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.stack.pop()?;
            let node = self.tree.node(id);
            if self.prune.is_some_and(|p| node.is(p)) {
                continue;
            }
            self.stack.extend(node.children_rev());
            return Some(node);
        }
    }
}
