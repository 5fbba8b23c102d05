//! Cross-reference resolution.
//!
//! Two encodings occur in MagicDraw documents:
//!
//! - **idref**: the attribute value is the target id (`xmi:idref="ID-1"`,
//!   `represents="ID-1"`, `base_Association="ID-1"`).
//! - **href**: the value names a document and a fragment,
//!   `somefile.xml#ID-1`. Exactly one `#` is expected; anything else is
//!   treated as unresolved.
//!
//! Targets are looked up in the whole [`DocumentSet`], never only in the
//! document holding the reference.

use crate::document::DocumentSet;
use crate::xml::Node;

/// Target id of an href-style reference.
///
/// Returns `None` unless splitting on `#` yields exactly two segments and
/// the second is non-empty.
pub fn href_target(href: &str) -> Option<&str> {
    let mut parts = href.split('#');
    let _document = parts.next()?;
    let id = parts.next()?;
    if parts.next().is_some() || id.is_empty() {
        return None;
    }
    Some(id)
}

/// Id referenced by an element carrying either an `href` or an `xmi:idref`.
///
/// `href` takes precedence when present, even if it does not resolve.
pub fn element_ref<'a>(node: &Node<'a>) -> Option<&'a str> {
    match node.attr("href") {
        Some(href) => href_target(href),
        None => node.xmi_idref().filter(|id| !id.is_empty()),
    }
}

/// Id referenced by a child element such as `<type href="..."/>` or
/// `<covered xmi:idref="..."/>`.
pub fn child_ref<'a>(node: &Node<'a>, child: &str) -> Option<&'a str> {
    node.child(child).and_then(|c| element_ref(&c))
}

impl DocumentSet {
    /// Follow an idref attribute on `node` to its target element.
    pub fn follow_attr<'a>(&'a self, node: &Node<'_>, attribute: &str) -> Option<Node<'a>> {
        let id = node.attr(attribute).filter(|id| !id.is_empty())?;
        self.find_by_id(id)
    }

    /// Follow an href or idref to its target element.
    pub fn follow_ref<'a>(&'a self, node: &Node<'_>) -> Option<Node<'a>> {
        self.find_by_id(element_ref(node)?)
    }
}
