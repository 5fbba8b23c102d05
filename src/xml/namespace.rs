//! Namespace context for resolving prefixed attributes.
//!
//! MagicDraw model documents declare `xmlns:xmi` on their root, but the
//! binary layout companions written next to them use `xmi:idref` without
//! ever declaring the prefix. Parsing those files needs a context seeded by
//! the caller, which is what [`NamespaceContext`] provides.

use indexmap::IndexMap;

/// Well-known namespace URIs.
pub mod uri {
    /// XMI namespace written by MagicDraw 19.x and later.
    pub const XMI: &str = "http://www.omg.org/spec/XMI/20131001";
    /// UML namespace written by MagicDraw 19.x and later.
    pub const UML: &str = "http://www.omg.org/spec/UML/20131001";
}

/// Does this URI name some version of the XMI namespace?
pub fn is_xmi(uri: &str) -> bool {
    uri.starts_with("http://www.omg.org/spec/XMI/")
        || uri.starts_with("http://schema.omg.org/spec/XMI/")
        || uri == "http://www.omg.org/XMI"
}

/// Prefix to URI bindings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct NamespaceContext {
    bindings: IndexMap<String, String>,
}

impl NamespaceContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context binding `xmi` to the MagicDraw XMI namespace.
    pub fn with_xmi() -> Self {
        Self::new().bind("xmi", uri::XMI)
    }

    /// Add a binding (builder form).
    pub fn bind(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.insert(prefix, uri);
        self
    }

    /// Add or replace a binding.
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.bindings.insert(prefix.into(), uri.into());
    }

    /// URI bound to a prefix.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// Prefixes bound to an XMI namespace.
    pub fn xmi_prefixes(&self) -> impl Iterator<Item = &str> {
        self.bindings
            .iter()
            .filter(|(_, uri)| is_xmi(uri))
            .map(|(prefix, _)| prefix.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
