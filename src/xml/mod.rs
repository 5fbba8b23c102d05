//! XML documents as navigable trees.
//!
//! - [`XmlTree`] - arena tree built from `quick-xml` events
//! - [`Node`] - borrowed element handle with parent/child/ancestor walks
//! - [`NamespaceContext`] - prefix bindings, seeded for undeclared `xmi:`

mod namespace;
mod tree;

pub use namespace::{NamespaceContext, is_xmi, uri};
pub use tree::{Descendants, Node, NodeId, XmlTree};
