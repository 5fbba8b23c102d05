//! Entity extraction passes.
//!
//! Each pass is a unit struct implementing [`Extractor`]. A pass reads the
//! whole [`DocumentSet`] once and returns an [`Extraction`]: the collection
//! it built, the nodes it had to drop and why, and the discovery messages
//! destined for the model log. Passes never mutate the document set, so any
//! number of them can run at the same time.
//!
//! ```text
//! DocumentSet ──► Classes          ──► TextMap          (id → name)
//!             ──► Associations     ──► Vec<Association>
//!             ──► Diagrams         ──► IndexMap<DiagramKey, Diagram>
//!             ──► Objects          ──► TextMap          (node → state)
//!             ──► Partitions       ──► IdMap            (partition → represents)
//!             ──► Dependencies     ──► IdMap            (client → supplier)
//!             ──► Constraints      ──► ConstraintMap    (class → rules)
//!             ──► Fragments        ──► Vec<Fragment>
//!             ──► Messages         ──► Vec<Message>
//!             ──► Lifelines        ──► IdMap            (lifeline → type)
//!             ──► AssociationTables──► TextMap          (class → html)
//!             ──► Attributes       ──► Vec<OwnedAttribute>
//! ```

mod activity;
mod associations;
mod attributes;
mod classes;
mod constraints;
mod dependencies;
mod diagrams;
mod sequence;
mod tables;

pub use activity::{Objects, Partitions};
pub use associations::Associations;
pub use attributes::Attributes;
pub use classes::Classes;
pub use constraints::Constraints;
pub use dependencies::Dependencies;
pub use diagrams::Diagrams;
pub use sequence::{Fragments, Lifelines, Messages};
pub use tables::AssociationTables;

use std::fmt;

use indexmap::IndexMap;

use crate::document::DocumentSet;
use crate::error::SkipReason;
use crate::model::ElementId;
use crate::xml::Node;

/// `xmi:type` values the passes look for.
pub mod uml {
    pub const CLASS: &str = "uml:Class";
    pub const PACKAGE: &str = "uml:Package";
    pub const ASSOCIATION: &str = "uml:Association";
    pub const INTERACTION: &str = "uml:Interaction";
    pub const COMBINED_FRAGMENT: &str = "uml:CombinedFragment";
    pub const CENTRAL_BUFFER_NODE: &str = "uml:CentralBufferNode";
    pub const STATE: &str = "uml:State";
    pub const ACTIVITY_PARTITION: &str = "uml:ActivityPartition";
}

/// Identifies a pass in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub enum Pass {
    Classes,
    Associations,
    Diagrams,
    Objects,
    Partitions,
    Dependencies,
    Constraints,
    Fragments,
    Messages,
    Lifelines,
    AssociationTables,
    Attributes,
}

impl Pass {
    pub fn as_str(self) -> &'static str {
        match self {
            Pass::Classes => "classes",
            Pass::Associations => "associations",
            Pass::Diagrams => "diagrams",
            Pass::Objects => "objects",
            Pass::Partitions => "partitions",
            Pass::Dependencies => "dependencies",
            Pass::Constraints => "constraints",
            Pass::Fragments => "fragments",
            Pass::Messages => "messages",
            Pass::Lifelines => "lifelines",
            Pass::AssociationTables => "association tables",
            Pass::Attributes => "attributes",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node an extractor dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Skipped {
    pub pass: Pass,
    /// Short description of the node, e.g. `<packagedElement xmi:id="C1">`.
    pub node: String,
    #[cfg_attr(feature = "json", serde(serialize_with = "serialize_reason"))]
    pub reason: SkipReason,
}

#[cfg(feature = "json")]
fn serialize_reason<S: serde::Serializer>(reason: &SkipReason, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] skipped {}: {}", self.pass, self.node, self.reason)
    }
}

/// Result of one pass.
#[derive(Clone, Debug)]
pub struct Extraction<T> {
    pub pass: Pass,
    pub value: T,
    pub skipped: Vec<Skipped>,
    /// Discovery messages for the model log, in order.
    pub trace: Vec<String>,
}

impl<T: Default> Extraction<T> {
    pub fn new(pass: Pass) -> Self {
        Self {
            pass,
            value: T::default(),
            skipped: Vec::new(),
            trace: Vec::new(),
        }
    }
}

impl<T> Extraction<T> {
    /// Record a dropped node.
    pub fn skip(&mut self, node: &Node<'_>, reason: SkipReason) {
        self.skipped.push(Skipped {
            pass: self.pass,
            node: format!("{node:?}"),
            reason,
        });
    }

    pub fn trace(&mut self, message: impl Into<String>) {
        self.trace.push(message.into());
    }
}

impl<V> Extraction<IndexMap<ElementId, V>> {
    /// Insert unless the key is taken; a taken key is recorded as a duplicate.
    pub fn insert_first(&mut self, node: &Node<'_>, key: &str, value: V) -> bool {
        if self.value.contains_key(key) {
            self.skip(node, SkipReason::Duplicate(key.to_string()));
            return false;
        }
        self.value.insert(ElementId::from(key), value);
        true
    }
}

/// An extraction pass over the document set.
pub trait Extractor {
    type Output: Default + Send + Sync;

    const PASS: Pass;

    fn extract(&self, docs: &DocumentSet) -> Extraction<Self::Output>;
}

// ============================================================================
// NODE HELPERS
// ============================================================================

/// Non-empty attribute or a skip reason naming it.
pub(crate) fn required<'a>(node: &Node<'a>, attribute: &'static str) -> Result<&'a str, SkipReason> {
    node.attr(attribute)
        .filter(|v| !v.is_empty())
        .ok_or(SkipReason::MissingAttribute(attribute))
}

/// Non-empty `xmi:id`.
pub(crate) fn required_id<'a>(node: &Node<'a>) -> Result<&'a str, SkipReason> {
    node.xmi_id()
        .filter(|v| !v.is_empty())
        .ok_or(SkipReason::MissingAttribute("xmi:id"))
}

pub(crate) fn is_type(node: &Node<'_>, xmi_type: &str) -> bool {
    node.xmi_type() == Some(xmi_type)
}

/// Value of the first `<name value="..."/>` below `node`.
///
/// `None` when no such element exists; `default` when it exists without a value.
pub(crate) fn bound_value(node: &Node<'_>, name: &'static str, default: &str) -> Option<String> {
    node.descendants_named(name)
        .next()
        .map(|b| b.attr("value").unwrap_or(default).to_string())
}
