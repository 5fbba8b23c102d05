//! Typed entities extracted from MagicDraw documents.
//!
//! Everything here is plain data: extractors build it, the reader caches it,
//! and the automation layer reads it.
//!
//! ```text
//! classes              id → name
//! associations         [Association { source end, target end, stereotype }]
//! diagrams             DiagramKey { owner, name } → Diagram { objects }
//! fragments, messages  sequence diagram contents
//! lifelines            lifeline id → classifier id
//! partitions           partition id → classifier id
//! objects              object node id → state name
//! dependencies         client id → supplier id
//! association tables   class id → html body
//! constraints          class id → [Constraint]
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

// ============================================================================
// IDs
// ============================================================================

/// Identifier of a model element (`xmi:id`), global across documents.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(transparent))]
pub struct ElementId(Arc<str>);

impl ElementId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for ElementId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ElementId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Map from one element to another (lifelines, partitions, dependencies).
pub type IdMap = IndexMap<ElementId, ElementId>;

/// Map from an element to a piece of text (class names, object states, tables).
pub type TextMap = IndexMap<ElementId, String>;

// ============================================================================
// ASSOCIATIONS
// ============================================================================

/// Stereotype tag on associations synthesized from `ASMA` extension tags.
pub const ASMA: &str = "ASMA";

/// UML aggregation kind of an association end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum AggregationKind {
    #[default]
    None,
    Shared,
    Composite,
}

impl AggregationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationKind::None => "none",
            AggregationKind::Shared => "shared",
            AggregationKind::Composite => "composite",
        }
    }
}

/// One end of an association. Bounds are kept as written (`"0"`, `"*"`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct AssociationEnd {
    pub name: String,
    pub lower_bound: String,
    pub upper_bound: String,
    pub end_class_id: ElementId,
    pub aggregation: AggregationKind,
}

impl AssociationEnd {
    pub fn new(end_class_id: impl Into<ElementId>) -> Self {
        Self {
            name: String::new(),
            lower_bound: String::new(),
            upper_bound: String::new(),
            end_class_id: end_class_id.into(),
            aggregation: AggregationKind::None,
        }
    }

    pub fn with_aggregation(mut self, aggregation: AggregationKind) -> Self {
        self.aggregation = aggregation;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Association {
    pub source: AssociationEnd,
    pub target: AssociationEnd,
    pub stereotype: String,
}

impl Association {
    pub fn new(source: AssociationEnd, target: AssociationEnd) -> Self {
        Self {
            source,
            target,
            stereotype: String::new(),
        }
    }

    pub fn with_stereotype(mut self, stereotype: impl Into<String>) -> Self {
        self.stereotype = stereotype.into();
        self
    }

    pub fn is_asma(&self) -> bool {
        self.stereotype == ASMA
    }
}

// ============================================================================
// DIAGRAMS
// ============================================================================

/// Layout type tag of swimlane/partition dividers.
pub const SPLIT: &str = "Split";

/// Diagram identity: owning element plus diagram name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagramKey {
    pub owner_id: ElementId,
    pub name: String,
}

impl DiagramKey {
    pub fn new(owner_id: impl Into<ElementId>, name: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DiagramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.name)
    }
}

/// A shape on a diagram.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagramObject {
    /// Element shown by the shape; empty for a pure layout split.
    pub element_id: String,
    /// Serialized rectangle, kept opaque.
    pub geometry: String,
    /// Layout type tag (`elementClass`), e.g. `CombinedFragment` or `Split`.
    pub uml_type: String,
    /// Splits dividing this shape into operands/lanes.
    pub owned_splits: Vec<DiagramObject>,
}

impl DiagramObject {
    pub fn new(
        element_id: impl Into<String>,
        geometry: impl Into<String>,
        uml_type: impl Into<String>,
    ) -> Self {
        Self {
            element_id: element_id.into(),
            geometry: geometry.into(),
            uml_type: uml_type.into(),
            owned_splits: Vec::new(),
        }
    }

    pub fn is_split(&self) -> bool {
        self.uml_type == SPLIT
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagram {
    pub key: DiagramKey,
    pub objects: Vec<DiagramObject>,
}

impl Diagram {
    pub fn new(key: DiagramKey) -> Self {
        Self {
            key,
            objects: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn owner_id(&self) -> &ElementId {
        &self.key.owner_id
    }

    /// First object showing `element_id`, compared case-insensitively.
    pub fn object(&self, element_id: &str) -> Option<&DiagramObject> {
        self.objects
            .iter()
            .find(|o| o.element_id.eq_ignore_ascii_case(element_id))
    }

    pub(crate) fn object_mut(&mut self, element_id: &str) -> Option<&mut DiagramObject> {
        self.objects
            .iter_mut()
            .find(|o| o.element_id.eq_ignore_ascii_case(element_id))
    }
}

// ============================================================================
// SEQUENCE DIAGRAMS
// ============================================================================

/// Guard text of an operand without a guard specification.
pub const ELSE_GUARD: &str = "else";

/// `messageSort` value of asynchronous messages.
pub const ASYNCH_SIGNAL: &str = "asynchSignal";

/// A combined fragment (alt, opt, loop, ...) inside an interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Fragment {
    pub owner_id: ElementId,
    pub id: ElementId,
    pub operator: String,
    pub operand_guards: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub id: ElementId,
    pub source_id: ElementId,
    pub target_id: ElementId,
    pub name: String,
    pub asynchronous: bool,
}

// ============================================================================
// CONSTRAINTS AND ATTRIBUTES
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    pub name: String,
    pub body: String,
    pub language: String,
}

impl Constraint {
    pub fn new(name: impl Into<String>, body: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            language: language.into(),
        }
    }
}

/// Constraints grouped by owning class.
pub type ConstraintMap = IndexMap<ElementId, Vec<Constraint>>;

/// A plain (non association-end) attribute of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct OwnedAttribute {
    pub owner_id: ElementId,
    pub id: ElementId,
    pub name: String,
    pub type_id: Option<ElementId>,
    pub lower_bound: Option<String>,
    pub upper_bound: Option<String>,
}
