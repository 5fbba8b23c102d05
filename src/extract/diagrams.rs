//! Diagrams and their layout objects.
//!
//! A diagram is declared in the model as an `ownedDiagram`; the shapes it
//! shows live in a separate layout file next to the payload, named by the
//! `streamContentID` of the diagram's `binaryObject`:
//!
//! ```xml
//! <mdElement elementClass="CombinedFragment">
//!   <elementID xmi:idref="F1"/>
//!   <geometry>10, 10, 200, 120</geometry>
//!   <mdOwnedViews>
//!     <mdElement elementClass="Split">
//!       <geometry>10, 60, 200, 60</geometry>
//!     </mdElement>
//!   </mdOwnedViews>
//! </mdElement>
//! ```
//!
//! Layout files use the `xmi` prefix without declaring it, so they are parsed
//! with an explicit [`NamespaceContext`].

use std::path::{Component, Path};

use indexmap::IndexMap;

use super::{Extraction, Extractor, Pass, required};
use crate::document::{DocumentSet, SourceDocument};
use crate::error::SkipReason;
use crate::model::{Diagram, DiagramKey, DiagramObject, SPLIT};
use crate::resolve::element_ref;
use crate::xml::{NamespaceContext, Node, XmlTree};

const LAYOUT_ELEMENT: &str = "mdElement";

/// Diagrams keyed by owner and name. Only diagrams with at least one object are kept.
#[derive(Debug, Clone)]
pub struct Diagrams {
    layout_namespaces: NamespaceContext,
}

impl Diagrams {
    pub fn new(layout_namespaces: NamespaceContext) -> Self {
        Self { layout_namespaces }
    }
}

impl Default for Diagrams {
    fn default() -> Self {
        Self::new(NamespaceContext::with_xmi())
    }
}

impl Extractor for Diagrams {
    type Output = IndexMap<DiagramKey, Diagram>;

    const PASS: Pass = Pass::Diagrams;

    fn extract(&self, docs: &DocumentSet) -> Extraction<Self::Output> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);

        for doc in docs.iter() {
            for node in doc.tree().elements_named("ownedDiagram") {
                let diagram = match self.diagram(doc, &node) {
                    Ok(Some(diagram)) => diagram,
                    Ok(None) => continue,
                    Err(reason) => {
                        out.skip(&node, reason);
                        continue;
                    }
                };
                if out.value.contains_key(&diagram.key) {
                    out.skip(&node, SkipReason::Duplicate(diagram.key.to_string()));
                    continue;
                }
                out.trace(format!(
                    "Getting diagram '{}' with {} object(s)",
                    diagram.name(),
                    diagram.objects.len()
                ));
                out.value.insert(diagram.key.clone(), diagram);
            }
        }

        out
    }
}

impl Diagrams {
    /// Build one diagram; `Ok(None)` when its layout holds no usable object.
    fn diagram(
        &self,
        doc: &SourceDocument,
        node: &Node<'_>,
    ) -> Result<Option<Diagram>, SkipReason> {
        let name = node.attr("name").ok_or(SkipReason::MissingAttribute("name"))?;
        let owner = required(node, "ownerOfDiagram")?;
        let binary = node
            .descendants_named("binaryObject")
            .next()
            .ok_or(SkipReason::MissingChild("binaryObject"))?;
        let stream = required(&binary, "streamContentID")?;
        if !is_plain_file_name(stream) {
            return Err(SkipReason::Layout(format!("invalid stream id '{stream}'")));
        }

        let path = doc.base_dir().join(stream);
        if !path.is_file() {
            return Err(SkipReason::Layout(format!("{} not found", path.display())));
        }
        let bytes = std::fs::read(&path)
            .map_err(|e| SkipReason::Layout(format!("{}: {e}", path.display())))?;
        let layout = XmlTree::parse_with(&bytes, &self.layout_namespaces)
            .map_err(|e| SkipReason::Layout(format!("{}: {e}", path.display())))?;

        let mut diagram = Diagram::new(DiagramKey::new(owner, name));
        for element in layout.elements_named(LAYOUT_ELEMENT) {
            let Some(object) = layout_object(&element) else {
                continue;
            };
            if object.is_split() {
                if let Some(owner_id) = element
                    .ancestors()
                    .find(|a| a.is(LAYOUT_ELEMENT))
                    .and_then(|a| layout_element_id(&a))
                {
                    if let Some(fragment) = diagram.object_mut(owner_id) {
                        fragment.owned_splits.push(object.clone());
                    }
                }
            }
            diagram.objects.push(object);
        }

        if diagram.objects.is_empty() {
            tracing::trace!("Diagram {} has no layout objects", diagram.key);
            return Ok(None);
        }
        Ok(Some(diagram))
    }
}

/// A single normal path component: layout companions sit next to the payload.
fn is_plain_file_name(stream: &str) -> bool {
    let mut components = Path::new(stream).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Element id shown by a layout element, from its own `elementID` child.
fn layout_element_id<'a>(element: &Node<'a>) -> Option<&'a str> {
    element
        .descendants_pruned(LAYOUT_ELEMENT)
        .find(|n| n.is("elementID"))
        .and_then(|n| element_ref(&n))
}

fn layout_object(element: &Node<'_>) -> Option<DiagramObject> {
    let element_id = layout_element_id(element).unwrap_or_default();
    let uml_type = element.attr("elementClass").unwrap_or_default();
    if element_id.is_empty() && uml_type != SPLIT {
        return None;
    }
    let geometry = element
        .descendants_pruned(LAYOUT_ELEMENT)
        .find(|n| n.is("geometry"))
        .map(|n| n.inner_text())
        .filter(|g| !g.is_empty())?;
    Some(DiagramObject::new(element_id, geometry, uml_type))
}
