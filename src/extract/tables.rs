//! Association tables.
//!
//! An association table is an HTML comment placed on a diagram. It belongs to
//! the class that sits in the diagram's package and carries the diagram's
//! name (compared case-insensitively).

use super::{Extraction, Extractor, Pass, is_type, required_id, uml};
use crate::document::DocumentSet;
use crate::error::SkipReason;
use crate::model::TextMap;
use crate::xml::Node;

const HTML_PREFIX: &str = "<html>";

/// Class id → HTML body of its association table.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssociationTables;

impl Extractor for AssociationTables {
    type Output = TextMap;

    const PASS: Pass = Pass::AssociationTables;

    fn extract(&self, docs: &DocumentSet) -> Extraction<TextMap> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);

        for comment in docs.elements_named("ownedComment") {
            let Some(diagram) = comment.parent().filter(|p| p.is("ownedDiagram")) else {
                continue;
            };
            let Some(body) = comment.attr("body").filter(|b| b.starts_with(HTML_PREFIX)) else {
                continue;
            };
            let Some(diagram_name) = diagram.attr("name") else {
                out.skip(&diagram, SkipReason::MissingAttribute("name"));
                continue;
            };
            let Some(package) = enclosing_package(&diagram) else {
                out.skip(&comment, SkipReason::MissingChild("package"));
                continue;
            };

            let wanted = diagram_name.to_lowercase();
            for class in package.children_named("packagedElement").filter(|c| {
                is_type(c, uml::CLASS)
                    && c.attr("name").is_some_and(|n| n.to_lowercase() == wanted)
            }) {
                let Ok(class_id) = required_id(&class) else {
                    continue;
                };
                if out.insert_first(&class, class_id, body.to_string()) {
                    out.trace(format!(
                        "Getting association table '{diagram_name}' for class '{class_id}'"
                    ));
                }
            }
        }

        out
    }
}

/// Nearest enclosing `packagedElement`, if it is a package.
fn enclosing_package<'a>(diagram: &Node<'a>) -> Option<Node<'a>> {
    diagram
        .ancestors()
        .find(|a| a.is("packagedElement"))
        .filter(|p| is_type(p, uml::PACKAGE))
}
