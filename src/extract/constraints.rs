//! Constraints (`ownedRule`) owned by classes.

use rustc_hash::FxHashMap;

use super::{Extraction, Extractor, Pass, is_type, required_id, uml};
use crate::document::DocumentSet;
use crate::error::SkipReason;
use crate::model::{Constraint, ConstraintMap};
use crate::xml::Node;

/// Class id → its constraints in document order.
///
/// Rules owned by anything other than a class are ignored without a diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Constraints;

impl Extractor for Constraints {
    type Output = ConstraintMap;

    const PASS: Pass = Pass::Constraints;

    fn extract(&self, docs: &DocumentSet) -> Extraction<ConstraintMap> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);
        // Class id → the class node that claimed it first.
        let mut owners = FxHashMap::default();

        for rule in docs.elements_named("ownedRule") {
            let Some((class, class_id)) = rule
                .parent()
                .filter(|p| is_type(p, uml::CLASS))
                .and_then(|p| required_id(&p).ok().map(|id| (p, id)))
            else {
                continue;
            };
            if *owners.entry(class_id).or_insert(class) != class {
                out.skip(&rule, SkipReason::Duplicate(class_id.to_string()));
                continue;
            }

            match constraint(&rule) {
                Ok(constraint) => {
                    out.trace(format!(
                        "Getting constraint '{}' on class '{class_id}'",
                        constraint.name
                    ));
                    out.value
                        .entry(class_id.into())
                        .or_default()
                        .push(constraint);
                }
                Err(reason) => out.skip(&rule, reason),
            }
        }

        out
    }
}

fn constraint(rule: &Node<'_>) -> Result<Constraint, SkipReason> {
    let name = rule
        .attr("name")
        .filter(|n| !n.is_empty())
        .ok_or(SkipReason::MissingAttribute("name"))?;
    let body = specification_text(rule, "body").ok_or(SkipReason::Empty("constraint body"))?;
    let language =
        specification_text(rule, "language").ok_or(SkipReason::Empty("constraint language"))?;
    Ok(Constraint::new(name, body, language))
}

fn specification_text(rule: &Node<'_>, part: &str) -> Option<String> {
    rule.path(&["specification", part])
        .map(|n| n.inner_text())
        .filter(|t| !t.is_empty())
}
