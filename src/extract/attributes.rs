//! Plain class attributes: `ownedAttribute`s of a class that are not
//! association ends.

use rustc_hash::FxHashSet;

use super::{Extraction, Extractor, Pass, bound_value, is_type, required_id, uml};
use crate::document::DocumentSet;
use crate::error::SkipReason;
use crate::model::OwnedAttribute;
use crate::resolve::child_ref;

#[derive(Debug, Clone, Copy, Default)]
pub struct Attributes;

impl Extractor for Attributes {
    type Output = Vec<OwnedAttribute>;

    const PASS: Pass = Pass::Attributes;

    fn extract(&self, docs: &DocumentSet) -> Extraction<Vec<OwnedAttribute>> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);
        let mut seen = FxHashSet::default();

        for node in docs.elements_named("ownedAttribute") {
            if node.attr("association").is_some() {
                continue;
            }
            let Some(owner) = node
                .parent()
                .filter(|p| p.is("packagedElement") && is_type(p, uml::CLASS))
            else {
                continue;
            };
            let Ok(owner_id) = required_id(&owner) else {
                continue;
            };
            let id = match required_id(&node) {
                Ok(id) => id,
                Err(reason) => {
                    out.skip(&node, reason);
                    continue;
                }
            };
            if !seen.insert(id) {
                out.skip(&node, SkipReason::Duplicate(id.to_string()));
                continue;
            }

            let type_id = node
                .attr("type")
                .filter(|t| !t.is_empty())
                .or_else(|| child_ref(&node, "type"));
            out.value.push(OwnedAttribute {
                owner_id: owner_id.into(),
                id: id.into(),
                name: node.attr("name").unwrap_or_default().to_string(),
                type_id: type_id.map(Into::into),
                lower_bound: bound_value(&node, "lowerValue", "0"),
                upper_bound: bound_value(&node, "upperValue", ""),
            });
        }

        out
    }
}
