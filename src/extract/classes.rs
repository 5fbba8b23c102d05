//! Classes: `packagedElement` nodes of type `uml:Class`.

use super::{Extraction, Extractor, Pass, is_type, required_id, uml};
use crate::document::DocumentSet;
use crate::model::TextMap;

/// Class id → class name. First occurrence of an id wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classes;

impl Extractor for Classes {
    type Output = TextMap;

    const PASS: Pass = Pass::Classes;

    fn extract(&self, docs: &DocumentSet) -> Extraction<TextMap> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);

        for node in docs
            .elements_named("packagedElement")
            .filter(|n| is_type(n, uml::CLASS))
        {
            let id = match required_id(&node) {
                Ok(id) => id,
                Err(reason) => {
                    out.skip(&node, reason);
                    continue;
                }
            };
            let name = node.attr("name").unwrap_or_default();
            if out.insert_first(&node, id, name.to_string()) {
                out.trace(format!("Getting class '{name}' with ID: '{id}'"));
            }
        }

        out
    }
}
