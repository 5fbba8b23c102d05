//! `mapsTo` dependencies: client element id → supplier element id.

use super::{Extraction, Extractor, Pass, required};
use crate::document::DocumentSet;
use crate::error::SkipReason;
use crate::model::IdMap;
use crate::resolve::child_ref;
use crate::xml::Node;

/// Dependencies tagged with a `mapsTo` stereotype application.
///
/// A client mapped twice keeps its first supplier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dependencies;

impl Extractor for Dependencies {
    type Output = IdMap;

    const PASS: Pass = Pass::Dependencies;

    fn extract(&self, docs: &DocumentSet) -> Extraction<IdMap> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);

        for tag in docs.elements_local("mapsTo") {
            match mapping(docs, &tag) {
                Ok((source, target)) => {
                    if out.insert_first(&tag, source, target.into()) {
                        out.trace(format!("Getting dependency '{source}' -> '{target}'"));
                    }
                }
                Err(reason) => out.skip(&tag, reason),
            }
        }

        out
    }
}

fn mapping<'a>(docs: &'a DocumentSet, tag: &Node<'_>) -> Result<(&'a str, &'a str), SkipReason> {
    let dependency_id = required(tag, "base_Dependency")?;
    let dependency = docs
        .find_by_id_named(dependency_id, "packagedElement")
        .ok_or_else(|| SkipReason::Unresolved(dependency_id.to_string()))?;
    let source = child_ref(&dependency, "client").ok_or(SkipReason::MissingChild("client"))?;
    let target = child_ref(&dependency, "supplier").ok_or(SkipReason::MissingChild("supplier"))?;
    Ok((source, target))
}
