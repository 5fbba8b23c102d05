//! Activity diagram contents: object nodes in a state, and partitions.

use super::{Extraction, Extractor, Pass, is_type, required, required_id, uml};
use crate::document::DocumentSet;
use crate::error::SkipReason;
use crate::model::{IdMap, TextMap};
use crate::xml::Node;

// ============================================================================
// OBJECTS
// ============================================================================

/// Central buffer node id → name of the state it is in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Objects;

impl Extractor for Objects {
    type Output = TextMap;

    const PASS: Pass = Pass::Objects;

    fn extract(&self, docs: &DocumentSet) -> Extraction<TextMap> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);

        for node in docs
            .elements_named("node")
            .filter(|n| is_type(n, uml::CENTRAL_BUFFER_NODE))
        {
            match object_state(docs, &node, &mut out) {
                Ok((id, state)) => {
                    out.insert_first(&node, id, state.to_string());
                }
                Err(reason) => out.skip(&node, reason),
            }
        }

        out
    }
}

fn object_state<'a>(
    docs: &'a DocumentSet,
    node: &Node<'a>,
    out: &mut Extraction<TextMap>,
) -> Result<(&'a str, &'a str), SkipReason> {
    let id = required_id(node)?;
    out.trace(format!("Getting objectNode with ObjectID: '{id}'"));

    let in_state = node
        .descendants_named("inState")
        .next()
        .ok_or(SkipReason::MissingChild("inState"))?;
    let state_id = in_state
        .xmi_idref()
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::MissingAttribute("xmi:idref"))?;
    out.trace(format!("Getting inState value '{state_id}'"));

    let state = docs
        .find_by_id_named(state_id, "subvertex")
        .filter(|s| is_type(s, uml::STATE))
        .ok_or_else(|| SkipReason::Unresolved(state_id.to_string()))?;
    let name = state
        .attr("name")
        .filter(|n| !n.is_empty())
        .ok_or(SkipReason::Empty("state name"))?;
    out.trace(format!("Getting object state '{name}'"));

    Ok((id, name))
}

// ============================================================================
// PARTITIONS
// ============================================================================

/// Activity partition id → id of the element it represents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Partitions;

impl Extractor for Partitions {
    type Output = IdMap;

    const PASS: Pass = Pass::Partitions;

    fn extract(&self, docs: &DocumentSet) -> Extraction<IdMap> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);

        for node in docs
            .elements_named("group")
            .filter(|n| is_type(n, uml::ACTIVITY_PARTITION))
        {
            let id = match required_id(&node) {
                Ok(id) => id,
                Err(reason) => {
                    out.skip(&node, reason);
                    continue;
                }
            };
            out.trace(format!("Getting partitionID: '{id}'"));
            let represents = match required(&node, "represents") {
                Ok(represents) => represents,
                Err(reason) => {
                    out.skip(&node, reason);
                    continue;
                }
            };
            out.trace(format!("Getting representsID: '{represents}'"));
            out.insert_first(&node, id, represents.into());
        }

        out
    }
}
