//! Sequence diagram contents: combined fragments, messages and lifelines.

use rustc_hash::FxHashSet;

use super::{Extraction, Extractor, Pass, is_type, required, required_id, uml};
use crate::document::DocumentSet;
use crate::error::SkipReason;
use crate::model::{ASYNCH_SIGNAL, ELSE_GUARD, Fragment, IdMap, Message};
use crate::resolve::child_ref;
use crate::xml::Node;

// ============================================================================
// FRAGMENTS
// ============================================================================

/// Combined fragments of every interaction, with their operand guards.
///
/// An operand without a guard specification value gets the guard `else`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fragments;

impl Extractor for Fragments {
    type Output = Vec<Fragment>;

    const PASS: Pass = Pass::Fragments;

    fn extract(&self, docs: &DocumentSet) -> Extraction<Vec<Fragment>> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);
        let mut seen = FxHashSet::default();

        for node in docs
            .elements_named("fragment")
            .filter(|n| is_type(n, uml::COMBINED_FRAGMENT))
        {
            let Some(owner_id) = enclosing_interaction(&node).and_then(|i| required_id(&i).ok())
            else {
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
            let fragment = Fragment {
                owner_id: owner_id.into(),
                id: id.into(),
                operator: node.attr("interactionOperator").unwrap_or_default().to_string(),
                operand_guards: node.children_named("operand").filter_map(guard).collect(),
            };
            out.trace(format!(
                "Getting fragment '{}' ({}) in interaction '{owner_id}'",
                fragment.id, fragment.operator
            ));
            out.value.push(fragment);
        }

        out
    }
}

/// Nearest `packagedElement` of type `uml:Interaction` above a fragment.
fn enclosing_interaction<'a>(fragment: &Node<'a>) -> Option<Node<'a>> {
    fragment
        .ancestors()
        .find(|a| a.is("packagedElement") && is_type(a, uml::INTERACTION))
}

fn guard(operand: Node<'_>) -> Option<String> {
    let guard = match operand.path(&["guard", "specification"]) {
        Some(spec) => spec.attr("value").unwrap_or(ELSE_GUARD),
        None => ELSE_GUARD,
    };
    (!guard.is_empty()).then(|| guard.to_string())
}

// ============================================================================
// MESSAGES
// ============================================================================

/// Messages between lifelines.
///
/// The lifelines come from the `covered` reference of the send and receive
/// occurrence fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Messages;

impl Extractor for Messages {
    type Output = Vec<Message>;

    const PASS: Pass = Pass::Messages;

    fn extract(&self, docs: &DocumentSet) -> Extraction<Vec<Message>> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);
        let mut seen = FxHashSet::default();

        for node in docs.elements_named("message") {
            match message(docs, &node) {
                Ok(message) if !seen.insert(message.id.clone()) => {
                    out.skip(&node, SkipReason::Duplicate(message.id.to_string()));
                }
                Ok(message) => out.value.push(message),
                Err(reason) => out.skip(&node, reason),
            }
        }

        out
    }
}

fn message(docs: &DocumentSet, node: &Node<'_>) -> Result<Message, SkipReason> {
    let id = required_id(node)?;
    let source_id = covered_lifeline(docs, node, "sendEvent")?;
    let target_id = covered_lifeline(docs, node, "receiveEvent")?;
    Ok(Message {
        id: id.into(),
        source_id: source_id.into(),
        target_id: target_id.into(),
        name: node.attr("name").unwrap_or_default().to_string(),
        asynchronous: node.attr("messageSort") == Some(ASYNCH_SIGNAL),
    })
}

fn covered_lifeline<'a>(
    docs: &'a DocumentSet,
    message: &Node<'_>,
    event: &'static str,
) -> Result<&'a str, SkipReason> {
    let occurrence_id = required(message, event)?;
    let occurrence = docs
        .find_by_id_named(occurrence_id, "fragment")
        .ok_or_else(|| SkipReason::Unresolved(occurrence_id.to_string()))?;
    child_ref(&occurrence, "covered").ok_or(SkipReason::MissingChild("covered"))
}

// ============================================================================
// LIFELINES
// ============================================================================

/// Lifeline id → id of the classifier typing the property it represents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifelines;

impl Extractor for Lifelines {
    type Output = IdMap;

    const PASS: Pass = Pass::Lifelines;

    fn extract(&self, docs: &DocumentSet) -> Extraction<IdMap> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);

        for node in docs.elements_named("lifeline") {
            match lifeline_type(docs, &node) {
                Ok((id, type_id)) => {
                    out.insert_first(&node, id, type_id.into());
                }
                Err(reason) => out.skip(&node, reason),
            }
        }

        out
    }
}

fn lifeline_type<'a>(
    docs: &'a DocumentSet,
    node: &Node<'a>,
) -> Result<(&'a str, &'a str), SkipReason> {
    let id = required_id(node)?;
    let represents = required(node, "represents")?;
    let property = docs
        .find_by_id_named(represents, "ownedAttribute")
        .ok_or_else(|| SkipReason::Unresolved(represents.to_string()))?;
    let type_id = property
        .attr("type")
        .filter(|t| !t.is_empty())
        .or_else(|| child_ref(&property, "type"))
        .ok_or(SkipReason::MissingAttribute("type"))?;
    Ok((id, type_id))
}
