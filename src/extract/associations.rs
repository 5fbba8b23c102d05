//! Associations.
//!
//! MagicDraw profiles mark some associations with an `ASMA` stereotype
//! application instead of plain UML structure:
//!
//! ```xml
//! <Business_Document_Library:ASMA xmi:id="S1" base_Association="A1"/>
//! <packagedElement xmi:type="uml:Association" xmi:id="A1">
//!   <memberEnd xmi:idref="E1"/>
//!   <memberEnd xmi:idref="P1"/>
//!   <ownedEnd xmi:type="uml:Property" xmi:id="E1" type="C1"/>
//! </packagedElement>
//! <ownedAttribute xmi:id="P1" name="lines"><type href="x.xml#C2"/></ownedAttribute>
//! ```
//!
//! The owned end gives the source (aggregation `shared`); the other member
//! end is an `ownedAttribute` somewhere in the document set and gives the
//! target. Plain associations that no `ASMA` tag points at are extracted as
//! well, with the same orientation: an owned end is the source, the next
//! member end the target. Without owned ends the member ends keep their order.

use rustc_hash::FxHashSet;

use super::{Extraction, Extractor, Pass, bound_value, is_type, required, required_id, uml};
use crate::document::DocumentSet;
use crate::error::SkipReason;
use crate::model::{ASMA, AggregationKind, Association, AssociationEnd};
use crate::resolve::{child_ref, element_ref};
use crate::xml::Node;

/// Every association whose two ends resolve.
#[derive(Debug, Clone, Copy, Default)]
pub struct Associations;

impl Extractor for Associations {
    type Output = Vec<Association>;

    const PASS: Pass = Pass::Associations;

    fn extract(&self, docs: &DocumentSet) -> Extraction<Vec<Association>> {
        let mut out = Extraction::<Self::Output>::new(Self::PASS);
        let mut stereotyped = FxHashSet::default();

        for tag in docs.elements_local(ASMA) {
            if let Some(base) = tag.attr("base_Association").filter(|b| !b.is_empty()) {
                if !stereotyped.insert(base) {
                    out.skip(&tag, SkipReason::Duplicate(base.to_string()));
                    continue;
                }
            }
            match asma_association(docs, &tag) {
                Ok(association) => {
                    out.trace(format!(
                        "Getting ASMA association from '{}' to '{}'",
                        association.source.end_class_id, association.target.end_class_id
                    ));
                    out.value.push(association);
                }
                Err(reason) => out.skip(&tag, reason),
            }
        }

        for node in docs
            .elements_named("packagedElement")
            .filter(|n| is_type(n, uml::ASSOCIATION))
        {
            if node.xmi_id().is_some_and(|id| stereotyped.contains(id)) {
                continue;
            }
            match plain_association(docs, &node) {
                Ok(association) => out.value.push(association),
                Err(reason) => out.skip(&node, reason),
            }
        }

        out
    }
}

fn asma_association(docs: &DocumentSet, tag: &Node<'_>) -> Result<Association, SkipReason> {
    let association_id = required(tag, "base_Association")?;
    let association = docs
        .find_by_id_named(association_id, "packagedElement")
        .ok_or_else(|| SkipReason::Unresolved(association_id.to_string()))?;

    let owned_end = association
        .child("ownedEnd")
        .ok_or(SkipReason::MissingChild("ownedEnd"))?;
    let source_type = required(&owned_end, "type")?;
    let owned_end_id = required_id(&owned_end)?;

    let mut source = None;
    let mut target_ref = None;
    for member in association.children_named("memberEnd") {
        match element_ref(&member) {
            Some(id) if id != owned_end_id => {
                target_ref.get_or_insert(id);
            }
            _ => {
                source = Some(
                    AssociationEnd::new(source_type).with_aggregation(AggregationKind::Shared),
                );
            }
        }
    }

    let source = source.ok_or_else(|| SkipReason::Unresolved(owned_end_id.to_string()))?;
    let target_ref = target_ref.ok_or(SkipReason::MissingChild("memberEnd"))?;
    let attribute = docs
        .find_by_id_named(target_ref, "ownedAttribute")
        .ok_or_else(|| SkipReason::Unresolved(target_ref.to_string()))?;
    let target = property_end(&attribute)?;

    Ok(Association::new(source, target).with_stereotype(ASMA))
}

fn plain_association(docs: &DocumentSet, node: &Node<'_>) -> Result<Association, SkipReason> {
    let mut members = node
        .children_named("memberEnd")
        .map(|member| element_ref(&member).ok_or(SkipReason::MissingAttribute("xmi:idref")))
        .collect::<Result<Vec<_>, _>>()?;
    // Owned ends first, so the source is the end the association owns.
    members.sort_by_key(|id| {
        !node
            .children_named("ownedEnd")
            .any(|end| end.xmi_id() == Some(*id))
    });

    let mut ends = members.into_iter().map(|id| {
        let property = docs
            .find_by_id(id)
            .ok_or_else(|| SkipReason::Unresolved(id.to_string()))?;
        property_end(&property)
    });

    let source = ends.next().ok_or(SkipReason::MissingChild("memberEnd"))??;
    let target = ends.next().ok_or(SkipReason::MissingChild("memberEnd"))??;
    Ok(Association::new(source, target))
}

/// End described by a property: name, bounds, type and aggregation.
fn property_end(property: &Node<'_>) -> Result<AssociationEnd, SkipReason> {
    let type_id = child_ref(property, "type")
        .or_else(|| property.attr("type").filter(|t| !t.is_empty()))
        .ok_or(SkipReason::MissingChild("type"))?;

    let mut end = AssociationEnd::new(type_id);
    end.name = property.attr("name").unwrap_or_default().to_string();
    end.lower_bound = bound_value(property, "lowerValue", "0").unwrap_or_default();
    end.upper_bound = bound_value(property, "upperValue", "").unwrap_or_default();
    end.aggregation = match property.attr("aggregation") {
        Some("shared") => AggregationKind::Shared,
        Some("composite") => AggregationKind::Composite,
        _ => AggregationKind::None,
    };
    Ok(end)
}
