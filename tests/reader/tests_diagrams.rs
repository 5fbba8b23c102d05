//! Diagrams read from layout files inside the archive.

use mdzip::{DiagramKey, SkipReason};

use crate::helpers::archive_fixtures::Workspace;

const MODEL: &str = r#"<packagedElement xmi:type="uml:Package" xmi:id="PKG" name="Orders">
  <xmi:Extension extender="MagicDraw UML 2021x">
    <modelExtension>
      <ownedDiagram xmi:type="uml:Diagram" xmi:id="D1" name="Checkout" ownerOfDiagram="I1">
        <xmi:Extension extender="MagicDraw UML 2021x">
          <diagramRepresentation>
            <diagram:DiagramRepresentationObject xmlns:diagram="http://www.nomagic.com/ns/magicdraw/core/diagram/1.0" ID="R1" type="Sequence Diagram">
              <diagramContents contentHash="abc" exporterName="MagicDraw UML">
                <binaryObject streamContentID="BINARY-checkout"/>
              </diagramContents>
            </diagram:DiagramRepresentationObject>
          </diagramRepresentation>
        </xmi:Extension>
      </ownedDiagram>
      <ownedDiagram xmi:type="uml:Diagram" xmi:id="D2" name="Missing" ownerOfDiagram="PKG">
        <xmi:Extension><diagramRepresentation><diagramContents>
          <binaryObject streamContentID="BINARY-missing"/>
        </diagramContents></diagramRepresentation></xmi:Extension>
      </ownedDiagram>
    </modelExtension>
  </xmi:Extension>
  <packagedElement xmi:type="uml:Interaction" xmi:id="I1" name="Checkout">
    <fragment xmi:type="uml:CombinedFragment" xmi:id="F1" interactionOperator="alt"/>
  </packagedElement>
</packagedElement>"#;

// Layout files use `xmi:` without declaring it.
const LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<diagram:DiagramContents xmlns:diagram="http://www.nomagic.com/ns/magicdraw/core/diagram/1.0">
  <mdElement elementClass="Interaction" xmi:id="V1">
    <elementID xmi:idref="I1"/>
    <geometry>0, 0, 500, 400</geometry>
    <mdOwnedViews>
      <mdElement elementClass="CombinedFragment" xmi:id="V2">
        <elementID xmi:idref="F1"/>
        <geometry>20, 40, 300, 200</geometry>
        <mdOwnedViews>
          <mdElement elementClass="Split" xmi:id="V3">
            <geometry>20, 140, 300, 100</geometry>
          </mdElement>
        </mdOwnedViews>
      </mdElement>
    </mdOwnedViews>
  </mdElement>
</diagram:DiagramContents>"#;

#[test]
fn test_diagram_objects_from_layout_companion() {
    let ws = Workspace::new();
    ws.archive("Project.mdzip", Some(MODEL), None, &[("BINARY-checkout", LAYOUT)]);
    let (reader, _) = ws.open();

    let diagrams = reader.diagrams().unwrap();
    assert_eq!(diagrams.len(), 1);
    let diagram = diagrams.get(&DiagramKey::new("I1", "Checkout")).unwrap();
    assert_eq!(diagram.objects.len(), 3);

    let fragment = diagram.object("F1").unwrap();
    assert_eq!(fragment.geometry, "20, 40, 300, 200");
    assert_eq!(fragment.owned_splits.len(), 1);
    assert_eq!(fragment.owned_splits[0].geometry, "20, 140, 300, 100");

    assert_eq!(reader.diagram_objects().unwrap().count(), 3);
}

#[test]
fn test_missing_layout_is_reported_not_fatal() {
    let ws = Workspace::new();
    ws.archive("Project.mdzip", Some(MODEL), None, &[("BINARY-checkout", LAYOUT)]);
    let (reader, log) = ws.open();

    reader.diagrams().unwrap();
    let skipped = reader.skipped();
    assert_eq!(skipped.len(), 1);
    assert!(matches!(skipped[0].reason, SkipReason::Layout(_)));
    assert!(log.lines().iter().any(|l| l.contains("BINARY-missing")));
}
