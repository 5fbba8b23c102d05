//! End-to-end extraction from real archives.

use mdzip::{AggregationKind, ElementId, SkipReason};

use crate::helpers::archive_fixtures::Workspace;

const PROJECT: &str = r#"<uml:Model xmi:type="uml:Model" xmi:id="M1" name="Shop">
  <packagedElement xmi:type="uml:Package" xmi:id="PKG" name="Orders">
    <packagedElement xmi:type="uml:Class" xmi:id="C1" name="Order">
      <ownedRule xmi:type="uml:Constraint" xmi:id="R1" name="hasLines">
        <specification xmi:type="uml:OpaqueExpression" xmi:id="E1">
          <body>self.lines-&gt;notEmpty()</body>
          <language>OCL2.0</language>
        </specification>
      </ownedRule>
      <ownedAttribute xmi:id="P-customer" name="customer">
        <type href="Library.mdzip#C2"/>
        <lowerValue xmi:type="uml:LiteralInteger" xmi:id="LV1"/>
        <upperValue xmi:type="uml:LiteralUnlimitedNatural" xmi:id="UV1" value="1"/>
      </ownedAttribute>
      <ownedAttribute xmi:id="P-total" name="total" type="T-Decimal"/>
    </packagedElement>
    <packagedElement xmi:type="uml:Association" xmi:id="AS1">
      <memberEnd xmi:idref="E-order"/>
      <memberEnd xmi:idref="P-customer"/>
      <ownedEnd xmi:type="uml:Property" xmi:id="E-order" type="C1"/>
    </packagedElement>
    <packagedElement xmi:type="uml:Collaboration" xmi:id="COL">
      <ownedAttribute xmi:id="P-shop" name="shop" type="C1"/>
      <ownedAttribute xmi:id="P-bank" name="bank"><type href="Library.mdzip#C2"/></ownedAttribute>
    </packagedElement>
    <packagedElement xmi:type="uml:Interaction" xmi:id="I1" name="Checkout">
      <lifeline xmi:id="L1" represents="P-shop"/>
      <lifeline xmi:id="L2" represents="P-bank"/>
      <fragment xmi:type="uml:MessageOccurrenceSpecification" xmi:id="O1"><covered xmi:idref="L1"/></fragment>
      <fragment xmi:type="uml:MessageOccurrenceSpecification" xmi:id="O2"><covered xmi:idref="L2"/></fragment>
      <fragment xmi:type="uml:CombinedFragment" xmi:id="F1" interactionOperator="alt">
        <operand xmi:id="OP1">
          <guard xmi:id="G1"><specification xmi:type="uml:LiteralString" xmi:id="V1" value="x&gt;0"/></guard>
        </operand>
        <operand xmi:id="OP2"/>
      </fragment>
      <message xmi:id="MSG1" name="pay" messageSort="asynchSignal" sendEvent="O1" receiveEvent="O2"/>
    </packagedElement>
    <packagedElement xmi:type="uml:Activity" xmi:id="ACT">
      <node xmi:type="uml:CentralBufferNode" xmi:id="N1"><inState xmi:idref="S1"/></node>
      <group xmi:type="uml:ActivityPartition" xmi:id="PART1" represents="C2"/>
    </packagedElement>
    <packagedElement xmi:type="uml:StateMachine" xmi:id="SM">
      <region xmi:id="RG"><subvertex xmi:type="uml:State" xmi:id="S1" name="Paid"/></region>
    </packagedElement>
    <packagedElement xmi:type="uml:Dependency" xmi:id="DEP1">
      <client xmi:idref="C1"/>
      <supplier href="Library.mdzip#C2"/>
    </packagedElement>
  </packagedElement>
</uml:Model>
<Business_Document_Library:ASMA xmi:id="T1" base_Association="AS1"/>
<Mapping:mapsTo xmlns:Mapping="http://www.magicdraw.com/schemas/Mapping.xmi" xmi:id="T2" base_Dependency="DEP1"/>"#;

const LIBRARY_SHARED: &str = r#"<uml:Package xmi:type="uml:Package" xmi:id="LIB" name="Library">
  <packagedElement xmi:type="uml:Class" xmi:id="C2" name="Customer"/>
</uml:Package>"#;

fn shop() -> Workspace {
    let ws = Workspace::new();
    ws.archive("Project.mdzip", Some(PROJECT), None, &[]);
    ws.archive("Library.mdzip", None, Some(LIBRARY_SHARED), &[]);
    ws
}

#[test]
fn test_documents_keyed_by_archive_and_role() {
    let ws = shop();
    let (reader, _) = ws.open();
    let mut keys: Vec<_> = reader.documents().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["Library.mdzip_SharedModel", "Project.mdzip_Model"]);
}

#[test]
fn test_classes_span_model_and_shared_model() {
    let ws = shop();
    let (reader, _) = ws.open();
    let classes = reader.classes().unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes.get("C1").map(String::as_str), Some("Order"));
    assert_eq!(classes.get("C2").map(String::as_str), Some("Customer"));
}

#[test]
fn test_asma_association_crosses_archives() {
    let ws = shop();
    let (reader, _) = ws.open();
    let associations = reader.associations().unwrap();
    assert_eq!(associations.len(), 1);

    let association = &associations[0];
    assert!(association.is_asma());
    assert_eq!(association.source.end_class_id, "C1");
    assert_eq!(association.source.aggregation, AggregationKind::Shared);
    assert_eq!(association.target.end_class_id, "C2");
    assert_eq!(association.target.name, "customer");
    assert_eq!(association.target.lower_bound, "0");
    assert_eq!(association.target.upper_bound, "1");
}

#[test]
fn test_sequence_diagram_entities() {
    let ws = shop();
    let (reader, _) = ws.open();

    let fragments = reader.fragments().unwrap();
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].owner_id, "I1");
    assert_eq!(fragments[0].operator, "alt");
    assert_eq!(fragments[0].operand_guards, vec!["x>0", "else"]);

    let messages = reader.messages().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].source_id, "L1");
    assert_eq!(messages[0].target_id, "L2");
    assert!(messages[0].asynchronous);

    let lifelines = reader.lifelines().unwrap();
    assert_eq!(lifelines.get("L1").unwrap(), "C1");
    assert_eq!(lifelines.get("L2").unwrap(), "C2");
}

#[test]
fn test_activity_entities_and_dependencies() {
    let ws = shop();
    let (reader, _) = ws.open();
    assert_eq!(reader.objects().unwrap().get("N1").map(String::as_str), Some("Paid"));
    assert_eq!(reader.partitions().unwrap().get("PART1").unwrap(), "C2");
    assert_eq!(reader.dependencies().unwrap().get("C1").unwrap(), "C2");
}

#[test]
fn test_constraints_and_attributes() {
    let ws = shop();
    let (reader, _) = ws.open();

    let constraints = reader.constraints("C1").unwrap();
    assert_eq!(constraints.len(), 1);
    assert_eq!(constraints[0].name, "hasLines");
    assert_eq!(constraints[0].body, "self.lines->notEmpty()");
    assert_eq!(constraints[0].language, "OCL2.0");
    assert!(reader.constraints("C2").unwrap().is_empty());

    let attributes = reader.attributes().unwrap();
    let names: Vec<_> = attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["customer", "total"]);
    assert_eq!(attributes[0].type_id, Some(ElementId::from("C2")));
}

#[test]
fn test_extract_all_matches_accessors() {
    let ws = shop();
    let (reader, _) = ws.open();
    let model = reader.extract_all().unwrap();
    assert_eq!(&model.classes, reader.classes().unwrap());
    assert_eq!(model.associations.as_slice(), reader.associations().unwrap());
    assert_eq!(model.fragments.len(), 1);
    assert_eq!(model.messages.len(), 1);
    assert!(model.skipped.is_empty(), "skipped: {:?}", model.skipped);
}

#[test]
fn test_model_log_receives_timestamped_discoveries() {
    let ws = shop();
    let (reader, log) = ws.open();
    reader.objects().unwrap();
    reader.partitions().unwrap();

    let lines = log.lines();
    for expected in [
        "Getting objectNode with ObjectID: 'N1'",
        "Getting inState value 'S1'",
        "Getting object state 'Paid'",
        "Getting partitionID: 'PART1'",
        "Getting representsID: 'C2'",
    ] {
        let line = lines
            .iter()
            .find(|l| l.ends_with(expected))
            .unwrap_or_else(|| panic!("no log line ending with {expected:?} in {lines:#?}"));
        assert_eq!(line.len(), expected.len() + "HH:MM:SS ".len());
    }
}

#[test]
fn test_duplicate_class_across_archives_keeps_first() {
    let ws = Workspace::new();
    ws.archive(
        "A.mdzip",
        Some(r#"<packagedElement xmi:type="uml:Class" xmi:id="C1" name="Order"/>"#),
        None,
        &[],
    );
    ws.archive(
        "B.mdzip",
        Some(r#"<packagedElement xmi:type="uml:Class" xmi:id="C1" name="Purchase"/>"#),
        None,
        &[],
    );
    let (reader, _) = ws.open();
    assert_eq!(reader.classes().unwrap().get("C1").map(String::as_str), Some("Order"));
    let skipped = reader.skipped();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].reason, SkipReason::Duplicate("C1".into()));
}
