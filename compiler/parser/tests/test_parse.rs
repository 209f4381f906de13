//! Whole-document parsing tests.

use ir::{Declaration, Encodable};
use logging::Diagnostics;
use wiregen_parser::{parse_str, ParseError};

fn parse(xml: &str) -> (ir::ProtocolModel, registry::EnumRegistry, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let (model, enum_registry) = parse_str(xml, &mut diagnostics).expect("document should parse");
    (model, enum_registry, diagnostics)
}

#[test]
fn malformed_xml_is_fatal() {
    let mut diagnostics = Diagnostics::new();
    assert!(matches!(
        parse_str("<Protocol name=\"X\"><Data</Protocol>", &mut diagnostics),
        Err(ParseError::Xml(_))
    ));
}

#[test]
fn protocol_attributes_flow_into_the_meta() {
    let (model, _, diagnostics) = parse(
        r#"<Protocol name="Link" prefix="Lnk" api="7" version="2.1" endian="little"
                    comment="A radio link" supportSpecialFloat="false">
             <Packet name="Ping" ID="1"/>
           </Protocol>"#,
    );

    assert!(diagnostics.is_empty());
    assert_eq!(model.meta.name, "Link");
    assert_eq!(model.meta.prefix, "Lnk");
    assert_eq!(model.meta.api, "7");
    assert_eq!(model.meta.version, "2.1");
    assert_eq!(model.meta.comment, "A radio link");
    assert!(!model.meta.is_big_endian);
    assert!(!model.meta.support.special_float);
    assert!(model.meta.support.bitfield);
}

#[test]
fn nested_enums_reach_the_global_registry() {
    let (model, enum_registry, _) = parse(
        r#"<Protocol name="Link">
             <Packet name="Mode" ID="MODE_ID">
               <Enum name="Modes">
                 <Value name="MODE_OFF" value="0x00"/>
                 <Value name="MODE_ON"/>
               </Enum>
               <Data name="mode" inMemoryType="uint8"/>
             </Packet>
           </Protocol>"#,
    );

    let packet = match &model.declarations[0] {
        Declaration::Packet(packet) => packet,
        other => panic!("expected a packet, got {:?}", other),
    };
    assert_eq!(packet.structure.enums.len(), 1);

    // Registered globally, so documentation can resolve the names
    assert_eq!(enum_registry.replace_enumeration_name_with_value("MODE_ON"), "1");
    assert!(enum_registry.is_packet_id("MODE_ID"));
}

#[test]
fn structure_file_override_is_kept() {
    let (model, _, _) = parse(
        r#"<Protocol name="Link" prefix="Lnk">
             <Structure name="Position" file="LnkShared">
               <Data name="x" inMemoryType="unsigned16"/>
               <Data name="y" inMemoryType="unsigned16"/>
             </Structure>
           </Protocol>"#,
    );

    let structure = match &model.declarations[0] {
        Declaration::Structure(structure) => structure,
        other => panic!("expected a structure, got {:?}", other),
    };
    assert_eq!(structure.module_name.as_deref(), Some("LnkShared"));
    assert_eq!(structure.type_name, "LnkPosition_t");
}

#[test]
fn includes_attach_to_their_owner() {
    let (model, _, _) = parse(
        r#"<Protocol name="Link">
             <Include name="linkdefs.h"/>
             <Packet name="Ping" ID="1">
               <Include name="pingdefs.h"/>
             </Packet>
           </Protocol>"#,
    );

    assert_eq!(model.includes, vec!["linkdefs.h".to_string()]);
    let packet = match &model.declarations[0] {
        Declaration::Packet(packet) => packet,
        other => panic!("expected a packet, got {:?}", other),
    };
    assert_eq!(packet.structure.includes, vec!["pingdefs.h".to_string()]);
}

#[test]
fn deeply_nested_structures_parse_recursively() {
    let (model, _, diagnostics) = parse(
        r#"<Protocol name="Link" prefix="Lnk">
             <Packet name="Report" ID="3">
               <Data name="count" inMemoryType="uint8"/>
               <Structure name="entry" array="4" variableArray="count">
                 <Data name="kind" inMemoryType="uint8"/>
                 <Structure name="where">
                   <Data name="x" inMemoryType="unsigned16"/>
                   <Data name="y" inMemoryType="unsigned16"/>
                 </Structure>
               </Structure>
             </Packet>
           </Protocol>"#,
    );

    assert!(diagnostics.is_empty());
    let packet = match &model.declarations[0] {
        Declaration::Packet(packet) => packet,
        other => panic!("expected a packet, got {:?}", other),
    };

    let entry = match &packet.structure.children[1] {
        Encodable::Structure(entry) => entry,
        other => panic!("expected a structure child, got {:?}", other),
    };
    assert_eq!(entry.type_name, "Lnkentry_t");
    assert!(matches!(entry.children[1], Encodable::Structure(_)));

    // Each entry is 1 + 2 + 2 bytes repeated four times; the variable array
    // zeroes the minimum
    assert_eq!(packet.structure.encoded_length.max_encoded_length, "1 + 4 + 8 + 8");
    assert_eq!(packet.structure.encoded_length.min_encoded_length, "1");
    assert!(packet.structure.needs_iterator);
}

#[test]
fn not_encoded_fields_carry_no_wire_metadata() {
    let (model, _, diagnostics) = parse(
        r#"<Protocol name="Link">
             <Packet name="State" ID="4">
               <Data name="shadow" inMemoryType="unsigned32" notEncoded="true"/>
               <Data name="live" inMemoryType="unsigned16"/>
             </Packet>
           </Protocol>"#,
    );

    assert!(diagnostics.is_empty());
    let packet = match &model.declarations[0] {
        Declaration::Packet(packet) => packet,
        other => panic!("expected a packet, got {:?}", other),
    };
    assert_eq!(packet.structure.number_of_encodes(), 1);
    assert_eq!(packet.structure.encoded_length.max_encoded_length, "2");
}
