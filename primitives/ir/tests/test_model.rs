//! Unit tests for the wiregen model types.

use wiregen_ir::*;

fn u16_field(name: &str) -> PrimitiveField {
    let ty = FieldType::parse("unsigned16").expect("unsigned16 should parse");
    let mut field =
        PrimitiveField { name: name.into(), in_memory: ty, encoded: ty, ..Default::default() };
    field.compute_encoded_length();
    field
}

#[test]
fn model_file_round_trip() {
    let mut structure = StructureModel {
        name: "Telemetry".into(),
        type_name: "DemoTelemetry_t".into(),
        children: vec![
            Encodable::Primitive(u16_field("speed")),
            Encodable::Primitive(u16_field("heading")),
        ],
        ..Default::default()
    };
    structure.compute_encoded_length();

    let model = ProtocolModel {
        meta: ProtocolMeta {
            name: "Demo".into(),
            prefix: "Demo".into(),
            api: "1".into(),
            version: "1.0.a".into(),
            is_big_endian: true,
            ..Default::default()
        },
        enums: vec![EnumModel::new(
            "DemoPackets".into(),
            "Packet identifiers".into(),
            vec![EnumValue { name: "DEMO_TELEMETRY".into(), ..Default::default() }],
        )],
        declarations: vec![Declaration::Packet(PacketModel {
            structure,
            id: "DEMO_TELEMETRY".into(),
            ..Default::default()
        })],
        ..Default::default()
    };

    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("model.json");
    model.to_file(&path).expect("model should serialize");

    let restored = ProtocolModel::from_file(&path).expect("model should deserialize");
    assert_eq!(restored.meta.name, "Demo");
    assert_eq!(restored.packets().len(), 1);
    assert_eq!(restored.structures().len(), 0);
    assert_eq!(restored.declaration_count(), 1);

    let packet = restored.packets()[0];
    assert_eq!(packet.id, "DEMO_TELEMETRY");
    assert_eq!(packet.structure.encoded_length.max_encoded_length, "2 + 2");
    assert!(packet.structure.encoded_length.min_equals_max());
}

#[test]
fn encodable_accessors_dispatch_by_variant() {
    let mut field = u16_field("count");
    field.comment = "element count".into();
    let leaf = Encodable::Primitive(field);
    assert!(leaf.is_primitive());
    assert!(!leaf.is_array());
    assert_eq!(leaf.name(), "count");
    assert_eq!(leaf.comment(), "element count");

    let nested = Encodable::Structure(StructureModel {
        name: "position".into(),
        array: Some("3".into()),
        has_bitfields: true,
        ..Default::default()
    });
    assert!(!nested.is_primitive());
    assert!(nested.is_array());
    assert!(nested.uses_bitfields());
    assert!(nested.uses_iterator());
}
