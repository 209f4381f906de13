//! Packet builder: structure parsing plus identity and interface selection.

use ir::PacketModel;
use logging::Diagnostics;
use registry::EnumRegistry;

use crate::dom::XmlElement;
use crate::structures::{parse_structure_element, to_upper_snake};

/// Build a packet from a `Packet` element. Packets reject the attributes
/// that only make sense on embedded structures, pick their interface style,
/// and register their identifier for documentation links.
pub(crate) fn parse_packet_element(
    element: &XmlElement,
    prefix: &str,
    enum_registry: &mut EnumRegistry,
    diagnostics: &mut Diagnostics,
) -> PacketModel {
    let mut structure = parse_structure_element(element, prefix, enum_registry, diagnostics);

    if structure.array.is_some() {
        diagnostics.report(&structure.name, "packets cannot be an array");
        structure.array = None;
        structure.variable_array = None;
        structure.compute_encoded_length();
    }

    if structure.depends_on.is_some() {
        diagnostics.report(&structure.name, "dependsOn makes no sense for a packet");
        structure.depends_on = None;
        structure.compute_encoded_length();
    }

    // If no ID is supplied use the upper-snake packet name, assuming the
    // user defines it elsewhere
    let id = match element.non_empty_attribute("ID") {
        Some(id) => id,
        None => to_upper_snake(&structure.name),
    };

    let mut structure_interface = element.attribute_is_true("structureInterface");
    let mut parameter_interface = element.attribute_is_true("parameterInterface");

    if structure.children.is_empty() {
        // An empty packet has nothing to wrap in a structure
        structure_interface = false;
        parameter_interface = true;
    } else if !structure_interface && !parameter_interface {
        // No guidance given: a single field is not worth a structure
        if structure.children.len() <= 1 {
            parameter_interface = true;
        } else {
            structure_interface = true;
        }
    }

    enum_registry.insert_packet_id(&id);

    PacketModel {
        structure,
        id,
        module_name: element.non_empty_attribute("file"),
        structure_interface,
        parameter_interface,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> (PacketModel, Diagnostics) {
        let element = XmlElement::parse_str(xml).expect("document should parse");
        let mut registry = EnumRegistry::new();
        let mut diagnostics = Diagnostics::new();
        let packet = parse_packet_element(&element, "Demo", &mut registry, &mut diagnostics);
        (packet, diagnostics)
    }

    #[test]
    fn empty_packet_uses_parameter_interface() {
        let (packet, diagnostics) = parse(r#"<Packet name="Ping" ID="0x01"/>"#);
        assert!(diagnostics.is_empty());
        assert_eq!(packet.id, "0x01");
        assert!(packet.parameter_interface);
        assert!(!packet.structure_interface);
    }

    #[test]
    fn single_field_prefers_parameters_and_multiple_prefer_structure() {
        let (single, _) = parse(
            r#"<Packet name="Echo" ID="ECHO_ID">
                 <Data name="n" inMemoryType="unsigned16"/>
               </Packet>"#,
        );
        assert!(single.parameter_interface);
        assert!(!single.structure_interface);

        let (multi, _) = parse(
            r#"<Packet name="Pair" ID="2">
                 <Data name="a" inMemoryType="unsigned16"/>
                 <Data name="b" inMemoryType="unsigned16"/>
               </Packet>"#,
        );
        assert!(multi.structure_interface);
        assert!(!multi.parameter_interface);
    }

    #[test]
    fn explicit_interface_flags_are_honored() {
        let (packet, _) = parse(
            r#"<Packet name="Echo" ID="1" structureInterface="true">
                 <Data name="n" inMemoryType="unsigned16"/>
               </Packet>"#,
        );
        assert!(packet.structure_interface);
        assert!(!packet.parameter_interface);
    }

    #[test]
    fn packet_attribute_restrictions() {
        let (packet, diagnostics) = parse(
            r#"<Packet name="Burst" array="4" dependsOn="mode">
                 <Data name="n" inMemoryType="unsigned16"/>
               </Packet>"#,
        );
        assert!(packet.structure.array.is_none());
        assert!(packet.structure.depends_on.is_none());
        assert_eq!(diagnostics.lines()[0], "Burst: packets cannot be an array");
        assert_eq!(diagnostics.lines()[1], "Burst: dependsOn makes no sense for a packet");
        // No declared ID falls back to the upper-snake name
        assert_eq!(packet.id, "BURST");
    }
}
