//! Top-level document walk.

use ir::{Declaration, ProtocolMeta, ProtocolModel, ProtocolSupport};
use logging::Diagnostics;
use registry::EnumRegistry;

use crate::dom::XmlElement;
use crate::enums::parse_enum_element;
use crate::packets::parse_packet_element;
use crate::structures::parse_structure_element;
use crate::{ParseError, Result};

/// Walk a parsed `Protocol` document and build the protocol model plus the
/// global enumeration registry. Declarations keep their document order,
/// which emission depends on when packets share an output module.
pub fn parse_document(
    root: &XmlElement,
    diagnostics: &mut Diagnostics,
) -> Result<(ProtocolModel, EnumRegistry)> {
    if root.name != "Protocol" {
        return Err(ParseError::WrongRoot(root.name.clone()));
    }

    let name = root.non_empty_attribute("name").ok_or(ParseError::MissingProtocolName)?;

    let meta = ProtocolMeta {
        comment: root.attribute_or_empty("comment").to_string(),
        prefix: root.attribute_or_empty("prefix").to_string(),
        api: root.attribute_or_empty("api").to_string(),
        version: root.attribute_or_empty("version").to_string(),
        is_big_endian: !root
            .attribute_or_empty("endian")
            .eq_ignore_ascii_case("little"),
        support: ProtocolSupport {
            special_float: !root.attribute_is_false("supportSpecialFloat"),
            bitfield: !root.attribute_is_false("supportBitfield"),
        },
        name,
    };

    let mut registry = EnumRegistry::new();
    let mut model = ProtocolModel { meta, ..Default::default() };

    for child in &root.children {
        match child.name.as_str() {
            "Enum" => {
                let enumeration = parse_enum_element(child);
                registry.insert(enumeration.clone());
                model.enums.push(enumeration);
            }
            "Structure" => {
                let mut structure = parse_structure_element(
                    child,
                    &model.meta.prefix,
                    &mut registry,
                    diagnostics,
                );
                structure.module_name = child.non_empty_attribute("file");
                model.declarations.push(Declaration::Structure(structure));
            }
            "Packet" => {
                let packet =
                    parse_packet_element(child, &model.meta.prefix, &mut registry, diagnostics);
                model.declarations.push(Declaration::Packet(packet));
            }
            "Include" => {
                if let Some(header) = child.non_empty_attribute("name") {
                    model.includes.push(header);
                }
            }
            _ => {}
        }
    }

    Ok((model, registry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_must_be_protocol_with_a_name() {
        let mut diagnostics = Diagnostics::new();

        let wrong = XmlElement::parse_str("<Packets/>").expect("document should parse");
        assert!(matches!(
            parse_document(&wrong, &mut diagnostics),
            Err(ParseError::WrongRoot(_))
        ));

        let nameless = XmlElement::parse_str("<Protocol/>").expect("document should parse");
        assert!(matches!(
            parse_document(&nameless, &mut diagnostics),
            Err(ParseError::MissingProtocolName)
        ));
    }

    #[test]
    fn collects_declarations_in_document_order() {
        let root = XmlElement::parse_str(
            r#"<Protocol name="Demo" prefix="Demo" endian="little" api="3" version="1.2">
                 <Include name="linkdefs.h"/>
                 <Enum name="DemoPackets">
                   <Value name="DEMO_PING" value="0x01"/>
                 </Enum>
                 <Structure name="Position">
                   <Data name="x" inMemoryType="unsigned16"/>
                   <Data name="y" inMemoryType="unsigned16"/>
                 </Structure>
                 <Packet name="Ping" ID="DEMO_PING"/>
               </Protocol>"#,
        )
        .expect("document should parse");

        let mut diagnostics = Diagnostics::new();
        let (model, registry) =
            parse_document(&root, &mut diagnostics).expect("document should build");

        assert!(diagnostics.is_empty());
        assert_eq!(model.meta.name, "Demo");
        assert!(!model.meta.is_big_endian);
        assert_eq!(model.meta.api, "3");
        assert_eq!(model.includes, vec!["linkdefs.h".to_string()]);
        assert_eq!(model.enums.len(), 1);
        assert_eq!(model.declaration_count(), 2);
        assert!(matches!(model.declarations[0], Declaration::Structure(_)));
        assert!(matches!(model.declarations[1], Declaration::Packet(_)));
        assert!(registry.is_packet_id("DEMO_PING"));
        assert_eq!(registry.replace_enumeration_name_with_value("DEMO_PING"), "1");
    }
}
