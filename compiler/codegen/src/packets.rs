//! Packet and module emission: header/source pairs plus the top-level
//! packet documentation.

use ir::length::markdown_length_string;
use ir::{Encodable, PacketModel, ProtocolMeta, StructureModel};
use registry::EnumRegistry;

use crate::enums::{render_enum_declaration, render_enum_markdown};
use crate::fields;
use crate::files::ModuleFile;
use crate::markdown::{collect_rows, render_encoding_table};
use crate::structures::{
    child_decode_signature, child_decode_snippet, child_encode_signature, child_encode_snippet,
    render_decode_body, render_decode_function, render_encode_body, render_encode_function,
    render_struct_declaration,
};
use crate::utils::output_long_comment;

/// Emit the complete header and source content for one packet into the
/// module writers. The writers must already be prepared for appending; the
/// caller flushes them afterwards.
pub fn emit_packet(
    packet: &PacketModel,
    meta: &ProtocolMeta,
    header: &mut ModuleFile,
    source: &mut ModuleFile,
) {
    let structure = &packet.structure;

    write_header_preamble(header, meta, &structure.name, "packet", &structure.comment);

    for include in &structure.includes {
        header.write_include_directive(include);
    }

    for enumeration in &structure.enums {
        header.make_line_separator();
        header.write(&render_enum_declaration(enumeration));
    }

    header.make_line_separator();
    header.write(&render_struct_declaration(structure, packet.structure_interface));
    header.make_line_separator();

    write_source_preamble(source, meta, &header.file_name());

    // The embedded structure functions must be declared before the packet
    // functions that call them
    for child in &structure.children {
        if let Encodable::Structure(nested) = child {
            source.make_line_separator();
            source.write(&render_encode_function(nested, meta.is_big_endian));
            source.make_line_separator();
            source.write(&render_decode_function(nested, meta.is_big_endian));
        }
    }

    if packet.structure_interface && !structure.children.is_empty() {
        create_structure_packet_functions(packet, meta, header, source);
    }

    if packet.parameter_interface {
        create_packet_functions(packet, meta, header, source);
    }

    create_utility_functions(packet, meta, header, source);

    header.make_line_separator();
}

/// Emit the header and source content for a standalone structure module.
pub fn emit_structure_module(
    structure: &StructureModel,
    meta: &ProtocolMeta,
    header: &mut ModuleFile,
    source: &mut ModuleFile,
) {
    write_header_preamble(header, meta, &structure.name, "structure", &structure.comment);

    for include in &structure.includes {
        header.write_include_directive(include);
    }

    for enumeration in &structure.enums {
        header.make_line_separator();
        header.write(&render_enum_declaration(enumeration));
    }

    header.make_line_separator();
    header.write(&render_struct_declaration(structure, true));

    header.make_line_separator();
    header.write(&format!("//! Encode a {} structure into a byte array\n", structure.type_name));
    header.write(&format!(
        "int encode{}(uint8_t* data, int byteindex, const {}* user);\n",
        structure.type_name, structure.type_name
    ));
    header.make_line_separator();
    header.write(&format!("//! Decode a {} structure from a byte array\n", structure.type_name));
    header.write(&format!(
        "int decode{}(const uint8_t* data, int byteindex, {}* user);\n",
        structure.type_name, structure.type_name
    ));
    header.make_line_separator();

    write_source_preamble(source, meta, &header.file_name());

    for child in &structure.children {
        if let Encodable::Structure(nested) = child {
            source.make_line_separator();
            source.write(&render_encode_function(nested, meta.is_big_endian));
            source.make_line_separator();
            source.write(&render_decode_function(nested, meta.is_big_endian));
        }
    }

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(
        " * \\brief Encode a {} structure into a byte array\n",
        structure.type_name
    ));
    source.write(" *\n");
    source.write(&output_long_comment(" *", &structure.comment));
    source.write("\n");
    source.write(" * \\param data points to the byte array to add encoded data to\n");
    source.write(" * \\param byteindex is the starting location in the byte array\n");
    source.write(" * \\param user is the data to encode in the byte array\n");
    source.write(" * \\return the location for the next data to be encoded in the byte array\n");
    source.write(" */\n");
    source.write(&format!(
        "int encode{}(uint8_t* data, int byteindex, const {}* user)\n",
        structure.type_name, structure.type_name
    ));
    source.write(&render_encode_body(structure, meta.is_big_endian));

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(
        " * \\brief Decode a {} structure from a byte array\n",
        structure.type_name
    ));
    source.write(" *\n");
    source.write(&output_long_comment(" *", &structure.comment));
    source.write("\n");
    source.write(" * \\param data points to the byte array to decode data from\n");
    source.write(" * \\param byteindex is the starting location in the byte array\n");
    source.write(" * \\param user receives the data decoded from the byte array\n");
    source.write(" * \\return the location for the next data to be decoded in the byte array\n");
    source.write(" */\n");
    source.write(&format!(
        "int decode{}(const uint8_t* data, int byteindex, {}* user)\n",
        structure.type_name, structure.type_name
    ));
    source.write(&render_decode_body(structure, meta.is_big_endian));

    header.make_line_separator();
}

/// The Doxygen file banner and the protocol include, written only when the
/// module is fresh.
fn write_header_preamble(
    header: &mut ModuleFile,
    meta: &ProtocolMeta,
    name: &str,
    flavor: &str,
    comment: &str,
) {
    if header.is_appending() {
        header.make_line_separator();
        return;
    }

    header.write("/*!\n");
    header.write(" * \\file\n");
    header.write(&format!(
        " * \\brief {} defines the interface for the {} {} of the {} protocol stack\n",
        header.file_name(),
        name,
        flavor,
        meta.name
    ));
    if !comment.is_empty() {
        header.write(" *\n");
        header.write(&output_long_comment(" *", comment));
        header.write("\n");
    }
    header.write(" */\n");
    header.make_line_separator();
    header.write_include_directive(&format!("{}Protocol.h", meta.name));
}

/// The source file's own include plus the helper runtime includes, written
/// only on first emission.
fn write_source_preamble(source: &mut ModuleFile, meta: &ProtocolMeta, header_name: &str) {
    if source.is_appending() {
        source.make_line_separator();
        return;
    }

    source.write_include_directive(header_name);

    if meta.support.special_float {
        source.write_include_directive("floatspecial.h");
    }
    if meta.support.bitfield {
        source.write_include_directive("bitfieldspecial.h");
    }
    source.write_include_directive("fielddecode.h");
    source.write_include_directive("fieldencode.h");
    source.write_include_directive("scaleddecode.h");
    source.write_include_directive("scaledencode.h");
}

fn encode_brief(packet: &PacketModel, meta: &ProtocolMeta) -> String {
    format!("Create the {}{} packet", meta.prefix, packet.structure.name)
}

fn decode_brief(packet: &PacketModel, meta: &ProtocolMeta) -> String {
    format!("Decode the {}{} packet", meta.prefix, packet.structure.name)
}

/// Packet ID and minimum-length accessors.
fn create_utility_functions(
    packet: &PacketModel,
    meta: &ProtocolMeta,
    header: &mut ModuleFile,
    source: &mut ModuleFile,
) {
    let symbol = format!("{}{}", meta.prefix, packet.structure.name);

    header.make_line_separator();
    header.write(&format!("//! return the packet ID for the {} packet\n", symbol));
    header.write(&format!("uint32_t get{}PacketID(void);\n", symbol));

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(" * \\return the packet ID for the {} packet\n", symbol));
    source.write(" */\n");
    source.write(&format!("uint32_t get{}PacketID(void)\n", symbol));
    source.write("{\n");
    source.write(&format!("    return {};\n", packet.id));
    source.write("}\n");

    header.make_line_separator();
    header.write(&format!("//! return the minimum data length for the {} packet\n", symbol));
    header.write(&format!("int get{}MinDataLength(void);\n", symbol));

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(" * \\return the minimum data length in bytes for the {} packet\n", symbol));
    source.write(" */\n");
    source.write(&format!("int get{}MinDataLength(void)\n", symbol));
    source.write("{\n");
    source.write(&format!("    return {};\n", packet.structure.encoded_length.min_or_zero()));
    source.write("}\n");
}

/// The functions for encoding and decoding the packet to/from a structure.
fn create_structure_packet_functions(
    packet: &PacketModel,
    meta: &ProtocolMeta,
    header: &mut ModuleFile,
    source: &mut ModuleFile,
) {
    let structure = &packet.structure;
    let symbol = format!("{}{}", meta.prefix, structure.name);
    let type_name = &structure.type_name;

    if structure.number_of_encodes() == 0 {
        // Everything is in memory only; the packet itself is empty
        write_empty_packet_functions(
            packet,
            meta,
            header,
            source,
            &format!("void encode{}PacketStructure(void* pkt)", symbol),
            &format!("int decode{}PacketStructure(const void* pkt)", symbol),
        );
        return;
    }

    let takes_user = structure.number_of_non_const_encodes() > 0;

    let encode_signature = if takes_user {
        format!("void encode{}PacketStructure(void* pkt, const {}* user)", symbol, type_name)
    } else {
        format!("void encode{}PacketStructure(void* pkt)", symbol)
    };

    header.make_line_separator();
    header.write(&format!("//! {}\n", encode_brief(packet, meta)));
    header.write(&format!("{};\n", encode_signature));

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(" * \\brief {}\n", encode_brief(packet, meta)));
    source.write(" *\n");
    source.write(&output_long_comment(" *", &structure.comment));
    source.write("\n");
    source.write(" * \\param pkt points to the packet which will be created by this function\n");
    if takes_user {
        source.write(" * \\param user points to the user data that will be encoded in pkt\n");
    }
    source.write(" */\n");
    source.write(&format!("{}\n", encode_signature));
    source.write("{\n");
    source.write(&format!("    uint8_t* data = get{}PacketData(pkt);\n", meta.name));
    source.write("    int byteindex = 0;\n");
    if structure.has_bitfields {
        source.write("    int bitcount = 0;\n");
    }
    if structure.needs_iterator {
        source.write("    int i = 0;\n");
    }

    for child in &structure.children {
        source.make_line_separator();
        source.write(&child_encode_snippet(child, meta.is_big_endian, true));
    }

    source.make_line_separator();
    source.write("    // complete the process of creating the packet\n");
    source.write(&format!(
        "    finish{}Packet(pkt, byteindex, get{}PacketID());\n",
        meta.name, symbol
    ));
    source.write("}\n");

    // The decode function is more complex because defaults are handled here
    header.make_line_separator();
    header.write(&format!("//! {}\n", decode_brief(packet, meta)));
    header.write(&format!(
        "int decode{}PacketStructure(const void* pkt, {}* user);\n",
        symbol, type_name
    ));

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(" * \\brief {}\n", decode_brief(packet, meta)));
    source.write(" *\n");
    source.write(&output_long_comment(" *", &structure.comment));
    source.write("\n");
    source.write(" * \\param pkt points to the packet being decoded by this function\n");
    source.write(" * \\param user receives the data decoded from the packet\n");
    source.write(" * \\return 0 is returned if the packet ID or size is wrong, else 1\n");
    source.write(" */\n");
    source.write(&format!(
        "int decode{}PacketStructure(const void* pkt, {}* user)\n",
        symbol, type_name
    ));
    source.write("{\n");
    source.write("    int numBytes;\n");
    source.write("    int byteindex = 0;\n");
    source.write("    const uint8_t* data;\n");
    if structure.has_bitfields {
        source.write("    int bitcount = 0;\n");
    }
    if structure.needs_iterator {
        source.write("    int i = 0;\n");
    }
    source.write("\n");
    source.write("    // Verify the packet identifier\n");
    source.write(&format!("    if(get{}PacketID(pkt) != get{}PacketID())\n", meta.name, symbol));
    source.write("        return 0;\n");
    source.write("\n");
    source.write("    // Verify the packet size\n");
    source.write(&format!("    numBytes = get{}PacketSize(pkt);\n", meta.name));
    source.write(&format!("    if(numBytes < get{}MinDataLength())\n", symbol));
    source.write("        return 0;\n");
    source.write("\n");
    source.write("    // The raw data from the packet\n");
    source.write(&format!("    data = get{}PacketDataConst(pkt);\n", meta.name));
    source.make_line_separator();

    write_packet_decode_fields(packet, meta, source, true);

    source.make_line_separator();
    source.write("    return 1;\n");
    source.write("}\n");
}

/// The functions for encoding and decoding the packet to/from parameters.
fn create_packet_functions(
    packet: &PacketModel,
    meta: &ProtocolMeta,
    header: &mut ModuleFile,
    source: &mut ModuleFile,
) {
    let structure = &packet.structure;
    let symbol = format!("{}{}", meta.prefix, structure.name);

    let encode_signature = packet_encode_signature(packet, meta);
    let decode_signature = packet_decode_signature(packet, meta);

    header.make_line_separator();
    header.write(&format!("//! {}\n", encode_brief(packet, meta)));
    header.write(&format!("{};\n", encode_signature));

    header.make_line_separator();
    header.write(&format!("//! {}\n", decode_brief(packet, meta)));
    header.write(&format!("{};\n", decode_signature));

    if structure.number_of_encodes() == 0 {
        write_empty_packet_source_functions(packet, meta, source, &encode_signature, &decode_signature);
        return;
    }

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(" * \\brief {}\n", encode_brief(packet, meta)));
    source.write(" *\n");
    source.write(&output_long_comment(" *", &structure.comment));
    source.write("\n");
    source.write(" * \\param pkt points to the packet which will be created by this function\n");
    for child in &structure.children {
        if let Encodable::Primitive(field) = child {
            source.write(&fields::encode_parameter_comment(field));
        }
    }
    source.write(" */\n");
    source.write(&format!("{}\n", encode_signature));
    source.write("{\n");
    source.write(&format!("    uint8_t* data = get{}PacketData(pkt);\n", meta.name));
    source.write("    int byteindex = 0;\n");
    if structure.has_bitfields {
        source.write("    int bitcount = 0;\n");
    }
    if structure.needs_iterator {
        source.write("    int i = 0;\n");
    }

    for child in &structure.children {
        source.make_line_separator();
        source.write(&child_encode_snippet(child, meta.is_big_endian, false));
    }

    source.make_line_separator();
    source.write("    // complete the process of creating the packet\n");
    source.write(&format!(
        "    finish{}Packet(pkt, byteindex, get{}PacketID());\n",
        meta.name, symbol
    ));
    source.write("}\n");

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(" * \\brief {}\n", decode_brief(packet, meta)));
    source.write(" *\n");
    source.write(&output_long_comment(" *", &structure.comment));
    source.write("\n");
    source.write(" * \\param pkt points to the packet being decoded by this function\n");
    for child in &structure.children {
        if let Encodable::Primitive(field) = child {
            source.write(&fields::decode_parameter_comment(field));
        }
    }
    source.write(" * \\return 0 is returned if the packet ID or size is wrong, else 1\n");
    source.write(" */\n");
    source.write(&format!("{}\n", decode_signature));
    source.write("{\n");
    if structure.has_bitfields {
        source.write("    int bitcount = 0;\n");
    }
    if structure.needs_iterator {
        source.write("    int i = 0;\n");
    }
    source.write("    int byteindex = 0;\n");
    source.write(&format!("    const uint8_t* data = get{}PacketDataConst(pkt);\n", meta.name));
    source.write(&format!("    int numBytes = get{}PacketSize(pkt);\n", meta.name));
    source.write("\n");
    source.write(&format!("    if(get{}PacketID(pkt) != get{}PacketID())\n", meta.name, symbol));
    source.write("        return 0;\n");
    source.write("\n");
    source.write(&format!("    if(numBytes < get{}MinDataLength())\n", symbol));
    source.write("        return 0;\n");
    source.make_line_separator();

    write_packet_decode_fields(packet, meta, source, false);

    source.make_line_separator();
    source.write("    return 1;\n");
    source.write("}\n");
}

/// The shared decode sequence: defaults initialized first, the non-default
/// prefix decoded, the short-packet re-check when variable content or a
/// default suffix make it necessary, then the default suffix.
fn write_packet_decode_fields(
    packet: &PacketModel,
    meta: &ProtocolMeta,
    source: &mut ModuleFile,
    is_structure_member: bool,
) {
    let structure = &packet.structure;

    if structure.has_defaults {
        source.write("    // this packet has default fields, make sure they are set\n");
        for child in &structure.children {
            if let Encodable::Primitive(field) = child {
                source.write(&fields::set_to_default(field, is_structure_member));
            }
        }
        source.make_line_separator();
    }

    // Decode just the non-defaults here
    let split = structure
        .children
        .iter()
        .position(|child| child.is_default())
        .unwrap_or(structure.children.len());

    for child in &structure.children[..split] {
        source.make_line_separator();
        source.write(&child_decode_snippet(child, meta.is_big_endian, is_structure_member, true));
    }

    // Before decoding the default suffix, re-check the size in the event
    // that variable length arrays or dependent fields were used
    let length = &structure.encoded_length;
    if length.min_encoded_length != length.non_default_encoded_length && split > 0 {
        source.make_line_separator();
        source.write("    // Used variable length arrays or dependent fields, check actual length\n");
        source.write("    if(numBytes < byteindex)\n");
        source.write("        return 0;\n");
    }

    for child in &structure.children[split..] {
        source.make_line_separator();
        source.write(&child_decode_snippet(child, meta.is_big_endian, is_structure_member, true));
    }
}

/// Source bodies for a packet with no encoded content: the encoder finishes
/// a zero length packet and the decoder only verifies the identifier.
fn write_empty_packet_source_functions(
    packet: &PacketModel,
    meta: &ProtocolMeta,
    source: &mut ModuleFile,
    encode_signature: &str,
    decode_signature: &str,
) {
    let symbol = format!("{}{}", meta.prefix, packet.structure.name);

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(" * \\brief {}\n", encode_brief(packet, meta)));
    source.write(" *\n");
    source.write(&output_long_comment(" *", &packet.structure.comment));
    source.write("\n");
    source.write(" * \\param pkt points to the packet which will be created by this function\n");
    source.write(" */\n");
    source.write(&format!("{}\n", encode_signature));
    source.write("{\n");
    source.write("    // create a zero length packet\n");
    source.write(&format!("    finish{}Packet(pkt, 0, get{}PacketID());\n", meta.name, symbol));
    source.write("}\n");

    source.make_line_separator();
    source.write("/*!\n");
    source.write(&format!(" * \\brief {}\n", decode_brief(packet, meta)));
    source.write(" *\n");
    source.write(&output_long_comment(" *", &packet.structure.comment));
    source.write("\n");
    source.write(" * \\param pkt points to the packet being decoded by this function\n");
    source.write(" * \\return 0 is returned if the packet ID is wrong, else 1\n");
    source.write(" */\n");
    source.write(&format!("{}\n", decode_signature));
    source.write("{\n");
    source.write(&format!("    if(get{}PacketID(pkt) != get{}PacketID())\n", meta.name, symbol));
    source.write("        return 0;\n");
    source.write("    else\n");
    source.write("        return 1;\n");
    source.write("}\n");
}

/// Header prototypes plus source bodies for the structure interface of a
/// packet whose fields are all memory-only.
fn write_empty_packet_functions(
    packet: &PacketModel,
    meta: &ProtocolMeta,
    header: &mut ModuleFile,
    source: &mut ModuleFile,
    encode_signature: &str,
    decode_signature: &str,
) {
    header.make_line_separator();
    header.write(&format!("//! {}\n", encode_brief(packet, meta)));
    header.write(&format!("{};\n", encode_signature));
    header.make_line_separator();
    header.write(&format!("//! {}\n", decode_brief(packet, meta)));
    header.write(&format!("{};\n", decode_signature));

    write_empty_packet_source_functions(packet, meta, source, encode_signature, decode_signature);
}

/// The signature of the parameter-interface encode function.
fn packet_encode_signature(packet: &PacketModel, meta: &ProtocolMeta) -> String {
    let mut output =
        format!("void encode{}{}Packet(void* pkt", meta.prefix, packet.structure.name);
    for child in &packet.structure.children {
        output.push_str(&child_encode_signature(child));
    }
    output.push(')');
    output
}

/// The signature of the parameter-interface decode function.
fn packet_decode_signature(packet: &PacketModel, meta: &ProtocolMeta) -> String {
    let mut output =
        format!("int decode{}{}Packet(const void* pkt", meta.prefix, packet.structure.name);
    for child in &packet.structure.children {
        output.push_str(&child_decode_signature(child));
    }
    output.push(')');
    output
}

/// Top level markdown documentation for a packet: heading with the ID
/// anchor, identifier and length bullets, nested enumeration tables, and the
/// encoding table.
pub fn render_packet_markdown(
    packet: &PacketModel,
    outline: &str,
    registry: &EnumRegistry,
) -> String {
    let structure = &packet.structure;
    let mut output = String::new();
    let mut paragraph = 1;

    // The anchor carries the ID so identifier enumerations can link here
    output.push_str(&format!(
        "## {}) <a name=\"{}\"></a>{}\n\n",
        outline, packet.id, structure.name
    ));

    if !structure.comment.is_empty() {
        output.push_str(&structure.comment);
        output.push_str("\n\n");
    }

    // In case the packet identifier is an enumeration we know
    let id_value = registry.replace_enumeration_name_with_value(&packet.id);
    if id_value == packet.id {
        output.push_str(&format!("- packet identifier: `{}`\n", packet.id));
    } else {
        output.push_str(&format!("- packet identifier: `{}` : {}\n", packet.id, id_value));
    }

    let length = &structure.encoded_length;
    if length.min_equals_max() {
        output.push_str(&format!(
            "- data length: {}\n",
            markdown_length_string(&length.min_encoded_length)
        ));
    } else {
        output.push_str(&format!(
            "- minimum data length: {}\n",
            markdown_length_string(&length.min_encoded_length)
        ));
        output.push_str(&format!(
            "- maximum data length: {}\n",
            markdown_length_string(&length.max_encoded_length)
        ));
    }

    if !structure.enums.is_empty() {
        output.push_str(&format!(
            "\n### {}.{}) {} enumerations\n\n",
            outline, paragraph, structure.name
        ));
        paragraph += 1;

        for enumeration in &structure.enums {
            output.push_str(&render_enum_markdown(enumeration, "", registry));
        }
    }

    if !structure.children.is_empty() {
        output.push_str(&format!(
            "\n### {}.{}) {} encoding\n\n",
            outline, paragraph, structure.name
        ));

        let rows = collect_rows(&structure.children);
        output.push_str(&render_encoding_table(
            &format!("Encoding for packet {}", structure.name),
            &rows,
        ));
    }

    output
}
