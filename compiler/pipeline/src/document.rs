//! Top-level document outputs: the protocol header and the Markdown
//! documentation.

use codegen::enums::{render_enum_declaration, render_enum_markdown};
use codegen::packets::render_packet_markdown;
use codegen::ModuleFile;
use ir::{Declaration, ProtocolModel};
use registry::EnumRegistry;

use crate::Result;

/// Emit `<Name>Protocol.h`: the API and version macros, the prototypes of
/// the generic packet routines the user supplies, and the global
/// enumerations. Every generated module includes this header.
pub fn write_protocol_header(
    model: &ProtocolModel,
    output_dir: &std::path::Path,
) -> Result<String> {
    let meta = &model.meta;
    let module = format!("{}Protocol", meta.name);
    let mut header = ModuleFile::header(output_dir, &module);

    header.write("/*!\n");
    header.write(" * \\file\n");
    header.write(&format!(
        " * \\brief {} is the top level header of the {} protocol stack\n",
        header.file_name(),
        meta.name
    ));
    if !meta.comment.is_empty() {
        header.write(" *\n");
        header.write(&codegen::utils::output_long_comment(" *", &meta.comment));
        header.write("\n");
    }
    header.write(" */\n");
    header.make_line_separator();

    header.write("#include <stdint.h>\n");

    for include in &model.includes {
        header.write_include_directive(include);
    }

    if !meta.api.is_empty() {
        header.make_line_separator();
        header.write("//! \\return the protocol API number\n");
        header.write(&format!("#define get{}Api() {}\n", meta.name, meta.api));
    }

    if !meta.version.is_empty() {
        header.make_line_separator();
        header.write("//! \\return the protocol version string\n");
        header.write(&format!("#define get{}Version() \"{}\"\n", meta.name, meta.version));
    }

    header.make_line_separator();
    header.write("// The generic packet routines are supplied by the user of the protocol\n");
    header.write("\n");
    header.write("//! \\return the data pointer of a packet being created\n");
    header.write(&format!("uint8_t* get{}PacketData(void* pkt);\n", meta.name));
    header.write("\n");
    header.write("//! \\return the data pointer of a received packet\n");
    header.write(&format!("const uint8_t* get{}PacketDataConst(const void* pkt);\n", meta.name));
    header.write("\n");
    header.write("//! Complete a packet whose data have been encoded\n");
    header.write(&format!(
        "void finish{}Packet(void* pkt, int size, uint32_t packetID);\n",
        meta.name
    ));
    header.write("\n");
    header.write("//! \\return the data size of a received packet\n");
    header.write(&format!("int get{}PacketSize(const void* pkt);\n", meta.name));
    header.write("\n");
    header.write("//! \\return the identifier of a received packet\n");
    header.write(&format!("uint32_t get{}PacketID(const void* pkt);\n", meta.name));

    for enumeration in &model.enums {
        header.make_line_separator();
        header.write(&render_enum_declaration(enumeration));
    }

    header.make_line_separator();
    header.flush()?;

    Ok(header.file_name())
}

/// Assemble `<Name>.markdown`: the protocol heading, global enumeration
/// tables, then each packet's section, numbered in document order.
pub fn write_markdown_documentation(
    model: &ProtocolModel,
    enum_registry: &EnumRegistry,
    output_dir: &std::path::Path,
) -> Result<String> {
    let meta = &model.meta;
    let mut output = String::new();

    output.push_str(&format!("# {} Protocol\n\n", meta.name));

    if !meta.comment.is_empty() {
        output.push_str(&meta.comment);
        output.push_str("\n\n");
    }

    if !meta.version.is_empty() {
        output.push_str(&format!("- protocol version: {}\n", meta.version));
    }
    if !meta.api.is_empty() {
        output.push_str(&format!("- protocol API: {}\n", meta.api));
    }
    output.push('\n');

    let mut outline = 0;

    for enumeration in &model.enums {
        if enumeration.is_hidden() {
            continue;
        }
        outline += 1;
        output.push_str(&render_enum_markdown(
            enumeration,
            &outline.to_string(),
            enum_registry,
        ));
    }

    for declaration in &model.declarations {
        if let Declaration::Packet(packet) = declaration {
            outline += 1;
            output.push_str(&render_packet_markdown(
                packet,
                &outline.to_string(),
                enum_registry,
            ));
            output.push('\n');
        }
    }

    let file_name = format!("{}.markdown", meta.name);
    std::fs::write(output_dir.join(&file_name), output)?;

    Ok(file_name)
}
