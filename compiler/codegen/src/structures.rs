//! Structure emitters: declarations with column alignment and the
//! static encode/decode functions for embedded structures.

use ir::{Encodable, StructureModel};

use crate::fields;
use crate::utils::{make_line_separator, output_long_comment};

/// The member declaration for an embedded structure.
fn member_declaration(structure: &StructureModel) -> String {
    let mut output = format!("    {} {}", structure.type_name, structure.name);

    match &structure.array {
        Some(array) => output.push_str(&format!("[{}];", array)),
        None => output.push(';'),
    }

    if !structure.comment.is_empty() {
        output.push_str(" //!< ");
        output.push_str(&structure.comment);
    }

    output.push('\n');
    output
}

/// Declaration text for one child, whatever its variant.
fn child_declaration(child: &Encodable) -> String {
    match child {
        Encodable::Primitive(field) => fields::member_declaration(field),
        Encodable::Structure(nested) => member_declaration(nested),
    }
}

/// Pad the member block so the name column and the comment column each line
/// up on the widest entry.
fn align_structure_data(block: &str) -> String {
    let mut lines: Vec<String> = block.lines().map(str::to_string).collect();
    lines.retain(|line| !line.is_empty());

    // The space after the type name separates the columns; skip the indent
    let gap = |line: &str| line[4..].find(' ').map(|index| index + 4);

    let max_gap = lines.iter().filter_map(|line| gap(line)).max().unwrap_or(0);
    for line in &mut lines {
        if let Some(index) = gap(line) {
            line.insert_str(index, &" ".repeat(max_gap - index));
        }
    }

    // The first semicolon separates the name from the comment
    let stop = |line: &str| line.find(';').map(|index| index + 1);

    let max_stop = lines.iter().filter_map(|line| stop(line)).max().unwrap_or(0);
    for line in &mut lines {
        if let Some(index) = stop(line) {
            if line.len() > index {
                line.insert_str(index, &" ".repeat(max_stop - index));
            }
        }
    }

    let mut output = String::new();
    for line in lines {
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

/// The `typedef struct` declaration for this structure and, first, all its
/// embedded structures. A single-member structure is skipped unless
/// `always_create` forces it, letting callers inline the field instead.
pub fn render_struct_declaration(structure: &StructureModel, always_create: bool) -> String {
    let mut output = String::new();

    if structure.children.is_empty() {
        return output;
    }

    // Declare the children's structures first
    for child in &structure.children {
        if let Encodable::Structure(nested) = child {
            output.push_str(&render_struct_declaration(nested, true));
            output.push('\n');
        }
    }

    if structure.children.len() > 1 || always_create {
        if !structure.comment.is_empty() {
            output.push_str("/*!\n");
            output.push_str(&output_long_comment(" *", &structure.comment));
            output.push_str("\n */\n");
        }

        output.push_str("typedef struct\n");
        output.push_str("{\n");

        let mut members = String::new();
        for child in &structure.children {
            members.push_str(&child_declaration(child));
        }
        output.push_str(&align_structure_data(&members));

        output.push('}');
        output.push_str(&structure.type_name);
        output.push_str(";\n");
    }

    output
}

/// The encode call site for an embedded structure inside its parent's
/// function body.
pub(crate) fn encode_snippet(structure: &StructureModel, is_structure_member: bool) -> String {
    let mut output = String::new();
    let mut spacing = "    ".to_string();

    if !structure.comment.is_empty() {
        output.push_str(&format!("{}// {}\n", spacing, structure.comment));
    }

    if let Some(depends) = &structure.depends_on {
        let guard = if is_structure_member {
            format!("user->{}", depends)
        } else {
            depends.clone()
        };
        output.push_str(&format!("{}if({})\n{}{{\n", spacing, guard, spacing));
        spacing.push_str("    ");
    }

    if structure.array.is_some() {
        output.push_str(&loop_header(structure, &spacing, is_structure_member, false));
        let access = if is_structure_member {
            format!("&user->{}[i]", structure.name)
        } else {
            format!("&{}[i]", structure.name)
        };
        output.push_str(&format!(
            "{}    byteindex = encode{}(data, byteindex, {});\n",
            spacing, structure.type_name, access
        ));
    } else {
        // An unrepeated parameter is already a pointer
        let access = if is_structure_member {
            format!("&user->{}", structure.name)
        } else {
            structure.name.clone()
        };
        output.push_str(&format!(
            "{}byteindex = encode{}(data, byteindex, {});\n",
            spacing, structure.type_name, access
        ));
    }

    if structure.depends_on.is_some() {
        output.push_str("    }\n");
    }

    output
}

/// The decode call site for an embedded structure inside its parent's
/// function body.
pub(crate) fn decode_snippet(structure: &StructureModel, is_structure_member: bool) -> String {
    let mut output = String::new();
    let mut spacing = "    ".to_string();

    if !structure.comment.is_empty() {
        output.push_str(&format!("{}// {}\n", spacing, structure.comment));
    }

    if let Some(depends) = &structure.depends_on {
        let guard = if is_structure_member {
            format!("user->{}", depends)
        } else {
            format!("*{}", depends)
        };
        output.push_str(&format!("{}if({})\n{}{{\n", spacing, guard, spacing));
        spacing.push_str("    ");
    }

    if structure.array.is_some() {
        output.push_str(&loop_header(structure, &spacing, is_structure_member, true));
        let access = if is_structure_member {
            format!("&user->{}[i]", structure.name)
        } else {
            format!("&{}[i]", structure.name)
        };
        output.push_str(&format!(
            "{}    byteindex = decode{}(data, byteindex, {});\n",
            spacing, structure.type_name, access
        ));
    } else {
        let access = if is_structure_member {
            format!("&user->{}", structure.name)
        } else {
            structure.name.clone()
        };
        output.push_str(&format!(
            "{}byteindex = decode{}(data, byteindex, {});\n",
            spacing, structure.type_name, access
        ));
    }

    if structure.depends_on.is_some() {
        output.push_str("    }\n");
    }

    output
}

fn loop_header(
    structure: &StructureModel,
    spacing: &str,
    is_structure_member: bool,
    decoding: bool,
) -> String {
    let array = structure.array.as_deref().unwrap_or("");

    match &structure.variable_array {
        Some(count) => {
            let count_access = if is_structure_member {
                format!("user->{}", count)
            } else if decoding {
                format!("(*{})", count)
            } else {
                format!("({})", count)
            };
            format!("{}for(i = 0; i < (int){} && i < {}; i++)\n", spacing, count_access, array)
        }
        None => format!("{}for(i = 0; i < {}; i++)\n", spacing, array),
    }
}

/// The static encode function for an embedded structure, preceded by the
/// functions of its own embedded structures.
pub fn render_encode_function(structure: &StructureModel, is_big_endian: bool) -> String {
    let mut output = String::new();

    if structure.children.is_empty() {
        return output;
    }

    // The children's functions come first since this one calls them
    for child in &structure.children {
        if let Encodable::Structure(nested) = child {
            output.push_str(&render_encode_function(nested, is_big_endian));
            make_line_separator(&mut output);
        }
    }

    make_line_separator(&mut output);

    output.push_str("/*!\n");
    output.push_str(&format!(" * \\brief Encode a {} structure into a byte array\n", structure.type_name));
    output.push_str(" *\n");
    output.push_str(&output_long_comment(" *", &structure.comment));
    output.push('\n');
    output.push_str(" * \\param data points to the byte array to add encoded data to\n");
    output.push_str(" * \\param byteindex is the starting location in the byte array\n");
    output.push_str(" * \\param user is the data to encode in the byte array\n");
    output.push_str(" * \\return the location for the next data to be encoded in the byte array\n");
    output.push_str(" */\n");
    output.push_str(&format!(
        "static int encode{}(uint8_t* data, int byteindex, const {}* user);\n",
        structure.type_name, structure.type_name
    ));
    output.push('\n');
    output.push_str(&format!(
        "int encode{}(uint8_t* data, int byteindex, const {}* user)\n",
        structure.type_name, structure.type_name
    ));
    output.push_str(&render_encode_body(structure, is_big_endian));

    output
}

/// The braced body of a structure encode function: locals gated on the
/// aggregate flags, children in order, and the trailing cursor return.
pub fn render_encode_body(structure: &StructureModel, is_big_endian: bool) -> String {
    let mut output = String::from("{\n");

    if structure.has_bitfields {
        output.push_str("    int bitcount = 0;\n");
    }
    if structure.needs_iterator {
        output.push_str("    int i = 0;\n");
    }

    for child in &structure.children {
        make_line_separator(&mut output);
        output.push_str(&child_encode_snippet(child, is_big_endian, true));
    }

    make_line_separator(&mut output);
    output.push_str("    return byteindex;\n");
    output.push_str("}\n");

    output
}

/// The static decode function for an embedded structure, preceded by the
/// functions of its own embedded structures.
pub fn render_decode_function(structure: &StructureModel, is_big_endian: bool) -> String {
    let mut output = String::new();

    if structure.children.is_empty() {
        return output;
    }

    for child in &structure.children {
        if let Encodable::Structure(nested) = child {
            output.push_str(&render_decode_function(nested, is_big_endian));
            make_line_separator(&mut output);
        }
    }

    make_line_separator(&mut output);

    output.push_str("/*!\n");
    output.push_str(&format!(" * \\brief Decode a {} structure from a byte array\n", structure.type_name));
    output.push_str(" *\n");
    output.push_str(&output_long_comment(" *", &structure.comment));
    output.push('\n');
    output.push_str(" * \\param data points to the byte array to decode data from\n");
    output.push_str(" * \\param byteindex is the starting location in the byte array\n");
    output.push_str(" * \\param user receives the data decoded from the byte array\n");
    output.push_str(" * \\return the location for the next data to be decoded in the byte array\n");
    output.push_str(" */\n");
    output.push_str(&format!(
        "static int decode{}(const uint8_t* data, int byteindex, {}* user);\n",
        structure.type_name, structure.type_name
    ));
    output.push('\n');
    output.push_str(&format!(
        "int decode{}(const uint8_t* data, int byteindex, {}* user)\n",
        structure.type_name, structure.type_name
    ));
    output.push_str(&render_decode_body(structure, is_big_endian));

    output
}

/// The braced body of a structure decode function.
pub fn render_decode_body(structure: &StructureModel, is_big_endian: bool) -> String {
    let mut output = String::from("{\n");

    if structure.has_bitfields {
        output.push_str("    int bitcount = 0;\n");
    }
    if structure.needs_iterator {
        output.push_str("    int i = 0;\n");
    }

    for child in &structure.children {
        make_line_separator(&mut output);
        output.push_str(&child_decode_snippet(child, is_big_endian, true, false));
    }

    make_line_separator(&mut output);
    output.push_str("    return byteindex;\n");
    output.push_str("}\n");

    output
}

/// Dispatch a child's encode snippet by variant.
pub(crate) fn child_encode_snippet(
    child: &Encodable,
    is_big_endian: bool,
    is_structure_member: bool,
) -> String {
    match child {
        Encodable::Primitive(field) => {
            fields::encode_snippet(field, is_big_endian, is_structure_member)
        }
        Encodable::Structure(nested) => encode_snippet(nested, is_structure_member),
    }
}

/// Dispatch a child's decode snippet by variant.
pub(crate) fn child_decode_snippet(
    child: &Encodable,
    is_big_endian: bool,
    is_structure_member: bool,
    default_enabled: bool,
) -> String {
    match child {
        Encodable::Primitive(field) => {
            fields::decode_snippet(field, is_big_endian, is_structure_member, default_enabled)
        }
        Encodable::Structure(nested) => decode_snippet(nested, is_structure_member),
    }
}

/// The encode parameter fragment for a child of a parameter-interface
/// packet.
pub(crate) fn child_encode_signature(child: &Encodable) -> String {
    match child {
        Encodable::Primitive(field) => fields::encode_signature(field),
        Encodable::Structure(nested) => match &nested.array {
            Some(array) => {
                format!(", const {} {}[{}]", nested.type_name, nested.name, array)
            }
            None => format!(", const {}* {}", nested.type_name, nested.name),
        },
    }
}

/// The decode parameter fragment for a child of a parameter-interface
/// packet.
pub(crate) fn child_decode_signature(child: &Encodable) -> String {
    match child {
        Encodable::Primitive(field) => fields::decode_signature(field),
        Encodable::Structure(nested) => match &nested.array {
            Some(array) => format!(", {} {}[{}]", nested.type_name, nested.name, array),
            None => format!(", {}* {}", nested.type_name, nested.name),
        },
    }
}
