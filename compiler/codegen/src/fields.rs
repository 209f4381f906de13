//! Primitive field emitters: struct members, encode/decode snippets, and
//! parameter-interface signatures.
//!
//! Every snippet calls the shipped runtime helpers (`fieldencode`,
//! `fielddecode`, `scaledencode`, `scaleddecode`, `bitfieldspecial`) and
//! threads the single `byteindex` cursor, plus `bitcount` inside bitfield
//! runs and `i` inside array loops.

use ir::PrimitiveField;

/// The struct member declaration line, or nothing for fields with no memory
/// behind them.
pub(crate) fn member_declaration(field: &PrimitiveField) -> String {
    if field.not_in_memory {
        return String::new();
    }

    let mut output = format!("    {} {}", field.in_memory.c_type(), field.name);

    if field.is_bitfield() {
        output.push_str(&format!(" : {};", field.encoded.bits));
    } else if let Some(array) = &field.array {
        output.push_str(&format!("[{}];", array));
    } else {
        output.push(';');
    }

    if !field.comment.is_empty() {
        output.push_str(" //!< ");
        output.push_str(&field.comment);
    }

    output.push('\n');
    output
}

/// Endianness tag for helper names; one-byte fields have no endianness.
fn endian_tag(field: &PrimitiveField, is_big_endian: bool) -> &'static str {
    if field.encoded.bits <= 8 && !field.encoded.is_float {
        ""
    } else if is_big_endian {
        "Be"
    } else {
        "Le"
    }
}

fn encode_helper(field: &PrimitiveField, is_big_endian: bool) -> String {
    if field.is_scaled() {
        format!(
            "float{}ScaledTo{}{}{}Bytes",
            field.in_memory.bits,
            field.encoded.bytes(),
            if field.encoded.is_signed { "Signed" } else { "Unsigned" },
            if is_big_endian { "Be" } else { "Le" }
        )
    } else {
        format!("{}To{}Bytes", field.encoded.helper_root(), endian_tag(field, is_big_endian))
    }
}

fn decode_helper(field: &PrimitiveField, is_big_endian: bool) -> String {
    if field.is_scaled() {
        format!(
            "float{}ScaledFrom{}{}{}Bytes",
            field.in_memory.bits,
            field.encoded.bytes(),
            if field.encoded.is_signed { "Signed" } else { "Unsigned" },
            if is_big_endian { "Be" } else { "Le" }
        )
    } else {
        format!("{}From{}Bytes", field.encoded.helper_root(), endian_tag(field, is_big_endian))
    }
}

/// The rvalue handed to an encode helper.
fn encode_value(field: &PrimitiveField, is_structure_member: bool, indexed: bool) -> String {
    if let Some(constant) = &field.constant_value {
        return constant.clone();
    }

    if field.not_in_memory {
        return "0".to_string();
    }

    let access = if is_structure_member {
        format!("user->{}", field.name)
    } else {
        field.name.clone()
    };
    let access = if indexed { format!("{}[i]", access) } else { access };

    if field.needs_encode_cast() && !field.is_scaled() {
        format!("({}){}", field.encoded.cast_type(), access)
    } else {
        access
    }
}

/// The lvalue receiving a decode helper's result, without any cast.
fn decode_target(field: &PrimitiveField, is_structure_member: bool, indexed: bool) -> String {
    if is_structure_member {
        let access = format!("user->{}", field.name);
        if indexed {
            format!("{}[i]", access)
        } else {
            access
        }
    } else if indexed {
        format!("{}[i]", field.name)
    } else {
        // Scalar decode parameters are pointers
        format!("*{}", field.name)
    }
}

/// The for-loop header covering this field's array.
fn array_loop(field: &PrimitiveField, spacing: &str, is_structure_member: bool, decoding: bool) -> String {
    let array = field.array.as_deref().unwrap_or("");

    match &field.variable_array {
        Some(count) => {
            let count_access = if is_structure_member {
                format!("user->{}", count)
            } else if decoding {
                format!("(*{})", count)
            } else {
                format!("({})", count)
            };
            format!(
                "{}for(i = 0; i < (int){} && i < {}; i++)\n",
                spacing, count_access, array
            )
        }
        None => format!("{}for(i = 0; i < {}; i++)\n", spacing, array),
    }
}

/// The run-flush sequence emitted after a bitfield run terminator.
fn bitfield_close(spacing: &str) -> String {
    format!(
        "{s}// close the bitfield, realigning to the next byte boundary\n\
         {s}if(bitcount != 0)\n\
         {s}{{\n\
         {s}    bitcount = 0;\n\
         {s}    byteindex++;\n\
         {s}}}\n",
        s = spacing
    )
}

/// The string used to encode this field into the byte stream.
pub(crate) fn encode_snippet(
    field: &PrimitiveField,
    is_big_endian: bool,
    is_structure_member: bool,
) -> String {
    if field.not_encoded {
        return String::new();
    }

    let mut output = String::new();
    let mut spacing = "    ".to_string();

    if !field.comment.is_empty() {
        output.push_str(&format!("{}// {}\n", spacing, field.comment));
    }

    if let Some(depends) = &field.depends_on {
        let guard = if is_structure_member {
            format!("user->{}", depends)
        } else {
            depends.clone()
        };
        output.push_str(&format!("{}if({})\n{}{{\n", spacing, guard, spacing));
        spacing.push_str("    ");
    }

    if field.is_bitfield() {
        output.push_str(&format!(
            "{}encodeBitfield((unsigned int){}, data, &byteindex, &bitcount, {});\n",
            spacing,
            encode_value(field, is_structure_member, false),
            field.encoded.bits
        ));
        if field.terminates_bitfield {
            output.push_str(&bitfield_close(&spacing));
        }
    } else {
        let extra_args = if field.is_scaled() {
            format!(
                ", {}, {}",
                field.scale_min.as_deref().unwrap_or("0"),
                field.scaler.as_deref().unwrap_or("1")
            )
        } else {
            String::new()
        };

        if field.array.is_some() {
            output.push_str(&array_loop(field, &spacing, is_structure_member, false));
            output.push_str(&format!(
                "{}    {}({}, data, &byteindex{});\n",
                spacing,
                encode_helper(field, is_big_endian),
                encode_value(field, is_structure_member, true),
                extra_args
            ));
        } else {
            output.push_str(&format!(
                "{}{}({}, data, &byteindex{});\n",
                spacing,
                encode_helper(field, is_big_endian),
                encode_value(field, is_structure_member, false),
                extra_args
            ));
        }
    }

    if field.depends_on.is_some() {
        output.push_str("    }\n");
    }

    output
}

/// The string used to decode this field from the byte stream. With
/// `default_enabled`, default fields decode behind a remaining-bytes guard
/// so a short packet keeps the initialized default.
pub(crate) fn decode_snippet(
    field: &PrimitiveField,
    is_big_endian: bool,
    is_structure_member: bool,
    default_enabled: bool,
) -> String {
    if field.not_encoded {
        return String::new();
    }

    let mut output = String::new();
    let mut spacing = "    ".to_string();

    if !field.comment.is_empty() {
        output.push_str(&format!("{}// {}\n", spacing, field.comment));
    }

    if let Some(depends) = &field.depends_on {
        let guard = if is_structure_member {
            format!("user->{}", depends)
        } else {
            format!("*{}", depends)
        };
        output.push_str(&format!("{}if({})\n{}{{\n", spacing, guard, spacing));
        spacing.push_str("    ");
    }

    let guarded_default = default_enabled && field.default_value.is_some();

    if guarded_default {
        let length = &field.encoded_length.max_encoded_length;
        if field.array.is_some() {
            output.push_str(&format!("{}if(byteindex + {} <= numBytes)\n{}{{\n", spacing, length, spacing));
        } else {
            output.push_str(&format!("{}if(byteindex + {} <= numBytes)\n", spacing, length));
        }
        spacing.push_str("    ");
    }

    if field.is_bitfield() {
        if field.constant_value.is_some() || field.not_in_memory {
            output.push_str(&format!(
                "{}(void)decodeBitfield(data, &byteindex, &bitcount, {});\n",
                spacing, field.encoded.bits
            ));
        } else {
            output.push_str(&format!(
                "{}{} = decodeBitfield(data, &byteindex, &bitcount, {});\n",
                spacing,
                decode_target(field, is_structure_member, false),
                field.encoded.bits
            ));
        }
        if field.terminates_bitfield {
            output.push_str(&bitfield_close(&spacing));
        }
    } else if field.constant_value.is_some() || field.not_in_memory {
        // Nothing in memory receives these bytes
        output.push_str(&format!(
            "{}byteindex += {};\n",
            spacing, field.encoded_length.max_encoded_length
        ));
    } else {
        let extra_args = if field.is_scaled() {
            format!(
                ", {}, 1.0/({})",
                field.scale_min.as_deref().unwrap_or("0"),
                field.scaler.as_deref().unwrap_or("1")
            )
        } else {
            String::new()
        };

        let cast = if field.needs_encode_cast() && !field.is_scaled() {
            format!("({})", field.in_memory.c_type())
        } else {
            String::new()
        };

        if field.array.is_some() {
            output.push_str(&array_loop(field, &spacing, is_structure_member, true));
            output.push_str(&format!(
                "{}    {} = {}{}(data, &byteindex{});\n",
                spacing,
                decode_target(field, is_structure_member, true),
                cast,
                decode_helper(field, is_big_endian),
                extra_args
            ));
        } else {
            output.push_str(&format!(
                "{}{} = {}{}(data, &byteindex{});\n",
                spacing,
                decode_target(field, is_structure_member, false),
                cast,
                decode_helper(field, is_big_endian),
                extra_args
            ));
        }
    }

    if guarded_default && field.array.is_some() {
        let indent = &spacing[..spacing.len() - 4];
        output.push_str(&format!("{}}}\n", indent));
    }

    if field.depends_on.is_some() {
        output.push_str("    }\n");
    }

    output
}

/// The assignment that initializes a default field before decoding begins.
pub(crate) fn set_to_default(field: &PrimitiveField, is_structure_member: bool) -> String {
    let Some(default) = &field.default_value else {
        return String::new();
    };

    if field.array.is_some() {
        let target = decode_target(field, is_structure_member, true);
        format!(
            "    for(i = 0; i < {}; i++)\n        {} = {};\n",
            field.array.as_deref().unwrap_or(""),
            target,
            default
        )
    } else {
        format!("    {} = {};\n", decode_target(field, is_structure_member, false), default)
    }
}

/// True when the user supplies this field's value through the parameter
/// interface.
fn is_user_parameter(field: &PrimitiveField) -> bool {
    !field.not_encoded && !field.not_in_memory && field.constant_value.is_none()
}

/// The encode parameter fragment, such as `, uint16_t n`.
pub(crate) fn encode_signature(field: &PrimitiveField) -> String {
    if !is_user_parameter(field) {
        return String::new();
    }

    match &field.array {
        Some(array) => {
            format!(", const {} {}[{}]", field.in_memory.c_type(), field.name, array)
        }
        None => format!(", {} {}", field.in_memory.c_type(), field.name),
    }
}

/// The decode parameter fragment, such as `, uint16_t* n`.
pub(crate) fn decode_signature(field: &PrimitiveField) -> String {
    if !is_user_parameter(field) {
        return String::new();
    }

    match &field.array {
        Some(array) => format!(", {} {}[{}]", field.in_memory.c_type(), field.name, array),
        None => format!(", {}* {}", field.in_memory.c_type(), field.name),
    }
}

/// The doxygen `\param` line for the encode signature.
pub(crate) fn encode_parameter_comment(field: &PrimitiveField) -> String {
    if !is_user_parameter(field) {
        return String::new();
    }

    if field.comment.is_empty() {
        format!(" * \\param {} is encoded in the packet\n", field.name)
    } else {
        format!(" * \\param {} is {}\n", field.name, field.comment)
    }
}

/// The doxygen `\param` line for the decode signature.
pub(crate) fn decode_parameter_comment(field: &PrimitiveField) -> String {
    if !is_user_parameter(field) {
        return String::new();
    }

    if field.comment.is_empty() {
        format!(" * \\param {} receives the decoded data\n", field.name)
    } else {
        format!(" * \\param {} receives {}\n", field.name, field.comment)
    }
}

/// The short encoding marker used in documentation tables, such as `U16`,
/// `I8`, `F32`, or `B3` for a three-bit bitfield.
pub(crate) fn encoding_marker(field: &PrimitiveField) -> String {
    if field.encoded.is_bitfield {
        format!("B{}", field.encoded.bits)
    } else if field.encoded.is_float {
        format!("F{}", field.encoded.bits)
    } else if field.encoded.is_signed {
        format!("I{}", field.encoded.bits)
    } else {
        format!("U{}", field.encoded.bits)
    }
}
