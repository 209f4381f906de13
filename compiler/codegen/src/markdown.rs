//! Markdown documentation tables.
//!
//! The encoding table is produced by a depth-first walk of the encodable
//! tree that threads a nested outline number and a running start-byte
//! expression, then rendered in two passes: column widths first, body
//! second. Empty encoding or repeat cells render as merged cells.

use ir::length::{
    add_length_strings, collapse_length_string, subtract_one_from_length_string,
};
use ir::{Encodable, StructureModel};

use crate::fields::encoding_marker;
use crate::utils::spaced_string;

/// One row of the five-column encoding table.
#[derive(Debug, Clone)]
pub(crate) struct DocRow {
    pub bytes: String,
    pub name: String,
    pub encoding: String,
    pub repeat: String,
    pub description: String,
}

/// Collect the rows for every encoded child of a packet or structure.
pub(crate) fn collect_rows(children: &[Encodable]) -> Vec<DocRow> {
    let mut rows = Vec::new();
    let mut start_byte = "0".to_string();

    for child in children {
        if child.is_not_encoded() {
            continue;
        }
        let mut outline = vec![rows_top_index(&rows)];
        encodable_details(child, &mut outline, &mut start_byte, &mut rows);
    }

    rows
}

/// Top-level rows restart their outline numbering from the count of rows
/// already emitted at depth one.
fn rows_top_index(rows: &[DocRow]) -> usize {
    rows.iter().filter(|row| !row.name.contains('.')).count()
}

/// Append the row (and, for structures, the sub-rows) for one encodable.
fn encodable_details(
    encodable: &Encodable,
    outline: &mut Vec<usize>,
    start_byte: &mut String,
    rows: &mut Vec<DocRow>,
) {
    if encodable.is_not_encoded() {
        return;
    }

    if let Some(last) = outline.last_mut() {
        *last += 1;
    }

    let outline_string = outline
        .iter()
        .map(|index| index.to_string())
        .collect::<Vec<_>>()
        .join(".");
    let name = format!("{}){}", outline_string, encodable.name());

    let repeat = match (encodable.array(), encodable.variable_array()) {
        (None, _) => String::new(),
        (Some(array), None) => array.to_string(),
        (Some(array), Some(count)) => format!("{}, up to {}", count, array),
    };

    let mut description = encodable.comment().to_string();
    if let Some(depends) = encodable.depends_on() {
        if !description.is_empty() && !description.ends_with('.') {
            description.push('.');
        }
        if !description.is_empty() {
            description.push(' ');
        }
        description.push_str(&format!("Only included if {} is non-zero.", depends));
    }

    match encodable {
        Encodable::Primitive(field) => {
            let advances = !field.is_bitfield() || field.terminates_bitfield;
            let length = &field.encoded_length.max_encoded_length;

            let bytes = if !advances || length.is_empty() || length == "1" {
                start_byte.clone()
            } else {
                let next = collapse_length_string(&add_length_strings(start_byte, length));
                format!("{}...{}", start_byte, subtract_one_from_length_string(&next))
            };

            if advances && !length.is_empty() {
                *start_byte = collapse_length_string(&add_length_strings(start_byte, length));
            }

            rows.push(DocRow {
                bytes,
                name,
                encoding: encoding_marker(field),
                repeat,
                description,
            });
        }
        Encodable::Structure(structure) => {
            let length = &structure.encoded_length.max_encoded_length;
            let next_start_byte =
                collapse_length_string(&add_length_strings(start_byte, length));

            let bytes = if length.is_empty() || length == "1" {
                start_byte.clone()
            } else {
                format!(
                    "{}...{}",
                    start_byte,
                    subtract_one_from_length_string(&next_start_byte)
                )
            };

            rows.push(DocRow { bytes, name, encoding: String::new(), repeat, description });

            sub_details(structure, outline, start_byte, rows);

            // These two may differ when this structure is repeated
            *start_byte = next_start_byte;
        }
    }
}

fn sub_details(
    structure: &StructureModel,
    outline: &mut Vec<usize>,
    start_byte: &mut String,
    rows: &mut Vec<DocRow>,
) {
    outline.push(0);
    for child in &structure.children {
        encodable_details(child, outline, start_byte, rows);
    }
    outline.pop();
}

/// Render the encoding table with its caption. Column widths cover every
/// cell, and empty encoding or repeat cells merge into their neighbors.
pub(crate) fn render_encoding_table(caption: &str, rows: &[DocRow]) -> String {
    // The multiply sign reads better and avoids accidental emphasis
    let rows: Vec<DocRow> = rows
        .iter()
        .map(|row| DocRow {
            bytes: row.bytes.replace("1*", "").replace('*', "&times;"),
            ..row.clone()
        })
        .collect();

    let mut byte_column = "Bytes".len();
    let mut name_column = "Name".len();
    let mut encoding_column = "[Enc](#Enc)".len();
    let mut repeat_column = "Repeat".len();
    let mut comment_column = "Description".len();

    for row in &rows {
        byte_column = byte_column.max(row.bytes.len());
        name_column = name_column.max(row.name.len());
        encoding_column = encoding_column.max(row.encoding.len());
        repeat_column = repeat_column.max(row.repeat.len());
        comment_column = comment_column.max(row.description.len());
    }

    let mut output = String::new();
    output.push_str(&format!("[{}]\n", caption));

    output.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n",
        spaced_string("Bytes", byte_column),
        spaced_string("Name", name_column),
        spaced_string("[Enc](#Enc)", encoding_column),
        spaced_string("Repeat", repeat_column),
        spaced_string("Description", comment_column)
    ));

    // The encoding and repeat columns are centered
    output.push_str(&format!(
        "| {} | {} | :{}: | :{}: | {} |\n",
        "-".repeat(byte_column),
        "-".repeat(name_column),
        "-".repeat(encoding_column.saturating_sub(2)),
        "-".repeat(repeat_column.saturating_sub(2)),
        "-".repeat(comment_column)
    ));

    for row in &rows {
        let mut line = String::from("| ");
        line.push_str(&spaced_string(&row.bytes, byte_column));
        line.push_str(" | ");
        line.push_str(&spaced_string(&row.name, name_column));

        if row.encoding.is_empty() && row.repeat.is_empty() {
            line.push_str(&spaced_string("", encoding_column + repeat_column));
            line.push_str("     ||| ");
        } else if row.encoding.is_empty() {
            line.push_str(&spaced_string("", encoding_column));
            line.push_str("   || ");
            line.push_str(&spaced_string(&row.repeat, repeat_column));
            line.push_str(" | ");
        } else if row.repeat.is_empty() {
            line.push_str(" | ");
            line.push_str(&spaced_string(&row.encoding, encoding_column));
            line.push_str(&spaced_string("", repeat_column));
            line.push_str("   || ");
        } else {
            line.push_str(" | ");
            line.push_str(&spaced_string(&row.encoding, encoding_column));
            line.push_str(" | ");
            line.push_str(&spaced_string(&row.repeat, repeat_column));
            line.push_str(" | ");
        }

        line.push_str(&spaced_string(&row.description, comment_column));
        line.push_str(" |\n");
        output.push_str(&line);
    }

    output.push('\n');
    output
}
