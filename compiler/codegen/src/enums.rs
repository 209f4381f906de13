//! Enumeration emitters: C declarations and Markdown tables.

use ir::EnumModel;
use registry::EnumRegistry;

use crate::utils::{output_long_comment, spaced_string};

/// Render the C `typedef enum` declaration with aligned trailing comments.
/// An enumeration without entries emits nothing.
pub fn render_enum_declaration(model: &EnumModel) -> String {
    if model.is_hidden() {
        return String::new();
    }

    let mut output = String::new();

    if !model.comment.is_empty() {
        output.push_str("/*!\n");
        output.push_str(&output_long_comment(" *", &model.comment));
        output.push_str("\n */\n");
    }

    let declarations: Vec<String> = model
        .values
        .iter()
        .map(|value| {
            if value.raw_value.is_empty() {
                format!("    {}", value.name)
            } else {
                format!("    {} = {}", value.name, value.raw_value)
            }
        })
        .collect();

    // Pad the name column to a multiple of four past the longest entry
    let mut max_length = declarations.iter().map(|d| d.len()).max().unwrap_or(0);
    max_length += 1;
    max_length += 4 - (max_length % 4);

    output.push_str("typedef enum\n");
    output.push_str("{\n");

    for (index, declaration) in declarations.iter().enumerate() {
        let separator = if index + 1 < declarations.len() { "," } else { " " };
        let mut line = spaced_string(&format!("{}{}", declaration, separator), max_length);
        line.push_str("//!< ");
        line.push_str(&model.values[index].comment);
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output.push('}');
    output.push_str(&model.name);
    output.push_str(";\n");

    output
}

/// Render the three-column Markdown table documenting an enumeration. Names
/// that match a known packet identifier become anchor links. An empty
/// `outline` suppresses the heading.
pub fn render_enum_markdown(model: &EnumModel, outline: &str, registry: &EnumRegistry) -> String {
    if model.is_hidden() {
        return String::new();
    }

    let code_names: Vec<String> = model
        .values
        .iter()
        .map(|value| {
            if registry.is_packet_id(&value.name) {
                format!("[`{}`](#{})", value.name, value.name)
            } else {
                format!("`{}`", value.name)
            }
        })
        .collect();

    let mut first_column = "Name".len();
    let mut second_column = "Value".len();
    let mut third_column = "Description".len();
    for (index, value) in model.values.iter().enumerate() {
        first_column = first_column.max(code_names[index].len());
        second_column = second_column.max(value.number.len());
        third_column = third_column.max(value.comment.len());
    }

    let mut output = String::new();

    if !outline.is_empty() {
        output.push_str(&format!("## {}) {}\n\n", outline, model.name));
    }

    // Table caption
    if !model.comment.is_empty() {
        output.push_str(&format!("[{}]\n", model.comment));
    }

    output.push_str(&format!(
        "| {} | {} | {} |\n",
        spaced_string("Name", first_column),
        spaced_string("Value", second_column),
        spaced_string("Description", third_column)
    ));

    // Underscore the header; the value column is centered
    output.push_str(&format!(
        "| {} | :{}: | {} |\n",
        "-".repeat(first_column),
        "-".repeat(second_column.saturating_sub(2)),
        "-".repeat(third_column)
    ));

    for (index, value) in model.values.iter().enumerate() {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            spaced_string(&code_names[index], first_column),
            spaced_string(&value.number, second_column),
            spaced_string(&value.comment, third_column)
        ));
    }

    output.push('\n');

    output
}

#[cfg(test)]
mod tests {
    use ir::EnumValue;

    use super::*;

    fn sample() -> EnumModel {
        EnumModel::new(
            "DemoPackets".into(),
            "The packet identifiers".into(),
            vec![
                EnumValue {
                    name: "DEMO_PING".into(),
                    raw_value: "0x01".into(),
                    comment: "Link check".into(),
                    ..Default::default()
                },
                EnumValue { name: "DEMO_ECHO".into(), ..Default::default() },
            ],
        )
    }

    #[test]
    fn declaration_is_aligned_and_comma_separated() {
        let text = render_enum_declaration(&sample());
        assert!(text.starts_with("/*!\n * The packet identifiers\n */\n"));
        assert!(text.contains("typedef enum\n{\n"));
        assert!(text.contains("    DEMO_PING = 0x01,"));
        assert!(text.contains("//!< Link check"));
        assert!(text.ends_with("}DemoPackets;\n"));

        // Comment columns line up
        let columns: Vec<usize> = text
            .lines()
            .filter(|line| line.contains("//!<"))
            .map(|line| line.find("//!<").expect("comment marker"))
            .collect();
        assert!(columns.windows(2).all(|pair| pair[0] == pair[1] || pair.len() < 2));
    }

    #[test]
    fn empty_enumeration_emits_nothing() {
        let empty = EnumModel::new("Empty".into(), "unused".into(), vec![]);
        assert!(render_enum_declaration(&empty).is_empty());

        let registry = EnumRegistry::new();
        assert!(render_enum_markdown(&empty, "1", &registry).is_empty());
    }

    #[test]
    fn markdown_links_packet_identifiers() {
        let mut registry = EnumRegistry::new();
        registry.insert_packet_id("DEMO_PING");

        let text = render_enum_markdown(&sample(), "1.1", &registry);
        assert!(text.starts_with("## 1.1) DemoPackets\n"));
        assert!(text.contains("[The packet identifiers]\n"));
        assert!(text.contains("[`DEMO_PING`](#DEMO_PING)"));
        assert!(text.contains("`DEMO_ECHO`"));
        assert!(text.contains("| Name"));
        // DEMO_ECHO auto-increments past the hex literal
        assert!(text.contains("| 2 "));
    }
}
