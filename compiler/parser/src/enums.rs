//! Enumeration builder.

use ir::{EnumModel, EnumValue};

use crate::dom::XmlElement;

/// Build an enumeration model from an `Enum` element. Entries without a
/// name are skipped; an enumeration without entries is kept but contributes
/// nothing to the output.
pub(crate) fn parse_enum_element(element: &XmlElement) -> EnumModel {
    let name = element.attribute_or_empty("name").to_string();
    let comment = element.attribute_or_empty("comment").to_string();

    let mut values = Vec::new();
    for entry in element.children_named("Value") {
        let value_name = element_name(entry);
        if value_name.is_empty() {
            continue;
        }

        values.push(EnumValue {
            name: value_name,
            raw_value: entry.attribute_or_empty("value").to_string(),
            number: String::new(),
            comment: entry.attribute_or_empty("comment").to_string(),
        });
    }

    EnumModel::new(name, comment, values)
}

fn element_name(element: &XmlElement) -> String {
    element.attribute_or_empty("name").to_string()
}
