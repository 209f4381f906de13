//! Primitive field builder.

use ir::{FieldType, PrimitiveField};
use logging::Diagnostics;

use crate::dom::XmlElement;

/// Build a primitive field from a `Data` element. Returns `None` when the
/// element cannot name a usable type; attribute misuse is repaired in place
/// with a diagnostic against `owner`.
pub(crate) fn parse_data_element(
    element: &XmlElement,
    owner: &str,
    diagnostics: &mut Diagnostics,
) -> Option<PrimitiveField> {
    let mut name = element.attribute_or_empty("name").to_string();
    if name.is_empty() {
        name = "_unknown".to_string();
    }

    let (in_memory, encoded) = parse_types(element, owner, &name, diagnostics)?;

    let mut field = PrimitiveField {
        name,
        comment: element.attribute_or_empty("comment").to_string(),
        in_memory,
        encoded,
        array: element.non_empty_attribute("array"),
        variable_array: element.non_empty_attribute("variableArray"),
        depends_on: element.non_empty_attribute("dependsOn"),
        default_value: element.non_empty_attribute("default"),
        constant_value: element.non_empty_attribute("constant"),
        scaler: element.non_empty_attribute("scaler"),
        scale_min: element.non_empty_attribute("min"),
        not_encoded: element.attribute_is_true("notEncoded"),
        not_in_memory: element.attribute_is_true("notInMemory"),
        ..Default::default()
    };

    // We can't have a variable array length without an array
    if field.array.is_none() && field.variable_array.is_some() {
        diagnostics.report_field(
            owner,
            &field.name,
            "must specify array length to specify variable array length",
        );
        field.variable_array = None;
    }

    if field.depends_on.is_some() && field.variable_array.is_some() {
        diagnostics.report_field(
            owner,
            &field.name,
            "variable length arrays cannot also use dependsOn",
        );
        field.depends_on = None;
    }

    if field.is_bitfield() && field.array.is_some() {
        diagnostics.report_field(owner, &field.name, "bitfields cannot be arrays");
        field.array = None;
        field.variable_array = None;
    }

    if field.default_value.is_some() && field.constant_value.is_some() {
        diagnostics.report_field(
            owner,
            &field.name,
            "fields cannot be both default and constant, default ignored",
        );
        field.default_value = None;
    }

    if field.scaler.is_some() && !field.is_scaled() {
        diagnostics.report_field(
            owner,
            &field.name,
            "scaler ignored, scaling requires a float in memory and an integer encoding",
        );
        field.scaler = None;
        field.scale_min = None;
    }

    field.compute_encoded_length();

    Some(field)
}

/// Resolve the in-memory and encoded types from the `bits`, `inMemoryType`,
/// and `encodedType` attributes.
fn parse_types(
    element: &XmlElement,
    owner: &str,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> Option<(FieldType, FieldType)> {
    if let Some(bits_text) = element.non_empty_attribute("bits") {
        let Ok(bits) = bits_text.parse::<u32>() else {
            diagnostics.report_field(owner, name, "bits attribute is not a number, field ignored");
            return None;
        };

        if bits == 0 {
            diagnostics.report_field(owner, name, "bitfields need at least one bit, field ignored");
            return None;
        }

        let bits = if bits > 32 {
            diagnostics.report_field(owner, name, "bitfields are limited to 32 bits");
            32
        } else {
            bits
        };

        let encoded = FieldType::bitfield(bits);
        return Some((encoded, encoded));
    }

    let Some(memory_text) = element.non_empty_attribute("inMemoryType") else {
        diagnostics.report_field(owner, name, "missing inMemoryType, field ignored");
        return None;
    };

    let Some(in_memory) = FieldType::parse(&memory_text) else {
        diagnostics.report_field(owner, name, "unrecognized inMemoryType, field ignored");
        return None;
    };

    let encoded = match element.non_empty_attribute("encodedType") {
        Some(encoded_text) => match FieldType::parse(&encoded_text) {
            Some(encoded) => encoded,
            None => {
                diagnostics.report_field(owner, name, "unrecognized encodedType, using inMemoryType");
                in_memory
            }
        },
        None => in_memory,
    };

    Some((in_memory, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(xml: &str) -> (Option<PrimitiveField>, Diagnostics) {
        let element = XmlElement::parse_str(xml).expect("document should parse");
        let mut diagnostics = Diagnostics::new();
        let field = parse_data_element(&element, "Test", &mut diagnostics);
        (field, diagnostics)
    }

    #[test]
    fn plain_field_defaults_encoded_type() {
        let (field, diagnostics) =
            parse_one(r#"<Data name="n" inMemoryType="unsigned16" comment="a counter"/>"#);
        let field = field.expect("field should parse");
        assert!(diagnostics.is_empty());
        assert_eq!(field.encoded, field.in_memory);
        assert_eq!(field.encoded_length.max_encoded_length, "2");
        assert!(!field.is_bitfield());
    }

    #[test]
    fn bits_attribute_makes_a_bitfield() {
        let (field, diagnostics) = parse_one(r#"<Data name="flags" bits="3"/>"#);
        let field = field.expect("field should parse");
        assert!(diagnostics.is_empty());
        assert!(field.is_bitfield());
        assert_eq!(field.encoded.bits, 3);
        assert!(field.encoded_length.is_empty());
    }

    #[test]
    fn oversized_bitfield_is_clamped() {
        let (field, diagnostics) = parse_one(r#"<Data name="wide" bits="40"/>"#);
        let field = field.expect("field should parse");
        assert_eq!(field.encoded.bits, 32);
        assert_eq!(diagnostics.lines()[0], "Test: wide: bitfields are limited to 32 bits");
    }

    #[test]
    fn variable_array_requires_array() {
        let (field, diagnostics) =
            parse_one(r#"<Data name="payload" inMemoryType="uint8" variableArray="count"/>"#);
        let field = field.expect("field should parse");
        assert!(field.variable_array.is_none());
        assert_eq!(
            diagnostics.lines()[0],
            "Test: payload: must specify array length to specify variable array length"
        );
    }

    #[test]
    fn variable_array_wins_over_depends_on() {
        let (field, _) = parse_one(
            r#"<Data name="payload" inMemoryType="uint8" array="8" variableArray="count" dependsOn="flag"/>"#,
        );
        let field = field.expect("field should parse");
        assert!(field.variable_array.is_some());
        assert!(field.depends_on.is_none());
    }

    #[test]
    fn missing_type_is_ignored() {
        let (field, diagnostics) = parse_one(r#"<Data name="ghost"/>"#);
        assert!(field.is_none());
        assert_eq!(diagnostics.lines()[0], "Test: ghost: missing inMemoryType, field ignored");
    }
}
