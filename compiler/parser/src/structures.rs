//! Structure builder: children, aggregate flags, sibling references, and
//! bitfield run detection.

use ir::{Encodable, StructureModel};
use logging::Diagnostics;
use registry::EnumRegistry;

use crate::dom::XmlElement;
use crate::enums::parse_enum_element;
use crate::fields::parse_data_element;

/// Build a structure from a `Structure` or `Packet` element and validate
/// every cross-field rule. Nested enumerations are also registered globally
/// so documentation can resolve them later.
pub(crate) fn parse_structure_element(
    element: &XmlElement,
    prefix: &str,
    enum_registry: &mut EnumRegistry,
    diagnostics: &mut Diagnostics,
) -> StructureModel {
    let mut name = element.attribute_or_empty("name").to_string();
    if name.is_empty() {
        name = "_unknown".to_string();
    }

    let mut structure = StructureModel {
        type_name: format!("{}{}_t", prefix, name),
        name,
        comment: element.attribute_or_empty("comment").to_string(),
        array: element.non_empty_attribute("array"),
        variable_array: element.non_empty_attribute("variableArray"),
        depends_on: element.non_empty_attribute("dependsOn"),
        ..Default::default()
    };

    // We can't have a variable array length without an array
    if structure.array.is_none() && structure.variable_array.is_some() {
        diagnostics
            .report(&structure.name, "must specify array length to specify variable array length");
        structure.variable_array = None;
    }

    if structure.depends_on.is_some() && structure.variable_array.is_some() {
        diagnostics.report(&structure.name, "variable length arrays cannot also use dependsOn");
        structure.depends_on = None;
    }

    for enum_element in element.children_named("Enum") {
        let model = parse_enum_element(enum_element);
        enum_registry.insert(model.clone());
        structure.enums.push(model);
    }

    for include in element.children_named("Include") {
        if let Some(header) = include.non_empty_attribute("name") {
            structure.includes.push(header);
        }
    }

    parse_children(element, &mut structure, prefix, enum_registry, diagnostics);

    structure.compute_encoded_length();

    structure
}

/// Parse the child encodables in document order and maintain every
/// order-sensitive rule: default revocation, sibling reference resolution,
/// and the bitfield run sweep.
fn parse_children(
    element: &XmlElement,
    structure: &mut StructureModel,
    prefix: &str,
    enum_registry: &mut EnumRegistry,
    diagnostics: &mut Diagnostics,
) {
    // Index of the last encoded child, for bitfield run bookkeeping
    let mut previous: Option<usize> = None;

    for child_element in &element.children {
        let mut child = match child_element.name.as_str() {
            "Data" => match parse_data_element(child_element, &structure.name, diagnostics) {
                Some(field) => Encodable::Primitive(field),
                None => continue,
            },
            "Structure" => Encodable::Structure(parse_structure_element(
                child_element,
                prefix,
                enum_registry,
                diagnostics,
            )),
            _ => continue,
        };

        // Fields that never reach the wire carry no metadata worth checking
        if !child.is_not_encoded() {
            update_aggregate_flags(structure, &child, diagnostics);
            resolve_sibling_references(structure, &mut child, diagnostics);
            sweep_bitfield_run(structure, &mut child, &mut previous);
        }

        structure.children.push(child);
    }
}

/// Track the aggregate flags and revoke any earlier defaults once a
/// non-default field appears after them.
fn update_aggregate_flags(
    structure: &mut StructureModel,
    child: &Encodable,
    diagnostics: &mut Diagnostics,
) {
    if child.is_primitive() {
        if child.uses_bitfields() {
            structure.has_bitfields = true;
        }

        if child.uses_iterator() {
            structure.needs_iterator = true;
        }

        if child.is_default() {
            structure.has_defaults = true;
        } else if structure.has_defaults {
            // Only the trailing fields may carry defaults; a later
            // non-default field silently revokes the earlier ones
            for earlier in &mut structure.children {
                if let Encodable::Primitive(field) = earlier {
                    if field.default_value.is_some() {
                        field.default_value = None;
                        if field.terminates_bitfield {
                            field.set_bitfield_run_length();
                        } else {
                            field.compute_encoded_length();
                        }
                        diagnostics.report_field(
                            &structure.name,
                            &field.name,
                            "default value ignored, field is followed by non-default",
                        );
                    }
                }
            }
            structure.has_defaults = false;
        }
    } else if child.is_array() {
        // Structure arrays iterate in the parent function
        structure.needs_iterator = true;
    }
}

/// Validate `variableArray` and `dependsOn` references against the prior
/// siblings. A failed lookup clears the attribute and recomputes the
/// field's length contribution.
fn resolve_sibling_references(
    structure: &StructureModel,
    child: &mut Encodable,
    diagnostics: &mut Diagnostics,
) {
    let mut clear_variable = false;
    let mut clear_depends = false;

    if let Some(reference) = child.variable_array() {
        if !has_prior_count_sibling(structure, reference) {
            diagnostics.report_field(
                &structure.name,
                child.name(),
                "variable length array ignored, failed to find length variable",
            );
            clear_variable = true;
        }
    }

    if let Some(reference) = child.depends_on() {
        if child.is_bitfield() {
            diagnostics.report_field(&structure.name, child.name(), "bitfields cannot use dependsOn");
            clear_depends = true;
        } else if !has_prior_count_sibling(structure, reference) {
            diagnostics.report_field(
                &structure.name,
                child.name(),
                "dependsOn ignored, failed to find dependsOn variable",
            );
            clear_depends = true;
        }
    }

    if !clear_variable && !clear_depends {
        return;
    }

    match child {
        Encodable::Primitive(field) => {
            if clear_variable {
                field.variable_array = None;
            }
            if clear_depends {
                field.depends_on = None;
            }
            field.compute_encoded_length();
        }
        Encodable::Structure(nested) => {
            if clear_variable {
                nested.variable_array = None;
            }
            if clear_depends {
                nested.depends_on = None;
            }
            nested.compute_encoded_length();
        }
    }
}

/// True when a prior sibling named `reference` exists that is a primitive,
/// both in memory and encoded.
fn has_prior_count_sibling(structure: &StructureModel, reference: &str) -> bool {
    structure.children.iter().any(|sibling| {
        sibling.is_primitive()
            && !sibling.is_not_encoded()
            && !sibling.is_not_in_memory()
            && sibling.name() == reference
    })
}

/// Maintain the bitfield run state: each bitfield is presumed to terminate
/// its run until the next child proves otherwise, and the run's byte count
/// always lives on the current terminator.
fn sweep_bitfield_run(
    structure: &mut StructureModel,
    child: &mut Encodable,
    previous: &mut Option<usize>,
) {
    if let Encodable::Primitive(field) = child {
        if field.is_bitfield() {
            field.terminates_bitfield = true;

            if let Some(index) = *previous {
                if let Encodable::Primitive(previous_field) = &mut structure.children[index] {
                    if previous_field.is_bitfield() {
                        // previous is not the terminator
                        previous_field.terminates_bitfield = false;
                        previous_field.encoded_length.clear();
                        field.starting_bit_count = previous_field.ending_bit_count();
                    }
                }
            }

            field.set_bitfield_run_length();
        }
    }

    *previous = Some(structure.children.len());
}

/// Convert a packet or structure name to the `UPPER_SNAKE` form used when no
/// identifier was declared.
pub(crate) fn to_upper_snake(name: &str) -> String {
    let mut result = String::new();
    let mut previous_lower = false;

    for character in name.chars() {
        if character.is_uppercase() && previous_lower {
            result.push('_');
        }
        previous_lower = character.is_lowercase() || character.is_ascii_digit();
        result.push(character.to_ascii_uppercase());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> (StructureModel, Diagnostics) {
        let element = XmlElement::parse_str(xml).expect("document should parse");
        let mut registry = EnumRegistry::new();
        let mut diagnostics = Diagnostics::new();
        let structure = parse_structure_element(&element, "Demo", &mut registry, &mut diagnostics);
        (structure, diagnostics)
    }

    #[test]
    fn bitfield_run_detection() {
        let (structure, diagnostics) = parse(
            r#"<Structure name="Status">
                 <Data name="a" bits="3"/>
                 <Data name="b" bits="5"/>
                 <Data name="c" bits="8"/>
               </Structure>"#,
        );
        assert!(diagnostics.is_empty());
        assert!(structure.has_bitfields);

        let fields: Vec<_> = structure
            .children
            .iter()
            .map(|child| match child {
                Encodable::Primitive(field) => field,
                _ => panic!("expected primitives"),
            })
            .collect();

        assert_eq!(fields[0].starting_bit_count, 0);
        assert_eq!(fields[1].starting_bit_count, 3);
        assert_eq!(fields[2].starting_bit_count, 8);
        assert!(!fields[0].terminates_bitfield);
        assert!(!fields[1].terminates_bitfield);
        assert!(fields[2].terminates_bitfield);

        // The run's two bytes belong to the terminator alone
        assert!(fields[0].encoded_length.is_empty());
        assert!(fields[1].encoded_length.is_empty());
        assert_eq!(fields[2].encoded_length.max_encoded_length, "2");
        assert_eq!(structure.encoded_length.max_encoded_length, "2");
    }

    #[test]
    fn separate_bitfield_runs_restart_counts() {
        let (structure, _) = parse(
            r#"<Structure name="Pair">
                 <Data name="a" bits="4"/>
                 <Data name="gap" inMemoryType="uint8"/>
                 <Data name="b" bits="4"/>
               </Structure>"#,
        );

        let fields: Vec<_> = structure
            .children
            .iter()
            .map(|child| match child {
                Encodable::Primitive(field) => field,
                _ => panic!("expected primitives"),
            })
            .collect();

        assert!(fields[0].terminates_bitfield);
        assert_eq!(fields[2].starting_bit_count, 0);
        assert!(fields[2].terminates_bitfield);
        // 1 byte per run plus the gap byte
        assert_eq!(structure.encoded_length.max_encoded_length, "1 + 1 + 1");
    }

    #[test]
    fn variable_array_reference_must_exist() {
        let (structure, diagnostics) = parse(
            r#"<Structure name="Blob">
                 <Data name="payload" inMemoryType="uint8" array="16" variableArray="count"/>
               </Structure>"#,
        );
        assert_eq!(
            diagnostics.lines()[0],
            "Blob: payload: variable length array ignored, failed to find length variable"
        );
        assert!(structure.children[0].variable_array().is_none());
        // With the reference cleared the array is fixed-length again
        assert_eq!(structure.encoded_length.min_encoded_length, "16");
    }

    #[test]
    fn variable_array_reference_resolves_to_prior_primitive() {
        let (structure, diagnostics) = parse(
            r#"<Structure name="Blob">
                 <Data name="count" inMemoryType="uint8"/>
                 <Data name="payload" inMemoryType="uint8" array="16" variableArray="count"/>
               </Structure>"#,
        );
        assert!(diagnostics.is_empty());
        assert_eq!(structure.encoded_length.min_encoded_length, "1");
        assert_eq!(structure.encoded_length.max_encoded_length, "1 + 16");
    }

    #[test]
    fn depends_on_rejected_on_bitfields() {
        let (structure, diagnostics) = parse(
            r#"<Structure name="Status">
                 <Data name="present" inMemoryType="uint8"/>
                 <Data name="flag" bits="2" dependsOn="present"/>
               </Structure>"#,
        );
        assert_eq!(diagnostics.lines()[0], "Status: flag: bitfields cannot use dependsOn");
        assert!(structure.children[1].depends_on().is_none());
    }

    #[test]
    fn default_followed_by_non_default_is_revoked() {
        let (structure, diagnostics) = parse(
            r#"<Structure name="Config">
                 <Data name="a" inMemoryType="unsigned32"/>
                 <Data name="b" inMemoryType="unsigned32" default="0"/>
                 <Data name="c" inMemoryType="unsigned32"/>
               </Structure>"#,
        );
        assert_eq!(
            diagnostics.lines()[0],
            "Config: b: default value ignored, field is followed by non-default"
        );
        assert!(!structure.has_defaults);
        assert!(!structure.children[1].is_default());
        assert_eq!(structure.encoded_length.min_encoded_length, "4 + 4 + 4");
    }

    #[test]
    fn trailing_defaults_survive() {
        let (structure, diagnostics) = parse(
            r#"<Structure name="Config">
                 <Data name="a" inMemoryType="unsigned32"/>
                 <Data name="b" inMemoryType="unsigned32"/>
                 <Data name="c" inMemoryType="unsigned32" default="0"/>
               </Structure>"#,
        );
        assert!(diagnostics.is_empty());
        assert!(structure.has_defaults);
        assert_eq!(structure.encoded_length.min_encoded_length, "4 + 4");
        assert_eq!(structure.encoded_length.non_default_encoded_length, "4 + 4 + 4");
    }

    #[test]
    fn upper_snake_names() {
        assert_eq!(to_upper_snake("Ping"), "PING");
        assert_eq!(to_upper_snake("GpsData"), "GPS_DATA");
        assert_eq!(to_upper_snake("Version2Info"), "VERSION2_INFO");
    }
}
