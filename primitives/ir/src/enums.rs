//! Enumeration model and numeric value resolution.

use serde::{Deserialize, Serialize};

/// One enumerator of an [`EnumModel`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumValue {
    /// Enumerator name.
    pub name: String,
    /// The literal from the XML. May be empty, decimal, `0x…`, `0b…`, or a
    /// symbol the C compiler resolves later.
    pub raw_value: String,
    /// The resolved value: a decimal rendering when the raw value parsed, or
    /// a symbolic form such as `BASE + 2` otherwise.
    pub number: String,
    /// Enumerator description.
    pub comment: String,
}

/// A C enumeration declared in the protocol description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumModel {
    /// Enumeration type name.
    pub name: String,
    /// Enumeration description.
    pub comment: String,
    /// Enumerators in declaration order.
    pub values: Vec<EnumValue>,
    /// Minimum number of bits needed to encode the largest known value.
    pub min_bit_width: u32,
}

impl EnumModel {
    /// Create an enumeration with unresolved values.
    pub fn new(name: String, comment: String, values: Vec<EnumValue>) -> Self {
        let mut model = Self { name, comment, values, min_bit_width: 0 };
        model.compute_number_list();
        model
    }

    /// True when the enumeration declares no enumerators and therefore
    /// contributes nothing to the output.
    pub fn is_hidden(&self) -> bool { self.values.is_empty() }

    /// Walk the enumerator list and resolve each entry to a concrete number
    /// or a symbolic base-plus-offset form, then derive the minimum bit
    /// width.
    ///
    /// An empty literal increments a running counter. A literal that fails
    /// numeric parsing becomes the symbolic base for subsequent empty
    /// entries.
    pub fn compute_number_list(&mut self) {
        let mut value: i64 = -1;
        let mut max_value: i64 = 0;
        let mut base = String::new();
        let mut any_numeric = false;

        for entry in &mut self.values {
            let literal = entry.raw_value.trim();

            if literal.is_empty() {
                value += 1;
                entry.number = if base.is_empty() {
                    any_numeric = true;
                    value.to_string()
                } else {
                    format!("{} + {}", base, value)
                };
            } else {
                match parse_enum_literal(literal) {
                    Some(parsed) => {
                        value = parsed;
                        base.clear();
                        any_numeric = true;
                        entry.number = value.to_string();
                    }
                    None => {
                        // Track offsets from the unresolved symbol
                        base = literal.to_string();
                        value = 0;
                        entry.number = base.clone();
                    }
                }
            }

            if base.is_empty() && value > max_value {
                max_value = value;
            }
        }

        self.min_bit_width = if any_numeric { bits_for(max_value).max(8) } else { 8 };
    }
}

/// Parse a decimal, hexadecimal (`0x`), or binary (`0b`) enumerator literal.
fn parse_enum_literal(literal: &str) -> Option<i64> {
    if let Some(hex) = literal.strip_prefix("0x").or_else(|| literal.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok().map(|v| v as i64)
    } else if let Some(bin) = literal.strip_prefix("0b").or_else(|| literal.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok().map(|v| v as i64)
    } else {
        literal.parse::<i64>().ok()
    }
}

/// Number of bits needed to represent `value`, at least one.
fn bits_for(value: i64) -> u32 {
    if value <= 0 {
        1
    } else {
        64 - (value as u64).leading_zeros()
    }
}
