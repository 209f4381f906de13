//! Primitive field model: leaf encodables and their type information.

use serde::{Deserialize, Serialize};

use crate::length::{multiply_length_string, EncodedLength};

/// In-memory or on-wire type of a primitive field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    /// Signed integer type.
    pub is_signed: bool,
    /// IEEE-754 float type (32 or 64 bits).
    pub is_float: bool,
    /// Packed bitfield (1 to 32 bits).
    pub is_bitfield: bool,
    /// Width in bits.
    pub bits: u32,
}

impl FieldType {
    /// Parse a type attribute such as `unsigned16`, `uint8`, `signed32`,
    /// `int24`, `float32`, or `float64`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_suffix("_t").unwrap_or(text);

        let (is_signed, is_float, rest) = if let Some(rest) = text.strip_prefix("unsigned") {
            (false, false, rest)
        } else if let Some(rest) = text.strip_prefix("uint") {
            (false, false, rest)
        } else if let Some(rest) = text.strip_prefix("signed") {
            (true, false, rest)
        } else if let Some(rest) = text.strip_prefix("int") {
            (true, false, rest)
        } else if let Some(rest) = text.strip_prefix("float") {
            (false, true, rest)
        } else {
            return None;
        };

        let bits: u32 = rest.parse().ok()?;

        if is_float {
            if bits != 32 && bits != 64 {
                return None;
            }
        } else if bits == 0 || bits > 64 || bits % 8 != 0 {
            return None;
        }

        Some(Self { is_signed, is_float, is_bitfield: false, bits })
    }

    /// A bitfield type of the given width.
    pub fn bitfield(bits: u32) -> Self {
        Self { is_signed: false, is_float: false, is_bitfield: true, bits }
    }

    /// Width in whole bytes. Bitfields report zero; their byte count belongs
    /// to the run terminator.
    pub fn bytes(&self) -> u32 {
        if self.is_bitfield {
            0
        } else {
            self.bits / 8
        }
    }

    /// The C storage type. Odd integer widths round up to the next standard
    /// container, and bitfields use the smallest unsigned type that holds
    /// them.
    pub fn c_type(&self) -> String {
        if self.is_float {
            return if self.bits == 64 { "double".to_string() } else { "float".to_string() };
        }

        let container = if self.is_bitfield {
            match self.bits {
                0..=8 => 8,
                9..=16 => 16,
                _ => 32,
            }
        } else {
            match self.bits {
                8 => 8,
                16 => 16,
                24 | 32 => 32,
                _ => 64,
            }
        };

        if self.is_signed {
            format!("int{}_t", container)
        } else {
            format!("uint{}_t", container)
        }
    }

    /// The exact-width name used to form helper function calls, such as
    /// `uint16` in `uint16ToBeBytes`.
    pub fn helper_root(&self) -> String {
        if self.is_float {
            format!("float{}", self.bits)
        } else if self.is_signed {
            format!("int{}", self.bits)
        } else {
            format!("uint{}", self.bits)
        }
    }

    /// The exact-width cast type for an encode call, such as `uint16_t`.
    pub fn cast_type(&self) -> String {
        if self.is_float {
            return self.c_type();
        }

        // Odd widths still travel through their container type
        let container = match self.bits {
            0..=8 => 8,
            9..=16 => 16,
            17..=32 => 32,
            _ => 64,
        };

        if self.is_signed {
            format!("int{}_t", container)
        } else {
            format!("uint{}_t", container)
        }
    }
}

/// A leaf encodable: an integer, float, or bitfield field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimitiveField {
    /// Field name.
    pub name: String,
    /// Field description.
    pub comment: String,
    /// Type of the struct member.
    pub in_memory: FieldType,
    /// Type used on the wire.
    pub encoded: FieldType,
    /// Fixed array count expression, if any.
    pub array: Option<String>,
    /// Name of the prior sibling holding the runtime element count.
    pub variable_array: Option<String>,
    /// Name of the prior sibling gating this field's presence.
    pub depends_on: Option<String>,
    /// Default literal for a trailing field that may be absent on the wire.
    pub default_value: Option<String>,
    /// Constant literal encoded in place of user data.
    pub constant_value: Option<String>,
    /// Scale factor literal for scaled float encodings.
    pub scaler: Option<String>,
    /// Scale minimum literal for scaled float encodings.
    pub scale_min: Option<String>,
    /// Present in the struct but never on the wire.
    pub not_encoded: bool,
    /// Present on the wire but not in the struct (reserved space).
    pub not_in_memory: bool,
    /// Cumulative bit offset of this field within its bitfield run.
    pub starting_bit_count: u32,
    /// True for the last field of a bitfield run.
    pub terminates_bitfield: bool,
    /// Symbolic byte lengths contributed by this field.
    pub encoded_length: EncodedLength,
}

impl PrimitiveField {
    /// True when this field encodes as part of a packed bitfield run.
    pub fn is_bitfield(&self) -> bool { self.encoded.is_bitfield }

    /// Cumulative bit count after this field within its run.
    pub fn ending_bit_count(&self) -> u32 { self.starting_bit_count + self.encoded.bits }

    /// True when the encode call must cast, because the member type differs
    /// from the wire type.
    pub fn needs_encode_cast(&self) -> bool {
        !self.encoded.is_bitfield && self.in_memory != self.encoded
    }

    /// True when a scaled encode/decode helper is called for this field.
    pub fn is_scaled(&self) -> bool {
        self.scaler.is_some() && self.in_memory.is_float && !self.encoded.is_float
    }

    /// Compute the encoded length of this field. Bitfields are skipped; the
    /// structure's run sweep assigns the run's byte count to the terminator.
    pub fn compute_encoded_length(&mut self) {
        self.encoded_length.clear();

        if self.not_encoded || self.is_bitfield() {
            return;
        }

        let bytes = self.encoded.bytes().to_string();
        let expr = match &self.array {
            Some(count) => multiply_length_string(count, &bytes),
            None => bytes,
        };

        self.encoded_length = EncodedLength::for_field(
            &expr,
            self.variable_array.is_some(),
            self.depends_on.is_some(),
            self.default_value.is_some(),
        );
    }

    /// Assign the run's byte count to this terminator field.
    pub fn set_bitfield_run_length(&mut self) {
        let bytes = self.ending_bit_count().div_ceil(8);
        self.encoded_length = EncodedLength::for_field(
            &bytes.to_string(),
            false,
            false,
            self.default_value.is_some(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        let u16 = FieldType::parse("unsigned16").expect("unsigned16 should parse");
        assert_eq!(u16.bits, 16);
        assert!(!u16.is_signed);
        assert_eq!(u16.c_type(), "uint16_t");

        let alias = FieldType::parse("uint8").expect("uint8 should parse");
        assert_eq!(alias.bits, 8);

        let i24 = FieldType::parse("int24").expect("int24 should parse");
        assert!(i24.is_signed);
        assert_eq!(i24.c_type(), "int32_t");
        assert_eq!(i24.helper_root(), "int24");

        let f64 = FieldType::parse("float64").expect("float64 should parse");
        assert_eq!(f64.c_type(), "double");
    }

    #[test]
    fn rejects_bad_widths() {
        assert!(FieldType::parse("unsigned12").is_none());
        assert!(FieldType::parse("float16").is_none());
        assert!(FieldType::parse("unsigned128").is_none());
        assert!(FieldType::parse("string").is_none());
    }

    #[test]
    fn bitfield_container_types() {
        assert_eq!(FieldType::bitfield(3).c_type(), "uint8_t");
        assert_eq!(FieldType::bitfield(12).c_type(), "uint16_t");
        assert_eq!(FieldType::bitfield(31).c_type(), "uint32_t");
    }

    #[test]
    fn field_length_accounts_for_arrays() {
        let mut field = PrimitiveField {
            name: "payload".into(),
            in_memory: FieldType::parse("uint8").expect("type"),
            encoded: FieldType::parse("uint8").expect("type"),
            array: Some("16".into()),
            variable_array: Some("count".into()),
            ..Default::default()
        };
        field.compute_encoded_length();
        assert_eq!(field.encoded_length.max_encoded_length, "16");
        assert!(field.encoded_length.min_encoded_length.is_empty());
    }

    #[test]
    fn bitfield_terminator_owns_run_bytes() {
        let mut field = PrimitiveField {
            name: "flags".into(),
            in_memory: FieldType::bitfield(8),
            encoded: FieldType::bitfield(8),
            starting_bit_count: 8,
            terminates_bitfield: true,
            ..Default::default()
        };
        field.compute_encoded_length();
        assert!(field.encoded_length.is_empty());

        field.set_bitfield_run_length();
        assert_eq!(field.encoded_length.max_encoded_length, "2");
        assert_eq!(field.encoded_length.min_encoded_length, "2");
    }
}
