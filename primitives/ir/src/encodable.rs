//! Composite encodables: structures, packets, and the shared encodable
//! interface.

use serde::{Deserialize, Serialize};

use crate::enums::EnumModel;
use crate::field::PrimitiveField;
use crate::length::EncodedLength;

/// Any node that contributes to the wire representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Encodable {
    /// A leaf field.
    Primitive(PrimitiveField),
    /// An embedded structure.
    Structure(StructureModel),
}

impl Encodable {
    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            Encodable::Primitive(f) => &f.name,
            Encodable::Structure(s) => &s.name,
        }
    }

    /// Node description.
    pub fn comment(&self) -> &str {
        match self {
            Encodable::Primitive(f) => &f.comment,
            Encodable::Structure(s) => &s.comment,
        }
    }

    /// Fixed array count expression, if any.
    pub fn array(&self) -> Option<&str> {
        match self {
            Encodable::Primitive(f) => f.array.as_deref(),
            Encodable::Structure(s) => s.array.as_deref(),
        }
    }

    /// Runtime element count reference, if any.
    pub fn variable_array(&self) -> Option<&str> {
        match self {
            Encodable::Primitive(f) => f.variable_array.as_deref(),
            Encodable::Structure(s) => s.variable_array.as_deref(),
        }
    }

    /// Conditional inclusion reference, if any.
    pub fn depends_on(&self) -> Option<&str> {
        match self {
            Encodable::Primitive(f) => f.depends_on.as_deref(),
            Encodable::Structure(s) => s.depends_on.as_deref(),
        }
    }

    /// True for leaf fields.
    pub fn is_primitive(&self) -> bool { matches!(self, Encodable::Primitive(_)) }

    /// True when the node repeats.
    pub fn is_array(&self) -> bool { self.array().is_some() }

    /// True for a leaf field encoded as a packed bitfield.
    pub fn is_bitfield(&self) -> bool {
        matches!(self, Encodable::Primitive(f) if f.is_bitfield())
    }

    /// True when this node or any descendant uses bitfields.
    pub fn uses_bitfields(&self) -> bool {
        match self {
            Encodable::Primitive(f) => f.is_bitfield(),
            Encodable::Structure(s) => s.has_bitfields,
        }
    }

    /// True when emitting this node requires the loop iterator local.
    pub fn uses_iterator(&self) -> bool { self.is_array() }

    /// True when this node carries a default value.
    pub fn is_default(&self) -> bool {
        matches!(self, Encodable::Primitive(f) if f.default_value.is_some())
    }

    /// True when this node encodes a constant instead of user data.
    pub fn is_constant(&self) -> bool {
        matches!(self, Encodable::Primitive(f) if f.constant_value.is_some())
    }

    /// True for struct members that never reach the wire.
    pub fn is_not_encoded(&self) -> bool {
        matches!(self, Encodable::Primitive(f) if f.not_encoded)
    }

    /// True for wire bytes with no struct member behind them.
    pub fn is_not_in_memory(&self) -> bool {
        matches!(self, Encodable::Primitive(f) if f.not_in_memory)
    }

    /// Symbolic byte lengths of this node.
    pub fn encoded_length(&self) -> &EncodedLength {
        match self {
            Encodable::Primitive(f) => &f.encoded_length,
            Encodable::Structure(s) => &s.encoded_length,
        }
    }
}

/// A composite encodable with ordered children, nested enumerations, and an
/// aggregate length.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureModel {
    /// Structure name.
    pub name: String,
    /// Generated C type name, `prefix + name + "_t"`.
    pub type_name: String,
    /// Structure description.
    pub comment: String,
    /// Fixed array count expression, if any.
    pub array: Option<String>,
    /// Runtime element count reference, if any.
    pub variable_array: Option<String>,
    /// Conditional inclusion reference, if any.
    pub depends_on: Option<String>,
    /// Module file name override, only meaningful for top-level structures.
    pub module_name: Option<String>,
    /// Children in document order.
    pub children: Vec<Encodable>,
    /// Enumerations declared inside this structure.
    pub enums: Vec<EnumModel>,
    /// Extra include directives for the owning header.
    pub includes: Vec<String>,
    /// Aggregate symbolic byte lengths.
    pub encoded_length: EncodedLength,
    /// Some child, possibly nested, is a bitfield.
    pub has_bitfields: bool,
    /// Some child repeats and needs the loop iterator local.
    pub needs_iterator: bool,
    /// Some child carries a default value.
    pub has_defaults: bool,
}

impl StructureModel {
    /// Number of children that actually appear on the wire.
    pub fn number_of_encodes(&self) -> usize {
        self.children.iter().filter(|c| !c.is_not_encoded()).count()
    }

    /// Number of wire fields whose value is supplied by the user, excluding
    /// constants and reserved space.
    pub fn number_of_non_const_encodes(&self) -> usize {
        self.children
            .iter()
            .filter(|c| !c.is_not_encoded() && !c.is_not_in_memory() && !c.is_constant())
            .count()
    }

    /// Sum the children's lengths and apply this structure's own array and
    /// conditional attributes.
    pub fn compute_encoded_length(&mut self) {
        let mut total = EncodedLength::default();
        for child in &self.children {
            total.add_to_length(child.encoded_length());
        }
        total.wrap_array(
            self.array.as_deref(),
            self.variable_array.is_some(),
            self.depends_on.is_some(),
        );
        self.encoded_length = total;
    }
}

/// A structure specialized with packet identity and interface selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PacketModel {
    /// The packet's field layout.
    pub structure: StructureModel,
    /// Packet identifier: an enumerator name or a numeric literal.
    pub id: String,
    /// Module file name override from the `file` attribute.
    pub module_name: Option<String>,
    /// Emit the structure-pointer interface.
    pub structure_interface: bool,
    /// Emit the per-field parameter interface.
    pub parameter_interface: bool,
}

impl PacketModel {
    /// The module name the generated files use: the `file` override when
    /// present, otherwise `<prefix><name>Packet`.
    pub fn module_name(&self, prefix: &str) -> String {
        match &self.module_name {
            Some(name) => name.clone(),
            None => format!("{}{}Packet", prefix, self.structure.name),
        }
    }
}
