#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Wiregen Intermediate Representation
//!
//! This crate defines the model that represents a parsed wire-protocol
//! description: packets, structures, primitive fields, bitfield runs,
//! enumerations, and the symbolic encoded-length algebra that ties them
//! together. Models are built once by the parser, consumed by the code
//! emitters, and discarded per input document.

pub mod encodable;
pub mod enums;
pub mod field;
pub mod length;

pub use encodable::{Encodable, PacketModel, StructureModel};
pub use enums::{EnumModel, EnumValue};
pub use field::{FieldType, PrimitiveField};
pub use length::EncodedLength;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for model file round-trips.
#[derive(Debug, Error)]
pub enum IrError {
    /// Underlying I/O error while reading or writing a model file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Optional protocol features that gate helper includes in generated sources.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProtocolSupport {
    /// Emit the `floatspecial.h` include for non-native float encodings.
    pub special_float: bool,
    /// Emit the `bitfieldspecial.h` include for packed bitfield runs.
    pub bitfield: bool,
}

impl Default for ProtocolSupport {
    fn default() -> Self { Self { special_float: true, bitfield: true } }
}

/// Top-level attributes of the protocol being generated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolMeta {
    /// Protocol name, used for file names and the generic packet routines.
    pub name: String,
    /// Protocol description for the documentation outputs.
    pub comment: String,
    /// Type-name prefix applied to every generated symbol.
    pub prefix: String,
    /// API number advertised through the generated `get<Name>Api()` macro.
    pub api: String,
    /// Version string advertised through the generated `get<Name>Version()` macro.
    pub version: String,
    /// True when multi-byte fields encode most significant byte first.
    pub is_big_endian: bool,
    /// Optional feature support flags.
    pub support: ProtocolSupport,
}

/// A top-level declaration of the protocol document, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Declaration {
    /// A standalone structure that gets its own generated module.
    Structure(StructureModel),
    /// A packet with identity and interface selection.
    Packet(PacketModel),
}

/// The parsed protocol document: metadata, global enumerations, and the
/// packet/structure declarations in the order they appeared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolModel {
    /// Protocol-wide attributes.
    pub meta: ProtocolMeta,
    /// Enumerations declared directly under the protocol root.
    pub enums: Vec<EnumModel>,
    /// Extra include directives for the top-level protocol header.
    pub includes: Vec<String>,
    /// Packets and standalone structures, in document order.
    pub declarations: Vec<Declaration>,
}

impl ProtocolModel {
    /// Load a model from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, IrError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save this model to a JSON file with pretty formatting.
    pub fn to_file(&self, path: &std::path::Path) -> Result<(), IrError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        // Ensure file ends with a newline (POSIX standard)
        use std::io::Write;
        writeln!(file)?;
        Ok(())
    }

    /// Get all packets across the document, in document order.
    pub fn packets(&self) -> Vec<&PacketModel> {
        self.declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Packet(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Get all standalone structures across the document, in document order.
    pub fn structures(&self) -> Vec<&StructureModel> {
        self.declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Structure(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Get the total number of top-level declarations.
    pub fn declaration_count(&self) -> usize { self.declarations.len() }
}
