#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Protocol symbol registry — a lightweight database for enumerations and
//! packet identifiers gathered during a parse.
//!
//! The registry is append-only while the document is parsed and read-only
//! during emission, which is what lets the Markdown emitter substitute
//! numeric values for enumerator names and link packet identifiers after the
//! whole document is known.

use ir::EnumModel;

/// A registry of every enumeration seen in the document, whether declared at
/// the protocol root or nested inside a structure or packet.
#[derive(Default)]
pub struct EnumRegistry {
    enums: Vec<EnumModel>,
    packet_ids: Vec<String>,
}

impl EnumRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self { Self::default() }

    /// Add an enumeration to the registry.
    pub fn insert(&mut self, model: EnumModel) { self.enums.push(model); }

    /// Record a packet identifier so the documentation can link to it.
    pub fn insert_packet_id(&mut self, id: &str) { self.packet_ids.push(id.to_string()); }

    /// All registered enumerations, in registration order.
    pub fn enums(&self) -> &[EnumModel] { &self.enums }

    /// All registered packet identifiers.
    pub fn packet_ids(&self) -> &[String] { &self.packet_ids }

    /// True when `name` is a known packet identifier.
    pub fn is_packet_id(&self, name: &str) -> bool {
        self.packet_ids.iter().any(|id| id == name)
    }

    /// Substitute any enumerator name occurring in `text` with its resolved
    /// numeric form. Entries whose raw literal already equals the resolved
    /// form are skipped; duplicate names resolve to the first registration.
    pub fn replace_enumeration_name_with_value(&self, text: &str) -> String {
        let mut result = text.to_string();

        for model in &self.enums {
            for value in &model.values {
                if value.name.is_empty() {
                    continue;
                }

                // Nothing to gain when the literal is already the number
                if value.raw_value == value.number {
                    continue;
                }

                if result.contains(&value.name) {
                    result = result.replace(&value.name, &value.number);
                }
            }
        }

        result
    }
}
