#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! XML front end for wiregen.
//!
//! This crate turns a protocol description document into the model defined
//! by the `ir` crate: it owns the lightweight DOM built from quick-xml
//! events, the recursive builders for enumerations, fields, structures, and
//! packets, and every cross-field validation the model demands. Model
//! problems never abort the parse; the offending attribute is cleared and a
//! diagnostic line is collected. Only unreadable or malformed XML is fatal.

pub mod dom;
pub mod driver;

mod enums;
mod fields;
mod packets;
mod structures;

pub use dom::XmlElement;
pub use driver::parse_document;

use ir::ProtocolModel;
use logging::Diagnostics;
use registry::EnumRegistry;
use thiserror::Error;

/// Errors that end a parse with no output.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("failed to validate xml: {0}")]
    Xml(String),
    /// The document has no root element.
    #[error("document contains no root element")]
    EmptyDocument,
    /// The root element is not `Protocol`.
    #[error("root element must be Protocol, found {0}")]
    WrongRoot(String),
    /// The protocol has no name to derive output names from.
    #[error("Protocol element requires a name attribute")]
    MissingProtocolName,
}

/// Convenient result type for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse a complete protocol description from XML text.
pub fn parse_str(
    xml: &str,
    diagnostics: &mut Diagnostics,
) -> Result<(ProtocolModel, EnumRegistry)> {
    let root = XmlElement::parse_str(xml)?;
    parse_document(&root, diagnostics)
}
