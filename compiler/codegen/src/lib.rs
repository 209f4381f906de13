#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Code generation for wiregen.
//!
//! This crate turns the parsed protocol model into C text and Markdown
//! documentation. It focuses solely on emission: declarations, encode and
//! decode function bodies, packet utility accessors, and the aligned
//! documentation tables. Emission is deterministic and line-oriented; given
//! an identical model the output bytes are identical.
//!
//! Parsing, validation, and file orchestration live in companion crates.

pub mod enums;
pub mod fields;
pub mod files;
pub mod markdown;
pub mod packets;
pub mod structures;
pub mod utils;

use thiserror::Error;

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Underlying I/O error while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Generic message-based error.
    #[error("{0}")]
    Message(String),
}

impl From<String> for CodegenError {
    fn from(msg: String) -> Self { CodegenError::Message(msg) }
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

pub use files::{FileKind, ModuleFile};
