#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! High-level pipeline that turns one protocol description document into
//! its complete set of outputs by orchestrating the parser and the code
//! emitters.
//!
//! ## Module Organization
//!
//! - `orchestration` - The main entry point (`run`)
//! - `document` - The top-level protocol header and the Markdown document
//! - `helpers` - Installation of the shipped helper runtime

use std::path::PathBuf;

use thiserror::Error;

pub mod document;
pub mod helpers;
pub mod orchestration;

pub use orchestration::run;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the generation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The protocol description file could not be read.
    #[error("failed to open protocol file: {}", .0.display())]
    InputRead(PathBuf),
    /// The document was not valid XML or not a protocol description.
    #[error(transparent)]
    Parse(#[from] parser::ParseError),
    /// Error propagated from the codegen crate.
    #[error(transparent)]
    Codegen(#[from] codegen::CodegenError),
    /// I/O error while creating or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Options controlling one generator invocation.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// The protocol description XML file.
    pub input: PathBuf,
    /// Directory receiving the generated files.
    pub output_dir: PathBuf,
    /// Skip the doxygen hook after generation.
    pub no_doxygen: bool,
    /// Skip the Markdown documentation output.
    pub no_markdown: bool,
    /// Skip installing the helper runtime files.
    pub no_helper_files: bool,
}

/// Summary of one generator invocation.
#[derive(Debug, Default)]
pub struct GeneratorReport {
    /// Name of the generated protocol.
    pub protocol_name: String,
    /// Number of packets generated.
    pub packet_count: usize,
    /// Number of standalone structures generated.
    pub structure_count: usize,
    /// Every file written, relative to the output directory.
    pub files_written: Vec<String>,
    /// Diagnostic lines collected while parsing.
    pub diagnostics: logging::Diagnostics,
}
