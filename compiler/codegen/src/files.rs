//! Append-aware module writers.
//!
//! Each generated module is a header/source pair. A writer buffers its text
//! in memory and only touches disk on `flush`. Headers own their include
//! guard: a fresh flush wraps the buffer in `#ifndef`/`#endif`, and
//! `prepare_to_append` reopens an existing header by peeling the trailing
//! `#endif` so further content lands inside the guard. Several packets may
//! share one module through the `file` attribute; the writers make that
//! safe as long as modules are emitted in document order.

use std::path::{Path, PathBuf};

use crate::utils::make_line_separator;
use crate::Result;

/// Flavor of a module writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A `.h` file with an include guard.
    Header,
    /// A `.c` file.
    Source,
}

/// One buffered output file.
#[derive(Debug)]
pub struct ModuleFile {
    module: String,
    kind: FileKind,
    directory: PathBuf,
    /// Existing on-disk content retained while appending.
    preamble: String,
    /// Content produced by the current emission.
    contents: String,
    /// Include directives already present, for idempotence.
    includes: Vec<String>,
    appending: bool,
}

impl ModuleFile {
    /// Create a header writer for `module` under `directory`.
    pub fn header(directory: &Path, module: &str) -> Self {
        Self::new(directory, module, FileKind::Header)
    }

    /// Create a source writer for `module` under `directory`.
    pub fn source(directory: &Path, module: &str) -> Self {
        Self::new(directory, module, FileKind::Source)
    }

    fn new(directory: &Path, module: &str, kind: FileKind) -> Self {
        Self {
            module: module.to_string(),
            kind,
            directory: directory.to_path_buf(),
            preamble: String::new(),
            contents: String::new(),
            includes: Vec::new(),
            appending: false,
        }
    }

    /// The file name this writer produces, such as `DemoPingPacket.h`.
    pub fn file_name(&self) -> String {
        match self.kind {
            FileKind::Header => format!("{}.h", self.module),
            FileKind::Source => format!("{}.c", self.module),
        }
    }

    /// The module name without extension.
    pub fn module_name(&self) -> &str { &self.module }

    /// Full path of the output file.
    pub fn path(&self) -> PathBuf { self.directory.join(self.file_name()) }

    /// True when this writer reopened an existing file.
    pub fn is_appending(&self) -> bool { self.appending }

    /// Append raw text to the buffer.
    pub fn write(&mut self, text: &str) { self.contents.push_str(text); }

    /// Ensure the buffer ends with exactly one blank line.
    pub fn make_line_separator(&mut self) { make_line_separator(&mut self.contents); }

    /// Write an `#include "…"` directive once per file. Empty names and
    /// repeats are ignored, including directives already present in a
    /// reopened file.
    pub fn write_include_directive(&mut self, name: &str) {
        if name.is_empty() || self.includes.iter().any(|seen| seen == name) {
            return;
        }

        let directive = format!("#include \"{}\"", name);
        if self.preamble.contains(&directive) {
            self.includes.push(name.to_string());
            return;
        }

        self.contents.push_str(&directive);
        self.contents.push('\n');
        self.includes.push(name.to_string());
    }

    /// Reopen an existing output file so new content is appended: a header
    /// keeps everything up to its closing guard, a source keeps everything.
    pub fn prepare_to_append(&mut self) -> Result<()> {
        let path = self.path();
        if !path.exists() {
            return Ok(());
        }

        let existing = std::fs::read_to_string(&path)?;

        self.preamble = match self.kind {
            FileKind::Header => match existing.rfind("#endif") {
                Some(sentinel) => existing[..sentinel].to_string(),
                None => existing,
            },
            FileKind::Source => existing,
        };
        self.appending = true;

        Ok(())
    }

    /// Write the buffered content to disk. Headers are wrapped in (or
    /// resealed with) their include guard.
    pub fn flush(&mut self) -> Result<()> {
        let mut output = String::new();

        match self.kind {
            FileKind::Header => {
                if self.appending {
                    output.push_str(&self.preamble);
                    output.push_str(&self.contents);
                    make_line_separator(&mut output);
                    output.push_str("#endif\n");
                } else {
                    let guard = self.guard_macro();
                    output.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
                    output.push_str(&self.contents);
                    make_line_separator(&mut output);
                    output.push_str("#endif\n");
                }
            }
            FileKind::Source => {
                output.push_str(&self.preamble);
                output.push_str(&self.contents);
                make_line_separator(&mut output);
            }
        }

        std::fs::create_dir_all(&self.directory)?;
        std::fs::write(self.path(), output)?;
        Ok(())
    }

    /// Empty the buffers, resetting for the next module parse operation.
    pub fn clear(&mut self) {
        self.preamble.clear();
        self.contents.clear();
        self.includes.clear();
        self.appending = false;
    }

    fn guard_macro(&self) -> String {
        let mut guard: String = self
            .module
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        guard.push_str("_H");
        guard
    }
}
