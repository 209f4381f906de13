#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Simple logging utilities for the compiler.

use std::fmt;

/// Prints a trace message to stderr with module prefix.
pub fn trace(module: &str, msg: &str) {
    eprintln!("[TRACE][{}] {}", module, msg);
}

/// Collector for the human-readable diagnostics produced while parsing a
/// protocol description. Parsing never aborts on a model problem; the
/// offending attribute is cleared and a line is recorded here. The front end
/// decides the sink.
#[derive(Debug, Default)]
pub struct Diagnostics {
    lines: Vec<String>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self { Self::default() }

    /// Record a structure-level diagnostic: `"<structName>: <reason>"`.
    pub fn report(&mut self, owner: &str, reason: &str) {
        self.lines.push(format!("{}: {}", owner, reason));
    }

    /// Record a field-level diagnostic: `"<structName>: <fieldName>: <reason>"`.
    pub fn report_field(&mut self, owner: &str, field: &str, reason: &str) {
        self.lines.push(format!("{}: {}: {}", owner, field, reason));
    }

    /// All recorded lines, in order.
    pub fn lines(&self) -> &[String] { &self.lines }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Number of recorded lines.
    pub fn len(&self) -> usize { self.lines.len() }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
