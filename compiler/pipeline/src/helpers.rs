//! Installation of the shipped helper runtime.
//!
//! The generated encode/decode functions call a small fixed runtime that is
//! shipped verbatim with the generator. The files are embedded at compile
//! time and written into the output directory unless the user opts out.

use std::path::Path;

use crate::Result;

/// The helper runtime, as `(file name, contents)` pairs.
const HELPER_FILES: &[(&str, &str)] = &[
    ("fieldencode.h", include_str!("../resources/fieldencode.h")),
    ("fieldencode.c", include_str!("../resources/fieldencode.c")),
    ("fielddecode.h", include_str!("../resources/fielddecode.h")),
    ("fielddecode.c", include_str!("../resources/fielddecode.c")),
    ("scaledencode.h", include_str!("../resources/scaledencode.h")),
    ("scaledencode.c", include_str!("../resources/scaledencode.c")),
    ("scaleddecode.h", include_str!("../resources/scaleddecode.h")),
    ("scaleddecode.c", include_str!("../resources/scaleddecode.c")),
    ("bitfieldspecial.h", include_str!("../resources/bitfieldspecial.h")),
    ("bitfieldspecial.c", include_str!("../resources/bitfieldspecial.c")),
    ("floatspecial.h", include_str!("../resources/floatspecial.h")),
    ("floatspecial.c", include_str!("../resources/floatspecial.c")),
];

/// Write the helper runtime into the output directory, returning the file
/// names written.
pub fn install_helper_files(output_dir: &Path) -> Result<Vec<String>> {
    let mut written = Vec::new();

    for (name, contents) in HELPER_FILES {
        std::fs::write(output_dir.join(name), contents)?;
        written.push((*name).to_string());
    }

    Ok(written)
}
