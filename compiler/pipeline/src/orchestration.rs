//! The main pipeline entry point.

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

use codegen::packets::{emit_packet, emit_structure_module};
use codegen::ModuleFile;
use ir::{Declaration, ProtocolModel};
use logging::Diagnostics;

use crate::document::{write_markdown_documentation, write_protocol_header};
use crate::helpers::install_helper_files;
use crate::{GeneratorOptions, GeneratorReport, PipelineError, Result};

/// Run the complete generation pipeline for one protocol description:
/// read and parse the XML, emit every packet and structure module in
/// document order, then write the protocol header, documentation, and
/// helper runtime.
pub fn run(options: &GeneratorOptions) -> Result<GeneratorReport> {
    let xml = std::fs::read_to_string(&options.input)
        .map_err(|_| PipelineError::InputRead(options.input.clone()))?;

    let mut diagnostics = Diagnostics::new();
    let (model, enum_registry) = parser::parse_str(&xml, &mut diagnostics)?;

    std::fs::create_dir_all(&options.output_dir)?;

    let mut report = GeneratorReport {
        protocol_name: model.meta.name.clone(),
        diagnostics,
        ..Default::default()
    };

    report.files_written.push(write_protocol_header(&model, &options.output_dir)?);

    emit_modules(&model, options, &mut report)?;

    if !options.no_markdown {
        report.files_written.push(write_markdown_documentation(
            &model,
            &enum_registry,
            &options.output_dir,
        )?);
    }

    if !options.no_helper_files {
        report.files_written.extend(install_helper_files(&options.output_dir)?);
    }

    if !options.no_doxygen {
        run_doxygen(&options.output_dir);
    }

    Ok(report)
}

/// Emit every packet and standalone structure, in document order. Writers
/// are flushed and cleared per declaration on all paths, so a later
/// declaration naming the same module appends to it.
fn emit_modules(
    model: &ProtocolModel,
    options: &GeneratorOptions,
    report: &mut GeneratorReport,
) -> Result<()> {
    // Stale modules from an earlier run must not be appended to
    let mut touched: BTreeSet<String> = BTreeSet::new();

    for declaration in &model.declarations {
        let module = match declaration {
            Declaration::Packet(packet) => packet.module_name(&model.meta.prefix),
            Declaration::Structure(structure) => match &structure.module_name {
                Some(name) => name.clone(),
                None => format!("{}{}", model.meta.prefix, structure.name),
            },
        };

        let mut header = ModuleFile::header(&options.output_dir, &module);
        let mut source = ModuleFile::source(&options.output_dir, &module);

        if touched.insert(module.clone()) {
            remove_if_present(&header.path())?;
            remove_if_present(&source.path())?;
        }

        header.prepare_to_append()?;
        source.prepare_to_append()?;

        match declaration {
            Declaration::Packet(packet) => {
                emit_packet(packet, &model.meta, &mut header, &mut source);
                report.packet_count += 1;
            }
            Declaration::Structure(structure) => {
                emit_structure_module(structure, &model.meta, &mut header, &mut source);
                report.structure_count += 1;
            }
        }

        header.flush()?;
        source.flush()?;

        for name in [header.file_name(), source.file_name()] {
            if !report.files_written.contains(&name) {
                report.files_written.push(name);
            }
        }

        header.clear();
        source.clear();
    }

    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

/// Best-effort doxygen hook: when the output directory carries a Doxyfile,
/// run doxygen there and ignore any failure.
fn run_doxygen(output_dir: &Path) {
    if !output_dir.join("Doxyfile").exists() {
        return;
    }

    if let Ok(status) = Command::new("doxygen").current_dir(output_dir).status() {
        if !status.success() {
            logging::trace("pipeline", "doxygen reported a failure, output may be incomplete");
        }
    }
}
