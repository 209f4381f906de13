//! Wiregen command line front end
//!
//! This binary drives the generation pipeline for one protocol description
//! per invocation. For compatibility with the historical tool the exit code
//! convention is inverted: 1 on success, 0 on every failure path.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::env;
use std::path::PathBuf;

use config::Config;
use pipeline::GeneratorOptions;

/// Exit code reported on success (historical convention).
const EXIT_SUCCESS: i32 = 1;
/// Exit code reported on failure (historical convention).
const EXIT_FAILURE: i32 = 0;

fn main() {
    let arguments: Vec<String> = env::args().skip(1).collect();
    std::process::exit(run_cli(&arguments));
}

/// Everything gathered from the command line.
#[derive(Debug, Default, PartialEq)]
struct CliArguments {
    input: Option<PathBuf>,
    output_path: Option<PathBuf>,
    no_doxygen: bool,
    no_markdown: bool,
    no_helper_files: bool,
    dump_model: bool,
    model_output: Option<PathBuf>,
}

/// Walk the argument list. The input file is whichever argument ends in
/// `.xml`; a remaining bare argument is the output path.
fn parse_arguments(arguments: &[String]) -> CliArguments {
    let mut parsed = CliArguments::default();

    for argument in arguments {
        let lowered = argument.to_ascii_lowercase();

        if lowered.contains("-no-doxygen") {
            parsed.no_doxygen = true;
        } else if lowered.contains("-no-markdown") {
            parsed.no_markdown = true;
        } else if lowered.contains("-no-helper-files") {
            parsed.no_helper_files = true;
        } else if argument == "dump-model" {
            parsed.dump_model = true;
        } else if lowered.ends_with(".xml") {
            parsed.input = Some(PathBuf::from(argument));
        } else if parsed.dump_model && lowered.ends_with(".json") {
            parsed.model_output = Some(PathBuf::from(argument));
        } else {
            parsed.output_path = Some(PathBuf::from(argument));
        }
    }

    parsed
}

fn print_usage() {
    println!("Protocol generator usage:");
    println!("wiregen input.xml [outputpath] [-no-doxygen] [-no-markdown] [-no-helper-files]");
    println!("wiregen dump-model input.xml model.json");
}

fn run_cli(arguments: &[String]) -> i32 {
    if arguments.is_empty() {
        print_usage();
        return EXIT_FAILURE;
    }

    let parsed = parse_arguments(arguments);

    let Some(input) = parsed.input.clone() else {
        println!("must provide a protocol file.");
        return EXIT_FAILURE;
    };

    if parsed.dump_model {
        return run_dump_model(&parsed, &input);
    }

    // Configured defaults apply wherever the command line is silent
    let defaults = Config::load_default();

    let options = GeneratorOptions {
        input,
        output_dir: parsed.output_path.clone().unwrap_or_else(|| PathBuf::from(".")),
        no_doxygen: parsed.no_doxygen || defaults.generator.no_doxygen,
        no_markdown: parsed.no_markdown || defaults.generator.no_markdown,
        no_helper_files: parsed.no_helper_files || defaults.generator.no_helper_files,
    };

    match pipeline::run(&options) {
        Ok(report) => {
            // One line per issue, on standard output
            print!("{}", report.diagnostics);
            EXIT_SUCCESS
        }
        Err(error) => {
            println!("{}", error);
            EXIT_FAILURE
        }
    }
}

/// Serialize the parsed model for debugging.
fn run_dump_model(parsed: &CliArguments, input: &std::path::Path) -> i32 {
    let Some(model_output) = parsed.model_output.clone() else {
        println!("dump-model requires an output file ending in .json");
        return EXIT_FAILURE;
    };

    let xml = match std::fs::read_to_string(input) {
        Ok(xml) => xml,
        Err(_) => {
            println!("failed to open protocol file: {}", input.display());
            return EXIT_FAILURE;
        }
    };

    let mut diagnostics = logging::Diagnostics::new();
    let model = match parser::parse_str(&xml, &mut diagnostics) {
        Ok((model, _registry)) => model,
        Err(error) => {
            println!("{}", error);
            return EXIT_FAILURE;
        }
    };

    print!("{}", diagnostics);

    match model.to_file(&model_output) {
        Ok(()) => EXIT_SUCCESS,
        Err(error) => {
            println!("{}", error);
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arguments(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn arguments_are_recognized_in_any_order() {
        let parsed = parse_arguments(&arguments(&[
            "-no-markdown",
            "generated",
            "link.xml",
            "-No-Doxygen",
        ]));
        assert_eq!(parsed.input, Some(PathBuf::from("link.xml")));
        assert_eq!(parsed.output_path, Some(PathBuf::from("generated")));
        assert!(parsed.no_doxygen);
        assert!(parsed.no_markdown);
        assert!(!parsed.no_helper_files);
    }

    #[test]
    fn dump_model_collects_its_output_file() {
        let parsed = parse_arguments(&arguments(&["dump-model", "link.xml", "model.json"]));
        assert!(parsed.dump_model);
        assert_eq!(parsed.input, Some(PathBuf::from("link.xml")));
        assert_eq!(parsed.model_output, Some(PathBuf::from("model.json")));
    }

    #[test]
    fn missing_protocol_file_fails() {
        assert_eq!(run_cli(&arguments(&["generated"])), EXIT_FAILURE);
    }
}
