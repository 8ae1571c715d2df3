//! kicad-symgen CLI
//!
//! Usage:
//!   kicad-symgen [OPTIONS] <INPUT>...
//!
//! Options:
//!   -o, --output <LIBNAME>  Library name, written to LIBNAME.kicad_sym [default: a]
//!   -c, --config <FILE>     Generator configuration (TOML format)
//!   -v, --verbose...        More log output and full error reports
//!   -s, --silent            No log output
//!   -h, --help              Print help

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info, LevelFilter};

use kicad_symgen::{
    generate_with, library_path, read_sources, write_library_file, Diagnostics, GenerateConfig,
    GeneratorConfig, SexprWriter, Status,
};

#[derive(Parser)]
#[command(name = "kicad-symgen")]
#[command(about = "Generate a KiCad symbol library from CSV symbol tables")]
struct Cli {
    /// CSV input files, processed in order
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Library name; the output file is <LIBNAME>.kicad_sym
    #[arg(short, long, value_name = "LIBNAME", default_value = "a")]
    output: String,

    /// Generator configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress informational output
    #[arg(short, long, conflicts_with = "verbose")]
    silent: bool,
}

fn log_level(verbose: u8, silent: bool) -> LevelFilter {
    if silent {
        return LevelFilter::Off;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the command line
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose, cli.silent))
        .parse_default_env()
        .init();

    let config = match &cli.config {
        Some(path) => match GeneratorConfig::from_file(path) {
            Ok(c) => GenerateConfig::from(&c),
            Err(e) => {
                eprintln!("Error loading configuration '{}': {}", path.display(), e);
                process::exit(Status::InputError.exit_code());
            }
        },
        None => GenerateConfig::default(),
    };

    let mut diagnostics = Diagnostics::new();
    let sources = read_sources(&cli.input, &mut diagnostics);
    let generation = generate_with(&sources, &config, diagnostics);

    let status = generation.status();
    if status != Status::Success {
        let report = if cli.verbose > 0 {
            generation.diagnostics.render_verbose(&sources)
        } else {
            generation.diagnostics.render_plain()
        };
        eprint!("{}", report);
        eprintln!(
            "{} error(s), no library written",
            generation.diagnostics.len()
        );
        process::exit(status.exit_code());
    }

    let path = library_path(&cli.output);
    if let Err(e) = write_library_file(&path, &generation.library, &SexprWriter::new()) {
        error!("cannot write '{}': {}", path.display(), e);
        eprintln!("Error writing '{}': {}", path.display(), e);
        process::exit(Status::InputError.exit_code());
    }
    info!(
        "{} symbols from {} files",
        generation.library.len(),
        sources.len()
    );
}
