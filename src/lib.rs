//! kicad-symgen - KiCad symbol libraries from CSV symbol tables
//!
//! This library provides a CSV reader, a symbol table builder with symbol
//! derivation, a pin layout engine and a writer for `.kicad_sym` libraries.
//!
//! # Example
//!
//! ```rust
//! use kicad_symgen::{generate, GenerateConfig, SourceFile};
//!
//! let csv = "symbol name,footprint,datasheet,description,keywords\n\
//!            ,pin category,pin number,pin name,pin gr type,pin el type\n\
//!            BUF,,,,\n\
//!            ,left,1,A,line,input\n\
//!            ,right,2,Y,line,output\n";
//! let generation = generate(&[SourceFile::new("buf.csv", csv)], &GenerateConfig::default());
//! assert!(generation.diagnostics.is_empty());
//! assert!(generation.render().contains("(symbol \"BUF\""));
//! ```

pub mod config;
pub mod derive;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod schema;
pub mod table;

pub use config::{ConfigError, GeneratorConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Status};
pub use error::{GenerateError, InputError, ParseError, SchemaError, SymbolError};
pub use layout::{LayoutConfig, LayoutError};
pub use parser::{parse, SourceFile};
pub use renderer::{KicadConfig, KicadLibrary, LibraryWriter, SexprWriter};

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use derive::{resolve_symbol, SymbolRegistry};
use layout::SymbolGeometry;
use table::{build_symbols, SymbolSpec};

/// Configuration for the complete generation pipeline
#[derive(Debug, Clone, Default)]
pub struct GenerateConfig {
    /// Layout configuration
    pub layout: LayoutConfig,
    /// KiCad output configuration
    pub kicad: KicadConfig,
}

impl GenerateConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    /// Set the KiCad output configuration
    pub fn with_kicad(mut self, config: KicadConfig) -> Self {
        self.kicad = config;
        self
    }
}

impl From<&GeneratorConfig> for GenerateConfig {
    fn from(file: &GeneratorConfig) -> Self {
        Self::new()
            .with_layout(file.layout_config())
            .with_kicad(file.kicad_config())
    }
}

/// Result of a run: the symbols that came through and every error found
#[derive(Debug, Default)]
pub struct Generation {
    pub library: KicadLibrary,
    pub diagnostics: Diagnostics,
}

impl Generation {
    pub fn status(&self) -> Status {
        self.diagnostics.status()
    }

    /// The library as `.kicad_sym` text
    pub fn render(&self) -> String {
        SexprWriter::new().render(&self.library)
    }
}

/// Read the input files; unreadable files become diagnostics
pub fn read_sources(paths: &[PathBuf], diagnostics: &mut Diagnostics) -> Vec<SourceFile> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(path) {
            Ok(text) => sources.push(SourceFile::new(path.display().to_string(), text)),
            Err(source) => diagnostics.push(
                Diagnostic::new(InputError::Io {
                    path: path.clone(),
                    source,
                })
                .in_file(path.display().to_string()),
            ),
        }
    }
    sources
}

/// Run the pipeline over already loaded sources
pub fn generate(sources: &[SourceFile], config: &GenerateConfig) -> Generation {
    generate_with(sources, config, Diagnostics::new())
}

/// Run the pipeline, appending to diagnostics found earlier
pub fn generate_with(
    sources: &[SourceFile],
    config: &GenerateConfig,
    mut diagnostics: Diagnostics,
) -> Generation {
    // Phase 1: read, classify and build every file
    let mut specs: Vec<SymbolSpec> = Vec::new();
    let mut registry = SymbolRegistry::new();
    for (index, source) in sources.iter().enumerate() {
        let records = match parser::parse(&source.text) {
            Ok(records) => records,
            Err(errors) => {
                for e in errors {
                    let span = e.span().clone();
                    diagnostics.push(Diagnostic::new(InputError::Syntax(e)).at(source, span));
                }
                continue;
            }
        };
        let table = match schema::classify(source, records) {
            Ok(table) => table,
            Err(e) => {
                diagnostics.push(Diagnostic::new(e.node).at(source, e.span));
                continue;
            }
        };

        for block in build_symbols(&table, index) {
            let declared = if block.name.is_empty() {
                Ok(())
            } else {
                registry.declare(&block.name)
            };
            match (declared, block.result) {
                (Err(e), result) => {
                    let span = match &result {
                        Ok(spec) => spec.span.clone(),
                        Err(failure) => failure.span.clone(),
                    };
                    diagnostics.push(
                        Diagnostic::new(e)
                            .at(source, span)
                            .for_symbol(&block.name),
                    );
                }
                (Ok(()), Ok(spec)) => specs.push(spec),
                (Ok(()), Err(e)) => {
                    registry.mark_failed(&block.name);
                    let mut diagnostic = Diagnostic::new(e.node).at(source, e.span);
                    if !block.name.is_empty() {
                        diagnostic = diagnostic.for_symbol(&block.name);
                    }
                    diagnostics.push(diagnostic);
                }
            }
        }
        info!("read '{}'", source.name);
    }

    // Phase 2: resolve derivations in declaration order
    for spec in &specs {
        match resolve_symbol(spec, &registry) {
            Ok(resolved) => registry.insert(resolved),
            Err(e) => {
                registry.mark_failed(&spec.name);
                diagnostics.push(
                    Diagnostic::new(e.node)
                        .at(&sources[spec.file], e.span)
                        .for_symbol(&spec.name),
                );
            }
        }
    }

    // Phase 3: lay out drawn symbols, then build the KiCad records
    let mut geometries: HashMap<String, SymbolGeometry> = HashMap::new();
    for symbol in registry.symbols().filter(|s| !s.is_alias()) {
        match layout::compute(&symbol.pins, &symbol.attributes, &config.layout) {
            Ok(geometry) => {
                geometries.insert(symbol.name.clone(), geometry);
            }
            Err(e) => diagnostics.push(
                Diagnostic::new(e)
                    .at(&sources[symbol.file], symbol.span.clone())
                    .for_symbol(&symbol.name),
            ),
        }
    }

    let mut library = KicadLibrary::new();
    for symbol in registry.symbols() {
        match geometries.get(symbol.root()) {
            Some(geometry) => {
                library.push(renderer::build_symbol(symbol, geometry, &config.kicad));
            }
            None if symbol.is_alias() => diagnostics.push(
                Diagnostic::new(SymbolError::BaseUnresolved {
                    base: symbol.root().to_string(),
                    symbol: symbol.name.clone(),
                })
                .at(&sources[symbol.file], symbol.span.clone())
                .for_symbol(&symbol.name),
            ),
            None => {}
        }
    }

    debug!(
        "{} symbols built, {} diagnostics",
        library.len(),
        diagnostics.len()
    );
    Generation {
        library,
        diagnostics,
    }
}

/// File name of a library: `name` with the `.kicad_sym` extension
pub fn library_path(name: &str) -> PathBuf {
    if name.ends_with(".kicad_sym") {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{}.kicad_sym", name))
    }
}

/// Write `library` to `path` atomically: the text goes to a temporary file
/// next to the target which is then renamed over it
pub fn write_library_file(
    path: &Path,
    library: &KicadLibrary,
    writer: &dyn LibraryWriter,
) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    writer.write_library(library, &mut temp)?;
    temp.persist(path).map_err(|e| e.error)?;
    info!("wrote {} symbols to '{}'", library.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADERS: &str = "symbol name,derive from,kicad extends,footprint,datasheet,description,keywords\n\
                           ,pin category,pin number,pin name,pin gr type,pin el type\n";

    fn run(body: &str) -> Generation {
        let text = format!("{HEADERS}{body}");
        generate(&[SourceFile::new("t.csv", text)], &GenerateConfig::default())
    }

    fn names(generation: &Generation) -> Vec<&str> {
        generation
            .library
            .symbols
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    #[test]
    fn test_generate_simple_symbol() {
        let generation = run("BUF,,,,,,\n,left,1,A,line,input\n,right,2,Y,line,output\n");
        assert_eq!(generation.status(), Status::Success);
        assert_eq!(names(&generation), vec!["BUF"]);
        assert_eq!(generation.library.symbols[0].pins.len(), 2);
    }

    #[test]
    fn test_generate_headers_only() {
        let generation = run("");
        assert_eq!(generation.status(), Status::Success);
        assert!(generation.library.is_empty());
    }

    #[test]
    fn test_generate_collects_all_errors() {
        let generation = run(
            "A,,,,,,\n,left,1,X,line,input\n\
             B,A,,,,,\n,delete,99,,,\n\
             C,NOPE,,,,,\n",
        );
        assert_eq!(generation.status(), Status::ValidationFailed);
        assert_eq!(generation.diagnostics.len(), 2);
        assert_eq!(names(&generation), vec!["A"]);
    }

    #[test]
    fn test_generate_duplicate_symbol() {
        let generation = run("A,,,,,,\n,left,1,X,line,input\nA,,,,,,\n");
        let first = generation.diagnostics.iter().next().unwrap();
        assert!(matches!(
            first.error,
            GenerateError::Symbol(SymbolError::DuplicateSymbol { .. })
        ));
        assert_eq!(first.line, Some(5));
    }

    #[test]
    fn test_generate_derived_from_failed_base() {
        let generation = run("A,,,,,,\n,left,1,X,line,bogus\nB,A,,,,,\n");
        let kinds: Vec<String> = generation
            .diagnostics
            .iter()
            .map(|d| d.error.to_string())
            .collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds[1].contains("failed and cannot be used"));
    }

    #[test]
    fn test_generate_alias_uses_root_geometry() {
        let generation = run("A,,,,,,\n,left,1,X,line,input\nA2,,A,,,,\n");
        assert_eq!(generation.status(), Status::Success);
        let alias = generation.library.get("A2").unwrap();
        assert_eq!(alias.extends.as_deref(), Some("A"));
    }

    #[test]
    fn test_library_path() {
        assert_eq!(library_path("a"), PathBuf::from("a.kicad_sym"));
        assert_eq!(library_path("x.kicad_sym"), PathBuf::from("x.kicad_sym"));
    }

    #[test]
    fn test_read_missing_source() {
        let mut diagnostics = Diagnostics::new();
        let sources = read_sources(&[PathBuf::from("/nonexistent/in.csv")], &mut diagnostics);
        assert!(sources.is_empty());
        assert_eq!(diagnostics.status(), Status::InputError);
    }
}
