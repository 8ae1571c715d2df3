//! Collection and rendering of generator errors
//!
//! Every error is recorded with its location and the run carries on with the
//! next file or symbol, so one pass reports as many problems as possible.

use std::fmt;

use crate::error::{format_report, ErrorClass, GenerateError, Span};
use crate::parser::ast::SourceFile;

/// An error with the place it was found
#[derive(Debug)]
pub struct Diagnostic {
    pub error: GenerateError,
    /// Name of the input file
    pub file: Option<String>,
    /// 1-based line number
    pub line: Option<usize>,
    pub span: Span,
    /// Symbol whose block the error belongs to
    pub symbol: Option<String>,
}

impl Diagnostic {
    pub fn new(error: impl Into<GenerateError>) -> Self {
        Self {
            error: error.into(),
            file: None,
            line: None,
            span: 0..0,
            symbol: None,
        }
    }

    /// Locate the diagnostic at `span` of `source`
    pub fn at(mut self, source: &SourceFile, span: Span) -> Self {
        self.file = Some(source.name.clone());
        self.line = Some(source.line_of(span.start));
        self.span = span;
        self
    }

    pub fn in_file(mut self, name: impl Into<String>) -> Self {
        self.file = Some(name.into());
        self
    }

    pub fn for_symbol(mut self, name: impl Into<String>) -> Self {
        self.symbol = Some(name.into());
        self
    }

    pub fn class(&self) -> ErrorClass {
        self.error.class()
    }

    /// Report with source context; falls back to the one-line form when the
    /// source text is not available
    pub fn format(&self, sources: &[SourceFile]) -> String {
        let source = self
            .file
            .as_deref()
            .and_then(|name| sources.iter().find(|s| s.name == name));
        match (source, self.line) {
            (Some(source), Some(_)) => {
                let mut message = self.error.to_string();
                if let Some(symbol) = &self.symbol {
                    message = format!("{} (symbol '{}')", message, symbol);
                }
                format_report(
                    self.error.kind_name(),
                    &message,
                    &source.name,
                    &source.text,
                    self.span.clone(),
                )
            }
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{}: ", file, line)?,
            (Some(file), None) => write!(f, "{}: ", file)?,
            _ => {}
        }
        write!(f, "{}: {}", self.error.kind_name(), self.error)?;
        if let Some(symbol) = &self.symbol {
            write!(f, " (symbol '{}')", symbol)?;
        }
        Ok(())
    }
}

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    InputError,
    ValidationFailed,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::InputError => 1,
            Status::ValidationFailed => 3,
        }
    }
}

/// All diagnostics of a run, in the order they were found
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("diagnostic: {}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Input errors take precedence over validation errors
    pub fn status(&self) -> Status {
        if self.items.is_empty() {
            Status::Success
        } else if self.items.iter().any(|d| d.class() == ErrorClass::Input) {
            Status::InputError
        } else {
            Status::ValidationFailed
        }
    }

    /// One line per diagnostic
    pub fn render_plain(&self) -> String {
        self.items
            .iter()
            .map(|d| format!("{}\n", d))
            .collect()
    }

    /// Full reports with source context
    pub fn render_verbose(&self, sources: &[SourceFile]) -> String {
        self.items.iter().map(|d| d.format(sources)).collect()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
