//! Row classification for one input table

use log::trace;

use super::columns::{PinColumn, SymbolColumn};
use super::header::Header;
use crate::error::{GenerateError, InputError, SchemaError};
use crate::parser::ast::{Record, SourceFile, Span, Spanned};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Column 0 holds a value: starts a symbol block
    Symbol,
    /// Column 0 is empty: belongs to the current symbol block
    Pin,
}

/// A data row after the two header rows
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub fields: Vec<String>,
    pub line: usize,
    pub span: Span,
}

/// A table whose header rows passed validation
#[derive(Debug, Clone)]
pub struct ClassifiedTable {
    pub symbol_header: Header<SymbolColumn>,
    pub pin_header: Header<PinColumn>,
    pub rows: Vec<Row>,
}

/// Validate the header rows and classify every data row
///
/// Blank and comment records are dropped. Any failure here makes the whole
/// table unusable.
pub fn classify(
    source: &SourceFile,
    records: Vec<Record>,
) -> Result<ClassifiedTable, Spanned<GenerateError>> {
    let mut records = records
        .into_iter()
        .filter(|r| !r.is_blank() && !r.is_comment());

    let first = records
        .next()
        .ok_or_else(|| Spanned::new(InputError::Empty.into(), 0..0))?;
    let symbol_header = Header::parse(&first).map_err(|e| schema_error(e, &first.span))?;

    let second = records
        .next()
        .ok_or_else(|| schema_error(SchemaError::MissingPinHeader, &first.span))?;
    let pin_header = Header::parse(&second).map_err(|e| schema_error(e, &second.span))?;

    let mut rows = Vec::new();
    for record in records {
        let kind = if record.field(0).is_empty() {
            RowKind::Pin
        } else {
            RowKind::Symbol
        };
        if rows.is_empty() && kind == RowKind::Pin {
            return Err(schema_error(SchemaError::OrphanPinRow, &record.span));
        }
        let line = source.line_of(record.span.start);
        trace!("{}:{}: {:?} row {:?}", source.name, line, kind, record.fields);
        rows.push(Row {
            kind,
            fields: record.fields,
            line,
            span: record.span,
        });
    }

    Ok(ClassifiedTable {
        symbol_header,
        pin_header,
        rows,
    })
}

fn schema_error(error: SchemaError, span: &Span) -> Spanned<GenerateError> {
    Spanned::new(error.into(), span.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    const HEADERS: &str = "symbol name,footprint,datasheet,description,keywords\n\
                           ,pin category,pin number,pin name,pin gr type,pin el type\n";

    fn run(text: &str) -> Result<ClassifiedTable, Spanned<GenerateError>> {
        let source = SourceFile::new("t.csv", text);
        let records = parser::parse(text).expect("Should parse");
        classify(&source, records)
    }

    #[test]
    fn test_headers_only() {
        let table = run(HEADERS).expect("Should classify");
        assert!(table.rows.is_empty());
        assert_eq!(table.symbol_header.width(), 5);
    }

    #[test]
    fn test_row_kinds_and_lines() {
        let text = format!("{HEADERS}\n# comment\nU1,,,,\n,left,1,A,,input\n");
        let table = run(&text).expect("Should classify");
        let kinds: Vec<RowKind> = table.rows.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RowKind::Symbol, RowKind::Pin]);
        assert_eq!(table.rows[0].line, 5);
        assert_eq!(table.rows[1].line, 6);
    }

    #[test]
    fn test_empty_input() {
        let err = run("\n,,\n").unwrap_err();
        assert!(matches!(err.node, GenerateError::Input(InputError::Empty)));
    }

    #[test]
    fn test_missing_pin_header() {
        let err = run("symbol name,footprint,datasheet,description,keywords\n").unwrap_err();
        assert!(matches!(
            err.node,
            GenerateError::Schema(SchemaError::MissingPinHeader)
        ));
    }

    #[test]
    fn test_orphan_pin_row() {
        let text = format!("{HEADERS},left,1,A,,input\n");
        let err = run(&text).unwrap_err();
        assert!(matches!(
            err.node,
            GenerateError::Schema(SchemaError::OrphanPinRow)
        ));
    }
}
