//! Header row validation

use std::collections::{HashMap, HashSet};

use super::columns::Column;
use crate::error::{HeaderKind, SchemaError, SymbolError};
use crate::parser::ast::{Record, Span};

/// A validated header row mapping columns to field positions
#[derive(Debug, Clone)]
pub struct Header<C: Column> {
    /// One entry per header cell; `None` marks an unused column
    cells: Vec<Option<C>>,
    positions: HashMap<C, usize>,
    pub span: Span,
}

impl<C: Column> Header<C> {
    /// Validate a header record
    ///
    /// Checks run in a fixed order: the first cell, duplicate labels,
    /// missing required columns, then unknown labels.
    pub fn parse(record: &Record) -> Result<Self, SchemaError> {
        let labels: Vec<String> = record.fields.iter().map(|f| f.to_lowercase()).collect();
        let first = labels.first().map(String::as_str).unwrap_or("");

        match C::HEADER {
            HeaderKind::Symbol if first.is_empty() => {
                return Err(SchemaError::SymbolHeaderFirstColumn);
            }
            HeaderKind::Pin if !first.is_empty() => {
                return Err(SchemaError::PinHeaderFirstColumn {
                    found: record.field(0).to_string(),
                });
            }
            _ => {}
        }

        let mut seen = HashSet::new();
        for label in labels.iter().filter(|l| !l.is_empty()) {
            if !seen.insert(label.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    header: C::HEADER,
                    label: label.clone(),
                });
            }
        }

        let missing: Vec<String> = C::ALL
            .iter()
            .filter(|c| c.is_required() && !seen.contains(c.label()))
            .map(|c| c.label().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns {
                header: C::HEADER,
                labels: missing,
            });
        }

        let unknown: Vec<String> = labels
            .iter()
            .filter(|l| !l.is_empty() && C::from_label(l).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(SchemaError::UnknownColumns {
                header: C::HEADER,
                labels: unknown,
            });
        }

        let cells: Vec<Option<C>> = labels.iter().map(|l| C::from_label(l)).collect();
        let positions = cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|c| (c, i)))
            .collect();

        Ok(Self {
            cells,
            positions,
            span: record.span.clone(),
        })
    }

    /// Number of header cells, used and unused
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    pub fn has(&self, column: C) -> bool {
        self.positions.contains_key(&column)
    }

    pub fn position(&self, column: C) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    /// The value of `column` in a data row, empty when the column is absent
    pub fn value<'r>(&self, fields: &'r [String], column: C) -> &'r str {
        self.position(column)
            .and_then(|i| fields.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Reject values in unused columns or past the end of the header
    pub fn check_row(&self, fields: &[String]) -> Result<(), SymbolError> {
        for (i, value) in fields.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            match self.cells.get(i) {
                None => {
                    return Err(SymbolError::TooManyFields {
                        count: fields.len(),
                        columns: self.width(),
                    })
                }
                Some(None) => {
                    return Err(SymbolError::SurplusField {
                        value: value.clone(),
                        column: i,
                    })
                }
                Some(Some(_)) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::columns::{PinColumn, SymbolColumn};

    fn record(fields: &[&str]) -> Record {
        Record::new(fields.iter().map(|f| f.to_string()).collect(), 0..10)
    }

    const SYMBOL_HEADER: &[&str] = &[
        "Symbol Name",
        "footprint",
        "",
        "datasheet",
        "description",
        "keywords",
    ];

    #[test]
    fn test_symbol_header() {
        let header: Header<SymbolColumn> = Header::parse(&record(SYMBOL_HEADER)).unwrap();
        assert_eq!(header.width(), 6);
        assert_eq!(header.position(SymbolColumn::Datasheet), Some(3));
        assert!(!header.has(SymbolColumn::Text));
    }

    #[test]
    fn test_symbol_header_needs_first_column() {
        let err = Header::<SymbolColumn>::parse(&record(&["", "symbol name"])).unwrap_err();
        assert_eq!(err, SchemaError::SymbolHeaderFirstColumn);
    }

    #[test]
    fn test_pin_header_first_column_must_be_empty() {
        let err = Header::<PinColumn>::parse(&record(&["x", "pin number"])).unwrap_err();
        assert!(matches!(err, SchemaError::PinHeaderFirstColumn { .. }));
    }

    #[test]
    fn test_duplicate_label_ignores_case() {
        let mut fields = SYMBOL_HEADER.to_vec();
        fields.push("KEYWORDS");
        let err = Header::<SymbolColumn>::parse(&record(&fields)).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumn {
                header: HeaderKind::Symbol,
                label: "keywords".to_string()
            }
        );
    }

    #[test]
    fn test_missing_columns() {
        let err =
            Header::<PinColumn>::parse(&record(&["", "pin category", "pin number", "pin name"]))
                .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                header: HeaderKind::Pin,
                labels: vec!["pin gr type".to_string(), "pin el type".to_string()]
            }
        );
    }

    #[test]
    fn test_unknown_columns() {
        let mut fields = SYMBOL_HEADER.to_vec();
        fields.push("colour");
        let err = Header::<SymbolColumn>::parse(&record(&fields)).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownColumns { labels, .. } if labels == vec!["colour"]));
    }

    #[test]
    fn test_check_row() {
        let header: Header<SymbolColumn> = Header::parse(&record(SYMBOL_HEADER)).unwrap();
        let row = |f: &[&str]| f.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert!(header.check_row(&row(&["U1", "fp", "", "ds"])).is_ok());
        assert!(header.check_row(&row(&["U1", "", "", "", "", "", ""])).is_ok());
        assert!(matches!(
            header.check_row(&row(&["U1", "", "oops"])),
            Err(SymbolError::SurplusField { column: 2, .. })
        ));
        assert!(matches!(
            header.check_row(&row(&["U1", "", "", "", "", "", "x"])),
            Err(SymbolError::TooManyFields { count: 7, columns: 6 })
        ));
    }
}
