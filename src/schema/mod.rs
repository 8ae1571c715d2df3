//! Header schema and row classification
//!
//! The first non-blank record of a table is the symbol header, the second the
//! pin header. Labels are case-insensitive; empty header cells mark unused
//! columns.

pub mod classify;
pub mod columns;
pub mod header;

pub use classify::{classify, ClassifiedTable, Row, RowKind};
pub use columns::{Column, Need, PinColumn, SymbolColumn, ValueKind};
pub use header::Header;
