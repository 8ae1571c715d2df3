//! Derivation of symbols from earlier symbols
//!
//! A `derive from` symbol starts from the final pin list of its base and
//! applies its edits in order. A `kicad extends` alias reuses the pins and
//! body of its base and only carries its own properties.
//!
//! # Example
//!
//! ```text
//! symbol name,derive from,...
//! OPAMP_B,OPAMP,...
//! ,delete,8,,,
//! ,left,8,IN2,,input
//! ```

mod registry;
mod resolver;

pub use registry::{ResolvedSymbol, SymbolRegistry};
pub use resolver::{apply_edits, resolve_symbol, Origin};
