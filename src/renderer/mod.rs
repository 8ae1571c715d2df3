//! KiCad output for laid out symbols
//!
//! This module turns resolved symbols and their geometry into the KiCad
//! record model and writes that model as a `.kicad_sym` library.

pub mod config;
pub mod model;
pub mod sexpr;
pub mod symbol;

pub use config::{mil_to_mm, KicadConfig};
pub use model::{
    BodyRect, Justify, KicadAlternate, KicadLibrary, KicadPin, KicadSymbol, Property, TextEffects,
    TextItem,
};
pub use sexpr::{LibraryWriter, SexprWriter};
pub use symbol::build_symbol;
