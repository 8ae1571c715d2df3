//! Symbol table model and the builder that fills it from classified rows

mod builder;
pub mod pin;
pub mod symbol;

pub use builder::{build_symbols, Block};
pub use pin::{
    AltFunction, BusBit, ElectricalType, PinEdit, PinRef, PinShape, PinSlot, PinSpec, Side,
    Visibility,
};
pub use symbol::{AttrValue, AttributeSet, Lineage, SymbolAttributes, SymbolSpec};
