//! In-memory model of a KiCad symbol library
//!
//! Lengths are in millimetres, angles in degrees. The model carries no
//! formatting; a [`LibraryWriter`](super::LibraryWriter) turns it into text.

use crate::table::{ElectricalType, PinShape};

/// Horizontal text justification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Center,
    Left,
    Right,
}

impl Justify {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Justify::Center => None,
            Justify::Left => Some("left"),
            Justify::Right => Some("right"),
        }
    }
}

/// Text effects of properties and text items
#[derive(Debug, Clone, PartialEq)]
pub struct TextEffects {
    pub font_size: f64,
    pub justify: Justify,
    pub hidden: bool,
}

impl Default for TextEffects {
    fn default() -> Self {
        Self {
            font_size: 1.27,
            justify: Justify::Center,
            hidden: false,
        }
    }
}

/// A symbol property (`Reference`, `Value`, `ki_keywords`, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: String,
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub effects: TextEffects,
}

impl Property {
    /// A hidden property at the origin
    pub fn hidden(key: impl Into<String>, value: impl Into<String>, id: usize) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            id,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            effects: TextEffects {
                hidden: true,
                ..TextEffects::default()
            },
        }
    }
}

/// The body outline
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRect {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub stroke_width: f64,
}

/// A free text item inside the body
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// An alternate function of a pin
#[derive(Debug, Clone, PartialEq)]
pub struct KicadAlternate {
    pub name: String,
    pub electrical: ElectricalType,
    pub shape: PinShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KicadPin {
    pub number: String,
    pub name: String,
    pub electrical: ElectricalType,
    pub shape: PinShape,
    /// Connection point
    pub x: f64,
    pub y: f64,
    pub rotation: u16,
    pub length: f64,
    pub hidden: bool,
    pub name_font_size: f64,
    pub number_font_size: f64,
    pub alternates: Vec<KicadAlternate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KicadSymbol {
    pub name: String,
    /// Root symbol for aliases; aliases have no graphics or pins
    pub extends: Option<String>,
    pub properties: Vec<Property>,
    pub in_bom: bool,
    pub on_board: bool,
    pub hide_pin_numbers: bool,
    pub pin_names_offset: f64,
    pub hide_pin_names: bool,
    pub rectangles: Vec<BodyRect>,
    pub texts: Vec<TextItem>,
    pub pins: Vec<KicadPin>,
}

impl KicadSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            properties: Vec::new(),
            in_bom: true,
            on_board: true,
            hide_pin_numbers: false,
            pin_names_offset: 0.508,
            hide_pin_names: false,
            rectangles: Vec::new(),
            texts: Vec::new(),
            pins: Vec::new(),
        }
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    pub fn property_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.key == key)
    }

    pub fn pin(&self, number: &str) -> Option<&KicadPin> {
        self.pins.iter().find(|p| p.number == number)
    }
}

/// A whole `.kicad_sym` library in output order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KicadLibrary {
    pub symbols: Vec<KicadSymbol>,
}

impl KicadLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, symbol: KicadSymbol) {
        self.symbols.push(symbol);
    }

    pub fn get(&self, name: &str) -> Option<&KicadSymbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
