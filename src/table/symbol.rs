//! Symbol declarations and attribute sets

use std::collections::BTreeMap;

use super::pin::{PinEdit, PinSlot};
use crate::parser::ast::Span;
use crate::schema::SymbolColumn;

/// A converted cell value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// Attributes explicitly given on a symbol row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    values: BTreeMap<SymbolColumn, AttrValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: SymbolColumn, value: AttrValue) {
        self.values.insert(column, value);
    }

    pub fn get(&self, column: SymbolColumn) -> Option<&AttrValue> {
        self.values.get(&column)
    }

    pub fn contains(&self, column: SymbolColumn) -> bool {
        self.values.contains_key(&column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// These attributes with every unset column taken from `base`
    pub fn inherit_from(&self, base: &AttributeSet) -> AttributeSet {
        let mut values = base.values.clone();
        values.extend(self.values.iter().map(|(k, v)| (*k, v.clone())));
        AttributeSet { values }
    }

    fn text(&self, column: SymbolColumn) -> Option<&str> {
        match self.get(column) {
            Some(AttrValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    fn boolean(&self, column: SymbolColumn, default: bool) -> bool {
        match self.get(column) {
            Some(AttrValue::Bool(b)) => *b,
            _ => default,
        }
    }

    fn int(&self, column: SymbolColumn, default: i64) -> i64 {
        match self.get(column) {
            Some(AttrValue::Int(i)) => *i,
            _ => default,
        }
    }

    fn float(&self, column: SymbolColumn) -> Option<f64> {
        match self.get(column) {
            Some(AttrValue::Float(f)) => Some(*f),
            Some(AttrValue::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }
}

/// Typed symbol attributes with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolAttributes {
    pub reference: String,
    pub footprint: String,
    pub datasheet: String,
    pub description: String,
    pub keywords: String,
    pub fp_filters: Option<String>,
    pub text: Option<String>,
    pub in_bom: bool,
    pub on_board: bool,
    pub hide_pin_numbers: bool,
    /// mil
    pub pin_name_offset: i64,
    pub hide_pin_names: bool,
    /// Minimum pin rectangle, grid units, always even
    pub min_width: i64,
    pub min_height: i64,
    pub w_padding: f64,
    pub h_padding: f64,
    /// mil
    pub text_font_size: i64,
    pub text_gap: Option<f64>,
    pub h_ref_value_gap: f64,
    pub w_ref_value_gap: f64,
}

impl Default for SymbolAttributes {
    fn default() -> Self {
        Self::from_set(&AttributeSet::default())
    }
}

impl SymbolAttributes {
    pub fn from_set(set: &AttributeSet) -> Self {
        let text = |c| set.text(c).unwrap_or("").to_string();
        let optional = |c| set.text(c).filter(|s| !s.is_empty()).map(str::to_string);

        Self {
            reference: set
                .text(SymbolColumn::Reference)
                .filter(|s| !s.is_empty())
                .unwrap_or("U")
                .to_string(),
            footprint: text(SymbolColumn::Footprint),
            datasheet: text(SymbolColumn::Datasheet),
            description: text(SymbolColumn::Description),
            keywords: text(SymbolColumn::Keywords),
            fp_filters: optional(SymbolColumn::FpFilters),
            text: optional(SymbolColumn::Text),
            in_bom: set.boolean(SymbolColumn::InBom, true),
            on_board: set.boolean(SymbolColumn::OnBoard, true),
            hide_pin_numbers: set.boolean(SymbolColumn::HidePinNumbers, false),
            pin_name_offset: set.int(SymbolColumn::PinNameOffset, 20),
            hide_pin_names: set.boolean(SymbolColumn::HidePinNames, false),
            min_width: set.int(SymbolColumn::MinWidth, 2),
            min_height: set.int(SymbolColumn::MinHeight, 2),
            w_padding: set.float(SymbolColumn::WPadding).unwrap_or(1.0),
            h_padding: set.float(SymbolColumn::HPadding).unwrap_or(1.0),
            text_font_size: set.int(SymbolColumn::TextFontSize, 50),
            text_gap: set.float(SymbolColumn::TextGap),
            h_ref_value_gap: set.float(SymbolColumn::HRefValueGap).unwrap_or(0.5),
            w_ref_value_gap: set.float(SymbolColumn::WRefValueGap).unwrap_or(0.75),
        }
    }
}

/// Where a symbol's pins come from
#[derive(Debug, Clone, PartialEq)]
pub enum Lineage {
    /// Declares its own pins
    Base { pins: Vec<PinSlot> },
    /// Copies the pins of `base` and edits them
    Derived { base: String, edits: Vec<PinEdit> },
    /// A KiCad `extends` alias of `base`
    Alias { base: String },
}

impl Lineage {
    pub fn base(&self) -> Option<&str> {
        match self {
            Lineage::Base { .. } => None,
            Lineage::Derived { base, .. } | Lineage::Alias { base } => Some(base),
        }
    }
}

/// A symbol as declared in a table
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSpec {
    pub name: String,
    pub attributes: AttributeSet,
    pub lineage: Lineage,
    /// Index of the input the symbol was read from
    pub file: usize,
    pub span: Span,
}
