//! Column catalogue for the symbol and pin header rows

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::HeaderKind;

/// How strongly a column is required
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Need {
    /// The column may be absent; empty values fall back to defaults
    Optional,
    /// The column must be present; the value may be empty
    Mandatory,
    /// The column must be present and every row needs a value
    ValueRequired,
}

/// How a cell is converted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Bool,
    Int,
    Float,
}

/// A column that can appear in one of the two header rows
pub trait Column: Copy + Eq + Hash + Debug + 'static {
    /// Every column of this header, in processing order
    const ALL: &'static [Self];
    const HEADER: HeaderKind;

    /// Lower-case header label
    fn label(self) -> &'static str;

    fn need(self) -> Need;

    fn kind(self) -> ValueKind {
        ValueKind::Text
    }

    fn is_required(self) -> bool {
        matches!(self.need(), Need::Mandatory | Need::ValueRequired)
    }

    /// Look a column up by its label, ignoring case and surrounding whitespace
    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolColumn {
    Name,
    DeriveFrom,
    KicadExtends,
    Footprint,
    Datasheet,
    Description,
    Keywords,
    FpFilters,
    Reference,
    Text,
    InBom,
    OnBoard,
    HidePinNumbers,
    PinNameOffset,
    HidePinNames,
    MinWidth,
    MinHeight,
    WPadding,
    HPadding,
    TextFontSize,
    TextGap,
    HRefValueGap,
    WRefValueGap,
}

impl SymbolColumn {
    /// Columns an `extends` alias may set besides its name and base
    pub fn allowed_on_alias(self) -> bool {
        matches!(
            self,
            SymbolColumn::Reference
                | SymbolColumn::Footprint
                | SymbolColumn::Datasheet
                | SymbolColumn::Description
                | SymbolColumn::Keywords
                | SymbolColumn::FpFilters
        )
    }
}

impl Column for SymbolColumn {
    const ALL: &'static [Self] = &[
        SymbolColumn::Name,
        SymbolColumn::DeriveFrom,
        SymbolColumn::KicadExtends,
        SymbolColumn::Footprint,
        SymbolColumn::Datasheet,
        SymbolColumn::Description,
        SymbolColumn::Keywords,
        SymbolColumn::FpFilters,
        SymbolColumn::Reference,
        SymbolColumn::Text,
        SymbolColumn::InBom,
        SymbolColumn::OnBoard,
        SymbolColumn::HidePinNumbers,
        SymbolColumn::PinNameOffset,
        SymbolColumn::HidePinNames,
        SymbolColumn::MinWidth,
        SymbolColumn::MinHeight,
        SymbolColumn::WPadding,
        SymbolColumn::HPadding,
        SymbolColumn::TextFontSize,
        SymbolColumn::TextGap,
        SymbolColumn::HRefValueGap,
        SymbolColumn::WRefValueGap,
    ];
    const HEADER: HeaderKind = HeaderKind::Symbol;

    fn label(self) -> &'static str {
        match self {
            SymbolColumn::Name => "symbol name",
            SymbolColumn::DeriveFrom => "derive from",
            SymbolColumn::KicadExtends => "kicad extends",
            SymbolColumn::Footprint => "footprint",
            SymbolColumn::Datasheet => "datasheet",
            SymbolColumn::Description => "description",
            SymbolColumn::Keywords => "keywords",
            SymbolColumn::FpFilters => "fp filters",
            SymbolColumn::Reference => "reference",
            SymbolColumn::Text => "text",
            SymbolColumn::InBom => "in bom",
            SymbolColumn::OnBoard => "on board",
            SymbolColumn::HidePinNumbers => "hide pin numbers",
            SymbolColumn::PinNameOffset => "pin name offset",
            SymbolColumn::HidePinNames => "hide pin names",
            SymbolColumn::MinWidth => "min width",
            SymbolColumn::MinHeight => "min height",
            SymbolColumn::WPadding => "w padding",
            SymbolColumn::HPadding => "h padding",
            SymbolColumn::TextFontSize => "text font size",
            SymbolColumn::TextGap => "text gap",
            SymbolColumn::HRefValueGap => "h r/v gap",
            SymbolColumn::WRefValueGap => "w r/v gap",
        }
    }

    fn need(self) -> Need {
        match self {
            SymbolColumn::Name => Need::ValueRequired,
            SymbolColumn::Footprint
            | SymbolColumn::Datasheet
            | SymbolColumn::Description
            | SymbolColumn::Keywords => Need::Mandatory,
            _ => Need::Optional,
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            SymbolColumn::InBom
            | SymbolColumn::OnBoard
            | SymbolColumn::HidePinNumbers
            | SymbolColumn::HidePinNames => ValueKind::Bool,
            SymbolColumn::PinNameOffset
            | SymbolColumn::MinWidth
            | SymbolColumn::MinHeight
            | SymbolColumn::TextFontSize => ValueKind::Int,
            SymbolColumn::WPadding
            | SymbolColumn::HPadding
            | SymbolColumn::TextGap
            | SymbolColumn::HRefValueGap
            | SymbolColumn::WRefValueGap => ValueKind::Float,
            _ => ValueKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PinColumn {
    Category,
    Number,
    Name,
    GrType,
    ElType,
    Stacked,
    Hidden,
    Length,
    NameFontSize,
    NumberFontSize,
}

impl PinColumn {
    /// Sticky columns copy an empty value from the previous pin row
    pub fn is_sticky(self) -> bool {
        matches!(
            self,
            PinColumn::Category
                | PinColumn::GrType
                | PinColumn::ElType
                | PinColumn::Length
                | PinColumn::NameFontSize
                | PinColumn::NumberFontSize
        )
    }
}

impl Column for PinColumn {
    const ALL: &'static [Self] = &[
        PinColumn::Category,
        PinColumn::Number,
        PinColumn::Name,
        PinColumn::GrType,
        PinColumn::ElType,
        PinColumn::Stacked,
        PinColumn::Hidden,
        PinColumn::Length,
        PinColumn::NameFontSize,
        PinColumn::NumberFontSize,
    ];
    const HEADER: HeaderKind = HeaderKind::Pin;

    fn label(self) -> &'static str {
        match self {
            PinColumn::Category => "pin category",
            PinColumn::Number => "pin number",
            PinColumn::Name => "pin name",
            PinColumn::GrType => "pin gr type",
            PinColumn::ElType => "pin el type",
            PinColumn::Stacked => "pin stacked",
            PinColumn::Hidden => "pin hidden",
            PinColumn::Length => "pin length",
            PinColumn::NameFontSize => "name font size",
            PinColumn::NumberFontSize => "number font size",
        }
    }

    fn need(self) -> Need {
        match self {
            PinColumn::Category | PinColumn::Number | PinColumn::ElType => Need::ValueRequired,
            PinColumn::Name | PinColumn::GrType => Need::Mandatory,
            _ => Need::Optional,
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            PinColumn::Length | PinColumn::NameFontSize | PinColumn::NumberFontSize => {
                ValueKind::Float
            }
            _ => ValueKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_ignores_case() {
        assert_eq!(
            SymbolColumn::from_label("  Symbol Name "),
            Some(SymbolColumn::Name)
        );
        assert_eq!(PinColumn::from_label("PIN EL TYPE"), Some(PinColumn::ElType));
        assert_eq!(PinColumn::from_label("pin colour"), None);
    }

    #[test]
    fn test_required_columns() {
        let required: Vec<&str> = SymbolColumn::ALL
            .iter()
            .filter(|c| c.is_required())
            .map(|c| c.label())
            .collect();
        assert_eq!(
            required,
            vec!["symbol name", "footprint", "datasheet", "description", "keywords"]
        );

        let required: Vec<&str> = PinColumn::ALL
            .iter()
            .filter(|c| c.is_required())
            .map(|c| c.label())
            .collect();
        assert_eq!(
            required,
            vec![
                "pin category",
                "pin number",
                "pin name",
                "pin gr type",
                "pin el type"
            ]
        );
    }

    #[test]
    fn test_alias_columns() {
        assert!(SymbolColumn::Footprint.allowed_on_alias());
        assert!(!SymbolColumn::Text.allowed_on_alias());
        assert!(!SymbolColumn::MinWidth.allowed_on_alias());
    }
}
