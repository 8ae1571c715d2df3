//! Pin declarations and pin-list edits

use std::fmt;

use crate::parser::ast::Span;

/// Side of the body a pin is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }

    /// KiCad pin rotation in degrees; the pin points from its connection
    /// point towards the body
    pub fn rotation(self) -> u16 {
        match self {
            Side::Left => 0,
            Side::Right => 180,
            Side::Top => 270,
            Side::Bottom => 90,
        }
    }

    pub fn is_vertical_edge(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectricalType {
    Input,
    Output,
    Bidirectional,
    TriState,
    OpenCollector,
    OpenEmitter,
    Passive,
    Free,
    Unspecified,
    NoConnect,
    PowerIn,
    PowerOut,
}

impl ElectricalType {
    pub const ALL: [ElectricalType; 12] = [
        ElectricalType::Input,
        ElectricalType::Output,
        ElectricalType::Bidirectional,
        ElectricalType::TriState,
        ElectricalType::OpenCollector,
        ElectricalType::OpenEmitter,
        ElectricalType::Passive,
        ElectricalType::Free,
        ElectricalType::Unspecified,
        ElectricalType::NoConnect,
        ElectricalType::PowerIn,
        ElectricalType::PowerOut,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ElectricalType::Input => "input",
            ElectricalType::Output => "output",
            ElectricalType::Bidirectional => "bidirectional",
            ElectricalType::TriState => "tri_state",
            ElectricalType::OpenCollector => "open_collector",
            ElectricalType::OpenEmitter => "open_emitter",
            ElectricalType::Passive => "passive",
            ElectricalType::Free => "free",
            ElectricalType::Unspecified => "unspecified",
            ElectricalType::NoConnect => "no_connect",
            ElectricalType::PowerIn => "power_in",
            ElectricalType::PowerOut => "power_out",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(label))
    }

    /// Side used when a pin row names no category and none can be inherited
    pub fn default_side(self) -> Side {
        match self {
            ElectricalType::Output
            | ElectricalType::TriState
            | ElectricalType::OpenCollector
            | ElectricalType::OpenEmitter
            | ElectricalType::PowerOut => Side::Right,
            ElectricalType::PowerIn => Side::Top,
            _ => Side::Left,
        }
    }
}

/// Graphical pin style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinShape {
    Line,
    Inverted,
    Clock,
    InvertedClock,
    InputLow,
    ClockLow,
    OutputLow,
    EdgeClockHigh,
    NonLogic,
}

impl PinShape {
    pub const ALL: [PinShape; 9] = [
        PinShape::Line,
        PinShape::Inverted,
        PinShape::Clock,
        PinShape::InvertedClock,
        PinShape::InputLow,
        PinShape::ClockLow,
        PinShape::OutputLow,
        PinShape::EdgeClockHigh,
        PinShape::NonLogic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PinShape::Line => "line",
            PinShape::Inverted => "inverted",
            PinShape::Clock => "clock",
            PinShape::InvertedClock => "inverted_clock",
            PinShape::InputLow => "input_low",
            PinShape::ClockLow => "clock_low",
            PinShape::OutputLow => "output_low",
            PinShape::EdgeClockHigh => "edge_clock_high",
            PinShape::NonLogic => "non_logic",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Hidden but still occupies a grid position
    Hidden,
    /// Hidden and shares the position of a neighbouring pin
    HiddenUnreserved,
}

impl Visibility {
    pub fn is_hidden(self) -> bool {
        !matches!(self, Visibility::Visible)
    }
}

/// An alternate function of a physical pin
#[derive(Debug, Clone, PartialEq)]
pub struct AltFunction {
    pub name: String,
    pub electrical: ElectricalType,
    pub shape: PinShape,
}

/// Membership of a pin in a bus row
#[derive(Debug, Clone, PartialEq)]
pub struct BusBit {
    /// The pin number list the bus was declared with
    pub bus: String,
    /// Serial number substituted into the name template
    pub index: i64,
    /// The serial counts down
    pub reversed: bool,
}

/// One physical pin
#[derive(Debug, Clone, PartialEq)]
pub struct PinSpec {
    pub number: String,
    pub name: String,
    pub electrical: ElectricalType,
    pub shape: PinShape,
    pub side: Side,
    pub visibility: Visibility,
    /// Pins with the same tag on the same side share one position
    pub stack: Option<String>,
    /// Length in grid units
    pub length: f64,
    /// Font sizes in mil
    pub name_font_size: f64,
    pub number_font_size: f64,
    pub alternates: Vec<AltFunction>,
    pub bus: Option<BusBit>,
    pub span: Span,
}

/// An entry of a pin list
#[derive(Debug, Clone, PartialEq)]
pub enum PinSlot {
    Pin(PinSpec),
    /// Reserved empty positions
    Gap { side: Side, count: usize, span: Span },
}

impl PinSlot {
    pub fn side(&self) -> Side {
        match self {
            PinSlot::Pin(pin) => pin.side,
            PinSlot::Gap { side, .. } => *side,
        }
    }

    pub fn as_pin(&self) -> Option<&PinSpec> {
        match self {
            PinSlot::Pin(pin) => Some(pin),
            PinSlot::Gap { .. } => None,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            PinSlot::Pin(pin) => &pin.span,
            PinSlot::Gap { span, .. } => span,
        }
    }
}

/// Reference to a pin of a base symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinRef {
    Number(String),
    Name(String),
}

impl PinRef {
    pub fn matches(&self, pin: &PinSpec) -> bool {
        match self {
            PinRef::Number(n) => pin.number == *n,
            PinRef::Name(n) => pin.name == *n,
        }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinRef::Number(n) => write!(f, "number '{}'", n),
            PinRef::Name(n) => write!(f, "name '{}'", n),
        }
    }
}

/// An edit applied to an inherited pin list, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub enum PinEdit {
    Delete {
        target: PinRef,
        span: Span,
    },
    InsertBefore {
        target: PinRef,
        slots: Vec<PinSlot>,
        span: Span,
    },
    InsertAfter {
        target: PinRef,
        slots: Vec<PinSlot>,
        span: Span,
    },
    /// Replace the target in place
    Overload {
        target: PinRef,
        pin: PinSpec,
        span: Span,
    },
}

impl PinEdit {
    pub fn target(&self) -> &PinRef {
        match self {
            PinEdit::Delete { target, .. }
            | PinEdit::InsertBefore { target, .. }
            | PinEdit::InsertAfter { target, .. }
            | PinEdit::Overload { target, .. } => target,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            PinEdit::Delete { span, .. }
            | PinEdit::InsertBefore { span, .. }
            | PinEdit::InsertAfter { span, .. }
            | PinEdit::Overload { span, .. } => span,
        }
    }

    /// Verb used in diagnostics
    pub fn verb(&self) -> &'static str {
        match self {
            PinEdit::Delete { .. } => "delete",
            PinEdit::InsertBefore { .. } => "before",
            PinEdit::InsertAfter { .. } => "after",
            PinEdit::Overload { .. } => "overload",
        }
    }
}
