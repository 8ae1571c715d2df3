//! Builds symbol declarations from classified rows
//!
//! Each symbol row opens a block that owns the pin rows following it. A
//! failure inside a block discards that block only.

use std::collections::HashSet;

use log::debug;

use super::pin::{
    AltFunction, BusBit, ElectricalType, PinEdit, PinRef, PinShape, PinSlot, PinSpec, Side,
    Visibility,
};
use super::symbol::{AttrValue, AttributeSet, Lineage, SymbolSpec};
use crate::error::SymbolError;
use crate::parser::ast::{Span, Spanned};
use crate::schema::{ClassifiedTable, Column, PinColumn, Row, RowKind, SymbolColumn, ValueKind};

const DEFAULT_PIN_LENGTH: f64 = 1.0;
const DEFAULT_PIN_FONT_SIZE: f64 = 50.0;

/// Outcome of one symbol block
#[derive(Debug)]
pub struct Block {
    /// The declared name, possibly empty when the row lacks one
    pub name: String,
    pub line: usize,
    pub result: Result<SymbolSpec, Spanned<SymbolError>>,
}

/// Build every symbol block of a table, in declaration order
pub fn build_symbols(table: &ClassifiedTable, file: usize) -> Vec<Block> {
    let builder = TableBuilder { table, file };
    let mut blocks = Vec::new();
    let mut rows = table.rows.iter().peekable();

    while let Some(head) = rows.next() {
        let mut pins = Vec::new();
        while let Some(row) = rows.next_if(|r| r.kind == RowKind::Pin) {
            pins.push(row);
        }
        let name = table
            .symbol_header
            .value(&head.fields, SymbolColumn::Name)
            .to_string();
        let result = builder.build_block(head, &pins);
        match &result {
            Ok(spec) => debug!("built symbol '{}' from line {}", spec.name, head.line),
            Err(e) => debug!("symbol block at line {} failed: {}", head.line, e.node),
        }
        blocks.push(Block {
            name,
            line: head.line,
            result,
        });
    }
    blocks
}

struct TableBuilder<'t> {
    table: &'t ClassifiedTable,
    file: usize,
}

/// How a symbol relates to an earlier one
enum Relation {
    None,
    Derive(String),
    Extend(String),
}

struct SymbolDecl {
    name: String,
    attributes: AttributeSet,
    relation: Relation,
}

#[derive(Debug, Clone, PartialEq)]
enum Stacking {
    None,
    /// Share the position of the previous pin
    Join,
    Tag(String),
}

/// A fully defaulted pin row; the number may still be a bus list
#[derive(Debug, Clone)]
struct PinDraft {
    number: String,
    name: String,
    electrical: ElectricalType,
    shape: PinShape,
    side: Side,
    /// Category given on the row itself rather than inherited
    explicit_side: bool,
    visibility: Visibility,
    stacking: Stacking,
    length: f64,
    name_font_size: f64,
    number_font_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditOp {
    Delete,
    Before,
    After,
    Overload,
}

impl EditOp {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "delete" => Some(EditOp::Delete),
            "before" => Some(EditOp::Before),
            "after" => Some(EditOp::After),
            "overload" => Some(EditOp::Overload),
            _ => None,
        }
    }
}

enum PinRow {
    Pin(PinDraft),
    Gap { side: Side, count: usize },
    Edit { op: EditOp, targets: Vec<PinRef> },
}

/// Values inherited by empty sticky cells
#[derive(Default)]
struct Sticky {
    side: Option<Side>,
    previous: Option<PinDraft>,
}

impl<'t> TableBuilder<'t> {
    fn build_block(&self, head: &Row, pins: &[&Row]) -> Result<SymbolSpec, Spanned<SymbolError>> {
        let decl = self
            .parse_symbol_row(head)
            .map_err(|e| Spanned::new(e, head.span.clone()))?;

        let lineage = match decl.relation {
            Relation::None => Lineage::Base {
                pins: self.base_pins(&decl.name, pins)?,
            },
            Relation::Derive(base) => Lineage::Derived {
                base,
                edits: self.edits(pins)?,
            },
            Relation::Extend(base) => {
                if let Some(row) = pins.first() {
                    return Err(Spanned::new(
                        SymbolError::AliasWithPins { symbol: decl.name },
                        row.span.clone(),
                    ));
                }
                Lineage::Alias { base }
            }
        };

        Ok(SymbolSpec {
            name: decl.name,
            attributes: decl.attributes,
            lineage,
            file: self.file,
            span: head.span.clone(),
        })
    }

    fn parse_symbol_row(&self, row: &Row) -> Result<SymbolDecl, SymbolError> {
        let header = &self.table.symbol_header;
        header.check_row(&row.fields)?;
        let value = |c| header.value(&row.fields, c);

        let name = value(SymbolColumn::Name);
        if name.is_empty() {
            return Err(SymbolError::ValueRequired {
                column: SymbolColumn::Name.label(),
            });
        }

        let relation = match (value(SymbolColumn::DeriveFrom), value(SymbolColumn::KicadExtends)) {
            ("", "") => Relation::None,
            (base, "") => Relation::Derive(base.to_string()),
            ("", base) => Relation::Extend(base.to_string()),
            _ => {
                return Err(SymbolError::DeriveAndExtend {
                    symbol: name.to_string(),
                })
            }
        };
        let is_alias = matches!(relation, Relation::Extend(_));

        let mut attributes = AttributeSet::new();
        for &column in SymbolColumn::ALL {
            if matches!(
                column,
                SymbolColumn::Name | SymbolColumn::DeriveFrom | SymbolColumn::KicadExtends
            ) {
                continue;
            }
            let raw = value(column);
            if raw.is_empty() {
                continue;
            }
            if is_alias && !column.allowed_on_alias() {
                return Err(SymbolError::AliasAttribute {
                    symbol: name.to_string(),
                    column: column.label(),
                });
            }
            let converted = convert_symbol_value(column, raw)?;
            if let (SymbolColumn::MinWidth | SymbolColumn::MinHeight, AttrValue::Int(v)) =
                (column, &converted)
            {
                if v % 2 != 0 {
                    return Err(SymbolError::OddDimension {
                        column: column.label(),
                        value: *v,
                    });
                }
            }
            attributes.insert(column, converted);
        }

        Ok(SymbolDecl {
            name: name.to_string(),
            attributes,
            relation,
        })
    }

    fn base_pins(&self, symbol: &str, rows: &[&Row]) -> Result<Vec<PinSlot>, Spanned<SymbolError>> {
        let mut sticky = Sticky::default();
        let mut list = SlotList::default();

        for row in rows {
            let at = |e: SymbolError| Spanned::new(e, row.span.clone());
            match self.parse_pin_row(row, &sticky).map_err(at)? {
                PinRow::Pin(draft) => {
                    list.push_pin(&draft, &row.span).map_err(at)?;
                    sticky.side = Some(draft.side);
                    sticky.previous = Some(draft);
                }
                PinRow::Gap { side, count } => {
                    list.push_gap(side, count, &row.span);
                    sticky.side = Some(side);
                }
                PinRow::Edit { op, .. } => {
                    return Err(at(SymbolError::EditInBaseSymbol {
                        category: op_label(op).to_string(),
                    }))
                }
            }
        }

        let mut seen = HashSet::new();
        for pin in list.slots.iter().filter_map(PinSlot::as_pin) {
            if !seen.insert(pin.number.as_str()) {
                return Err(Spanned::new(
                    SymbolError::DuplicatePinNumber {
                        number: pin.number.clone(),
                        symbol: symbol.to_string(),
                    },
                    pin.span.clone(),
                ));
            }
        }

        Ok(list.slots)
    }

    /// Turn the pin rows of a derived symbol into an ordered edit list
    fn edits(&self, rows: &[&Row]) -> Result<Vec<PinEdit>, Spanned<SymbolError>> {
        let mut sticky = Sticky::default();
        let mut edits = Vec::new();
        let mut mark: Option<Mark> = None;
        let mut list = SlotList::default();

        for row in rows {
            let at = |e: SymbolError| Spanned::new(e, row.span.clone());
            match self.parse_pin_row(row, &sticky).map_err(at)? {
                PinRow::Edit { op, targets } => {
                    flush(&mut edits, mark.take(), std::mem::take(&mut list));
                    if op != EditOp::Overload {
                        mark = Some(Mark {
                            op,
                            targets,
                            span: row.span.clone(),
                        });
                    }
                }
                PinRow::Gap { side, count } => {
                    if mark.is_none() {
                        return Err(at(SymbolError::GapWithoutMark {
                            value: self.table.pin_header.value(&row.fields, PinColumn::Number).to_string(),
                        }));
                    }
                    list.push_gap(side, count, &row.span);
                    sticky.side = Some(side);
                }
                PinRow::Pin(draft) => {
                    list.push_pin(&draft, &row.span).map_err(at)?;
                    sticky.side = Some(draft.side);
                    sticky.previous = Some(draft);
                }
            }
        }
        flush(&mut edits, mark, list);

        Ok(edits)
    }

    fn parse_pin_row(&self, row: &Row, sticky: &Sticky) -> Result<PinRow, SymbolError> {
        let header = &self.table.pin_header;
        header.check_row(&row.fields)?;
        let value = |c| header.value(&row.fields, c);

        let category = value(PinColumn::Category);
        let number = value(PinColumn::Number);
        let name = value(PinColumn::Name);

        if let Some(op) = EditOp::from_label(category) {
            if op == EditOp::Overload {
                if !number.is_empty() {
                    return Err(SymbolError::OverloadWithNumber);
                }
                return Ok(PinRow::Edit {
                    op,
                    targets: Vec::new(),
                });
            }
            let targets = if !number.is_empty() {
                split_numbers(number)?
                    .into_iter()
                    .map(PinRef::Number)
                    .collect()
            } else if !name.is_empty() {
                vec![PinRef::Name(name.to_string())]
            } else {
                return Err(SymbolError::MissingEditTarget {
                    category: category.to_lowercase(),
                });
            };
            return Ok(PinRow::Edit { op, targets });
        }

        let side = if category.is_empty() {
            sticky.side
        } else {
            Some(Side::from_label(category).ok_or_else(|| SymbolError::InvalidValue {
                column: PinColumn::Category.label(),
                value: category.to_string(),
                expected: "left, right, top, bottom, delete, before, after or overload"
                    .to_string(),
            })?)
        };

        if number.starts_with("---") {
            let count = parse_gap(number)?;
            let side = side.ok_or(SymbolError::ValueRequired {
                column: PinColumn::Category.label(),
            })?;
            return Ok(PinRow::Gap { side, count });
        }
        if number.is_empty() {
            return Err(SymbolError::ValueRequired {
                column: PinColumn::Number.label(),
            });
        }

        let previous = sticky.previous.as_ref();

        let electrical = match value(PinColumn::ElType) {
            "" => previous
                .map(|p| p.electrical)
                .ok_or(SymbolError::ValueRequired {
                    column: PinColumn::ElType.label(),
                })?,
            raw => ElectricalType::from_label(raw).ok_or_else(|| {
                invalid(PinColumn::ElType, raw, &labels(&ElectricalType::ALL.map(|t| t.label())))
            })?,
        };

        let shape = match value(PinColumn::GrType) {
            "" => previous.map(|p| p.shape).unwrap_or(PinShape::Line),
            raw => PinShape::from_label(raw).ok_or_else(|| {
                invalid(PinColumn::GrType, raw, &labels(&PinShape::ALL.map(|s| s.label())))
            })?,
        };

        let sticky_float = |column: PinColumn, get: fn(&PinDraft) -> f64, default: f64| {
            match value(column) {
                "" => Ok(previous.map(get).unwrap_or(default)),
                raw => parse_float(column, raw),
            }
        };
        let length = sticky_float(PinColumn::Length, |p| p.length, DEFAULT_PIN_LENGTH)?;
        let name_font_size =
            sticky_float(PinColumn::NameFontSize, |p| p.name_font_size, DEFAULT_PIN_FONT_SIZE)?;
        let number_font_size = sticky_float(
            PinColumn::NumberFontSize,
            |p| p.number_font_size,
            DEFAULT_PIN_FONT_SIZE,
        )?;

        Ok(PinRow::Pin(PinDraft {
            number: number.to_string(),
            name: name.to_string(),
            electrical,
            shape,
            side: side.unwrap_or_else(|| electrical.default_side()),
            explicit_side: !category.is_empty(),
            visibility: parse_visibility(value(PinColumn::Hidden))?,
            stacking: parse_stacking(value(PinColumn::Stacked)),
            length,
            name_font_size,
            number_font_size,
        }))
    }
}

/// An open `delete`, `before` or `after` insertion point
struct Mark {
    op: EditOp,
    targets: Vec<PinRef>,
    span: Span,
}

fn flush(edits: &mut Vec<PinEdit>, mark: Option<Mark>, list: SlotList) {
    let slots = list.slots;
    let Some(mark) = mark else {
        for slot in slots {
            if let PinSlot::Pin(pin) = slot {
                edits.push(PinEdit::Overload {
                    target: PinRef::Number(pin.number.clone()),
                    span: pin.span.clone(),
                    pin,
                });
            }
        }
        return;
    };

    let (Some(first), Some(last)) = (mark.targets.first(), mark.targets.last()) else {
        return;
    };
    match mark.op {
        EditOp::Before => edits.push(PinEdit::InsertBefore {
            target: first.clone(),
            slots,
            span: mark.span,
        }),
        EditOp::After => edits.push(PinEdit::InsertAfter {
            target: last.clone(),
            slots,
            span: mark.span,
        }),
        EditOp::Delete => {
            if !slots.is_empty() {
                edits.push(PinEdit::InsertBefore {
                    target: first.clone(),
                    slots,
                    span: mark.span.clone(),
                });
            }
            for target in mark.targets {
                edits.push(PinEdit::Delete {
                    target,
                    span: mark.span.clone(),
                });
            }
        }
        EditOp::Overload => {}
    }
}

/// Slots of one pin list under construction
#[derive(Default)]
struct SlotList {
    slots: Vec<PinSlot>,
    /// Number cell and first slot of the last pin row, for alternates
    last_row: Option<(String, usize)>,
}

impl SlotList {
    fn push_gap(&mut self, side: Side, count: usize, span: &Span) {
        self.slots.push(PinSlot::Gap {
            side,
            count,
            span: span.clone(),
        });
        self.last_row = None;
    }

    fn push_pin(&mut self, draft: &PinDraft, span: &Span) -> Result<(), SymbolError> {
        if let Some((number, first)) = &self.last_row {
            if *number == draft.number {
                return self.push_alternate(*first, draft);
            }
        }

        let stack = match &draft.stacking {
            Stacking::None => None,
            Stacking::Tag(tag) => Some(tag.clone()),
            Stacking::Join => {
                let previous = match self.slots.last_mut() {
                    Some(PinSlot::Pin(pin)) => pin,
                    _ => {
                        return Err(SymbolError::StackWithoutPredecessor {
                            number: draft.number.clone(),
                        })
                    }
                };
                let tag = previous
                    .stack
                    .get_or_insert_with(|| previous.number.clone())
                    .clone();
                Some(tag)
            }
        };

        let first = self.slots.len();
        for (number, name, bus) in expand_bus(&draft.number, &draft.name)? {
            self.slots.push(PinSlot::Pin(PinSpec {
                number,
                name,
                electrical: draft.electrical,
                shape: draft.shape,
                side: draft.side,
                visibility: draft.visibility,
                stack: stack.clone(),
                length: draft.length,
                name_font_size: draft.name_font_size,
                number_font_size: draft.number_font_size,
                alternates: Vec::new(),
                bus,
                span: span.clone(),
            }));
        }
        self.last_row = Some((draft.number.clone(), first));
        Ok(())
    }

    fn push_alternate(&mut self, first: usize, draft: &PinDraft) -> Result<(), SymbolError> {
        if draft.number.contains(',') {
            return Err(SymbolError::BusWithAlternates {
                number: draft.number.clone(),
            });
        }
        if draft.stacking != Stacking::None {
            return Err(SymbolError::StackedAlternate {
                number: draft.number.clone(),
            });
        }
        let Some(PinSlot::Pin(primary)) = self.slots.get_mut(first) else {
            return Err(SymbolError::StackWithoutPredecessor {
                number: draft.number.clone(),
            });
        };
        if draft.explicit_side && draft.side != primary.side {
            return Err(SymbolError::AlternateSide {
                number: draft.number.clone(),
            });
        }
        if primary.visibility.is_hidden() != draft.visibility.is_hidden() {
            return Err(SymbolError::AlternateVisibility {
                number: draft.number.clone(),
            });
        }
        primary.alternates.push(AltFunction {
            name: draft.name.clone(),
            electrical: draft.electrical,
            shape: draft.shape,
        });
        Ok(())
    }
}

/// Serial number template in a bus pin name: `$`, `$(s)`, `$(s+i)` or `$(s-i)`
#[derive(Debug, PartialEq)]
struct NameTemplate {
    token: Option<String>,
    start: i64,
    step: i64,
}

impl NameTemplate {
    fn parse(name: &str) -> Self {
        for (i, _) in name.match_indices("$(") {
            if let Some((len, start, step)) = parse_serial_spec(&name[i + 2..]) {
                return Self {
                    token: Some(name[i..i + 2 + len].to_string()),
                    start,
                    step,
                };
            }
        }
        Self {
            token: name.contains('$').then(|| "$".to_string()),
            start: 0,
            step: 1,
        }
    }

    fn render(&self, name: &str, serial: i64) -> String {
        match &self.token {
            Some(token) => name.replace(token.as_str(), &serial.to_string()),
            None => name.to_string(),
        }
    }
}

/// Parse `s)`, `s+i)`, `s-i)` or `s-)`; returns consumed length, start and step
fn parse_serial_spec(s: &str) -> Option<(usize, i64, i64)> {
    let digits = |from: usize| s[from..].bytes().take_while(u8::is_ascii_digit).count();

    let start_len = digits(0);
    if start_len == 0 {
        return None;
    }
    let start: i64 = s[..start_len].parse().ok()?;
    let mut pos = start_len;

    let sign = match s.as_bytes().get(pos) {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => 0,
    };
    let mut step = 1;
    if sign != 0 {
        pos += 1;
        let step_len = digits(pos);
        if step_len > 0 {
            step = s[pos..pos + step_len].parse().ok()?;
            pos += step_len;
        }
        step *= sign;
    }

    (s.as_bytes().get(pos) == Some(&b')')).then_some((pos + 1, start, step))
}

fn split_numbers(raw: &str) -> Result<Vec<String>, SymbolError> {
    let numbers: Vec<String> = raw.split(',').map(|n| n.trim().to_string()).collect();
    if numbers.iter().any(String::is_empty) {
        return Err(invalid(PinColumn::Number, raw, "a pin number or comma separated list"));
    }
    for (i, number) in numbers.iter().enumerate() {
        if numbers[..i].contains(number) {
            return Err(SymbolError::DuplicateBusBit {
                number: number.clone(),
                bus: raw.to_string(),
            });
        }
    }
    Ok(numbers)
}

/// Expand a pin number cell into `(number, name, bus)` per physical pin
fn expand_bus(raw: &str, name: &str) -> Result<Vec<(String, String, Option<BusBit>)>, SymbolError> {
    if !raw.contains(',') {
        return Ok(vec![(raw.to_string(), name.to_string(), None)]);
    }
    let template = NameTemplate::parse(name);
    let numbers = split_numbers(raw)?;
    numbers
        .into_iter()
        .enumerate()
        .map(|(i, number)| {
            let serial = i64::try_from(i)
                .ok()
                .and_then(|i| template.step.checked_mul(i))
                .and_then(|offset| template.start.checked_add(offset))
                .ok_or_else(|| {
                    invalid(PinColumn::Name, name, "serial numbers within 64-bit range")
                })?;
            let bit = BusBit {
                bus: raw.to_string(),
                index: serial,
                reversed: template.step < 0,
            };
            Ok((number, template.render(name, serial), Some(bit)))
        })
        .collect()
}

/// `---` reserves one position, `--- n` reserves `n`
fn parse_gap(raw: &str) -> Result<usize, SymbolError> {
    let rest = raw.trim_start_matches('-').trim();
    if rest.is_empty() {
        return Ok(1);
    }
    match rest.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(SymbolError::InvalidGap {
            value: raw.to_string(),
        }),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

fn parse_visibility(raw: &str) -> Result<Visibility, SymbolError> {
    if raw.is_empty() {
        return Ok(Visibility::Visible);
    }
    if raw.eq_ignore_ascii_case("unreserved") {
        return Ok(Visibility::HiddenUnreserved);
    }
    match parse_bool(raw) {
        Some(true) => Ok(Visibility::Hidden),
        Some(false) => Ok(Visibility::Visible),
        None => Err(invalid(PinColumn::Hidden, raw, "yes, no or unreserved")),
    }
}

fn parse_stacking(raw: &str) -> Stacking {
    if raw.is_empty() {
        return Stacking::None;
    }
    match parse_bool(raw) {
        Some(true) => Stacking::Join,
        Some(false) => Stacking::None,
        None => Stacking::Tag(raw.to_string()),
    }
}

fn parse_float(column: PinColumn, raw: &str) -> Result<f64, SymbolError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(column, raw, "a number"))
}

fn convert_symbol_value(column: SymbolColumn, raw: &str) -> Result<AttrValue, SymbolError> {
    let err = |expected: &str| SymbolError::InvalidValue {
        column: column.label(),
        value: raw.to_string(),
        expected: expected.to_string(),
    };
    match column.kind() {
        ValueKind::Text => Ok(AttrValue::Text(raw.to_string())),
        ValueKind::Bool => parse_bool(raw).map(AttrValue::Bool).ok_or_else(|| err("yes or no")),
        ValueKind::Int => raw
            .parse::<i64>()
            .map(AttrValue::Int)
            .map_err(|_| err("an integer")),
        ValueKind::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(AttrValue::Float)
            .ok_or_else(|| err("a number")),
    }
}

fn invalid(column: PinColumn, raw: &str, expected: &str) -> SymbolError {
    SymbolError::InvalidValue {
        column: column.label(),
        value: raw.to_string(),
        expected: expected.to_string(),
    }
}

fn labels(all: &[&str]) -> String {
    all.join(", ")
}

fn op_label(op: EditOp) -> &'static str {
    match op {
        EditOp::Delete => "delete",
        EditOp::Before => "before",
        EditOp::After => "after",
        EditOp::Overload => "overload",
    }
}
