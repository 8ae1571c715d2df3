//! Layout computation engine
//!
//! Places the pins of a resolved symbol on the four edges of its body.
//!
//! Each side is first reordered so that the bits of a bus sit together in
//! serial order, then split into anchors: grid positions holding zero or
//! more pins. Gaps add empty anchors, stacked pins share one and hidden
//! unreserved pins ride along with a neighbour. The pin rectangle grows to
//! fit the fuller of each pair of opposite sides and the anchors are
//! centred on their edge.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use super::config::LayoutConfig;
use super::error::LayoutError;
use super::types::*;
use crate::table::{PinSlot, PinSpec, Side, SymbolAttributes, Visibility};

/// Half the extent needed for `positions` anchors
pub fn half_len(positions: usize) -> i64 {
    let p = positions as i64;
    if p % 2 == 0 {
        p / 2
    } else {
        (p - 1) / 2
    }
}

/// Offset of the first of `positions` anchors from the end of an edge of
/// half extent `half`
pub fn center(half: i64, positions: usize) -> i64 {
    let p = positions as i64;
    let offset = (2 * half + 1 - p).div_euclid(2);
    if p % 2 == 0 {
        offset + 1
    } else {
        offset
    }
}

/// One grid position on a side
#[derive(Debug, Default)]
struct Anchor<'a> {
    pins: Vec<&'a PinSpec>,
    tag: Option<&'a str>,
}

/// Compute the geometry of a symbol from its pin list
pub fn compute(
    pins: &[PinSlot],
    attributes: &SymbolAttributes,
    config: &LayoutConfig,
) -> Result<SymbolGeometry, LayoutError> {
    let mut tags: HashMap<&str, Side> = HashMap::new();
    let mut sides: Vec<(Side, Vec<Anchor>)> = Vec::with_capacity(4);

    for side in Side::ALL {
        let ordered = order_side(pins, side);
        let anchors = build_anchors(&ordered, side, &mut tags, config.max_side_anchors)?;
        if anchors.len() > config.max_side_anchors {
            return Err(LayoutError::overflow(
                side,
                anchors.len(),
                config.max_side_anchors,
            ));
        }
        trace!("{} side: {} anchors", side.label(), anchors.len());
        sides.push((side, anchors));
    }

    let count = |side: Side| {
        sides
            .iter()
            .find(|(s, _)| *s == side)
            .map_or(0, |(_, anchors)| anchors.len())
    };
    let vertical = count(Side::Left).max(count(Side::Right));
    let horizontal = count(Side::Top).max(count(Side::Bottom));
    let w = half_len(horizontal).max(attributes.min_width / 2);
    let h = half_len(vertical).max(attributes.min_height / 2);
    let w_edge = w as f64 + attributes.w_padding;
    let h_edge = h as f64 + attributes.h_padding;

    let mut geometry = SymbolGeometry {
        half_width: w,
        half_height: h,
        body: Rect::centered(w_edge, h_edge),
        pins: Vec::new(),
        left: SideSummary::default(),
        right: SideSummary::default(),
        top: SideSummary::default(),
        bottom: SideSummary::default(),
    };

    for (side, anchors) in &sides {
        let side = *side;
        let (start, step, padding) = match side {
            Side::Left | Side::Right => (
                (h - center(h, anchors.len())) as f64,
                -1.0,
                attributes.w_padding,
            ),
            Side::Top | Side::Bottom => (
                -((w - center(w, anchors.len())) as f64),
                1.0,
                attributes.h_padding,
            ),
        };
        let mut longest: f64 = 0.0;

        for (ordinal, anchor) in anchors.iter().enumerate() {
            let along = start + step * ordinal as f64;
            let edge = match side {
                Side::Left => Point::new(-w_edge, along),
                Side::Right => Point::new(w_edge, along),
                Side::Top => Point::new(along, h_edge),
                Side::Bottom => Point::new(along, -h_edge),
            };
            for pin in &anchor.pins {
                if (padding + pin.length).fract() != 0.0 {
                    return Err(LayoutError::off_grid(&pin.number, pin.length, padding));
                }
                longest = longest.max(pin.length);
                let length = if pin.visibility.is_hidden() {
                    0.0
                } else {
                    pin.length
                };
                geometry.pins.push(PlacedPin {
                    pin: (*pin).clone(),
                    side,
                    anchor: ordinal,
                    edge,
                    end: edge.outward(side, length),
                    length,
                    rotation: side.rotation(),
                });
            }
        }

        *geometry.side_mut(side) = SideSummary {
            anchors: anchors.len(),
            longest_pin: longest,
            start,
        };
    }

    debug!(
        "layout {}x{} half extents, {} pins placed",
        w,
        h,
        geometry.pins.len()
    );
    Ok(geometry)
}

/// Slots of one side with every bus gathered at its first bit, in serial
/// order
fn order_side(pins: &[PinSlot], side: Side) -> Vec<&PinSlot> {
    let on_side: Vec<&PinSlot> = pins.iter().filter(|s| s.side() == side).collect();
    let mut ordered = Vec::with_capacity(on_side.len());
    let mut placed_buses: HashSet<&str> = HashSet::new();

    for slot in &on_side {
        let bus = slot.as_pin().and_then(|p| p.bus.as_ref());
        let Some(bus) = bus else {
            ordered.push(*slot);
            continue;
        };
        if !placed_buses.insert(bus.bus.as_str()) {
            continue;
        }
        let mut members: Vec<&PinSlot> = on_side
            .iter()
            .copied()
            .filter(|s| {
                s.as_pin()
                    .and_then(|p| p.bus.as_ref())
                    .is_some_and(|b| b.bus == bus.bus)
            })
            .collect();
        members.sort_by_key(|s| {
            let bit = s.as_pin().and_then(|p| p.bus.as_ref());
            bit.map_or(0, |b| if b.reversed { b.index.saturating_neg() } else { b.index })
        });
        ordered.extend(members);
    }
    ordered
}

fn build_anchors<'a>(
    ordered: &[&'a PinSlot],
    side: Side,
    tags: &mut HashMap<&'a str, Side>,
    max: usize,
) -> Result<Vec<Anchor<'a>>, LayoutError> {
    let mut anchors: Vec<Anchor<'a>> = Vec::new();
    // unreserved pins seen before the first anchor of the side
    let mut waiting: Vec<&'a PinSpec> = Vec::new();

    for &slot in ordered {
        let pin = match slot {
            PinSlot::Gap { count, .. } => {
                // the count comes straight from the table
                let total = anchors.len().saturating_add(*count);
                if total > max {
                    return Err(LayoutError::overflow(side, total, max));
                }
                anchors.extend((0..*count).map(|_| Anchor::default()));
                continue;
            }
            PinSlot::Pin(pin) => pin,
        };

        match pin.stack.as_deref() {
            None if pin.visibility == Visibility::HiddenUnreserved => match anchors.last_mut() {
                Some(anchor) => anchor.pins.push(pin),
                None => waiting.push(pin),
            },
            Some(tag) if anchors.last().is_some_and(|a| a.tag == Some(tag)) => {
                if let Some(anchor) = anchors.last_mut() {
                    anchor.pins.push(pin);
                }
            }
            tag => {
                if let Some(tag) = tag {
                    if tags.insert(tag, side).is_some() {
                        return Err(LayoutError::split_stack(tag, side));
                    }
                }
                let mut pins = std::mem::take(&mut waiting);
                pins.insert(0, pin);
                anchors.push(Anchor { pins, tag });
            }
        }
    }

    if !waiting.is_empty() {
        anchors.push(Anchor {
            pins: waiting,
            tag: None,
        });
    }
    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{BusBit, ElectricalType, PinShape};
    use pretty_assertions::assert_eq;

    fn pin(number: &str, side: Side) -> PinSpec {
        PinSpec {
            number: number.to_string(),
            name: format!("P{number}"),
            electrical: ElectricalType::Input,
            shape: PinShape::Line,
            side,
            visibility: Visibility::Visible,
            stack: None,
            length: 1.0,
            name_font_size: 50.0,
            number_font_size: 50.0,
            alternates: Vec::new(),
            bus: None,
            span: 0..1,
        }
    }

    fn slots(pins: Vec<PinSpec>) -> Vec<PinSlot> {
        pins.into_iter().map(PinSlot::Pin).collect()
    }

    fn placed<'a>(geometry: &'a SymbolGeometry, number: &str) -> &'a PlacedPin {
        geometry
            .pins
            .iter()
            .find(|p| p.pin.number == number)
            .unwrap()
    }

    fn layout(pins: &[PinSlot]) -> SymbolGeometry {
        compute(pins, &SymbolAttributes::default(), &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn test_half_len_and_center() {
        assert_eq!(half_len(0), 0);
        assert_eq!(half_len(3), 1);
        assert_eq!(half_len(4), 2);
        assert_eq!(center(1, 3), 0);
        assert_eq!(center(2, 2), 2);
        assert_eq!(center(1, 1), 1);
    }

    #[test]
    fn test_left_and_right_columns() {
        let pins = slots(vec![
            pin("1", Side::Left),
            pin("2", Side::Left),
            pin("3", Side::Left),
            pin("4", Side::Right),
        ]);
        let g = layout(&pins);
        assert_eq!((g.half_width, g.half_height), (1, 1));
        assert_eq!(g.body, Rect::centered(2.0, 2.0));

        let p1 = placed(&g, "1");
        assert_eq!(p1.edge, Point::new(-2.0, 1.0));
        assert_eq!(p1.end, Point::new(-3.0, 1.0));
        assert_eq!(p1.rotation, 0);
        assert_eq!(placed(&g, "3").edge, Point::new(-2.0, -1.0));

        let p4 = placed(&g, "4");
        assert_eq!(p4.edge, Point::new(2.0, 0.0));
        assert_eq!(p4.end, Point::new(3.0, 0.0));
        assert_eq!(p4.rotation, 180);
    }

    #[test]
    fn test_top_and_bottom_rows() {
        let pins = slots(vec![
            pin("1", Side::Top),
            pin("2", Side::Top),
            pin("3", Side::Top),
            pin("4", Side::Bottom),
        ]);
        let g = layout(&pins);
        assert_eq!(placed(&g, "1").edge, Point::new(-1.0, 2.0));
        assert_eq!(placed(&g, "1").end, Point::new(-1.0, 3.0));
        assert_eq!(placed(&g, "3").edge, Point::new(1.0, 2.0));
        assert_eq!(placed(&g, "4").end, Point::new(0.0, -3.0));
        assert_eq!(g.top.start, -1.0);
    }

    #[test]
    fn test_min_size_wins() {
        let mut attrs = SymbolAttributes::default();
        attrs.min_width = 6;
        attrs.min_height = 4;
        let g = compute(&slots(vec![pin("1", Side::Left)]), &attrs, &LayoutConfig::default())
            .unwrap();
        assert_eq!((g.half_width, g.half_height), (3, 2));
        assert_eq!(g.body, Rect::centered(4.0, 3.0));
    }

    #[test]
    fn test_gap_reserves_positions() {
        let pins = vec![
            PinSlot::Pin(pin("1", Side::Left)),
            PinSlot::Gap {
                side: Side::Left,
                count: 2,
                span: 0..1,
            },
            PinSlot::Pin(pin("2", Side::Left)),
        ];
        let g = layout(&pins);
        assert_eq!(g.left.anchors, 4);
        let dy = placed(&g, "1").edge.y - placed(&g, "2").edge.y;
        assert_eq!(dy, 3.0);
    }

    #[test]
    fn test_stacked_pins_share_position() {
        let mut a = pin("1", Side::Left);
        let mut b = pin("2", Side::Left);
        a.stack = Some("gnd".into());
        b.stack = Some("gnd".into());
        let g = layout(&slots(vec![a, b, pin("3", Side::Left)]));
        assert_eq!(g.left.anchors, 2);
        assert_eq!(placed(&g, "1").edge, placed(&g, "2").edge);
    }

    #[test]
    fn test_split_stack_is_rejected() {
        let mut a = pin("1", Side::Left);
        let mut b = pin("2", Side::Right);
        a.stack = Some("gnd".into());
        b.stack = Some("gnd".into());
        let err = compute(
            &slots(vec![a, b]),
            &SymbolAttributes::default(),
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::split_stack("gnd", Side::Right));
    }

    #[test]
    fn test_hidden_pins() {
        let mut hidden = pin("2", Side::Left);
        hidden.visibility = Visibility::Hidden;
        let mut unreserved = pin("3", Side::Left);
        unreserved.visibility = Visibility::HiddenUnreserved;
        let g = layout(&slots(vec![pin("1", Side::Left), hidden, unreserved]));
        assert_eq!(g.left.anchors, 2);
        let p2 = placed(&g, "2");
        assert_eq!(p2.length, 0.0);
        assert_eq!(p2.end, p2.edge);
        assert_eq!(placed(&g, "3").edge, p2.edge);
        assert_eq!(g.left.longest_pin, 1.0);
    }

    #[test]
    fn test_bus_bits_grouped_in_serial_order() {
        let bit = |number: &str, index: i64, reversed: bool| {
            let mut p = pin(number, Side::Right);
            p.bus = Some(BusBit {
                bus: "10,11,12".into(),
                index,
                reversed,
            });
            p
        };
        let pins = slots(vec![
            bit("10", 2, true),
            pin("5", Side::Right),
            bit("11", 1, true),
            bit("12", 0, true),
        ]);
        let g = layout(&pins);
        let order: Vec<&str> = {
            let mut right: Vec<&PlacedPin> = g.pins.iter().collect();
            right.sort_by_key(|p| p.anchor);
            right.iter().map(|p| p.pin.number.as_str()).collect()
        };
        assert_eq!(order, vec!["10", "11", "12", "5"]);
    }

    #[test]
    fn test_reversed_bus_at_lowest_index() {
        let bit = |number: &str, index: i64| {
            let mut p = pin(number, Side::Left);
            p.bus = Some(BusBit {
                bus: "1,2".into(),
                index,
                reversed: true,
            });
            p
        };
        let pins = slots(vec![bit("1", i64::MIN + 1), bit("2", i64::MIN)]);
        let g = layout(&pins);
        assert_eq!(placed(&g, "1").anchor, 0);
        assert_eq!(placed(&g, "2").anchor, 1);
    }

    #[test]
    fn test_off_grid_length() {
        let mut p = pin("1", Side::Left);
        p.length = 1.5;
        let err = compute(
            &slots(vec![p]),
            &SymbolAttributes::default(),
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::OffGrid { .. }));
    }

    #[test]
    fn test_side_overflow() {
        let pins = slots((0..5).map(|i| pin(&i.to_string(), Side::Top)).collect());
        let err = compute(
            &pins,
            &SymbolAttributes::default(),
            &LayoutConfig::new().with_max_side_anchors(4),
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::overflow(Side::Top, 5, 4));
    }

    #[test]
    fn test_huge_gap_overflows_without_allocating() {
        let pins = vec![
            PinSlot::Pin(pin("1", Side::Left)),
            PinSlot::Gap {
                side: Side::Left,
                count: usize::MAX,
                span: 0..1,
            },
        ];
        let err = compute(&pins, &SymbolAttributes::default(), &LayoutConfig::default())
            .unwrap_err();
        assert_eq!(err, LayoutError::overflow(Side::Left, usize::MAX, 200));
    }
}
