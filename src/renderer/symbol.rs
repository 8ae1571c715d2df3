//! Building KiCad symbols from resolved symbols and their geometry

use log::trace;

use super::config::{mil_to_mm, KicadConfig};
use super::model::*;
use crate::derive::ResolvedSymbol;
use crate::layout::{PlacedPin, SymbolGeometry};

/// Build the KiCad record of one symbol
///
/// For aliases `geometry` is the geometry of the root symbol; only the
/// properties are placed and the symbol refers to its root via `extends`.
pub fn build_symbol(
    symbol: &ResolvedSymbol,
    geometry: &SymbolGeometry,
    config: &KicadConfig,
) -> KicadSymbol {
    let attrs = &symbol.attributes;
    let mut kicad = KicadSymbol::new(&symbol.name);
    kicad.properties = build_properties(symbol, geometry, config);

    if let Some(root) = &symbol.extends {
        kicad.extends = Some(root.clone());
        return kicad;
    }

    let (bx, by) = (
        config.to_mm(geometry.body.max.x),
        config.to_mm(geometry.body.max.y),
    );
    kicad.rectangles.push(BodyRect {
        start: (-bx, -by),
        end: (bx, by),
        stroke_width: mil_to_mm(config.body_line_width_mil),
    });

    if let Some(text) = &attrs.text {
        let gap = attrs
            .text_gap
            .unwrap_or_else(|| config.text_gap_for(geometry.vertical_anchors()));
        let y = (geometry.half_height as f64 - gap).max(0.0);
        trace!("text item of '{}' at gap {}", symbol.name, gap);
        kicad.texts.push(TextItem {
            text: text.clone(),
            x: 0.0,
            y: config.to_mm(y),
            font_size: mil_to_mm(attrs.text_font_size as f64),
        });
    }

    kicad.in_bom = attrs.in_bom;
    kicad.on_board = attrs.on_board;
    kicad.hide_pin_numbers = attrs.hide_pin_numbers;
    kicad.pin_names_offset = mil_to_mm(attrs.pin_name_offset as f64);
    kicad.hide_pin_names = attrs.hide_pin_names;
    kicad.pins = geometry
        .pins
        .iter()
        .map(|placed| build_pin(placed, config))
        .collect();
    kicad
}

fn build_properties(
    symbol: &ResolvedSymbol,
    geometry: &SymbolGeometry,
    config: &KicadConfig,
) -> Vec<Property> {
    let attrs = &symbol.attributes;
    let fields = [
        ("Reference", attrs.reference.as_str()),
        ("Value", symbol.name.as_str()),
        ("Description", attrs.description.as_str()),
        ("Datasheet", attrs.datasheet.as_str()),
        ("Footprint", attrs.footprint.as_str()),
        ("ki_keywords", attrs.keywords.as_str()),
    ];
    let mut properties: Vec<Property> = fields
        .iter()
        .enumerate()
        .map(|(id, (key, value))| Property::hidden(*key, *value, id))
        .collect();
    if let Some(filters) = &attrs.fp_filters {
        properties.push(Property::hidden("ki_fp_filters", filters, properties.len()));
    }

    // hidden fields stacked below the body and the bottom pins
    let h = geometry.half_height as f64;
    let mut y = -(h + geometry.bottom.longest_pin + attrs.h_padding + config.hidden_text_gap);
    for property in properties
        .iter_mut()
        .filter(|p| matches!(p.key.as_str(), "Description" | "Datasheet" | "Footprint"))
    {
        property.y = config.to_mm(y);
        y -= config.hidden_text_gap;
    }

    let ref_y = config.to_mm(h + attrs.h_padding + attrs.h_ref_value_gap);
    let (mut ref_x, mut value_x, mut value_y) = (0.0, 0.0, -ref_y);
    let (mut ref_justify, mut value_justify) = (Justify::Center, Justify::Center);
    if geometry.has_horizontal_pins() {
        // both beside the top pins
        value_y = ref_y;
        let (first, last) = if geometry.top.anchors > 0 {
            let first = geometry.top.start;
            (first, first + (geometry.top.anchors - 1) as f64)
        } else {
            (0.0, 0.0)
        };
        ref_x = config.to_mm(first - attrs.w_ref_value_gap);
        value_x = config.to_mm(last + attrs.w_ref_value_gap);
        ref_justify = Justify::Right;
        value_justify = Justify::Left;
    }

    let place = |p: &mut Property, x: f64, y: f64, justify: Justify| {
        p.x = x;
        p.y = y;
        p.rotation = 0.0;
        p.effects.hidden = false;
        p.effects.justify = justify;
    };
    place(&mut properties[0], ref_x, ref_y, ref_justify);
    place(&mut properties[1], value_x, value_y, value_justify);
    properties
}

fn build_pin(placed: &PlacedPin, config: &KicadConfig) -> KicadPin {
    let pin = &placed.pin;
    KicadPin {
        number: pin.number.clone(),
        name: pin.name.clone(),
        electrical: pin.electrical,
        shape: pin.shape,
        x: config.to_mm(placed.end.x),
        y: config.to_mm(placed.end.y),
        rotation: placed.rotation,
        length: config.to_mm(placed.length),
        hidden: pin.visibility.is_hidden(),
        name_font_size: mil_to_mm(pin.name_font_size),
        number_font_size: mil_to_mm(pin.number_font_size),
        alternates: pin
            .alternates
            .iter()
            .map(|alt| KicadAlternate {
                name: alt.name.clone(),
                electrical: alt.electrical,
                shape: alt.shape,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{self, LayoutConfig};
    use crate::table::{
        AltFunction, AttributeSet, ElectricalType, PinShape, PinSlot, PinSpec, Side,
        SymbolAttributes, Visibility,
    };
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

    fn resolved(pins: Vec<PinSpec>, attributes: SymbolAttributes) -> ResolvedSymbol {
        ResolvedSymbol {
            name: "AMP".to_string(),
            attributes,
            inherited: AttributeSet::new(),
            pins: pins.into_iter().map(PinSlot::Pin).collect(),
            extends: None,
            file: 0,
            span: 0..1,
        }
    }

    fn build(symbol: &ResolvedSymbol) -> KicadSymbol {
        let geometry =
            layout::compute(&symbol.pins, &symbol.attributes, &LayoutConfig::default()).unwrap();
        build_symbol(symbol, &geometry, &KicadConfig::default())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_property_order_and_visibility() {
        let mut attrs = SymbolAttributes::default();
        attrs.fp_filters = Some("DIP*".into());
        let kicad = build(&resolved(vec![pin("1", Side::Left)], attrs));
        let keys: Vec<&str> = kicad.properties.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "Reference",
                "Value",
                "Description",
                "Datasheet",
                "Footprint",
                "ki_keywords",
                "ki_fp_filters"
            ]
        );
        let visible: Vec<&str> = kicad
            .properties
            .iter()
            .filter(|p| !p.effects.hidden)
            .map(|p| p.key.as_str())
            .collect();
        assert_eq!(visible, vec!["Reference", "Value"]);
        assert_eq!(kicad.property("Value").unwrap().value, "AMP");
    }

    #[test]
    fn test_reference_and_value_above_and_below() {
        let kicad = build(&resolved(
            vec![pin("1", Side::Left), pin("2", Side::Right)],
            SymbolAttributes::default(),
        ));
        // half height 1, padding 1, gap 0.5
        let reference = kicad.property("Reference").unwrap();
        assert!(close(reference.y, 2.5 * 2.54));
        assert!(close(kicad.property("Value").unwrap().y, -2.5 * 2.54));
        assert_eq!(reference.effects.justify, Justify::Center);

        // hidden fields start one gap below the body
        assert!(close(kicad.property("Description").unwrap().y, -3.0 * 2.54));
        assert!(close(kicad.property("Datasheet").unwrap().y, -4.0 * 2.54));
        assert!(close(kicad.property("Footprint").unwrap().y, -5.0 * 2.54));
    }

    #[test]
    fn test_reference_and_value_beside_top_pins() {
        let kicad = build(&resolved(
            vec![pin("1", Side::Top), pin("2", Side::Top), pin("3", Side::Top)],
            SymbolAttributes::default(),
        ));
        let reference = kicad.property("Reference").unwrap();
        let value = kicad.property("Value").unwrap();
        assert_eq!(reference.y, value.y);
        assert!(close(reference.x, -1.75 * 2.54));
        assert!(close(value.x, 1.75 * 2.54));
        assert_eq!(reference.effects.justify, Justify::Right);
        assert_eq!(value.effects.justify, Justify::Left);
    }

    #[test]
    fn test_body_and_pins() {
        let mut hidden = pin("2", Side::Right);
        hidden.visibility = Visibility::Hidden;
        let mut with_alt = pin("1", Side::Left);
        with_alt.alternates.push(AltFunction {
            name: "TX".into(),
            electrical: ElectricalType::Output,
            shape: PinShape::Line,
        });
        let kicad = build(&resolved(vec![with_alt, hidden], SymbolAttributes::default()));

        let body = &kicad.rectangles[0];
        assert!(close(body.end.0, 2.0 * 2.54));
        assert!(close(body.start.1, -2.0 * 2.54));
        assert!(close(body.stroke_width, 0.254));

        let p1 = kicad.pin("1").unwrap();
        assert!(close(p1.x, -3.0 * 2.54));
        assert_eq!(p1.rotation, 0);
        assert!(close(p1.length, 2.54));
        assert_eq!(p1.alternates.len(), 1);

        let p2 = kicad.pin("2").unwrap();
        assert!(p2.hidden);
        assert_eq!(p2.length, 0.0);
        assert!(close(p2.x, 2.0 * 2.54));
    }

    #[test]
    fn test_text_item_gap() {
        let mut attrs = SymbolAttributes::default();
        attrs.text = Some("OPAMP".into());
        let pins = (0..7).map(|i| pin(&i.to_string(), Side::Left)).collect();
        let kicad = build(&resolved(pins, attrs.clone()));
        // 7 positions: half height 3, big symbol gap 2.5
        assert!(close(kicad.texts[0].y, 0.5 * 2.54));
        assert!(close(kicad.texts[0].font_size, 1.27));

        attrs.text_gap = Some(5.0);
        let pins = (0..7).map(|i| pin(&i.to_string(), Side::Left)).collect();
        let kicad = build(&resolved(pins, attrs));
        assert_eq!(kicad.texts[0].y, 0.0);
    }

    #[test]
    fn test_alias_has_no_graphics() {
        let root = resolved(vec![pin("1", Side::Left)], SymbolAttributes::default());
        let geometry =
            layout::compute(&root.pins, &root.attributes, &LayoutConfig::default()).unwrap();
        let mut alias = root.clone();
        alias.name = "AMP2".into();
        alias.extends = Some("AMP".into());
        let kicad = build_symbol(&alias, &geometry, &KicadConfig::default());
        assert_eq!(kicad.extends.as_deref(), Some("AMP"));
        assert!(kicad.pins.is_empty());
        assert!(kicad.rectangles.is_empty());
        assert_eq!(kicad.property("Value").unwrap().value, "AMP2");
    }
}
