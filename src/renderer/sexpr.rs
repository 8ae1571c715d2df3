//! S-expression output in the KiCad symbol library format

use std::io::{self, Write};

use super::model::*;

/// Library format version written to the header
pub const FORMAT_VERSION: &str = "20211014";

/// Writes a [`KicadLibrary`] to a byte sink
pub trait LibraryWriter {
    fn write_library(&self, library: &KicadLibrary, out: &mut dyn Write) -> io::Result<()>;
}

/// An S-expression value
#[derive(Debug, Clone, PartialEq)]
pub enum Sexpr {
    /// Unquoted atom
    Symbol(String),
    /// Quoted string
    String(String),
    List(Vec<Sexpr>),
}

impl Sexpr {
    pub fn symbol(s: impl Into<String>) -> Self {
        Sexpr::Symbol(s.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Sexpr::String(s.into())
    }

    pub fn number(value: f64) -> Self {
        Sexpr::Symbol(format_number(value))
    }

    /// `(head items...)`
    pub fn node(head: &str, items: Vec<Sexpr>) -> Self {
        let mut list = Vec::with_capacity(items.len() + 1);
        list.push(Sexpr::symbol(head));
        list.extend(items);
        Sexpr::List(list)
    }

    fn depth(&self) -> usize {
        match self {
            Sexpr::List(items) => 1 + items.iter().map(Sexpr::depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Millimetre value rounded to four decimals without trailing zeros
pub fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{rounded:.4}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(ch),
        }
    }
    result
}

/// Format an S-expression with two-space indentation
///
/// Shallow lists stay on one line. Deeper ones keep their leading atoms and
/// flat lists on the opening line and put every further item on its own line.
pub fn format_sexpr(sexpr: &Sexpr, indent_level: usize) -> String {
    let mut out = String::new();
    format_into(&mut out, sexpr, indent_level);
    out
}

fn format_into(out: &mut String, sexpr: &Sexpr, indent_level: usize) {
    match sexpr {
        Sexpr::Symbol(s) => out.push_str(s),
        Sexpr::String(s) => {
            out.push('"');
            out.push_str(&escape_string(s));
            out.push('"');
        }
        Sexpr::List(items) if sexpr.depth() <= 4 => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                format_into(out, item, 0);
            }
            out.push(')');
        }
        Sexpr::List(items) => {
            let inner = "  ".repeat(indent_level + 1);
            let leading = items
                .iter()
                .take_while(|item| item.depth() <= 2)
                .count();
            out.push('(');
            for (i, item) in items[..leading].iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                format_into(out, item, 0);
            }
            for item in &items[leading..] {
                out.push('\n');
                out.push_str(&inner);
                format_into(out, item, indent_level + 1);
            }
            out.push('\n');
            out.push_str(&"  ".repeat(indent_level));
            out.push(')');
        }
    }
}

/// The shipped writer, producing `.kicad_sym` text
#[derive(Debug, Clone)]
pub struct SexprWriter {
    pub generator: String,
}

impl Default for SexprWriter {
    fn default() -> Self {
        Self {
            generator: "kicad_symgen".to_string(),
        }
    }
}

impl SexprWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the S-expression tree of a library
    pub fn to_sexpr(&self, library: &KicadLibrary) -> Sexpr {
        let mut items = vec![
            Sexpr::node("version", vec![Sexpr::symbol(FORMAT_VERSION)]),
            Sexpr::node("generator", vec![Sexpr::symbol(&self.generator)]),
        ];
        items.extend(library.symbols.iter().map(symbol_sexpr));
        Sexpr::node("kicad_symbol_lib", items)
    }

    /// Render a library to a string
    pub fn render(&self, library: &KicadLibrary) -> String {
        let mut text = format_sexpr(&self.to_sexpr(library), 0);
        text.push('\n');
        text
    }
}

impl LibraryWriter for SexprWriter {
    fn write_library(&self, library: &KicadLibrary, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.render(library).as_bytes())
    }
}

fn yes_no(flag: bool) -> Sexpr {
    Sexpr::symbol(if flag { "yes" } else { "no" })
}

fn at(x: f64, y: f64, rotation: f64) -> Sexpr {
    Sexpr::node(
        "at",
        vec![Sexpr::number(x), Sexpr::number(y), Sexpr::number(rotation)],
    )
}

fn font(size: f64) -> Sexpr {
    Sexpr::node(
        "font",
        vec![Sexpr::node(
            "size",
            vec![Sexpr::number(size), Sexpr::number(size)],
        )],
    )
}

fn effects(effects: &TextEffects) -> Sexpr {
    let mut items = vec![font(effects.font_size)];
    if let Some(keyword) = effects.justify.keyword() {
        items.push(Sexpr::node("justify", vec![Sexpr::symbol(keyword)]));
    }
    if effects.hidden {
        items.push(Sexpr::symbol("hide"));
    }
    Sexpr::node("effects", items)
}

fn symbol_sexpr(symbol: &KicadSymbol) -> Sexpr {
    let mut items = vec![Sexpr::string(&symbol.name)];

    if let Some(root) = &symbol.extends {
        items.push(Sexpr::node("extends", vec![Sexpr::string(root)]));
    } else {
        if symbol.hide_pin_numbers {
            items.push(Sexpr::node("pin_numbers", vec![Sexpr::symbol("hide")]));
        }
        let mut pin_names = vec![Sexpr::node(
            "offset",
            vec![Sexpr::number(symbol.pin_names_offset)],
        )];
        if symbol.hide_pin_names {
            pin_names.push(Sexpr::symbol("hide"));
        }
        items.push(Sexpr::node("pin_names", pin_names));
        items.push(Sexpr::node("in_bom", vec![yes_no(symbol.in_bom)]));
        items.push(Sexpr::node("on_board", vec![yes_no(symbol.on_board)]));
    }

    items.extend(symbol.properties.iter().map(|p| {
        Sexpr::node(
            "property",
            vec![
                Sexpr::string(&p.key),
                Sexpr::string(&p.value),
                Sexpr::node("id", vec![Sexpr::symbol(p.id.to_string())]),
                at(p.x, p.y, p.rotation),
                effects(&p.effects),
            ],
        )
    }));

    if symbol.extends.is_none() {
        let mut graphics: Vec<Sexpr> = vec![Sexpr::string(format!("{}_0_1", symbol.name))];
        graphics.extend(symbol.rectangles.iter().map(rectangle_sexpr));
        graphics.extend(symbol.texts.iter().map(|t| {
            Sexpr::node(
                "text",
                vec![
                    Sexpr::string(&t.text),
                    at(t.x, t.y, 0.0),
                    effects(&TextEffects {
                        font_size: t.font_size,
                        ..TextEffects::default()
                    }),
                ],
            )
        }));
        items.push(Sexpr::node("symbol", graphics));

        let mut pins: Vec<Sexpr> = vec![Sexpr::string(format!("{}_1_1", symbol.name))];
        pins.extend(symbol.pins.iter().map(pin_sexpr));
        items.push(Sexpr::node("symbol", pins));
    }

    Sexpr::node("symbol", items)
}

fn rectangle_sexpr(rect: &BodyRect) -> Sexpr {
    Sexpr::node(
        "rectangle",
        vec![
            Sexpr::node(
                "start",
                vec![Sexpr::number(rect.start.0), Sexpr::number(rect.start.1)],
            ),
            Sexpr::node(
                "end",
                vec![Sexpr::number(rect.end.0), Sexpr::number(rect.end.1)],
            ),
            Sexpr::node(
                "stroke",
                vec![
                    Sexpr::node("width", vec![Sexpr::number(rect.stroke_width)]),
                    Sexpr::node("type", vec![Sexpr::symbol("default")]),
                    Sexpr::node(
                        "color",
                        vec![
                            Sexpr::symbol("0"),
                            Sexpr::symbol("0"),
                            Sexpr::symbol("0"),
                            Sexpr::symbol("0"),
                        ],
                    ),
                ],
            ),
            Sexpr::node(
                "fill",
                vec![Sexpr::node("type", vec![Sexpr::symbol("background")])],
            ),
        ],
    )
}

fn pin_sexpr(pin: &KicadPin) -> Sexpr {
    let mut items = vec![
        Sexpr::symbol(pin.electrical.label()),
        Sexpr::symbol(pin.shape.label()),
        at(pin.x, pin.y, pin.rotation as f64),
        Sexpr::node("length", vec![Sexpr::number(pin.length)]),
    ];
    if pin.hidden {
        items.push(Sexpr::symbol("hide"));
    }
    items.push(Sexpr::node(
        "name",
        vec![
            Sexpr::string(&pin.name),
            Sexpr::node("effects", vec![font(pin.name_font_size)]),
        ],
    ));
    items.push(Sexpr::node(
        "number",
        vec![
            Sexpr::string(&pin.number),
            Sexpr::node("effects", vec![font(pin.number_font_size)]),
        ],
    ));
    items.extend(pin.alternates.iter().map(|alt| {
        Sexpr::node(
            "alternate",
            vec![
                Sexpr::string(&alt.name),
                Sexpr::symbol(alt.electrical.label()),
                Sexpr::symbol(alt.shape.label()),
            ],
        )
    }));
    Sexpr::node("pin", items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ElectricalType, PinShape};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.54), "2.54");
        assert_eq!(format_number(-7.62), "-7.62");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-0.00001), "0");
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(
            format_sexpr(&Sexpr::string("a \"b\" \\c"), 0),
            r#""a \"b\" \\c""#
        );
    }

    #[test]
    fn test_shallow_list_on_one_line() {
        let sexpr = Sexpr::node(
            "effects",
            vec![font(1.27), Sexpr::symbol("hide")],
        );
        assert_eq!(
            format_sexpr(&sexpr, 0),
            "(effects (font (size 1.27 1.27)) hide)"
        );
    }

    #[test]
    fn test_empty_library() {
        let text = SexprWriter::new().render(&KicadLibrary::new());
        assert_eq!(
            text,
            "(kicad_symbol_lib (version 20211014) (generator kicad_symgen))\n"
        );
    }

    fn sample_symbol() -> KicadSymbol {
        let mut symbol = KicadSymbol::new("AMP");
        symbol.properties.push(Property::hidden("Reference", "U", 0));
        symbol.rectangles.push(BodyRect {
            start: (-5.08, -5.08),
            end: (5.08, 5.08),
            stroke_width: 0.254,
        });
        symbol.pins.push(KicadPin {
            number: "1".into(),
            name: "IN".into(),
            electrical: ElectricalType::Input,
            shape: PinShape::Line,
            x: -7.62,
            y: 0.0,
            rotation: 0,
            length: 2.54,
            hidden: false,
            name_font_size: 1.27,
            number_font_size: 1.27,
            alternates: vec![KicadAlternate {
                name: "TX".into(),
                electrical: ElectricalType::Output,
                shape: PinShape::Line,
            }],
        });
        symbol
    }

    #[test]
    fn test_symbol_output() {
        let mut library = KicadLibrary::new();
        library.push(sample_symbol());
        let text = SexprWriter::new().render(&library);

        assert!(text.starts_with("(kicad_symbol_lib (version 20211014) (generator kicad_symgen)\n"));
        assert!(text.contains(
            "(symbol \"AMP\" (pin_names (offset 0.508)) (in_bom yes) (on_board yes)\n"
        ));
        assert!(text.contains(
            "(property \"Reference\" \"U\" (id 0) (at 0 0 0) (effects (font (size 1.27 1.27)) hide))"
        ));
        assert!(text.contains("(symbol \"AMP_0_1\""));
        assert!(text.contains("(start -5.08 -5.08)"));
        assert!(text.contains("(fill (type background))"));
        assert!(text.contains("(symbol \"AMP_1_1\""));
        assert!(text.contains("(pin input line (at -7.62 0 0) (length 2.54)\n"));
        assert!(text.contains("(name \"IN\" (effects (font (size 1.27 1.27))))"));
        assert!(text.contains("(alternate \"TX\" output line)"));
    }

    #[test]
    fn test_alias_output() {
        let mut alias = KicadSymbol::new("AMP2");
        alias.extends = Some("AMP".into());
        alias.properties.push(Property::hidden("Reference", "U", 0));
        let mut library = KicadLibrary::new();
        library.push(alias);
        let text = SexprWriter::new().render(&library);

        assert!(text.contains("(extends \"AMP\")"));
        assert!(!text.contains("AMP2_0_1"));
        assert!(!text.contains("in_bom"));
    }

    #[test]
    fn test_write_library_matches_render() {
        let mut library = KicadLibrary::new();
        library.push(sample_symbol());
        let writer = SexprWriter::new();
        let mut buffer = Vec::new();
        writer.write_library(&library, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), writer.render(&library));
    }
}
