//! Error types for reading, validating and resolving symbol tables

use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::layout::LayoutError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("CSV syntax error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Syntax { message, .. } => message,
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => format!("Unexpected {}", format_token(tok)),
                None => "Unexpected end of input".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("'{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::Token;
    match tok {
        Token::Comma => "','".to_string(),
        Token::Newline => "line break".to_string(),
        Token::Quoted(s) => format!("quoted field \"{}\"", s),
        Token::Bare(s) => format!("field '{}'", s),
        Token::Error => "unterminated quote or stray character".to_string(),
    }
}

/// Errors that make an input unusable as a whole
#[derive(Error, Debug)]
pub enum InputError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Syntax(ParseError),

    #[error("input contains no header rows")]
    Empty,
}

/// Which of the two header rows an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Symbol,
    Pin,
}

impl std::fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderKind::Symbol => write!(f, "symbol header"),
            HeaderKind::Pin => write!(f, "pin header"),
        }
    }
}

/// Header and table structure violations; fatal for the whole file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("pin header row is missing")]
    MissingPinHeader,

    #[error("column 0 of the symbol header must name a symbol column")]
    SymbolHeaderFirstColumn,

    #[error("column 0 of the pin header must be empty, found '{found}'")]
    PinHeaderFirstColumn { found: String },

    #[error("{header}: column '{label}' appears more than once")]
    DuplicateColumn { header: HeaderKind, label: String },

    #[error("{header}: missing required columns: {}", labels.join(", "))]
    MissingColumns {
        header: HeaderKind,
        labels: Vec<String>,
    },

    #[error("{header}: unknown columns: {}", labels.join(", "))]
    UnknownColumns {
        header: HeaderKind,
        labels: Vec<String>,
    },

    #[error("pin row appears before any symbol row")]
    OrphanPinRow,
}

/// Declaration and reference problems; fatal for one symbol
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SymbolError {
    #[error("symbol '{name}' already exists")]
    DuplicateSymbol { name: String },

    #[error("row has {count} fields but the header has only {columns} columns")]
    TooManyFields { count: usize, columns: usize },

    #[error("value '{value}' in column {column} has no header")]
    SurplusField { value: String, column: usize },

    #[error("a value is required for '{column}'")]
    ValueRequired { column: &'static str },

    #[error("invalid value '{value}' for '{column}' (expected {expected})")]
    InvalidValue {
        column: &'static str,
        value: String,
        expected: String,
    },

    #[error("'{column}' must be even, found {value}")]
    OddDimension { column: &'static str, value: i64 },

    #[error("symbol '{symbol}' cannot both derive from and extend another symbol")]
    DeriveAndExtend { symbol: String },

    #[error("no pin rows are allowed for the extending symbol '{symbol}'")]
    AliasWithPins { symbol: String },

    #[error("'{column}' is not allowed for the extending symbol '{symbol}'")]
    AliasAttribute {
        symbol: String,
        column: &'static str,
    },

    #[error("pin category '{category}' is only allowed in derived symbols")]
    EditInBaseSymbol { category: String },

    #[error("an 'overload' row must not carry a pin number")]
    OverloadWithNumber,

    #[error("'{category}' row needs a pin number or pin name as target")]
    MissingEditTarget { category: String },

    #[error("gap '{value}' needs a preceding delete/before/after row in a derived symbol")]
    GapWithoutMark { value: String },

    #[error("invalid gap '{value}'")]
    InvalidGap { value: String },

    #[error("bus '{number}' cannot declare alternate functions")]
    BusWithAlternates { number: String },

    #[error("alternate function of pin '{number}' must not be stacked")]
    StackedAlternate { number: String },

    #[error("alternate function of pin '{number}' differs in hidden flag from its primary")]
    AlternateVisibility { number: String },

    #[error("alternate function of pin '{number}' is on another side than its primary")]
    AlternateSide { number: String },

    #[error("stacked pin '{number}' has no preceding pin to stack onto")]
    StackWithoutPredecessor { number: String },

    #[error("duplicate pin number '{number}' in bus '{bus}'")]
    DuplicateBusBit { number: String, bus: String },

    #[error("duplicate pin number '{number}' in symbol '{symbol}'")]
    DuplicatePinNumber { number: String, symbol: String },

    #[error("base symbol '{base}' of '{symbol}' is not defined")]
    UnknownBase { base: String, symbol: String },

    #[error("base symbol '{base}' of '{symbol}' is defined later; bases must come first")]
    ForwardReference { base: String, symbol: String },

    #[error("symbol '{symbol}' derives from itself")]
    CircularDerivation { symbol: String },

    #[error("base symbol '{base}' of '{symbol}' failed and cannot be used")]
    BaseUnresolved { base: String, symbol: String },

    #[error("{edit} target {target} not found in base of symbol '{symbol}'")]
    EditTargetNotFound {
        edit: &'static str,
        target: String,
        symbol: String,
    },

    #[error("{edit} target {target} matches {count} pins in symbol '{symbol}'")]
    AmbiguousEditTarget {
        edit: &'static str,
        target: String,
        symbol: String,
        count: usize,
    },
}

/// Broad classification used for the process status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Input,
    Validation,
}

/// Any error the generator records as a diagnostic
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl GenerateError {
    pub fn class(&self) -> ErrorClass {
        match self {
            GenerateError::Input(_) => ErrorClass::Input,
            _ => ErrorClass::Validation,
        }
    }

    /// Short kind name used as the diagnostic prefix
    pub fn kind_name(&self) -> &'static str {
        match self {
            GenerateError::Input(_) => "InputError",
            GenerateError::Schema(_) => "SchemaError",
            GenerateError::Symbol(_) => "SymbolError",
            GenerateError::Layout(_) => "LayoutError",
        }
    }
}

/// Render a report with source context using ariadne
pub fn format_report(kind: &str, message: &str, filename: &str, source: &str, span: Span) -> String {
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(format!("{}: {}", kind, message))
        .with_label(
            Label::new((filename, span))
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);
    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{}: {}", kind, message),
    }
}
