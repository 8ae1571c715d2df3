//! Raw record types produced by the CSV grammar

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A value with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}

/// One CSV record with whitespace-stripped fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub fields: Vec<String>,
    pub span: Span,
}

impl Record {
    pub fn new(fields: Vec<String>, span: Span) -> Self {
        Self { fields, span }
    }

    /// True when every field is empty
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.is_empty())
    }

    /// True when the first non-empty field starts with `#`
    pub fn is_comment(&self) -> bool {
        self.fields
            .iter()
            .find(|f| !f.is_empty())
            .is_some_and(|f| f.starts_with('#'))
    }

    /// Field at `index`, or the empty string past the end of the record
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// A named CSV input together with its text
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// 1-based line number of a byte offset; `\r\n`, `\n` and a lone `\r`
    /// each end a line, as in the lexer
    pub fn line_of(&self, offset: usize) -> usize {
        let bytes = self.text.as_bytes();
        let end = offset.min(bytes.len());
        bytes[..end]
            .iter()
            .enumerate()
            .filter(|&(i, b)| *b == b'\n' || (*b == b'\r' && bytes.get(i + 1) != Some(&b'\n')))
            .count()
            + 1
    }
}
