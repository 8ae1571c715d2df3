//! CSV lexer using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[token(",")]
    Comma,

    #[regex(r"\r\n|\n|\r")]
    Newline,

    // Quoted field content, `""` unescaped to `"`
    #[regex(r#""([^"]|"")*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].replace("\"\"", "\"")
    })]
    Quoted(String),

    #[regex(r#"[^,"\r\n]+"#, |lex| lex.slice().to_string())]
    Bare(String),

    /// Anything the lexer could not match, e.g. an unterminated quote
    Error,
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| (tok.unwrap_or(Token::Error), span))
}
