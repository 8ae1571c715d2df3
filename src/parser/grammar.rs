//! CSV record grammar using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::Record;
use crate::parser::lexer::Token;

/// Parse CSV text into records
///
/// Every physical record is returned, blank and comment records included;
/// field values are stripped of surrounding whitespace.
pub fn parse(input: &str) -> Result<Vec<Record>, Vec<crate::ParseError>> {
    let len = input.len();

    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    table_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn table_parser<'a, I>() -> impl Parser<'a, I, Vec<Record>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // A field may be split into several fragments, e.g. ` "quoted" ` lexes
    // as bare whitespace around a quoted part.
    let fragment = select! {
        Token::Bare(s) => s,
        Token::Quoted(s) => s,
    }
    .labelled("field");

    let field = fragment
        .repeated()
        .collect::<Vec<String>>()
        .map(|parts| parts.concat().trim().to_string());

    let record = field
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
        .map_with(|fields, e| Record::new(fields, span_range(&e.span())));

    record
        .separated_by(just(Token::Newline))
        .collect::<Vec<_>>()
        .then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(input: &str) -> Vec<Vec<String>> {
        parse(input)
            .expect("Should parse")
            .into_iter()
            .map(|r| r.fields)
            .collect()
    }

    #[test]
    fn test_simple_table() {
        assert_eq!(
            fields("a, b ,c\n,1,"),
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec![String::new(), "1".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn test_quoted_field_keeps_commas() {
        assert_eq!(
            fields(r#",  "1,2,3" ,D$"#),
            vec![vec![String::new(), "1,2,3".to_string(), "D$".to_string()]]
        );
    }

    #[test]
    fn test_trailing_newline_yields_blank_record() {
        let records = parse("a\n").expect("Should parse");
        assert_eq!(records.len(), 2);
        assert!(records[1].is_blank());
    }

    #[test]
    fn test_record_spans() {
        let records = parse("ab,c\nxyz").expect("Should parse");
        assert_eq!(records[0].span, 0..4);
        assert_eq!(records[1].span, 5..8);
    }

    #[test]
    fn test_unterminated_quote_fails() {
        let errors = parse("a,\"open\n").unwrap_err();
        assert!(!errors.is_empty());
    }
}
