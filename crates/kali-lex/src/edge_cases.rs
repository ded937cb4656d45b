//! Boundary behaviour and round-trip properties for the lexer.

use proptest::prelude::*;

use crate::{Lexer, TokenKind};

#[test]
fn comment_only_input_yields_comment_then_eof() {
    let mut lexer = Lexer::new("# nothing but a comment");
    assert!(matches!(lexer.next_token().kind, TokenKind::Comment(_)));
    assert!(lexer.next_token().is_eof());
}

#[test]
fn comment_at_end_of_input_terminates() {
    let mut lexer = Lexer::new("x # trailing");
    assert_eq!(lexer.next_token().kind, TokenKind::Ident("x".into()));
    assert_eq!(
        lexer.next_token().kind,
        TokenKind::Comment("# trailing".into())
    );
    assert!(lexer.next_token().is_eof());
}

#[test]
fn whitespace_only_input_is_eof() {
    let mut lexer = Lexer::new(" \t\r\n ");
    assert!(lexer.next_token().is_eof());
}

#[test]
fn crlf_advances_one_line_per_terminator_character() {
    let mut lexer = Lexer::new("a\r\nb");
    lexer.next_token();
    let b = lexer.next_token();
    // '\r' and '\n' each start a line.
    assert_eq!((b.span.line, b.span.column), (3, 1));
}

#[test]
fn adjacent_atoms_without_whitespace() {
    let kinds: Vec<_> = Lexer::new("f(x)+1;").map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident("f".into()),
            TokenKind::LParen,
            TokenKind::Ident("x".into()),
            TokenKind::RParen,
            TokenKind::Op('+'),
            TokenKind::Number("1".into()),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn lone_dot_is_a_number_atom() {
    let mut lexer = Lexer::new(".");
    assert_eq!(lexer.next_token().kind, TokenKind::Number(".".into()));
}

/// Re-lex a single printed token and return its kind.
fn relex(text: &str) -> TokenKind {
    Lexer::new(text).next_token().kind
}

proptest! {
    // Printing an atom's lexeme and lexing it again gives the same
    // atom kind back.
    #[test]
    fn identifier_lexemes_relex_to_the_same_kind(
        name in "[a-zA-Z][a-zA-Z0-9]{0,11}"
    ) {
        let kind = relex(&name);
        prop_assert_eq!(relex(&kind.to_string()), kind);
    }

    #[test]
    fn number_lexemes_relex_to_numbers(value in 0.0f64..1e12) {
        let printed = value.to_string();
        prop_assert_eq!(relex(&printed), TokenKind::Number(printed.clone()));
    }

    #[test]
    fn every_atom_in_a_stream_relexes(source in "[a-z0-9 ();,+*<>=#.\\n-]{0,40}") {
        for token in Lexer::new(&source) {
            let kind = relex(&token.kind.to_string());
            prop_assert_eq!(kind, token.kind);
        }
    }
}
