//! Parser boundary behaviour.

use kali_lex::TokenKind;
use kali_util::Handler;

use crate::{ExprKind, Parser};

#[test]
fn empty_input_parses_nothing() {
    let handler = Handler::silent();
    let mut parser = Parser::new("", &handler);
    assert!(parser.current().is_eof());
    assert!(parser.parse_top_level().is_none());
    assert!(handler.has_errors());
}

#[test]
fn trailing_comma_in_argument_list_is_an_error() {
    let handler = Handler::silent();
    let mut parser = Parser::new("f(x,)", &handler);
    assert!(parser.parse_expression().is_none());
    assert!(handler.has_errors());
}

#[test]
fn failure_leaves_stream_for_resynchronisation() {
    let handler = Handler::silent();
    let mut parser = Parser::new("def 1bad(x) x; def ok(a) a", &handler);

    assert!(parser.parse_definition().is_none());
    // The host loop consumes one atom and keeps going; after skipping
    // the offending atoms it reaches the next definition intact.
    while parser.current().kind != TokenKind::Def {
        assert!(!parser.current().is_eof());
        parser.bump();
    }
    let def = parser.parse_definition().unwrap();
    assert_eq!(def.prototype.name, "ok");
}

#[test]
fn var_requires_at_least_one_binding() {
    let handler = Handler::silent();
    let mut parser = Parser::new("var in 1", &handler);
    assert!(parser.parse_expression().is_none());
    assert_eq!(
        handler.diagnostics()[0].message,
        "Expected identifier list after `var`"
    );
}

#[test]
fn var_with_dangling_comma_is_an_error() {
    let handler = Handler::silent();
    let mut parser = Parser::new("var a = 1, in a", &handler);
    assert!(parser.parse_expression().is_none());
    assert_eq!(
        handler.diagnostics()[0].message,
        "Expected at least one identifier"
    );
}

#[test]
fn multi_dot_number_converts_to_longest_prefix() {
    let handler = Handler::silent();
    let mut parser = Parser::new("1.2.3 + 1", &handler);
    let expr = parser.parse_expression().unwrap();
    match expr.kind {
        ExprKind::Binary { lhs, .. } => assert_eq!(lhs.kind, ExprKind::Number(1.2)),
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn comment_inside_expression_is_not_skipped() {
    // Comments are atoms; only the driver loop discards them. Inside
    // an expression they are as unexpected as any other stray atom.
    let handler = Handler::silent();
    let mut parser = Parser::new("1 + # boom\n2", &handler);
    assert!(parser.parse_expression().is_none());
    assert!(handler.has_errors());
}

#[test]
fn deeply_nested_parentheses() {
    let handler = Handler::silent();
    let mut parser = Parser::new("((((((x))))))", &handler);
    let expr = parser.parse_expression().unwrap();
    assert_eq!(expr.kind, ExprKind::Variable("x".into()));
}

#[test]
fn keywords_do_not_parse_as_variables() {
    let handler = Handler::silent();
    let mut parser = Parser::new("then", &handler);
    assert!(parser.parse_expression().is_none());
    assert_eq!(handler.diagnostics()[0].message, "Unknown token {then}");
}
