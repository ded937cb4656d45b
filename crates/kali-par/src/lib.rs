//! kali-par - Recursive-descent parser for the Kaleidoscope front end.
//!
//! The parser owns the lexer and a single token of lookahead. Three
//! entry points mirror what the driver loop dispatches on:
//!
//! - [`Parser::parse_definition`]: current atom is `def`; returns a
//!   full function definition.
//! - [`Parser::parse_extern`]: current atom is `extern`; returns a
//!   prototype.
//! - [`Parser::parse_top_level`]: parses one expression and wraps it
//!   in an anonymous zero-parameter definition.
//!
//! Every entry point returns `Option`: a failed step reports one
//! diagnostic through the [`Handler`] and yields `None`, leaving the
//! token stream wherever the failure was noticed. Recovery is the
//! caller's job (the driver consumes one atom and retries).

pub mod ast;
mod expr;

#[cfg(test)]
mod edge_cases;

pub use ast::{Binding, Expr, ExprKind, Function, Prototype, ANONYMOUS_FUNCTION_NAME};

use kali_lex::{Lexer, Token, TokenKind};
use kali_util::Handler;

pub struct Parser<'a> {
    lexer: Lexer<'a>,

    /// One-token lookahead.
    current: Token,

    /// Diagnostic sink shared with the rest of the pipeline.
    handler: &'a Handler,
}

impl<'a> Parser<'a> {
    /// Create a parser over `source`, priming the lookahead.
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            handler,
        }
    }

    /// The lookahead token.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Advance one atom. At end of input this keeps returning eof.
    pub fn bump(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// definition := 'def' prototype expression
    pub fn parse_definition(&mut self) -> Option<Function> {
        let span = self.current.span;
        self.bump(); // 'def'

        let prototype = self.parse_prototype()?;
        let body = self.parse_expression()?;
        Some(Function {
            prototype,
            body,
            span,
        })
    }

    /// extern := 'extern' prototype
    pub fn parse_extern(&mut self) -> Option<Prototype> {
        self.bump(); // 'extern'
        self.parse_prototype()
    }

    /// top := expression, wrapped in an anonymous definition the
    /// caller may erase after lowering and inspection.
    pub fn parse_top_level(&mut self) -> Option<Function> {
        let span = self.current.span;
        let body = self.parse_expression()?;
        Some(Function {
            prototype: Prototype::anonymous(span),
            body,
            span,
        })
    }

    /// prototype := IDENT '(' IDENT* ')'
    ///
    /// Parameters are separated by whitespace alone; all of them are
    /// doubles so no type annotations exist.
    fn parse_prototype(&mut self) -> Option<Prototype> {
        let span = self.current.span;
        let name = match self.current.kind.clone() {
            TokenKind::Ident(name) => name,
            _ => {
                self.error("Expected function name in prototype");
                return None;
            }
        };
        self.bump();

        if self.current.kind != TokenKind::LParen {
            self.error("Expected '(' in prototype");
            return None;
        }
        self.bump();

        let mut params = Vec::new();
        while let TokenKind::Ident(param) = self.current.kind.clone() {
            params.push(param);
            self.bump();
        }

        if self.current.kind != TokenKind::RParen {
            self.error("Expected ')' in prototype");
            return None;
        }
        self.bump();

        Some(Prototype::new(name, params, span))
    }

    /// Report an error at the lookahead's location.
    fn error(&self, message: impl Into<String>) {
        self.handler.error(message, self.current.span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kali_util::Handler;

    fn parse_def(source: &str) -> Option<Function> {
        let handler = Handler::silent();
        let mut parser = Parser::new(source, &handler);
        parser.parse_definition()
    }

    #[test]
    fn test_definition() {
        let def = parse_def("def add(a b) a + b").unwrap();
        assert_eq!(def.prototype.name, "add");
        assert_eq!(def.prototype.params, vec!["a", "b"]);
        assert!(!def.prototype.is_anonymous);
        assert_eq!(def.body.to_string(), "(a + b)");
    }

    #[test]
    fn test_zero_parameter_definition() {
        let def = parse_def("def one() 1").unwrap();
        assert!(def.prototype.params.is_empty());
    }

    #[test]
    fn test_extern() {
        let handler = Handler::silent();
        let mut parser = Parser::new("extern sin(x)", &handler);
        let proto = parser.parse_extern().unwrap();
        assert_eq!(proto.name, "sin");
        assert_eq!(proto.arity(), 1);
    }

    #[test]
    fn test_top_level_is_anonymous() {
        let handler = Handler::silent();
        let mut parser = Parser::new("1 + 2", &handler);
        let def = parser.parse_top_level().unwrap();
        assert_eq!(def.prototype.name, ANONYMOUS_FUNCTION_NAME);
        assert!(def.prototype.is_anonymous);
        assert_eq!(def.body.to_string(), "(1 + 2)");
    }

    #[test]
    fn test_prototype_errors() {
        for (source, message) in [
            ("def 1(x) x", "Expected function name in prototype"),
            ("def f x) x", "Expected '(' in prototype"),
            ("def f(x x", "Expected ')' in prototype"),
        ] {
            let handler = Handler::silent();
            let mut parser = Parser::new(source, &handler);
            assert!(parser.parse_definition().is_none(), "{}", source);
            assert_eq!(handler.diagnostics()[0].message, message, "{}", source);
        }
    }

    #[test]
    fn test_definition_span_is_def_keyword() {
        let handler = Handler::silent();
        let mut parser = Parser::new("  def f(x) x", &handler);
        let def = parser.parse_definition().unwrap();
        assert_eq!(def.span.column, 3);
        assert_eq!(def.prototype.span.column, 7);
    }

    #[test]
    fn test_stream_position_after_definition() {
        let handler = Handler::silent();
        let mut parser = Parser::new("def f(x) x def g(y) y", &handler);
        assert!(parser.parse_definition().is_some());
        // Lookahead now sits on the next `def`.
        assert_eq!(parser.current().kind, TokenKind::Def);
        assert!(parser.parse_definition().is_some());
        assert!(parser.current().is_eof());
    }
}
