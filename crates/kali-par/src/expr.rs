//! Expression parsing via precedence climbing.
//!
//! Operator precedence (higher binds tighter):
//!
//! | Operator | Precedence |
//! |----------|------------|
//! | `:`      | 1          |
//! | `=`      | 2          |
//! | `\|`     | 5          |
//! | `&`      | 6          |
//! | `<` `>`  | 10         |
//! | `+` `-`  | 20         |
//! | `*` `/`  | 40         |
//!
//! Anything else is not a binary operator and terminates the climb.
//! Operators of equal precedence associate left; a higher-precedence
//! operator after the right operand triggers a recursive climb with
//! `precedence + 1`, nesting it on the right.

use kali_util::Span;

use crate::ast::{Binding, Expr, ExprKind};
use crate::Parser;
use kali_lex::TokenKind;

/// Binding strength of a binary operator character, or -1 when the
/// character is not one.
pub fn precedence(op: char) -> i32 {
    match op {
        ':' => 1,
        '=' => 2,
        '|' => 5,
        '&' => 6,
        '<' | '>' => 10,
        '+' | '-' => 20,
        '*' | '/' => 40,
        _ => -1,
    }
}

/// Convert a number lexeme the way `strtod` would: the full text if
/// it parses, otherwise the longest valid prefix (the run up to the
/// second `.`), otherwise 0.0.
fn parse_double(text: &str) -> f64 {
    if let Ok(value) = text.parse() {
        return value;
    }
    let mut seen_dot = false;
    let end = text
        .find(|c: char| {
            if c == '.' {
                if seen_dot {
                    return true;
                }
                seen_dot = true;
            }
            false
        })
        .unwrap_or(text.len());
    text[..end].parse().unwrap_or(0.0)
}

impl<'a> Parser<'a> {
    /// expression := unary (binop unary)*
    pub fn parse_expression(&mut self) -> Option<Expr> {
        let lhs = self.parse_unary()?;
        self.parse_binop_rhs(0, lhs)
    }

    /// The precedence-climbing loop. Consumes operators binding at
    /// least as tightly as `min_precedence` and folds them into
    /// left-associated `Binary` nodes.
    fn parse_binop_rhs(&mut self, min_precedence: i32, mut lhs: Expr) -> Option<Expr> {
        loop {
            let op = match self.current_op() {
                Some(op) if precedence(op) >= min_precedence => op,
                _ => return Some(lhs),
            };
            self.bump();

            let mut rhs = self.parse_unary()?;

            // A tighter operator after the right operand claims it.
            if let Some(next) = self.current_op() {
                if precedence(next) > precedence(op) {
                    rhs = self.parse_binop_rhs(precedence(op) + 1, rhs)?;
                }
            }

            let span = lhs.span;
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
    }

    /// unary := OP unary | primary
    ///
    /// No unary operator is defined yet; the node parses and lowering
    /// rejects it.
    fn parse_unary(&mut self) -> Option<Expr> {
        if let Some(op) = self.current_op() {
            let span = self.current().span;
            self.bump();
            let operand = self.parse_unary()?;
            return Some(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_primary()
    }

    /// primary := number | identifier_ref | paren | if | for | var
    fn parse_primary(&mut self) -> Option<Expr> {
        let span = self.current().span;
        match self.current().kind.clone() {
            TokenKind::Number(text) => {
                self.bump();
                Some(Expr::new(ExprKind::Number(parse_double(&text)), span))
            }
            TokenKind::Ident(name) => self.parse_identifier_ref(name, span),
            TokenKind::LParen => self.parse_paren(),
            TokenKind::If => self.parse_if(span),
            TokenKind::For => self.parse_for(span),
            TokenKind::Var => self.parse_var(span),
            other => {
                self.handler_error(format!("Unknown token {{{}}}", other), span);
                None
            }
        }
    }

    /// identifier_ref := IDENT [ '(' arglist ')' ]
    fn parse_identifier_ref(&mut self, name: String, span: Span) -> Option<Expr> {
        self.bump(); // identifier

        if self.current().kind != TokenKind::LParen {
            return Some(Expr::new(ExprKind::Variable(name), span));
        }
        self.bump(); // '('

        let mut args = Vec::new();
        if self.current().kind != TokenKind::RParen {
            loop {
                args.push(self.parse_expression()?);

                if self.current().kind == TokenKind::RParen {
                    break;
                }
                if self.current().kind != TokenKind::Comma {
                    self.handler_error(
                        "Expected ')' or ',' in argument list",
                        self.current().span,
                    );
                    return None;
                }
                self.bump(); // ','
            }
        }
        self.bump(); // ')'

        Some(Expr::new(ExprKind::Call { callee: name, args }, span))
    }

    /// paren := '(' expression ')'
    fn parse_paren(&mut self) -> Option<Expr> {
        self.bump(); // '('
        let expr = self.parse_expression()?;
        if self.current().kind != TokenKind::RParen {
            self.handler_error("expected )", self.current().span);
            return None;
        }
        self.bump(); // ')'
        Some(expr)
    }

    /// if := 'if' expression 'then' expression 'else' expression
    fn parse_if(&mut self, span: Span) -> Option<Expr> {
        self.bump(); // 'if'
        let cond = self.parse_expression()?;

        if self.current().kind != TokenKind::Then {
            self.handler_error("Expected `then`", self.current().span);
            return None;
        }
        self.bump();
        let then = self.parse_expression()?;

        if self.current().kind != TokenKind::Else {
            self.handler_error("Expected `else`", self.current().span);
            return None;
        }
        self.bump();
        let otherwise = self.parse_expression()?;

        Some(Expr::new(
            ExprKind::If {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        ))
    }

    /// for := 'for' IDENT '=' expression ',' expression
    ///        [',' expression] 'in' expression
    fn parse_for(&mut self, span: Span) -> Option<Expr> {
        self.bump(); // 'for'

        let var = match self.current().kind.clone() {
            TokenKind::Ident(name) => name,
            _ => {
                self.handler_error("expected identifier after for", self.current().span);
                return None;
            }
        };
        self.bump();

        if self.current_op() != Some('=') {
            self.handler_error("expected '=' after for", self.current().span);
            return None;
        }
        self.bump();
        let start = self.parse_expression()?;

        if self.current().kind != TokenKind::Comma {
            self.handler_error("expected ',' after for start value", self.current().span);
            return None;
        }
        self.bump();
        let end = self.parse_expression()?;

        let step = if self.current().kind == TokenKind::Comma {
            self.bump();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        if self.current().kind != TokenKind::In {
            self.handler_error("expected 'in' after for", self.current().span);
            return None;
        }
        self.bump();
        let body = self.parse_expression()?;

        Some(Expr::new(
            ExprKind::For {
                var,
                start: Box::new(start),
                end: Box::new(end),
                step,
                body: Box::new(body),
            },
            span,
        ))
    }

    /// var := 'var' binding (',' binding)* 'in' expression
    /// binding := IDENT [ '=' expression ]
    fn parse_var(&mut self, span: Span) -> Option<Expr> {
        self.bump(); // 'var'

        if !matches!(self.current().kind, TokenKind::Ident(_)) {
            self.handler_error("Expected identifier list after `var`", self.current().span);
            return None;
        }

        let mut bindings = Vec::new();
        loop {
            let name = match self.current().kind.clone() {
                TokenKind::Ident(name) => name,
                _ => {
                    self.handler_error("Expected at least one identifier", self.current().span);
                    return None;
                }
            };
            self.bump();

            let init = if self.current_op() == Some('=') {
                self.bump();
                Some(self.parse_expression()?)
            } else {
                None
            };
            bindings.push(Binding { name, init });

            if self.current().kind != TokenKind::Comma {
                break;
            }
            self.bump();
        }

        if self.current().kind != TokenKind::In {
            self.handler_error("Expected `in` keyword after `var`", self.current().span);
            return None;
        }
        self.bump();
        let body = self.parse_expression()?;

        Some(Expr::new(
            ExprKind::VarIn {
                bindings,
                body: Box::new(body),
            },
            span,
        ))
    }

    /// The lookahead as an operator character, if it is one.
    fn current_op(&self) -> Option<char> {
        match self.current().kind {
            TokenKind::Op(c) => Some(c),
            _ => None,
        }
    }

    fn handler_error(&self, message: impl Into<String>, span: Span) {
        self.handler.error(message, span);
    }
}
