//! AST node definitions.
//!
//! The tree is a tagged variant with a uniform [`Span`]: every node
//! records the location of the first atom that produced it, and a
//! parent owns its children outright. `Display` renders the
//! parenthesized dump used by tests and by hand when debugging
//! precedence questions.

use std::fmt;

use kali_util::Span;

/// Name given to the wrapper function around a top-level expression.
/// The driver erases it from the module after inspection.
pub const ANONYMOUS_FUNCTION_NAME: &str = "__anon_expr";

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The expression variants of the language.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal.
    Number(f64),

    /// Reference to a named binding.
    Variable(String),

    /// Prefix operator application. No operator is currently defined,
    /// so these parse but are rejected during lowering.
    Unary { op: char, operand: Box<Expr> },

    /// Infix operator application.
    Binary {
        op: char,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Call of a named function.
    Call { callee: String, args: Vec<Expr> },

    /// `if cond then a else b`; evaluates to the taken branch.
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    /// `for name = start, end[, step] in body`; evaluates to 0.0.
    For {
        var: String,
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
    },

    /// `var name [= init][, ...] in body`; bindings shadow for the
    /// duration of the body and evaluate to the body's value.
    VarIn {
        bindings: Vec<Binding>,
        body: Box<Expr>,
    },
}

/// One `name [= initializer]` entry of a `var ... in` expression.
/// A missing initializer defaults to 0.0 at lowering.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub init: Option<Expr>,
}

/// A function prototype: name plus parameter names. All parameters
/// and the return value are doubles, so no types are recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
    pub span: Span,
    /// Set on the wrapper around a top-level expression so the
    /// caller knows to erase it after inspection.
    pub is_anonymous: bool,
}

impl Prototype {
    pub fn new(name: impl Into<String>, params: Vec<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            params,
            span,
            is_anonymous: false,
        }
    }

    /// The zero-parameter prototype wrapping a top-level expression.
    pub fn anonymous(span: Span) -> Self {
        Self {
            name: ANONYMOUS_FUNCTION_NAME.to_string(),
            params: Vec::new(),
            span,
            is_anonymous: true,
        }
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A function definition: prototype plus body expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub prototype: Prototype,
    pub body: Expr,
    pub span: Span,
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(value) => write!(f, "{}", value),
            ExprKind::Variable(name) => write!(f, "{}", name),
            ExprKind::Unary { op, operand } => write!(f, "({}{})", op, operand),
            ExprKind::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            // The structured forms parse their body greedily, so the
            // dump parenthesizes them to survive a re-parse in binary
            // operator position.
            ExprKind::If {
                cond,
                then,
                otherwise,
            } => write!(f, "(if {} then {} else {})", cond, then, otherwise),
            ExprKind::For {
                var,
                start,
                end,
                step,
                body,
            } => {
                write!(f, "(for {} = {}, {}", var, start, end)?;
                if let Some(step) = step {
                    write!(f, ", {}", step)?;
                }
                write!(f, " in {})", body)
            }
            ExprKind::VarIn { bindings, body } => {
                write!(f, "(var ")?;
                for (i, binding) in bindings.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", binding.name)?;
                    if let Some(init) = &binding.init {
                        write!(f, " = {}", init)?;
                    }
                }
                write!(f, " in {})", body)
            }
        }
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(" "))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prototype.is_anonymous {
            write!(f, "{}", self.body)
        } else {
            write!(f, "def {} {}", self.prototype, self.body)
        }
    }
}
