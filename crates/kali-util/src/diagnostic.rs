//! Diagnostic reporting.
//!
//! All phases report problems through a shared [`Handler`]. A
//! diagnostic is plain text plus a severity and a [`Span`]; the
//! handler prints it to standard error as it arrives and keeps a copy
//! so the driver can decide the exit status afterwards. There is no
//! structured error format and no recovery machinery here; a parse
//! or lowering step that fails returns `None`/`Err` and the caller
//! resynchronises.

use std::cell::RefCell;
use std::fmt;

use crate::span::Span;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that makes the current item unusable.
    Error,
    /// A condition worth flagging that does not fail the item.
    Warning,
    /// Extra context attached to a preceding diagnostic.
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A single diagnostic message.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
    /// Follow-up lines printed beneath the main message.
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span == Span::DUMMY {
            write!(f, "{}: {}", self.level, self.message)?;
        } else {
            write!(
                f,
                "{}: {} at {}:{}",
                self.level, self.message, self.span.line, self.span.column
            )?;
        }
        for note in &self.notes {
            write!(f, "\nnote: {}", note)?;
        }
        Ok(())
    }
}

/// Fluent constructor for diagnostics.
///
/// ```
/// use kali_util::{DiagnosticBuilder, Handler, Span};
///
/// let handler = Handler::silent();
/// DiagnosticBuilder::error("expected )")
///     .span(Span::point(1, 7))
///     .emit(&handler);
/// assert!(handler.has_errors());
/// ```
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic::error(message, Span::DUMMY),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic::warning(message, Span::DUMMY),
        }
    }

    pub fn span(mut self, span: Span) -> Self {
        self.diagnostic.span = span;
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.diagnostic.notes.push(note.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        self.diagnostic
    }

    pub fn emit(self, handler: &Handler) {
        handler.emit(self.diagnostic);
    }
}

/// Collects diagnostics and relays them to standard error.
///
/// The handler is shared by reference between the parser, the
/// lowering pass, and the driver; interior mutability keeps the
/// borrow story simple for a single-threaded pipeline.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
    print: bool,
}

impl Handler {
    /// A handler that prints diagnostics to stderr as they arrive.
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            print: true,
        }
    }

    /// A handler that only collects. Used by tests that assert on
    /// messages without spamming the test output.
    pub fn silent() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            print: false,
        }
    }

    /// Record a diagnostic, printing it if this handler prints.
    pub fn emit(&self, diagnostic: Diagnostic) {
        if self.print {
            eprintln!("{}", diagnostic);
        }
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Shorthand for emitting an error with a span.
    pub fn error(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::error(message, span));
    }

    /// Whether any error-level diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Number of error-level diagnostics so far.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Snapshot of everything emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}
