//! kali-util - Shared infrastructure for the Kaleidoscope front end.
//!
//! Everything the other phases have in common lives here: source
//! spans and the diagnostic handler the lexer, parser, and lowering
//! pass all report through.

pub mod diagnostic;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use span::Span;
