//! kali-lex - Lexical analysis for the Kaleidoscope front end.
//!
//! Turns a source string into a stream of atoms. The [`Cursor`] is
//! the character source: it hands out one character at a time and
//! keeps (line, column) in sync with what has been consumed. The
//! [`Lexer`] sits on top and classifies maximal character runs into
//! [`Token`]s, each stamped with the location of its first character.
//!
//! There are no lexical errors: anything unrecognisable becomes a
//! [`TokenKind::Unknown`] atom, which the driver loop skips.

pub mod cursor;
mod lexer;
mod token;

#[cfg(test)]
mod edge_cases;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
