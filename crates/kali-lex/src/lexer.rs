//! The lexer proper.
//!
//! Classification happens in a fixed order: whitespace is skipped,
//! then identifier/keyword runs, number runs, comments, the
//! single-character atoms, operator characters, and finally anything
//! left over becomes an unknown atom. Unknown atoms are not errors;
//! the driver loop discards them and keeps reading.

use kali_util::Span;

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Streaming lexer over a source string.
///
/// # Example
///
/// ```
/// use kali_lex::{Lexer, TokenKind};
///
/// let mut lexer = Lexer::new("def f(x) x + 1");
/// assert_eq!(lexer.next_token().kind, TokenKind::Def);
/// assert_eq!(lexer.next_token().kind, TokenKind::Ident("f".into()));
/// ```
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Produce the next atom. Returns an `Eof` token forever once the
    /// input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.cursor.skip_whitespace();

        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        let kind = self.classify(start);
        let span = Span::new(start, self.cursor.position(), line, column);
        Token::new(kind, span)
    }

    fn classify(&mut self, start: usize) -> TokenKind {
        if self.cursor.is_at_end() {
            return TokenKind::Eof;
        }

        let c = self.cursor.current_char();

        // Identifier or keyword: alphabetic start, alphanumeric run.
        if c.is_ascii_alphabetic() {
            self.cursor.advance_while(|c| c.is_ascii_alphanumeric());
            let text = self.cursor.slice_from(start);
            return TokenKind::keyword(text)
                .unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        }

        // Number: maximal [0-9.] run. More than one '.' is allowed
        // here; the parser applies the longest-valid-prefix rule.
        if c.is_ascii_digit() || c == '.' {
            self.cursor.advance_while(|c| c.is_ascii_digit() || c == '.');
            return TokenKind::Number(self.cursor.slice_from(start).to_string());
        }

        // Comment: '#' through end of line or end of input.
        if c == '#' {
            self.cursor.advance_while(|c| c != '\n' && c != '\r');
            return TokenKind::Comment(self.cursor.slice_from(start).to_string());
        }

        self.cursor.advance();
        match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            c if TokenKind::is_operator_char(c) => TokenKind::Op(c),
            c => TokenKind::Unknown(c),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.is_eof() {
            None
        } else {
            Some(token)
        }
    }
}
