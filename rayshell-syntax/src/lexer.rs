// This file is part of rayshell, an interactive shell with job control.
// Copyright (C) 2026 RayShell Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Lexical analysis
//!
//! The [`Lexer`] scans a line (or a whole script) of source text into a
//! vector of [`Token`]s terminated by [`TokenKind::EndOfInput`]. Scanning
//! rules, in the order they are tried:
//!
//! - `#` at the start of a token begins a comment running to the end of the
//!   line; the newline itself is not part of the comment.
//! - Whitespace separates tokens; a newline additionally yields a
//!   [`TokenKind::Newline`] token.
//! - `'…'` yields a [`TokenKind::String`] token with `\x` literalized to
//!   `x`. `"…"` yields a [`TokenKind::DString`] token with escape sequences
//!   kept verbatim; the expansion pass interprets them together with the
//!   interior variable references.
//! - `@name`, `$name`, `@{name}`, and `${name}` yield [`TokenKind::Var`]
//!   tokens holding the bare name. `?` and `$` are accepted as
//!   one-character names so `$?` and `$$` scan as variables.
//! - Operators are matched by maximal munch against the table in [`op`],
//!   longest first.
//! - Anything else accumulates into a [`TokenKind::Word`].
//!
//! Reserved words such as `if` are not distinguished here; they come out as
//! ordinary `Word` tokens and the parser inspects their spelling.

mod op;

use crate::source::Location;
use strum::Display;
use thiserror::Error;

/// Classes of tokens produced by the lexer
///
/// The `Display` spelling of each kind matches the catalog used in
/// diagnostics (`WORD`, `DSTRING`, `APPEND_ERR`, …).
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Word,
    /// Single-quoted literal
    String,
    /// Double-quoted, expansion-bearing string
    #[strum(serialize = "DSTRING")]
    DString,
    /// Variable reference (`@name` or `$name`)
    Var,
    Pipe,
    And,
    Or,
    Eq,
    Semicolon,
    Ampersand,
    Gt,
    Lt,
    GtEq,
    LtEq,
    EqEq,
    NotEq,
    /// `>>`
    AppendOut,
    /// `2>`
    RedirErr,
    /// `2>>`
    AppendErr,
    /// `<<`
    HereDoc,
    /// `<<<`
    HereString,
    /// `->`
    Arrow,
    #[strum(serialize = "LPAREN")]
    OpenParen,
    #[strum(serialize = "RPAREN")]
    CloseParen,
    #[strum(serialize = "LBRACE")]
    OpenBrace,
    #[strum(serialize = "RBRACE")]
    CloseBrace,
    Newline,
    #[strum(serialize = "EOF")]
    EndOfInput,
}

/// Token with the position of its first character
///
/// For quoted strings the lexeme is the interior text; for variables it is
/// the bare name. Tokens are immutable; the parser only advances a cursor
/// over them.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: Location,
}

/// Types of errors raised while scanning
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum LexErrorCause {
    /// A single or double quotation lacks its closing mate.
    #[error("unterminated quote")]
    UnterminatedQuote,
    /// A `@{`/`${` variable reference lacks its closing `}`.
    #[error("unclosed braced variable")]
    UnclosedBracedVariable,
    /// A `@`/`$` sigil is not followed by a variable name.
    #[error("variable name expected")]
    EmptyVariableName,
}

/// Scanning error bundled with the position it occurred at
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("{cause} at {location}")]
pub struct LexError {
    pub cause: LexErrorCause,
    pub location: Location,
}

/// Scanner turning source text into tokens
#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: u64,
    column: u64,
    tokens: Vec<Token>,
    word: String,
    word_start: Location,
}

impl Lexer {
    /// Creates a lexer over the given source text.
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            word: String::new(),
            word_start: Location::default(),
        }
    }

    /// Scans the whole input.
    ///
    /// On success the returned vector always ends with an
    /// [`TokenKind::EndOfInput`] token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            let Some(ch) = self.peek() else {
                self.flush_word();
                let location = self.location();
                self.push(TokenKind::EndOfInput, String::new(), location);
                break;
            };

            if ch == '#' && self.word.is_empty() {
                // The newline is left in place so it still yields NEWLINE.
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            if ch.is_whitespace() {
                self.flush_word();
                let location = self.location();
                self.advance();
                if ch == '\n' {
                    self.push(TokenKind::Newline, "\n".to_owned(), location);
                }
                continue;
            }

            match ch {
                '\'' => {
                    self.flush_word();
                    self.quoted('\'', TokenKind::String, true)?;
                }
                '"' => {
                    self.flush_word();
                    self.quoted('"', TokenKind::DString, false)?;
                }
                '@' | '$' => {
                    self.flush_word();
                    self.variable()?;
                }
                _ => {
                    if let Some((lexeme, kind)) = self.match_operator() {
                        self.flush_word();
                        let location = self.location();
                        for _ in 0..lexeme.chars().count() {
                            self.advance();
                        }
                        self.push(kind, lexeme, location);
                    } else {
                        if self.word.is_empty() {
                            self.word_start = self.location();
                        }
                        self.word.push(ch);
                        self.advance();
                    }
                }
            }
        }
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.index).copied()?;
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn location(&self) -> Location {
        Location { line: self.line, column: self.column }
    }

    fn push(&mut self, kind: TokenKind, lexeme: String, location: Location) {
        self.tokens.push(Token { kind, lexeme, location });
    }

    fn flush_word(&mut self) {
        if !self.word.is_empty() {
            let lexeme = std::mem::take(&mut self.word);
            let location = self.word_start;
            self.push(TokenKind::Word, lexeme, location);
        }
    }

    /// Scans a quoted string after the opening quote has been peeked.
    ///
    /// With `literalize`, `\x` sequences collapse to `x` (single quotes);
    /// without, they are kept verbatim for the expansion pass (double
    /// quotes), which also prevents an escaped delimiter from terminating
    /// the string.
    fn quoted(
        &mut self,
        delimiter: char,
        kind: TokenKind,
        literalize: bool,
    ) -> Result<(), LexError> {
        let opening = self.location();
        self.advance();
        let mut text = String::new();
        loop {
            match self.advance() {
                None => {
                    let cause = LexErrorCause::UnterminatedQuote;
                    return Err(LexError { cause, location: opening });
                }
                Some(c) if c == delimiter => break,
                Some('\\') => {
                    if !literalize {
                        text.push('\\');
                    }
                    if let Some(escaped) = self.advance() {
                        text.push(escaped);
                    }
                }
                Some(c) => text.push(c),
            }
        }
        self.push(kind, text, opening);
        Ok(())
    }

    /// Scans a variable reference after the `@`/`$` sigil has been peeked.
    fn variable(&mut self) -> Result<(), LexError> {
        let opening = self.location();
        self.advance();
        let name = match self.peek() {
            Some('{') => {
                self.advance();
                let mut name = String::new();
                loop {
                    match self.advance() {
                        None => {
                            let cause = LexErrorCause::UnclosedBracedVariable;
                            return Err(LexError { cause, location: opening });
                        }
                        Some('}') => break,
                        Some(c) => name.push(c),
                    }
                }
                name
            }
            Some('?') => {
                self.advance();
                "?".to_owned()
            }
            Some('$') => {
                self.advance();
                "$".to_owned()
            }
            _ => {
                let mut name = String::new();
                while let Some(c) = self.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
                name
            }
        };
        if name.is_empty() {
            let cause = LexErrorCause::EmptyVariableName;
            return Err(LexError { cause, location: opening });
        }
        self.push(TokenKind::Var, name, opening);
        Ok(())
    }

    fn match_operator(&self) -> Option<(String, TokenKind)> {
        for len in (1..=3).rev() {
            if self.index + len <= self.chars.len() {
                let candidate: String =
                    self.chars[self.index..self.index + len].iter().collect();
                if let Some(kind) = op::lookup(&candidate) {
                    return Some((candidate, kind));
                }
            }
        }
        None
    }
}
