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

//! Operator table
//!
//! The scanner recognizes operators by maximal munch: it tries a
//! three-character candidate, then two, then one, so `2>>` wins over `2>`
//! and `>`  regardless of the order of entries below.

use super::TokenKind;

/// All operators recognized by the lexer
pub(super) const OPERATORS: &[(&str, TokenKind)] = &[
    ("<<<", TokenKind::HereString),
    ("2>>", TokenKind::AppendErr),
    (">>", TokenKind::AppendOut),
    ("2>", TokenKind::RedirErr),
    ("<<", TokenKind::HereDoc),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    ("->", TokenKind::Arrow),
    (">=", TokenKind::GtEq),
    ("<=", TokenKind::LtEq),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    (";", TokenKind::Semicolon),
    ("=", TokenKind::Eq),
    ("|", TokenKind::Pipe),
    ("&", TokenKind::Ampersand),
    (">", TokenKind::Gt),
    ("<", TokenKind::Lt),
    ("(", TokenKind::OpenParen),
    (")", TokenKind::CloseParen),
    ("{", TokenKind::OpenBrace),
    ("}", TokenKind::CloseBrace),
];

/// Looks up the token kind for an exact operator spelling.
pub(super) fn lookup(spelling: &str) -> Option<TokenKind> {
    OPERATORS
        .iter()
        .find(|&&(op, _)| op == spelling)
        .map(|&(_, kind)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_operators_of_every_length() {
        assert_eq!(lookup("<<<"), Some(TokenKind::HereString));
        assert_eq!(lookup("2>>"), Some(TokenKind::AppendErr));
        assert_eq!(lookup("&&"), Some(TokenKind::And));
        assert_eq!(lookup("|"), Some(TokenKind::Pipe));
        assert_eq!(lookup("x"), None);
    }
}
