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

//! Definition of errors that happen in the parser

use crate::source::Location;
use thiserror::Error;

/// Types of syntax errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum SyntaxError {
    /// A redirection operator is not followed by a word naming its target.
    #[error("file name required after redirection")]
    ExpectedRedirTarget,
    /// A redirection appears without a command to apply to.
    #[error("redirection requires a command")]
    MissingCommandName,
    /// An `elif` appears outside an if statement.
    #[error("`elif` without a matching `if`")]
    UnopenedElif,
    /// An `else` appears outside an if statement.
    #[error("`else` without a matching `if`")]
    UnopenedElse,
    /// An `if` or `elif` is not followed by a parenthesized condition.
    #[error("expected `(` after `{keyword}`")]
    MissingCondition { keyword: &'static str },
    /// A condition lacks its closing parenthesis.
    #[error("expected `)` after condition")]
    UnclosedCondition,
    /// The `->` is missing after a condition or `else`.
    #[error("expected `->`")]
    MissingArrow,
    /// A block lacks its opening brace.
    #[error("expected `{{` to start a block")]
    MissingBlockOpen,
    /// A block lacks its closing brace.
    #[error("expected `}}` to close a block")]
    UnclosedBlock,
    /// A condition contains a token that cannot start an operand.
    #[error("unexpected token `{0}` in condition")]
    InvalidConditionToken(String),
    /// A token appears where no production can consume it.
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),
    /// A reserved word whose grammar is not implemented yet.
    #[error("`{0}` is not implemented yet")]
    NotImplemented(String),
}

/// Syntax error bundled with the position of the offending token
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause} at {location}")]
pub struct Error {
    pub cause: SyntaxError,
    pub location: Location,
}

/// Result type for parser functions
pub type Result<T> = std::result::Result<T, Error>;
