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

//! This crate defines the syntax of the rayshell command language.
//!
//! Source text is scanned by the [lexer](lexer::Lexer) into a vector of
//! [tokens](lexer::Token), which the [parser](parser::Parser) turns into the
//! abstract syntax tree defined in the [`syntax`] module. Both stages report
//! errors carrying the [`source::Location`] of the offending input so that
//! later stages can point back at the original text.
//!
//! The syntax tree is generic over its word representation: the parser
//! produces [`syntax::Node`]`<`[`syntax::Word`]`>`, in which every word still
//! carries its quoting tag, and the expansion pass in the semantics crate
//! replaces the words with plain strings. Nodes serialize to a stable JSON
//! shape used by the AST dump facility.

pub mod lexer;
pub mod parser;
pub mod source;
pub mod syntax;
