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

//! Abstract syntax tree
//!
//! [`Node`] is the tagged union of everything the parser can produce. It is
//! generic over the word representation `W`: the parser emits `Node<Word>`,
//! where every word still carries its quoting tag, and the expansion pass
//! emits `Node<String>`, in which all words are plain strings. Code that
//! consumes an expanded tree can therefore not observe a pre-expansion tag
//! by construction.
//!
//! Nodes serialize to a stable JSON shape: an object whose `"type"` key
//! names the node kind in capitals and whose remaining keys are the node's
//! attributes in camelCase. Tagged words serialize as `[tag, text]` pairs,
//! operators as their surface spelling. Tests may rely on this shape; the
//! AST dump facility writes it verbatim.
//!
//! The `For`, `While`, `Case`, and `Subshell` variants are reserved: the
//! parser recognizes their keywords but does not emit them yet.

use itertools::Itertools;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeTuple;
use std::fmt;
use strum::Display;

/// Word of command text as written in the source, before expansion
///
/// The variant records how the word was quoted, which decides the expansion
/// rules applied to it later. Serialized as a `[tag, text]` pair, e.g.
/// `["DSTRING", "a @b"]`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Word {
    /// Unquoted word, subject to tilde expansion, field splitting, and globbing
    Bare(String),
    /// Single-quoted literal
    Single(String),
    /// Double-quoted text, subject to variable interpolation only
    Double(String),
    /// Variable reference appearing in argument position
    Var(String),
}

impl Word {
    /// Tag used in the serialized form
    pub fn tag(&self) -> &'static str {
        match self {
            Word::Bare(_) => "WORD",
            Word::Single(_) => "STRING",
            Word::Double(_) => "DSTRING",
            Word::Var(_) => "VAR",
        }
    }

    /// Raw text of the word (the variable name for [`Word::Var`])
    pub fn text(&self) -> &str {
        match self {
            Word::Bare(text) | Word::Single(text) | Word::Double(text) => text,
            Word::Var(name) => name,
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.tag())?;
        tuple.serialize_element(self.text())?;
        tuple.end()
    }
}

/// Binary operators connecting statements and condition operands
///
/// Both `Display` and the serialized form use the surface spelling.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum BinOp {
    /// `;`
    #[strum(serialize = ";")]
    #[serde(rename = ";")]
    Seq,
    /// `&&`
    #[strum(serialize = "&&")]
    #[serde(rename = "&&")]
    And,
    /// `||`
    #[strum(serialize = "||")]
    #[serde(rename = "||")]
    Or,
    /// `==`
    #[strum(serialize = "==")]
    #[serde(rename = "==")]
    Eq,
    /// `!=`
    #[strum(serialize = "!=")]
    #[serde(rename = "!=")]
    NotEq,
    /// `<`
    #[strum(serialize = "<")]
    #[serde(rename = "<")]
    Lt,
    /// `>`
    #[strum(serialize = ">")]
    #[serde(rename = ">")]
    Gt,
    /// `<=`
    #[strum(serialize = "<=")]
    #[serde(rename = "<=")]
    LtEq,
    /// `>=`
    #[strum(serialize = ">=")]
    #[serde(rename = ">=")]
    GtEq,
    /// `|`
    #[strum(serialize = "|")]
    #[serde(rename = "|")]
    Pipe,
}

impl BinOp {
    /// Whether this operator compares its operands rather than running them
    pub fn is_comparison(self) -> bool {
        use BinOp::*;
        matches!(self, Eq | NotEq | Lt | Gt | LtEq | GtEq)
    }
}

/// Syntax tree node
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Node<W> {
    Command(Command<W>),
    Pipeline(Pipeline<W>),
    BinaryOp(BinaryOp<W>),
    Assignment(Assignment<W>),
    AssignmentList(AssignmentList<W>),
    VarRef(VarRef),
    If(If<W>),
    Block(Block<W>),
    For(For<W>),
    While(While<W>),
    Case(Case<W>),
    Subshell(Subshell<W>),
}

/// Simple command with arguments, redirections, and assignment prefixes
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command<W> {
    pub name: W,
    pub args: Vec<W>,
    pub stdin: Option<W>,
    pub stdout: Option<W>,
    pub stdout_append: bool,
    pub stderr: Option<W>,
    pub stderr_append: bool,
    pub assignments: Vec<Assignment<W>>,
    pub background: bool,
}

impl<W> Command<W> {
    /// Creates a command with the given name and no other attributes.
    pub fn new(name: W) -> Self {
        Command {
            name,
            args: Vec::new(),
            stdin: None,
            stdout: None,
            stdout_append: false,
            stderr: None,
            stderr_append: false,
            assignments: Vec::new(),
            background: false,
        }
    }
}

impl<W: fmt::Display> fmt::Display for Command<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            std::iter::once(&self.name).chain(&self.args).format(" ")
        )
    }
}

/// Two or more commands connected by pipes
///
/// A single-command pipeline never exists; it collapses to the command
/// itself at parse time. `background` is the disjunction of the members'
/// background flags.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline<W> {
    pub commands: Vec<Command<W>>,
    pub background: bool,
}

/// Pair of operands connected by a [`BinOp`]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryOp<W> {
    pub op: BinOp,
    pub left: Box<Node<W>>,
    pub right: Box<Node<W>>,
}

/// `name=value` (the value may be absent)
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment<W> {
    pub name: String,
    pub value: Option<W>,
}

/// Two or more assignments forming a statement of their own
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentList<W> {
    pub assignments: Vec<Assignment<W>>,
}

/// Bare variable reference in command-head position
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VarRef {
    pub name: String,
}

/// `if (condition) -> { … } elif … else -> { … }`
///
/// An `elif` chain nests as another `If` in `alternative`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct If<W> {
    pub condition: Box<Node<W>>,
    pub consequent: Block<W>,
    pub alternative: Option<Box<Node<W>>>,
}

/// Brace-delimited statement list, also the shape of a whole multi-line input
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block<W> {
    pub statements: Vec<Node<W>>,
}

/// Reserved: `for` loop
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct For<W> {
    pub name: String,
    pub words: Vec<W>,
    pub body: Block<W>,
}

/// Reserved: `while` loop
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct While<W> {
    pub condition: Box<Node<W>>,
    pub body: Block<W>,
}

/// Reserved: `case` statement
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Case<W> {
    pub subject: W,
    pub arms: Vec<CaseArm<W>>,
}

/// Reserved: one arm of a `case` statement
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseArm<W> {
    pub pattern: W,
    pub body: Block<W>,
}

/// Reserved: parenthesized subshell
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subshell<W> {
    pub body: Block<W>,
}
