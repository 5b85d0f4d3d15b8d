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

//! The four-stage driver
//!
//! Every way of feeding source into the shell — an interactive line, a
//! `-c` string, a script file — goes through [`run_source`]: lex, parse,
//! optionally dump the AST, expand, execute.
//!
//! Expansion is interleaved with execution one top-level statement at a
//! time: the parsed tree is flattened across its top-level block and `;`
//! chains, and each piece is expanded only when its turn to run comes.
//! `FOO=bar; echo @FOO` therefore sees the assignment, exactly as if the
//! two halves had arrived on separate lines. Errors are reported on
//! standard error here so the callers only deal in statuses.

use rayshell_env::Env;
use rayshell_semantics::Expander;
use rayshell_syntax::lexer::Lexer;
use rayshell_syntax::parser::Parser;
use rayshell_syntax::syntax::{BinOp, Node, Word};
use std::fs::File;

/// Outcome of feeding one unit of source through the stages
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Nothing to run (blank or comment-only input)
    Empty,
    /// Ran to completion with the given status
    Status(i32),
    /// Lexing or parsing failed
    SyntaxError,
    /// Expansion failed
    ExpansionError,
}

/// Runs one unit of source text.
pub fn run_source(env: &mut Env, source_text: &str, dump_ast: Option<&str>) -> Outcome {
    let tokens = match Lexer::new(source_text).tokenize() {
        Ok(tokens) => tokens,
        Err(error) => {
            eprintln!("rayshell: {error}");
            return Outcome::SyntaxError;
        }
    };
    let node = match Parser::new(tokens).parse() {
        Ok(Some(node)) => node,
        Ok(None) => return Outcome::Empty,
        Err(error) => {
            eprintln!("rayshell: {error}");
            return Outcome::SyntaxError;
        }
    };
    if let Some(path) = dump_ast {
        dump(&node, path);
    }

    let mut statements = Vec::new();
    flatten(node, &mut statements);
    let mut outcome = Outcome::Empty;
    for statement in statements {
        let expanded = match Expander::new(env).expand(statement) {
            Ok(expanded) => expanded,
            Err(error) => {
                eprintln!("rayshell: {error}");
                env.last_status = 1;
                return Outcome::ExpansionError;
            }
        };
        let status = rayshell_semantics::run(env, &expanded);
        env.last_status = status;
        outcome = Outcome::Status(status);
    }
    outcome
}

/// Splits the top level of a parsed tree into the statements to run.
///
/// The parser wraps newline-separated statements in a block and chains
/// `;` into left-nested binary nodes; both shapes flatten to the same
/// ordered list. Deeper nodes (pipelines, `&&`/`||`, `if` bodies) stay
/// intact and expand as units.
fn flatten(node: Node<Word>, statements: &mut Vec<Node<Word>>) {
    match node {
        Node::Block(block) => {
            for statement in block.statements {
                flatten(statement, statements);
            }
        }
        Node::BinaryOp(binary) if binary.op == BinOp::Seq => {
            flatten(*binary.left, statements);
            flatten(*binary.right, statements);
        }
        other => statements.push(other),
    }
}

/// Runs a `-c` command string, returning the shell's exit status.
pub fn run_command_string(env: &mut Env, command: &str, dump_ast: Option<&str>) -> i32 {
    let status = exit_status(run_source(env, command, dump_ast));
    finish_statement(env);
    status
}

/// Runs a script file, returning the shell's exit status.
pub fn run_script(env: &mut Env, path: &str, dump_ast: Option<&str>) -> i32 {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let status = exit_status(run_source(env, &contents, dump_ast));
            finish_statement(env);
            status
        }
        Err(error) => {
            eprintln!("rayshell: cannot read {path}: {error}");
            127
        }
    }
}

fn exit_status(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Empty => 0,
        Outcome::Status(status) => status,
        Outcome::SyntaxError => 2,
        Outcome::ExpansionError => 1,
    }
}

/// Post-statement housekeeping: drain signals and drop finished jobs.
pub fn finish_statement(env: &mut Env) {
    env.poll_signals();
    env.take_finished_jobs();
}

fn dump(node: &Node<Word>, path: &str) {
    let result = File::create(path)
        .map_err(serde_json::Error::io)
        .and_then(|file| serde_json::to_writer_pretty(file, node));
    if let Err(error) = result {
        eprintln!("rayshell: cannot dump AST to {path}: {error}");
    }
}
