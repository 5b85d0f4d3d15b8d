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

//! Execution dispatch
//!
//! [`run`] walks an expanded tree and produces an exit status. Structured
//! nodes are handled here; simple commands and pipelines are delegated to
//! [`crate::command`] and [`crate::pipeline`].
//!
//! Status conventions: `;` yields the right side's status, `&&`/`||`
//! short-circuit, `if` yields the executed branch's status (0 when no
//! branch runs), and an empty block yields 0. Comparison operators
//! evaluate both operands to text and yield 0 for true, 1 for false;
//! ordering comparisons go numeric when both operands parse as integers
//! and lexicographic otherwise.

use crate::{command, pipeline};
use itertools::Itertools;
use rayshell_env::{Env, variable};
use rayshell_syntax::syntax::{BinOp, BinaryOp, Block, Command, If, Node, Pipeline};

/// Runs one expanded node, returning its exit status.
pub fn run(env: &mut Env, node: &Node<String>) -> i32 {
    match node {
        Node::Command(command) => command::run(env, command),
        Node::Pipeline(pipeline) => pipeline::run(env, pipeline),
        Node::BinaryOp(binary) => run_binary(env, binary),
        Node::Assignment(assignment) => {
            variable::set(&assignment.name, assignment.value.as_deref().unwrap_or(""));
            0
        }
        Node::AssignmentList(list) => {
            for assignment in &list.assignments {
                variable::set(&assignment.name, assignment.value.as_deref().unwrap_or(""));
            }
            0
        }
        Node::If(if_node) => run_if(env, if_node),
        Node::Block(block) => run_block(env, block),
        // The expander desugars variable references into commands.
        Node::VarRef(_) => 0,
        Node::For(_) | Node::While(_) | Node::Case(_) | Node::Subshell(_) => {
            eprintln!("rayshell: construct not implemented");
            1
        }
    }
}

fn run_block(env: &mut Env, block: &Block<String>) -> i32 {
    let mut status = 0;
    for statement in &block.statements {
        status = run(env, statement);
        env.last_status = status;
    }
    status
}

fn run_binary(env: &mut Env, binary: &BinaryOp<String>) -> i32 {
    match binary.op {
        BinOp::Seq => {
            run(env, &binary.left);
            run(env, &binary.right)
        }
        BinOp::And => {
            let status = run(env, &binary.left);
            if status == 0 { run(env, &binary.right) } else { status }
        }
        BinOp::Or => {
            let status = run(env, &binary.left);
            if status != 0 { run(env, &binary.right) } else { status }
        }
        BinOp::Pipe => run_condition_pipe(env, binary),
        BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => {
            compare(env, binary)
        }
    }
}

/// `if` yields the executed branch's status; 0 when no branch runs.
fn run_if(env: &mut Env, if_node: &If<String>) -> i32 {
    if run(env, &if_node.condition) == 0 {
        run_block(env, &if_node.consequent)
    } else if let Some(alternative) = &if_node.alternative {
        run(env, alternative)
    } else {
        0
    }
}

fn compare(env: &mut Env, binary: &BinaryOp<String>) -> i32 {
    let left = operand_text(env, &binary.left);
    let right = operand_text(env, &binary.right);
    let truth = match binary.op {
        BinOp::Eq => left == right,
        BinOp::NotEq => left != right,
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => {
            ordered(binary.op, &left, &right)
        }
        _ => unreachable!("not a comparison: {}", binary.op),
    };
    if truth { 0 } else { 1 }
}

fn ordered(op: BinOp, left: &str, right: &str) -> bool {
    use std::cmp::Ordering;
    let ordering = match (left.parse::<i64>(), right.parse::<i64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        _ => left.cmp(right),
    };
    match op {
        BinOp::Lt => ordering == Ordering::Less,
        BinOp::Gt => ordering == Ordering::Greater,
        BinOp::LtEq => ordering != Ordering::Greater,
        BinOp::GtEq => ordering != Ordering::Less,
        _ => unreachable!(),
    }
}

/// Text a comparison operand evaluates to
///
/// A command operand is its words joined by spaces (the words were never
/// meant to run). Any other operand shape runs and contributes its status.
fn operand_text(env: &mut Env, node: &Node<String>) -> String {
    match node {
        Node::Command(command) => {
            std::iter::once(&command.name).chain(&command.args).join(" ")
        }
        other => run(env, other).to_string(),
    }
}

/// A `|` inside a condition runs as a real pipeline when both operands are
/// commands.
fn run_condition_pipe(env: &mut Env, binary: &BinaryOp<String>) -> i32 {
    let mut commands = Vec::new();
    if collect_pipe_members(&binary.left, &mut commands)
        && collect_pipe_members(&binary.right, &mut commands)
    {
        let background = commands.iter().any(|c| c.background);
        pipeline::run(env, &Pipeline { commands, background })
    } else {
        eprintln!("rayshell: construct not implemented");
        1
    }
}

fn collect_pipe_members(node: &Node<String>, commands: &mut Vec<Command<String>>) -> bool {
    match node {
        Node::Command(command) => {
            commands.push(command.clone());
            true
        }
        Node::BinaryOp(binary) if binary.op == BinOp::Pipe => {
            collect_pipe_members(&binary.left, commands)
                && collect_pipe_members(&binary.right, commands)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(name: &str) -> Node<String> {
        Node::Command(Command::new(name.to_owned()))
    }

    fn comparison(op: BinOp, left: &str, right: &str) -> Node<String> {
        Node::BinaryOp(BinaryOp {
            op,
            left: Box::new(command(left)),
            right: Box::new(command(right)),
        })
    }

    fn assign(name: &str, value: &str) -> Node<String> {
        Node::Assignment(rayshell_syntax::syntax::Assignment {
            name: name.to_owned(),
            value: Some(value.to_owned()),
        })
    }

    #[test]
    fn assignment_mutates_the_environment() {
        let mut env = Env::new();
        let status = run(&mut env, &assign("RAYSHELL_TEST_RUN_ASGN", "v"));
        assert_eq!(status, 0);
        assert_eq!(variable::value_or_empty("RAYSHELL_TEST_RUN_ASGN"), "v");
        variable::unset("RAYSHELL_TEST_RUN_ASGN");
    }

    #[test]
    fn empty_block_yields_zero() {
        let mut env = Env::new();
        let block = Node::Block(Block { statements: Vec::new() });
        assert_eq!(run(&mut env, &block), 0);
    }

    #[test]
    fn equal_strings_compare_true() {
        let mut env = Env::new();
        assert_eq!(run(&mut env, &comparison(BinOp::Eq, "abc", "abc")), 0);
        assert_eq!(run(&mut env, &comparison(BinOp::Eq, "abc", "abd")), 1);
        assert_eq!(run(&mut env, &comparison(BinOp::NotEq, "abc", "abd")), 0);
    }

    #[test]
    fn ordering_is_numeric_for_integers() {
        let mut env = Env::new();
        // Lexicographically "9" > "10"; numerically it is less.
        assert_eq!(run(&mut env, &comparison(BinOp::Lt, "9", "10")), 0);
        assert_eq!(run(&mut env, &comparison(BinOp::GtEq, "10", "10")), 0);
        assert_eq!(run(&mut env, &comparison(BinOp::Gt, "9", "10")), 1);
    }

    #[test]
    fn ordering_is_lexicographic_for_non_integers() {
        let mut env = Env::new();
        assert_eq!(run(&mut env, &comparison(BinOp::Lt, "apple", "banana")), 0);
        assert_eq!(run(&mut env, &comparison(BinOp::LtEq, "b", "a")), 1);
    }

    #[test]
    fn and_short_circuits() {
        let mut env = Env::new();
        // The right side would set a variable; a false left side must
        // prevent that.
        let node = Node::BinaryOp(BinaryOp {
            op: BinOp::And,
            left: Box::new(comparison(BinOp::Eq, "a", "b")),
            right: Box::new(assign("RAYSHELL_TEST_RUN_AND", "reached")),
        });
        assert_eq!(run(&mut env, &node), 1);
        assert_eq!(variable::value("RAYSHELL_TEST_RUN_AND"), None);
    }

    #[test]
    fn or_short_circuits() {
        let mut env = Env::new();
        let node = Node::BinaryOp(BinaryOp {
            op: BinOp::Or,
            left: Box::new(comparison(BinOp::Eq, "a", "a")),
            right: Box::new(assign("RAYSHELL_TEST_RUN_OR", "reached")),
        });
        assert_eq!(run(&mut env, &node), 0);
        assert_eq!(variable::value("RAYSHELL_TEST_RUN_OR"), None);
    }

    #[test]
    fn if_returns_the_branch_status_not_the_condition_status() {
        let mut env = Env::new();
        // True condition, body is a false comparison: the if must report
        // the body's status, not the condition's 0.
        let node = Node::If(If {
            condition: Box::new(comparison(BinOp::Eq, "x", "x")),
            consequent: Block {
                statements: vec![comparison(BinOp::Eq, "a", "b")],
            },
            alternative: None,
        });
        assert_eq!(run(&mut env, &node), 1);
    }

    #[test]
    fn if_without_applicable_branch_yields_zero() {
        let mut env = Env::new();
        let node = Node::If(If {
            condition: Box::new(comparison(BinOp::Eq, "a", "b")),
            consequent: Block {
                statements: vec![comparison(BinOp::Eq, "a", "b")],
            },
            alternative: None,
        });
        assert_eq!(run(&mut env, &node), 0);
    }

    #[test]
    fn else_branch_runs_when_the_condition_fails() {
        let mut env = Env::new();
        let node = Node::If(If {
            condition: Box::new(comparison(BinOp::Eq, "a", "b")),
            consequent: Block { statements: vec![] },
            alternative: Some(Box::new(assign("RAYSHELL_TEST_RUN_ELSE", "yes"))),
        });
        assert_eq!(run(&mut env, &node), 0);
        assert_eq!(variable::value_or_empty("RAYSHELL_TEST_RUN_ELSE"), "yes");
        variable::unset("RAYSHELL_TEST_RUN_ELSE");
    }

    #[test]
    fn operand_text_joins_command_words() {
        let mut env = Env::new();
        let mut cmd = Command::new("a".to_owned());
        cmd.args = vec!["b".to_owned(), "c".to_owned()];
        assert_eq!(operand_text(&mut env, &Node::Command(cmd)), "a b c");
    }

    #[test]
    fn reserved_constructs_report_not_implemented() {
        let mut env = Env::new();
        let node = Node::Subshell(rayshell_syntax::syntax::Subshell {
            body: Block { statements: vec![] },
        });
        assert_eq!(run(&mut env, &node), 1);
    }
}
