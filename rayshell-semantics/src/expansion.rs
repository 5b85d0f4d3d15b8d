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

//! Word expansion
//!
//! The [`Expander`] rewrites a parsed tree into an expanded one, replacing
//! every tagged [`Word`] with plain strings. The quoting tag decides the
//! rules:
//!
//! - Single-quoted words are literal.
//! - Double-quoted words interpolate `@name`, `$name`, `@{name}`, and
//!   `${name}` (plus the pseudo-variables `?`, `$`, and `$$`) and honor
//!   backslash escapes, producing exactly one field.
//! - Unquoted words are tilde-expanded, field-split on `$IFS` (default
//!   space, tab, newline), and glob-expanded; a pattern matching nothing
//!   stays literal.
//! - Variable references are substituted and field-split, with words
//!   inside the value that start with `@` expanding recursively. A
//!   seen-set turns reference cycles into empty expansions.
//!
//! A bare variable reference in statement position desugars to
//! `echo <value>` here, so the executor only ever sees canonical command
//! nodes. Inside a comparison, the same reference expands to its value
//! instead, so `if (@x == 5)` compares `5` rather than `echo 5`.
//!
//! Expansion reads the environment, the last exit status, and the
//! filesystem, but never mutates anything.

use rayshell_env::{Env, variable};
use rayshell_syntax::syntax::{
    Assignment, AssignmentList, BinaryOp, Block, Command, If, Node, Pipeline, Word,
};
use std::collections::HashSet;
use thiserror::Error;

/// Errors detected during expansion
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ExpansionError {
    /// A redirection target expanded to more than one word.
    #[error("ambiguous redirect: `{target}`")]
    AmbiguousRedirect { target: String },
}

/// Result type for expansion functions
pub type Result<T> = std::result::Result<T, ExpansionError>;

/// Expansion pass over a parsed tree
#[derive(Clone, Copy, Debug)]
pub struct Expander<'a> {
    env: &'a Env,
}

impl<'a> Expander<'a> {
    pub fn new(env: &'a Env) -> Self {
        Expander { env }
    }

    /// Expands a whole tree.
    pub fn expand(&self, node: Node<Word>) -> Result<Node<String>> {
        match node {
            Node::Command(command) => self.expand_command(command).map(Node::Command),
            Node::Pipeline(pipeline) => {
                let commands = pipeline
                    .commands
                    .into_iter()
                    .map(|c| self.expand_command(c))
                    .collect::<Result<_>>()?;
                Ok(Node::Pipeline(Pipeline { commands, background: pipeline.background }))
            }
            Node::BinaryOp(binary) => {
                let comparison = binary.op.is_comparison();
                let expand_side = |side: Node<Word>| {
                    if comparison {
                        self.expand_operand(side)
                    } else {
                        self.expand(side)
                    }
                };
                Ok(Node::BinaryOp(BinaryOp {
                    op: binary.op,
                    left: Box::new(expand_side(*binary.left)?),
                    right: Box::new(expand_side(*binary.right)?),
                }))
            }
            Node::Assignment(assignment) => {
                Ok(Node::Assignment(self.expand_assignment(assignment)))
            }
            Node::AssignmentList(list) => {
                let assignments = list
                    .assignments
                    .into_iter()
                    .map(|a| self.expand_assignment(a))
                    .collect();
                Ok(Node::AssignmentList(AssignmentList { assignments }))
            }
            Node::VarRef(var_ref) => {
                // Typing a variable name prints its value.
                let mut command = Command::new("echo".to_owned());
                command.args = self.expand_var(&var_ref.name, &mut HashSet::new());
                Ok(Node::Command(command))
            }
            Node::If(if_node) => Ok(Node::If(If {
                condition: Box::new(self.expand(*if_node.condition)?),
                consequent: self.expand_block(if_node.consequent)?,
                alternative: match if_node.alternative {
                    Some(alternative) => Some(Box::new(self.expand(*alternative)?)),
                    None => None,
                },
            })),
            Node::Block(block) => self.expand_block(block).map(Node::Block),
            Node::For(_) | Node::While(_) | Node::Case(_) | Node::Subshell(_) => {
                unreachable!("the parser does not emit reserved constructs")
            }
        }
    }

    fn expand_block(&self, block: Block<Word>) -> Result<Block<String>> {
        let statements = block
            .statements
            .into_iter()
            .map(|s| self.expand(s))
            .collect::<Result<_>>()?;
        Ok(Block { statements })
    }

    /// Expands a comparison operand.
    ///
    /// A variable reference becomes a pseudo-command holding its value
    /// words, so the comparison sees the value text.
    fn expand_operand(&self, node: Node<Word>) -> Result<Node<String>> {
        match node {
            Node::VarRef(var_ref) => {
                let mut fields = self.expand_var(&var_ref.name, &mut HashSet::new());
                let name = if fields.is_empty() { String::new() } else { fields.remove(0) };
                let mut command = Command::new(name);
                command.args = fields;
                Ok(Node::Command(command))
            }
            other => self.expand(other),
        }
    }

    fn expand_command(&self, command: Command<Word>) -> Result<Command<String>> {
        let name = self
            .expand_word(&command.name)
            .into_iter()
            .next()
            .unwrap_or_default();
        let mut args = Vec::new();
        for arg in &command.args {
            args.extend(self.expand_word(arg));
        }
        let assignments = command
            .assignments
            .into_iter()
            .map(|a| self.expand_assignment(a))
            .collect();
        Ok(Command {
            name,
            args,
            stdin: self.expand_redirect(command.stdin)?,
            stdout: self.expand_redirect(command.stdout)?,
            stdout_append: command.stdout_append,
            stderr: self.expand_redirect(command.stderr)?,
            stderr_append: command.stderr_append,
            assignments,
            background: command.background,
        })
    }

    /// Expands an assignment value: no tilde, no field splitting, no glob.
    fn expand_assignment(&self, assignment: Assignment<Word>) -> Assignment<String> {
        let value = match assignment.value {
            None => String::new(),
            Some(Word::Bare(text)) | Some(Word::Single(text)) => text,
            Some(Word::Double(text)) => self.expand_double(&text),
            Some(Word::Var(name)) => {
                self.expand_var(&name, &mut HashSet::new()).join(" ")
            }
        };
        Assignment { name: assignment.name, value: Some(value) }
    }

    /// Expands a redirection target, which must come out as exactly one
    /// word.
    fn expand_redirect(&self, target: Option<Word>) -> Result<Option<String>> {
        let Some(target) = target else { return Ok(None) };
        let mut fields = self.expand_word(&target);
        if fields.len() == 1 {
            Ok(Some(fields.pop().unwrap()))
        } else {
            Err(ExpansionError::AmbiguousRedirect { target: target.text().to_owned() })
        }
    }

    /// Expands one word into its fields.
    pub fn expand_word(&self, word: &Word) -> Vec<String> {
        match word {
            Word::Single(text) => vec![text.clone()],
            Word::Double(text) => vec![self.expand_double(text)],
            Word::Var(name) => self.expand_var(name, &mut HashSet::new()),
            Word::Bare(text) => self.expand_bare(text),
        }
    }

    /// Tilde expansion, field splitting, and globbing for unquoted text
    fn expand_bare(&self, text: &str) -> Vec<String> {
        let text = if text.starts_with('~') {
            self.expand_tilde(text)
        } else {
            text.to_owned()
        };
        let ifs = variable::value("IFS").unwrap_or_else(|| " \t\n".to_owned());
        let mut fields = Vec::new();
        for field in field_split(&text, &ifs) {
            if field.contains(['*', '?', '[']) {
                fields.extend(expand_glob(&field));
            } else {
                fields.push(field);
            }
        }
        fields
    }

    fn expand_tilde(&self, text: &str) -> String {
        if text == "~" || text.starts_with("~/") {
            let home = variable::value("HOME").or_else(|| {
                nix::unistd::User::from_uid(nix::unistd::getuid())
                    .ok()
                    .flatten()
                    .map(|user| user.dir.display().to_string())
            });
            match home {
                Some(home) => format!("{home}{}", &text[1..]),
                None => text.to_owned(),
            }
        } else {
            let boundary = text.find('/').unwrap_or(text.len());
            let (user, rest) = (&text[1..boundary], &text[boundary..]);
            match nix::unistd::User::from_name(user) {
                Ok(Some(user)) => format!("{}{rest}", user.dir.display()),
                _ => text.to_owned(),
            }
        }
    }

    /// Substitutes a variable and field-splits the value.
    ///
    /// Words inside the value starting with `@` expand recursively; `seen`
    /// breaks reference cycles by expanding a re-entered name to nothing.
    fn expand_var(&self, name: &str, seen: &mut HashSet<String>) -> Vec<String> {
        if !seen.insert(name.to_owned()) {
            return vec![String::new()];
        }
        if name == "?" {
            return vec![self.env.last_status.to_string()];
        }
        if name == "$" || name == "$$" {
            return vec![self.env.shell_pid().to_string()];
        }
        let raw = variable::value_or_empty(name);
        if raw.is_empty() {
            return vec![String::new()];
        }
        let mut fields = Vec::new();
        for token in raw.split_whitespace() {
            if let Some(inner) = token.strip_prefix('@') {
                fields.extend(self.expand_var(inner, seen));
            } else {
                fields.extend(self.expand_bare(token));
            }
        }
        fields
    }

    /// Interpolates variable references inside double-quoted text.
    fn expand_double(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            if ch == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if ch == '@' || ch == '$' {
                if chars.get(i + 1) == Some(&'{') {
                    match chars[i + 2..].iter().position(|&c| c == '}') {
                        Some(offset) => {
                            let close = i + 2 + offset;
                            let name: String = chars[i + 2..close].iter().collect();
                            i = close + 1;
                            if name.is_empty() {
                                out.push(ch);
                            } else {
                                out.push_str(&self.interpolate(&name));
                            }
                        }
                        None => {
                            // No closing brace; the sigil is literal.
                            out.push(ch);
                            i += 1;
                        }
                    }
                    continue;
                }
                let mut j = i + 1;
                while j < chars.len()
                    && (chars[j].is_alphanumeric()
                        || chars[j] == '_'
                        || chars[j] == '?'
                        || chars[j] == '$')
                {
                    j += 1;
                }
                let name: String = chars[i + 1..j].iter().collect();
                i = j;
                if name.is_empty() {
                    out.push(ch);
                } else {
                    out.push_str(&self.interpolate(&name));
                }
                continue;
            }
            out.push(ch);
            i += 1;
        }
        out
    }

    fn interpolate(&self, name: &str) -> String {
        if name == "?" {
            self.env.last_status.to_string()
        } else if name == "$" || name == "$$" {
            self.env.shell_pid().to_string()
        } else {
            variable::value_or_empty(name)
        }
    }
}

/// Splits on the characters of `ifs`, never producing empty fields except
/// for wholly empty input.
fn field_split(text: &str, ifs: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ifs.contains(ch) {
            if !current.is_empty() {
                fields.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        fields.push(current);
    }
    if fields.is_empty() {
        fields.push(String::new());
    }
    fields
}

/// Glob expansion; a pattern matching nothing stays literal.
fn expand_glob(pattern: &str) -> Vec<String> {
    match glob::glob(pattern) {
        Ok(paths) => {
            let matches: Vec<String> = paths
                .filter_map(|p| p.ok())
                .map(|p| p.display().to_string())
                .collect();
            if matches.is_empty() {
                vec![pattern.to_owned()]
            } else {
                matches
            }
        }
        Err(_) => vec![pattern.to_owned()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rayshell_syntax::syntax::VarRef;

    fn bare(text: &str) -> Word {
        Word::Bare(text.to_owned())
    }

    #[test]
    fn single_quoted_text_is_literal() {
        let env = Env::new();
        let expander = Expander::new(&env);
        let word = Word::Single("@FOO * ~".to_owned());
        assert_eq!(expander.expand_word(&word), ["@FOO * ~"]);
    }

    #[test]
    fn variable_value_is_field_split() {
        let env = Env::new();
        variable::set("RAYSHELL_TEST_SPLIT", "1 2");
        let expander = Expander::new(&env);
        let word = Word::Var("RAYSHELL_TEST_SPLIT".to_owned());
        assert_eq!(expander.expand_word(&word), ["1", "2"]);
        variable::unset("RAYSHELL_TEST_SPLIT");
    }

    #[test]
    fn double_quoted_value_is_one_field() {
        let env = Env::new();
        variable::set("RAYSHELL_TEST_DQ", "1 2");
        let expander = Expander::new(&env);
        let word = Word::Double("x=@RAYSHELL_TEST_DQ".to_owned());
        assert_eq!(expander.expand_word(&word), ["x=1 2"]);
        variable::unset("RAYSHELL_TEST_DQ");
    }

    #[test]
    fn both_sigils_and_brace_forms_interpolate() {
        let env = Env::new();
        variable::set("RAYSHELL_TEST_SIGIL", "v");
        let expander = Expander::new(&env);
        let word = Word::Double(
            "$RAYSHELL_TEST_SIGIL ${RAYSHELL_TEST_SIGIL} @{RAYSHELL_TEST_SIGIL}".to_owned(),
        );
        assert_eq!(expander.expand_word(&word), ["v v v"]);
        variable::unset("RAYSHELL_TEST_SIGIL");
    }

    #[test]
    fn unset_variable_interpolates_to_empty() {
        let env = Env::new();
        let expander = Expander::new(&env);
        let word = Word::Double("a@{RAYSHELL_TEST_UNSET}b".to_owned());
        assert_eq!(expander.expand_word(&word), ["ab"]);
    }

    #[test]
    fn last_status_pseudo_variable() {
        let mut env = Env::new();
        env.last_status = 7;
        let expander = Expander::new(&env);
        assert_eq!(expander.expand_word(&Word::Double("@?".to_owned())), ["7"]);
        assert_eq!(expander.expand_word(&Word::Var("?".to_owned())), ["7"]);
    }

    #[test]
    fn shell_pid_pseudo_variable() {
        let env = Env::new();
        let expander = Expander::new(&env);
        let expected = env.shell_pid().to_string();
        assert_eq!(expander.expand_word(&Word::Double("$$".to_owned())), [expected.clone()]);
        assert_eq!(expander.expand_word(&Word::Var("$".to_owned())), [expected]);
    }

    #[test]
    fn backslash_escapes_in_double_quotes() {
        let env = Env::new();
        let expander = Expander::new(&env);
        let word = Word::Double(r"\@x \\ \q".to_owned());
        assert_eq!(expander.expand_word(&word), [r"@x \ q"]);
    }

    #[test]
    fn unclosed_brace_keeps_the_sigil_literal() {
        let env = Env::new();
        let expander = Expander::new(&env);
        let word = Word::Double("a@{name".to_owned());
        assert_eq!(expander.expand_word(&word), ["a@{name"]);
    }

    #[test]
    fn tilde_expands_to_home() {
        let env = Env::new();
        let expander = Expander::new(&env);
        if let Some(home) = variable::value("HOME") {
            assert_eq!(expander.expand_word(&bare("~")), [home.clone()]);
            assert_eq!(
                expander.expand_word(&bare("~/sub")),
                [format!("{home}/sub")]
            );
        }
    }

    #[test]
    fn unknown_tilde_user_stays_literal() {
        let env = Env::new();
        let expander = Expander::new(&env);
        assert_eq!(
            expander.expand_word(&bare("~rayshell_no_such_user/x")),
            ["~rayshell_no_such_user/x"]
        );
    }

    #[test]
    fn glob_with_no_match_keeps_the_pattern() {
        let env = Env::new();
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.none", dir.path().display());
        let expander = Expander::new(&env);
        assert_eq!(expander.expand_word(&bare(&pattern)), [pattern]);
    }

    #[test]
    fn glob_expands_to_sorted_matches() {
        let env = Env::new();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        let pattern = format!("{}/*.txt", dir.path().display());
        let expander = Expander::new(&env);
        let fields = expander.expand_word(&bare(&pattern));
        assert_eq!(
            fields,
            [
                dir.path().join("a.txt").display().to_string(),
                dir.path().join("b.txt").display().to_string(),
            ]
        );
    }

    #[test]
    fn variable_reference_cycles_expand_to_nothing() {
        let env = Env::new();
        variable::set("RAYSHELL_TEST_CYC_A", "@RAYSHELL_TEST_CYC_B");
        variable::set("RAYSHELL_TEST_CYC_B", "@RAYSHELL_TEST_CYC_A");
        let expander = Expander::new(&env);
        let fields = expander.expand_word(&Word::Var("RAYSHELL_TEST_CYC_A".to_owned()));
        assert_eq!(fields, [""]);
        variable::unset("RAYSHELL_TEST_CYC_A");
        variable::unset("RAYSHELL_TEST_CYC_B");
    }

    #[test]
    fn nested_variable_references_expand() {
        let env = Env::new();
        variable::set("RAYSHELL_TEST_NEST_OUTER", "x @RAYSHELL_TEST_NEST_INNER");
        variable::set("RAYSHELL_TEST_NEST_INNER", "y z");
        let expander = Expander::new(&env);
        let fields =
            expander.expand_word(&Word::Var("RAYSHELL_TEST_NEST_OUTER".to_owned()));
        assert_eq!(fields, ["x", "y", "z"]);
        variable::unset("RAYSHELL_TEST_NEST_OUTER");
        variable::unset("RAYSHELL_TEST_NEST_INNER");
    }

    #[test]
    fn ambiguous_redirect_is_an_error() {
        let env = Env::new();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        let pattern = format!("{}/*.txt", dir.path().display());
        let mut command = Command::new(bare("cat"));
        command.stdout = Some(bare(&pattern));
        let expander = Expander::new(&env);
        let error = expander.expand(Node::Command(command)).unwrap_err();
        assert_matches!(error, ExpansionError::AmbiguousRedirect { target } => {
            assert_eq!(target, pattern);
        });
    }

    #[test]
    fn single_match_redirect_is_fine() {
        let env = Env::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("only.txt");
        std::fs::write(&path, "").unwrap();
        let pattern = format!("{}/*.txt", dir.path().display());
        let mut command = Command::new(bare("cat"));
        command.stdin = Some(bare(&pattern));
        let expander = Expander::new(&env);
        let expanded = expander.expand(Node::Command(command)).unwrap();
        assert_matches!(expanded, Node::Command(c) => {
            assert_eq!(c.stdin, Some(path.display().to_string()));
        });
    }

    #[test]
    fn var_ref_desugars_to_echo() {
        let env = Env::new();
        variable::set("RAYSHELL_TEST_DESUGAR", "hello world");
        let expander = Expander::new(&env);
        let node = Node::VarRef(VarRef { name: "RAYSHELL_TEST_DESUGAR".to_owned() });
        let expanded = expander.expand(node).unwrap();
        assert_matches!(expanded, Node::Command(c) => {
            assert_eq!(c.name, "echo");
            assert_eq!(c.args, ["hello", "world"]);
        });
        variable::unset("RAYSHELL_TEST_DESUGAR");
    }

    #[test]
    fn var_ref_in_comparison_expands_to_its_value() {
        let env = Env::new();
        variable::set("RAYSHELL_TEST_CMP", "5");
        let expander = Expander::new(&env);
        let node = Node::BinaryOp(BinaryOp {
            op: rayshell_syntax::syntax::BinOp::Eq,
            left: Box::new(Node::VarRef(VarRef {
                name: "RAYSHELL_TEST_CMP".to_owned(),
            })),
            right: Box::new(Node::Command(Command::new(bare("5")))),
        });
        let expanded = expander.expand(node).unwrap();
        assert_matches!(expanded, Node::BinaryOp(binary) => {
            assert_matches!(*binary.left, Node::Command(c) => {
                assert_eq!(c.name, "5");
                assert_eq!(c.args, Vec::<String>::new());
            });
        });
        variable::unset("RAYSHELL_TEST_CMP");
    }

    #[test]
    fn assignment_value_is_not_field_split() {
        let env = Env::new();
        variable::set("RAYSHELL_TEST_ASGN", "1 2");
        let expander = Expander::new(&env);
        let node = Node::Assignment(Assignment {
            name: "X".to_owned(),
            value: Some(Word::Double("@RAYSHELL_TEST_ASGN".to_owned())),
        });
        let expanded = expander.expand(node).unwrap();
        assert_matches!(expanded, Node::Assignment(a) => {
            assert_eq!(a.value.as_deref(), Some("1 2"));
        });
        variable::unset("RAYSHELL_TEST_ASGN");
    }

    #[test]
    fn absent_assignment_value_becomes_empty() {
        let env = Env::new();
        let expander = Expander::new(&env);
        let node = Node::Assignment(Assignment { name: "X".to_owned(), value: None });
        let expanded = expander.expand(node).unwrap();
        assert_matches!(expanded, Node::Assignment(a) => {
            assert_eq!(a.value.as_deref(), Some(""));
        });
    }

    #[test]
    fn field_split_honors_custom_ifs() {
        assert_eq!(field_split("a:b::c", ":"), ["a", "b", "c"]);
        assert_eq!(field_split("", ":"), [""]);
        assert_eq!(field_split(":::", ":"), [""]);
    }
}
