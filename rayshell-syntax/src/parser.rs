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

//! Recursive-descent parser
//!
//! The [`Parser`] consumes a token vector and produces a single
//! [`Node`]`<`[`Word`]`>`, or `None` for input that contains no statements.
//! Precedence, lowest first:
//!
//! 1. The top level is a list of statements separated by newlines; two or
//!    more statements are wrapped in a [`Block`].
//! 2. `;` sequences, left-associative.
//! 3. `&&` / `||`, left-associative.
//! 4. `|` pipelines.
//! 5. Simple commands: assignment prefixes, one name word, argument words,
//!    redirections, and a trailing `&` in any order the original surface
//!    allows.
//!
//! A statement starting with a reserved word switches into the statement
//! parser in [`condition`]; only `if` is implemented, the other reserved
//! words answer [`SyntaxError::NotImplemented`].
//!
//! Two context rules are applied here rather than in the lexer: inside an
//! `if (...)` condition, `<` and `>` are comparisons instead of
//! redirections, and after a command name has been seen, an `=` token is
//! plain text again (column-adjacent `WORD = WORD` runs are re-joined, so
//! `echo a=b` passes the single argument `a=b`).

mod condition;
mod error;

pub use self::error::{Error, Result, SyntaxError};

use crate::lexer::{Token, TokenKind};
use crate::syntax::{
    Assignment, AssignmentList, BinOp, BinaryOp, Block, Command, Node, Pipeline, VarRef, Word,
};

/// Words that open a statement-level construct
const RESERVED: &[&str] = &["if", "elif", "else", "for", "while", "case"];

/// Redirection accumulator for a single command
#[derive(Default)]
struct Redirections {
    stdin: Option<Word>,
    stdout: Option<Word>,
    stdout_append: bool,
    stderr: Option<Word>,
    stderr_append: bool,
}

impl Redirections {
    fn is_empty(&self) -> bool {
        self.stdin.is_none() && self.stdout.is_none() && self.stderr.is_none()
    }
}

/// Syntax parser over a scanned token vector
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    /// Inside `if (...)`, `<` and `>` read as comparisons.
    in_condition: bool,
}

impl Parser {
    /// Creates a parser over the given tokens.
    ///
    /// The vector must end with an [`TokenKind::EndOfInput`] token, which is
    /// what [`Lexer::tokenize`](crate::lexer::Lexer::tokenize) guarantees.
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last(),
            Some(Token { kind: TokenKind::EndOfInput, .. })
        ));
        Parser { tokens, index: 0, in_condition: false }
    }

    /// Parses the whole input.
    ///
    /// Returns `None` for input without statements (empty, blank, or
    /// comment-only lines). A single statement is returned as itself; two
    /// or more are wrapped in a [`Block`].
    pub fn parse(mut self) -> Result<Option<Node<Word>>> {
        let mut statements = Vec::new();
        self.skip_newlines();
        while self.peek_kind() != TokenKind::EndOfInput {
            if let Some(node) = self.statement()? {
                statements.push(node);
            }
            match self.peek_kind() {
                TokenKind::Newline | TokenKind::EndOfInput => {}
                _ => return Err(self.error_here(SyntaxError::UnexpectedToken(self.spelling()))),
            }
            self.skip_newlines();
        }
        Ok(match statements.len() {
            0 => None,
            1 => statements.pop(),
            _ => Some(Node::Block(Block { statements })),
        })
    }

    /// Parses one statement: a reserved construct or a `;` sequence.
    fn statement(&mut self) -> Result<Option<Node<Word>>> {
        let token = self.peek();
        if token.kind == TokenKind::Word && RESERVED.contains(&token.lexeme.as_str()) {
            let keyword = self.advance();
            return match keyword.lexeme.as_str() {
                "if" => self.if_statement("if").map(Some),
                "elif" => Err(Error {
                    cause: SyntaxError::UnopenedElif,
                    location: keyword.location,
                }),
                "else" => Err(Error {
                    cause: SyntaxError::UnopenedElse,
                    location: keyword.location,
                }),
                _ => Err(Error {
                    cause: SyntaxError::NotImplemented(keyword.lexeme.clone()),
                    location: keyword.location,
                }),
            };
        }
        self.sequence()
    }

    /// `seq := logical (';' logical)*`
    pub(crate) fn sequence(&mut self) -> Result<Option<Node<Word>>> {
        let Some(mut node) = self.logical()? else {
            return Ok(None);
        };
        while self.peek_kind() == TokenKind::Semicolon {
            self.advance();
            // A trailing `;` is allowed.
            let Some(right) = self.logical()? else { break };
            node = binary(BinOp::Seq, node, right);
        }
        Ok(Some(node))
    }

    /// `logical := pipeline (('&&' | '||') pipeline)*`
    fn logical(&mut self) -> Result<Option<Node<Word>>> {
        let Some(mut node) = self.pipeline()? else {
            return Ok(None);
        };
        loop {
            let op = match self.peek_kind() {
                TokenKind::And => BinOp::And,
                TokenKind::Or => BinOp::Or,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let Some(right) = self.pipeline()? else {
                return Err(self.error_here(SyntaxError::UnexpectedToken(self.spelling())));
            };
            node = binary(op, node, right);
        }
        Ok(Some(node))
    }

    /// `pipeline := command ('|' command)*`
    ///
    /// A lone command is returned as is; a real pipeline has at least two
    /// members and its background flag is the disjunction of theirs.
    fn pipeline(&mut self) -> Result<Option<Node<Word>>> {
        let Some(first) = self.command()? else {
            return Ok(None);
        };
        if self.peek_kind() != TokenKind::Pipe {
            return Ok(Some(first));
        }
        let Node::Command(first) = first else {
            return Err(self.error_here(SyntaxError::UnexpectedToken(self.spelling())));
        };
        let mut commands = vec![first];
        while self.peek_kind() == TokenKind::Pipe {
            self.advance();
            match self.command()? {
                Some(Node::Command(command)) => commands.push(command),
                _ => {
                    return Err(
                        self.error_here(SyntaxError::UnexpectedToken(self.spelling()))
                    );
                }
            }
        }
        let background = commands.iter().any(|c| c.background);
        Ok(Some(Node::Pipeline(Pipeline { commands, background })))
    }

    /// Parses one simple command, or an assignment statement if no command
    /// name ever appears.
    fn command(&mut self) -> Result<Option<Node<Word>>> {
        let mut assignments = Vec::new();
        let mut redirections = Redirections::default();
        let mut name: Option<Word> = None;
        let mut args: Vec<Word> = Vec::new();
        let mut background = false;
        // End position of the last bare argument, for `=` re-joining
        let mut last_arg_end: Option<(u64, u64)> = None;

        loop {
            let kind = self.peek_kind();
            match kind {
                TokenKind::Word
                    if name.is_none() && self.peek_kind_at(1) == TokenKind::Eq =>
                {
                    assignments.push(self.assignment());
                }
                TokenKind::Ampersand => {
                    self.advance();
                    background = true;
                }
                TokenKind::Gt | TokenKind::Lt if self.in_condition => break,
                TokenKind::Gt
                | TokenKind::Lt
                | TokenKind::AppendOut
                | TokenKind::RedirErr
                | TokenKind::AppendErr => {
                    self.redirection(&mut redirections)?;
                    last_arg_end = None;
                }
                TokenKind::Var => {
                    let token = self.advance();
                    if name.is_none() {
                        return Ok(Some(Node::VarRef(VarRef { name: token.lexeme })));
                    }
                    args.push(Word::Var(token.lexeme));
                    last_arg_end = None;
                }
                TokenKind::Word | TokenKind::String | TokenKind::DString => {
                    let token = self.advance();
                    if name.is_none() {
                        name = Some(word_of(token));
                    } else {
                        if token.kind == TokenKind::Word {
                            let end = token.location.column
                                + token.lexeme.chars().count() as u64;
                            last_arg_end = Some((token.location.line, end));
                        } else {
                            last_arg_end = None;
                        }
                        args.push(word_of(token));
                    }
                }
                TokenKind::Eq if name.is_some() => {
                    let eq = self.advance();
                    let adjacent = matches!(
                        last_arg_end,
                        Some((line, column))
                            if line == eq.location.line && column == eq.location.column
                    );
                    let mut text = if adjacent {
                        match args.pop() {
                            Some(Word::Bare(text)) => text,
                            _ => unreachable!("adjacency is only recorded for bare words"),
                        }
                    } else {
                        String::new()
                    };
                    text.push('=');
                    let mut end = eq.location.column + 1;
                    let next = self.peek();
                    if next.kind == TokenKind::Word
                        && next.location.line == eq.location.line
                        && next.location.column == end
                    {
                        let next = self.advance();
                        end += next.lexeme.chars().count() as u64;
                        text.push_str(&next.lexeme);
                    }
                    args.push(Word::Bare(text));
                    last_arg_end = Some((eq.location.line, end));
                }
                _ => break,
            }
        }

        if name.is_none() {
            if !assignments.is_empty() && redirections.is_empty() {
                return Ok(Some(if assignments.len() == 1 {
                    Node::Assignment(assignments.pop().unwrap())
                } else {
                    Node::AssignmentList(AssignmentList { assignments })
                }));
            }
            if assignments.is_empty() && redirections.is_empty() {
                return Ok(None);
            }
            return Err(self.error_here(SyntaxError::MissingCommandName));
        }

        Ok(Some(Node::Command(Command {
            name: name.unwrap(),
            args,
            stdin: redirections.stdin,
            stdout: redirections.stdout,
            stdout_append: redirections.stdout_append,
            stderr: redirections.stderr,
            stderr_append: redirections.stderr_append,
            assignments,
            background,
        })))
    }

    /// Parses a `name=value` assignment. The caller has verified the
    /// `WORD =` lookahead.
    fn assignment(&mut self) -> Assignment<Word> {
        let name = self.advance().lexeme;
        self.advance(); // `=`
        let value = match self.peek_kind() {
            TokenKind::Word | TokenKind::String | TokenKind::DString => {
                Some(word_of(self.advance()))
            }
            _ => None,
        };
        Assignment { name, value }
    }

    /// Parses one redirection operator and its target word.
    fn redirection(&mut self, redirections: &mut Redirections) -> Result<()> {
        let operator = self.advance();
        let target = match self.peek_kind() {
            TokenKind::Word | TokenKind::String | TokenKind::DString => {
                word_of(self.advance())
            }
            _ => {
                return Err(self.error_here(SyntaxError::ExpectedRedirTarget));
            }
        };
        match operator.kind {
            TokenKind::Lt => redirections.stdin = Some(target),
            TokenKind::Gt => {
                redirections.stdout = Some(target);
                redirections.stdout_append = false;
            }
            TokenKind::AppendOut => {
                redirections.stdout = Some(target);
                redirections.stdout_append = true;
            }
            TokenKind::RedirErr => {
                redirections.stderr = Some(target);
                redirections.stderr_append = false;
            }
            TokenKind::AppendErr => {
                redirections.stderr = Some(target);
                redirections.stderr_append = true;
            }
            _ => unreachable!("caller only dispatches redirection operators"),
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        let index = (self.index + offset).min(self.tokens.len() - 1);
        self.tokens[index].kind
    }

    /// First token beyond any newlines, without consuming anything
    fn peek_after_newlines(&self) -> &Token {
        let mut index = self.index.min(self.tokens.len() - 1);
        while self.tokens[index].kind == TokenKind::Newline {
            index += 1;
        }
        &self.tokens[index]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn skip_newlines(&mut self) {
        while self.peek_kind() == TokenKind::Newline {
            self.advance();
        }
    }

    /// Printable spelling of the current token, for error messages
    fn spelling(&self) -> String {
        let token = self.peek();
        if token.lexeme.is_empty() {
            token.kind.to_string()
        } else {
            token.lexeme.clone()
        }
    }

    fn error_here(&self, cause: SyntaxError) -> Error {
        Error { cause, location: self.peek().location }
    }
}

fn word_of(token: Token) -> Word {
    match token.kind {
        TokenKind::Word => Word::Bare(token.lexeme),
        TokenKind::String => Word::Single(token.lexeme),
        TokenKind::DString => Word::Double(token.lexeme),
        TokenKind::Var => Word::Var(token.lexeme),
        _ => unreachable!("not a word token: {:?}", token.kind),
    }
}

fn binary(op: BinOp, left: Node<Word>, right: Node<Word>) -> Node<Word> {
    Node::BinaryOp(BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use assert_matches::assert_matches;

    fn parse(source: &str) -> Option<Node<Word>> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn parse_err(source: &str) -> Error {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap_err()
    }

    fn bare(text: &str) -> Word {
        Word::Bare(text.to_owned())
    }

    #[test]
    fn empty_input_parses_to_none() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   \n\n"), None);
        assert_eq!(parse("# comment only"), None);
    }

    #[test]
    fn simple_command_with_args() {
        let node = parse("ls -l /tmp").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(command.name, bare("ls"));
            assert_eq!(command.args, [bare("-l"), bare("/tmp")]);
            assert!(!command.background);
        });
    }

    #[test]
    fn three_command_pipeline() {
        let node = parse("a | b | c").unwrap();
        assert_matches!(node, Node::Pipeline(pipeline) => {
            let names: Vec<_> = pipeline.commands.iter().map(|c| &c.name).collect();
            assert_eq!(names, [&bare("a"), &bare("b"), &bare("c")]);
            assert!(!pipeline.background);
        });
    }

    #[test]
    fn logical_operators_are_left_associative() {
        let node = parse("a && b || c").unwrap();
        assert_matches!(node, Node::BinaryOp(outer) => {
            assert_eq!(outer.op, BinOp::Or);
            assert_matches!(*outer.left, Node::BinaryOp(inner) => {
                assert_eq!(inner.op, BinOp::And);
            });
            assert_matches!(*outer.right, Node::Command(c) => {
                assert_eq!(c.name, bare("c"));
            });
        });
    }

    #[test]
    fn semicolon_sequences_are_left_associative() {
        let node = parse("a; b; c").unwrap();
        assert_matches!(node, Node::BinaryOp(outer) => {
            assert_eq!(outer.op, BinOp::Seq);
            assert_matches!(*outer.left, Node::BinaryOp(inner) => {
                assert_eq!(inner.op, BinOp::Seq);
            });
        });
    }

    #[test]
    fn assignment_prefixes_attach_to_the_command() {
        let node = parse("X=1 Y=2 cmd z").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(command.name, bare("cmd"));
            assert_eq!(command.args, [bare("z")]);
            assert_eq!(command.assignments.len(), 2);
            assert_eq!(command.assignments[0].name, "X");
            assert_eq!(command.assignments[0].value, Some(bare("1")));
            assert_eq!(command.assignments[1].name, "Y");
            assert_eq!(command.assignments[1].value, Some(bare("2")));
        });
    }

    #[test]
    fn assignments_alone_become_a_list() {
        let node = parse("X=1 Y=2").unwrap();
        assert_matches!(node, Node::AssignmentList(list) => {
            assert_eq!(list.assignments.len(), 2);
        });
    }

    #[test]
    fn single_assignment_stays_single() {
        let node = parse("X='a b'").unwrap();
        assert_matches!(node, Node::Assignment(assignment) => {
            assert_eq!(assignment.name, "X");
            assert_eq!(assignment.value, Some(Word::Single("a b".to_owned())));
        });
    }

    #[test]
    fn assignment_without_value() {
        let node = parse("X=").unwrap();
        assert_matches!(node, Node::Assignment(assignment) => {
            assert_eq!(assignment.name, "X");
            assert_eq!(assignment.value, None);
        });
    }

    #[test]
    fn equals_in_argument_position_is_text() {
        let node = parse("echo a=b").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(command.args, [bare("a=b")]);
        });
    }

    #[test]
    fn spaced_equals_stays_separate() {
        let node = parse("echo a = b").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(command.args, [bare("a"), bare("="), bare("b")]);
        });
    }

    #[test]
    fn chained_equals_rejoin() {
        let node = parse("echo a=b=c").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(command.args, [bare("a=b=c")]);
        });
    }

    #[test]
    fn redirections_are_collected() {
        let node = parse("cmd <in >out 2>>err").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(command.stdin, Some(bare("in")));
            assert_eq!(command.stdout, Some(bare("out")));
            assert!(!command.stdout_append);
            assert_eq!(command.stderr, Some(bare("err")));
            assert!(command.stderr_append);
        });
    }

    #[test]
    fn append_redirection_sets_the_flag() {
        let node = parse("cmd >>log").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(command.stdout, Some(bare("log")));
            assert!(command.stdout_append);
        });
    }

    #[test]
    fn redirection_without_target_is_an_error() {
        let error = parse_err("echo >");
        assert_eq!(error.cause, SyntaxError::ExpectedRedirTarget);
    }

    #[test]
    fn redirection_without_command_is_an_error() {
        let error = parse_err("> file");
        assert_eq!(error.cause, SyntaxError::MissingCommandName);
    }

    #[test]
    fn background_flag_on_command() {
        let node = parse("sleep 30 &").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert!(command.background);
        });
    }

    #[test]
    fn background_bubbles_up_to_the_pipeline() {
        let node = parse("a | b &").unwrap();
        assert_matches!(node, Node::Pipeline(pipeline) => {
            assert!(pipeline.background);
        });
    }

    #[test]
    fn var_in_head_position_is_a_var_ref() {
        let node = parse("@greeting").unwrap();
        assert_matches!(node, Node::VarRef(var_ref) => {
            assert_eq!(var_ref.name, "greeting");
        });
    }

    #[test]
    fn var_in_argument_position_keeps_its_tag() {
        let node = parse("echo @x tail").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(
                command.args,
                [Word::Var("x".to_owned()), bare("tail")]
            );
        });
    }

    #[test]
    fn quoted_words_keep_their_tags() {
        let node = parse(r#"echo 'a b' "c @d""#).unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(
                command.args,
                [
                    Word::Single("a b".to_owned()),
                    Word::Double("c @d".to_owned())
                ]
            );
        });
    }

    #[test]
    fn newline_separated_statements_form_a_block() {
        let node = parse("a\nb\nc").unwrap();
        assert_matches!(node, Node::Block(block) => {
            assert_eq!(block.statements.len(), 3);
        });
    }

    #[test]
    fn reserved_word_for_is_not_implemented() {
        let error = parse_err("for x in a b");
        assert_eq!(
            error.cause,
            SyntaxError::NotImplemented("for".to_owned())
        );
    }

    #[test]
    fn stray_elif_is_an_error() {
        let error = parse_err("elif (a) -> { b }");
        assert_eq!(error.cause, SyntaxError::UnopenedElif);
    }

    #[test]
    fn reserved_words_are_plain_args_after_a_name() {
        let node = parse("echo if else").unwrap();
        assert_matches!(node, Node::Command(command) => {
            assert_eq!(command.args, [bare("if"), bare("else")]);
        });
    }

    #[test]
    fn error_location_points_at_the_offending_token() {
        let error = parse_err("a ;; b");
        assert_eq!(error.location.line, 1);
        assert_eq!(error.location.column, 4);
    }
}
