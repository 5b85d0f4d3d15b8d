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

//! Syntax parser for the if statement
//!
//! The surface form is
//! `if (expr) -> { … } elif (expr) -> { … } else -> { … }`,
//! with any number of `elif` clauses. Condition expressions support the
//! comparison operators, `&&`, `||`, and `|`, with parentheses for
//! grouping; operands are word sequences parsed as (never executed)
//! commands. While a condition is being parsed, `<` and `>` are read as
//! comparisons rather than redirections.

use super::error::{Error, Result, SyntaxError};
use super::{Parser, binary};
use crate::lexer::{Token, TokenKind};
use crate::syntax::{BinOp, Block, If, Node, Word};

impl Parser {
    /// Parses an if statement after its keyword has been consumed.
    ///
    /// `keyword` is `"if"` or `"elif"` and only affects error messages.
    pub(super) fn if_statement(&mut self, keyword: &'static str) -> Result<Node<Word>> {
        self.expect(
            TokenKind::OpenParen,
            SyntaxError::MissingCondition { keyword },
        )?;
        let condition = self.condition()?;
        self.expect(TokenKind::CloseParen, SyntaxError::UnclosedCondition)?;
        self.expect(TokenKind::Arrow, SyntaxError::MissingArrow)?;
        let consequent = self.block()?;

        // `elif`/`else` may follow on the same line or after newlines, but
        // the newlines must stay put if neither follows.
        let continuation = {
            let next = self.peek_after_newlines();
            if next.kind == TokenKind::Word {
                match next.lexeme.as_str() {
                    "elif" => Some("elif"),
                    "else" => Some("else"),
                    _ => None,
                }
            } else {
                None
            }
        };
        let alternative = match continuation {
            Some("elif") => {
                self.skip_newlines();
                self.advance();
                Some(Box::new(self.if_statement("elif")?))
            }
            Some("else") => {
                self.skip_newlines();
                self.advance();
                self.expect(TokenKind::Arrow, SyntaxError::MissingArrow)?;
                Some(Box::new(Node::Block(self.block()?)))
            }
            _ => None,
        };

        Ok(Node::If(If {
            condition: Box::new(condition),
            consequent,
            alternative,
        }))
    }

    /// Parses a condition expression, flipping the parser into condition
    /// context for its duration.
    fn condition(&mut self) -> Result<Node<Word>> {
        let saved = std::mem::replace(&mut self.in_condition, true);
        let result = self.condition_expression();
        self.in_condition = saved;
        result
    }

    /// `expr := primary (op primary)*` where `op` is a comparison, `&&`,
    /// `||`, or `|`
    fn condition_expression(&mut self) -> Result<Node<Word>> {
        let mut left = self.condition_primary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::GtEq => BinOp::GtEq,
                TokenKind::And => BinOp::And,
                TokenKind::Or => BinOp::Or,
                TokenKind::Pipe => BinOp::Pipe,
                _ => break,
            };
            self.advance();
            let right = self.condition_primary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// One operand: a parenthesized subexpression or a word sequence
    fn condition_primary(&mut self) -> Result<Node<Word>> {
        match self.peek_kind() {
            TokenKind::OpenParen => {
                self.advance();
                let expression = self.condition_expression()?;
                self.expect(TokenKind::CloseParen, SyntaxError::UnclosedCondition)?;
                Ok(expression)
            }
            TokenKind::Word | TokenKind::String | TokenKind::DString | TokenKind::Var => {
                match self.sequence()? {
                    Some(node) => Ok(node),
                    None => Err(self.error_here(SyntaxError::InvalidConditionToken(
                        self.spelling(),
                    ))),
                }
            }
            _ => Err(self.error_here(SyntaxError::InvalidConditionToken(self.spelling()))),
        }
    }

    /// `block := '{' (statement (NEWLINE | ';')*)* '}'`
    pub(super) fn block(&mut self) -> Result<Block<Word>> {
        self.expect(TokenKind::OpenBrace, SyntaxError::MissingBlockOpen)?;
        let mut statements = Vec::new();
        self.skip_block_separators();
        loop {
            match self.peek_kind() {
                TokenKind::CloseBrace => break,
                TokenKind::EndOfInput => {
                    return Err(self.error_here(SyntaxError::UnclosedBlock));
                }
                _ => {}
            }
            match self.statement()? {
                Some(node) => statements.push(node),
                None => {
                    return Err(
                        self.error_here(SyntaxError::UnexpectedToken(self.spelling()))
                    );
                }
            }
            self.skip_block_separators();
        }
        self.advance(); // `}`
        Ok(Block { statements })
    }

    fn skip_block_separators(&mut self) {
        while matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    /// Consumes a token of the expected kind or fails with the given cause.
    fn expect(&mut self, kind: TokenKind, cause: SyntaxError) -> Result<Token> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(Error { cause, location: self.peek().location })
        }
    }
}
