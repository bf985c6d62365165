//! Deterministic recursive-descent parser producing the concrete syntax tree.
//!
//! Each decision is made from the current token (and at most one token of
//! lookahead); nothing is ever re-parsed. The first unexpected token aborts
//! the parse with a [`SyntaxError`], which [`patterns`] refines into the most
//! specific diagnostic it recognises.

mod expression;
mod helpers;
pub mod patterns;
mod statement;

use std::fmt;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::error_codes::{ErrorCode, UNEXPECTED_TOKEN};
use crate::tree::{Node, Rule};

use super::grammar::Grammar;
use super::position::Position;
use super::token::Token;
use super::token_type::TokenType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub code: &'static ErrorCode,
    pub args: Vec<String>,
    pub position: Position,
    /// The token the parser stopped at.
    pub token: Token,
    /// Token types that would have been accepted instead.
    pub expected: Vec<TokenType>,
}

impl SyntaxError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code, &self.args).with_position(self.position)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}",
            self.to_diagnostic().short_message(),
            self.position
        )
    }
}

impl std::error::Error for SyntaxError {}

pub struct Parser<'g> {
    tokens: Vec<Token>,
    pos: usize,
    grammar: &'g Grammar,
    /// Index of the first token of the statement being parsed.
    statement_start: usize,
    function_depth: usize,
    loop_depth: usize,
}

impl<'g> Parser<'g> {
    pub fn new(tokens: Vec<Token>, grammar: &'g Grammar) -> Self {
        let mut tokens = tokens;
        if !tokens.last().is_some_and(|t| t.is(TokenType::Eof)) {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line(), t.end_column()))
                .unwrap_or((1, 1));
            tokens.push(Token::new(TokenType::Eof, "", line, column));
        }
        Self {
            tokens,
            pos: 0,
            grammar,
            statement_start: 0,
            function_depth: 0,
            loop_depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Node, SyntaxError> {
        let mut statements = Vec::new();
        while !self.at(TokenType::Eof) {
            statements.push(self.parse_statement()?.into());
        }
        Ok(Node::new(Rule::Start, statements))
    }

    /// A lone value, such as the code inside `{...}` in a string.
    pub fn parse_fragment(mut self) -> Result<Node, SyntaxError> {
        let value = self.parse_value()?;
        if !self.at(TokenType::Newline) && !self.at(TokenType::Eof) {
            return Err(self.unexpected(&[TokenType::Eof]));
        }
        Ok(value)
    }

    /// Build the error for the current token, preferring a recognised
    /// pattern over the generic unexpected-token message.
    pub(super) fn unexpected(&self, expected: &[TokenType]) -> SyntaxError {
        let token = self.current().clone();
        let context = patterns::PatternContext {
            tokens: &self.tokens,
            index: self.pos,
            statement_start: self.statement_start,
            expected,
            grammar: self.grammar,
        };
        if let Some(found) = patterns::classify(&context) {
            return SyntaxError {
                code: found.code,
                args: found.args,
                position: found.position,
                token,
                expected: expected.to_vec(),
            };
        }
        let allowed = self.describe_expected(expected);
        SyntaxError {
            code: &UNEXPECTED_TOKEN,
            args: vec![token.describe(), allowed],
            position: token.position,
            token,
            expected: expected.to_vec(),
        }
    }

    /// A structural error tied to the current token, bypassing pattern lookup.
    pub(super) fn error_here(&self, code: &'static ErrorCode) -> SyntaxError {
        let token = self.current().clone();
        SyntaxError {
            code,
            args: Vec::new(),
            position: token.position,
            token,
            expected: Vec::new(),
        }
    }

    fn describe_expected(&self, expected: &[TokenType]) -> String {
        let mut described: Vec<String> = Vec::new();
        for token_type in expected {
            let text = match token_type {
                TokenType::Name => "name".to_string(),
                TokenType::Int | TokenType::Float => "number".to_string(),
                TokenType::String => "string".to_string(),
                TokenType::Newline => "end of line".to_string(),
                TokenType::Indent => "indentation".to_string(),
                TokenType::Dedent => "dedentation".to_string(),
                TokenType::Eof => "end of story".to_string(),
                other => format!("`{}`", self.grammar.spelling(*other)),
            };
            if !described.contains(&text) {
                described.push(text);
            }
        }
        described.join(", ")
    }
}
