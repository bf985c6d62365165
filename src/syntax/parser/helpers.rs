use crate::syntax::token::Token;
use crate::syntax::token_type::TokenType;

use super::{Parser, SyntaxError};

impl Parser<'_> {
    // Token navigation. `pos` never moves past the trailing `Eof`.
    pub(super) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(super) fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos + 1)
            .unwrap_or_else(|| self.current())
    }

    pub(super) fn at(&self, token_type: TokenType) -> bool {
        self.current().is(token_type)
    }

    pub(super) fn peek_is(&self, token_type: TokenType) -> bool {
        self.peek().is(token_type)
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(super) fn expect(&mut self, token_type: TokenType) -> Result<Token, SyntaxError> {
        if self.at(token_type) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[token_type]))
        }
    }

    /// A user-chosen name: a `Name` token that is not reserved for future use.
    pub(super) fn expect_name(&mut self) -> Result<Token, SyntaxError> {
        if self.at(TokenType::Name) && !self.grammar.is_reserved(&self.current().literal) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[TokenType::Name]))
        }
    }

    pub(super) fn at_name(&self) -> bool {
        self.at(TokenType::Name) && !self.grammar.is_reserved(&self.current().literal)
    }

    /// `as <type>` following a value. Plain `as <name>` is an output binding instead.
    pub(super) fn at_cast(&self) -> bool {
        if !self.at(TokenType::As) {
            return false;
        }
        let next = self.peek();
        next.is(TokenType::Function)
            || (next.is(TokenType::Name) && self.grammar.is_type_name(&next.literal))
    }
}
