//! String literals.
//!
//! The token literal is the raw text between the quotes: escapes and
//! `{expr}` interpolations are kept verbatim and resolved by lowering. The
//! lexer only checks that quotes and interpolation braces are balanced on
//! the line.

use crate::diagnostics::error_codes::{
    STRING_CLOSING_QUOTE, STRING_OPENING_QUOTE, UNTERMINATED_INTERPOLATION,
};

use super::super::token::Token;
use super::super::token_type::TokenType;
use super::helpers::is_name_char;
use super::{LexError, Lexer};

impl Lexer<'_> {
    pub(super) fn read_string(&mut self, quote: char) -> Result<(), LexError> {
        let start = self.position();
        // `foo"` is a name glued to a quote that opens nothing.
        let glued_to_name = self.previous_char().is_some_and(is_name_char);
        self.read_char();

        let mut content = String::new();
        loop {
            match self.current_char() {
                None | Some('\n') => {
                    let code = if glued_to_name {
                        &STRING_OPENING_QUOTE
                    } else {
                        &STRING_CLOSING_QUOTE
                    };
                    return Err(LexError::new(code, Vec::new(), start));
                }
                Some(c) if c == quote => {
                    self.read_char();
                    break;
                }
                Some('\\') => self.read_escape(&mut content),
                Some('{') => self.read_interpolation(&mut content, quote)?,
                Some(c) => {
                    content.push(c);
                    self.read_char();
                }
            }
        }

        self.push(Token::new(
            TokenType::String,
            content,
            start.line,
            start.column,
        ));
        Ok(())
    }

    fn read_escape(&mut self, content: &mut String) {
        content.push('\\');
        self.read_char();
        if let Some(c) = self.current_char().filter(|c| *c != '\n') {
            content.push(c);
            self.read_char();
        }
    }

    /// Copy a `{...}` interpolation, allowing nested braces and quoted keys.
    fn read_interpolation(&mut self, content: &mut String, quote: char) -> Result<(), LexError> {
        let start = self.position();
        let unterminated = || LexError::new(&UNTERMINATED_INTERPOLATION, Vec::new(), start);
        let mut depth = 0usize;
        let mut in_string = false;

        loop {
            let Some(c) = self.current_char().filter(|c| *c != '\n') else {
                return Err(unterminated());
            };
            match c {
                '\\' if in_string => {
                    self.read_escape(content);
                    continue;
                }
                c if c == quote => {
                    if depth == 0 {
                        return Err(unterminated());
                    }
                    in_string = !in_string;
                }
                '{' if !in_string => depth += 1,
                '}' if !in_string => depth -= 1,
                _ => {}
            }
            content.push(c);
            self.read_char();
            if depth == 0 {
                return Ok(());
            }
        }
    }
}
