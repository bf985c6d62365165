//! Offside rule handling at the start of each logical line.

use crate::diagnostics::error_codes::INDENTATION_MISMATCH;

use super::super::position::Position;
use super::super::token::Token;
use super::super::token_type::TokenType;
use super::{LexError, Lexer};

/// Tabs advance to the next multiple of this width.
const TAB_WIDTH: usize = 4;

impl Lexer<'_> {
    /// Consume blank and comment-only lines, then emit indentation tokens for
    /// the first line with content. Returns false at end of input.
    pub(super) fn start_line(&mut self) -> Result<bool, LexError> {
        loop {
            let width = self.measure_indentation();
            match (self.current_char(), self.peek_char()) {
                (None, _) => return Ok(false),
                (Some('\n'), _) => self.read_char(),
                (Some('/'), Some('/')) => self.skip_line_comment(),
                (Some('#'), _) => self.skip_hash_comment(),
                (Some('/'), Some('*')) => {
                    self.skip_block_comment()?;
                    self.skip_inline_whitespace();
                    if self.rest_of_line_is_blank() {
                        continue;
                    }
                    // Code shares the line with the comment; it starts where it stands.
                    let width = self.column - 1;
                    self.apply_indentation(width)?;
                    self.at_line_start = false;
                    return Ok(true);
                }
                _ => {
                    self.apply_indentation(width)?;
                    self.at_line_start = false;
                    return Ok(true);
                }
            }
        }
    }

    fn measure_indentation(&mut self) -> usize {
        let mut width = 0;
        loop {
            match self.current_char() {
                Some(' ') => width += 1,
                Some('\t') => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                Some('\r' | '\u{c}') => {}
                _ => return width,
            }
            self.read_char();
        }
    }

    fn rest_of_line_is_blank(&self) -> bool {
        match (self.current_char(), self.peek_char()) {
            (None | Some('\n') | Some('#'), _) => true,
            (Some('/'), Some('/' | '*')) => true,
            _ => false,
        }
    }

    fn apply_indentation(&mut self, width: usize) -> Result<(), LexError> {
        let line = self.line;
        let col = self.column;
        let current = self.indent_stack.last().copied().unwrap_or(0);

        if width > current {
            self.indent_stack.push(width);
            self.push(Token::new(TokenType::Indent, "", line, col));
        } else if width < current {
            while let Some(top) = self.indent_stack.last().copied() {
                if top <= width {
                    break;
                }
                self.indent_stack.pop();
                self.push(Token::new(TokenType::Dedent, "", line, col));
            }
            if self.indent_stack.last().copied().unwrap_or(0) != width {
                return Err(LexError::new(
                    &INDENTATION_MISMATCH,
                    Vec::new(),
                    Position::new(line, col),
                ));
            }
        }
        Ok(())
    }
}
