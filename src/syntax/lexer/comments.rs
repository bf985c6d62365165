//! Comment handling. Comments never produce tokens.

use crate::diagnostics::error_codes::{HASH_COMMENT, UNTERMINATED_COMMENT};

use super::{LexError, LexWarning, Lexer};

impl Lexer<'_> {
    /// Skip to (not past) the end of the line.
    pub(super) fn skip_line_comment(&mut self) {
        while self.current_char().is_some_and(|c| c != '\n') {
            self.read_char();
        }
    }

    /// Legacy `#` comments still work but are reported as deprecated.
    pub(super) fn skip_hash_comment(&mut self) {
        self.warnings.push(LexWarning {
            code: &HASH_COMMENT,
            position: self.position(),
        });
        self.skip_line_comment();
    }

    /// Skip a `/* ... */` comment, which may span lines. Does not nest.
    pub(super) fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.position();
        self.read_char();
        self.read_char();
        loop {
            match (self.current_char(), self.peek_char()) {
                (None, _) => {
                    return Err(LexError::new(&UNTERMINATED_COMMENT, Vec::new(), start));
                }
                (Some('*'), Some('/')) => {
                    self.read_char();
                    self.read_char();
                    return Ok(());
                }
                _ => self.read_char(),
            }
        }
    }
}
