use std::fmt;

use super::position::Position;
use super::token_type::TokenType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
    pub position: Position,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        literal: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            token_type,
            literal: literal.into(),
            position: Position::new(line, column),
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }

    /// Column directly after the last character of this token.
    pub fn end_column(&self) -> usize {
        self.position.column + self.literal.chars().count()
    }

    /// Text used when the token is quoted in a diagnostic.
    pub fn describe(&self) -> String {
        match self.token_type {
            TokenType::Newline => "end of line".to_string(),
            TokenType::Eof => "end of story".to_string(),
            TokenType::Indent => "indentation".to_string(),
            TokenType::Dedent => "dedentation".to_string(),
            _ => self.literal.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token({}, {:?}, {})",
            self.token_type, self.literal, self.position
        )
    }
}
