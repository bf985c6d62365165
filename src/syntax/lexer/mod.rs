//! The story lexer: turns source text into a flat token stream.
//!
//! Layout is explicit in the output. Every logical line ends in a `Newline`
//! token, and indentation changes produce `Indent`/`Dedent` tokens from an
//! offside stack. Newlines inside brackets are not significant.

mod comments;
mod helpers;
mod indent;
mod strings;

use std::fmt;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::error_codes::{ErrorCode, INTEGER_TOO_LARGE, INVALID_CHARACTER};

use super::grammar::Grammar;
use super::position::Position;
use super::token::Token;
use super::token_type::TokenType;

use helpers::{is_letter, is_name_char};

/// A fatal lexical fault. Lexing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub code: &'static ErrorCode,
    pub args: Vec<String>,
    pub position: Position,
}

impl LexError {
    pub(crate) fn new(code: &'static ErrorCode, args: Vec<String>, position: Position) -> Self {
        Self {
            code,
            args,
            position,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code, &self.args).with_position(self.position)
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}",
            self.to_diagnostic().short_message(),
            self.position
        )
    }
}

impl std::error::Error for LexError {}

/// Non-fatal finding recorded while lexing (deprecated syntax).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexWarning {
    pub code: &'static ErrorCode,
    pub position: Position,
}

impl LexWarning {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new::<&str>(self.code, &[]).with_position(self.position)
    }
}

#[derive(Debug, Clone)]
pub struct Lexer<'g> {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    grammar: &'g Grammar,
    single_quotes: bool,
    indent_stack: Vec<usize>,
    bracket_depth: usize,
    at_line_start: bool,
    tokens: Vec<Token>,
    warnings: Vec<LexWarning>,
}

impl<'g> Lexer<'g> {
    pub fn new(input: &str, grammar: &'g Grammar) -> Self {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            grammar,
            single_quotes: false,
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
            tokens: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Accept `'...'` string literals as well as `"..."`.
    pub fn with_single_quotes(mut self, enabled: bool) -> Self {
        self.single_quotes = enabled;
        self
    }

    pub fn warnings(&self) -> &[LexWarning] {
        &self.warnings
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        loop {
            if self.at_line_start && self.bracket_depth == 0 && !self.start_line()? {
                break;
            }
            self.skip_inline_whitespace();

            let Some(ch) = self.current_char() else {
                break;
            };
            let line = self.line;
            let col = self.column;

            match ch {
                '\n' => {
                    self.read_char();
                    if self.bracket_depth == 0 {
                        self.push(Token::new(TokenType::Newline, "\n", line, col));
                        self.at_line_start = true;
                    }
                }
                '/' if self.peek_char() == Some('/') => self.skip_line_comment(),
                '/' if self.peek_char() == Some('*') => self.skip_block_comment()?,
                '#' => self.skip_hash_comment(),
                '"' => self.read_string('"')?,
                '\'' if self.single_quotes => self.read_string('\'')?,
                c if is_letter(c) => self.read_name(),
                c if c.is_ascii_digit() => self.read_number()?,
                _ => self.read_symbol()?,
            }
        }

        self.finish();
        Ok(std::mem::take(&mut self.tokens))
    }

    fn finish(&mut self) {
        let line = self.line;
        let col = self.column;
        if self
            .tokens
            .last()
            .is_some_and(|token| !token.is(TokenType::Newline))
        {
            self.push(Token::new(TokenType::Newline, "\n", line, col));
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(Token::new(TokenType::Dedent, "", line, col));
        }
        self.push(Token::new(TokenType::Eof, "", line, col));
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos + 1).copied()
    }

    fn previous_char(&self) -> Option<char> {
        self.pos.checked_sub(1).and_then(|i| self.input.get(i).copied())
    }

    fn read_char(&mut self) {
        match self.current_char() {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => return,
        }
        self.pos += 1;
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn skip_inline_whitespace(&mut self) {
        while matches!(self.current_char(), Some(' ' | '\t' | '\r' | '\u{c}')) {
            self.read_char();
        }
    }

    fn read_name(&mut self) {
        let line = self.line;
        let col = self.column;
        let mut word = String::new();
        while let Some(ch) = self.current_char().filter(|c| is_name_char(*c)) {
            word.push(ch);
            self.read_char();
        }
        let token_type = self.grammar.keyword(&word).unwrap_or(TokenType::Name);
        self.push(Token::new(token_type, word, line, col));
    }

    fn read_number(&mut self) -> Result<(), LexError> {
        let line = self.line;
        let col = self.column;
        let mut literal = self.read_digits();
        let mut token_type = TokenType::Int;
        if self.current_char() == Some('.') && self.peek_char().is_some_and(|c| c.is_ascii_digit())
        {
            self.read_char();
            literal.push('.');
            literal.push_str(&self.read_digits());
            token_type = TokenType::Float;
        }
        // ints are emitted as i64
        if token_type == TokenType::Int && literal.parse::<i64>().is_err() {
            return Err(LexError::new(
                &INTEGER_TOO_LARGE,
                vec![literal],
                Position::new(line, col),
            ));
        }
        self.push(Token::new(token_type, literal, line, col));
        Ok(())
    }

    fn read_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.current_char().filter(char::is_ascii_digit) {
            digits.push(ch);
            self.read_char();
        }
        digits
    }

    fn read_symbol(&mut self) -> Result<(), LexError> {
        let line = self.line;
        let col = self.column;
        let Some(ch) = self.current_char() else {
            return Ok(());
        };

        if let Some(next) = self.peek_char() {
            let pair: String = [ch, next].iter().collect();
            if let Some(token_type) = TokenType::from_symbol(&pair) {
                self.read_char();
                self.read_char();
                self.push(Token::new(token_type, pair, line, col));
                return Ok(());
            }
        }

        let token_type = match ch {
            '(' | '[' | '{' => {
                self.bracket_depth += 1;
                match ch {
                    '(' => TokenType::LParen,
                    '[' => TokenType::LBracket,
                    _ => TokenType::LBrace,
                }
            }
            ')' | ']' | '}' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                match ch {
                    ')' => TokenType::RParen,
                    ']' => TokenType::RBracket,
                    _ => TokenType::RBrace,
                }
            }
            ',' => TokenType::Comma,
            ':' => TokenType::Colon,
            '.' => TokenType::Dot,
            other => match TokenType::from_symbol(&other.to_string()) {
                Some(token_type) => token_type,
                None => {
                    return Err(LexError::new(
                        &INVALID_CHARACTER,
                        vec![other.to_string()],
                        Position::new(line, col),
                    ));
                }
            },
        };
        self.read_char();
        self.push(Token::new(token_type, ch.to_string(), line, col));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::grammar::default_grammar;

    fn kinds(source: &str) -> Vec<TokenType> {
        let grammar = default_grammar().unwrap();
        Lexer::new(source, &grammar)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    fn lex_err(source: &str) -> LexError {
        let grammar = default_grammar().unwrap();
        Lexer::new(source, &grammar).tokenize().unwrap_err()
    }

    #[test]
    fn simple_assignment() {
        use TokenType::*;
        assert_eq!(kinds("a = 1"), vec![Name, Assign, Int, Newline, Eof]);
        assert_eq!(kinds("a = 1.5\n"), vec![Name, Assign, Float, Newline, Eof]);
    }

    #[test]
    fn missing_trailing_newline_is_synthesized_at_end_column() {
        let grammar = default_grammar().unwrap();
        let tokens = Lexer::new("foo =", &grammar).tokenize().unwrap();
        let newline = &tokens[2];
        assert!(newline.is(TokenType::Newline));
        assert_eq!(newline.column(), 6);
    }

    #[test]
    fn empty_and_comment_only_sources() {
        assert_eq!(kinds(""), vec![TokenType::Eof]);
        assert_eq!(kinds("// foo\n"), vec![TokenType::Eof]);
        assert_eq!(kinds("/* a\n b */\n\n"), vec![TokenType::Eof]);
    }

    #[test]
    fn keywords_follow_the_grammar() {
        use TokenType::*;
        assert_eq!(
            kinds("foreach items as item"),
            vec![Foreach, Name, As, Name, Newline, Eof]
        );
    }

    #[test]
    fn brackets_suppress_newlines() {
        use TokenType::*;
        assert_eq!(
            kinds("a = [1,\n   2]\n"),
            vec![Name, Assign, LBracket, Int, Comma, Int, RBracket, Newline, Eof]
        );
    }

    #[test]
    fn invalid_character() {
        let err = lex_err("a = $");
        assert_eq!(err.code.code, "E0041");
        assert_eq!(err.args, vec!["$".to_string()]);
        assert_eq!(err.position, Position::new(1, 5));
    }

    #[test]
    fn integer_overflow_names_the_literal() {
        let err = lex_err("a = 99999999999999999999\n");
        assert_eq!(err.code.code, "E0052");
        assert_eq!(err.args, vec!["99999999999999999999".to_string()]);
        assert_eq!(err.position, Position::new(1, 5));

        use TokenType::*;
        assert_eq!(
            kinds("a = 9223372036854775807\nb = 99999999999999999999.5\n"),
            vec![Name, Assign, Int, Newline, Name, Assign, Float, Newline, Eof]
        );
    }

    #[test]
    fn bom_is_ignored() {
        use TokenType::*;
        assert_eq!(kinds("\u{feff}a = 1"), vec![Name, Assign, Int, Newline, Eof]);
    }

    #[test]
    fn hash_comments_are_deprecated() {
        let grammar = default_grammar().unwrap();
        let mut lexer = Lexer::new("# old\na = 1 # trailing\n", &grammar);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(lexer.warnings().len(), 2);
        assert_eq!(lexer.warnings()[0].code.code, "E0151");
        assert_eq!(lexer.warnings()[1].position, Position::new(2, 7));
    }
}
