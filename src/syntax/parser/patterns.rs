//! Recognised error shapes.
//!
//! When the parser stops at an unexpected token, [`classify`] looks at the
//! surrounding tokens and returns the most specific diagnostic that fits.
//! Checks run in a fixed order; the first match wins.

use crate::diagnostics::error_codes::{
    ARGUMENTS_NO_MUTATION, ARGUMENTS_NO_SERVICE, ASSIGNMENT_INCOMPLETE, ErrorCode,
    FUNCTION_MISSPELL, IMPORT_MISSPELL, IMPORT_MISSPELL_AS, IMPORT_UNQUOTED_FILE,
    LIST_CLOSING_BRACKET, LIST_OPENING_BRACKET, LIST_TRAILING_COMMA, NO_OPERATOR,
    OBJECT_CLOSING_BRACKET, OBJECT_OPENING_BRACKET, SERVICE_ARGUMENT_COLON, UNNECESSARY_COLON,
    VARIABLES_BACKSLASH, VARIABLES_DASH, future_reserved_keyword, reserved_keyword,
};
use crate::diagnostics::suggestions::is_misspelling;
use crate::syntax::grammar::Grammar;
use crate::syntax::position::Position;
use crate::syntax::token::Token;
use crate::syntax::token_type::TokenType;

pub struct PatternContext<'a> {
    pub tokens: &'a [Token],
    /// Index of the offending token.
    pub index: usize,
    pub statement_start: usize,
    pub expected: &'a [TokenType],
    pub grammar: &'a Grammar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub code: &'static ErrorCode,
    pub args: Vec<String>,
    pub position: Position,
}

impl PatternMatch {
    fn at(code: &'static ErrorCode, token: &Token) -> Self {
        Self {
            code,
            args: Vec::new(),
            position: token.position,
        }
    }
}

impl<'a> PatternContext<'a> {
    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    fn previous(&self) -> Option<&'a Token> {
        self.index.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    fn next(&self) -> Option<&'a Token> {
        self.tokens.get(self.index + 1)
    }

    /// Tokens of the current statement up to, not including, the offending one.
    fn statement(&self) -> &'a [Token] {
        let start = self.statement_start.min(self.index);
        &self.tokens[start..self.index.min(self.tokens.len())]
    }

    fn expects(&self, token_type: TokenType) -> bool {
        self.expected.contains(&token_type)
    }
}

type Check = fn(&PatternContext<'_>, &Token) -> Option<PatternMatch>;

const CHECKS: &[Check] = &[
    reserved_word,
    incomplete_assignment,
    chained_mutation,
    trailing_comma,
    unclosed_bracket,
    unopened_bracket,
    unnecessary_colon,
    argument_without_service,
    argument_colon,
    variable_name_operator,
    import_statement,
    misspelt_keyword,
    missing_operator,
];

pub fn classify(context: &PatternContext<'_>) -> Option<PatternMatch> {
    let current = context.current()?;
    CHECKS.iter().find_map(|check| check(context, current))
}

/// A keyword used as a name, either where a name is expected or as the
/// target of an assignment, and words held back for future use.
fn reserved_word(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    if context.expects(TokenType::Name)
        && let Some(code) = current.token_type.keyword_name().and_then(reserved_keyword)
    {
        return Some(PatternMatch::at(code, current));
    }
    if current.is(TokenType::Assign)
        && context.index == context.statement_start + 1
        && let Some(previous) = context.previous()
        && let Some(code) = previous.token_type.keyword_name().and_then(reserved_keyword)
    {
        return Some(PatternMatch::at(code, previous));
    }
    if current.is(TokenType::Name)
        && context.grammar.is_reserved(&current.literal)
        && let Some(code) = future_reserved_keyword(&current.literal)
    {
        return Some(PatternMatch::at(code, current));
    }
    None
}

/// `foo =` with nothing after the `=`.
fn incomplete_assignment(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    let previous = context.previous()?;
    let at_end = current.is(TokenType::Newline) || current.is(TokenType::Eof);
    (previous.is(TokenType::Assign) && at_end)
        .then(|| PatternMatch::at(&ASSIGNMENT_INCOMPLETE, current))
}

fn chained_mutation(_context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    current
        .is(TokenType::Then)
        .then(|| PatternMatch::at(&ARGUMENTS_NO_MUTATION, current))
}

fn trailing_comma(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    let previous = context.previous()?;
    (current.is(TokenType::RBracket) && previous.is(TokenType::Comma))
        .then(|| PatternMatch::at(&LIST_TRAILING_COMMA, previous))
}

/// Innermost bracket opened in the statement and not yet closed.
fn open_bracket(context: &PatternContext<'_>) -> Option<TokenType> {
    let mut stack = Vec::new();
    for token in context.statement() {
        match token.token_type {
            TokenType::LBracket | TokenType::LBrace | TokenType::LParen => {
                stack.push(token.token_type)
            }
            TokenType::RBracket | TokenType::RBrace | TokenType::RParen => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack.pop()
}

fn unclosed_bracket(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    let closing = match open_bracket(context)? {
        TokenType::LBracket if context.expects(TokenType::RBracket) => &LIST_CLOSING_BRACKET,
        TokenType::LBrace if context.expects(TokenType::RBrace) => &OBJECT_CLOSING_BRACKET,
        _ => return None,
    };
    let ends_line = current.is(TokenType::Newline)
        || current.is(TokenType::Eof)
        || context
            .previous()
            .is_some_and(|previous| previous.line() < current.line());
    ends_line.then(|| PatternMatch::at(closing, current))
}

fn unopened_bracket(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    let code = match current.token_type {
        TokenType::RBracket => &LIST_OPENING_BRACKET,
        TokenType::RBrace => &OBJECT_OPENING_BRACKET,
        _ => return None,
    };
    let opener = if current.is(TokenType::RBracket) {
        TokenType::LBracket
    } else {
        TokenType::LBrace
    };
    (open_bracket(context) != Some(opener)).then(|| PatternMatch::at(code, current))
}

/// `if a:` and similar, a colon that only ends the line.
fn unnecessary_colon(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    let next = context.next()?;
    (current.is(TokenType::Colon) && (next.is(TokenType::Newline) || next.is(TokenType::Eof)))
        .then(|| PatternMatch::at(&UNNECESSARY_COLON, current))
}

/// `key:value` at the start of a statement, with no service before it.
fn argument_without_service(
    context: &PatternContext<'_>,
    current: &Token,
) -> Option<PatternMatch> {
    let first = context.tokens.get(context.statement_start)?;
    (current.is(TokenType::Colon)
        && context.index == context.statement_start + 1
        && first.is(TokenType::Name))
    .then(|| PatternMatch::at(&ARGUMENTS_NO_SERVICE, first))
}

/// `service command key value`, an argument name not followed by `:`.
fn argument_colon(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    let previous = context.previous()?;
    (context.expects(TokenType::Colon) && previous.is(TokenType::Name))
        .then(|| PatternMatch::at(&SERVICE_ARGUMENT_COLON, current))
}

/// `my-var = 1` or `my/var = 1`.
fn variable_name_operator(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    if !current.is(TokenType::Assign) {
        return None;
    }
    let target = context.statement();
    let plain = target.iter().all(|token| {
        matches!(
            token.token_type,
            TokenType::Name | TokenType::Minus | TokenType::Slash | TokenType::Dot
        )
    });
    if !plain {
        return None;
    }
    target.iter().find_map(|token| match token.token_type {
        TokenType::Slash => Some(PatternMatch::at(&VARIABLES_BACKSLASH, token)),
        TokenType::Minus => Some(PatternMatch::at(&VARIABLES_DASH, token)),
        _ => None,
    })
}

fn import_statement(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    let first = context.tokens.get(context.statement_start)?;
    if !first.is(TokenType::Import) {
        return None;
    }
    if context.index == context.statement_start + 1 && !current.is(TokenType::String) {
        return Some(PatternMatch::at(&IMPORT_UNQUOTED_FILE, current));
    }
    if context.index == context.statement_start + 2 && context.expects(TokenType::As) {
        return Some(PatternMatch::at(&IMPORT_MISSPELL_AS, current));
    }
    None
}

/// `funtion foo` or `imprt "x" as y`: a statement opening with a near miss
/// of a keyword.
fn misspelt_keyword(context: &PatternContext<'_>, _current: &Token) -> Option<PatternMatch> {
    let first = context.tokens.get(context.statement_start)?;
    if !first.is(TokenType::Name) {
        return None;
    }
    let function = context.grammar.spelling(TokenType::Function);
    let import = context.grammar.spelling(TokenType::Import);
    if is_misspelling(&first.literal, &function) {
        Some(PatternMatch::at(&FUNCTION_MISSPELL, first))
    } else if is_misspelling(&first.literal, &import) {
        Some(PatternMatch::at(&IMPORT_MISSPELL, first))
    } else {
        None
    }
}

/// Two values side by side: `a = 1 2`.
fn missing_operator(context: &PatternContext<'_>, current: &Token) -> Option<PatternMatch> {
    let previous = context.previous()?;
    let ends_value = matches!(
        previous.token_type,
        TokenType::Int
            | TokenType::Float
            | TokenType::String
            | TokenType::True
            | TokenType::False
            | TokenType::Null
            | TokenType::RBracket
            | TokenType::RBrace
            | TokenType::RParen
    );
    let starts_value = matches!(
        current.token_type,
        TokenType::Int
            | TokenType::Float
            | TokenType::String
            | TokenType::True
            | TokenType::False
            | TokenType::Null
            | TokenType::LBracket
            | TokenType::LBrace
            | TokenType::LParen
    );
    (ends_value && starts_value).then(|| PatternMatch::at(&NO_OPERATOR, current))
}
