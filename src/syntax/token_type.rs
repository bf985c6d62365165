use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenType {
    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,

    // Identifiers and literals
    Name,
    Int,
    Float,
    String,

    // Arithmetic operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Caret,

    // Comparison operators
    Eq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,

    // Assignment
    Assign,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,

    // Keywords
    If,
    Else,
    Foreach,
    While,
    As,
    Try,
    Catch,
    Finally,
    Throw,
    Function,
    Returns,
    Return,
    Break,
    Continue,
    Import,
    When,
    Then,
    And,
    Or,
    Not,
    True,
    False,
    Null,
}

/// Every keyword token, in declaration order.
pub const KEYWORDS: &[TokenType] = &[
    TokenType::If,
    TokenType::Else,
    TokenType::Foreach,
    TokenType::While,
    TokenType::As,
    TokenType::Try,
    TokenType::Catch,
    TokenType::Finally,
    TokenType::Throw,
    TokenType::Function,
    TokenType::Returns,
    TokenType::Return,
    TokenType::Break,
    TokenType::Continue,
    TokenType::Import,
    TokenType::When,
    TokenType::Then,
    TokenType::And,
    TokenType::Or,
    TokenType::Not,
    TokenType::True,
    TokenType::False,
    TokenType::Null,
];

impl TokenType {
    /// Canonical keyword name as used by grammar sources (`keyword foreach foreach`).
    pub fn keyword_name(self) -> Option<&'static str> {
        let name = match self {
            TokenType::If => "if",
            TokenType::Else => "else",
            TokenType::Foreach => "foreach",
            TokenType::While => "while",
            TokenType::As => "as",
            TokenType::Try => "try",
            TokenType::Catch => "catch",
            TokenType::Finally => "finally",
            TokenType::Throw => "throw",
            TokenType::Function => "function",
            TokenType::Returns => "returns",
            TokenType::Return => "return",
            TokenType::Break => "break",
            TokenType::Continue => "continue",
            TokenType::Import => "import",
            TokenType::When => "when",
            TokenType::Then => "then",
            TokenType::And => "and",
            TokenType::Or => "or",
            TokenType::Not => "not",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::Null => "null",
            _ => return None,
        };
        Some(name)
    }

    pub fn from_keyword_name(name: &str) -> Option<TokenType> {
        KEYWORDS
            .iter()
            .copied()
            .find(|token_type| token_type.keyword_name() == Some(name))
    }

    pub fn is_keyword(self) -> bool {
        self.keyword_name().is_some()
    }

    /// Source spelling of fixed-spelling operator and delimiter tokens.
    pub fn symbol(self) -> Option<&'static str> {
        let symbol = match self {
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Asterisk => "*",
            TokenType::Slash => "/",
            TokenType::Percent => "%",
            TokenType::Caret => "^",
            TokenType::Eq => "==",
            TokenType::NotEq => "!=",
            TokenType::Lt => "<",
            TokenType::Gt => ">",
            TokenType::Lte => "<=",
            TokenType::Gte => ">=",
            TokenType::Assign => "=",
            TokenType::LParen => "(",
            TokenType::RParen => ")",
            TokenType::LBracket => "[",
            TokenType::RBracket => "]",
            TokenType::LBrace => "{",
            TokenType::RBrace => "}",
            TokenType::Comma => ",",
            TokenType::Colon => ":",
            TokenType::Dot => ".",
            _ => return None,
        };
        Some(symbol)
    }

    pub fn from_symbol(symbol: &str) -> Option<TokenType> {
        use TokenType::*;
        [
            Plus, Minus, Asterisk, Slash, Percent, Caret, Eq, NotEq, Lt, Gt, Lte, Gte, Assign,
        ]
        .into_iter()
        .find(|token_type| token_type.symbol() == Some(symbol))
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            // Layout
            TokenType::Newline => "NL",
            TokenType::Indent => "INDENT",
            TokenType::Dedent => "DEDENT",
            TokenType::Eof => "EOF",

            // Identifiers and literals
            TokenType::Name => "NAME",
            TokenType::Int => "INT",
            TokenType::Float => "FLOAT",
            TokenType::String => "STRING",

            // Arithmetic operators
            TokenType::Plus => "PLUS",
            TokenType::Minus => "MINUS",
            TokenType::Asterisk => "STAR",
            TokenType::Slash => "SLASH",
            TokenType::Percent => "PERCENT",
            TokenType::Caret => "CARET",

            // Comparison operators
            TokenType::Eq => "EQUAL",
            TokenType::NotEq => "NOT_EQUAL",
            TokenType::Lt => "LESSER",
            TokenType::Gt => "GREATER",
            TokenType::Lte => "LESSER_EQUAL",
            TokenType::Gte => "GREATER_EQUAL",

            // Assignment
            TokenType::Assign => "EQUALS",

            // Delimiters
            TokenType::LParen => "LPAR",
            TokenType::RParen => "RPAR",
            TokenType::LBracket => "LSQB",
            TokenType::RBracket => "RSQB",
            TokenType::LBrace => "LBRACE",
            TokenType::RBrace => "RBRACE",
            TokenType::Comma => "COMMA",
            TokenType::Colon => "COLON",
            TokenType::Dot => "DOT",

            // Keywords
            TokenType::If => "IF",
            TokenType::Else => "ELSE",
            TokenType::Foreach => "FOREACH",
            TokenType::While => "WHILE",
            TokenType::As => "AS",
            TokenType::Try => "TRY",
            TokenType::Catch => "CATCH",
            TokenType::Finally => "FINALLY",
            TokenType::Throw => "THROW",
            TokenType::Function => "FUNCTION",
            TokenType::Returns => "RETURNS",
            TokenType::Return => "RETURN",
            TokenType::Break => "BREAK",
            TokenType::Continue => "CONTINUE",
            TokenType::Import => "IMPORT",
            TokenType::When => "WHEN",
            TokenType::Then => "THEN",
            TokenType::And => "AND",
            TokenType::Or => "OR",
            TokenType::Not => "NOT",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
            TokenType::Null => "NULL",
        };
        write!(f, "{}", s)
    }
}
