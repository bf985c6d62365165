//! Grammar tables for the story language.
//!
//! The statement structure is fixed in the parser; what a grammar source
//! controls is keyword spelling, operator precedence and associativity, the
//! future-reserved word list and the builtin type names. Tooling can hand an
//! alternate source to [`Grammar::from_source`] without touching the rest of
//! the pipeline.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::precedence::{Assoc, OpInfo, OperatorTable, Precedence};
use super::token_type::{KEYWORDS, TokenType};

/// Canonical grammar source.
pub const DEFAULT_GRAMMAR: &str = include_str!("story.grammar");

static DEFAULT: OnceLock<Arc<Grammar>> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    pub line: usize,
    pub message: String,
}

impl GrammarError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grammar line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for GrammarError {}

#[derive(Debug, Clone)]
pub struct Grammar {
    source: String,
    keywords: HashMap<String, TokenType>,
    spellings: HashMap<TokenType, String>,
    operators: OperatorTable,
    cast_precedence: Precedence,
    reserved: Vec<String>,
    types: Vec<String>,
}

impl Grammar {
    pub fn from_source(source: &str) -> Result<Self, GrammarError> {
        let mut grammar = Grammar {
            source: source.to_string(),
            keywords: HashMap::new(),
            spellings: HashMap::new(),
            operators: OperatorTable::new(),
            cast_precedence: 0,
            reserved: Vec::new(),
            types: Vec::new(),
        };

        for (index, raw) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut words = line.split_whitespace();
            let directive = words.next().unwrap_or_default();
            let rest: Vec<&str> = words.collect();
            match directive {
                "keyword" => grammar.declare_keyword(line_no, &rest)?,
                "operator" => grammar.declare_operator(line_no, &rest)?,
                "unary" => grammar.declare_unary(line_no, &rest)?,
                "cast" => {
                    grammar.cast_precedence = parse_precedence(line_no, rest.first().copied())?;
                }
                "reserved" => grammar
                    .reserved
                    .extend(rest.iter().map(|word| word.to_string())),
                "type" => grammar.types.extend(rest.iter().map(|t| t.to_string())),
                other => {
                    return Err(GrammarError::new(
                        line_no,
                        format!("unknown directive `{}`", other),
                    ));
                }
            }
        }

        for keyword in KEYWORDS {
            if !grammar.spellings.contains_key(keyword) {
                let name = keyword.keyword_name().unwrap_or_default();
                return Err(GrammarError::new(
                    source.lines().count(),
                    format!("keyword `{}` has no spelling", name),
                ));
            }
        }
        if grammar.cast_precedence == 0 {
            grammar.cast_precedence = grammar.operators.max_precedence() + 1;
        }
        Ok(grammar)
    }

    fn declare_keyword(&mut self, line: usize, rest: &[&str]) -> Result<(), GrammarError> {
        let [name, spelling] = rest else {
            return Err(GrammarError::new(line, "expected `keyword <name> <spelling>`"));
        };
        let token = TokenType::from_keyword_name(name)
            .ok_or_else(|| GrammarError::new(line, format!("unknown keyword `{}`", name)))?;
        if !is_word(spelling) {
            return Err(GrammarError::new(
                line,
                format!("`{}` can't be used as a keyword spelling", spelling),
            ));
        }
        if let Some(previous) = self.keywords.insert(spelling.to_string(), token)
            && previous != token
        {
            return Err(GrammarError::new(
                line,
                format!("spelling `{}` is already used", spelling),
            ));
        }
        self.spellings.insert(token, spelling.to_string());
        Ok(())
    }

    fn declare_operator(&mut self, line: usize, rest: &[&str]) -> Result<(), GrammarError> {
        let [precedence, assoc, operators @ ..] = rest else {
            return Err(GrammarError::new(
                line,
                "expected `operator <precedence> <assoc> <operator>...`",
            ));
        };
        let precedence = parse_precedence(line, Some(precedence))?;
        let associativity = Assoc::from_name(assoc).ok_or_else(|| {
            GrammarError::new(line, format!("unknown associativity `{}`", assoc))
        })?;
        if operators.is_empty() {
            return Err(GrammarError::new(line, "operator line lists no operators"));
        }
        for operator in operators {
            let token = resolve_operator(line, operator)?;
            let info = OpInfo {
                token,
                precedence,
                associativity,
            };
            if !self.operators.add_infix(info) {
                return Err(GrammarError::new(
                    line,
                    format!("operator `{}` is declared twice", operator),
                ));
            }
        }
        Ok(())
    }

    fn declare_unary(&mut self, line: usize, rest: &[&str]) -> Result<(), GrammarError> {
        let [precedence, operators @ ..] = rest else {
            return Err(GrammarError::new(line, "expected `unary <precedence> <operator>...`"));
        };
        let precedence = parse_precedence(line, Some(precedence))?;
        for operator in operators {
            let token = resolve_operator(line, operator)?;
            let info = OpInfo {
                token,
                precedence,
                associativity: Assoc::Right,
            };
            if !self.operators.add_prefix(info) {
                return Err(GrammarError::new(
                    line,
                    format!("unary operator `{}` is declared twice", operator),
                ));
            }
        }
        Ok(())
    }

    /// The original grammar text this instance was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn keyword(&self, word: &str) -> Option<TokenType> {
        self.keywords.get(word).copied()
    }

    /// How `token` is spelled in this grammar; falls back to the canonical name.
    pub fn spelling(&self, token: TokenType) -> String {
        if let Some(spelling) = self.spellings.get(&token) {
            return spelling.clone();
        }
        token
            .keyword_name()
            .or_else(|| token.symbol())
            .map(str::to_string)
            .unwrap_or_else(|| token.to_string())
    }

    pub fn infix(&self, token: TokenType) -> Option<OpInfo> {
        self.operators.infix(token)
    }

    pub fn prefix(&self, token: TokenType) -> Option<OpInfo> {
        self.operators.prefix(token)
    }

    pub fn infix_operators(&self) -> Vec<TokenType> {
        self.operators.infix_operators().collect()
    }

    pub fn cast_precedence(&self) -> Precedence {
        self.cast_precedence
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.iter().any(|reserved| reserved == word)
    }

    pub fn is_type_name(&self, word: &str) -> bool {
        self.types.iter().any(|name| name == word)
    }
}

/// Shared, lazily built default grammar.
///
/// Concurrent first callers may each build an instance; whichever is stored
/// first wins and the others are dropped.
pub fn default_grammar() -> Result<Arc<Grammar>, GrammarError> {
    if let Some(grammar) = DEFAULT.get() {
        return Ok(Arc::clone(grammar));
    }
    let built = Arc::new(Grammar::from_source(DEFAULT_GRAMMAR)?);
    let _ = DEFAULT.set(Arc::clone(&built));
    Ok(DEFAULT.get().map(Arc::clone).unwrap_or(built))
}

fn parse_precedence(line: usize, word: Option<&str>) -> Result<Precedence, GrammarError> {
    let word = word.ok_or_else(|| GrammarError::new(line, "missing precedence"))?;
    match word.parse::<Precedence>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(GrammarError::new(
            line,
            format!("`{}` is not a valid precedence", word),
        )),
    }
}

fn resolve_operator(line: usize, operator: &str) -> Result<TokenType, GrammarError> {
    TokenType::from_symbol(operator)
        .or_else(|| TokenType::from_keyword_name(operator))
        .ok_or_else(|| GrammarError::new(line, format!("unknown operator `{}`", operator)))
}

fn is_word(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
