pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod precedence;
pub mod token;
pub mod token_type;

pub use grammar::{Grammar, GrammarError, default_grammar};
pub use lexer::{LexError, LexWarning, Lexer};
pub use parser::{Parser, SyntaxError};
pub use position::Position;
pub use token::Token;
pub use token_type::TokenType;
