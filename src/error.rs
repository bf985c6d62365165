//! Fatal pipeline faults.
//!
//! Anything here stops the pipeline for the story it happened in. Semantic
//! problems never use this type; they are collected as diagnostics instead.

use std::fmt;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::error_codes::FILE_NOT_FOUND;
use crate::syntax::{GrammarError, LexError, SyntaxError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Lex(LexError),
    Syntax(SyntaxError),
    Grammar(GrammarError),
    /// A story file that could not be read.
    Resource { path: String, absolute: String },
    Internal(String),
}

impl CompileError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Lex(err) => err.to_diagnostic(),
            CompileError::Syntax(err) => err.to_diagnostic(),
            CompileError::Resource { path, absolute } => {
                Diagnostic::new(&FILE_NOT_FOUND, &[path, absolute])
            }
            CompileError::Grammar(_) | CompileError::Internal(_) => Diagnostic::internal(),
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal(_))
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(err) => write!(f, "{}", err),
            CompileError::Syntax(err) => write!(f, "{}", err),
            CompileError::Grammar(err) => write!(f, "{}", err),
            CompileError::Resource { path, absolute } => {
                write!(f, "file `{}` not found at `{}`", path, absolute)
            }
            CompileError::Internal(detail) => write!(f, "internal error: {}", detail),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lex(err)
    }
}

impl From<SyntaxError> for CompileError {
    fn from(err: SyntaxError) -> Self {
        CompileError::Syntax(err)
    }
}

impl From<GrammarError> for CompileError {
    fn from(err: GrammarError) -> Self {
        CompileError::Grammar(err)
    }
}
