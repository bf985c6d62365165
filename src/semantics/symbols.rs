use crate::tree::LineCoord;

use super::types::Type;

/// A declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    /// Where it was declared; `None` for names seeded from outside the story.
    pub line: Option<LineCoord>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type, line: Option<LineCoord>) -> Self {
        Self {
            name: name.into(),
            ty,
            line,
        }
    }

    /// The declaring line as shown in diagnostics.
    pub fn line_text(&self) -> String {
        self.line
            .map(|line| line.to_string())
            .unwrap_or_else(|| "0".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

/// A story-level `function` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub returns: Type,
    pub line: LineCoord,
}

impl FunctionSignature {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn to_type(&self) -> Type {
        Type::Function(
            self.parameters.iter().map(|p| p.ty.clone()).collect(),
            Box::new(self.returns.clone()),
        )
    }
}
