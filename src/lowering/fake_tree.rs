//! Synthetic statements for hoisted values.

use std::collections::BTreeMap;

use crate::syntax::position::Position;
use crate::syntax::token::Token;
use crate::syntax::token_type::TokenType;
use crate::tree::{LineCoord, Node, Rule};

/// Issues synthetic line coordinates and builds the `p-<line> = value`
/// assignments that carry hoisted values.
///
/// Coordinates under one base are strictly increasing and never reused for
/// the lifetime of the instance. A tree that already contains synthetic
/// lines can seed the counters so new coordinates continue after them.
#[derive(Debug, Default)]
pub struct FakeTree {
    counters: BTreeMap<usize, u32>,
}

impl FakeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(tree: &Node) -> Self {
        let mut fake = Self::new();
        tree.walk(&mut |node| {
            if let Some(line) = node.line
                && line.is_synthetic()
            {
                let counter = fake.counters.entry(line.base()).or_default();
                *counter = (*counter).max(line.seq());
            }
        });
        fake
    }

    /// The next unused coordinate under `base`.
    pub fn line(&mut self, base: usize) -> LineCoord {
        let counter = self.counters.entry(base).or_default();
        *counter += 1;
        LineCoord::synthetic(base, *counter)
    }

    /// A reference to the synthetic variable named after `line`.
    pub fn path(line: LineCoord, position: Position) -> Node {
        let name = Token::new(
            TokenType::Name,
            variable_name(line),
            position.line,
            position.column,
        );
        Node::new(Rule::Path, vec![name.into()])
    }

    /// Bind `value` to a fresh synthetic variable. Returns the assignment to
    /// splice in before the consumer, and a path to use in its place.
    pub fn assignment(&mut self, base: usize, value: Node) -> (Node, Node) {
        let line = self.line(base);
        let position = value.position().unwrap_or_default();
        let target = Self::path(line, position);
        let equals = Token::new(TokenType::Assign, "=", position.line, position.column);
        let assignment = Node::new(
            Rule::Assignment,
            vec![target.clone().into(), equals.into(), value.into()],
        )
        .with_line(line);
        (assignment, target)
    }
}

/// `p-3.1`. The dash keeps it out of reach of any name the lexer produces.
pub fn variable_name(line: LineCoord) -> String {
    format!("p-{}", line)
}

pub fn is_synthetic_name(name: &str) -> bool {
    name.starts_with("p-")
}
