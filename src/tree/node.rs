use std::ops::Index;

use crate::syntax::position::Position;
use crate::syntax::token::Token;
use crate::syntax::token_type::TokenType;

use super::line::LineCoord;
use super::rule::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Node(Node),
    Token(Token),
}

impl Child {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Node(node) => Some(node),
            Child::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Child::Token(token) => Some(token),
            Child::Node(_) => None,
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<Token> for Child {
    fn from(token: Token) -> Self {
        Child::Token(token)
    }
}

/// A tree node: a rule tag plus ordered children.
///
/// `line` is only set when lowering assigns a synthetic coordinate; otherwise
/// the node is attributed to the line of its first token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub rule: Rule,
    pub children: Vec<Child>,
    pub line: Option<LineCoord>,
}

impl Node {
    pub fn new(rule: Rule, children: Vec<Child>) -> Self {
        Self {
            rule,
            children,
            line: None,
        }
    }

    pub fn with_line(mut self, line: LineCoord) -> Self {
        self.line = Some(line);
        self
    }

    pub fn is(&self, rule: &Rule) -> bool {
        &self.rule == rule
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Child> {
        self.children.iter()
    }

    /// Direct child nodes, skipping tokens.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Child::as_node)
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children.iter_mut().filter_map(|child| match child {
            Child::Node(node) => Some(node),
            Child::Token(_) => None,
        })
    }

    /// Direct child tokens, skipping nodes.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(Child::as_token)
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes().nth(index)
    }

    /// First direct child with `rule`.
    pub fn find(&self, rule: &Rule) -> Option<&Node> {
        self.nodes().find(|node| node.is(rule))
    }

    pub fn find_mut(&mut self, rule: &Rule) -> Option<&mut Node> {
        self.nodes_mut().find(|node| node.is(rule))
    }

    pub fn find_all<'a>(&'a self, rule: &'a Rule) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes().filter(move |node| node.is(rule))
    }

    /// First direct child token of `token_type`.
    pub fn token(&self, token_type: TokenType) -> Option<&Token> {
        self.tokens().find(|token| token.is(token_type))
    }

    /// Depth-first first token, used when the node has no position of its own.
    pub fn first_token(&self) -> Option<&Token> {
        self.children.iter().find_map(|child| match child {
            Child::Token(token) => Some(token),
            Child::Node(node) => node.first_token(),
        })
    }

    /// The node's single token, for leaf rules like `number` or `string`.
    pub fn leaf(&self) -> Option<&Token> {
        match self.children.as_slice() {
            [Child::Token(token)] => Some(token),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        self.first_token().map(|token| token.position)
    }

    /// The assigned coordinate, or the first token's real line.
    pub fn line(&self) -> Option<LineCoord> {
        self.line
            .or_else(|| self.first_token().map(|token| LineCoord::real(token.line())))
    }

    /// Visit this node and all descendants, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for node in self.nodes() {
            node.walk(visit);
        }
    }
}

impl Index<usize> for Node {
    type Output = Child;

    fn index(&self, index: usize) -> &Child {
        &self.children[index]
    }
}

impl<'a> IntoIterator for &'a Node {
    type Item = &'a Child;
    type IntoIter = std::slice::Iter<'a, Child>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}
