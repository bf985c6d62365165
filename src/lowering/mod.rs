//! Desugaring of the parse tree into the form the compiler consumes.
//!
//! After lowering:
//! - calls (service calls, mutations, function calls) only appear as the
//!   whole value of a statement; nested ones are hoisted into synthetic
//!   assignments placed right before the statement that uses them,
//! - a `then` chain is a sequence of single mutations, one per link,
//! - strings hold no `{...}` interpolation; they become concatenations of
//!   text and `as string` casts.
//!
//! A `while` or `else if` condition must not need hoisting. The hoisted
//! statement would run once, ahead of the whole construct.
//!
//! Lowering runs once per story. Running it again over its own output
//! issues no new statements.

pub mod fake_tree;
pub mod interpolation;

use crate::CompileError;
use crate::diagnostics::error_codes::CALL_IN_CONDITION;
use crate::syntax::SyntaxError;
use crate::syntax::grammar::Grammar;
use crate::syntax::lexer::Lexer;
use crate::syntax::parser::Parser;
use crate::syntax::position::Position;
use crate::syntax::token::Token;
use crate::syntax::token_type::TokenType;
use crate::tree::{Child, Node, Rule};

pub use fake_tree::FakeTree;
use interpolation::Piece;

pub struct Lowering<'g> {
    grammar: &'g Grammar,
    single_quotes: bool,
    fake: FakeTree,
}

/// Statements hoisted while lowering one statement, and the base line their
/// coordinates are issued under.
struct Hoisted {
    base: usize,
    statements: Vec<Node>,
}

impl<'g> Lowering<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            single_quotes: false,
            fake: FakeTree::new(),
        }
    }

    pub fn with_single_quotes(mut self, enabled: bool) -> Self {
        self.single_quotes = enabled;
        self
    }

    pub fn process(mut self, tree: Node) -> Result<Node, CompileError> {
        self.fake = FakeTree::seeded(&tree);
        let mut tree = tree;
        let statements = std::mem::take(&mut tree.children);
        tree.children = self.lower_statements(statements)?;
        Ok(tree)
    }

    fn lower_statements(&mut self, statements: Vec<Child>) -> Result<Vec<Child>, CompileError> {
        let mut lowered = Vec::with_capacity(statements.len());
        for child in statements {
            let Child::Node(statement) = child else {
                lowered.push(child);
                continue;
            };
            let base = match statement.line() {
                Some(line) if line.is_synthetic() => line.base(),
                Some(line) => line.base().saturating_sub(1),
                None => 0,
            };
            let mut hoisted = Hoisted {
                base,
                statements: Vec::new(),
            };
            let statement = self.lower_statement(statement, &mut hoisted)?;
            lowered.extend(hoisted.statements.into_iter().map(Child::from));
            lowered.push(statement.into());
        }
        Ok(lowered)
    }

    fn lower_block(&mut self, block: Node) -> Result<Node, CompileError> {
        let mut block = block;
        let statements = std::mem::take(&mut block.children);
        block.children = self.lower_statements(statements)?;
        Ok(block)
    }

    fn lower_statement(&mut self, node: Node, hoisted: &mut Hoisted) -> Result<Node, CompileError> {
        match node.rule {
            Rule::Assignment | Rule::ReturnStatement | Rule::ThrowStatement => {
                // The last child is the value. Only an assignment keeps a
                // call there; `return` and `throw` get it hoisted.
                if !matches!(node.children.last(), Some(Child::Node(_))) {
                    return Ok(node);
                }
                let mut node = node;
                let Some(Child::Node(value)) = node.children.pop() else {
                    return Err(crate::ice!("statement value vanished"));
                };
                node = self.lower_children(node, hoisted)?;
                let value = if node.is(&Rule::Assignment) {
                    self.lower_value(value, hoisted)?
                } else {
                    self.lower_expression(value, hoisted)?
                };
                node.children.push(value.into());
                Ok(node)
            }
            Rule::ServiceCall
            | Rule::Mutation
            | Rule::FunctionCall
            | Rule::ExpressionStatement => self.lower_value(node, hoisted),
            Rule::WhileBlock => self.lower_guarded(node, hoisted, "while"),
            _ => self.lower_children(node, hoisted),
        }
    }

    /// Lower a construct whose condition must not hoist anything.
    fn lower_guarded(
        &mut self,
        node: Node,
        hoisted: &mut Hoisted,
        keyword: &str,
    ) -> Result<Node, CompileError> {
        let before = hoisted.statements.len();
        let Some(token) = node.first_token().cloned() else {
            return Err(crate::ice!("{} without a keyword", keyword));
        };
        let node = self.lower_children(node, hoisted)?;
        match hoisted.statements.get(before) {
            None => Ok(node),
            Some(call) => Err(SyntaxError {
                code: &CALL_IN_CONDITION,
                args: vec![keyword.to_string()],
                position: call.position().unwrap_or(token.position),
                token,
                expected: Vec::new(),
            }
            .into()),
        }
    }

    /// A value in statement position: a call stays in place with its
    /// arguments lowered; anything else is an ordinary expression.
    fn lower_value(&mut self, node: Node, hoisted: &mut Hoisted) -> Result<Node, CompileError> {
        match node.rule {
            Rule::Mutation => self.lower_chain(node, hoisted),
            Rule::ServiceCall | Rule::FunctionCall => self.lower_children(node, hoisted),
            Rule::ExpressionStatement => {
                let mut node = node;
                if let [Child::Node(inner)] = node.children.as_slice()
                    && is_call(inner)
                {
                    let Some(Child::Node(inner)) = node.children.pop() else {
                        return Err(crate::ice!("expression statement vanished"));
                    };
                    return self.lower_value(inner, hoisted);
                }
                let children = std::mem::take(&mut node.children);
                for child in children {
                    let child = match child {
                        Child::Node(inner) => self.lower_value(inner, hoisted)?.into(),
                        token => token,
                    };
                    node.children.push(child);
                }
                Ok(node)
            }
            _ => self.lower_expression(node, hoisted),
        }
    }

    /// Lower every child: blocks get their own statement lists, other
    /// nodes are expressions.
    fn lower_children(&mut self, node: Node, hoisted: &mut Hoisted) -> Result<Node, CompileError> {
        let mut node = node;
        let children = std::mem::take(&mut node.children);
        for child in children {
            let child = match child {
                Child::Node(inner) if inner.is(&Rule::Block) => self.lower_block(inner)?.into(),
                Child::Node(inner) if inner.is(&Rule::ElifBlock) => {
                    self.lower_guarded(inner, hoisted, "else if")?.into()
                }
                Child::Node(inner) if is_call(&inner) || inner.is(&Rule::String) => {
                    self.lower_expression(inner, hoisted)?.into()
                }
                Child::Node(inner) => self.lower_children(inner, hoisted)?.into(),
                token => token,
            };
            node.children.push(child);
        }
        Ok(node)
    }

    /// An expression nested inside something larger: calls are hoisted and
    /// replaced by their synthetic variable.
    fn lower_expression(&mut self, node: Node, hoisted: &mut Hoisted) -> Result<Node, CompileError> {
        match node.rule {
            Rule::String => self.lower_string(node, hoisted),
            Rule::Mutation => {
                let chain = self.lower_chain(node, hoisted)?;
                Ok(self.hoist(chain, hoisted))
            }
            Rule::ServiceCall | Rule::FunctionCall => {
                let call = self.lower_children(node, hoisted)?;
                Ok(self.hoist(call, hoisted))
            }
            _ => self.lower_children(node, hoisted),
        }
    }

    fn hoist(&mut self, value: Node, hoisted: &mut Hoisted) -> Node {
        let (assignment, path) = self.fake.assignment(hoisted.base, value);
        hoisted.statements.push(assignment);
        path
    }

    /// `a f then g then h` becomes `p1 = a f`, `p2 = p1 g`, and `p2 h` in place.
    fn lower_chain(&mut self, node: Node, hoisted: &mut Hoisted) -> Result<Node, CompileError> {
        let mut children = node.children.into_iter();
        let Some(Child::Node(subject)) = children.next() else {
            return Err(crate::ice!("mutation without a subject"));
        };
        let mut subject = if subject.is(&Rule::Path) {
            self.lower_children(subject, hoisted)?
        } else {
            self.lower_expression(subject, hoisted)?
        };
        let mut fragments = Vec::new();
        for child in children {
            if let Child::Node(fragment) = child {
                fragments.push(self.lower_children(fragment, hoisted)?);
            }
        }
        let Some(last) = fragments.pop() else {
            return Err(crate::ice!("mutation without a fragment"));
        };
        let mut first = true;
        for fragment in fragments {
            let link = link(subject, fragment, first);
            first = false;
            subject = self.hoist(link, hoisted);
        }
        Ok(link(subject, last, false))
    }

    fn lower_string(&mut self, node: Node, hoisted: &mut Hoisted) -> Result<Node, CompileError> {
        let Some(token) = node.leaf().cloned() else {
            return Ok(node);
        };
        if !interpolation::has_interpolation(&token.literal) {
            return Ok(node);
        }

        let mut parts: Vec<Node> = Vec::new();
        for piece in interpolation::split(&token.literal) {
            match piece {
                Piece::Text(text) => parts.push(Node::new(
                    Rule::String,
                    vec![Token::new(TokenType::String, text, token.line(), token.column()).into()],
                )),
                Piece::Code { source, offset } => {
                    let at = Position::new(token.line(), token.column() + 1 + offset);
                    let value = self.parse_interpolation(source, at)?;
                    let value = if value.is(&Rule::Path) {
                        self.lower_children(value, hoisted)?
                    } else {
                        let value = self.lower_value(value, hoisted)?;
                        self.hoist(value, hoisted)
                    };
                    parts.push(cast_to_string(value, at));
                }
            }
        }

        let mut parts = parts.into_iter();
        let Some(mut joined) = parts.next() else {
            return Ok(node);
        };
        for part in parts {
            let plus = Token::new(TokenType::Plus, "+", token.line(), token.column());
            joined = Node::new(
                Rule::BinaryExpression,
                vec![joined.into(), plus.into(), part.into()],
            );
        }
        Ok(joined)
    }

    fn parse_interpolation(&self, source: &str, at: Position) -> Result<Node, CompileError> {
        let mut lexer = Lexer::new(source, self.grammar).with_single_quotes(self.single_quotes);
        let mut tokens = lexer.tokenize().map_err(|mut err| {
            err.position = shift(err.position, at);
            err
        })?;
        for token in &mut tokens {
            token.position = shift(token.position, at);
        }
        Ok(Parser::new(tokens, self.grammar).parse_fragment()?)
    }
}

fn is_call(node: &Node) -> bool {
    matches!(
        node.rule,
        Rule::ServiceCall | Rule::Mutation | Rule::FunctionCall
    )
}

/// One link of a mutation chain. A path subject with the chain's first
/// fragment is written like a service call; the semantic pass decides.
fn link(subject: Node, fragment: Node, first: bool) -> Node {
    let parts: Vec<Child> = fragment
        .children
        .into_iter()
        .filter(|child| !child.as_token().is_some_and(|t| t.is(TokenType::Then)))
        .collect();
    if first && subject.is(&Rule::Path) {
        let mut children: Vec<Child> = vec![subject.into()];
        children.extend(parts);
        return Node::new(Rule::ServiceCall, children);
    }
    Node::new(
        Rule::Mutation,
        vec![subject.into(), Node::new(Rule::MutationFragment, parts).into()],
    )
}

fn cast_to_string(value: Node, at: Position) -> Node {
    let keyword = Token::new(TokenType::As, "as", at.line, at.column);
    let string = Token::new(TokenType::Name, "string", at.line, at.column);
    Node::new(
        Rule::Cast,
        vec![
            value.into(),
            keyword.into(),
            Node::new(Rule::Types, vec![string.into()]).into(),
        ],
    )
}

/// Move a position inside an interpolation to its place in the story.
fn shift(position: Position, at: Position) -> Position {
    if position.line == 1 {
        Position::new(at.line, at.column + position.column - 1)
    } else {
        Position::new(at.line + position.line - 1, position.column)
    }
}
