use crate::syntax::precedence::{Assoc, LOWEST, Precedence};
use crate::syntax::token_type::TokenType;
use crate::tree::{Child, Node, Rule};

use super::{Parser, SyntaxError};

/// Tokens that may begin an expression.
pub(super) const EXPRESSION_START: &[TokenType] = &[
    TokenType::Name,
    TokenType::Int,
    TokenType::Float,
    TokenType::String,
    TokenType::True,
    TokenType::False,
    TokenType::Null,
    TokenType::LBracket,
    TokenType::LBrace,
    TokenType::LParen,
    TokenType::Minus,
    TokenType::Not,
];

impl Parser<'_> {
    /// An expression, optionally continued by a service call or mutation:
    /// `http fetch url:u`, `items length`, `(a + b)`.
    pub(super) fn parse_value(&mut self) -> Result<Node, SyntaxError> {
        let value = self.parse_expression(LOWEST)?;
        self.parse_call_tail(value)
    }

    /// A value followed by a name continues as a call: a service call when
    /// the value is a plain path, a mutation otherwise.
    pub(super) fn parse_call_tail(&mut self, value: Node) -> Result<Node, SyntaxError> {
        if !self.at(TokenType::Name) {
            return Ok(value);
        }
        if value.is(&Rule::Path) {
            self.parse_service_tail(value)
        } else {
            self.parse_mutation_tail(value)
        }
    }

    pub(super) fn parse_expression(&mut self, min: Precedence) -> Result<Node, SyntaxError> {
        let left = self.parse_prefix()?;
        self.parse_infix(left, min)
    }

    /// Precedence climbing over the grammar's operator table, starting from
    /// an already parsed left operand.
    pub(super) fn parse_infix(&mut self, left: Node, min: Precedence) -> Result<Node, SyntaxError> {
        let mut left = left;
        loop {
            if self.at_cast() && self.grammar.cast_precedence() > min {
                let keyword = self.advance();
                let types = self.parse_types()?;
                left = Node::new(
                    Rule::Cast,
                    vec![left.into(), keyword.into(), types.into()],
                );
                continue;
            }

            let Some(info) = self.grammar.infix(self.current().token_type) else {
                break;
            };
            if info.precedence <= min {
                break;
            }
            let operator = self.advance();
            let right = self.parse_expression(info.rhs_precedence())?;
            left = Node::new(
                Rule::BinaryExpression,
                vec![left.into(), operator.into(), right.into()],
            );

            if info.associativity == Assoc::Nonassoc
                && self
                    .grammar
                    .infix(self.current().token_type)
                    .is_some_and(|next| next.precedence == info.precedence)
            {
                return Err(self.unexpected(&[TokenType::Newline]));
            }
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Node, SyntaxError> {
        let token_type = self.current().token_type;
        match token_type {
            TokenType::Name if self.peek_is(TokenType::LParen) => self.parse_function_call(),
            TokenType::Name => self.parse_path(),
            TokenType::Int | TokenType::Float => Ok(self.literal(Rule::Number)),
            TokenType::String => Ok(self.literal(Rule::String)),
            TokenType::True | TokenType::False => Ok(self.literal(Rule::Boolean)),
            TokenType::Null => Ok(self.literal(Rule::Null)),
            TokenType::LBracket => self.parse_list(),
            TokenType::LBrace => self.parse_map(),
            TokenType::LParen => {
                self.advance();
                let inner = self.parse_value()?;
                self.expect(TokenType::RParen)?;
                Ok(inner)
            }
            _ => {
                let Some(info) = self.grammar.prefix(token_type) else {
                    return Err(self.unexpected(EXPRESSION_START));
                };
                let operator = self.advance();
                let operand = self.parse_expression(info.precedence)?;
                Ok(Node::new(
                    Rule::UnaryExpression,
                    vec![operator.into(), operand.into()],
                ))
            }
        }
    }

    fn literal(&mut self, rule: Rule) -> Node {
        let token = self.advance();
        Node::new(rule, vec![token.into()])
    }

    /// `a`, `a.b`, `a[0]`, `a["k"].c`
    pub(super) fn parse_path(&mut self) -> Result<Node, SyntaxError> {
        let root = self.expect_name()?;
        let mut children: Vec<Child> = vec![root.into()];
        loop {
            if self.at(TokenType::Dot) {
                let dot = self.advance();
                let field = self.expect_name()?;
                children.push(Node::new(Rule::PathFragment, vec![dot.into(), field.into()]).into());
            } else if self.at(TokenType::LBracket) {
                let open = self.advance();
                let index = self.parse_expression(LOWEST)?;
                let close = self.expect(TokenType::RBracket)?;
                children.push(
                    Node::new(
                        Rule::PathFragment,
                        vec![open.into(), index.into(), close.into()],
                    )
                    .into(),
                );
            } else {
                break;
            }
        }
        Ok(Node::new(Rule::Path, children))
    }

    fn parse_list(&mut self) -> Result<Node, SyntaxError> {
        let open = self.advance();
        let mut children: Vec<Child> = vec![open.into()];
        if !self.at(TokenType::RBracket) {
            loop {
                children.push(self.parse_expression(LOWEST)?.into());
                if self.at(TokenType::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if !self.at(TokenType::RBracket) {
            return Err(self.unexpected(&[TokenType::Comma, TokenType::RBracket]));
        }
        children.push(self.advance().into());
        Ok(Node::new(Rule::List, children))
    }

    fn parse_map(&mut self) -> Result<Node, SyntaxError> {
        let open = self.advance();
        let mut children: Vec<Child> = vec![open.into()];
        if !self.at(TokenType::RBrace) {
            loop {
                let key = self.parse_expression(LOWEST)?;
                self.expect(TokenType::Colon)?;
                let value = self.parse_expression(LOWEST)?;
                children.push(Node::new(Rule::MapItem, vec![key.into(), value.into()]).into());
                if self.at(TokenType::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if !self.at(TokenType::RBrace) {
            return Err(self.unexpected(&[TokenType::Comma, TokenType::RBrace]));
        }
        children.push(self.advance().into());
        Ok(Node::new(Rule::Map, children))
    }

    /// `name(arg:value, ...)`
    fn parse_function_call(&mut self) -> Result<Node, SyntaxError> {
        let name = self.expect_name()?;
        let open = self.expect(TokenType::LParen)?;
        let arguments = self.parse_arguments()?;
        if !self.at(TokenType::RParen) {
            return Err(self.unexpected(&[TokenType::Name, TokenType::RParen]));
        }
        let close = self.advance();
        Ok(Node::new(
            Rule::FunctionCall,
            vec![name.into(), open.into(), arguments.into(), close.into()],
        ))
    }

    /// Zero or more `name:value` pairs; commas between them are optional.
    pub(super) fn parse_arguments(&mut self) -> Result<Node, SyntaxError> {
        let mut arguments: Vec<Child> = Vec::new();
        while self.at(TokenType::Name) {
            let name = self.expect_name()?;
            self.expect(TokenType::Colon)?;
            let value = self.parse_expression(LOWEST)?;
            arguments.push(Node::new(Rule::Argument, vec![name.into(), value.into()]).into());
            if self.at(TokenType::Comma) {
                self.advance();
            }
        }
        Ok(Node::new(Rule::Arguments, arguments))
    }

    /// `service command args... [then ...] [as output]`
    pub(super) fn parse_service_tail(&mut self, service: Node) -> Result<Node, SyntaxError> {
        let command = self.expect_name()?;
        let arguments = self.parse_arguments()?;
        if self.at(TokenType::Then) {
            let first = Node::new(
                Rule::MutationFragment,
                vec![command.into(), arguments.into()],
            );
            let mut children: Vec<Child> = vec![service.into(), first.into()];
            self.parse_mutation_chain(&mut children)?;
            return Ok(Node::new(Rule::Mutation, children));
        }

        let mut children: Vec<Child> = vec![service.into(), command.into(), arguments.into()];
        if self.at(TokenType::As) {
            children.push(self.parse_output()?.into());
        }
        Ok(Node::new(Rule::ServiceCall, children))
    }

    /// `value mutation args... [then mutation args...]*`
    pub(super) fn parse_mutation_tail(&mut self, value: Node) -> Result<Node, SyntaxError> {
        let name = self.expect_name()?;
        let arguments = self.parse_arguments()?;
        let first = Node::new(Rule::MutationFragment, vec![name.into(), arguments.into()]);
        let mut children: Vec<Child> = vec![value.into(), first.into()];
        self.parse_mutation_chain(&mut children)?;
        Ok(Node::new(Rule::Mutation, children))
    }

    fn parse_mutation_chain(&mut self, children: &mut Vec<Child>) -> Result<(), SyntaxError> {
        while self.at(TokenType::Then) {
            let then = self.advance();
            let name = self.expect_name()?;
            let arguments = self.parse_arguments()?;
            children.push(
                Node::new(
                    Rule::MutationFragment,
                    vec![then.into(), name.into(), arguments.into()],
                )
                .into(),
            );
        }
        Ok(())
    }

    /// `as name[, name]*`
    pub(super) fn parse_output(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.expect(TokenType::As)?;
        let mut children: Vec<Child> = vec![keyword.into(), self.expect_name()?.into()];
        while self.at(TokenType::Comma) {
            self.advance();
            children.push(self.expect_name()?.into());
        }
        Ok(Node::new(Rule::Output, children))
    }

    /// `int`, `list[string]`, `map[string, any]`, `function`
    pub(super) fn parse_types(&mut self) -> Result<Node, SyntaxError> {
        let name = if self.at(TokenType::Function) || self.at_name() {
            self.advance()
        } else {
            return Err(self.unexpected(&[TokenType::Name]));
        };
        let mut children: Vec<Child> = vec![name.into()];
        if self.at(TokenType::LBracket) {
            self.advance();
            children.push(self.parse_types()?.into());
            while self.at(TokenType::Comma) {
                self.advance();
                children.push(self.parse_types()?.into());
            }
            if !self.at(TokenType::RBracket) {
                return Err(self.unexpected(&[TokenType::Comma, TokenType::RBracket]));
            }
            self.advance();
        }
        Ok(Node::new(Rule::Types, children))
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::grammar::default_grammar;
    use crate::syntax::lexer::Lexer;
    use crate::syntax::parser::Parser;
    use crate::tree::{Node, Rule};

    fn statement(source: &str) -> Node {
        let grammar = default_grammar().unwrap();
        let tokens = Lexer::new(source, &grammar).tokenize().unwrap();
        let tree = Parser::new(tokens, &grammar).parse().unwrap();
        tree.node(0).unwrap().clone()
    }

    fn value(source: &str) -> Node {
        let assignment = statement(&format!("x = {}\n", source));
        assignment.node(1).unwrap().clone()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = value("1 + 2 * 3");
        assert_eq!(expr.rule, Rule::BinaryExpression);
        assert_eq!(expr.node(0).unwrap().rule, Rule::Number);
        assert_eq!(expr.node(1).unwrap().rule, Rule::BinaryExpression);
    }

    #[test]
    fn power_is_right_associative() {
        let expr = value("2 ^ 3 ^ 2");
        assert_eq!(expr.node(0).unwrap().rule, Rule::Number);
        assert_eq!(expr.node(1).unwrap().rule, Rule::BinaryExpression);
    }

    #[test]
    fn not_covers_the_comparison() {
        let expr = value("not a == b and c");
        assert_eq!(expr.rule, Rule::BinaryExpression);
        assert_eq!(expr.tokens().next().unwrap().literal, "and");
        let negation = expr.node(0).unwrap();
        assert_eq!(negation.rule, Rule::UnaryExpression);
        assert_eq!(negation.node(0).unwrap().rule, Rule::BinaryExpression);
    }

    #[test]
    fn cast_needs_a_type_name() {
        let expr = value("n as string");
        assert_eq!(expr.rule, Rule::Cast);
        let call = value("http fetch as client");
        assert_eq!(call.rule, Rule::ServiceCall);
        assert!(call.find(&Rule::Output).is_some());
    }

    #[test]
    fn paths_with_fields_and_indexes() {
        let path = value("a.b[0][\"k\"]");
        assert_eq!(path.rule, Rule::Path);
        assert_eq!(path.find_all(&Rule::PathFragment).count(), 3);
    }

    #[test]
    fn collections() {
        let list = value("[1, 2, 3]");
        assert_eq!(list.nodes().count(), 3);
        let map = value("{\"a\": 1, \"b\": [2]}");
        assert_eq!(map.find_all(&Rule::MapItem).count(), 2);
        assert_eq!(value("[]").nodes().count(), 0);
    }

    #[test]
    fn parentheses_leave_no_node() {
        let expr = value("(1 + 2) * 3");
        assert_eq!(expr.node(0).unwrap().rule, Rule::BinaryExpression);
    }

    #[test]
    fn mutation_chain() {
        let mutation = value("items length then increment by:1");
        assert_eq!(mutation.rule, Rule::Mutation);
        assert_eq!(mutation.find_all(&Rule::MutationFragment).count(), 2);
    }

    #[test]
    fn generic_types() {
        let expr = value("x as map[string, list[int]]");
        let types = expr.find(&Rule::Types).unwrap();
        assert_eq!(types.nodes().count(), 2);
        assert_eq!(types.node(1).unwrap().nodes().count(), 1);
    }
}
