use crate::diagnostics::error_codes::{BREAK_OUTSIDE, CONTINUE_OUTSIDE, RETURN_OUTSIDE};
use crate::syntax::precedence::LOWEST;
use crate::syntax::token_type::TokenType;
use crate::tree::{Child, Node, Rule};

use super::{Parser, SyntaxError};

impl Parser<'_> {
    pub(super) fn parse_statement(&mut self) -> Result<Node, SyntaxError> {
        self.statement_start = self.pos;
        match self.current().token_type {
            TokenType::If => self.parse_if(),
            TokenType::Foreach => self.parse_foreach(),
            TokenType::While => self.parse_while(),
            TokenType::Try => self.parse_try(),
            TokenType::Function => self.parse_function(),
            TokenType::When => self.parse_when(),
            TokenType::Return => self.parse_return(),
            TokenType::Break => self.parse_loop_jump(Rule::BreakStatement),
            TokenType::Continue => self.parse_loop_jump(Rule::ContinueStatement),
            TokenType::Throw => self.parse_throw(),
            TokenType::Import => self.parse_import(),
            _ => self.parse_simple_statement(),
        }
    }

    /// `NEWLINE INDENT statement+ DEDENT`
    fn parse_block(&mut self) -> Result<Node, SyntaxError> {
        self.expect(TokenType::Newline)?;
        self.parse_indented_block()
    }

    fn parse_indented_block(&mut self) -> Result<Node, SyntaxError> {
        let outer_start = self.statement_start;
        self.expect(TokenType::Indent)?;
        let mut statements: Vec<Child> = Vec::new();
        while !self.at(TokenType::Dedent) && !self.at(TokenType::Eof) {
            statements.push(self.parse_statement()?.into());
        }
        self.expect(TokenType::Dedent)?;
        self.statement_start = outer_start;
        Ok(Node::new(Rule::Block, statements))
    }

    fn end_of_statement(&mut self) -> Result<(), SyntaxError> {
        self.expect(TokenType::Newline).map(|_| ())
    }

    /// Assignments, service calls, mutations, function calls and bare
    /// expressions. The leading path is parsed once and then decides.
    fn parse_simple_statement(&mut self) -> Result<Node, SyntaxError> {
        let statement = if self.at(TokenType::Name) && !self.peek_is(TokenType::LParen) {
            let path = self.parse_path()?;
            if self.at(TokenType::Assign) {
                let assign = self.advance();
                let value = self.parse_value()?;
                Node::new(
                    Rule::Assignment,
                    vec![path.into(), assign.into(), value.into()],
                )
            } else if self.at(TokenType::Name) {
                self.parse_service_tail(path)?
            } else {
                let expression = self.parse_infix(path, LOWEST)?;
                self.expression_statement(expression)?
            }
        } else {
            let expression = self.parse_expression(LOWEST)?;
            self.expression_statement(expression)?
        };

        if !self.at(TokenType::Newline) {
            let mut expected = vec![TokenType::Newline];
            if statement.is(&Rule::ExpressionStatement) {
                expected.push(TokenType::Assign);
            }
            return Err(self.unexpected(&expected));
        }
        self.advance();

        if statement.is(&Rule::ServiceCall) && self.at(TokenType::Indent) {
            let mut statement = statement;
            let block = self.parse_indented_block()?;
            statement.children.push(block.into());
            return Ok(statement);
        }
        Ok(statement)
    }

    fn expression_statement(&mut self, expression: Node) -> Result<Node, SyntaxError> {
        if self.at(TokenType::Name) {
            return self.parse_call_tail(expression);
        }
        // `(http fetch)` on its own line is the call itself
        if matches!(
            expression.rule,
            Rule::FunctionCall | Rule::ServiceCall | Rule::Mutation
        ) {
            return Ok(expression);
        }
        Ok(Node::new(Rule::ExpressionStatement, vec![expression.into()]))
    }

    /// `if cond` block, then any number of `else if cond` and one `else`.
    fn parse_if(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let condition = self.parse_expression(LOWEST)?;
        let block = self.parse_block()?;
        let mut children: Vec<Child> = vec![keyword.into(), condition.into(), block.into()];

        while self.at(TokenType::Else) {
            self.statement_start = self.pos;
            let else_keyword = self.advance();
            if self.at(TokenType::If) {
                let if_keyword = self.advance();
                let condition = self.parse_expression(LOWEST)?;
                let block = self.parse_block()?;
                children.push(
                    Node::new(
                        Rule::ElifBlock,
                        vec![
                            else_keyword.into(),
                            if_keyword.into(),
                            condition.into(),
                            block.into(),
                        ],
                    )
                    .into(),
                );
            } else {
                let block = self.parse_block()?;
                children.push(
                    Node::new(Rule::ElseBlock, vec![else_keyword.into(), block.into()]).into(),
                );
                break;
            }
        }
        Ok(Node::new(Rule::IfBlock, children))
    }

    fn parse_foreach(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let iterable = self.parse_expression(LOWEST)?;
        if !self.at(TokenType::As) {
            return Err(self.unexpected(&[TokenType::As]));
        }
        let output = self.parse_output()?;
        let block = self.parse_loop_body()?;
        Ok(Node::new(
            Rule::ForeachBlock,
            vec![keyword.into(), iterable.into(), output.into(), block.into()],
        ))
    }

    fn parse_while(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let condition = self.parse_expression(LOWEST)?;
        let block = self.parse_loop_body()?;
        Ok(Node::new(
            Rule::WhileBlock,
            vec![keyword.into(), condition.into(), block.into()],
        ))
    }

    fn parse_loop_body(&mut self) -> Result<Node, SyntaxError> {
        self.loop_depth += 1;
        let block = self.parse_block();
        self.loop_depth -= 1;
        block
    }

    /// `try` block, optional `catch [as err]` block, optional `finally` block.
    fn parse_try(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let block = self.parse_block()?;
        let mut children: Vec<Child> = vec![keyword.into(), block.into()];

        if self.at(TokenType::Catch) {
            self.statement_start = self.pos;
            let catch = self.advance();
            let mut catch_children: Vec<Child> = vec![catch.into()];
            if self.at(TokenType::As) {
                catch_children.push(self.parse_output()?.into());
            }
            catch_children.push(self.parse_block()?.into());
            children.push(Node::new(Rule::CatchBlock, catch_children).into());
        }
        if self.at(TokenType::Finally) {
            self.statement_start = self.pos;
            let finally = self.advance();
            let block = self.parse_block()?;
            children.push(Node::new(Rule::FinallyBlock, vec![finally.into(), block.into()]).into());
        }
        Ok(Node::new(Rule::TryBlock, children))
    }

    /// `function name param:type ... [returns type]` block
    fn parse_function(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let name = self.expect_name()?;
        let mut children: Vec<Child> = vec![keyword.into(), name.into()];

        while self.at(TokenType::Name) {
            let parameter = self.expect_name()?;
            self.expect(TokenType::Colon)?;
            let types = self.parse_types()?;
            children.push(Node::new(Rule::Parameter, vec![parameter.into(), types.into()]).into());
        }
        if self.at(TokenType::Returns) {
            let returns = self.advance();
            let types = self.parse_types()?;
            children.push(Node::new(Rule::Returns, vec![returns.into(), types.into()]).into());
        }

        let enclosing_loops = std::mem::take(&mut self.loop_depth);
        self.function_depth += 1;
        let block = self.parse_block();
        self.function_depth -= 1;
        self.loop_depth = enclosing_loops;
        children.push(block?.into());
        Ok(Node::new(Rule::FunctionBlock, children))
    }

    /// `when service event args... [as output]` block
    fn parse_when(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let target = self.parse_path()?;
        let event = self.expect_name()?;
        let arguments = self.parse_arguments()?;
        let mut children: Vec<Child> = vec![
            keyword.into(),
            target.into(),
            event.into(),
            arguments.into(),
        ];
        if self.at(TokenType::As) {
            children.push(self.parse_output()?.into());
        }
        children.push(self.parse_block()?.into());
        Ok(Node::new(Rule::WhenBlock, children))
    }

    fn parse_return(&mut self) -> Result<Node, SyntaxError> {
        if self.function_depth == 0 {
            return Err(self.error_here(&RETURN_OUTSIDE));
        }
        let keyword = self.advance();
        let mut children: Vec<Child> = vec![keyword.into()];
        if !self.at(TokenType::Newline) {
            children.push(self.parse_value()?.into());
        }
        self.end_of_statement()?;
        Ok(Node::new(Rule::ReturnStatement, children))
    }

    fn parse_loop_jump(&mut self, rule: Rule) -> Result<Node, SyntaxError> {
        if self.loop_depth == 0 {
            let code = if rule == Rule::BreakStatement {
                &BREAK_OUTSIDE
            } else {
                &CONTINUE_OUTSIDE
            };
            return Err(self.error_here(code));
        }
        let keyword = self.advance();
        self.end_of_statement()?;
        Ok(Node::new(rule, vec![keyword.into()]))
    }

    fn parse_throw(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let mut children: Vec<Child> = vec![keyword.into()];
        if !self.at(TokenType::Newline) {
            children.push(self.parse_value()?.into());
        }
        self.end_of_statement()?;
        Ok(Node::new(Rule::ThrowStatement, children))
    }

    /// `import "path.story" as name`
    fn parse_import(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        if !self.at(TokenType::String) {
            return Err(self.unexpected(&[TokenType::String]));
        }
        let path = Node::new(Rule::String, vec![self.advance().into()]);
        let as_keyword = self.expect(TokenType::As)?;
        let name = self.expect_name()?;
        self.end_of_statement()?;
        Ok(Node::new(
            Rule::ImportStatement,
            vec![keyword.into(), path.into(), as_keyword.into(), name.into()],
        ))
    }
}
