use crate::CompileError;
use crate::ice;
use crate::syntax::token_type::TokenType;
use crate::tree::{LineCoord, Node, Rule};

use super::objects;
use super::{Compiler, Record};

/// Where a statement sits: the block statement that owns it, and the line
/// control continues at once it is done.
#[derive(Clone, Copy)]
struct Place {
    parent: Option<LineCoord>,
    after: Option<LineCoord>,
}

impl Compiler<'_> {
    /// Compile each statement of `block`. `after` is the line following the
    /// block's owner.
    pub(super) fn block(
        &mut self,
        block: &Node,
        parent: Option<LineCoord>,
        after: Option<LineCoord>,
    ) -> Result<(), CompileError> {
        let statements: Vec<&Node> = block.nodes().collect();
        for (i, statement) in statements.iter().enumerate() {
            let next = statements
                .get(i + 1)
                .and_then(|next| next.line())
                .or(after);
            self.statement(statement, Place { parent, after: next })?;
        }
        Ok(())
    }

    fn statement(&mut self, node: &Node, place: Place) -> Result<(), CompileError> {
        let ln = node
            .line()
            .ok_or_else(|| ice!("`{}` has no line", node.rule))?;
        let mut record = Record::new("expression", ln);
        record.parent = place.parent;

        match node.rule {
            Rule::Assignment => {
                let (Some(target), Some(value)) = (node.node(0), node.node(1)) else {
                    return Err(ice!("assignment without target and value"));
                };
                record.name = Some(objects::path_parts(target)?);
                fill(&mut record, value)?;
            }
            Rule::ServiceCall | Rule::Mutation | Rule::FunctionCall => {
                fill(&mut record, node)?;
                return self.with_block(record, node, place);
            }
            Rule::ExpressionStatement => {
                record.args = vec![objects::value(node)?];
            }
            Rule::IfBlock => return self.if_chain(record, node, place),
            Rule::ForeachBlock => {
                record.method = "for";
                record.args = vec![objects::value(first_node(node)?)?];
                record.output = output_names(node);
                record.exit = place.after;
                return self.with_block(record, node, place);
            }
            Rule::WhileBlock => {
                record.method = "while";
                record.args = vec![objects::value(first_node(node)?)?];
                record.exit = place.after;
                return self.with_block(record, node, place);
            }
            Rule::TryBlock => return self.try_chain(record, node, place),
            Rule::FunctionBlock => {
                let name = node
                    .token(TokenType::Name)
                    .ok_or_else(|| ice!("function without a name"))?;
                record.method = "function";
                record.function = Some(name.literal.clone());
                for parameter in node.find_all(&Rule::Parameter) {
                    let (Some(name), Some(types)) =
                        (parameter.first_token(), parameter.find(&Rule::Types))
                    else {
                        return Err(ice!("parameter without a name and type"));
                    };
                    record.args.push(serde_json::json!({
                        "$OBJECT": "arg",
                        "name": name.literal,
                        "arg": objects::type_object(types),
                    }));
                }
                if let Some(returns) = node.find(&Rule::Returns).and_then(|r| r.find(&Rule::Types)) {
                    record.output = vec![type_text(returns)];
                }
                self.functions.insert(name.literal.clone(), ln);
                let body = Place {
                    parent: place.parent,
                    after: None,
                };
                return self.with_block(record, node, body);
            }
            Rule::WhenBlock => {
                let target = node
                    .find(&Rule::Path)
                    .ok_or_else(|| ice!("when without a target"))?;
                record.method = "when";
                record.container = target.first_token().map(|t| t.literal.clone());
                record.command = node.token(TokenType::Name).map(|t| t.literal.clone());
                record.args = objects::arguments(node.find(&Rule::Arguments))?;
                record.output = output_names(node);
                return self.with_block(record, node, place);
            }
            Rule::ReturnStatement | Rule::ThrowStatement => {
                record.method = if node.is(&Rule::ReturnStatement) {
                    "return"
                } else {
                    "throw"
                };
                if let Some(value) = node.node(0) {
                    record.args = vec![objects::value(value)?];
                }
            }
            Rule::BreakStatement => record.method = "break",
            Rule::ContinueStatement => record.method = "continue",
            Rule::ImportStatement => {
                let (Some(path), Some(alias)) = (node.node(0), node.token(TokenType::Name)) else {
                    return Err(ice!("import without a path and name"));
                };
                record.method = "import";
                record.args = vec![objects::value(path)?];
                record.output = vec![alias.literal.clone()];
            }
            _ => return Err(ice!("`{}` is not a statement", node.rule)),
        }
        self.insert(record)
    }

    /// Insert `record` and compile the block `node` owns, if any.
    fn with_block(&mut self, mut record: Record, node: &Node, place: Place) -> Result<(), CompileError> {
        let ln = record.ln;
        let block = node.find(&Rule::Block);
        record.enter = block.and_then(|block| block.nodes().next()).and_then(Node::line);
        self.insert(record)?;
        if let Some(block) = block {
            self.block(block, Some(ln), place.after)?;
        }
        Ok(())
    }

    /// `if`, each `else if` and the `else` become sibling records; each one
    /// exits to the next branch, the last to the statement after the chain.
    fn if_chain(&mut self, mut record: Record, node: &Node, place: Place) -> Result<(), CompileError> {
        let branches: Vec<&Node> = node
            .nodes()
            .filter(|n| n.is(&Rule::ElifBlock) || n.is(&Rule::ElseBlock))
            .collect();
        let branch_lines: Vec<Option<LineCoord>> = branches.iter().map(|b| b.line()).collect();

        record.method = "if";
        record.args = vec![objects::value(first_node(node)?)?];
        record.exit = branch_lines.first().copied().flatten().or(place.after);
        self.with_block(record, node, place)?;

        for (i, branch) in branches.iter().enumerate() {
            let ln = branch
                .line()
                .ok_or_else(|| ice!("branch without a line"))?;
            let mut record = Record::new("else", ln);
            record.parent = place.parent;
            if branch.is(&Rule::ElifBlock) {
                record.method = "elif";
                record.args = vec![objects::value(first_node(branch)?)?];
            }
            record.exit = branch_lines.get(i + 1).copied().flatten().or(place.after);
            self.with_block(record, branch, place)?;
        }
        Ok(())
    }

    fn try_chain(&mut self, mut record: Record, node: &Node, place: Place) -> Result<(), CompileError> {
        let handlers: Vec<&Node> = node
            .nodes()
            .filter(|n| n.is(&Rule::CatchBlock) || n.is(&Rule::FinallyBlock))
            .collect();
        let handler_lines: Vec<Option<LineCoord>> = handlers.iter().map(|h| h.line()).collect();

        record.method = "try";
        record.exit = handler_lines.first().copied().flatten().or(place.after);
        self.with_block(record, node, place)?;

        for (i, handler) in handlers.iter().enumerate() {
            let ln = handler
                .line()
                .ok_or_else(|| ice!("handler without a line"))?;
            let method = if handler.is(&Rule::CatchBlock) {
                "catch"
            } else {
                "finally"
            };
            let mut record = Record::new(method, ln);
            record.parent = place.parent;
            record.output = output_names(handler);
            record.exit = handler_lines.get(i + 1).copied().flatten().or(place.after);
            self.with_block(record, handler, place)?;
        }
        Ok(())
    }
}

/// Fill in `record` from the value a statement evaluates.
fn fill(record: &mut Record, value: &Node) -> Result<(), CompileError> {
    match value.rule {
        Rule::ServiceCall => {
            let service = value
                .find(&Rule::Path)
                .and_then(Node::first_token)
                .ok_or_else(|| ice!("service call without a service"))?;
            record.method = "execute";
            record.container = Some(service.literal.clone());
            record.command = value.token(TokenType::Name).map(|t| t.literal.clone());
            record.args = objects::arguments(value.find(&Rule::Arguments))?;
            record.output = output_names(value);
        }
        Rule::Mutation => {
            let subject = first_node(value)?;
            record.method = "mutation";
            record.args = vec![objects::value(subject)?];
            for fragment in value.find_all(&Rule::MutationFragment) {
                record.args.push(objects::mutation(fragment)?);
            }
            record.output = output_names(value);
        }
        Rule::FunctionCall => {
            let name = value
                .token(TokenType::Name)
                .ok_or_else(|| ice!("call without a function"))?;
            record.method = "call";
            record.function = Some(name.literal.clone());
            record.args = objects::arguments(value.find(&Rule::Arguments))?;
        }
        Rule::BinaryExpression | Rule::UnaryExpression | Rule::Cast => {
            record.method = "expression";
            record.args = vec![objects::value(value)?];
        }
        _ => {
            record.method = "set";
            record.args = vec![objects::value(value)?];
        }
    }
    Ok(())
}

fn first_node(node: &Node) -> Result<&Node, CompileError> {
    node.node(0)
        .ok_or_else(|| ice!("`{}` has no operand", node.rule))
}

fn output_names(node: &Node) -> Vec<String> {
    node.find(&Rule::Output)
        .map(|output| {
            output
                .tokens()
                .filter(|token| token.is(TokenType::Name))
                .map(|token| token.literal.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// `map[string,list[int]]`
fn type_text(types: &Node) -> String {
    let name = types
        .first_token()
        .map(|token| token.literal.clone())
        .unwrap_or_default();
    let arguments: Vec<String> = types.nodes().map(type_text).collect();
    if arguments.is_empty() {
        name
    } else {
        format!("{}[{}]", name, arguments.join(","))
    }
}
