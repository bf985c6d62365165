//! Values in the compiled script.
//!
//! Every value is a JSON object tagged with `$OBJECT`, e.g.
//! `{"$OBJECT": "int", "int": 1}` or
//! `{"$OBJECT": "path", "paths": ["a", "b"]}`.

use serde_json::{Value, json};

use crate::CompileError;
use crate::ice;
use crate::lowering::interpolation::unescape;
use crate::syntax::token_type::TokenType;
use crate::tree::{Child, Node, Rule};

pub fn value(node: &Node) -> Result<Value, CompileError> {
    match node.rule {
        Rule::Number => number(node),
        Rule::String => {
            let token = node.leaf().ok_or_else(|| ice!("string without a token"))?;
            Ok(json!({ "$OBJECT": "string", "string": unescape(&token.literal) }))
        }
        Rule::Boolean => {
            let token = node.leaf().ok_or_else(|| ice!("boolean without a token"))?;
            Ok(json!({ "$OBJECT": "boolean", "boolean": token.is(TokenType::True) }))
        }
        Rule::Null => Ok(json!({ "$OBJECT": "null" })),
        Rule::List => {
            let items = node.nodes().map(value).collect::<Result<Vec<_>, _>>()?;
            Ok(json!({ "$OBJECT": "list", "items": items }))
        }
        Rule::Map => {
            let mut items = Vec::new();
            for item in node.nodes() {
                let (Some(key), Some(entry)) = (item.node(0), item.node(1)) else {
                    return Err(ice!("map item without a key and value"));
                };
                items.push(Value::Array(vec![value(key)?, value(entry)?]));
            }
            Ok(json!({ "$OBJECT": "dict", "items": items }))
        }
        Rule::Path => path(node),
        Rule::BinaryExpression => {
            let operator = node.tokens().next().ok_or_else(|| ice!("operator missing"))?;
            let values = node.nodes().map(value).collect::<Result<Vec<_>, _>>()?;
            Ok(json!({
                "$OBJECT": "expression",
                "expression": operator_name(operator.token_type)?,
                "values": values,
            }))
        }
        Rule::UnaryExpression => {
            let operator = node.tokens().next().ok_or_else(|| ice!("operator missing"))?;
            let operand = node.node(0).ok_or_else(|| ice!("operand missing"))?;
            let expression = if operator.is(TokenType::Not) {
                "not"
            } else {
                "negative"
            };
            Ok(json!({
                "$OBJECT": "expression",
                "expression": expression,
                "values": [value(operand)?],
            }))
        }
        Rule::Cast => {
            let (Some(inner), Some(types)) = (node.node(0), node.find(&Rule::Types)) else {
                return Err(ice!("cast without a value and type"));
            };
            Ok(json!({
                "$OBJECT": "type_cast",
                "type": type_object(types),
                "value": value(inner)?,
            }))
        }
        Rule::ExpressionStatement => value(node.node(0).ok_or_else(|| ice!("empty expression"))?),
        _ => Err(ice!("`{}` is not a value", node.rule)),
    }
}

fn number(node: &Node) -> Result<Value, CompileError> {
    let token = node.leaf().ok_or_else(|| ice!("number without a token"))?;
    if token.is(TokenType::Int) {
        let int: i64 = token
            .literal
            .parse()
            .map_err(|_| ice!("bad int literal {}", token.literal))?;
        return Ok(json!({ "$OBJECT": "int", "int": int }));
    }
    let float: f64 = token
        .literal
        .parse()
        .map_err(|_| ice!("bad float literal {}", token.literal))?;
    Ok(json!({ "$OBJECT": "float", "float": float }))
}

/// `a.b[0]` gives `{"$OBJECT": "path", "paths": ["a", "b", {int 0}]}`.
pub fn path(node: &Node) -> Result<Value, CompileError> {
    Ok(json!({ "$OBJECT": "path", "paths": path_parts(node)? }))
}

pub fn path_parts(node: &Node) -> Result<Vec<Value>, CompileError> {
    let mut parts = Vec::new();
    for child in &node.children {
        match child {
            Child::Token(token) => parts.push(Value::String(token.literal.clone())),
            Child::Node(fragment) => match fragment.token(TokenType::Name) {
                Some(field) => parts.push(Value::String(field.literal.clone())),
                None => {
                    let index = fragment.node(0).ok_or_else(|| ice!("empty index"))?;
                    parts.push(value(index)?);
                }
            },
        }
    }
    Ok(parts)
}

/// `name:value` pairs as `{"$OBJECT": "arg", "name": ..., "arg": ...}`.
pub fn arguments(node: Option<&Node>) -> Result<Vec<Value>, CompileError> {
    let Some(node) = node else {
        return Ok(Vec::new());
    };
    let mut arguments = Vec::new();
    for argument in node.nodes() {
        let (Some(name), Some(arg)) = (argument.first_token(), argument.node(0)) else {
            return Err(ice!("argument without a name and value"));
        };
        arguments.push(json!({ "$OBJECT": "arg", "name": name.literal, "arg": value(arg)? }));
    }
    Ok(arguments)
}

/// One mutation applied to a value: `{"$OBJECT": "mutation", ...}`.
pub fn mutation(fragment: &Node) -> Result<Value, CompileError> {
    let name = fragment
        .token(TokenType::Name)
        .ok_or_else(|| ice!("mutation without a name"))?;
    Ok(json!({
        "$OBJECT": "mutation",
        "mutation": name.literal,
        "args": arguments(fragment.find(&Rule::Arguments))?,
    }))
}

pub fn type_object(types: &Node) -> Value {
    let name = types
        .first_token()
        .map(|token| token.literal.as_str())
        .unwrap_or("any");
    let values: Vec<Value> = types.nodes().map(type_object).collect();
    if values.is_empty() {
        json!({ "$OBJECT": "type", "type": name })
    } else {
        json!({ "$OBJECT": "type", "type": name, "values": values })
    }
}

fn operator_name(token_type: TokenType) -> Result<&'static str, CompileError> {
    use TokenType::*;
    Ok(match token_type {
        Plus => "sum",
        Minus => "subtraction",
        Asterisk => "multiplication",
        Slash => "division",
        Percent => "modulus",
        Caret => "exponential",
        Eq => "equal",
        NotEq => "not_equal",
        Lt => "less",
        Lte => "less_equal",
        Gt => "greater",
        Gte => "greater_equal",
        And => "and",
        Or => "or",
        other => return Err(ice!("{:?} is not a binary operator", other)),
    })
}
