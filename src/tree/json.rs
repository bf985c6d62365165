//! JSON projection of trees, and the concise-mode cleaner shared with the
//! compiled output.

use serde_json::{Map, Value, json};

use crate::syntax::token::Token;
use crate::syntax::token_type::TokenType;

use super::node::{Child, Node};
use super::rule::Rule;

impl Node {
    /// Project the tree to JSON. Leaf rules become plain values, paths become
    /// a list of their parts, every other rule becomes
    /// `{"rule", "ln", "children"}`.
    pub fn to_json(&self) -> Value {
        match (&self.rule, self.leaf()) {
            (Rule::Number, Some(token)) => number_value(token),
            (Rule::String, Some(token)) => json!({ "string": token.literal }),
            (Rule::Boolean, Some(token)) => Value::Bool(token.is(TokenType::True)),
            (Rule::Null, _) => Value::Null,
            (Rule::Path, _) => json!({ "path": self.path_parts() }),
            _ => {
                let mut object = Map::new();
                object.insert("rule".into(), Value::String(self.rule.name().to_string()));
                if let Some(line) = self.line() {
                    object.insert("ln".into(), Value::String(line.to_string()));
                }
                let children = self.children.iter().map(child_json).collect();
                object.insert("children".into(), Value::Array(children));
                Value::Object(object)
            }
        }
    }

    fn path_parts(&self) -> Vec<Value> {
        let mut parts = Vec::new();
        for child in &self.children {
            match child {
                Child::Token(token) => parts.push(Value::String(token.literal.clone())),
                Child::Node(fragment) => match fragment.token(TokenType::Name) {
                    Some(name) => parts.push(Value::String(name.literal.clone())),
                    None => parts.extend(fragment.nodes().map(Node::to_json)),
                },
            }
        }
        parts
    }
}

fn child_json(child: &Child) -> Value {
    match child {
        Child::Node(node) => node.to_json(),
        Child::Token(token) => Value::String(token.literal.clone()),
    }
}

fn number_value(token: &Token) -> Value {
    if token.is(TokenType::Int)
        && let Ok(value) = token.literal.parse::<i64>()
    {
        return Value::from(value);
    }
    token
        .literal
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(token.literal.clone()))
}

/// Recursively drop `null`, `false`, `""`, `[]` and `{}` from maps and lists.
pub fn clean(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, clean(value)))
                .filter(|(_, value)| !is_blank(value))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(clean)
                .filter(|value| !is_blank(value))
                .collect(),
        ),
        other => other,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(true) | Value::Number(_) => false,
    }
}
