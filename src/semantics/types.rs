//! The type lattice.
//!
//! `Any` sits on both ends: every type is assignable to `Any` and `Any` is
//! assignable to every type. Composite types compare structurally.

use std::collections::BTreeMap;
use std::fmt;

use crate::syntax::token_type::TokenType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    String,
    Boolean,
    Regex,
    Time,
    /// The type of `null`; it fits any slot.
    Null,
    List(Box<Type>),
    Map(Box<Type>, Box<Type>),
    /// A record. No fields means any object.
    Object(BTreeMap<String, Type>),
    Function(Vec<Type>, Box<Type>),
    /// The output of a service command, e.g. the `client` in
    /// `http server as client`.
    Service { service: String, command: String },
    Any,
}

impl Type {
    pub fn list(element: Type) -> Type {
        Type::List(Box::new(element))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn object() -> Type {
        Type::Object(BTreeMap::new())
    }

    /// A type written in source: a name plus its bracketed arguments.
    pub fn from_name(name: &str, arguments: Vec<Type>) -> Option<Type> {
        let mut arguments = arguments.into_iter();
        let ty = match name {
            "int" => Type::Int,
            "float" => Type::Float,
            "string" => Type::String,
            "boolean" => Type::Boolean,
            "regex" => Type::Regex,
            "time" => Type::Time,
            "any" => Type::Any,
            "object" => Type::object(),
            "function" => Type::Function(Vec::new(), Box::new(Type::Any)),
            "list" => {
                let element = arguments.next().unwrap_or(Type::Any);
                return arguments.next().is_none().then(|| Type::list(element));
            }
            "map" => {
                let key = arguments.next().unwrap_or(Type::Any);
                let value = arguments.next().unwrap_or(Type::Any);
                return arguments.next().is_none().then(|| Type::map(key, value));
            }
            _ => return None,
        };
        arguments.next().is_none().then_some(ty)
    }

    /// Parse the textual form used by capability documents:
    /// `int`, `list[string]`, `map[string,any]`.
    pub fn parse(text: &str) -> Option<Type> {
        let text = text.trim();
        let Some(open) = text.find('[') else {
            return Type::from_name(text, Vec::new());
        };
        let inner = text[open + 1..].strip_suffix(']')?;
        let mut arguments = Vec::new();
        for part in split_top_level(inner) {
            arguments.push(Type::parse(part)?);
        }
        Type::from_name(&text[..open], arguments)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Whether a value of type `other` may be stored where `self` is expected.
    pub fn is_assignable_from(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Any, _) | (_, Type::Any) | (_, Type::Null) => true,
            (Type::Float, Type::Int) => true,
            (Type::List(target), Type::List(value)) => target.is_assignable_from(value),
            (Type::Map(tk, tv), Type::Map(vk, vv)) => {
                tk.is_assignable_from(vk) && tv.is_assignable_from(vv)
            }
            (Type::Object(fields), Type::Object(other_fields)) => {
                fields.iter().all(|(name, ty)| {
                    other_fields
                        .get(name)
                        .is_some_and(|other| ty.is_assignable_from(other))
                })
            }
            (Type::Object(fields), Type::Map(key, _)) => {
                fields.is_empty() && key.is_assignable_from(&Type::String)
            }
            (Type::Function(..), Type::Function(..)) => true,
            _ => self == other,
        }
    }

    /// The result of `left <op> right`, or `None` when the operands don't fit.
    pub fn binary(op: TokenType, left: &Type, right: &Type) -> Option<Type> {
        use TokenType::*;
        match op {
            Plus | Minus | Asterisk | Slash | Percent | Caret => {
                Type::arithmetic(op, left, right)
            }
            Eq | NotEq => {
                (left.is_assignable_from(right) || right.is_assignable_from(left))
                    .then_some(Type::Boolean)
            }
            Lt | Lte | Gt | Gte => {
                let comparable = match (left, right) {
                    (Type::Any, _) | (_, Type::Any) => true,
                    (Type::String, Type::String) | (Type::Time, Type::Time) => true,
                    (l, r) => l.is_numeric() && r.is_numeric(),
                };
                comparable.then_some(Type::Boolean)
            }
            And | Or => {
                let logical = |ty: &Type| matches!(ty, Type::Boolean | Type::Any);
                (logical(left) && logical(right)).then_some(Type::Boolean)
            }
            _ => None,
        }
    }

    fn arithmetic(op: TokenType, left: &Type, right: &Type) -> Option<Type> {
        match (left, right) {
            (Type::Any, other) | (other, Type::Any) => Some(if other.is_numeric() {
                other.clone()
            } else {
                Type::Any
            }),
            (Type::Int, Type::Int) if op == TokenType::Slash => Some(Type::Float),
            (Type::Int, Type::Int) => Some(Type::Int),
            (l, r) if l.is_numeric() && r.is_numeric() => Some(Type::Float),
            (Type::String, Type::String) if op == TokenType::Plus => Some(Type::String),
            (Type::List(a), Type::List(b)) if op == TokenType::Plus => {
                Some(Type::list(Type::common(a, b)))
            }
            (Type::Map(ak, av), Type::Map(bk, bv)) if op == TokenType::Plus => {
                Some(Type::map(Type::common(ak, bk), Type::common(av, bv)))
            }
            _ => None,
        }
    }

    pub fn unary(op: TokenType, operand: &Type) -> Option<Type> {
        match (op, operand) {
            (_, Type::Any) if op == TokenType::Not => Some(Type::Boolean),
            (_, Type::Any) => Some(Type::Any),
            (TokenType::Not, Type::Boolean) => Some(Type::Boolean),
            (TokenType::Minus, ty) if ty.is_numeric() => Some(ty.clone()),
            _ => None,
        }
    }

    /// The narrowest type both sides fit in; `Any` when they don't meet.
    pub fn common(a: &Type, b: &Type) -> Type {
        if a.is_assignable_from(b) && !a.is_any() {
            a.clone()
        } else if b.is_assignable_from(a) && !b.is_any() {
            b.clone()
        } else {
            Type::Any
        }
    }

    pub fn can_cast_to(&self, target: &Type) -> bool {
        match (self, target) {
            (Type::Any, _) | (_, Type::Any) | (_, Type::String) => true,
            (Type::String, Type::Int | Type::Float | Type::Boolean | Type::Regex | Type::Time) => {
                true
            }
            (l, r) if l.is_numeric() && r.is_numeric() => true,
            (Type::Int, Type::Boolean) | (Type::Boolean, Type::Int) => true,
            (Type::List(_), Type::List(_)) | (Type::Map(..), Type::Map(..)) => true,
            (Type::Map(..), Type::Object(_)) | (Type::Object(_), Type::Map(..)) => true,
            _ => target.is_assignable_from(self),
        }
    }

    /// Types bound by `foreach <self> as a[, b]`: one name gets the element
    /// (or key), two names get index and element (or key and value).
    pub fn iteration(&self, names: usize) -> Option<Vec<Type>> {
        let (one, two) = match self {
            Type::List(element) => (vec![(**element).clone()], vec![Type::Int, (**element).clone()]),
            Type::Map(key, value) => (vec![(**key).clone()], vec![(**key).clone(), (**value).clone()]),
            Type::Any => (vec![Type::Any], vec![Type::Any, Type::Any]),
            _ => return None,
        };
        Some(if names >= 2 { two } else { one })
    }

    /// `self[index]`
    pub fn index(&self, index: &Type) -> Option<Type> {
        match self {
            Type::Any => Some(Type::Any),
            Type::List(element) => Type::Int.is_assignable_from(index).then(|| (**element).clone()),
            Type::Map(key, value) => key.is_assignable_from(index).then(|| (**value).clone()),
            Type::String => Type::Int.is_assignable_from(index).then_some(Type::String),
            Type::Object(_) => Type::String.is_assignable_from(index).then_some(Type::Any),
            _ => None,
        }
    }

    /// `self.name`
    pub fn field(&self, name: &str) -> Option<Type> {
        match self {
            Type::Any | Type::Service { .. } => Some(Type::Any),
            Type::Object(fields) if fields.is_empty() => Some(Type::Any),
            Type::Object(fields) => fields.get(name).cloned(),
            Type::Map(key, value) => key.is_assignable_from(&Type::String).then(|| (**value).clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::String => f.write_str("string"),
            Type::Boolean => f.write_str("boolean"),
            Type::Regex => f.write_str("regex"),
            Type::Time => f.write_str("time"),
            Type::Null => f.write_str("null"),
            Type::List(element) => write!(f, "list[{}]", element),
            Type::Map(key, value) => write!(f, "map[{},{}]", key, value),
            Type::Object(_) => f.write_str("object"),
            Type::Function(..) => f.write_str("function"),
            Type::Service { service, .. } => write!(f, "{}", service),
            Type::Any => f.write_str("any"),
        }
    }
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
