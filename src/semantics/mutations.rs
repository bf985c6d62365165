//! Builtin mutations, the methods available on values: `"a" uppercase`,
//! `items append item:x`, `n increment`.

use super::types::Type;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSignature {
    pub name: &'static str,
    /// All arguments are required.
    pub arguments: Vec<(&'static str, Type)>,
    pub returns: Type,
}

impl MutationSignature {
    fn new(name: &'static str, arguments: Vec<(&'static str, Type)>, returns: Type) -> Self {
        Self {
            name,
            arguments,
            returns,
        }
    }

    pub fn argument(&self, name: &str) -> Option<&Type> {
        self.arguments
            .iter()
            .find(|(argument, _)| *argument == name)
            .map(|(_, ty)| ty)
    }
}

/// The mutation `name` on a value of type `subject`.
pub fn lookup(subject: &Type, name: &str) -> Option<MutationSignature> {
    match subject {
        Type::String => string_mutation(name),
        Type::Int => int_mutation(name),
        Type::Float => float_mutation(name),
        Type::List(element) => list_mutation(element, name),
        Type::Map(key, value) => map_mutation(key, value, name),
        Type::Any => Some(MutationSignature {
            name: "any",
            arguments: Vec::new(),
            returns: Type::Any,
        }),
        _ => None,
    }
}

fn string_mutation(name: &str) -> Option<MutationSignature> {
    use Type::{Boolean, Int, String};
    let (name, arguments, returns) = match name {
        "length" => ("length", vec![], Int),
        "uppercase" => ("uppercase", vec![], String),
        "lowercase" => ("lowercase", vec![], String),
        "capitalize" => ("capitalize", vec![], String),
        "trim" => ("trim", vec![], String),
        "split" => ("split", vec![("by", String)], Type::list(String)),
        "replace" => ("replace", vec![("item", String), ("by", String)], String),
        "contains" => ("contains", vec![("item", String)], Boolean),
        "startswith" => ("startswith", vec![("prefix", String)], Boolean),
        "endswith" => ("endswith", vec![("suffix", String)], Boolean),
        "substring" => ("substring", vec![("start", Int), ("end", Int)], String),
        _ => return None,
    };
    Some(MutationSignature::new(name, arguments, returns))
}

fn int_mutation(name: &str) -> Option<MutationSignature> {
    use Type::{Boolean, Int};
    let (name, returns) = match name {
        "increment" => ("increment", Int),
        "decrement" => ("decrement", Int),
        "absolute" => ("absolute", Int),
        "isOdd" => ("isOdd", Boolean),
        "isEven" => ("isEven", Boolean),
        _ => return None,
    };
    Some(MutationSignature::new(name, Vec::new(), returns))
}

fn float_mutation(name: &str) -> Option<MutationSignature> {
    use Type::{Float, Int};
    let (name, returns) = match name {
        "round" => ("round", Int),
        "ceil" => ("ceil", Int),
        "floor" => ("floor", Int),
        "absolute" => ("absolute", Float),
        _ => return None,
    };
    Some(MutationSignature::new(name, Vec::new(), returns))
}

fn list_mutation(element: &Type, name: &str) -> Option<MutationSignature> {
    let list = Type::list(element.clone());
    let element = element.clone();
    let (name, arguments, returns) = match name {
        "length" => ("length", vec![], Type::Int),
        "append" => ("append", vec![("item", element)], list),
        "prepend" => ("prepend", vec![("item", element)], list),
        "remove" => ("remove", vec![("item", element)], list),
        "reverse" => ("reverse", vec![], list),
        "sort" => ("sort", vec![], list),
        "unique" => ("unique", vec![], list),
        "min" => ("min", vec![], element),
        "max" => ("max", vec![], element),
        "sum" => ("sum", vec![], element),
        "random" => ("random", vec![], element),
        "contains" => ("contains", vec![("item", element)], Type::Boolean),
        "index" => ("index", vec![("of", element)], Type::Int),
        "join" => ("join", vec![("by", Type::String)], Type::String),
        _ => return None,
    };
    Some(MutationSignature::new(name, arguments, returns))
}

fn map_mutation(key: &Type, value: &Type, name: &str) -> Option<MutationSignature> {
    let map = Type::map(key.clone(), value.clone());
    let (name, arguments, returns) = match name {
        "length" => ("length", vec![], Type::Int),
        "keys" => ("keys", vec![], Type::list(key.clone())),
        "values" => ("values", vec![], Type::list(value.clone())),
        "contains" => ("contains", vec![("key", key.clone())], Type::Boolean),
        "get" => (
            "get",
            vec![("key", key.clone()), ("default", value.clone())],
            value.clone(),
        ),
        "remove" => ("remove", vec![("key", key.clone())], map),
        _ => return None,
    };
    Some(MutationSignature::new(name, arguments, returns))
}
