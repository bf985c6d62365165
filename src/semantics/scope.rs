//! Lexical scopes.
//!
//! A [`Scope`] is one environment; [`ScopeStack`] chains them from the
//! root outwards. Names are unique within a scope; an inner scope may
//! shadow an outer one.

use std::collections::HashMap;

use super::symbols::Symbol;
use super::types::Type;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
}

impl Scope {
    /// An empty root scope, ready to be seeded by the caller.
    pub fn root() -> Self {
        Self::default()
    }

    /// Insert `symbol`. An existing symbol of the same name is left in place
    /// and returned as the error.
    pub fn insert(&mut self, symbol: Symbol) -> Result<(), Symbol> {
        if let Some(existing) = self.symbols.get(&symbol.name) {
            return Err(existing.clone());
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    fn resolve_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in name order.
    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.symbols.values().collect();
        symbols.sort_by(|a, b| a.name.cmp(&b.name));
        symbols
    }
}

#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new(root: Scope) -> Self {
        Self { scopes: vec![root] }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope. The root is never popped.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declare in the innermost scope only.
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), Symbol> {
        match self.scopes.last_mut() {
            Some(scope) => scope.insert(symbol),
            None => Ok(()),
        }
    }

    pub fn current(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// Innermost to root.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.resolve(name))
    }

    /// Widen the type of an existing binding, in the scope that holds it.
    pub fn retype(&mut self, name: &str, ty: Type) {
        if let Some(symbol) = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.resolve_mut(name))
        {
            symbol.ty = ty;
        }
    }

    /// Like [`lookup`](Self::lookup), but only the scopes from `floor`
    /// inwards and the root are visible.
    pub fn lookup_within(&self, name: &str, floor: usize) -> Option<&Symbol> {
        self.scopes
            .iter()
            .skip(floor)
            .rev()
            .find_map(|scope| scope.resolve(name))
            .or_else(|| self.scopes.first().and_then(|root| root.resolve(name)))
    }
}
