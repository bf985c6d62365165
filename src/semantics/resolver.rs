//! Name resolution and type checking over the lowered tree.
//!
//! Faults found here never stop the walk: each one becomes a diagnostic and
//! the offending expression continues as `any`, so unrelated statements are
//! still checked.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::diagnostics::Diagnostic;
use crate::diagnostics::error_codes::*;
use crate::features::Features;
use crate::syntax::position::Position;
use crate::syntax::token_type::TokenType;
use crate::tree::{Child, LineCoord, Node, Rule};

use super::mutations;
use super::registry::{ArgumentSignature, CapabilityRegistry};
use super::scope::{Scope, ScopeStack};
use super::symbols::{FunctionSignature, Parameter, Symbol};
use super::types::Type;

/// What the semantic pass learned about a story.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    /// Services the story calls, sorted.
    pub services: Vec<String>,
    pub functions: BTreeMap<String, FunctionSignature>,
    /// Story-level variables.
    pub scope: Scope,
}

/// An argument as written at a call site.
struct Supplied {
    name: String,
    ty: Type,
    position: Option<Position>,
}

pub struct Resolver<'a> {
    scopes: ScopeStack,
    functions: BTreeMap<String, FunctionSignature>,
    registry: Option<&'a dyn CapabilityRegistry>,
    features: Features,
    diagnostics: Vec<Diagnostic>,
    services: BTreeSet<String>,
    /// Enclosing functions, innermost last, with the scope depth their body starts at.
    enclosing: Vec<(String, Type, usize)>,
}

impl<'a> Resolver<'a> {
    /// `root` holds names provided from outside the story; story-level
    /// declarations go in a scope of their own above it.
    pub fn new(root: Scope) -> Self {
        Self {
            scopes: ScopeStack::new(root),
            functions: BTreeMap::new(),
            registry: None,
            features: Features::default(),
            diagnostics: Vec::new(),
            services: BTreeSet::new(),
            enclosing: Vec::new(),
        }
    }

    /// Without a registry, service calls are not checked.
    pub fn with_registry(mut self, registry: &'a dyn CapabilityRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn resolve(mut self, tree: &mut Node) -> Analysis {
        self.collect_functions(tree);
        self.scopes.push();
        self.statements(tree);
        let scope = self.scopes.pop().unwrap_or_default();
        Analysis {
            diagnostics: self.diagnostics,
            services: self.services.into_iter().collect(),
            functions: self.functions,
            scope,
        }
    }

    fn report<S: AsRef<str>>(
        &mut self,
        code: &'static ErrorCode,
        args: &[S],
        position: Option<Position>,
    ) {
        let mut diagnostic = Diagnostic::new(code, args);
        if let Some(position) = position {
            diagnostic = diagnostic.with_position(position);
        }
        self.diagnostics.push(diagnostic);
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        match self.enclosing.last() {
            Some((_, _, floor)) if !self.features.globals => {
                self.scopes.lookup_within(name, *floor)
            }
            _ => self.scopes.lookup(name),
        }
    }

    fn declare(&mut self, name: &str, ty: Type, line: Option<LineCoord>, position: Option<Position>) {
        if let Err(existing) = self.scopes.declare(Symbol::new(name, ty, line)) {
            let line = existing.line_text();
            self.report(&ALREADY_DECLARED, &[name, line.as_str()], position);
        }
    }

    /// Signatures first, so a function can be called above its declaration.
    fn collect_functions(&mut self, tree: &Node) {
        let mut blocks = Vec::new();
        tree.walk(&mut |node| {
            if node.is(&Rule::FunctionBlock) {
                blocks.push(node);
            }
        });
        for block in blocks {
            let Some(name) = block.token(TokenType::Name) else {
                continue;
            };
            let mut parameters = Vec::new();
            for parameter in block.find_all(&Rule::Parameter) {
                parameters.push(Parameter {
                    name: parameter_name(parameter),
                    ty: self.checked_type(parameter.find(&Rule::Types)),
                });
            }
            let returns = match block.find(&Rule::Returns) {
                Some(returns) => self.checked_type(returns.find(&Rule::Types)),
                None => Type::Any,
            };
            let line = block.line().unwrap_or(LineCoord::real(name.line()));
            if let Some(existing) = self.functions.get(&name.literal) {
                let line = existing.line.to_string();
                self.report(
                    &ALREADY_DECLARED,
                    &[name.literal.as_str(), line.as_str()],
                    Some(name.position),
                );
                continue;
            }
            self.functions.insert(
                name.literal.clone(),
                FunctionSignature {
                    name: name.literal.clone(),
                    parameters,
                    returns,
                    line,
                },
            );
        }
    }

    /// A written type, reporting names that aren't types.
    fn checked_type(&mut self, types: Option<&Node>) -> Type {
        let Some(types) = types else {
            return Type::Any;
        };
        match declared_type(types) {
            Ok(ty) => ty,
            Err(name) => {
                self.report(&UNKNOWN_TYPE, &[name], types.position());
                Type::Any
            }
        }
    }

    // Statements

    fn statements(&mut self, block: &mut Node) {
        let mut stopped_by: Option<String> = None;
        let mut warned = false;
        for statement in block.nodes_mut() {
            if let Some(keyword) = &stopped_by
                && !warned
            {
                let keyword = keyword.clone();
                self.report(&UNREACHABLE_CODE, &[keyword], statement.position());
                warned = true;
            }
            self.statement(statement);
            if stopped_by.is_none()
                && matches!(
                    statement.rule,
                    Rule::ReturnStatement
                        | Rule::BreakStatement
                        | Rule::ContinueStatement
                        | Rule::ThrowStatement
                )
            {
                stopped_by = statement.first_token().map(|token| token.literal.clone());
            }
        }
    }

    fn block(&mut self, block: Option<&mut Node>) {
        if let Some(block) = block {
            self.scopes.push();
            self.statements(block);
            self.scopes.pop();
        }
    }

    fn statement(&mut self, node: &mut Node) {
        match node.rule {
            Rule::Assignment => self.assignment(node),
            Rule::ServiceCall | Rule::Mutation => {
                let ty = self.infer(node);
                self.declare_output(node, ty);
                self.block(node.find_mut(&Rule::Block));
            }
            Rule::FunctionCall | Rule::ExpressionStatement => {
                self.infer(node);
            }
            Rule::IfBlock => {
                for child in node.nodes_mut() {
                    match child.rule {
                        Rule::Block => self.block(Some(child)),
                        Rule::ElifBlock => {
                            for part in child.nodes_mut() {
                                if part.is(&Rule::Block) {
                                    self.block(Some(part));
                                } else {
                                    self.condition(part);
                                }
                            }
                        }
                        Rule::ElseBlock => self.block(child.find_mut(&Rule::Block)),
                        _ => self.condition(child),
                    }
                }
            }
            Rule::WhileBlock => {
                if let Some(condition) = node.nodes_mut().next() {
                    self.condition(condition);
                }
                self.block(node.find_mut(&Rule::Block));
            }
            Rule::ForeachBlock => self.foreach(node),
            Rule::TryBlock => {
                for child in node.nodes_mut() {
                    match child.rule {
                        Rule::Block => self.block(Some(child)),
                        Rule::CatchBlock => {
                            self.scopes.push();
                            self.declare_output(child, Type::object());
                            if let Some(block) = child.find_mut(&Rule::Block) {
                                self.statements(block);
                            }
                            self.scopes.pop();
                        }
                        Rule::FinallyBlock => self.block(child.find_mut(&Rule::Block)),
                        _ => {}
                    }
                }
            }
            Rule::FunctionBlock => self.function(node),
            Rule::WhenBlock => self.when(node),
            Rule::ReturnStatement => self.return_statement(node),
            Rule::ThrowStatement => {
                if let Some(value) = node.nodes_mut().next() {
                    self.infer(value);
                }
            }
            Rule::ImportStatement => {
                if let Some(name) = node.token(TokenType::Name) {
                    let (literal, position) = (name.literal.clone(), name.position);
                    self.declare(&literal, Type::object(), node.line(), Some(position));
                }
            }
            _ => {}
        }
    }

    /// A new name is declared with the value's type. An existing one must
    /// accept the value.
    fn assignment(&mut self, node: &mut Node) {
        let value = match node.nodes_mut().nth(1) {
            Some(value) => self.infer(value),
            None => Type::Any,
        };
        let line = node.line();
        let Some(path) = node.nodes_mut().next() else {
            return;
        };
        let Some(root) = path.first_token() else {
            return;
        };
        let (name, position) = (root.literal.clone(), root.position);

        if path.find(&Rule::PathFragment).is_some() {
            let target = self.infer(path);
            if !target.is_assignable_from(&value) {
                let (value, target) = (value.to_string(), target.to_string());
                self.report(&ASSIGNMENT_TYPE, &[value, target], Some(position));
            }
            return;
        }

        match self.lookup(&name).map(|symbol| symbol.ty.clone()) {
            Some(target) => {
                if !target.is_assignable_from(&value) {
                    let (value, target) = (value.to_string(), target.to_string());
                    self.report(&ASSIGNMENT_TYPE, &[value, target], Some(position));
                }
            }
            None => self.declare(&name, value, line, Some(position)),
        }
    }

    /// `as a, b` after a call or `catch`: the first name gets `ty`, any
    /// further ones are untyped.
    fn declare_output(&mut self, node: &Node, ty: Type) {
        let Some(output) = node.find(&Rule::Output) else {
            return;
        };
        let line = node.line();
        let mut ty = Some(ty);
        for name in output.tokens().filter(|token| token.is(TokenType::Name)) {
            let (literal, position) = (name.literal.clone(), name.position);
            self.declare(&literal, ty.take().unwrap_or(Type::Any), line, Some(position));
        }
    }

    fn condition(&mut self, node: &mut Node) {
        let ty = self.infer(node);
        if self.features.strict_conditions && !matches!(ty, Type::Boolean | Type::Any) {
            self.report(&CONDITION_TYPE, &[ty.to_string()], node.position());
        }
    }

    fn foreach(&mut self, node: &mut Node) {
        let iterable = match node.nodes_mut().next() {
            Some(iterable) => self.infer(iterable),
            None => Type::Any,
        };
        let position = node.nodes().next().and_then(Node::position);
        let names: Vec<(String, Position)> = node
            .find(&Rule::Output)
            .map(|output| {
                output
                    .tokens()
                    .filter(|token| token.is(TokenType::Name))
                    .map(|token| (token.literal.clone(), token.position))
                    .collect()
            })
            .unwrap_or_default();

        let types = match iterable.iteration(names.len()) {
            Some(types) => types,
            None => {
                self.report(&NOT_ITERABLE, &[iterable.to_string()], position);
                vec![Type::Any; 2]
            }
        };
        if names.len() > 2 {
            self.report(&FOREACH_NAMES, &[iterable.to_string(), "2".to_string()], position);
        }

        let line = node.line();
        self.scopes.push();
        for (i, (name, position)) in names.iter().enumerate() {
            let ty = types.get(i).cloned().unwrap_or(Type::Any);
            self.declare(name, ty, line, Some(*position));
        }
        if let Some(block) = node.find_mut(&Rule::Block) {
            self.statements(block);
        }
        self.scopes.pop();
    }

    fn function(&mut self, node: &mut Node) {
        let Some(name) = node.token(TokenType::Name).map(|t| t.literal.clone()) else {
            return;
        };
        let returns = match node.find(&Rule::Returns) {
            Some(returns) => returns
                .find(&Rule::Types)
                .and_then(|types| declared_type(types).ok())
                .unwrap_or(Type::Any),
            None => Type::Any,
        };
        let line = node.line();

        self.scopes.push();
        self.enclosing.push((name, returns, self.scopes.depth() - 1));
        let parameters: Vec<(String, Type, Position)> = node
            .find_all(&Rule::Parameter)
            .filter_map(|parameter| {
                let token = parameter.first_token()?;
                let ty = parameter
                    .find(&Rule::Types)
                    .and_then(|types| declared_type(types).ok())
                    .unwrap_or(Type::Any);
                Some((token.literal.clone(), ty, token.position))
            })
            .collect();
        for (name, ty, position) in parameters {
            self.declare(&name, ty, line, Some(position));
        }
        if let Some(block) = node.find_mut(&Rule::Block) {
            self.statements(block);
        }
        self.enclosing.pop();
        self.scopes.pop();
    }

    fn return_statement(&mut self, node: &mut Node) {
        let Some(value) = node.nodes_mut().next() else {
            return;
        };
        let ty = self.infer(value);
        let position = value.position();
        let Some((function, returns, _)) = self.enclosing.last() else {
            return;
        };
        if !returns.is_assignable_from(&ty) {
            let args = [function.clone(), returns.to_string(), ty.to_string()];
            self.report(&RETURN_TYPE, &args, position);
        }
    }

    /// `when <output> <event> args... [as name]`
    fn when(&mut self, node: &mut Node) {
        let supplied = self.arguments(node.find_mut(&Rule::Arguments));
        let Some(target) = node.find(&Rule::Path) else {
            return;
        };
        let Some(root) = target.first_token() else {
            return;
        };
        let (name, position) = (root.literal.clone(), root.position);
        let event = node
            .token(TokenType::Name)
            .map(|token| (token.literal.clone(), token.position));

        let output = match self.lookup(&name).map(|symbol| symbol.ty.clone()) {
            Some(Type::Service { service, command }) => match &event {
                Some((event, at)) => self.check_event(&service, &command, event, *at, &supplied),
                None => Type::Any,
            },
            Some(Type::Any) => Type::Any,
            Some(_) => {
                self.report(&SERVICE_OUTPUT_REQUIRED, &[name], Some(position));
                Type::Any
            }
            None => {
                // `when service event`: listening on a service directly.
                self.services.insert(name.clone());
                if let Some(registry) = self.registry
                    && registry.lookup(&name).is_none()
                {
                    self.report(&SERVICE_NOT_FOUND, &[name], Some(position));
                }
                Type::Any
            }
        };

        self.scopes.push();
        self.declare_output(node, output);
        if let Some(block) = node.find_mut(&Rule::Block) {
            self.statements(block);
        }
        self.scopes.pop();
    }

    fn check_event(
        &mut self,
        service: &str,
        command: &str,
        event: &str,
        position: Position,
        supplied: &[Supplied],
    ) -> Type {
        let Some(registry) = self.registry else {
            return Type::Any;
        };
        let signature = registry
            .lookup(service)
            .and_then(|service| service.command(command))
            .map(|command| command.events.get(event).cloned());
        match signature {
            Some(Some(signature)) => {
                self.check_service_arguments(service, event, &signature.arguments, supplied, position);
                signature.output_type()
            }
            Some(None) => {
                self.report(&SERVICE_EVENT_NOT_FOUND, &[service, command, event], Some(position));
                Type::Any
            }
            None => Type::Any,
        }
    }

    // Calls

    /// `name arg:value ...`: `name` is either a variable, making this a
    /// mutation, or a service.
    fn call(&mut self, node: &mut Node) -> Type {
        let Some(path) = node.find(&Rule::Path) else {
            return Type::Any;
        };
        let Some(root) = path.first_token() else {
            return Type::Any;
        };
        let (name, position) = (root.literal.clone(), root.position);
        let dotted = path.find(&Rule::PathFragment).is_some();

        match self.lookup(&name).map(|symbol| symbol.ty.clone()) {
            Some(Type::Service { .. }) if !dotted => {
                // A command on a running service's output.
                self.arguments(node.find_mut(&Rule::Arguments));
                Type::Any
            }
            Some(_) => {
                into_mutation(node);
                self.mutation(node)
            }
            None if dotted => {
                self.report(&SERVICE_NAME, &[] as &[&str], Some(position));
                self.arguments(node.find_mut(&Rule::Arguments));
                Type::Any
            }
            None => self.service_call(node, &name, position),
        }
    }

    fn service_call(&mut self, node: &mut Node, service: &str, position: Position) -> Type {
        let supplied = self.arguments(node.find_mut(&Rule::Arguments));
        self.services.insert(service.to_string());
        let Some((command, at)) = node
            .token(TokenType::Name)
            .map(|token| (token.literal.clone(), token.position))
        else {
            return Type::Any;
        };
        let Some(registry) = self.registry else {
            return Type::Any;
        };

        let Some(signature) = registry.lookup(service) else {
            self.report(&SERVICE_NOT_FOUND, &[service], Some(position));
            return Type::Any;
        };
        let Some(signature) = signature.command(&command).cloned() else {
            self.report(&SERVICE_COMMAND_NOT_FOUND, &[service, command.as_str()], Some(at));
            return Type::Any;
        };
        self.check_service_arguments(service, &command, &signature.arguments, &supplied, at);
        if signature.events.is_empty() {
            signature.output_type()
        } else {
            Type::Service {
                service: service.to_string(),
                command,
            }
        }
    }

    fn check_service_arguments(
        &mut self,
        service: &str,
        command: &str,
        expected: &BTreeMap<String, ArgumentSignature>,
        supplied: &[Supplied],
        position: Position,
    ) {
        for argument in supplied {
            match expected.get(&argument.name) {
                None => self.report(
                    &SERVICE_ARGUMENT_UNKNOWN,
                    &[service, command, argument.name.as_str()],
                    argument.position,
                ),
                Some(signature) => {
                    let ty = signature.to_type();
                    if !ty.is_assignable_from(&argument.ty) {
                        let args = [
                            argument.name.clone(),
                            service.to_string(),
                            command.to_string(),
                            ty.to_string(),
                            argument.ty.to_string(),
                        ];
                        self.report(&SERVICE_ARGUMENT_TYPE, &args, argument.position);
                    }
                }
            }
        }
        for (name, signature) in expected {
            if signature.required && !supplied.iter().any(|argument| &argument.name == name) {
                self.report(
                    &SERVICE_ARGUMENT_MISSING,
                    &[service, command, name.as_str()],
                    Some(position),
                );
            }
        }
    }

    fn function_call(&mut self, node: &mut Node) -> Type {
        let supplied = self.arguments(node.find_mut(&Rule::Arguments));
        let Some(name) = node.token(TokenType::Name) else {
            return Type::Any;
        };
        let (name, position) = (name.literal.clone(), name.position);
        let Some(signature) = self.functions.get(&name).cloned() else {
            self.report(&UNKNOWN_FUNCTION, &[name], Some(position));
            return Type::Any;
        };
        let expected: Vec<(&str, Type)> = signature
            .parameters
            .iter()
            .map(|parameter| (parameter.name.as_str(), parameter.ty.clone()))
            .collect();
        self.check_arguments(&name, &expected, &supplied, position);
        signature.returns
    }

    /// Each fragment applies to the result of the one before.
    fn mutation(&mut self, node: &mut Node) -> Type {
        let mut children = node.nodes_mut();
        let mut ty = match children.next() {
            Some(subject) => self.infer(subject),
            None => return Type::Any,
        };
        for fragment in children.filter(|child| child.is(&Rule::MutationFragment)) {
            let supplied = self.arguments(fragment.find_mut(&Rule::Arguments));
            let Some(name) = fragment.token(TokenType::Name) else {
                continue;
            };
            let (name, position) = (name.literal.clone(), name.position);
            let Some(signature) = mutations::lookup(&ty, &name) else {
                self.report(&UNKNOWN_MUTATION, &[ty.to_string(), name], Some(position));
                ty = Type::Any;
                continue;
            };
            if !ty.is_any() {
                self.check_arguments(&name, &signature.arguments, &supplied, position);
            }
            ty = signature.returns;
        }
        ty
    }

    fn check_arguments(
        &mut self,
        callee: &str,
        expected: &[(&str, Type)],
        supplied: &[Supplied],
        position: Position,
    ) {
        for argument in supplied {
            match expected.iter().find(|(name, _)| *name == argument.name) {
                None => self.report(
                    &FUNCTION_ARGUMENT_UNKNOWN,
                    &[callee, argument.name.as_str()],
                    argument.position,
                ),
                Some((_, ty)) if !ty.is_assignable_from(&argument.ty) => {
                    let args = [argument.name.clone(), ty.to_string(), argument.ty.to_string()];
                    self.report(&ARGUMENT_TYPE, &args, argument.position);
                }
                Some(_) => {}
            }
        }
        for (name, _) in expected {
            if !supplied.iter().any(|argument| argument.name == *name) {
                self.report(&FUNCTION_ARGUMENT_MISSING, &[callee, name], Some(position));
            }
        }
    }

    fn arguments(&mut self, arguments: Option<&mut Node>) -> Vec<Supplied> {
        let Some(arguments) = arguments else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut supplied = Vec::new();
        for argument in arguments.nodes_mut() {
            let Some(name) = argument.first_token() else {
                continue;
            };
            let (name, position) = (name.literal.clone(), Some(name.position));
            if !seen.insert(name.clone()) {
                self.report(&DUPLICATE_ARGUMENT, &[name.as_str()], position);
            }
            let ty = match argument.nodes_mut().next() {
                Some(value) => self.infer(value),
                None => Type::Any,
            };
            supplied.push(Supplied { name, ty, position });
        }
        supplied
    }

    // Expressions

    fn infer(&mut self, node: &mut Node) -> Type {
        match node.rule {
            Rule::Number => match node.leaf() {
                Some(token) if token.is(TokenType::Float) => Type::Float,
                _ => Type::Int,
            },
            Rule::String => Type::String,
            Rule::Boolean => Type::Boolean,
            Rule::Null => Type::Null,
            Rule::List => {
                let mut element: Option<Type> = None;
                for item in node.nodes_mut() {
                    let ty = self.infer(item);
                    element = Some(match element {
                        Some(element) => Type::common(&element, &ty),
                        None => ty,
                    });
                }
                Type::list(element.unwrap_or(Type::Any))
            }
            Rule::Map => {
                let mut entry: Option<(Type, Type)> = None;
                for item in node.nodes_mut() {
                    let mut parts = item.nodes_mut();
                    let key = parts.next().map(|key| self.infer(key)).unwrap_or(Type::Any);
                    let value = parts.next().map(|value| self.infer(value)).unwrap_or(Type::Any);
                    entry = Some(match entry {
                        Some((k, v)) => (Type::common(&k, &key), Type::common(&v, &value)),
                        None => (key, value),
                    });
                }
                let (key, value) = entry.unwrap_or((Type::Any, Type::Any));
                Type::map(key, value)
            }
            Rule::Path => self.path(node),
            Rule::BinaryExpression => {
                let (left, right) = {
                    let mut operands = node.nodes_mut();
                    let left = operands.next().map(|n| self.infer(n)).unwrap_or(Type::Any);
                    let right = operands.next().map(|n| self.infer(n)).unwrap_or(Type::Any);
                    (left, right)
                };
                let Some(operator) = node.tokens().next() else {
                    return Type::Any;
                };
                match Type::binary(operator.token_type, &left, &right) {
                    Some(ty) => ty,
                    None => {
                        let args = [operator.literal.clone(), left.to_string(), right.to_string()];
                        let position = Some(operator.position);
                        self.report(&BINARY_OPERAND, &args, position);
                        Type::Any
                    }
                }
            }
            Rule::UnaryExpression => {
                let operand = node
                    .nodes_mut()
                    .next()
                    .map(|n| self.infer(n))
                    .unwrap_or(Type::Any);
                let Some(operator) = node.tokens().next() else {
                    return Type::Any;
                };
                match Type::unary(operator.token_type, &operand) {
                    Some(ty) => ty,
                    None => {
                        let args = [operator.literal.clone(), operand.to_string()];
                        let position = Some(operator.position);
                        self.report(&UNARY_OPERAND, &args, position);
                        Type::Any
                    }
                }
            }
            Rule::Cast => {
                let value = node
                    .nodes_mut()
                    .next()
                    .map(|n| self.infer(n))
                    .unwrap_or(Type::Any);
                let target = self.checked_type(node.find(&Rule::Types));
                if !value.can_cast_to(&target) {
                    let args = [value.to_string(), target.to_string()];
                    self.report(&INVALID_CAST, &args, node.position());
                }
                target
            }
            Rule::ServiceCall => self.call(node),
            Rule::Mutation => self.mutation(node),
            Rule::FunctionCall => self.function_call(node),
            Rule::ExpressionStatement => match node.nodes_mut().next() {
                Some(inner) => self.infer(inner),
                None => Type::Any,
            },
            _ => Type::Any,
        }
    }

    /// `a`, then each `.field` and `[index]` in turn.
    fn path(&mut self, node: &mut Node) -> Type {
        let Some(root) = node.first_token() else {
            return Type::Any;
        };
        let (name, position) = (root.literal.clone(), root.position);
        let Some(mut ty) = self.lookup(&name).map(|symbol| symbol.ty.clone()) else {
            self.report(&UNDEFINED_VARIABLE, &[name], Some(position));
            return Type::Any;
        };

        for fragment in node.nodes_mut() {
            let next = if fragment.token(TokenType::Dot).is_some() {
                let Some(field) = fragment.token(TokenType::Name) else {
                    continue;
                };
                let (field, position) = (field.literal.clone(), field.position);
                match ty.field(&field) {
                    Some(next) => next,
                    None => {
                        self.report(&INDEX_TYPE, &[ty.to_string(), field], Some(position));
                        Type::Any
                    }
                }
            } else {
                let position = fragment.position();
                let index = match fragment.nodes_mut().next() {
                    Some(index) => self.infer(index),
                    None => Type::Any,
                };
                match ty.index(&index) {
                    Some(next) => next,
                    None => {
                        self.report(&INDEX_TYPE, &[ty.to_string(), index.to_string()], position);
                        Type::Any
                    }
                }
            };
            ty = next;
        }
        ty
    }
}

fn parameter_name(parameter: &Node) -> String {
    parameter
        .first_token()
        .map(|token| token.literal.clone())
        .unwrap_or_default()
}

/// The type a `types` node spells, or the name that isn't a type.
pub fn declared_type(types: &Node) -> Result<Type, String> {
    let Some(name) = types.first_token() else {
        return Ok(Type::Any);
    };
    let mut arguments = Vec::new();
    for argument in types.nodes() {
        arguments.push(declared_type(argument)?);
    }
    Type::from_name(&name.literal, arguments).ok_or_else(|| name.literal.clone())
}

/// `items length by:1` parsed as a service call becomes the mutation
/// `items` `length by:1`; outputs and blocks stay on the statement.
fn into_mutation(node: &mut Node) {
    let mut children = std::mem::take(&mut node.children).into_iter();
    let subject = children.next();
    let mut fragment = Vec::new();
    let mut rest = Vec::new();
    for child in children {
        let in_fragment = match &child {
            Child::Token(_) => true,
            Child::Node(inner) => inner.is(&Rule::Arguments),
        };
        if in_fragment {
            fragment.push(child);
        } else {
            rest.push(child);
        }
    }
    node.rule = Rule::Mutation;
    node.children.extend(subject);
    node.children.push(Node::new(Rule::MutationFragment, fragment).into());
    node.children.extend(rest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::Lowering;
    use crate::semantics::registry::{CommandSignature, EventSignature, Hub, ServiceSignature};
    use crate::syntax::grammar::default_grammar;
    use crate::syntax::lexer::Lexer;
    use crate::syntax::parser::Parser;

    fn tree(source: &str) -> Node {
        let grammar = default_grammar().unwrap();
        let tokens = Lexer::new(source, &grammar).tokenize().unwrap();
        let tree = Parser::new(tokens, &grammar).parse().unwrap();
        Lowering::new(&grammar).process(tree).unwrap()
    }

    fn check(source: &str) -> Analysis {
        Resolver::new(Scope::root()).resolve(&mut tree(source))
    }

    fn codes(analysis: &Analysis) -> Vec<&'static str> {
        analysis.diagnostics.iter().map(Diagnostic::code_str).collect()
    }

    fn hub() -> Hub {
        Hub::new().with_service(
            "http",
            ServiceSignature::default()
                .with_command(
                    "fetch",
                    CommandSignature::default()
                        .with_argument("url", ArgumentSignature::new("string", true))
                        .with_output("string"),
                )
                .with_command(
                    "server",
                    CommandSignature::default().with_event(
                        "listen",
                        EventSignature {
                            arguments: [("path".to_string(), ArgumentSignature::new("string", true))]
                                .into_iter()
                                .collect(),
                            output: Some("object".to_string()),
                        },
                    ),
                ),
        )
    }

    #[test]
    fn undefined_variable() {
        let analysis = check("a = b + 1\n");
        assert_eq!(codes(&analysis), vec!["E0100"]);
        assert_eq!(analysis.diagnostics[0].text(), "Unknown variable `b`");
        assert_eq!(analysis.diagnostics[0].column(), Some(5));
    }

    #[test]
    fn assignment_infers_then_checks() {
        let analysis = check("a = 1\na = 2.5\nb = \"x\"\nb = 3\n");
        assert_eq!(codes(&analysis), vec!["E0101", "E0101"]);
        assert_eq!(
            analysis.diagnostics[1].text(),
            "Can't assign `int` to a variable of type `string`"
        );
        assert_eq!(analysis.scope.resolve("a").unwrap().ty, Type::Int);
    }

    #[test]
    fn redeclaration_in_one_scope_only() {
        let source = "alpine echo as out\nalpine echo as out\nforeach [1] as out\n  x = out\n";
        let analysis = check(source);
        assert_eq!(codes(&analysis), vec!["E0042"]);
        assert_eq!(
            analysis.diagnostics[0].text(),
            "`out` has already been declared at line 1"
        );
    }

    #[test]
    fn block_scopes_end_with_the_block() {
        let analysis = check("if true\n  inner = 1\nx = inner\n");
        assert_eq!(codes(&analysis), vec!["E0100"]);
    }

    #[test]
    fn operands_must_fit() {
        let analysis = check("a = \"x\" + 1\nb = not 3\nc = 1 < \"a\"\n");
        assert_eq!(codes(&analysis), vec!["E0102", "E0103", "E0102"]);
        assert_eq!(
            analysis.diagnostics[0].text(),
            "`+` can't be applied to `string` and `int`"
        );
    }

    #[test]
    fn interpolation_is_well_typed() {
        let analysis = check("n = 1\ns = \"n is {n}\"\ns = s + \"!\"\n");
        assert!(analysis.diagnostics.is_empty());
        assert_eq!(analysis.scope.resolve("s").unwrap().ty, Type::String);
    }

    #[test]
    fn service_call_on_a_variable_is_a_mutation() {
        let mut tree = tree("items = [1, 2]\nn = items length\nitems bogus\n");
        let analysis = Resolver::new(Scope::root()).resolve(&mut tree);
        assert_eq!(codes(&analysis), vec!["E0112"]);
        assert_eq!(tree.node(1).unwrap().node(1).unwrap().rule, Rule::Mutation);
        assert_eq!(analysis.scope.resolve("n").unwrap().ty, Type::Int);
        assert!(analysis.services.is_empty());
    }

    #[test]
    fn mutation_arguments() {
        let analysis = check("s = \"a,b\"\nparts = s split by:1\nt = s split\n");
        assert_eq!(codes(&analysis), vec!["E0110", "E0109"]);
        assert_eq!(analysis.scope.resolve("t").unwrap().ty, Type::list(Type::String));
    }

    #[test]
    fn dotted_service_name() {
        let analysis = check("http.client fetch\n");
        assert_eq!(codes(&analysis), vec!["E0002"]);
    }

    #[test]
    fn services_without_a_registry_are_recorded() {
        let analysis = check("http fetch url:\"x\"\nalpine echo\n");
        assert!(analysis.diagnostics.is_empty());
        assert_eq!(analysis.services, vec!["alpine", "http"]);
    }

    #[test]
    fn services_against_the_registry() {
        let hub = hub();
        let source = "a = http fetch url:1\nb = http fetch\nhttp post\nslack send\nhttp fetch url:\"x\" extra:1\n";
        let analysis = Resolver::new(Scope::root())
            .with_registry(&hub)
            .resolve(&mut tree(source));
        assert_eq!(
            codes(&analysis),
            vec!["E0143", "E0142", "E0140", "E0139", "E0141"]
        );
        assert_eq!(
            analysis.diagnostics[3].text(),
            "Service `slack` does not exist on the hub."
        );
        assert_eq!(analysis.scope.resolve("b").unwrap().ty, Type::String);
    }

    #[test]
    fn when_blocks_listen_on_service_outputs() {
        let hub = hub();
        let source = "http server as client\n  when client listen path:\"/\" as request\n    x = request\n  when client close\n    y = 1\nn = 1\nwhen n listen\n  z = 1\n";
        let analysis = Resolver::new(Scope::root())
            .with_registry(&hub)
            .resolve(&mut tree(source));
        assert_eq!(codes(&analysis), vec!["E0144", "E0145"]);
    }

    #[test]
    fn functions() {
        let source = "x = add(a:1 b:2)\ny = add(a:\"1\" c:2)\nz = nope()\nfunction add a:int b:int returns int\n  return a + b\n";
        let analysis = check(source);
        assert_eq!(codes(&analysis), vec!["E0110", "E0108", "E0109", "E0107"]);
        assert_eq!(analysis.scope.resolve("x").unwrap().ty, Type::Int);
        assert!(analysis.functions.contains_key("add"));
    }

    #[test]
    fn return_type_and_unknown_types() {
        let analysis = check("function f returns int\n  return \"s\"\nfunction g x:number\n  y = 1\n");
        assert_eq!(codes(&analysis), vec!["E0116", "E0111"]);
    }

    #[test]
    fn functions_see_story_variables_only_with_globals() {
        let source = "total = 1\nfunction f\n  x = total\n";
        assert_eq!(codes(&check(source)), vec!["E0100"]);
        let features = Features::new().with("globals", true).unwrap();
        let analysis = Resolver::new(Scope::root())
            .with_features(features)
            .resolve(&mut tree(source));
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn seeded_names_are_visible_everywhere() {
        let mut root = Scope::root();
        root.insert(Symbol::new("app", Type::object(), None)).unwrap();
        let analysis = Resolver::new(root).resolve(&mut tree("function f\n  x = app.name\n"));
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn strict_conditions() {
        let source = "n = 1\nif n\n  x = 1\n";
        assert!(check(source).diagnostics.is_empty());
        let features = Features::new().with("strict_conditions", true).unwrap();
        let analysis = Resolver::new(Scope::root())
            .with_features(features)
            .resolve(&mut tree(source));
        assert_eq!(codes(&analysis), vec!["E0104"]);
    }

    #[test]
    fn foreach_binds_by_element_type() {
        let analysis = check("foreach [\"a\"] as i, s\n  t = s uppercase\n  u = i + 1\nforeach 3 as n\n  x = 1\n");
        assert_eq!(codes(&analysis), vec!["E0105"]);
    }

    #[test]
    fn unreachable_code_is_a_warning() {
        let analysis = check("function f\n  return 1\n  x = 2\n  y = 3\n");
        assert_eq!(codes(&analysis), vec!["E0150"]);
        assert!(!analysis.diagnostics[0].is_error());
    }

    #[test]
    fn duplicate_arguments_and_bad_casts() {
        let analysis = check("http fetch url:\"a\" url:\"b\"\nx = [1] as int\n");
        assert_eq!(codes(&analysis), vec!["E0115", "E0113"]);
    }

    #[test]
    fn indexing() {
        let analysis = check("m = {\"a\": 1}\nx = m[\"a\"] + 1\ny = m[0]\nl = [1]\nz = l[\"k\"]\n");
        assert_eq!(codes(&analysis), vec!["E0114", "E0114"]);
    }
}
