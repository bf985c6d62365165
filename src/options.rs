//! Settings shared by every story of a compilation.

use std::fmt;
use std::sync::Arc;

use crate::features::Features;
use crate::semantics::{CapabilityRegistry, Scope};
use crate::syntax::{Grammar, GrammarError, default_grammar};

#[derive(Clone, Default)]
pub struct CompileOptions {
    pub features: Features,
    /// Service calls are only checked when a registry is given.
    pub registry: Option<Arc<dyn CapabilityRegistry>>,
    /// Names every story can read without declaring them.
    pub scope: Scope,
    /// Replaces the built-in grammar for keywords and operators.
    pub grammar: Option<Arc<Grammar>>,
    /// Attach the lowered tree to each compiled story.
    pub debug_tree: bool,
    pub concise: bool,
    /// One line on stderr per pipeline stage.
    pub verbose: bool,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn CapabilityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Build the grammar from an alternate source.
    pub fn with_grammar(mut self, source: &str) -> Result<Self, GrammarError> {
        self.grammar = Some(Arc::new(Grammar::from_source(source)?));
        Ok(self)
    }

    pub fn with_debug_tree(mut self, enabled: bool) -> Self {
        self.debug_tree = enabled;
        self
    }

    pub fn concise(mut self, enabled: bool) -> Self {
        self.concise = enabled;
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn grammar(&self) -> Result<Arc<Grammar>, GrammarError> {
        match &self.grammar {
            Some(grammar) => Ok(Arc::clone(grammar)),
            None => default_grammar(),
        }
    }

    pub fn registry(&self) -> Option<&dyn CapabilityRegistry> {
        self.registry.as_deref()
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("features", &self.features)
            .field("registry", &self.registry.is_some())
            .field("scope", &self.scope)
            .field("grammar", &self.grammar.is_some())
            .field("debug_tree", &self.debug_tree)
            .field("concise", &self.concise)
            .field("verbose", &self.verbose)
            .finish()
    }
}
