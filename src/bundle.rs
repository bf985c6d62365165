//! Batches of stories compiled together.
//!
//! Each story runs its own pipeline on the rayon pool; the only things the
//! stories share are the read-only [`CompileOptions`]. A story that fails
//! never stops the others.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::CompileError;
use crate::diagnostics::Diagnostic;
use crate::options::CompileOptions;
use crate::story::{Story, StoryResult, quietly};
use crate::syntax::Token;
use crate::tree::clean;

#[derive(Debug, Clone, Default)]
pub struct Bundle {
    stories: BTreeMap<String, Story>,
    /// Files that could not be read, reported as their own failed stories.
    unreadable: BTreeMap<String, CompileError>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bundle holding one unnamed story.
    pub fn from_string(source: impl Into<String>) -> Self {
        let mut bundle = Self::new();
        bundle.add(Story::from_string(source));
        bundle
    }

    /// Stories keyed by name.
    pub fn from_map<K, V>(sources: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut bundle = Self::new();
        for (name, source) in sources {
            bundle.add(Story::new(name, source));
        }
        bundle
    }

    pub fn read<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Self {
        let mut bundle = Self::new();
        for path in paths {
            let path = path.as_ref();
            match Story::read(path) {
                Ok(story) => bundle.add(story),
                Err(err) => {
                    bundle.unreadable.insert(path.display().to_string(), err);
                }
            }
        }
        bundle
    }

    /// Add a story, replacing any story of the same name.
    pub fn add(&mut self, story: Story) {
        self.stories.insert(story.name().to_string(), story);
    }

    pub fn len(&self) -> usize {
        self.stories.len() + self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn compile(&self, options: &CompileOptions) -> BundleResult {
        if options.verbose {
            eprintln!("storyscript: bundle: compiling {} stories", self.len());
        }
        let outcome = quietly(|| {
            self.stories
                .par_iter()
                .map(|(name, story)| (name.clone(), story.compile(options)))
                .collect::<BTreeMap<_, _>>()
        });
        let mut stories = match outcome {
            Ok(stories) => stories,
            Err(_) => {
                return BundleResult {
                    stories: BTreeMap::new(),
                    diagnostics: vec![Diagnostic::internal()],
                };
            }
        };
        for (name, err) in &self.unreadable {
            stories.insert(name.clone(), StoryResult::failed(name, err.to_diagnostic()));
        }
        BundleResult {
            stories,
            diagnostics: Vec::new(),
        }
    }

    /// Token streams per story.
    pub fn lex(&self, options: &CompileOptions) -> BTreeMap<String, Result<Vec<Token>, Diagnostic>> {
        let mut tokens: BTreeMap<_, _> = self
            .stories
            .par_iter()
            .map(|(name, story)| (name.clone(), story.lex(options)))
            .collect();
        for (name, err) in &self.unreadable {
            tokens.insert(name.clone(), Err(err.to_diagnostic().with_story(name)));
        }
        tokens
    }
}

#[derive(Debug, Clone)]
pub struct BundleResult {
    pub stories: BTreeMap<String, StoryResult>,
    /// Faults not tied to one story.
    pub diagnostics: Vec<Diagnostic>,
}

impl BundleResult {
    pub fn story(&self, name: &str) -> Option<&StoryResult> {
        self.stories.get(name)
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.is_error())
            .chain(self.stories.values().flat_map(StoryResult::errors))
            .collect()
    }

    /// The first error of the bundle, if any.
    pub fn check_success(&self) -> Result<(), Diagnostic> {
        match self.errors().first() {
            Some(error) => Err((*error).clone()),
            None => Ok(()),
        }
    }

    /// The only story of a one-story bundle.
    pub fn first(&self) -> Option<&StoryResult> {
        if self.stories.len() != 1 {
            return None;
        }
        self.stories.values().next()
    }

    /// [`BundleResult::result`], concise when `options.concise` is set.
    pub fn output(&self, options: &CompileOptions) -> Result<Value, CompileError> {
        self.result(options.concise)
    }

    /// The bundle document: `{"stories", "services", "entrypoint"}`.
    /// Stories that failed are left out.
    pub fn result(&self, concise: bool) -> Result<Value, CompileError> {
        let mut stories = Map::new();
        let mut services = BTreeSet::new();
        for (name, result) in &self.stories {
            let Some(compiled) = result.compiled() else {
                continue;
            };
            services.extend(compiled.services.iter().cloned());
            stories.insert(name.clone(), compiled.to_json(false)?);
        }
        let entrypoint: Vec<Value> = stories.keys().cloned().map(Value::String).collect();
        let mut document = Map::new();
        document.insert("stories".into(), Value::Object(stories));
        document.insert(
            "services".into(),
            Value::Array(services.into_iter().map(Value::String).collect()),
        );
        document.insert("entrypoint".into(), Value::Array(entrypoint));
        let document = Value::Object(document);
        Ok(if concise { clean(document) } else { document })
    }
}
