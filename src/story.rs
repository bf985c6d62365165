//! One story through the whole pipeline.
//!
//! Lexical and syntax faults stop the story at the stage they happen in.
//! Semantic faults are collected and the story still returns its tree. A
//! panic anywhere in the pipeline becomes the opaque internal-error
//! diagnostic, and its message is kept off stderr.

use std::cell::Cell;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Once;

use serde_json::Value;

use crate::CompileError;
use crate::compiler::{CompiledStory, Compiler};
use crate::diagnostics::error_codes::INVALID_FEATURE;
use crate::diagnostics::{DEFAULT_STORY_NAME, Diagnostic, Severity};
use crate::features::Features;
use crate::lowering::Lowering;
use crate::options::CompileOptions;
use crate::semantics::Resolver;
use crate::syntax::{Lexer, Parser, Token};
use crate::tree::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    name: String,
    source: String,
}

impl Story {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let source = match source.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => source,
        };
        Self {
            name: name.into(),
            source,
        }
    }

    /// A story without a file, named `story`.
    pub fn from_string(source: impl Into<String>) -> Self {
        Self::new(DEFAULT_STORY_NAME, source)
    }

    /// Read a story file. The story is named by its path, relative to the
    /// working directory when it lies under it.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, CompileError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|_| CompileError::Resource {
            path: path.display().to_string(),
            absolute: absolute(path).display().to_string(),
        })?;
        Ok(Self::new(story_name(path), source))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The token stream alone, without parsing.
    pub fn lex(&self, options: &CompileOptions) -> Result<Vec<Token>, Diagnostic> {
        let features = self.features(options)?;
        let grammar = options.grammar().map_err(|err| self.fail(err.into()))?;
        Lexer::new(&self.source, &grammar)
            .with_single_quotes(features.single_quotes)
            .tokenize()
            .map_err(|err| self.fail(err.into()))
    }

    /// The parse tree, optionally lowered.
    pub fn parse(&self, options: &CompileOptions, lower: bool) -> Result<Node, Diagnostic> {
        let features = self.features(options)?;
        let grammar = options.grammar().map_err(|err| self.fail(err.into()))?;
        let tokens = self.lex(options)?;
        let tree = Parser::new(tokens, &grammar)
            .parse()
            .map_err(|err| self.fail(err.into()))?;
        if !lower {
            return Ok(tree);
        }
        Lowering::new(&grammar)
            .with_single_quotes(features.single_quotes)
            .process(tree)
            .map_err(|err| self.fail(err))
    }

    pub fn compile(&self, options: &CompileOptions) -> StoryResult {
        let mut context = CompilationContext::new(&self.name, &self.source, options.verbose);
        let outcome = quietly(|| run(&mut context, options));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if err.is_internal() {
                    context.log(&err.to_string());
                }
                context.report(err.to_diagnostic());
            }
            Err(_) => {
                context.log("panicked");
                context.report(Diagnostic::internal());
            }
        }
        context.into_result()
    }

    fn features(&self, options: &CompileOptions) -> Result<Features, Diagnostic> {
        options
            .features
            .with_header(&self.source)
            .map_err(|err| self.attach(Diagnostic::new(&INVALID_FEATURE, &[err.to_string()])))
    }

    fn fail(&self, err: CompileError) -> Diagnostic {
        self.attach(err.to_diagnostic())
    }

    fn attach(&self, diagnostic: Diagnostic) -> Diagnostic {
        diagnostic.with_story(&self.name).with_source(&self.source)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn story_name(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    relative
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

fn run(context: &mut CompilationContext<'_>, options: &CompileOptions) -> Result<(), CompileError> {
    let features = match options.features.with_header(context.source) {
        Ok(features) => features,
        Err(err) => {
            context.report(Diagnostic::new(&INVALID_FEATURE, &[err.to_string()]));
            return Ok(());
        }
    };
    let grammar = options.grammar()?;

    context.log("lexing");
    let mut lexer = Lexer::new(context.source, &grammar).with_single_quotes(features.single_quotes);
    let tokens = lexer.tokenize()?;
    for warning in lexer.warnings() {
        context.report(warning.to_diagnostic());
    }

    context.log("parsing");
    let tree = Parser::new(tokens, &grammar).parse()?;

    context.log("lowering");
    let mut tree = Lowering::new(&grammar)
        .with_single_quotes(features.single_quotes)
        .process(tree)?;

    context.log("resolving");
    let mut resolver = Resolver::new(options.scope.clone()).with_features(features);
    if let Some(registry) = options.registry() {
        resolver = resolver.with_registry(registry);
    }
    let analysis = resolver.resolve(&mut tree);
    for diagnostic in analysis.diagnostics {
        context.report(diagnostic);
    }
    if context.has_errors() {
        context.tree = Some(tree);
        return Ok(());
    }

    context.log("compiling");
    let mut compiled = Compiler::new(context.source).compile(&tree, analysis.services)?;
    if options.debug_tree {
        compiled.tree = Some(tree.to_json());
    }
    context.tree = Some(tree);
    context.compiled = Some(compiled);
    Ok(())
}

/// State of one story's compilation. Dropped once its result is taken.
pub struct CompilationContext<'s> {
    story: &'s str,
    source: &'s str,
    lines: Vec<&'s str>,
    verbose: bool,
    diagnostics: Vec<Diagnostic>,
    tree: Option<Node>,
    compiled: Option<CompiledStory>,
}

impl<'s> CompilationContext<'s> {
    pub fn new(story: &'s str, source: &'s str, verbose: bool) -> Self {
        Self {
            story,
            source,
            lines: source.lines().collect(),
            verbose,
            diagnostics: Vec::new(),
            tree: None,
            compiled: None,
        }
    }

    /// 1-based source line.
    pub fn line(&self, line: usize) -> Option<&'s str> {
        line.checked_sub(1).and_then(|i| self.lines.get(i)).copied()
    }

    /// Record a diagnostic against this story.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        let mut diagnostic = diagnostic.with_story(self.story);
        if let Some(line) = diagnostic.line().and_then(|line| self.line(line)) {
            diagnostic = diagnostic.with_source_line(line);
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn log(&self, stage: &str) {
        if self.verbose {
            eprintln!("storyscript: {}: {}", self.story, stage);
        }
    }

    pub fn into_result(self) -> StoryResult {
        StoryResult {
            story: self.story.to_string(),
            diagnostics: self.diagnostics,
            tree: self.tree,
            compiled: self.compiled,
        }
    }
}

/// What compiling one story produced. Callers look at the diagnostics to
/// tell success from failure.
#[derive(Debug, Clone)]
pub struct StoryResult {
    pub story: String,
    diagnostics: Vec<Diagnostic>,
    tree: Option<Node>,
    compiled: Option<CompiledStory>,
}

impl StoryResult {
    /// A story that never reached the pipeline, e.g. an unreadable file.
    pub fn failed(story: impl Into<String>, diagnostic: Diagnostic) -> Self {
        let story = story.into();
        Self {
            diagnostics: vec![diagnostic.with_story(&story)],
            story,
            tree: None,
            compiled: None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.with_severity(Severity::Warning)
    }

    pub fn deprecations(&self) -> Vec<&Diagnostic> {
        self.with_severity(Severity::Deprecation)
    }

    fn with_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity() == severity)
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.errors().is_empty() && self.compiled.is_some()
    }

    /// The compiled story, or the first error.
    pub fn check_success(&self) -> Result<&CompiledStory, Diagnostic> {
        if let Some(error) = self.errors().first() {
            return Err((*error).clone());
        }
        self.compiled
            .as_ref()
            .ok_or_else(|| Diagnostic::internal().with_story(&self.story))
    }

    /// The lowered tree, present even when semantic checks failed.
    pub fn tree(&self) -> Option<&Node> {
        self.tree.as_ref()
    }

    pub fn compiled(&self) -> Option<&CompiledStory> {
        self.compiled.as_ref()
    }

    /// The output document, concise when `options.concise` is set.
    pub fn output(&self, options: &CompileOptions) -> Result<Option<Value>, CompileError> {
        self.compiled
            .as_ref()
            .map(|compiled| compiled.to_json(options.concise))
            .transpose()
    }
}

thread_local! {
    static QUIET: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// `catch_unwind` that keeps the panic message to itself. The hook stays
/// installed for the process but only mutes threads currently inside
/// `quietly`; everything else goes to the hook that was there before.
pub(crate) fn quietly<T>(f: impl FnOnce() -> T) -> std::thread::Result<T> {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !QUIET.with(Cell::get) {
                previous(info);
            }
        }));
    });
    let was_quiet = QUIET.with(|quiet| quiet.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    QUIET.with(|quiet| quiet.set(was_quiet));
    outcome
}
