//! Compiler front end for Storyscript stories.
//!
//! Source text goes through the offside lexer, the parser, lowering and the
//! semantic pass, and comes out as a line-addressed JSON script:
//!
//! ```no_run
//! let result = storyscript::compile("a = 1\n");
//! let story = result.check_success().unwrap();
//! println!("{}", story.to_json(true).unwrap());
//! ```

pub mod bundle;
pub mod compiler;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod lowering;
pub mod options;
pub mod semantics;
pub mod story;
pub mod syntax;
pub mod tree;

pub use bundle::{Bundle, BundleResult};
pub use compiler::CompiledStory;
pub use diagnostics::Diagnostic;
pub use error::CompileError;
pub use features::Features;
pub use options::CompileOptions;
pub use story::{CompilationContext, Story, StoryResult};

/// The built-in grammar source.
pub fn grammar() -> &'static str {
    syntax::grammar::DEFAULT_GRAMMAR
}

/// Compile one story with default options.
pub fn compile(source: &str) -> StoryResult {
    Story::from_string(source).compile(&CompileOptions::default())
}

pub fn lex(source: &str) -> Result<Vec<syntax::Token>, Diagnostic> {
    Story::from_string(source).lex(&CompileOptions::default())
}

pub fn parse(source: &str) -> Result<tree::Node, Diagnostic> {
    Story::from_string(source).parse(&CompileOptions::default(), false)
}
