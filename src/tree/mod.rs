//! Uniform syntax tree shared by the parser, lowering, the semantic pass and
//! the compiler.

pub mod json;
pub mod line;
pub mod node;
pub mod pretty;
pub mod rule;

pub use json::clean;
pub use line::LineCoord;
pub use node::{Child, Node};
pub use rule::Rule;
