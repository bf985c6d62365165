//! Scopes, types and the semantic pass.

pub mod mutations;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod symbols;
pub mod types;

pub use registry::{
    ArgumentSignature, CapabilityRegistry, CommandSignature, EventSignature, Hub,
    ServiceSignature,
};
pub use resolver::{Analysis, Resolver};
pub use scope::{Scope, ScopeStack};
pub use symbols::{FunctionSignature, Parameter, Symbol};
pub use types::Type;
