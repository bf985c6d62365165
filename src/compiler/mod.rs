//! Generation of the compiled story: a `script` map from line coordinate to
//! one record per statement, plus the story's entrypoint, functions and
//! services.

pub mod objects;
mod statement;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::CompileError;
use crate::diagnostics::source_line;
use crate::ice;
use crate::tree::{LineCoord, Node, Rule, clean};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One statement of the compiled script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub method: &'static str,
    pub ln: LineCoord,
    /// Service name for `execute` and `when`.
    pub container: Option<String>,
    pub command: Option<String>,
    /// Assignment target, as path parts.
    pub name: Option<Vec<Value>>,
    pub function: Option<String>,
    pub args: Vec<Value>,
    pub output: Vec<String>,
    /// First statement of the nested block.
    pub enter: Option<LineCoord>,
    /// Where control goes when the block is skipped or done.
    pub exit: Option<LineCoord>,
    pub parent: Option<LineCoord>,
    pub next: Option<LineCoord>,
    pub src: Option<String>,
}

impl Record {
    pub fn new(method: &'static str, ln: LineCoord) -> Self {
        Self {
            method,
            ln,
            container: None,
            command: None,
            name: None,
            function: None,
            args: Vec::new(),
            output: Vec::new(),
            enter: None,
            exit: None,
            parent: None,
            next: None,
            src: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStory {
    pub script: BTreeMap<LineCoord, Record>,
    pub entrypoint: Option<LineCoord>,
    pub functions: BTreeMap<String, LineCoord>,
    pub services: Vec<String>,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<Value>,
}

impl CompiledStory {
    /// The output document. `concise` drops empty and false-like fields.
    pub fn to_json(&self, concise: bool) -> Result<Value, CompileError> {
        let value = serde_json::to_value(self).map_err(|err| ice!("{}", err))?;
        Ok(if concise { clean(value) } else { value })
    }

    pub fn record(&self, ln: &str) -> Option<&Record> {
        let ln: LineCoord = ln.parse().ok()?;
        self.script.get(&ln)
    }
}

pub struct Compiler<'s> {
    source: &'s str,
    script: BTreeMap<LineCoord, Record>,
    functions: BTreeMap<String, LineCoord>,
}

impl<'s> Compiler<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            script: BTreeMap::new(),
            functions: BTreeMap::new(),
        }
    }

    /// Compile a lowered and resolved tree.
    pub fn compile(mut self, tree: &Node, services: Vec<String>) -> Result<CompiledStory, CompileError> {
        self.block(tree, None, None)?;
        self.link();
        let entrypoint = tree
            .nodes()
            .filter(|node| !node.is(&Rule::FunctionBlock))
            .find_map(Node::line);
        Ok(CompiledStory {
            script: self.script,
            entrypoint,
            functions: self.functions,
            services,
            version: VERSION,
            tree: None,
        })
    }

    fn insert(&mut self, mut record: Record) -> Result<(), CompileError> {
        if !record.ln.is_synthetic() {
            record.src = source_line(self.source, record.ln.base()).map(|line| line.trim().to_string());
        }
        let ln = record.ln;
        if self.script.insert(ln, record).is_some() {
            return Err(ice!("two statements on line {}", ln));
        }
        Ok(())
    }

    /// Chain every record to the one after it.
    fn link(&mut self) {
        let lines: Vec<LineCoord> = self.script.keys().copied().collect();
        for pair in lines.windows(2) {
            if let Some(record) = self.script.get_mut(&pair[0]) {
                record.next = Some(pair[1]);
            }
        }
    }
}
