use std::fmt;

/// Tag of a tree node. Each variant mirrors one grammar production.
///
/// `Other` carries rules this version does not know about, so trees built
/// by newer tooling can still be walked and printed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    Start,
    Block,

    // Statements
    Assignment,
    ServiceCall,
    Mutation,
    FunctionCall,
    ExpressionStatement,
    IfBlock,
    ElifBlock,
    ElseBlock,
    ForeachBlock,
    WhileBlock,
    TryBlock,
    CatchBlock,
    FinallyBlock,
    FunctionBlock,
    WhenBlock,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    ThrowStatement,
    ImportStatement,

    // Statement parts
    Arguments,
    Argument,
    Output,
    MutationFragment,
    Parameter,
    Returns,
    Types,

    // Expressions
    BinaryExpression,
    UnaryExpression,
    Cast,
    Path,
    PathFragment,
    String,
    Number,
    Boolean,
    Null,
    List,
    Map,
    MapItem,

    Other(String),
}

const NAMED: &[(Rule, &str)] = &[
    (Rule::Start, "start"),
    (Rule::Block, "block"),
    (Rule::Assignment, "assignment"),
    (Rule::ServiceCall, "service_call"),
    (Rule::Mutation, "mutation"),
    (Rule::FunctionCall, "function_call"),
    (Rule::ExpressionStatement, "expression_statement"),
    (Rule::IfBlock, "if_block"),
    (Rule::ElifBlock, "elif_block"),
    (Rule::ElseBlock, "else_block"),
    (Rule::ForeachBlock, "foreach_block"),
    (Rule::WhileBlock, "while_block"),
    (Rule::TryBlock, "try_block"),
    (Rule::CatchBlock, "catch_block"),
    (Rule::FinallyBlock, "finally_block"),
    (Rule::FunctionBlock, "function_block"),
    (Rule::WhenBlock, "when_block"),
    (Rule::ReturnStatement, "return_statement"),
    (Rule::BreakStatement, "break_statement"),
    (Rule::ContinueStatement, "continue_statement"),
    (Rule::ThrowStatement, "throw_statement"),
    (Rule::ImportStatement, "import_statement"),
    (Rule::Arguments, "arguments"),
    (Rule::Argument, "argument"),
    (Rule::Output, "output"),
    (Rule::MutationFragment, "mutation_fragment"),
    (Rule::Parameter, "parameter"),
    (Rule::Returns, "returns"),
    (Rule::Types, "types"),
    (Rule::BinaryExpression, "binary_expression"),
    (Rule::UnaryExpression, "unary_expression"),
    (Rule::Cast, "cast"),
    (Rule::Path, "path"),
    (Rule::PathFragment, "path_fragment"),
    (Rule::String, "string"),
    (Rule::Number, "number"),
    (Rule::Boolean, "boolean"),
    (Rule::Null, "null"),
    (Rule::List, "list"),
    (Rule::Map, "map"),
    (Rule::MapItem, "map_item"),
];

impl Rule {
    pub fn name(&self) -> &str {
        if let Rule::Other(name) = self {
            return name;
        }
        NAMED
            .iter()
            .find(|(rule, _)| rule == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// Unknown names map to `Other`.
    pub fn from_name(name: &str) -> Rule {
        NAMED
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(rule, _)| rule.clone())
            .unwrap_or_else(|| Rule::Other(name.to_string()))
    }

    /// Statements that own a nested `Block`.
    pub fn has_block(&self) -> bool {
        matches!(
            self,
            Rule::ServiceCall
                | Rule::IfBlock
                | Rule::ElifBlock
                | Rule::ElseBlock
                | Rule::ForeachBlock
                | Rule::WhileBlock
                | Rule::TryBlock
                | Rule::CatchBlock
                | Rule::FinallyBlock
                | Rule::FunctionBlock
                | Rule::WhenBlock
        )
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, Rule::ForeachBlock | Rule::WhileBlock)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
