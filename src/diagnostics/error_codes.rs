//! Registry of every diagnostic the compiler can produce.
//!
//! Codes are stable: tooling matches on them, so a code is never reused for
//! a different fault once released.

/// Which pipeline stage a code belongs to; picks the rendered header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Syntax,
    Semantic,
    Resource,
    Internal,
}

impl ErrorCategory {
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Syntax => "syntax error",
            ErrorCategory::Semantic => "semantic error",
            ErrorCategory::Resource => "resource error",
            ErrorCategory::Internal => "internal error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Deprecation,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Deprecation => "Deprecation",
        }
    }
}

/// A code with its message template. `{}` placeholders are filled positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
    pub severity: Severity,
    pub message: &'static str,
}

const fn syntax(code: &'static str, title: &'static str, message: &'static str) -> ErrorCode {
    ErrorCode {
        code,
        title,
        category: ErrorCategory::Syntax,
        severity: Severity::Error,
        message,
    }
}

const fn semantic(code: &'static str, title: &'static str, message: &'static str) -> ErrorCode {
    ErrorCode {
        code,
        title,
        category: ErrorCategory::Semantic,
        severity: Severity::Error,
        message,
    }
}

pub const INTERNAL_ERROR: ErrorCode = ErrorCode {
    code: "E0001",
    title: "internal error",
    category: ErrorCategory::Internal,
    severity: Severity::Error,
    message: "Internal error occurred",
};

pub const SERVICE_NAME: ErrorCode =
    syntax("E0002", "service name", "A service name can't contain `.`");
pub const ARGUMENTS_NO_SERVICE: ErrorCode = syntax(
    "E0003",
    "arguments without service",
    "You have defined an argument, but not a service",
);
pub const RETURN_OUTSIDE: ErrorCode = syntax(
    "E0004",
    "return outside function",
    "`return` is allowed only inside functions",
);
pub const VARIABLES_BACKSLASH: ErrorCode =
    syntax("E0005", "variable slash", "A variable name can't contain `/`");
pub const VARIABLES_DASH: ErrorCode =
    syntax("E0006", "variable dash", "A variable name can't contain `-`");
pub const ASSIGNMENT_INCOMPLETE: ErrorCode =
    syntax("E0007", "incomplete assignment", "Missing value after `=`");
pub const FUNCTION_MISSPELL: ErrorCode =
    syntax("E0008", "misspelt function", "You have misspelt `function`");
pub const IMPORT_MISSPELL: ErrorCode =
    syntax("E0009", "misspelt import", "You have misspelt `import`");
pub const IMPORT_MISSPELL_AS: ErrorCode = syntax(
    "E0010",
    "misspelt import alias",
    "You have misspelt `as` in an import statement",
);
pub const IMPORT_UNQUOTED_FILE: ErrorCode = syntax(
    "E0011",
    "unquoted import",
    "The imported filename must be in quotes",
);
pub const STRING_OPENING_QUOTE: ErrorCode =
    syntax("E0012", "opening quote", "Missing opening quote for string");
pub const STRING_CLOSING_QUOTE: ErrorCode =
    syntax("E0013", "closing quote", "Missing closing quote for string");
pub const LIST_TRAILING_COMMA: ErrorCode =
    syntax("E0014", "list trailing comma", "Trailing comma in list");
pub const LIST_OPENING_BRACKET: ErrorCode =
    syntax("E0015", "list opening bracket", "Missing opening bracket for list");
pub const LIST_CLOSING_BRACKET: ErrorCode =
    syntax("E0016", "list closing bracket", "Missing closing bracket for list");
pub const OBJECT_OPENING_BRACKET: ErrorCode = syntax(
    "E0017",
    "object opening bracket",
    "Missing opening bracket for object",
);
pub const OBJECT_CLOSING_BRACKET: ErrorCode = syntax(
    "E0018",
    "object closing bracket",
    "Missing closing bracket for object",
);
pub const SERVICE_ARGUMENT_COLON: ErrorCode = syntax(
    "E0019",
    "service argument colon",
    "Missing colon in service argument",
);
pub const RESERVED_KEYWORD_FUNCTION: ErrorCode =
    syntax("E0020", "reserved keyword", "`function` is a reserved keyword");
pub const RESERVED_KEYWORD_IF: ErrorCode =
    syntax("E0021", "reserved keyword", "`if` is a reserved keyword");
pub const RESERVED_KEYWORD_ELSE: ErrorCode =
    syntax("E0022", "reserved keyword", "`else` is a reserved keyword");
pub const RESERVED_KEYWORD_FOREACH: ErrorCode =
    syntax("E0023", "reserved keyword", "`foreach` is a reserved keyword");
pub const RESERVED_KEYWORD_RETURN: ErrorCode =
    syntax("E0024", "reserved keyword", "`return` is a reserved keyword");
pub const RESERVED_KEYWORD_RETURNS: ErrorCode =
    syntax("E0025", "reserved keyword", "`returns` is a reserved keyword");
pub const RESERVED_KEYWORD_TRY: ErrorCode =
    syntax("E0026", "reserved keyword", "`try` is a reserved keyword");
pub const RESERVED_KEYWORD_CATCH: ErrorCode =
    syntax("E0027", "reserved keyword", "`catch` is a reserved keyword");
pub const RESERVED_KEYWORD_FINALLY: ErrorCode =
    syntax("E0028", "reserved keyword", "`finally` is a reserved keyword");
pub const RESERVED_KEYWORD_WHEN: ErrorCode =
    syntax("E0029", "reserved keyword", "`when` is a reserved keyword");
pub const RESERVED_KEYWORD_AS: ErrorCode =
    syntax("E0030", "reserved keyword", "`as` is a reserved keyword");
pub const RESERVED_KEYWORD_IMPORT: ErrorCode =
    syntax("E0031", "reserved keyword", "`import` is a reserved keyword");
pub const RESERVED_KEYWORD_WHILE: ErrorCode =
    syntax("E0032", "reserved keyword", "`while` is a reserved keyword");
pub const RESERVED_KEYWORD_THROW: ErrorCode =
    syntax("E0033", "reserved keyword", "`throw` is a reserved keyword");
pub const FUTURE_RESERVED_ASYNC: ErrorCode =
    syntax("E0034", "future keyword", "`async` is reserved for future use");
pub const FUTURE_RESERVED_STORY: ErrorCode =
    syntax("E0035", "future keyword", "`story` is reserved for future use");
pub const FUTURE_RESERVED_ASSERT: ErrorCode =
    syntax("E0036", "future keyword", "`assert` is reserved for future use");
pub const FUTURE_RESERVED_CALLED: ErrorCode =
    syntax("E0037", "future keyword", "`called` is reserved for future use");
pub const FUTURE_RESERVED_MOCK: ErrorCode =
    syntax("E0038", "future keyword", "`mock` is reserved for future use");
pub const ARGUMENTS_NO_MUTATION: ErrorCode = syntax(
    "E0039",
    "chained mutation",
    "You have defined a chained mutation, but not a mutation",
);
pub const NO_OPERATOR: ErrorCode = syntax("E0040", "no operator", "No operator provided");
pub const INVALID_CHARACTER: ErrorCode =
    syntax("E0041", "invalid character", "`{}` is not allowed here");
pub const ALREADY_DECLARED: ErrorCode = semantic(
    "E0042",
    "already declared",
    "`{}` has already been declared at line {}",
);
pub const UNEXPECTED_TOKEN: ErrorCode = syntax(
    "E0043",
    "unexpected token",
    "`{}` is not allowed here. Allowed: {}",
);
pub const BREAK_OUTSIDE: ErrorCode = syntax(
    "E0044",
    "break outside loop",
    "`break` is allowed only inside loops",
);
pub const UNNECESSARY_COLON: ErrorCode = syntax(
    "E0045",
    "unnecessary colon",
    "There is an unnecessary colon at the end of the line",
);
pub const FILE_NOT_FOUND: ErrorCode = ErrorCode {
    code: "E0046",
    title: "file not found",
    category: ErrorCategory::Resource,
    severity: Severity::Error,
    message: "File `{}` not found at `{}`",
};
pub const INDENTATION_MISMATCH: ErrorCode = syntax(
    "E0047",
    "indentation",
    "Unindent does not match any outer indentation level",
);
pub const UNTERMINATED_INTERPOLATION: ErrorCode = syntax(
    "E0048",
    "interpolation",
    "Missing closing `}` in string interpolation",
);
pub const UNTERMINATED_COMMENT: ErrorCode =
    syntax("E0049", "comment", "Missing closing `*/` for comment");
pub const CONTINUE_OUTSIDE: ErrorCode = syntax(
    "E0050",
    "continue outside loop",
    "`continue` is allowed only inside loops",
);
pub const INVALID_FEATURE: ErrorCode = syntax("E0051", "feature", "Invalid feature setting: {}");
pub const INTEGER_TOO_LARGE: ErrorCode = syntax("E0052", "number", "Integer `{}` is too large");
pub const CALL_IN_CONDITION: ErrorCode = syntax(
    "E0053",
    "call in condition",
    "Calls are not allowed in a `{}` condition. Assign the result to a variable first",
);

pub const UNDEFINED_VARIABLE: ErrorCode =
    semantic("E0100", "undefined variable", "Unknown variable `{}`");
pub const ASSIGNMENT_TYPE: ErrorCode = semantic(
    "E0101",
    "assignment type",
    "Can't assign `{}` to a variable of type `{}`",
);
pub const BINARY_OPERAND: ErrorCode = semantic(
    "E0102",
    "binary operand",
    "`{}` can't be applied to `{}` and `{}`",
);
pub const UNARY_OPERAND: ErrorCode =
    semantic("E0103", "unary operand", "`{}` can't be applied to `{}`");
pub const CONDITION_TYPE: ErrorCode = semantic(
    "E0104",
    "condition type",
    "A condition must be `boolean`, found `{}`",
);
pub const NOT_ITERABLE: ErrorCode = semantic("E0105", "not iterable", "`{}` can't be iterated");
pub const FOREACH_NAMES: ErrorCode = semantic(
    "E0106",
    "foreach names",
    "Iterating over `{}` gives at most {} names",
);
pub const UNKNOWN_FUNCTION: ErrorCode =
    semantic("E0107", "unknown function", "Function `{}` does not exist");
pub const FUNCTION_ARGUMENT_UNKNOWN: ErrorCode = semantic(
    "E0108",
    "function argument",
    "Function `{}` has no argument `{}`",
);
pub const FUNCTION_ARGUMENT_MISSING: ErrorCode = semantic(
    "E0109",
    "function argument",
    "Function `{}` requires argument `{}`",
);
pub const ARGUMENT_TYPE: ErrorCode = semantic(
    "E0110",
    "argument type",
    "Argument `{}` must be `{}`, found `{}`",
);
pub const RETURN_TYPE: ErrorCode = semantic(
    "E0111",
    "return type",
    "Function `{}` returns `{}`, found `{}`",
);
pub const UNKNOWN_MUTATION: ErrorCode =
    semantic("E0112", "unknown mutation", "`{}` has no mutation `{}`");
pub const INVALID_CAST: ErrorCode =
    semantic("E0113", "invalid cast", "`{}` can't be converted to `{}`");
pub const INDEX_TYPE: ErrorCode =
    semantic("E0114", "index type", "`{}` can't be indexed with `{}`");
pub const DUPLICATE_ARGUMENT: ErrorCode = semantic(
    "E0115",
    "duplicate argument",
    "Argument `{}` is given more than once",
);
pub const UNKNOWN_TYPE: ErrorCode = semantic("E0116", "unknown type", "Unknown type `{}`");

pub const SERVICE_NOT_FOUND: ErrorCode = semantic(
    "E0139",
    "service not found",
    "Service `{}` does not exist on the hub.",
);
pub const SERVICE_COMMAND_NOT_FOUND: ErrorCode = semantic(
    "E0140",
    "service command",
    "Service `{}` has no command `{}`.",
);
pub const SERVICE_ARGUMENT_UNKNOWN: ErrorCode = semantic(
    "E0141",
    "service argument",
    "`{} {}` has no argument `{}`.",
);
pub const SERVICE_ARGUMENT_MISSING: ErrorCode = semantic(
    "E0142",
    "service argument",
    "`{} {}` requires argument `{}`.",
);
pub const SERVICE_ARGUMENT_TYPE: ErrorCode = semantic(
    "E0143",
    "service argument type",
    "Argument `{}` of `{} {}` must be `{}`, found `{}`.",
);
pub const SERVICE_EVENT_NOT_FOUND: ErrorCode = semantic(
    "E0144",
    "service event",
    "`{} {}` has no event `{}`.",
);
pub const SERVICE_OUTPUT_REQUIRED: ErrorCode = semantic(
    "E0145",
    "service output",
    "`when` needs a service output, but `{}` is not one.",
);

pub const UNREACHABLE_CODE: ErrorCode = ErrorCode {
    code: "E0150",
    title: "unreachable code",
    category: ErrorCategory::Semantic,
    severity: Severity::Warning,
    message: "Code after `{}` is never run",
};
pub const HASH_COMMENT: ErrorCode = ErrorCode {
    code: "E0151",
    title: "hash comment",
    category: ErrorCategory::Syntax,
    severity: Severity::Deprecation,
    message: "`#` comments are deprecated, use `//` instead",
};

/// Central registry of all error codes.
pub const ERROR_CODES: &[ErrorCode] = &[
    INTERNAL_ERROR,
    SERVICE_NAME,
    ARGUMENTS_NO_SERVICE,
    RETURN_OUTSIDE,
    VARIABLES_BACKSLASH,
    VARIABLES_DASH,
    ASSIGNMENT_INCOMPLETE,
    FUNCTION_MISSPELL,
    IMPORT_MISSPELL,
    IMPORT_MISSPELL_AS,
    IMPORT_UNQUOTED_FILE,
    STRING_OPENING_QUOTE,
    STRING_CLOSING_QUOTE,
    LIST_TRAILING_COMMA,
    LIST_OPENING_BRACKET,
    LIST_CLOSING_BRACKET,
    OBJECT_OPENING_BRACKET,
    OBJECT_CLOSING_BRACKET,
    SERVICE_ARGUMENT_COLON,
    RESERVED_KEYWORD_FUNCTION,
    RESERVED_KEYWORD_IF,
    RESERVED_KEYWORD_ELSE,
    RESERVED_KEYWORD_FOREACH,
    RESERVED_KEYWORD_RETURN,
    RESERVED_KEYWORD_RETURNS,
    RESERVED_KEYWORD_TRY,
    RESERVED_KEYWORD_CATCH,
    RESERVED_KEYWORD_FINALLY,
    RESERVED_KEYWORD_WHEN,
    RESERVED_KEYWORD_AS,
    RESERVED_KEYWORD_IMPORT,
    RESERVED_KEYWORD_WHILE,
    RESERVED_KEYWORD_THROW,
    FUTURE_RESERVED_ASYNC,
    FUTURE_RESERVED_STORY,
    FUTURE_RESERVED_ASSERT,
    FUTURE_RESERVED_CALLED,
    FUTURE_RESERVED_MOCK,
    ARGUMENTS_NO_MUTATION,
    NO_OPERATOR,
    INVALID_CHARACTER,
    ALREADY_DECLARED,
    UNEXPECTED_TOKEN,
    BREAK_OUTSIDE,
    UNNECESSARY_COLON,
    FILE_NOT_FOUND,
    INDENTATION_MISMATCH,
    UNTERMINATED_INTERPOLATION,
    UNTERMINATED_COMMENT,
    CONTINUE_OUTSIDE,
    INVALID_FEATURE,
    INTEGER_TOO_LARGE,
    CALL_IN_CONDITION,
    UNDEFINED_VARIABLE,
    ASSIGNMENT_TYPE,
    BINARY_OPERAND,
    UNARY_OPERAND,
    CONDITION_TYPE,
    NOT_ITERABLE,
    FOREACH_NAMES,
    UNKNOWN_FUNCTION,
    FUNCTION_ARGUMENT_UNKNOWN,
    FUNCTION_ARGUMENT_MISSING,
    ARGUMENT_TYPE,
    RETURN_TYPE,
    UNKNOWN_MUTATION,
    INVALID_CAST,
    INDEX_TYPE,
    DUPLICATE_ARGUMENT,
    UNKNOWN_TYPE,
    SERVICE_NOT_FOUND,
    SERVICE_COMMAND_NOT_FOUND,
    SERVICE_ARGUMENT_UNKNOWN,
    SERVICE_ARGUMENT_MISSING,
    SERVICE_ARGUMENT_TYPE,
    SERVICE_EVENT_NOT_FOUND,
    SERVICE_OUTPUT_REQUIRED,
    UNREACHABLE_CODE,
    HASH_COMMENT,
];

pub fn lookup_error_code(code: &str) -> Option<&'static ErrorCode> {
    ERROR_CODES.iter().find(|item| item.code == code)
}

/// The code used when a reserved word appears where a name is expected.
pub fn reserved_keyword(word: &str) -> Option<&'static ErrorCode> {
    let code = match word {
        "function" => &RESERVED_KEYWORD_FUNCTION,
        "if" => &RESERVED_KEYWORD_IF,
        "else" => &RESERVED_KEYWORD_ELSE,
        "foreach" => &RESERVED_KEYWORD_FOREACH,
        "return" => &RESERVED_KEYWORD_RETURN,
        "returns" => &RESERVED_KEYWORD_RETURNS,
        "try" => &RESERVED_KEYWORD_TRY,
        "catch" => &RESERVED_KEYWORD_CATCH,
        "finally" => &RESERVED_KEYWORD_FINALLY,
        "when" => &RESERVED_KEYWORD_WHEN,
        "as" => &RESERVED_KEYWORD_AS,
        "import" => &RESERVED_KEYWORD_IMPORT,
        "while" => &RESERVED_KEYWORD_WHILE,
        "throw" => &RESERVED_KEYWORD_THROW,
        _ => return None,
    };
    Some(code)
}

pub fn future_reserved_keyword(word: &str) -> Option<&'static ErrorCode> {
    let code = match word {
        "async" => &FUTURE_RESERVED_ASYNC,
        "story" => &FUTURE_RESERVED_STORY,
        "assert" => &FUTURE_RESERVED_ASSERT,
        "called" => &FUTURE_RESERVED_CALLED,
        "mock" => &FUTURE_RESERVED_MOCK,
        _ => return None,
    };
    Some(code)
}
