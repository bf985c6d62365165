use std::sync::Arc;

use storyscript::semantics::{CommandSignature, Hub, Scope, ServiceSignature, Symbol, Type};
use storyscript::{CompileOptions, Diagnostic, Features, Story, StoryResult};

fn compile_with(source: &str, options: &CompileOptions) -> StoryResult {
    Story::from_string(source).compile(options)
}

fn compile(source: &str) -> StoryResult {
    compile_with(source, &CompileOptions::new())
}

fn codes(result: &StoryResult) -> Vec<&'static str> {
    result.diagnostics().iter().map(Diagnostic::code_str).collect()
}

#[test]
fn unknown_variables() {
    let result = compile("a = b\n");
    assert_eq!(codes(&result), vec!["E0100"]);
    assert_eq!(result.errors()[0].short_message(), "E0100: Unknown variable `b`");
    assert_eq!(result.errors()[0].line(), Some(1));
    assert!(result.compiled().is_none());
}

#[test]
fn independent_errors_accumulate() {
    let result = compile("a = b\nc = d\ne = 1\nf = g\n");
    assert_eq!(codes(&result), vec!["E0100", "E0100", "E0100"]);
    let lines: Vec<_> = result.errors().iter().map(|err| err.line()).collect();
    assert_eq!(lines, vec![Some(1), Some(2), Some(4)]);
}

#[test]
fn redeclaration_cites_the_first_line() {
    let result = compile("alpine echo as out\nalpine echo as out\n");
    assert_eq!(codes(&result), vec!["E0042"]);
    let err = result.errors()[0];
    assert_eq!(err.text(), "`out` has already been declared at line 1");
    assert_eq!(err.line(), Some(2));
}

#[test]
fn child_scopes_may_shadow() {
    let result = compile("alpine echo as out\nforeach [1] as out\n  x = out\n");
    assert!(result.is_success(), "{:?}", codes(&result));
}

#[test]
fn block_variables_stay_in_their_block() {
    let result = compile("foreach [1] as item\n  x = item\ny = item\n");
    assert_eq!(codes(&result), vec!["E0100"]);
    assert_eq!(result.errors()[0].line(), Some(3));
}

#[test]
fn type_mismatches() {
    let result = compile("a = 1\na = \"s\"\nb = \"x\" + 1\n");
    assert_eq!(codes(&result), vec!["E0101", "E0102"]);
}

#[test]
fn seeded_scope_is_visible() {
    assert_eq!(codes(&compile("foo = a\n")), vec!["E0100"]);

    let mut scope = Scope::root();
    scope.insert(Symbol::new("a", Type::Int, None)).unwrap();
    let options = CompileOptions::new().with_scope(scope);
    let result = compile_with("foo = a + 1\n", &options);
    assert!(result.is_success(), "{:?}", codes(&result));
}

#[test]
fn services_are_checked_against_the_registry() {
    let options = CompileOptions::new().with_registry(Arc::new(Hub::new()));
    let result = compile_with("http server\n", &options);
    assert_eq!(
        result.errors()[0].short_message(),
        "E0139: Service `http` does not exist on the hub."
    );

    let hub = Hub::new().with_service(
        "http",
        ServiceSignature::default()
            .with_command("server", CommandSignature::default().with_output("object")),
    );
    let options = CompileOptions::new().with_registry(Arc::new(hub));
    let result = compile_with("s = http server\n", &options);
    assert!(result.is_success(), "{:?}", codes(&result));
}

#[test]
fn services_are_free_without_a_registry() {
    let result = compile("a = http fetch\nb = slack send text:a\n");
    assert!(result.is_success());
    assert_eq!(
        result.compiled().unwrap().services,
        vec!["http".to_string(), "slack".to_string()]
    );
}

#[test]
fn globals_open_story_variables_to_functions() {
    let source = "total = 1\nfunction f\n  x = total\n";
    assert_eq!(codes(&compile(source)), vec!["E0100"]);

    let features = Features::new().with("globals", true).unwrap();
    let result = compile_with(source, &CompileOptions::new().with_features(features));
    assert!(result.is_success());
}

#[test]
fn unreachable_code_warns_only() {
    let result = compile("function f\n  return 1\n  x = 2\n");
    assert_eq!(codes(&result), vec!["E0150"]);
    assert!(result.errors().is_empty());
    assert_eq!(result.warnings().len(), 1);
    assert!(result.compiled().is_some());
}

#[test]
fn binary_operands_are_inferred_before_the_operator_is_checked() {
    let result = compile("a = 1\nb = \"x\" + (a * 2)\n");
    assert_eq!(codes(&result), vec!["E0102"]);
    let err = result.errors()[0];
    assert_eq!(err.text(), "`+` can't be applied to `string` and `int`");
    assert_eq!((err.line(), err.column()), (Some(2), Some(9)));
}
