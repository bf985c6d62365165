use storyscript::Diagnostic;

fn error(source: &str) -> Diagnostic {
    match storyscript::parse(source) {
        Ok(tree) => panic!("expected a syntax error, got:\n{}", tree.pretty()),
        Err(err) => err,
    }
}

fn code(source: &str) -> &'static str {
    error(source).code_str()
}

#[test]
fn missing_value_after_assignment() {
    let err = error("foo =");
    assert_eq!(err.short_message(), "E0007: Missing value after `=`");
    assert_eq!((err.line(), err.column()), (Some(1), Some(6)));
}

#[test]
fn invalid_character() {
    let err = error("a = $");
    assert_eq!(err.short_message(), "E0041: `$` is not allowed here");
    assert_eq!(err.column(), Some(5));
}

#[test]
fn specific_patterns_win_over_the_generic_message() {
    assert_eq!(code("a = [1, 2,]\n"), "E0014");
    assert_eq!(code("a = {\"a\": 1\n"), "E0018");
    assert_eq!(code("if a:\n  b = 1\n"), "E0045");
    assert_eq!(code("http fetch url \"x\"\n"), "E0019");
    assert_eq!(code("my-var = 1\n"), "E0006");
    assert_eq!(code("import lib as l\n"), "E0011");
    assert_eq!(code("funtion foo returns int\n"), "E0008");
    assert_eq!(code("a = 1 2\n"), "E0040");
}

#[test]
fn reserved_words() {
    assert_eq!(code("foreach = 1\n"), "E0023");
    assert_eq!(code("a = if\n"), "E0021");
    assert_eq!(code("x = mock\n"), "E0038");
}

#[test]
fn jumps_outside_their_construct() {
    assert_eq!(code("return 1\n"), "E0004");
    assert_eq!(code("break\n"), "E0044");
    assert_eq!(code("continue\n"), "E0050");
    assert_eq!(code("if a\n  break\n"), "E0044");
}

#[test]
fn generic_error_lists_what_was_allowed() {
    let err = error("foreach items\n");
    assert_eq!(
        err.short_message(),
        "E0043: `end of line` is not allowed here. Allowed: `as`"
    );
}

#[test]
fn errors_carry_the_source_line() {
    let err = error("a = 1\nb = \n");
    assert_eq!(err.line(), Some(2));
    assert!(err.message().contains("2|    b = "), "{}", err.message());
}
