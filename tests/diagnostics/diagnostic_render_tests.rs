use std::sync::Arc;

use storyscript::diagnostics::REPORT_URL;
use storyscript::semantics::{CapabilityRegistry, ServiceSignature};
use storyscript::{CompileOptions, Diagnostic, Story};

fn first_diagnostic(story: Story, options: &CompileOptions) -> Diagnostic {
    let result = story.compile(options);
    result
        .diagnostics()
        .first()
        .cloned()
        .expect("expected a diagnostic")
}

#[test]
fn caret_points_at_the_column() {
    let err = first_diagnostic(Story::from_string("foo ="), &CompileOptions::new());
    assert_eq!(
        err.message(),
        "Error: syntax error in story at line 1, column 6\n\n\
         1|    foo =\n           ^\n\n\
         E0007: Missing value after `=`"
    );
    assert_eq!(err.short_message(), "E0007: Missing value after `=`");
}

#[test]
fn header_names_the_story_file() {
    let story = Story::new("abc.story", "a = 1\nb = c\n");
    let err = first_diagnostic(story, &CompileOptions::new());
    let message = err.message();
    assert!(
        message.starts_with("Error: semantic error in abc.story at line 2, column 5"),
        "{}",
        message
    );
    assert!(message.contains("2|    b = c\n"), "{}", message);
    assert!(message.ends_with("E0100: Unknown variable `c`"), "{}", message);
}

#[test]
fn caret_lines_up_with_the_offending_token() {
    let err = first_diagnostic(
        Story::from_string("a = 1\n\nx = 1 + $\n"),
        &CompileOptions::new(),
    );
    let message = err.message();
    let lines: Vec<&str> = message.lines().collect();
    let source = lines
        .iter()
        .position(|line| line.starts_with("3|    "))
        .expect("missing source line");
    let caret = lines[source + 1].find('^').expect("missing caret");
    assert_eq!(caret, lines[source].find('$').unwrap());
}

#[test]
fn caret_keeps_the_source_tabs() {
    let err = first_diagnostic(
        Story::from_string("if a\n\tfoo = 1 $\n"),
        &CompileOptions::new(),
    );
    assert_eq!(err.column(), Some(10));
    let message = err.message();
    let lines: Vec<&str> = message.lines().collect();
    let source = lines
        .iter()
        .position(|line| line.starts_with("2|    "))
        .expect("missing source line");
    assert_eq!(lines[source + 1], "      \t        ^");
}

#[test]
fn warnings_and_deprecations_use_their_title() {
    let result = Story::from_string("# old comment\nfunction f\n  return 1\n  x = 2\n")
        .compile(&CompileOptions::new());
    let headers: Vec<String> = result
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.message().lines().next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(headers.len(), 2);
    assert!(headers[0].starts_with("Deprecation: "), "{:?}", headers);
    assert!(headers[1].starts_with("Warning: "), "{:?}", headers);
}

#[derive(Debug)]
struct Exploding;

impl CapabilityRegistry for Exploding {
    fn lookup(&self, _service: &str) -> Option<&ServiceSignature> {
        panic!("registry offline at 10.0.0.1")
    }
}

#[test]
fn internal_errors_hide_their_detail() {
    let options = CompileOptions::new().with_registry(Arc::new(Exploding));
    let err = first_diagnostic(Story::new("a.story", "http fetch\n"), &options);
    assert_eq!(err.code_str(), "E0001");
    assert_eq!(
        err.message(),
        format!("E0001: Internal error occurred\nPlease report at {}", REPORT_URL)
    );
    assert!(!err.message().contains("10.0.0.1"));
    assert_eq!(err.story(), "a.story");
}
