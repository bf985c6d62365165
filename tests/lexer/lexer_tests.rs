use storyscript::syntax::token_type::TokenType;
use storyscript::{CompileOptions, Features, Story};

fn kinds(source: &str) -> Vec<TokenType> {
    storyscript::lex(source)
        .unwrap_or_else(|err| panic!("lexing failed: {}", err.short_message()))
        .iter()
        .map(|token| token.token_type)
        .collect()
}

fn count(source: &str, kind: TokenType) -> usize {
    kinds(source).into_iter().filter(|k| *k == kind).count()
}

#[test]
fn operators_and_delimiters() {
    use TokenType::*;
    assert_eq!(
        kinds("x = (a + b) * c[0] ^ 2 % d.e"),
        vec![
            Name, Assign, LParen, Name, Plus, Name, RParen, Asterisk, Name, LBracket, Int,
            RBracket, Caret, Int, Percent, Name, Dot, Name, Newline, Eof
        ]
    );
    assert_eq!(
        kinds("x = a <= b != c >= d == e < f > g"),
        vec![
            Name, Assign, Name, Lte, Name, NotEq, Name, Gte, Name, Eq, Name, Lt, Name, Gt, Name,
            Newline, Eof
        ]
    );
}

#[test]
fn service_call_tokens() {
    use TokenType::*;
    assert_eq!(
        kinds("http fetch url:\"x\" as reply"),
        vec![Name, Name, Name, Colon, String, As, Name, Newline, Eof]
    );
}

#[test]
fn positions_are_one_based() {
    let tokens = storyscript::lex("a = 1\nbb = 22\n").unwrap();
    let value = tokens
        .iter()
        .find(|token| token.literal == "22")
        .expect("second value");
    assert_eq!((value.line(), value.column()), (2, 6));
}

#[test]
fn indentation_balances_for_well_formed_sources() {
    let sources = [
        "if a\n    x = 1\n",
        "if a\n    if b\n        if c\n            x = 1\ny = 2\n",
        "function f\n    foreach xs as x\n        while x\n            break\n    return 1\n",
        "try\n  x = 1\ncatch as e\n  y = 2\nfinally\n  z = 3",
        "server = http server\n    when server listen as req\n        req write",
    ];
    for source in sources {
        assert_eq!(
            count(source, TokenType::Indent),
            count(source, TokenType::Dedent),
            "unbalanced blocks in {:?}",
            source
        );
    }
}

#[test]
fn comment_lines_are_invisible() {
    assert_eq!(kinds("// foo\n"), vec![TokenType::Eof]);
    assert_eq!(
        kinds("a = 1\n    // indented comment\nb = 2\n"),
        kinds("a = 1\nb = 2\n")
    );
}

#[test]
fn single_quotes_follow_the_feature() {
    let story = Story::from_string("a = 'x'\n");
    assert!(story.lex(&CompileOptions::new()).is_err());

    let features = Features::new().with("single_quotes", true).unwrap();
    let tokens = story
        .lex(&CompileOptions::new().with_features(features))
        .unwrap();
    assert_eq!(tokens[2].literal, "x");

    let story = Story::from_string("// FEAT: single_quotes=on\na = 'x'\n");
    assert!(story.lex(&CompileOptions::new()).is_ok());
}

#[test]
fn alternate_grammar_renames_keywords() {
    let source = storyscript::grammar().replace("keyword foreach foreach", "keyword foreach each");
    let options = CompileOptions::new().with_grammar(&source).unwrap();
    let tokens = Story::from_string("each items as item\n")
        .lex(&options)
        .unwrap();
    assert_eq!(tokens[0].token_type, TokenType::Foreach);

    let tokens = Story::from_string("foreach = 1\n").lex(&options).unwrap();
    assert_eq!(tokens[0].token_type, TokenType::Name);
}

#[test]
fn lexing_errors_are_diagnostics() {
    let err = storyscript::lex("a = $").unwrap_err();
    assert_eq!(err.short_message(), "E0041: `$` is not allowed here");
    assert_eq!(err.column(), Some(5));

    let err = storyscript::lex("if a\n    x = 1\n  y = 2\n").unwrap_err();
    assert_eq!(err.code_str(), "E0047");
    assert_eq!(err.line(), Some(3));
}

#[test]
fn oversized_integers_are_reported() {
    let result = Story::from_string("a = 99999999999999999999\n").compile(&CompileOptions::new());
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].short_message(),
        "E0052: Integer `99999999999999999999` is too large"
    );
    assert_eq!((errors[0].line(), errors[0].column()), (Some(1), Some(5)));
    assert!(result.compiled().is_none());
}
