use serde_json::{Value, json};
use storyscript::{CompileOptions, Story, StoryResult};

fn compile_with(source: &str, options: &CompileOptions) -> StoryResult {
    let result = Story::from_string(source).compile(options);
    assert!(
        result.is_success(),
        "{:?}",
        result.diagnostics().iter().map(|d| d.short_message()).collect::<Vec<_>>()
    );
    result
}

fn output(source: &str) -> Value {
    compile_with(source, &CompileOptions::new())
        .compiled()
        .unwrap()
        .to_json(false)
        .unwrap()
}

#[test]
fn comment_only_story() {
    let result = compile_with("// only a comment\n", &CompileOptions::new());
    assert!(result.diagnostics().is_empty());
    let value = result.compiled().unwrap().to_json(false).unwrap();
    assert_eq!(value["script"], json!({}));
    assert_eq!(value["entrypoint"], Value::Null);
    assert_eq!(value["services"], json!([]));
    assert!(value.get("tree").is_none());
}

#[test]
fn records_chain_in_line_order() {
    let value = output("a = 1\nb = 2\nc = 3\n");
    let script = &value["script"];
    assert_eq!(script["1"]["next"], "2");
    assert_eq!(script["2"]["next"], "3");
    assert_eq!(script["3"]["next"], Value::Null);
    assert_eq!(value["entrypoint"], "1");
}

#[test]
fn blocks_enter_and_exit() {
    let value = output("foreach [1] as i\n  x = i\ny = 2\n");
    let script = &value["script"];
    assert_eq!(script["1"]["method"], "for");
    assert_eq!(script["1"]["enter"], "2");
    assert_eq!(script["1"]["exit"], "3");
    assert_eq!(script["1"]["output"], json!(["i"]));
    assert_eq!(script["2"]["parent"], "1");
    assert_eq!(script["2"]["next"], "3");
    assert_eq!(script["3"]["parent"], Value::Null);
}

#[test]
fn service_records() {
    let value = output("http fetch url:\"u\"\n");
    let record = &value["script"]["1"];
    assert_eq!(record["method"], "execute");
    assert_eq!(record["container"], "http");
    assert_eq!(record["command"], "fetch");
    assert_eq!(
        record["args"],
        json!([{"$OBJECT": "arg", "name": "url", "arg": {"$OBJECT": "string", "string": "u"}}])
    );
    assert_eq!(record["src"], "http fetch url:\"u\"");
    assert_eq!(value["services"], json!(["http"]));
}

#[test]
fn hoisted_records_have_no_source() {
    let value = output("x = (http fetch) + 1\n");
    let script = value["script"].as_object().unwrap();
    assert_eq!(script.keys().collect::<Vec<_>>(), vec!["0.1", "1"]);
    assert_eq!(script["0.1"]["src"], Value::Null);
    assert_eq!(script["0.1"]["name"], json!(["p-0.1"]));
    assert_eq!(value["entrypoint"], "0.1");
}

#[test]
fn concise_output_keeps_zero() {
    let result = compile_with("a = 0\n", &CompileOptions::new());
    let value = result.compiled().unwrap().to_json(true).unwrap();
    let record = value["script"]["1"].as_object().unwrap();
    assert_eq!(
        record.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["method", "ln", "name", "args", "src"]
    );
    assert_eq!(record["args"], json!([{"$OBJECT": "int", "int": 0}]));
    assert!(value.get("functions").is_none());
    assert!(value.get("services").is_none());
}

#[test]
fn debug_tree_is_opt_in() {
    let source = "a = 1\n";
    let plain = compile_with(source, &CompileOptions::new());
    assert!(plain.compiled().unwrap().tree.is_none());

    let debug = compile_with(source, &CompileOptions::new().with_debug_tree(true));
    let value = debug.compiled().unwrap().to_json(false).unwrap();
    assert_eq!(value["tree"], debug.tree().unwrap().to_json());
    assert_eq!(value["tree"]["rule"], "start");
}

#[test]
fn functions_are_listed_by_line() {
    let value = output("function f a:int returns int\n  return a\nx = f(a:1)\n");
    assert_eq!(value["functions"], json!({"f": "1"}));
    assert_eq!(value["entrypoint"], "3");
    let function = &value["script"]["1"];
    assert_eq!(function["method"], "function");
    assert_eq!(function["output"], json!(["int"]));
    assert_eq!(
        function["args"],
        json!([{"$OBJECT": "arg", "name": "a", "arg": {"$OBJECT": "type", "type": "int"}}])
    );
}

#[test]
fn parenthesised_statements_compile_as_calls() {
    let value = output("(http fetch)\n");
    let record = &value["script"]["1"];
    assert_eq!(record["method"], "execute");
    assert_eq!(record["container"], "http");
    assert_eq!(record["command"], "fetch");

    let value = output("s = \"a\"\n(s length)\n");
    let record = &value["script"]["2"];
    assert_eq!(record["method"], "mutation");
    assert_eq!(
        record["args"][1],
        json!({"$OBJECT": "mutation", "mutation": "length", "args": []})
    );
}
