use serde_json::json;
use storyscript::tree::Node;

fn parse(source: &str) -> Node {
    storyscript::parse(source)
        .unwrap_or_else(|err| panic!("parse failed: {}", err.short_message()))
}

#[test]
fn expression_tree() {
    insta::assert_snapshot!(parse("x = 1 + 2 * 3\n").pretty(), @r"
    start
      assignment
        path	x
        =
        binary_expression
          number	1
          +
          binary_expression
            number	2
            *
            number	3
    ");
}

#[test]
fn block_tree() {
    insta::assert_snapshot!(parse("if a\n  x = 1\nelse\n  x = 2\n").pretty(), @r"
    start
      if_block
        if
        path	a
        block
          assignment
            path	x
            =
            number	1
        else_block
          else
          block
            assignment
              path	x
              =
              number	2
    ");
}

#[test]
fn json_projection() {
    assert_eq!(
        parse("a = 1\n").to_json(),
        json!({
            "rule": "start",
            "ln": "1",
            "children": [{
                "rule": "assignment",
                "ln": "1",
                "children": [{"path": ["a"]}, "=", 1]
            }]
        })
    );
}

#[test]
fn json_projection_of_leaves() {
    let tree = parse("a = [\"s\", 1.5, true, null, b.c[0]]\n");
    let list = &tree.to_json()["children"][0]["children"][2];
    assert_eq!(
        list["children"],
        json!(["[", {"string": "s"}, 1.5, true, null, {"path": ["b", "c", 0]}, "]"])
    );
}

#[test]
fn empty_story() {
    assert_eq!(parse("// foo\n").to_json(), json!({"rule": "start", "children": []}));
}
