use storyscript::lowering::Lowering;
use storyscript::syntax::grammar::default_grammar;
use storyscript::tree::{LineCoord, Node, Rule};
use storyscript::{CompileOptions, Story};

fn lower(source: &str) -> Node {
    Story::from_string(source)
        .parse(&CompileOptions::new(), true)
        .unwrap_or_else(|err| panic!("lowering failed: {}", err.short_message()))
}

fn lines(node: &Node) -> Vec<String> {
    node.nodes()
        .filter_map(Node::line)
        .map(|line| line.to_string())
        .collect()
}

fn target(assignment: &Node) -> String {
    assignment
        .node(0)
        .and_then(Node::first_token)
        .map(|token| token.literal.clone())
        .unwrap_or_default()
}

#[test]
fn hoisted_statements_precede_their_consumer_in_blocks() {
    let tree = lower("if a\n  x = (b length) + 1\n");
    let block = tree.node(0).unwrap().find(&Rule::Block).unwrap();
    assert_eq!(lines(block), vec!["1.1", "2"]);
    assert_eq!(target(block.node(0).unwrap()), "p-1.1");
}

#[test]
fn coordinates_from_one_base_increase() {
    let tree = lower("a = 1\nx = (a f) + (a g) + (a h) + (a i)\n");
    let coords: Vec<LineCoord> = tree.nodes().filter_map(Node::line).collect();
    assert_eq!(
        coords.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["1", "1.1", "1.2", "1.3", "1.4", "2"]
    );
    assert!(coords.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn names_follow_coordinates() {
    let tree = lower("x = (a f) + (a g)\n");
    let names: Vec<String> = tree.nodes().take(2).map(target).collect();
    assert_eq!(names, vec!["p-0.1", "p-0.2"]);
}

#[test]
fn return_values_are_hoisted() {
    let tree = lower("function f returns any\n  return http fetch\n");
    let body = tree.node(0).unwrap().find(&Rule::Block).unwrap();
    assert_eq!(lines(body), vec!["1.1", "2"]);
    assert_eq!(body.node(0).unwrap().node(1).unwrap().rule, Rule::ServiceCall);
    let value = body.node(1).unwrap().node(0).unwrap();
    assert_eq!(value.rule, Rule::Path);
}

#[test]
fn assignments_keep_a_direct_call() {
    let tree = lower("x = http fetch url:\"u\"\n");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node(0).unwrap().node(1).unwrap().rule, Rule::ServiceCall);
}

#[test]
fn lowering_twice_changes_nothing() {
    let grammar = default_grammar().unwrap();
    let sources = [
        "x = (a f) + 1\n",
        "y = items sort then reverse then first\n",
        "if a\n  s = \"n={n} m={1 + 2}\"\n",
        "function f returns any\n  return g(a:h(b:1))\n",
    ];
    for source in sources {
        let once = lower(source);
        let twice = Lowering::new(&grammar).process(once.clone()).unwrap();
        assert_eq!(twice, once, "second pass changed {:?}", source);
    }
}

#[test]
fn synthetic_names_cannot_be_written() {
    // `p-1.1` in source is a subtraction, never a name
    let tree = lower("x = p-1.1\n");
    let value = tree.node(0).unwrap().node(1).unwrap();
    assert_eq!(value.rule, Rule::BinaryExpression);
}

#[test]
fn loop_conditions_reject_calls() {
    let result = Story::from_string("while (http f) == 1\n  b = 2\n").compile(&CompileOptions::new());
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code_str(), "E0053");
    assert_eq!((errors[0].line(), errors[0].column()), (Some(1), Some(8)));
    assert!(result.compiled().is_none());

    let result = Story::from_string("x = http f\nwhile x == 1\n  x = http f\n")
        .compile(&CompileOptions::new());
    assert!(result.is_success());
}
