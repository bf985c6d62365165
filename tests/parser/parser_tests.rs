use storyscript::syntax::token_type::TokenType;
use storyscript::tree::{Node, Rule};

fn parse(source: &str) -> Node {
    storyscript::parse(source)
        .unwrap_or_else(|err| panic!("parse failed: {}", err.short_message()))
}

fn statements(source: &str) -> Vec<Rule> {
    parse(source).nodes().map(|node| node.rule.clone()).collect()
}

#[test]
fn statement_kinds() {
    let source = "a = 1\n\
                  http fetch url:\"x\" as reply\n\
                  items length\n\
                  f(a:1)\n\
                  a + 1\n\
                  import \"lib.story\" as lib\n";
    assert_eq!(
        statements(source),
        vec![
            Rule::Assignment,
            Rule::ServiceCall,
            Rule::ServiceCall,
            Rule::FunctionCall,
            Rule::ExpressionStatement,
            Rule::ImportStatement,
        ]
    );
}

#[test]
fn mutation_chains_are_mutations() {
    let tree = parse("x = \"a\" uppercase then split by:\",\"\n");
    let value = tree.node(0).unwrap().node(1).unwrap();
    assert_eq!(value.rule, Rule::Mutation);
    assert_eq!(value.find_all(&Rule::MutationFragment).count(), 2);
}

#[test]
fn precedence_follows_the_grammar() {
    let tree = parse("x = 1 + 2 * 3 ^ 2 ^ 2\n");
    let sum = tree.node(0).unwrap().node(1).unwrap();
    assert_eq!(sum.rule, Rule::BinaryExpression);
    assert!(sum.token(TokenType::Plus).is_some());

    let product = sum.node(1).unwrap();
    assert!(product.token(TokenType::Asterisk).is_some());

    // `^` groups to the right
    let power = product.node(1).unwrap();
    assert!(power.token(TokenType::Caret).is_some());
    assert_eq!(power.node(0).unwrap().rule, Rule::Number);
    assert_eq!(power.node(1).unwrap().rule, Rule::BinaryExpression);
}

#[test]
fn not_binds_looser_than_comparison() {
    let tree = parse("x = not a == b\n");
    let value = tree.node(0).unwrap().node(1).unwrap();
    assert_eq!(value.rule, Rule::UnaryExpression);
    assert_eq!(value.node(0).unwrap().rule, Rule::BinaryExpression);
}

#[test]
fn casts_and_paths() {
    let tree = parse("x = a.b[\"k\"][0] as list[int]\n");
    let cast = tree.node(0).unwrap().node(1).unwrap();
    assert_eq!(cast.rule, Rule::Cast);
    let path = cast.node(0).unwrap();
    assert_eq!(path.find_all(&Rule::PathFragment).count(), 3);
    let types = cast.find(&Rule::Types).unwrap();
    assert_eq!(types.first_token().unwrap().literal, "list");
    assert_eq!(types.nodes().count(), 1);
}

#[test]
fn control_blocks() {
    let source = "if a\n  x = 1\nelse if b\n  x = 2\nelse\n  x = 3\n\
                  foreach items as i, item\n  continue\n\
                  while go\n  break\n\
                  try\n  throw \"e\"\ncatch as err\n  x = 4\nfinally\n  x = 5\n";
    assert_eq!(
        statements(source),
        vec![Rule::IfBlock, Rule::ForeachBlock, Rule::WhileBlock, Rule::TryBlock]
    );
    let tree = parse(source);
    let foreach = tree.node(1).unwrap();
    assert_eq!(foreach.find(&Rule::Output).unwrap().tokens().count(), 3);
}

#[test]
fn functions() {
    let tree = parse("function add a:int b:int returns int\n  return a + b\n");
    let function = tree.node(0).unwrap();
    assert_eq!(function.rule, Rule::FunctionBlock);
    assert_eq!(function.find_all(&Rule::Parameter).count(), 2);
    let body = function.find(&Rule::Block).unwrap();
    assert_eq!(body.node(0).unwrap().rule, Rule::ReturnStatement);
}

#[test]
fn services_with_when_handlers() {
    let tree = parse(
        "http server as server\n  when server listen method:\"get\" as request\n    request write content:\"hi\"\n",
    );
    let call = tree.node(0).unwrap();
    assert_eq!(call.rule, Rule::ServiceCall);
    let when = call.find(&Rule::Block).unwrap().node(0).unwrap();
    assert_eq!(when.rule, Rule::WhenBlock);
    assert_eq!(when.find(&Rule::Arguments).unwrap().len(), 1);
}

#[test]
fn collections() {
    let tree = parse("m = {\"a\": [1, 2.5, true, null], \"b\": {}}\n");
    let map = tree.node(0).unwrap().node(1).unwrap();
    assert_eq!(map.rule, Rule::Map);
    assert_eq!(map.nodes().count(), 2);
    let list = map.node(0).unwrap().node(1).unwrap();
    assert_eq!(
        list.nodes().map(|n| n.rule.clone()).collect::<Vec<_>>(),
        vec![Rule::Number, Rule::Number, Rule::Boolean, Rule::Null]
    );
}

#[test]
fn parsing_is_deterministic() {
    let source = "a = http fetch url:(b + 1)\nif a\n  c = a length\n";
    assert_eq!(parse(source), parse(source));
}
