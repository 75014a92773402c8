use rfc9535_jsonpath::Environment;
use serde_json::json;

#[test]
fn canonical_print_dotted_path() {
    let env = Environment::new();
    let q = env.compile("$.foo.bar").unwrap();
    assert_eq!(q.to_string(), "$['foo']['bar']");
}

#[test]
fn canonical_print_precedence() {
    let env = Environment::new();
    let q = env.compile("$[?@.a && @.b || @.c]").unwrap();
    assert_eq!(q.to_string(), "$[?@['a'] && @['b'] || @['c']]");
}

#[test]
fn path_round_trip_reselects_the_same_single_node() {
    let env = Environment::new();
    let doc = json!({"store": {"book": [{"title": "a"}, {"title": "b"}]}});
    let q = env.compile("$.store.book[1].title").unwrap();
    let node = q.find_one(&env, &doc).unwrap();
    let path = node.path();
    assert_eq!(path, "$['store']['book'][1]['title']");

    let recompiled = env.compile(&path).unwrap();
    let reselected = recompiled.find(&env, &doc);
    assert_eq!(reselected.len(), 1);
    assert_eq!(reselected.values()[0], node.value());
    assert_eq!(reselected.paths()[0], path);
}

#[test]
fn singular_query_predicate_implies_at_most_one_match() {
    let env = Environment::new();
    let doc = json!({"a": [1, 2, 3]});

    let singular = env.compile("$.a[0]").unwrap();
    assert!(singular.is_singular_query());
    assert!(singular.find(&env, &doc).len() <= 1);

    let non_singular = env.compile("$.a[*]").unwrap();
    assert!(!non_singular.is_singular_query());
    assert_eq!(non_singular.find(&env, &doc).len(), 3);

    let descendant = env.compile("$..a").unwrap();
    assert!(!descendant.is_singular_query());
}

#[test]
fn node_list_laws_hold() {
    let env = Environment::new();
    let doc = json!({"a": 1, "b": 2, "c": 3});
    let nodes = env.find("$.*", &doc).unwrap();

    assert_eq!(nodes.is_empty(), nodes.len() == 0);
    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(nodes.paths()[i], node.path());
        assert_eq!(nodes.values()[i], node.value());
    }

    let empty = env.find("$.nonexistent", &doc).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.len(), 0);
}
