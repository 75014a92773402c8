use rfc9535_jsonpath::Environment;
use serde_json::json;

#[test]
fn write_through_nested_object_path() {
    let env = Environment::new();
    let mut doc = json!({"a": {"b": {"c": 1}}});
    let snapshot = doc.clone();
    let query = env.compile("$.a.b.c").unwrap();

    let nodes = query.find(&env, &snapshot);
    assert_eq!(nodes.values(), vec![&json!(1)]);
    assert_eq!(nodes.paths(), vec!["$['a']['b']['c']".to_string()]);

    let node = nodes.get(0).unwrap();
    node.set_in(&mut doc, json!(99)).unwrap();
    assert_eq!(doc, json!({"a": {"b": {"c": 99}}}));
}

#[test]
fn write_through_array_index() {
    let env = Environment::new();
    let mut doc = json!({"a": {"b": [1, 2, 3]}});
    let snapshot = doc.clone();
    let query = env.compile("$.a.b[1]").unwrap();

    let nodes = query.find(&env, &snapshot);
    assert_eq!(nodes.values(), vec![&json!(2)]);
    assert_eq!(nodes.paths(), vec!["$['a']['b'][1]".to_string()]);

    nodes.get(0).unwrap().set_in(&mut doc, json!(99)).unwrap();
    assert_eq!(doc, json!({"a": {"b": [1, 99, 3]}}));
}

#[test]
fn root_only_query_cannot_write_through() {
    let env = Environment::new();
    let mut doc = json!({"a": 1});
    let snapshot = doc.clone();
    let query = env.compile("$").unwrap();
    assert!(query.is_empty());

    let node = query.find_one(&env, &snapshot).unwrap();
    let err = node.set_in(&mut doc, json!({"a": 2})).unwrap_err();
    assert_eq!(err, rfc9535_jsonpath::WriteError::NoParent);
    assert_eq!(doc, json!({"a": 1}));
}

#[test]
fn stale_location_after_shape_change_is_an_indexing_error() {
    let env = Environment::new();
    let original = json!({"a": [1, 2, 3]});
    let query = env.compile("$.a[2]").unwrap();
    let node = query.find_one(&env, &original).unwrap();

    let mut shrunk = json!({"a": [1]});
    let err = node.set_in(&mut shrunk, json!(99)).unwrap_err();
    assert!(matches!(err, rfc9535_jsonpath::WriteError::StaleLocation(_)));
}
