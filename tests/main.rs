use rfc9535_jsonpath::Environment;
use serde_json::{json, Value};
use test_log::test;

fn spec_example_json() -> Value {
    json!({
        "store": {
            "book": [
                {
                    "category": "reference",
                    "author": "Nigel Rees",
                    "title": "Sayings of the Century",
                    "price": 8.95
                },
                {
                    "category": "fiction",
                    "author": "Evelyn Waugh",
                    "title": "Sword of Honour",
                    "price": 12.99
                },
                {
                    "category": "fiction",
                    "author": "Herman Melville",
                    "title": "Moby Dick",
                    "isbn": "0-553-21311-3",
                    "price": 8.99
                },
                {
                    "category": "fiction",
                    "author": "J. R. R. Tolkien",
                    "title": "The Lord of the Rings",
                    "isbn": "0-395-19395-8",
                    "price": 22.99
                }
            ],
            "bicycle": {
                "color": "red",
                "price": 399
            }
        }
    })
}

#[test]
fn all_authors() {
    let value = spec_example_json();
    let env = Environment::new();
    let nodes = env.find("$.store.book[*].author", &value).unwrap();
    assert_eq!(
        nodes.values(),
        vec!["Nigel Rees", "Evelyn Waugh", "Herman Melville", "J. R. R. Tolkien"]
    );
}

#[test]
fn descendant_authors() {
    let value = spec_example_json();
    let env = Environment::new();
    let nodes = env.find("$..author", &value).unwrap();
    assert_eq!(nodes.len(), 4);
}

#[test]
fn find_one_returns_first_of_several_matches() {
    let value = spec_example_json();
    let env = Environment::new();
    let query = env.compile("$..author").unwrap();
    let node = query.find_one(&env, &value).unwrap();
    assert_eq!(node.value(), "Nigel Rees");
}

#[test]
fn find_one_returns_none_on_zero_matches() {
    let value = spec_example_json();
    let env = Environment::new();
    let query = env.compile("$.store.book[?@.nonexistent]").unwrap();
    assert!(query.find_one(&env, &value).is_none());
}

#[test]
fn store_children_wildcard() {
    let value = spec_example_json();
    let env = Environment::new();
    let nodes = env.find("$.store.*", &value).unwrap();
    assert_eq!(nodes.len(), 2);
    assert!(nodes
        .values()
        .iter()
        .any(|&v| v == value.pointer("/store/book").unwrap()));
}

#[test]
fn descendant_prices() {
    let value = spec_example_json();
    let env = Environment::new();
    let nodes = env.find("$.store..price", &value).unwrap();
    assert_eq!(nodes.len(), 5);
}

#[test]
fn negative_array_index() {
    let value = spec_example_json();
    let env = Environment::new();
    let q = env.compile("$..book[-1]").unwrap();
    let node = q.find_one(&env, &value).unwrap();
    assert_eq!(node.value(), value.pointer("/store/book/3").unwrap());
}

#[test]
fn le_and_lt_exclude_nothing_against_nothing() {
    let value = json!([{}]);
    let env = Environment::new();
    assert!(env.find("$[?@.a <= @.b]", &value).unwrap().is_empty());
    assert!(env.find("$[?@.a < @.b]", &value).unwrap().is_empty());
}

#[test]
fn index_union_matches_leading_slice() {
    let value = spec_example_json();
    let env = Environment::new();
    let by_union = env.find("$..book[0,1]", &value).unwrap();
    let by_slice = env.find("$..book[:2]", &value).unwrap();
    assert_eq!(by_union.len(), 2);
    assert_eq!(by_slice.len(), 2);
}

#[test]
fn filter_on_presence() {
    let value = spec_example_json();
    let env = Environment::new();
    let nodes = env.find("$..book[?@.isbn]", &value).unwrap();
    assert_eq!(nodes.len(), 2);
}

#[test]
fn filter_on_comparison() {
    let value = spec_example_json();
    let env = Environment::new();
    let nodes = env.find("$..book[?@.price<10]", &value).unwrap();
    assert_eq!(nodes.len(), 2);
}

#[test]
fn descendant_wildcard_visits_every_node() {
    let value = spec_example_json();
    let env = Environment::new();
    let nodes = env.find("$..*", &value).unwrap();
    assert_eq!(nodes.len(), 27);
}

#[test]
fn length_function_filters_long_titles() {
    let value = spec_example_json();
    let env = Environment::new();
    let nodes = env
        .find("$.store.book[?length(@.title) > 10]", &value)
        .unwrap();
    assert_eq!(nodes.len(), 3);
}

#[test]
fn count_function_over_nested_filter() {
    let value = json!([
        {"foo": [1]},
        {"foo": [1, 2]},
    ]);
    let env = Environment::new();
    let nodes = env.find("$[?count(@.foo.*) > 1]", &value).unwrap();
    assert_eq!(nodes.len(), 1);
}

#[test]
fn nested_filter_with_count_and_comparison() {
    let value = json!([
        {"likes": [{"location": "x"}, {}, {"location": "y"}, {"location": "z"}, {}]}
    ]);
    let env = Environment::new();
    let nodes = env
        .find("$[?count(@.likes[?@.location]) > 2]", &value)
        .unwrap();
    assert_eq!(nodes.len(), 1);
}

#[test]
fn match_and_search_functions() {
    let value = json!(["foobar", "foo", "bar"]);
    let env = Environment::new();
    let matched = env.find("$[?match(@, 'foo.+')]", &value).unwrap();
    assert_eq!(matched.values(), vec!["foobar"]);
    let searched = env.find("$[?search(@, 'oo')]", &value).unwrap();
    assert_eq!(searched.values(), vec!["foobar", "foo"]);
}

#[test]
fn value_function_downgrades_single_node_lists() {
    let value = json!({"a": {"b": 1}, "c": {"b": 2}});
    let env = Environment::new();
    let nodes = env.find("$[?value(@.b) == 1]", &value).unwrap();
    assert_eq!(nodes.len(), 1);
}
