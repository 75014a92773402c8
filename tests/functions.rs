use std::rc::Rc;

use rfc9535_jsonpath::{EvaluatedArg, Environment, ExpressionType, FunctionExtension};
use serde_json::json;

fn first_function() -> FunctionExtension {
    FunctionExtension::new(
        vec![ExpressionType::NodesType],
        ExpressionType::ValueType,
        Rc::new(|mut args| match args.pop() {
            Some(EvaluatedArg::Nodes(nodes)) => match nodes.first() {
                Some(node) => EvaluatedArg::Value(node.value().clone()),
                None => EvaluatedArg::Nothing,
            },
            _ => EvaluatedArg::Nothing,
        }),
    )
}

#[test]
fn custom_function_extension() {
    let mut env = Environment::new();
    env.register_function("first", first_function());

    let value = json!([
        {
            "books": [
                {"author": "Alexandre Dumas", "title": "The Three Musketeers"},
                {"author": "William Shirer", "title": "The Rise and Fall of the Third Reich"}
            ]
        },
        {
            "books": [
                {"author": "Charles Dickens", "title": "Great Expectations"},
                {"author": "Fyodor Dostoevsky", "title": "The Brothers Karamazov"}
            ]
        }
    ]);

    let query = env
        .compile("$[?first(@.books.*.author) == 'Alexandre Dumas']")
        .unwrap();
    let node = query.find_one(&env, &value).unwrap();
    assert_eq!(
        node.value().pointer("/books/1/title").unwrap(),
        "The Rise and Fall of the Third Reich"
    );
}

#[test]
fn reregistering_a_builtin_replaces_it() {
    let mut env = Environment::new();
    // Replace `length` with a function that always reports zero.
    env.register_function(
        "length",
        FunctionExtension::new(
            vec![ExpressionType::ValueType],
            ExpressionType::ValueType,
            Rc::new(|_| EvaluatedArg::Value(json!(0))),
        ),
    );
    let value = json!({"a": "hello"});
    let nodes = env.find("$[?length(@.a) > 0]", &value).unwrap();
    assert!(nodes.is_empty());
}

#[test]
fn unregistered_function_is_a_compile_time_name_error() {
    let env = Environment::new();
    let err = env.compile("$[?unknown_fn(@.a)]").unwrap_err();
    assert!(matches!(err, rfc9535_jsonpath::Error::Name(_)));
}
