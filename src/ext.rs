//! An extension trait allowing JSONPath queries directly on
//! [`serde_json::Value`].

use serde_json::Value;

use crate::node::NodeList;
use crate::query::Query;
use crate::Environment;

/// Extension trait that allows running a pre-compiled [`Query`] directly on
/// a [`serde_json::Value`].
///
/// ## Usage
///
/// ```rust
/// use rfc9535_jsonpath::{Environment, JsonPathExt};
/// use serde_json::json;
///
/// let value = json!({"foo": ["bar", "baz"]});
/// let env = Environment::new();
/// let query = env.compile("$.foo[*]").unwrap();
/// let nodes = value.json_path(&query);
/// assert_eq!(nodes.values(), vec!["bar", "baz"]);
/// ```
///
/// This is sugar over [`Query::find`] with a default, deterministic
/// [`Environment`]; queries that need nondeterministic evaluation or a
/// non-default function registry at evaluation time should call
/// [`Query::find`] directly with their own [`Environment`].
pub trait JsonPathExt {
    /// Evaluates `query` against `self`.
    fn json_path<'a>(&'a self, query: &Query) -> NodeList<'a>;
}

impl JsonPathExt for Value {
    fn json_path<'a>(&'a self, query: &Query) -> NodeList<'a> {
        query.find(&Environment::new(), self)
    }
}
