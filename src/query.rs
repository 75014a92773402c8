//! Compiled queries: an ordered list of [`Segment`]s plus the root/current
//! distinction RFC 9535 uses for both whole-query and filter-embedded
//! queries.

use std::fmt;

use serde_json::Value;

use crate::environment::Environment;
use crate::node::{Node, NodeList};
use crate::segment::Segment;

/// Whether a query is anchored to the overall document root (`$`) or to
/// the "current node" of a filter expression (`@`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryKind {
    #[default]
    Root,
    Current,
}

/// A compiled JSONPath query: immutable once built, and safe to evaluate
/// repeatedly against any number of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub(crate) kind: QueryKind,
    pub(crate) segments: Vec<Segment>,
}

impl Query {
    pub(crate) fn new(kind: QueryKind, segments: Vec<Segment>) -> Self {
        Self { kind, segments }
    }

    /// True if this query has no segments, i.e. it selects only the node it
    /// is anchored to.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if this query can only ever yield at most one node: every
    /// segment is a non-descendant, singular segment.
    pub fn is_singular_query(&self) -> bool {
        self.segments.iter().all(Segment::is_singular)
    }

    /// Evaluates this query against `current` (the context node for a `@`
    /// query) and `root` (the document root, for a `$` query), returning
    /// the resulting [`NodeList`].
    #[cfg_attr(
        feature = "trace",
        tracing::instrument(name = "Evaluate Query", level = "trace", skip(self, env))
    )]
    pub fn evaluate<'a>(&self, current: &Node<'a>, root: &'a Value, env: &Environment) -> NodeList<'a> {
        let mut nodes = match self.kind {
            QueryKind::Root => vec![Node::root(root)],
            QueryKind::Current => vec![current.clone()],
        };
        for segment in &self.segments {
            nodes = segment.apply(&nodes, root, env);
        }
        NodeList::new(nodes)
    }

    /// Evaluates this query against a document, using `env` for function
    /// extensions and the nondeterminism setting.
    ///
    /// This is the primary entry point for a compiled, reusable [`Query`];
    /// `env` need not be the same [`Environment`] the query was compiled
    /// with, as long as it registers every function extension the query
    /// calls.
    pub fn find<'a>(&self, env: &Environment, document: &'a Value) -> NodeList<'a> {
        let root = Node::root(document);
        self.evaluate(&root, document, env)
    }

    /// Evaluates this query, returning its first matching node, or `None` if
    /// it matched nothing.
    pub fn find_one<'a>(&self, env: &Environment, document: &'a Value) -> Option<Node<'a>> {
        self.find(env, document).into_iter().next()
    }

    /// Evaluates this query, returning an iterator over the matching nodes.
    pub fn finditer<'a>(
        &self,
        env: &Environment,
        document: &'a Value,
    ) -> impl Iterator<Item = Node<'a>> {
        self.find(env, document).into_iter()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            QueryKind::Root => write!(f, "$")?,
            QueryKind::Current => write!(f, "@")?,
        }
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;
    use serde_json::json;

    #[test]
    fn empty_root_query_is_singular() {
        let q = Query::new(QueryKind::Root, vec![]);
        assert!(q.is_singular_query());
        assert!(q.is_empty());
    }

    #[test]
    fn evaluate_simple_child_path() {
        let env = Environment::new();
        let doc = json!({"a": {"b": 1}});
        let q = Query::new(
            QueryKind::Root,
            vec![
                Segment::Child(vec![Selector::Name("a".into())]),
                Segment::Child(vec![Selector::Name("b".into())]),
            ],
        );
        let root_node = Node::root(&doc);
        let result = q.evaluate(&root_node, &doc, &env);
        assert_eq!(result.values(), vec![&json!(1)]);
        assert_eq!(result.paths(), vec!["$['a']['b']".to_string()]);
    }
}
