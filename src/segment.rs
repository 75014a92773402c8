//! Query segments: the child and descendant segments that chain together to
//! form a compiled [`Query`](crate::query::Query).

use std::fmt;

use serde_json::Value;

use crate::environment::Environment;
use crate::node::Node;
use crate::selector::Selector;

/// One segment of a compiled query.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// `[sel, sel, ...]`: applies each selector to the current node only.
    Child(Vec<Selector>),
    /// `..[sel, sel, ...]`: applies each selector to the current node and
    /// every one of its descendants, visited in pre-order.
    Descendant(Vec<Selector>),
}

impl Segment {
    /// True if this segment, standing alone, can only ever produce at most
    /// one node: exactly one selector, and that selector is itself
    /// singular (`Name` or `Index`).
    pub fn is_singular(&self) -> bool {
        match self {
            Self::Child(selectors) => {
                selectors.len() == 1 && selectors[0].is_singular()
            }
            Self::Descendant(_) => false,
        }
    }

    pub(crate) fn apply<'a>(
        &self,
        nodes: &[Node<'a>],
        root: &'a Value,
        env: &Environment,
    ) -> Vec<Node<'a>> {
        match self {
            Self::Child(selectors) => {
                let mut out = Vec::new();
                for node in nodes {
                    for selector in selectors {
                        out.extend(selector.apply(node, root, env));
                    }
                }
                out
            }
            Self::Descendant(selectors) => {
                let mut out = Vec::new();
                for node in nodes {
                    visit_descendants(node, selectors, root, env, &mut out);
                }
                out
            }
        }
    }
}

fn visit_descendants<'a>(
    node: &Node<'a>,
    selectors: &[Selector],
    root: &'a Value,
    env: &Environment,
    out: &mut Vec<Node<'a>>,
) {
    for selector in selectors {
        out.extend(selector.apply(node, root, env));
    }
    for child in children_in_order(node, env) {
        visit_descendants(&child, selectors, root, env, out);
    }
}

/// A node's direct children, in RFC 9535 order: array elements by index,
/// object members in the document's own insertion order (or, under
/// [`Environment::is_nondeterministic`], an arbitrary permutation of them).
pub(crate) fn children_in_order<'a>(node: &Node<'a>, env: &Environment) -> Vec<Node<'a>> {
    match node.value() {
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| node.new_child(v, i))
            .collect(),
        Value::Object(obj) => env
            .object_entries(obj)
            .into_iter()
            .map(|(k, v)| node.new_child(v, k))
            .collect(),
        _ => Vec::new(),
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, selectors) = match self {
            Self::Child(s) => ("", s),
            Self::Descendant(s) => ("..", s),
        };
        write!(f, "{prefix}[")?;
        for (i, selector) in selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{selector}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;

    #[test]
    fn singular_child_segment() {
        let seg = Segment::Child(vec![Selector::Name("a".into())]);
        assert!(seg.is_singular());
        let seg = Segment::Child(vec![Selector::Wildcard]);
        assert!(!seg.is_singular());
        let seg = Segment::Descendant(vec![Selector::Name("a".into())]);
        assert!(!seg.is_singular());
    }

    #[test]
    fn display_form() {
        let seg = Segment::Child(vec![Selector::Name("a".into()), Selector::Index(0)]);
        assert_eq!(seg.to_string(), "['a',0]");
        let seg = Segment::Descendant(vec![Selector::Wildcard]);
        assert_eq!(seg.to_string(), "..[*]");
    }
}
