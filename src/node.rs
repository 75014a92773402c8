//! Nodes and node lists: the result type of every JSONPath query.

use std::rc::Rc;
use std::slice::Iter;

use serde::Serialize;
use serde_json::Value;

use crate::error::WriteError;
use crate::location::{Location, LocationSegment};

/// A single node produced by evaluating a query against a document.
///
/// A `Node` borrows its value out of the document it was queried against and
/// carries the [`Location`] that addresses it, plus a link to the node it
/// was reached from (`None` only for the query root). Nodes are read-only
/// borrows; to mutate the value a node addresses, use [`Node::set_in`]
/// against a separate mutable borrow of the same document.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    value: &'a Value,
    location: Location,
    parent: Option<Rc<Node<'a>>>,
}

impl<'a> Node<'a> {
    /// Creates the root node of a query, i.e., the node at the empty
    /// location addressing the document itself.
    pub fn root(value: &'a Value) -> Self {
        Self {
            value,
            location: Location::root(),
            parent: None,
        }
    }

    /// Creates a node that descends from `self` by one [`LocationSegment`].
    pub fn new_child(&self, value: &'a Value, segment: impl Into<LocationSegment>) -> Self {
        Self {
            value,
            location: self.location.clone_and_push(segment),
            parent: Some(Rc::new(self.clone())),
        }
    }

    /// The value this node addresses.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// The normalized [`Location`] of this node, relative to the query
    /// root.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The canonical normalized-path string of this node, e.g.
    /// `$['store']['book'][0]`.
    pub fn path(&self) -> String {
        self.location.to_string()
    }

    /// The node this one was reached from, or `None` if this is the query
    /// root.
    pub fn parent(&self) -> Option<&Node<'a>> {
        self.parent.as_deref()
    }

    /// Writes `new_value` through to the location this node addresses in
    /// `document`, which must be the same document (or a document of
    /// identical shape) that produced this node.
    ///
    /// This does not (and cannot) update `self`: the node continues to
    /// reflect the value it was constructed with. Writing through the root
    /// node is always an error, since there is no parent container to index
    /// into and replace the root value in place.
    pub fn set_in(&self, document: &mut Value, new_value: Value) -> Result<(), WriteError> {
        let mut segments = self.location.iter().peekable();
        if segments.peek().is_none() {
            return Err(WriteError::NoParent);
        }
        let mut current = document;
        while let Some(segment) = segments.next() {
            let is_last = segments.peek().is_none();
            current = match segment {
                LocationSegment::Name(name) => current
                    .as_object_mut()
                    .ok_or_else(|| WriteError::NotIndexable(format!("['{name}']")))?
                    .get_mut(name)
                    .ok_or_else(|| WriteError::StaleLocation(name.clone()))?,
                LocationSegment::Index(index) => current
                    .as_array_mut()
                    .ok_or_else(|| WriteError::NotIndexable(format!("[{index}]")))?
                    .get_mut(*index)
                    .ok_or_else(|| WriteError::StaleLocation(index.to_string()))?,
            };
            if is_last {
                *current = new_value;
                return Ok(());
            }
        }
        unreachable!("location was non-empty, so the loop always returns")
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.location == other.location
    }
}

impl Eq for Node<'_> {}

/// A list of nodes resulting from a JSONPath query.
///
/// Each node borrows out of the original document that was queried.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeList<'a>(pub(crate) Vec<Node<'a>>);

impl<'a> NodeList<'a> {
    pub(crate) fn new(nodes: Vec<Node<'a>>) -> Self {
        Self(nodes)
    }

    /// An empty node list.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Extract _at most_ one node's value from this list.
    pub fn at_most_one(&self) -> Result<Option<&'a Value>, AtMostOneError> {
        match self.0.len() {
            0 => Ok(None),
            1 => Ok(Some(self.0[0].value())),
            n => Err(AtMostOneError(n)),
        }
    }

    /// Extract _exactly_ one node's value from this list.
    pub fn exactly_one(&self) -> Result<&'a Value, ExactlyOneError> {
        match self.0.len() {
            0 => Err(ExactlyOneError::Empty),
            1 => Ok(self.0[0].value()),
            n => Err(ExactlyOneError::MoreThanOne(n)),
        }
    }

    /// Consumes this list, returning every node's value.
    pub fn all(self) -> Vec<&'a Value> {
        self.0.into_iter().map(|n| n.value).collect()
    }

    /// The values of every node in this list, in result order.
    pub fn values(&self) -> Vec<&'a Value> {
        self.0.iter().map(Node::value).collect()
    }

    /// The canonical normalized path of every node in this list, in result
    /// order.
    pub fn paths(&self) -> Vec<String> {
        self.0.iter().map(Node::path).collect()
    }

    /// Each node's path paired with its value, in result order.
    pub fn items(&self) -> Vec<(String, &'a Value)> {
        self.0.iter().map(|n| (n.path(), n.value())).collect()
    }

    /// The number of nodes in this list.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if this list contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the nodes in this list.
    pub fn iter(&self) -> Iter<'_, Node<'a>> {
        self.0.iter()
    }

    /// The first node in this list, or `None` if it is empty.
    pub fn first(&self) -> Option<&Node<'a>> {
        self.0.first()
    }

    /// The last node in this list, or `None` if it is empty.
    pub fn last(&self) -> Option<&Node<'a>> {
        self.0.last()
    }

    /// The node at the given index, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<&Node<'a>> {
        self.0.get(index)
    }
}

/// A [`NodeList`] was expected to contain at most one node, but contained
/// more.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("nodelist expected to contain at most one entry, but instead contains {0} entries")]
pub struct AtMostOneError(pub usize);

/// A [`NodeList`] was expected to contain exactly one node.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExactlyOneError {
    /// The list was empty.
    #[error("nodelist expected to contain one entry, but is empty")]
    Empty,
    /// The list contained more than one node.
    #[error("nodelist expected to contain one entry, but instead contains {0} entries")]
    MoreThanOne(usize),
}

impl<'a> From<Vec<Node<'a>>> for NodeList<'a> {
    fn from(nodes: Vec<Node<'a>>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for NodeList<'a> {
    type Item = Node<'a>;
    type IntoIter = std::vec::IntoIter<Node<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for NodeList<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.values().serialize(serializer)
    }
}
