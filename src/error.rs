//! The error taxonomy produced while compiling a JSONPath query.
//!
//! All three error kinds share a common ancestor, [`Error`], and each carries
//! the byte offset in the source string where the problem was detected.
//! Errors raised while writing through a [`Node`](crate::node::Node) are a
//! separate, unrelated type ([`WriteError`]) since they are ordinary
//! indexing failures against a caller-supplied document, not compile-time
//! failures of the query itself.

use thiserror::Error;

/// Any failure that can occur while compiling a JSONPath query string.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// The query string does not conform to the RFC 9535 grammar.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// A function extension was referenced that is not registered on the
    /// [`Environment`](crate::environment::Environment) compiling the query.
    #[error(transparent)]
    Name(#[from] NameError),
    /// A function extension was called with arguments that do not match its
    /// declared signature, or a value of the wrong
    /// [`ExpressionType`](crate::function::ExpressionType) was used in a
    /// position that requires a different one.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// A lexical or grammatical error in a query string.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("syntax error at position {position}: {message}")]
pub struct SyntaxError {
    /// Byte offset into the original query string where the error was
    /// detected.
    pub position: usize,
    /// A human-readable description of what went wrong.
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// A reference to a function extension that is not registered.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("name error at position {position}: unknown function \"{name}\"")]
pub struct NameError {
    /// Byte offset of the function name token.
    pub position: usize,
    /// The unresolved function name.
    pub name: String,
}

impl NameError {
    pub(crate) fn new(position: usize, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
        }
    }
}

/// A well-typedness violation in a function call or comparison.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("type error at position {position}: {message}")]
pub struct TypeError {
    /// Byte offset where the ill-typed expression starts.
    pub position: usize,
    /// A human-readable description of the mismatch.
    pub message: String,
}

impl TypeError {
    pub(crate) fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// A failure while writing a new value through a [`Node`](crate::node::Node)
/// into a caller-supplied document.
///
/// These are ordinary indexing/key failures: they are not part of the
/// compile-time [`Error`] taxonomy above, and occur only at evaluation time,
/// against a document that may differ in shape from the one a query was
/// originally run against.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum WriteError {
    /// The node has no parent, so there is nowhere to write the new value
    /// through to (this is always true of the root node).
    #[error("node has no parent to write through")]
    NoParent,
    /// An intermediate path component no longer resolves in the supplied
    /// document.
    #[error("path component {0} no longer resolves in the supplied document")]
    StaleLocation(String),
    /// The parent at the final path component is not the container kind
    /// (array or object) the location component expects.
    #[error("parent is not indexable by {0}")]
    NotIndexable(String),
}
