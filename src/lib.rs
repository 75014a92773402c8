//! An implementation of JSONPath ([RFC 9535][rfc]) over [`serde_json::Value`].
//!
//! The crate compiles a JSONPath query string into a [`Query`]: an immutable,
//! reusable object that can be evaluated against any number of documents.
//! Compilation is governed by an [`Environment`], which owns the registry of
//! function extensions (`length`, `count`, `match`, `search`, `value`, plus
//! any the caller registers) and a couple of evaluation-time settings.
//!
//! [rfc]: https://www.rfc-editor.org/rfc/rfc9535.html
//!
//! # Usage
//!
//! ```rust
//! use rfc9535_jsonpath::Environment;
//! use serde_json::json;
//!
//! let env = Environment::new();
//! let query = env.compile("$.store.book[?@.price < 10].title").unwrap();
//! let value = json!({
//!     "store": {
//!         "book": [
//!             {"title": "Sayings of the Century", "price": 8.95},
//!             {"title": "Sword of Honour", "price": 12.99},
//!         ]
//!     }
//! });
//! let titles = query.find(&env, &value).values();
//! assert_eq!(titles, vec!["Sayings of the Century"]);
//! ```
//!
//! Every result is also available as a normalized path, per RFC 9535 §2.7:
//!
//! ```rust
//! # use rfc9535_jsonpath::Environment;
//! # use serde_json::json;
//! let env = Environment::new();
//! let query = env.compile("$.a.b").unwrap();
//! let value = json!({"a": {"b": 1}});
//! let nodes = query.find(&env, &value);
//! assert_eq!(nodes.paths(), vec!["$['a']['b']"]);
//! ```
//!
//! # Feature flags
//!
//! - `functions` (default) - compiles in the five RFC 9535 built-in function
//!   extensions. Disabling it yields an [`Environment`] with an empty
//!   function registry (custom extensions can still be registered with
//!   [`Environment::register_function`]).
//! - `trace` - instruments the parser and evaluator with
//!   [`tracing`](https://docs.rs/tracing) spans.

#![warn(
    clippy::all,
    clippy::dbg_macro,
    clippy::todo,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::mem_forget,
    clippy::unused_self,
    clippy::filter_map_next,
    clippy::needless_continue,
    clippy::needless_borrow,
    clippy::match_wildcard_for_single_variants,
    clippy::match_on_vec_items,
    clippy::lossy_float_literal,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::exit,
    clippy::inefficient_to_string,
    clippy::linkedlist,
    clippy::macro_use_imports,
    clippy::option_option,
    clippy::verbose_file_reads,
    clippy::unnested_or_patterns,
    clippy::str_to_string,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style
)]
#![deny(unreachable_pub)]
#![forbid(unsafe_code)]

pub mod environment;
pub mod error;
mod ext;
pub mod filter;
pub mod function;
mod lexer;
pub mod location;
pub mod node;
mod parser;
pub mod query;
mod rand;
pub mod segment;
pub mod selector;

#[doc(inline)]
pub use environment::{Environment, MAX_INT_INDEX, MIN_INT_INDEX};
#[doc(inline)]
pub use error::{Error, NameError, SyntaxError, TypeError, WriteError};
#[doc(inline)]
pub use ext::JsonPathExt;
#[doc(inline)]
pub use filter::NonSingularQueryError;
#[doc(inline)]
pub use function::{EvaluatedArg, ExpressionType, FunctionExtension, FunctionRegistry};
#[doc(inline)]
pub use location::{Location, LocationSegment};
#[doc(inline)]
pub use node::{AtMostOneError, ExactlyOneError, Node, NodeList};
#[doc(inline)]
pub use query::{Query, QueryKind};
#[doc(inline)]
pub use segment::Segment;
#[doc(inline)]
pub use selector::{Selector, Slice};
