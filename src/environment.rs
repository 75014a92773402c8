//! [`Environment`]: the configuration an RFC 9535 query is compiled and
//! evaluated against — its function extension registry, integer bounds, and
//! nondeterministic-evaluation setting.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::function::{FunctionExtension, FunctionRegistry};
use crate::node::NodeList;
use crate::parser::parse_query;
use crate::query::Query;
use crate::rand::shuffle;

/// The largest (and smallest) integer RFC 9535 permits in an index, slice
/// bound, or similar position, matching the IEEE 754 double's range of
/// exactly representable integers.
pub const MAX_INT_INDEX: i64 = (1i64 << 53) - 1;
pub const MIN_INT_INDEX: i64 = -((1i64 << 53) - 1);

/// The environment a query is compiled and evaluated against.
///
/// `Environment` owns the function extension registry (seeded with the five
/// RFC 9535 built-ins) and a flag controlling whether object member order
/// is permitted to vary nondeterministically between evaluations. Both
/// `Environment`s and the [`Query`]s compiled from them are immutable once
/// built and safe to share across threads for read-only use (though nothing
/// in this crate is `Send`/`Sync`-constrained to require it); evaluation
/// itself is single-threaded and cooperative.
#[derive(Debug, Clone)]
pub struct Environment {
    functions: FunctionRegistry,
    nondeterministic: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            functions: FunctionRegistry::default(),
            nondeterministic: false,
        }
    }
}

impl Environment {
    /// Builds a new environment with the default (deterministic) settings
    /// and the five built-in function extensions registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this environment with nondeterministic evaluation
    /// enabled or disabled.
    ///
    /// In nondeterministic mode, an object's member order is shuffled
    /// before each segment iterates over it, rather than iterating in
    /// document order. Every resulting node list remains one of the
    /// orderings RFC 9535 sanctions for object iteration; this setting
    /// exists to exercise that an implementation does not accidentally
    /// depend on one particular (e.g. insertion) order.
    pub fn with_nondeterministic(mut self, nondeterministic: bool) -> Self {
        self.nondeterministic = nondeterministic;
        self
    }

    pub fn is_nondeterministic(&self) -> bool {
        self.nondeterministic
    }

    /// Registers a function extension under `name`, replacing any existing
    /// registration of the same name.
    pub fn register_function(&mut self, name: impl Into<String>, function: FunctionExtension) {
        self.functions.register(name, function);
    }

    pub(crate) fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Compiles a JSONPath query string against this environment's function
    /// registry.
    #[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip(self), err))]
    pub fn compile(&self, input: &str) -> Result<Query, Error> {
        parse_query(input, self)
    }

    /// Compiles and immediately evaluates `input` against `document`.
    pub fn find<'a>(&self, input: &str, document: &'a Value) -> Result<NodeList<'a>, Error> {
        Ok(self.compile(input)?.find(self, document))
    }

    /// The object's members, in the order this environment's segments and
    /// selectors should iterate them: document order unless nondeterministic
    /// evaluation is enabled, in which case a Fisher-Yates-shuffled order.
    pub(crate) fn object_entries<'a>(&self, map: &'a Map<String, Value>) -> Vec<(&'a str, &'a Value)> {
        let mut entries: Vec<(&str, &Value)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
        if self.nondeterministic {
            shuffle(&mut entries);
        }
        entries
    }
}
