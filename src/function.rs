//! Function extensions: the built-in RFC 9535 functions (`length`, `count`,
//! `match`, `search`, `value`) and the extension mechanism used to register
//! more of them on an [`Environment`](crate::environment::Environment).

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use regex::Regex;
use serde_json::{Number, Value};

use crate::node::NodeList;

/// The three type classifications a filter-expression value can have, used
/// to check function signatures and argument positions at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    /// A single JSON value, or the absence of one (`Nothing`).
    ValueType,
    /// A boolean used in a filter's logical position.
    LogicalType,
    /// A (possibly empty) list of nodes.
    NodesType,
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueType => write!(f, "ValueType"),
            Self::LogicalType => write!(f, "LogicalType"),
            Self::NodesType => write!(f, "NodesType"),
        }
    }
}

/// The signature and implementation of a function extension.
///
/// Built via [`FunctionExtension::new`] and registered on an
/// [`Environment`](crate::environment::Environment) with
/// `Environment::register_function`.
#[derive(Clone)]
pub struct FunctionExtension {
    pub(crate) arg_types: Vec<ExpressionType>,
    pub(crate) return_type: ExpressionType,
    pub(crate) evaluate: Evaluator,
}

/// The type of a function extension's implementation: takes the evaluated
/// arguments (borrowed out of whatever document is being queried) and
/// returns an owned result, since none of the built-in functions can
/// fabricate new borrowed nodes.
pub type Evaluator = Rc<dyn for<'a> Fn(Vec<EvaluatedArg<'a>>) -> EvaluatedArg<'static>>;

impl fmt::Debug for FunctionExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionExtension")
            .field("arg_types", &self.arg_types)
            .field("return_type", &self.return_type)
            .finish()
    }
}

/// The runtime value of one evaluated function argument or function result:
/// a `ValueType` result (`Value`/`Nothing`), a `LogicalType` result
/// (`Logical`), or a `NodesType` result (`Nodes`), per RFC 9535 §2.4.1's
/// three `ExpressionType`s. Function results are always owned (`Nodes`
/// results from a function are always empty, since functions cannot
/// fabricate new nodes in a document they do not own).
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatedArg<'a> {
    Value(Value),
    Node(&'a Value),
    Nothing,
    Logical(bool),
    Nodes(NodeList<'a>),
}

impl FunctionExtension {
    /// Builds a new function extension with the given argument signature,
    /// declared return type, and implementation.
    ///
    /// `evaluate` is called with one evaluated [`EvaluatedArg`] per argument,
    /// in declaration order, and must return an owned result matching
    /// `return_type`'s shape (a `Value`/`Nothing` for `ValueType`, a
    /// `Logical` for `LogicalType`, a `Nodes` for `NodesType` — though a
    /// function can never return a non-empty node list, since it owns no
    /// part of the document being queried).
    pub fn new(
        arg_types: Vec<ExpressionType>,
        return_type: ExpressionType,
        evaluate: Evaluator,
    ) -> Self {
        Self {
            arg_types,
            return_type,
            evaluate,
        }
    }

    pub fn arg_types(&self) -> &[ExpressionType] {
        &self.arg_types
    }

    pub fn return_type(&self) -> ExpressionType {
        self.return_type
    }
}

/// The registry of function extensions available when compiling a query.
///
/// A fresh registry is seeded with the five built-ins RFC 9535 requires
/// (`length`, `count`, `match`, `search`, `value`); more may be added with
/// [`FunctionRegistry::register`].
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionExtension>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("names", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        let mut functions = HashMap::new();
        functions.insert("length".to_owned(), length_function());
        functions.insert("count".to_owned(), count_function());
        functions.insert("match".to_owned(), match_function());
        functions.insert("search".to_owned(), search_function());
        functions.insert("value".to_owned(), value_function());
        Self { functions }
    }
}

impl FunctionRegistry {
    /// Registers a new function extension, or replaces one with the same
    /// name.
    pub fn register(&mut self, name: impl Into<String>, function: FunctionExtension) {
        self.functions.insert(name.into(), function);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionExtension> {
        self.functions.get(name)
    }
}

fn length_function() -> FunctionExtension {
    FunctionExtension {
        arg_types: vec![ExpressionType::ValueType],
        return_type: ExpressionType::ValueType,
        evaluate: Rc::new(|mut args| {
            let arg = args.pop().expect("length takes exactly one argument");
            let value = match &arg {
                EvaluatedArg::Value(v) => Some(v.clone()),
                EvaluatedArg::Node(v) => Some((*v).clone()),
                _ => None,
            };
            let len = value.and_then(|v| match v {
                Value::String(s) => Some(s.chars().count()),
                Value::Array(a) => Some(a.len()),
                Value::Object(o) => Some(o.len()),
                _ => None,
            });
            match len {
                Some(n) => EvaluatedArg::Value(Value::Number(Number::from(n as u64))),
                None => EvaluatedArg::Nothing,
            }
        }),
    }
}

fn count_function() -> FunctionExtension {
    FunctionExtension {
        arg_types: vec![ExpressionType::NodesType],
        return_type: ExpressionType::ValueType,
        evaluate: Rc::new(|mut args| {
            let arg = args.pop().expect("count takes exactly one argument");
            let n = match arg {
                EvaluatedArg::Nodes(list) => list.len() as u64,
                _ => 0,
            };
            EvaluatedArg::Value(Value::Number(Number::from(n)))
        }),
    }
}

fn as_str_for_regex(arg: &EvaluatedArg<'_>) -> Option<String> {
    match arg {
        EvaluatedArg::Value(Value::String(s)) => Some(s.clone()),
        EvaluatedArg::Node(Value::String(s)) => Some((*s).clone()),
        _ => None,
    }
}

fn match_function() -> FunctionExtension {
    FunctionExtension {
        arg_types: vec![ExpressionType::ValueType, ExpressionType::ValueType],
        return_type: ExpressionType::LogicalType,
        evaluate: Rc::new(|args| {
            let matched = (|| {
                let subject = as_str_for_regex(args.first()?)?;
                let pattern = as_str_for_regex(args.get(1)?)?;
                let anchored = format!("^(?:{pattern})$");
                Regex::new(&anchored).ok()?.is_match(&subject).then_some(())
            })()
            .is_some();
            EvaluatedArg::Logical(matched)
        }),
    }
}

fn search_function() -> FunctionExtension {
    FunctionExtension {
        arg_types: vec![ExpressionType::ValueType, ExpressionType::ValueType],
        return_type: ExpressionType::LogicalType,
        evaluate: Rc::new(|args| {
            let matched = (|| {
                let subject = as_str_for_regex(args.first()?)?;
                let pattern = as_str_for_regex(args.get(1)?)?;
                Regex::new(&pattern).ok()?.is_match(&subject).then_some(())
            })()
            .is_some();
            EvaluatedArg::Logical(matched)
        }),
    }
}

fn value_function() -> FunctionExtension {
    FunctionExtension {
        arg_types: vec![ExpressionType::NodesType],
        return_type: ExpressionType::ValueType,
        evaluate: Rc::new(|mut args| match args.pop() {
            Some(EvaluatedArg::Nodes(list)) if list.len() == 1 => {
                EvaluatedArg::Value(list.first().expect("checked len == 1").value().clone())
            }
            _ => EvaluatedArg::Nothing,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_builtins() {
        let registry = FunctionRegistry::default();
        for name in ["length", "count", "match", "search", "value"] {
            assert!(registry.get(name).is_some(), "missing builtin {name}");
        }
    }

    #[test]
    fn length_of_string() {
        let f = registry_fn("length");
        let result = (f.evaluate)(vec![EvaluatedArg::Value(Value::String("hello".into()))]);
        assert_eq!(result, EvaluatedArg::Value(Value::Number(Number::from(5))));
    }

    #[test]
    fn length_of_non_length_having_type_is_nothing() {
        let f = registry_fn("length");
        let result = (f.evaluate)(vec![EvaluatedArg::Value(Value::Bool(true))]);
        assert_eq!(result, EvaluatedArg::Nothing);
    }

    #[test]
    fn match_is_fully_anchored() {
        let f = registry_fn("match");
        let result = (f.evaluate)(vec![
            EvaluatedArg::Value(Value::String("abc".into())),
            EvaluatedArg::Value(Value::String("a.c".into())),
        ]);
        assert_eq!(result, EvaluatedArg::Logical(true));
        let result = (f.evaluate)(vec![
            EvaluatedArg::Value(Value::String("xabcx".into())),
            EvaluatedArg::Value(Value::String("a.c".into())),
        ]);
        assert_eq!(result, EvaluatedArg::Logical(false));
    }

    #[test]
    fn search_is_unanchored() {
        let f = registry_fn("search");
        let result = (f.evaluate)(vec![
            EvaluatedArg::Value(Value::String("xabcx".into())),
            EvaluatedArg::Value(Value::String("a.c".into())),
        ]);
        assert_eq!(result, EvaluatedArg::Logical(true));
    }

    fn registry_fn(name: &str) -> FunctionExtension {
        FunctionRegistry::default().get(name).unwrap().clone()
    }
}
