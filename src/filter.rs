//! Filter expressions: the `?...` selector's logical-or/and/basic grammar,
//! comparisons, singular-query downgrades, and function-call expressions.

use std::fmt;

use serde_json::Value;

use crate::environment::Environment;
use crate::function::{EvaluatedArg, ExpressionType, FunctionExtension};
use crate::location::canonical_string;
use crate::node::Node;
use crate::query::{Query, QueryKind};
use crate::selector::{resolve_index, Selector};
use crate::segment::Segment;

/// A compiled `?...` filter selector's expression: `!` binds tighter than
/// `&&`, which binds tighter than `||`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter(pub LogicalOrExpr);

impl Filter {
    pub(crate) fn test(&self, current: &Value, root: &Value, env: &Environment) -> bool {
        let node = Node::root(current);
        self.0.test(&node, root, env)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalOrExpr(pub Vec<LogicalAndExpr>);

impl LogicalOrExpr {
    pub(crate) fn test(&self, current: &Node<'_>, root: &Value, env: &Environment) -> bool {
        self.0.iter().any(|and| and.test(current, root, env))
    }
}

impl fmt::Display for LogicalOrExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, and) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " || ")?;
            }
            write!(f, "{and}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalAndExpr(pub Vec<BasicExpr>);

impl LogicalAndExpr {
    pub(crate) fn test(&self, current: &Node<'_>, root: &Value, env: &Environment) -> bool {
        self.0.iter().all(|basic| basic.test(current, root, env))
    }
}

impl fmt::Display for LogicalAndExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, basic) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{basic}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BasicExpr {
    Paren(LogicalOrExpr),
    NotParen(LogicalOrExpr),
    Relation(ComparisonExpr),
    Exist(Query),
    NotExist(Query),
    FuncExpr(FunctionExpr),
    NotFuncExpr(FunctionExpr),
}

impl BasicExpr {
    pub(crate) fn test(&self, current: &Node<'_>, root: &Value, env: &Environment) -> bool {
        match self {
            Self::Paren(inner) => inner.test(current, root, env),
            Self::NotParen(inner) => !inner.test(current, root, env),
            Self::Relation(cmp) => cmp.test(current, root, env),
            Self::Exist(q) => !q.evaluate(current, root, env).is_empty(),
            Self::NotExist(q) => q.evaluate(current, root, env).is_empty(),
            Self::FuncExpr(f) => as_logical(&f.evaluate(current, root, env)),
            Self::NotFuncExpr(f) => !as_logical(&f.evaluate(current, root, env)),
        }
    }
}

fn as_logical(result: &EvaluatedArg<'_>) -> bool {
    match result {
        EvaluatedArg::Logical(b) => *b,
        EvaluatedArg::Nodes(list) => !list.is_empty(),
        _ => false,
    }
}

impl fmt::Display for BasicExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paren(inner) => write!(f, "({inner})"),
            Self::NotParen(inner) => write!(f, "!({inner})"),
            Self::Relation(cmp) => write!(f, "{cmp}"),
            Self::Exist(q) => write!(f, "{q}"),
            Self::NotExist(q) => write!(f, "!{q}"),
            Self::FuncExpr(func) => write!(f, "{func}"),
            Self::NotFuncExpr(func) => write!(f, "!{func}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpr {
    pub left: Comparable,
    pub op: ComparisonOperator,
    pub right: Comparable,
}

impl ComparisonExpr {
    pub(crate) fn test(&self, current: &Node<'_>, root: &Value, env: &Environment) -> bool {
        let left = self.left.eval(current, root, env);
        let right = self.right.eval(current, root, env);
        let (l, r) = (left.as_ref(), right.as_ref());
        match self.op {
            ComparisonOperator::Eq => value_equal_to(l, r),
            ComparisonOperator::Ne => !value_equal_to(l, r),
            ComparisonOperator::Lt => value_same_type(l, r) && value_less_than(l, r),
            ComparisonOperator::Le => {
                value_same_type(l, r) && (value_less_than(l, r) || value_equal_to(l, r))
            }
            ComparisonOperator::Gt => {
                value_same_type(l, r) && !value_less_than(l, r) && !value_equal_to(l, r)
            }
            ComparisonOperator::Ge => value_same_type(l, r) && !value_less_than(l, r),
        }
    }
}

impl fmt::Display for ComparisonExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

fn number_equal_to(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    a.as_f64() == b.as_f64()
}

fn value_equal_to(l: Option<&Value>, r: Option<&Value>) -> bool {
    match (l, r) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(Value::Number(a)), Some(Value::Number(b))) => number_equal_to(a, b),
        (Some(a), Some(b)) => a == b,
    }
}

fn value_less_than(l: Option<&Value>, r: Option<&Value>) -> bool {
    match (l, r) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        (Some(Value::String(a)), Some(Value::String(b))) => a < b,
        _ => false,
    }
}

fn value_same_type(l: Option<&Value>, r: Option<&Value>) -> bool {
    match (l, r) {
        (Some(a), Some(b)) => {
            matches!(
                (a, b),
                (Value::Null, Value::Null)
                    | (Value::Bool(_), Value::Bool(_))
                    | (Value::Number(_), Value::Number(_))
                    | (Value::String(_), Value::String(_))
                    | (Value::Array(_), Value::Array(_))
                    | (Value::Object(_), Value::Object(_))
            )
        }
        _ => false,
    }
}

/// One side of a [`ComparisonExpr`]: a literal, a downgraded singular path,
/// or a value-typed function call.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparable {
    Literal(Literal),
    SingularQuery(SingularQuery),
    FunctionExpr(FunctionExpr),
}

impl Comparable {
    fn eval(&self, current: &Node<'_>, root: &Value, env: &Environment) -> Option<Value> {
        match self {
            Self::Literal(lit) => Some(lit.to_value()),
            Self::SingularQuery(sq) => sq.eval_query(current, root).cloned(),
            Self::FunctionExpr(func) => match func.evaluate(current, root, env) {
                EvaluatedArg::Value(v) => Some(v),
                EvaluatedArg::Node(v) => Some(v.clone()),
                EvaluatedArg::Nothing => None,
                EvaluatedArg::Logical(b) => Some(Value::Bool(b)),
                EvaluatedArg::Nodes(_) => None,
            },
        }
    }

    pub fn as_singular_path(&self) -> Option<&SingularQuery> {
        match self {
            Self::SingularQuery(sq) => Some(sq),
            _ => None,
        }
    }
}

impl fmt::Display for Comparable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::SingularQuery(sq) => write!(f, "{sq}"),
            Self::FunctionExpr(func) => write!(f, "{func}"),
        }
    }
}

/// A literal value appearing in a comparison or as a function argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(serde_json::Number),
    String(String),
    Bool(bool),
    Null,
}

impl Literal {
    fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Null => Value::Null,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{}", canonical_string(s)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A query downgraded to one that can only ever select a single node: a
/// chain of `Name`/`Index` segments with no wildcard, slice, filter, or
/// descendant component.
#[derive(Debug, Clone, PartialEq)]
pub struct SingularQuery {
    pub kind: SingularQueryKind,
    pub segments: Vec<SingularQuerySegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingularQueryKind {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SingularQuerySegment {
    Name(String),
    Index(i64),
}

impl SingularQuery {
    pub(crate) fn eval_query<'a>(&self, current: &Node<'a>, root: &'a Value) -> Option<&'a Value> {
        let mut value = match self.kind {
            SingularQueryKind::Absolute => root,
            SingularQueryKind::Relative => current.value(),
        };
        for segment in &self.segments {
            value = match segment {
                SingularQuerySegment::Name(name) => value.as_object()?.get(name)?,
                SingularQuerySegment::Index(index) => {
                    let arr = value.as_array()?;
                    let i = resolve_index(*index, arr.len())?;
                    arr.get(i)?
                }
            };
        }
        Some(value)
    }
}

impl fmt::Display for SingularQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SingularQueryKind::Absolute => write!(f, "$")?,
            SingularQueryKind::Relative => write!(f, "@")?,
        }
        for segment in &self.segments {
            match segment {
                SingularQuerySegment::Name(name) => write!(f, "[{}]", canonical_string(name))?,
                SingularQuerySegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A general [`Query`] could not be downgraded to a [`SingularQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NonSingularQueryError {
    #[error("descendant segments are never singular")]
    Descendant,
    #[error("a segment with no selectors is never singular")]
    NoSelectors,
    #[error("a segment with more than one selector is never singular")]
    TooManySelectors,
    #[error("a wildcard selector is never singular")]
    Wildcard,
    #[error("a slice selector is never singular")]
    Slice,
    #[error("a filter selector is never singular")]
    Filter,
}

impl TryFrom<Query> for SingularQuery {
    type Error = NonSingularQueryError;

    fn try_from(query: Query) -> Result<Self, Self::Error> {
        let mut segments = Vec::with_capacity(query.segments.len());
        for segment in query.segments {
            match segment {
                Segment::Descendant(_) => return Err(NonSingularQueryError::Descendant),
                Segment::Child(mut selectors) => {
                    if selectors.is_empty() {
                        return Err(NonSingularQueryError::NoSelectors);
                    }
                    if selectors.len() > 1 {
                        return Err(NonSingularQueryError::TooManySelectors);
                    }
                    segments.push(match selectors.pop().expect("checked len == 1") {
                        Selector::Name(name) => SingularQuerySegment::Name(name),
                        Selector::Index(index) => SingularQuerySegment::Index(index),
                        Selector::Wildcard => return Err(NonSingularQueryError::Wildcard),
                        Selector::Slice(_) => return Err(NonSingularQueryError::Slice),
                        Selector::Filter(_) => return Err(NonSingularQueryError::Filter),
                    });
                }
            }
        }
        Ok(SingularQuery {
            kind: match query.kind {
                QueryKind::Root => SingularQueryKind::Absolute,
                QueryKind::Current => SingularQueryKind::Relative,
            },
            segments,
        })
    }
}

/// A validated call to a registered function extension.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub name: String,
    pub args: Vec<FunctionExprArg>,
    pub(crate) return_type: ExpressionType,
    #[allow(dead_code)]
    pub(crate) function: FunctionExtensionHandle,
}

/// A clone-cheap handle to the concrete implementation backing a
/// [`FunctionExpr`]; kept separate from [`FunctionExtension`] so
/// `FunctionExpr` can derive `PartialEq`/`Debug` by comparing names.
#[derive(Debug, Clone)]
pub struct FunctionExtensionHandle(pub(crate) FunctionExtension);

impl PartialEq for FunctionExtensionHandle {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl FunctionExpr {
    pub fn return_type(&self) -> ExpressionType {
        self.return_type
    }

    pub(crate) fn evaluate<'a>(
        &self,
        current: &Node<'a>,
        root: &'a Value,
        env: &Environment,
    ) -> EvaluatedArg<'a> {
        let args: Vec<EvaluatedArg<'a>> = self
            .args
            .iter()
            .map(|arg| arg.evaluate(current, root, env))
            .collect();
        (self.function.0.evaluate)(args)
    }
}

impl fmt::Display for FunctionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// One argument to a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionExprArg {
    Literal(Literal),
    SingularQuery(SingularQuery),
    FilterQuery(Query),
    LogicalExpr(LogicalOrExpr),
    FunctionExpr(FunctionExpr),
}

impl FunctionExprArg {
    fn evaluate<'a>(&self, current: &Node<'a>, root: &'a Value, env: &Environment) -> EvaluatedArg<'a> {
        match self {
            Self::Literal(lit) => EvaluatedArg::Value(lit.to_value()),
            Self::SingularQuery(sq) => match sq.eval_query(current, root) {
                Some(v) => EvaluatedArg::Node(v),
                None => EvaluatedArg::Nothing,
            },
            Self::FilterQuery(q) => EvaluatedArg::Nodes(q.evaluate(current, root, env)),
            Self::LogicalExpr(expr) => EvaluatedArg::Logical(expr.test(current, root, env)),
            Self::FunctionExpr(func) => func.evaluate(current, root, env),
        }
    }

    /// The [`ExpressionType`] this argument presents, used by well-typedness
    /// checks at compile time.
    pub(crate) fn as_type_kind(&self) -> ExpressionType {
        match self {
            Self::Literal(_) => ExpressionType::ValueType,
            Self::SingularQuery(_) => ExpressionType::ValueType,
            Self::FilterQuery(q) => {
                if q.is_singular_query() {
                    ExpressionType::ValueType
                } else {
                    ExpressionType::NodesType
                }
            }
            Self::LogicalExpr(_) => ExpressionType::LogicalType,
            Self::FunctionExpr(func) => func.return_type,
        }
    }
}

impl fmt::Display for FunctionExprArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::SingularQuery(sq) => write!(f, "{sq}"),
            Self::FilterQuery(q) => write!(f, "{q}"),
            Self::LogicalExpr(expr) => write!(f, "{expr}"),
            Self::FunctionExpr(func) => write!(f, "{func}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_cross_representation_equality() {
        let l = Some(Value::Number(serde_json::Number::from(1)));
        let r = Some(Value::Number(serde_json::Number::from_f64(1.0).unwrap()));
        assert!(value_equal_to(l.as_ref(), r.as_ref()));
    }

    #[test]
    fn nothing_equal_to_nothing_only() {
        assert!(value_equal_to(None, None));
        assert!(!value_equal_to(None, Some(&json!(1))));
    }

    #[test]
    fn order_comparisons_against_nothing_are_false() {
        // Neither `a` nor `b` exists on `{}`, so both sides evaluate to
        // `Nothing`. Per RFC 9535 §2.3.5.2.2, order comparisons against
        // `Nothing` are always false, even `Nothing` against itself.
        let missing = |name: &str| Comparable::SingularQuery(SingularQuery {
            kind: SingularQueryKind::Relative,
            segments: vec![SingularQuerySegment::Name(name.to_owned())],
        });
        let root = json!({});
        let current = Node::root(&root);
        let env = Environment::new();

        let lt = ComparisonExpr {
            left: missing("a"),
            op: ComparisonOperator::Lt,
            right: missing("b"),
        };
        let le = ComparisonExpr {
            left: missing("a"),
            op: ComparisonOperator::Le,
            right: missing("b"),
        };
        assert!(!lt.test(&current, &root, &env));
        assert!(!le.test(&current, &root, &env));
    }

    #[test]
    fn string_ordering() {
        assert!(value_less_than(
            Some(&Value::String("a".into())),
            Some(&Value::String("b".into()))
        ));
    }

    #[test]
    fn cross_type_never_less_than() {
        assert!(!value_less_than(Some(&json!(1)), Some(&json!("1"))));
    }

    #[test]
    fn display_precedence() {
        let expr = LogicalOrExpr(vec![
            LogicalAndExpr(vec![BasicExpr::Exist(Query::new(QueryKind::Current, vec![]))]),
            LogicalAndExpr(vec![BasicExpr::NotExist(Query::new(
                QueryKind::Current,
                vec![],
            ))]),
        ]);
        assert_eq!(expr.to_string(), "@ || !@");
    }

    #[test]
    fn singular_query_display() {
        let sq = SingularQuery {
            kind: SingularQueryKind::Relative,
            segments: vec![
                SingularQuerySegment::Name("a".into()),
                SingularQuerySegment::Index(0),
            ],
        };
        assert_eq!(sq.to_string(), "@['a'][0]");
    }
}
