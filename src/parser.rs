//! The recursive-descent parser: turns a [`Token`](crate::lexer::Token)
//! stream into a [`Query`], validating filter-expression well-typedness
//! (RFC 9535 §2.4.1) as it goes.
//!
//! One production per grammar rule, descending from `query` through
//! `logical-or-expr`/`logical-and-expr`/`basic-expr` into comparisons and
//! function calls, driven over the flat [`Spanned`] token stream produced
//! by [`crate::lexer`] rather than directly over `&str`.

use serde_json::Number;

use crate::environment::{Environment, MAX_INT_INDEX, MIN_INT_INDEX};
use crate::error::{Error, NameError, SyntaxError, TypeError};
use crate::filter::{
    BasicExpr, Comparable, ComparisonExpr, ComparisonOperator, Filter, FunctionExpr,
    FunctionExprArg, FunctionExtensionHandle, Literal, LogicalAndExpr, LogicalOrExpr,
    SingularQuery,
};
use crate::function::ExpressionType;
use crate::lexer::{tokenize, Spanned, Token};
use crate::query::{Query, QueryKind};
use crate::segment::Segment;
use crate::selector::{Selector, Slice};

/// Parses `input` against `env`'s function registry, producing a compiled
/// [`Query`] or an [`Error`].
pub(crate) fn parse_query(input: &str, env: &Environment) -> Result<Query, Error> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        env,
    };
    parser.expect(&Token::Root)?;
    let segments = parser.parse_segments()?;
    parser.expect(&Token::Eof)?;
    Ok(Query::new(QueryKind::Root, segments))
}

struct Parser<'t> {
    tokens: &'t [Spanned],
    pos: usize,
    env: &'t Environment,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|s| &s.token)
    }

    fn position(&self) -> usize {
        self.tokens[self.pos].position
    }

    fn advance(&mut self) -> Spanned {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<Spanned, Error> {
        if self.peek() == expected {
            Ok(self.advance())
        } else {
            Err(SyntaxError::new(
                self.position(),
                format!("expected {expected:?}, found {:?}", self.peek()),
            )
            .into())
        }
    }

    // --- segments ---

    fn parse_segments(&mut self) -> Result<Vec<Segment>, Error> {
        let mut segments = Vec::new();
        loop {
            match self.peek() {
                Token::DotDot => {
                    self.advance();
                    segments.push(self.parse_descendant_segment()?);
                }
                Token::Dot => {
                    self.advance();
                    segments.push(self.parse_dot_child_segment()?);
                }
                Token::LBracket => {
                    segments.push(Segment::Child(self.parse_bracket_selectors()?));
                }
                _ => break,
            }
        }
        Ok(segments)
    }

    fn parse_dot_child_segment(&mut self) -> Result<Segment, Error> {
        match self.peek().clone() {
            Token::Star => {
                self.advance();
                Ok(Segment::Child(vec![Selector::Wildcard]))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Segment::Child(vec![Selector::Name(name)]))
            }
            _ => Err(SyntaxError::new(
                self.position(),
                "expected a member name or '*' after '.'",
            )
            .into()),
        }
    }

    fn parse_descendant_segment(&mut self) -> Result<Segment, Error> {
        match self.peek().clone() {
            Token::Star => {
                self.advance();
                Ok(Segment::Descendant(vec![Selector::Wildcard]))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Segment::Descendant(vec![Selector::Name(name)]))
            }
            Token::LBracket => Ok(Segment::Descendant(self.parse_bracket_selectors()?)),
            _ => Err(SyntaxError::new(
                self.position(),
                "expected a member name, '*', or '[' after '..'",
            )
            .into()),
        }
    }

    fn parse_bracket_selectors(&mut self) -> Result<Vec<Selector>, Error> {
        self.expect(&Token::LBracket)?;
        let mut selectors = vec![self.parse_selector()?];
        while matches!(self.peek(), Token::Comma) {
            self.advance();
            selectors.push(self.parse_selector()?);
        }
        self.expect(&Token::RBracket)?;
        Ok(selectors)
    }

    fn parse_selector(&mut self) -> Result<Selector, Error> {
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Ok(Selector::Name(s))
            }
            Token::Star => {
                self.advance();
                Ok(Selector::Wildcard)
            }
            Token::Question => {
                self.advance();
                let expr = self.parse_logical_or()?;
                Ok(Selector::Filter(Filter(expr)))
            }
            Token::Colon => Ok(Selector::Slice(self.parse_slice(None)?)),
            Token::Num(n) => {
                let pos = self.position();
                let i = number_to_index(&n, pos)?;
                self.advance();
                if matches!(self.peek(), Token::Colon) {
                    Ok(Selector::Slice(self.parse_slice(Some(i))?))
                } else {
                    check_index_bounds(i, pos)?;
                    Ok(Selector::Index(i))
                }
            }
            _ => Err(SyntaxError::new(
                self.position(),
                "expected a name, index, wildcard, slice, or filter selector",
            )
            .into()),
        }
    }

    fn parse_slice(&mut self, start: Option<i64>) -> Result<Slice, Error> {
        self.expect(&Token::Colon)?;
        let mut slice = Slice::new();
        if let Some(s) = start {
            slice = slice.with_start(s);
        }
        if let Token::Num(n) = self.peek().clone() {
            let pos = self.position();
            let i = number_to_index(&n, pos)?;
            check_index_bounds(i, pos)?;
            self.advance();
            slice = slice.with_end(i);
        }
        if matches!(self.peek(), Token::Colon) {
            self.advance();
            if let Token::Num(n) = self.peek().clone() {
                let pos = self.position();
                let i = number_to_index(&n, pos)?;
                check_index_bounds(i, pos)?;
                self.advance();
                slice = slice.with_step(i);
            }
        }
        Ok(slice)
    }

    // --- filter expressions ---

    fn parse_logical_or(&mut self) -> Result<LogicalOrExpr, Error> {
        let mut ands = vec![self.parse_logical_and()?];
        while matches!(self.peek(), Token::OrOr) {
            self.advance();
            ands.push(self.parse_logical_and()?);
        }
        Ok(LogicalOrExpr(ands))
    }

    fn parse_logical_and(&mut self) -> Result<LogicalAndExpr, Error> {
        let mut basics = vec![self.parse_basic_expr()?];
        while matches!(self.peek(), Token::AndAnd) {
            self.advance();
            basics.push(self.parse_basic_expr()?);
        }
        Ok(LogicalAndExpr(basics))
    }

    fn parse_basic_expr(&mut self) -> Result<BasicExpr, Error> {
        let mut negated = false;
        while matches!(self.peek(), Token::Bang) {
            self.advance();
            negated = !negated;
        }

        if matches!(self.peek(), Token::LParen) {
            self.advance();
            let inner = self.parse_logical_or()?;
            self.expect(&Token::RParen)?;
            return Ok(if negated {
                BasicExpr::NotParen(inner)
            } else {
                BasicExpr::Paren(inner)
            });
        }

        if self.starts_literal() {
            if negated {
                return Err(
                    SyntaxError::new(self.position(), "'!' cannot be applied to a literal").into(),
                );
            }
            let lit = self.parse_literal()?;
            let op = self.try_parse_comparison_op().ok_or_else(|| {
                SyntaxError::new(self.position(), "expected a comparison operator after literal")
            })?;
            let right = self.parse_comparable()?;
            return Ok(BasicExpr::Relation(ComparisonExpr {
                left: Comparable::Literal(lit),
                op,
                right,
            }));
        }

        if self.starts_path() {
            let pos = self.position();
            let query = self.parse_path_query()?;
            if let Some(op) = self.try_parse_comparison_op() {
                if negated {
                    return Err(
                        TypeError::new(pos, "'!' cannot be applied to a comparison").into(),
                    );
                }
                let left = SingularQuery::try_from(query).map_err(|e| {
                    TypeError::new(pos, format!("comparison operand must be a singular query: {e}"))
                })?;
                let right = self.parse_comparable()?;
                return Ok(BasicExpr::Relation(ComparisonExpr {
                    left: Comparable::SingularQuery(left),
                    op,
                    right,
                }));
            }
            return Ok(if negated {
                BasicExpr::NotExist(query)
            } else {
                BasicExpr::Exist(query)
            });
        }

        if self.starts_function_call() {
            let pos = self.position();
            let func = self.parse_function_expr()?;
            if let Some(op) = self.try_parse_comparison_op() {
                if negated {
                    return Err(
                        TypeError::new(pos, "'!' cannot be applied to a comparison").into(),
                    );
                }
                if func.return_type() != ExpressionType::ValueType {
                    return Err(TypeError::new(
                        pos,
                        format!(
                            "function \"{}\" does not return ValueType and cannot be used in a comparison",
                            func.name
                        ),
                    )
                    .into());
                }
                let right = self.parse_comparable()?;
                return Ok(BasicExpr::Relation(ComparisonExpr {
                    left: Comparable::FunctionExpr(func),
                    op,
                    right,
                }));
            }
            if func.return_type() == ExpressionType::ValueType {
                return Err(TypeError::new(
                    pos,
                    format!(
                        "function \"{}\" returns ValueType and cannot be used as a filter expression on its own",
                        func.name
                    ),
                )
                .into());
            }
            return Ok(if negated {
                BasicExpr::NotFuncExpr(func)
            } else {
                BasicExpr::FuncExpr(func)
            });
        }

        Err(SyntaxError::new(self.position(), "expected a filter expression").into())
    }

    fn parse_comparable(&mut self) -> Result<Comparable, Error> {
        if self.starts_literal() {
            return Ok(Comparable::Literal(self.parse_literal()?));
        }
        if self.starts_path() {
            let pos = self.position();
            let query = self.parse_path_query()?;
            let sq = SingularQuery::try_from(query).map_err(|e| {
                TypeError::new(pos, format!("comparison operand must be a singular query: {e}"))
            })?;
            return Ok(Comparable::SingularQuery(sq));
        }
        if self.starts_function_call() {
            let pos = self.position();
            let func = self.parse_function_expr()?;
            if func.return_type() != ExpressionType::ValueType {
                return Err(TypeError::new(
                    pos,
                    format!(
                        "function \"{}\" does not return ValueType and cannot be used in a comparison",
                        func.name
                    ),
                )
                .into());
            }
            return Ok(Comparable::FunctionExpr(func));
        }
        Err(SyntaxError::new(self.position(), "expected a literal, path, or function call").into())
    }

    fn try_parse_comparison_op(&mut self) -> Option<ComparisonOperator> {
        let op = match self.peek() {
            Token::Eq => ComparisonOperator::Eq,
            Token::Ne => ComparisonOperator::Ne,
            Token::Lt => ComparisonOperator::Lt,
            Token::Le => ComparisonOperator::Le,
            Token::Gt => ComparisonOperator::Gt,
            Token::Ge => ComparisonOperator::Ge,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_literal(&mut self) -> Result<Literal, Error> {
        match self.advance().token {
            Token::Num(n) => Ok(Literal::Number(n)),
            Token::Str(s) => Ok(Literal::String(s)),
            Token::Ident(s) if s == "true" => Ok(Literal::Bool(true)),
            Token::Ident(s) if s == "false" => Ok(Literal::Bool(false)),
            Token::Ident(s) if s == "null" => Ok(Literal::Null),
            other => Err(SyntaxError::new(
                self.position(),
                format!("expected a literal, found {other:?}"),
            )
            .into()),
        }
    }

    fn parse_path_query(&mut self) -> Result<Query, Error> {
        let kind = match self.advance().token {
            Token::Root => QueryKind::Root,
            Token::Current => QueryKind::Current,
            other => {
                return Err(SyntaxError::new(
                    self.position(),
                    format!("expected '$' or '@', found {other:?}"),
                )
                .into())
            }
        };
        let segments = self.parse_segments()?;
        Ok(Query::new(kind, segments))
    }

    fn starts_literal(&self) -> bool {
        match self.peek() {
            Token::Num(_) | Token::Str(_) => true,
            Token::Ident(s) => s == "true" || s == "false" || s == "null",
            _ => false,
        }
    }

    fn starts_path(&self) -> bool {
        matches!(self.peek(), Token::Root | Token::Current)
    }

    fn starts_function_call(&self) -> bool {
        match self.peek() {
            Token::Ident(name) if !is_keyword(name) => {
                matches!(self.peek_at(1), Some(Token::LParen))
            }
            _ => false,
        }
    }

    // --- function calls ---

    fn parse_function_expr(&mut self) -> Result<FunctionExpr, Error> {
        let name_tok = self.advance();
        let name = match name_tok.token {
            Token::Ident(s) => s,
            other => {
                return Err(SyntaxError::new(
                    name_tok.position,
                    format!("expected a function name, found {other:?}"),
                )
                .into())
            }
        };
        let position = name_tok.position;
        self.expect(&Token::LParen)?;

        let ext = self
            .env
            .functions()
            .get(&name)
            .cloned()
            .ok_or_else(|| NameError::new(position, name.clone()))?;
        let expected_types = ext.arg_types().to_vec();

        let mut args = Vec::new();
        if !matches!(self.peek(), Token::RParen) {
            loop {
                let expected = expected_types.get(args.len()).copied();
                args.push(self.parse_function_arg(expected)?);
                if matches!(self.peek(), Token::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(&Token::RParen)?;

        if args.len() != expected_types.len() {
            return Err(TypeError::new(
                position,
                format!(
                    "function \"{name}\" expects {} argument(s), found {}",
                    expected_types.len(),
                    args.len()
                ),
            )
            .into());
        }

        Ok(FunctionExpr {
            name,
            args,
            return_type: ext.return_type(),
            function: FunctionExtensionHandle(ext),
        })
    }

    fn parse_function_arg(
        &mut self,
        expected: Option<ExpressionType>,
    ) -> Result<FunctionExprArg, Error> {
        match expected {
            Some(ExpressionType::ValueType) => {
                if self.starts_literal() {
                    Ok(FunctionExprArg::Literal(self.parse_literal()?))
                } else if self.starts_path() {
                    let pos = self.position();
                    let query = self.parse_path_query()?;
                    let sq = SingularQuery::try_from(query).map_err(|e| {
                        TypeError::new(
                            pos,
                            format!("function argument must be a singular query: {e}"),
                        )
                    })?;
                    Ok(FunctionExprArg::SingularQuery(sq))
                } else if self.starts_function_call() {
                    let pos = self.position();
                    let func = self.parse_function_expr()?;
                    if func.return_type() != ExpressionType::ValueType {
                        return Err(TypeError::new(
                            pos,
                            format!("function \"{}\" does not return ValueType", func.name),
                        )
                        .into());
                    }
                    Ok(FunctionExprArg::FunctionExpr(func))
                } else {
                    Err(SyntaxError::new(
                        self.position(),
                        "expected a value-typed function argument",
                    )
                    .into())
                }
            }
            Some(ExpressionType::NodesType) => {
                if self.starts_path() {
                    Ok(FunctionExprArg::FilterQuery(self.parse_path_query()?))
                } else if self.starts_function_call() {
                    let pos = self.position();
                    let func = self.parse_function_expr()?;
                    if func.return_type() != ExpressionType::NodesType {
                        return Err(TypeError::new(
                            pos,
                            format!("function \"{}\" does not return NodesType", func.name),
                        )
                        .into());
                    }
                    Ok(FunctionExprArg::FunctionExpr(func))
                } else {
                    Err(TypeError::new(
                        self.position(),
                        "expected a node-list-typed (path) function argument",
                    )
                    .into())
                }
            }
            Some(ExpressionType::LogicalType) => {
                Ok(FunctionExprArg::LogicalExpr(self.parse_logical_or()?))
            }
            None => {
                if self.starts_path() {
                    Ok(FunctionExprArg::FilterQuery(self.parse_path_query()?))
                } else if self.starts_function_call() {
                    Ok(FunctionExprArg::FunctionExpr(self.parse_function_expr()?))
                } else if self.starts_literal() {
                    Ok(FunctionExprArg::Literal(self.parse_literal()?))
                } else if matches!(self.peek(), Token::LParen | Token::Bang) {
                    Ok(FunctionExprArg::LogicalExpr(self.parse_logical_or()?))
                } else {
                    Err(SyntaxError::new(self.position(), "expected a function argument").into())
                }
            }
        }
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(name, "true" | "false" | "null")
}

fn number_to_index(n: &Number, pos: usize) -> Result<i64, Error> {
    n.as_i64()
        .ok_or_else(|| SyntaxError::new(pos, format!("expected an integer, found {n}")).into())
}

fn check_index_bounds(i: i64, pos: usize) -> Result<(), Error> {
    if (MIN_INT_INDEX..=MAX_INT_INDEX).contains(&i) {
        Ok(())
    } else {
        Err(SyntaxError::new(pos, format!("integer {i} is out of the representable range")).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env() -> Environment {
        Environment::new()
    }

    #[test]
    fn parses_simple_child_path() {
        let q = parse_query("$.a.b", &env()).unwrap();
        assert_eq!(q.to_string(), "$['a']['b']");
    }

    #[test]
    fn parses_index_and_wildcard() {
        let q = parse_query("$.a[0].*", &env()).unwrap();
        assert_eq!(q.to_string(), "$['a'][0][*]");
    }

    #[test]
    fn parses_descendant_segment() {
        let q = parse_query("$..book[0]", &env()).unwrap();
        assert_eq!(q.to_string(), "$..['book'][0]");
    }

    #[test]
    fn parses_slice() {
        let q = parse_query("$[1:5:2]", &env()).unwrap();
        assert_eq!(q.to_string(), "$[1:5:2]");
    }

    #[test]
    fn parses_filter_with_comparison() {
        let q = parse_query("$[?@.price < 10]", &env()).unwrap();
        let doc = json!({"price": 5});
        let result = q.find(&env(), &doc);
        assert!(result.is_empty());
    }

    #[test]
    fn rejects_unknown_function() {
        let err = parse_query("$[?nope(@.a)]", &env()).unwrap_err();
        assert!(matches!(err, Error::Name(_)));
    }

    #[test]
    fn rejects_non_singular_path_in_comparison() {
        let err = parse_query("$[?@.* == 1]", &env()).unwrap_err();
        assert!(matches!(err, Error::Type(_)));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse_query("$.a)", &env()).unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn nested_filter_with_count_and_comparison() {
        let doc = json!([
            {"likes": [{"location": "x"}, {}, {"location": "y"}, {"location": "z"}, {}]}
        ]);
        let q = parse_query("$[? count(@.likes[? @.location]) > 2]", &env()).unwrap();
        let result = q.find(&env(), &doc);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn canonical_print_matches_precedence() {
        let q = parse_query("$[? @.a && @.b || @.c]", &env()).unwrap();
        assert_eq!(q.to_string(), "$[?@['a'] && @['b'] || @['c']]");
    }
}
