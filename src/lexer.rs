//! Tokenizes a JSONPath query string ahead of parsing.
//!
//! The scanning primitives for string and number literals are `nom`
//! combinators, the same building blocks a combinator-based parser would use
//! directly; here they feed a single up-front pass that produces a flat
//! [`Token`] stream for the recursive-descent parser to consume.

use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::{char, digit0, digit1, multispace0, one_of, satisfy};
use nom::combinator::{map, map_res, opt, recognize, value};
use nom::multi::fold_many0;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;
use serde_json::Number;

use crate::error::SyntaxError;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Root,
    Current,
    Dot,
    DotDot,
    Star,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Colon,
    Question,
    Bang,
    AndAnd,
    OrOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// A bare identifier: a member-name shorthand, a function name, or one
    /// of the keywords `true`, `false`, `null` (disambiguated by the
    /// parser, based on grammatical position).
    Ident(String),
    /// A quoted string literal, already unescaped.
    Str(String),
    /// A numeric literal.
    Num(Number),
    Eof,
}

/// A positioned token, as emitted by [`tokenize`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub(crate) token: Token,
    pub(crate) position: usize,
}

/// Tokenizes an entire query string, returning a stream terminated by
/// [`Token::Eof`], or a [`SyntaxError`] at the first unrecognized input.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut rest = input;
    loop {
        let (next, _) = multispace0::<_, nom::error::Error<&str>>(rest)
            .map_err(|_| SyntaxError::new(input.len() - rest.len(), "unreachable whitespace error"))?;
        rest = next;
        let position = input.len() - rest.len();
        if rest.is_empty() {
            tokens.push(Spanned {
                token: Token::Eof,
                position,
            });
            return Ok(tokens);
        }
        let (next, token) = scan_one(rest)
            .map_err(|_| SyntaxError::new(position, format!("unrecognized input near `{}`", preview(rest))))?;
        tokens.push(Spanned { token, position });
        rest = next;
    }
}

fn preview(input: &str) -> &str {
    let end = input.char_indices().nth(16).map(|(i, _)| i).unwrap_or(input.len());
    &input[..end]
}

type PResult<'a, O> = IResult<&'a str, O>;

fn scan_one(input: &str) -> PResult<'_, Token> {
    alt((
        value(Token::DotDot, tag("..")),
        value(Token::AndAnd, tag("&&")),
        value(Token::OrOr, tag("||")),
        value(Token::Eq, tag("==")),
        value(Token::Ne, tag("!=")),
        value(Token::Le, tag("<=")),
        value(Token::Ge, tag(">=")),
        value(Token::Root, char('$')),
        value(Token::Current, char('@')),
        value(Token::Dot, char('.')),
        value(Token::Star, char('*')),
        value(Token::LBracket, char('[')),
        value(Token::RBracket, char(']')),
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::Comma, char(',')),
        value(Token::Colon, char(':')),
        value(Token::Question, char('?')),
        value(Token::Bang, char('!')),
        value(Token::Lt, char('<')),
        value(Token::Gt, char('>')),
        map(parse_number, Token::Num),
        map(parse_string_literal, Token::Str),
        map(parse_ident, Token::Ident),
    ))(input)
}

fn is_name_first(c: char) -> bool {
    c == '_' || c.is_alphabetic() || (c as u32) >= 0x80
}

fn is_name_char(c: char) -> bool {
    is_name_first(c) || c.is_ascii_digit()
}

fn parse_ident(input: &str) -> PResult<'_, String> {
    map(
        recognize(pair(
            satisfy(is_name_first),
            nom::bytes::complete::take_while(is_name_char),
        )),
        |s: &str| s.to_owned(),
    )(input)
}

// --- numbers ---

fn is_non_zero_digit(chr: char) -> bool {
    ('1'..='9').contains(&chr)
}

fn parse_zero(input: &str) -> PResult<'_, &str> {
    tag("0")(input)
}

fn parse_non_zero_first_digit(input: &str) -> PResult<'_, &str> {
    take_while_m_n(1, 1, is_non_zero_digit)(input)
}

fn parse_non_zero_int(input: &str) -> PResult<'_, &str> {
    recognize(tuple((opt(char('-')), parse_non_zero_first_digit, digit0)))(input)
}

fn parse_int_string(input: &str) -> PResult<'_, &str> {
    alt((parse_zero, parse_non_zero_int))(input)
}

fn parse_fractional(input: &str) -> PResult<'_, &str> {
    preceded(char('.'), digit1)(input)
}

fn parse_exponent(input: &str) -> PResult<'_, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("-+")), digit0)))(input)
}

fn parse_number_string(input: &str) -> PResult<'_, &str> {
    recognize(tuple((
        alt((parse_int_string, tag("-0"))),
        opt(parse_fractional),
        opt(parse_exponent),
    )))(input)
}

fn parse_number(input: &str) -> PResult<'_, Number> {
    map_res(parse_number_string, Number::from_str)(input)
}

// --- strings ---

#[derive(Clone, Copy)]
enum Quotes {
    Single,
    Double,
}

fn parse_n_hex_digits(n: usize) -> impl Fn(&str) -> PResult<'_, u32> {
    move |input| {
        map_res(take_while_m_n(n, n, |c: char| c.is_ascii_hexdigit()), |s| {
            u32::from_str_radix(s, 16)
        })(input)
    }
}

fn parse_non_surrogate(input: &str) -> PResult<'_, char> {
    map_res(
        nom::combinator::verify(parse_n_hex_digits(4), |cp| !(0xD800..=0xDFFF).contains(cp)),
        |cp| char::from_u32(cp).ok_or(()),
    )(input)
}

fn parse_high_surrogate(input: &str) -> PResult<'_, u32> {
    nom::combinator::verify(parse_n_hex_digits(4), |cp| (0xD800..=0xDBFF).contains(cp))(input)
}

fn parse_low_surrogate(input: &str) -> PResult<'_, u32> {
    nom::combinator::verify(parse_n_hex_digits(4), |cp| (0xDC00..=0xDFFF).contains(cp))(input)
}

fn parse_surrogate_pair(input: &str) -> PResult<'_, char> {
    map_res(
        pair(
            preceded(char('u'), parse_high_surrogate),
            preceded(tag("\\u"), parse_low_surrogate),
        ),
        |(high, low)| {
            String::from_utf16(&[high as u16, low as u16])
                .ok()
                .and_then(|s| s.chars().next())
                .ok_or(())
        },
    )(input)
}

fn parse_hex_char(input: &str) -> PResult<'_, char> {
    alt((
        preceded(char('u'), parse_non_surrogate),
        parse_surrogate_pair,
    ))(input)
}

fn parse_escaped_quote(quotes: Quotes) -> impl Fn(&str) -> PResult<'_, char> {
    move |input| match quotes {
        Quotes::Single => value('\'', char('\''))(input),
        Quotes::Double => value('"', char('"'))(input),
    }
}

fn parse_escaped_char(quotes: Quotes) -> impl Fn(&str) -> PResult<'_, char> {
    move |input| {
        preceded(
            char('\\'),
            alt((
                value('\u{08}', char('b')),
                value('\t', char('t')),
                value('\n', char('n')),
                value('\u{0C}', char('f')),
                value('\r', char('r')),
                value('/', char('/')),
                value('\\', char('\\')),
                parse_escaped_quote(quotes),
                parse_hex_char,
            )),
        )(input)
    }
}

fn is_valid_unescaped_char(quotes: Quotes) -> impl Fn(char) -> bool {
    move |c| {
        let active_quote = match quotes {
            Quotes::Single => '\'',
            Quotes::Double => '"',
        };
        c != active_quote && c != '\\' && !('\u{0}'..='\u{1F}').contains(&c)
    }
}

fn parse_unescaped(quotes: Quotes) -> impl Fn(&str) -> PResult<'_, &str> {
    move |input| nom::bytes::complete::take_while1(is_valid_unescaped_char(quotes))(input)
}

fn parse_internal(quotes: Quotes) -> impl Fn(&str) -> PResult<'_, String> {
    move |input| {
        fold_many0(
            alt((
                map(parse_unescaped(quotes), |s: &str| s.to_owned()),
                map(parse_escaped_char(quotes), |c| c.to_string()),
            )),
            String::new,
            |mut acc, fragment| {
                acc.push_str(&fragment);
                acc
            },
        )(input)
    }
}

fn parse_single_quoted(input: &str) -> PResult<'_, String> {
    delimited(char('\''), parse_internal(Quotes::Single), char('\''))(input)
}

fn parse_double_quoted(input: &str) -> PResult<'_, String> {
    delimited(char('"'), parse_internal(Quotes::Double), char('"'))(input)
}

fn parse_string_literal(input: &str) -> PResult<'_, String> {
    alt((parse_single_quoted, parse_double_quoted))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn simple_path() {
        assert_eq!(
            kinds("$.store.book[0]"),
            vec![
                Token::Root,
                Token::Dot,
                Token::Ident("store".into()),
                Token::Dot,
                Token::Ident("book".into()),
                Token::LBracket,
                Token::Num(Number::from(0)),
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn descendant_and_filter() {
        let toks = kinds("$..book[?@.price<10]");
        assert!(toks.contains(&Token::DotDot));
        assert!(toks.contains(&Token::Question));
        assert!(toks.contains(&Token::Lt));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds("'o\\'brien'"),
            vec![Token::Str("o'brien".into()), Token::Eof]
        );
    }

    #[test]
    fn rejects_control_chars_unescaped() {
        assert!(tokenize("'\u{0}'").is_err());
    }

    #[test]
    fn two_char_operators_before_one_char() {
        assert_eq!(
            kinds("1<=2"),
            vec![
                Token::Num(Number::from(1)),
                Token::Le,
                Token::Num(Number::from(2)),
                Token::Eof,
            ]
        );
    }
}
