// Lexical helpers shared by the bucket notation parsers

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{map_res, opt, recognize},
    sequence::{delimited, pair},
    IResult,
};

/// Wrap a parser so it skips surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Signed integer literal
pub fn integer_literal(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>)(input)
}

/// Double-quoted string literal (no escapes)
pub fn string_literal(input: &str) -> IResult<&str, String> {
    let (input, s) = delimited(char('"'), take_while(|c| c != '"'), char('"'))(input)?;
    Ok((input, s.to_string()))
}

/// Bare label such as `20-25`, `teen` or `65+`
pub fn bare_label(input: &str) -> IResult<&str, String> {
    let (input, s) = take_while1(|c: char| c.is_alphanumeric() || "-_+<>.".contains(c))(input)?;
    Ok((input, s.to_string()))
}
