// Age-bucket notation parser
//
// Grammar:
//   spec    := bucket (';' bucket)*
//   bucket  := (label '=')? interval
//   label   := string_literal | bare_label
//   interval:= ('[' | '(') integer ',' integer (']' | ')')

use super::ast::{Bound, BucketDef};
use super::lexer::{bare_label, integer_literal, string_literal, ws};
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{eof, opt},
    multi::separated_list1,
    sequence::terminated,
    IResult,
};

/// Parse an interval such as `[20,25]` or `(25,30]`
pub fn parse_interval(input: &str) -> IResult<&str, (Bound, Bound)> {
    let (input, open) = ws(alt((char('['), char('('))))(input)?;
    let (input, lower) = ws(integer_literal)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, upper) = ws(integer_literal)(input)?;
    let (input, close) = ws(alt((char(']'), char(')'))))(input)?;

    Ok((
        input,
        (
            Bound {
                value: lower,
                inclusive: open == '[',
            },
            Bound {
                value: upper,
                inclusive: close == ']',
            },
        ),
    ))
}

/// Parse a single, optionally labelled, bucket definition
pub fn parse_bucket(input: &str) -> IResult<&str, BucketDef> {
    let (input, label) = opt(terminated(
        ws(alt((string_literal, bare_label))),
        char('='),
    ))(input)?;
    let (input, (lower, upper)) = parse_interval(input)?;

    Ok((
        input,
        BucketDef {
            label,
            lower,
            upper,
        },
    ))
}

/// Parse a complete bucket list; the whole input must be consumed
pub fn parse_bucket_list(input: &str) -> IResult<&str, Vec<BucketDef>> {
    let (input, defs) = separated_list1(ws(char(';')), parse_bucket)(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, defs))
}

/// Convenience wrapper that maps nom errors to a readable message
pub fn parse_bucket_spec(input: &str) -> Result<Vec<BucketDef>, String> {
    parse_bucket_list(input)
        .map(|(_, defs)| defs)
        .map_err(|e| match e {
            nom::Err::Error(inner) | nom::Err::Failure(inner) => {
                if inner.input.is_empty() {
                    format!("unexpected end of input in '{}'", input)
                } else {
                    format!("unexpected '{}' in '{}'", inner.input, input)
                }
            }
            nom::Err::Incomplete(_) => format!("incomplete bucket list '{}'", input),
        })
}
