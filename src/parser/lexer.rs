// Lexical helpers shared by the widget parsers

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{map, map_res, opt, recognize},
    multi::many0_count,
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

/// Bare column or keyword name: letter or underscore, then alphanumerics or underscores
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )),
        String::from,
    )(input)
}

/// Double- or single-quoted text without escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        delimited(char('"'), quoted_body("\""), char('"')),
        delimited(char('\''), quoted_body("'"), char('\'')),
    ))(input)
}

fn quoted_body<'a>(quote: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    map(opt(is_not(quote)), |body: Option<&str>| {
        body.unwrap_or_default().to_string()
    })
}

pub fn unsigned_literal(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}
