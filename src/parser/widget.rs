// Widget expression parser
// Format: kind(key: value, ...) | kind(...) | ...

use super::ast::WidgetDecl;
use super::lexer::{identifier, string_literal, unsigned_literal, ws};
use crate::aggregate::{AggregationKind, RowLimit};
use crate::config::{SettingsPatch, WidgetKind};
use anyhow::{anyhow, Result};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{eof, map, map_res, value},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated},
    IResult,
};

#[derive(Debug, Clone, PartialEq)]
enum WidgetArg {
    X(Vec<String>),
    Y(Vec<String>),
    Aggregation(AggregationKind),
    Limit(RowLimit),
    DualAxis(bool),
    Color(String),
    Title(String),
}

/// `key:` with optional whitespace around the colon
fn key<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(ws(tag(name)), ws(char(':')))
}

fn field_name(input: &str) -> IResult<&str, String> {
    alt((string_literal, identifier))(input)
}

/// A single field or a bracketed list: `sales` or `[sales, "unit cost"]`
fn field_list(input: &str) -> IResult<&str, Vec<String>> {
    alt((
        delimited(
            ws(char('[')),
            separated_list1(ws(char(',')), ws(field_name)),
            ws(char(']')),
        ),
        map(ws(field_name), |field| vec![field]),
    ))(input)
}

fn row_limit(input: &str) -> IResult<&str, RowLimit> {
    alt((
        value(RowLimit::Unbounded, tag("all")),
        map(unsigned_literal, RowLimit::from),
    ))(input)
}

fn boolean(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("true")), value(false, tag("false"))))(input)
}

fn parse_arg(input: &str) -> IResult<&str, WidgetArg> {
    alt((
        map(preceded(key("x"), field_list), WidgetArg::X),
        map(preceded(key("y"), field_list), WidgetArg::Y),
        map(
            preceded(key("agg"), ws(map_res(identifier, |s: String| s.parse::<AggregationKind>()))),
            WidgetArg::Aggregation,
        ),
        map(preceded(key("limit"), ws(row_limit)), WidgetArg::Limit),
        map(preceded(key("dual_axis"), ws(boolean)), WidgetArg::DualAxis),
        map(preceded(key("color"), ws(string_literal)), WidgetArg::Color),
        map(preceded(key("title"), ws(string_literal)), WidgetArg::Title),
    ))(input)
}

/// Parse one widget
/// Format: bar() or bar(x: city, y: [sales, cost], agg: avg, limit: 10)
pub fn parse_widget(input: &str) -> IResult<&str, WidgetDecl> {
    let (input, kind) = ws(map_res(identifier, |s: String| s.parse::<WidgetKind>()))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), parse_arg)(input)?;
    let (input, _) = ws(char(')'))(input)?;

    // Repeated keys: last one wins
    let mut patch = SettingsPatch::default();
    for arg in args {
        match arg {
            WidgetArg::X(fields) => patch.x_fields = Some(fields),
            WidgetArg::Y(fields) => patch.y_fields = Some(fields),
            WidgetArg::Aggregation(kind) => patch.aggregation = Some(kind),
            WidgetArg::Limit(limit) => patch.row_limit = Some(limit),
            WidgetArg::DualAxis(dual) => patch.dual_axis = Some(dual),
            WidgetArg::Color(color) => patch.color = Some(color),
            WidgetArg::Title(title) => patch.title = Some(title),
        }
    }

    Ok((input, WidgetDecl { kind, patch }))
}

/// Parse a full dashboard: widget | widget | ...
pub fn parse_widgets(input: &str) -> IResult<&str, Vec<WidgetDecl>> {
    let (input, widgets) = separated_list1(ws(char('|')), parse_widget)(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, widgets))
}

/// Parse a dashboard expression, converting nom errors for the CLI
pub fn parse_dashboard(input: &str) -> Result<Vec<WidgetDecl>> {
    match parse_widgets(input) {
        Ok((_, widgets)) => Ok(widgets),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(anyhow!(
            "Parse error near '{}'",
            e.input.chars().take(30).collect::<String>()
        )),
        Err(nom::Err::Incomplete(_)) => Err(anyhow!("Parse error: incomplete input")),
    }
}
