//! String query processor.
//!
//! The syntax lives in `query.pest`; this module walks the parse tree into
//! the [`StructureBuilder`] and turns pest errors into [`SyntaxError`]s.
//!
//! Example: `id: 1, 5..10, !7; *(name: ~i*john; name: ~>doe)`

use pest::error::{ErrorVariant, InputLocation, LineColLocation};
use pest::iterators::Pair;
use pest::Parser as PestParser;
use pest_derive::Parser;

use crate::condition::{CompareOp, Logical, PatternKind, PatternMatch, SearchCondition, ValuesGroup};

use super::structure::{GroupPath, RawValue, StructureBuilder};
use super::syntax_error::{SyntaxError, SyntaxErrorKind};
use super::{InputProcessor, ProcessorConfig};

#[derive(Parser)]
#[grammar = "input/query.pest"]
struct QueryParser;

/// Deepest group nesting the parser accepts, whatever the configured limit.
const MAX_PARSE_DEPTH: usize = 64;

/// Processes the string query syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringQueryInput;

impl StringQueryInput {
    /// Creates the processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl InputProcessor for StringQueryInput {
    fn process(&self, config: &ProcessorConfig, input: &str) -> SearchCondition {
        tracing::debug!(
            field_set = config.field_set().name(),
            length = input.len(),
            "processing string query"
        );

        let mut builder = StructureBuilder::new(config);
        let mut root = ValuesGroup::new();

        match parse_query(input) {
            Ok(query) => walk_query(&mut builder, query, &mut root),
            Err(error) => {
                tracing::debug!(code = error.kind.code(), %error, "syntax error");
                builder.add_error(error.to_message());
                root.mark_errors();
            }
        }

        builder.finish(root)
    }
}

pub(super) fn parse_query(input: &str) -> Result<Pair<'_, Rule>, SyntaxError> {
    check_depth(input)?;
    QueryParser::parse(Rule::query, input)
        .map_err(|error| syntax_error(input, &error))?
        .next()
        .ok_or_else(|| {
            SyntaxError::unexpected(SyntaxErrorKind::UnexpectedToken, 1, 1, "end of input")
        })
}

/// Rejects inputs nesting groups deeper than [`MAX_PARSE_DEPTH`] before
/// the recursive parser sees them.
fn check_depth(input: &str) -> Result<(), SyntaxError> {
    let mut depth = 0usize;
    let mut quoted = false;
    let (mut line, mut column) = (1, 0);

    for c in input.chars() {
        if c == '\n' {
            line += 1;
            column = 0;
            continue;
        }
        column += 1;
        match c {
            '"' => quoted = !quoted,
            '(' if !quoted => {
                depth += 1;
                if depth > MAX_PARSE_DEPTH {
                    return Err(SyntaxError::unexpected(
                        SyntaxErrorKind::UnexpectedToken,
                        line,
                        column,
                        format!("group nesting deeper than {MAX_PARSE_DEPTH} levels"),
                    ));
                }
            }
            ')' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

// ========== Parse tree ==========

fn walk_query(builder: &mut StructureBuilder<'_>, query: Pair<'_, Rule>, root: &mut ValuesGroup) {
    for pair in query.into_inner() {
        match pair.as_rule() {
            Rule::root_or => root.set_logical(Logical::Or),
            Rule::group_body => walk_body(builder, pair, root, &GroupPath::root()),
            _ => {}
        }
    }
}

fn walk_body(
    builder: &mut StructureBuilder<'_>,
    body: Pair<'_, Rule>,
    group: &mut ValuesGroup,
    at: &GroupPath,
) {
    for item in body.into_inner() {
        match item.as_rule() {
            Rule::field => walk_field(builder, item, group, at),
            Rule::group => walk_group(builder, item, group, at),
            _ => {}
        }
    }
}

fn walk_group(
    builder: &mut StructureBuilder<'_>,
    pair: Pair<'_, Rule>,
    parent: &mut ValuesGroup,
    at: &GroupPath,
) {
    let mut logical = Logical::And;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::or_marker => logical = Logical::Or,
            Rule::group_body => {
                // A refused group (limits) is dropped with its content.
                if let Some(child_at) = builder.open_group(parent, at) {
                    let child = parent.add_group(ValuesGroup::with_logical(logical));
                    walk_body(builder, part, child, &child_at);
                }
            }
            _ => {}
        }
    }
}

fn walk_field(
    builder: &mut StructureBuilder<'_>,
    pair: Pair<'_, Rule>,
    group: &mut ValuesGroup,
    at: &GroupPath,
) {
    let mut parts = pair.into_inner();
    let Some(name) = parts.next().map(|p| p.as_str()) else {
        return;
    };
    if !builder.accept_field(group, at, name) {
        return;
    }

    for value in parts.filter(|p| !matches!(p.as_rule(), Rule::colon | Rule::comma)) {
        if let Some(raw) = raw_value(value) {
            builder.add_value(group, at, name, raw);
        }
    }
}

fn raw_value(pair: Pair<'_, Rule>) -> Option<RawValue> {
    match pair.as_rule() {
        Rule::excluded => {
            let inner = pair.into_inner().next()?;
            match inner.as_rule() {
                Rule::range => range_value(inner, true),
                _ => Some(RawValue::Excluded(literal(inner.into_inner().next()?))),
            }
        }
        Rule::range => range_value(pair, false),
        Rule::comparison => {
            let mut parts = pair.into_inner();
            let operator = CompareOp::from_symbol(parts.next()?.as_str())?;
            Some(RawValue::Compare(operator, literal(parts.next()?)))
        }
        Rule::pattern => {
            let mut parts = pair.into_inner();
            let op = parts.next()?;
            let text = op.as_str();
            let kind = PatternKind::from_symbol(text.chars().last()?)?;
            let mut pattern = PatternMatch::new(kind, literal(parts.next()?));
            pattern.case_insensitive = text.contains('i');
            pattern.negated = text.contains('!');
            Some(RawValue::Pattern(pattern))
        }
        _ => Some(RawValue::Simple(literal(pair.into_inner().next()?))),
    }
}

/// Bounds are inclusive unless written `]lower` or `upper[`.
fn range_value(pair: Pair<'_, Rule>, excluded: bool) -> Option<RawValue> {
    let text = pair.as_str().trim_end();
    let inclusive_lower = !text.starts_with(']');
    let inclusive_upper = !text.ends_with('[');

    let mut bounds = pair.into_inner();
    let lower = literal(bounds.next()?);
    let upper = literal(bounds.next()?);
    Some(RawValue::Range {
        lower,
        upper,
        inclusive_lower,
        inclusive_upper,
        excluded,
    })
}

/// Text of a `bare` or `quoted` literal, `""` unescaped.
fn literal(pair: Pair<'_, Rule>) -> String {
    match pair.as_rule() {
        Rule::quoted => pair
            .into_inner()
            .next()
            .map(|text| text.as_str().replace("\"\"", "\""))
            .unwrap_or_default(),
        _ => pair.as_str().to_string(),
    }
}

// ========== Errors ==========

fn syntax_error(input: &str, error: &pest::error::Error<Rule>) -> SyntaxError {
    let pos = match error.location {
        InputLocation::Pos(pos) | InputLocation::Span((pos, _)) => pos,
    };
    let (line, column) = match error.line_col {
        LineColLocation::Pos(at) | LineColLocation::Span(at, _) => at,
    };

    if is_unterminated_quote(&input[pos..]) {
        return SyntaxError::unexpected(
            SyntaxErrorKind::UnterminatedString,
            line,
            column,
            "unterminated quoted value",
        );
    }

    let positives: &[Rule] = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } => positives.as_slice(),
        ErrorVariant::CustomError { .. } => &[],
    };
    let mut expected: Vec<&str> = Vec::new();
    for label in positives.iter().flat_map(|rule| expected_labels(*rule).iter().copied()) {
        if !expected.contains(&label) {
            expected.push(label);
        }
    }

    if positives.contains(&Rule::pattern_kind) {
        let got = input[pos..]
            .chars()
            .next()
            .map_or_else(|| "end of input".to_string(), |c| format!("'{c}'"));
        return SyntaxError::expected(line, column, &expected, got)
            .with_kind(SyntaxErrorKind::InvalidPattern);
    }

    let got = describe(&input[pos..]);
    if expected.is_empty() {
        SyntaxError::unexpected(SyntaxErrorKind::UnexpectedToken, line, column, got)
    } else {
        SyntaxError::expected(line, column, &expected, got)
    }
}

/// How a rule is named in "Expected ..." messages; end of input and the
/// root `*` are never worth suggesting.
const fn expected_labels(rule: Rule) -> &'static [&'static str] {
    match rule {
        Rule::query => &["field name", "'('"],
        Rule::field | Rule::field_name => &["field name"],
        Rule::group | Rule::or_marker | Rule::group_open => &["'('"],
        Rule::group_close => &["')'"],
        Rule::colon => &["':'"],
        Rule::comma => &["','"],
        Rule::semicolon => &["';'"],
        Rule::pattern_kind => &["'*'", "'>'", "'<'", "'='"],
        Rule::excluded
        | Rule::range
        | Rule::simple
        | Rule::comparison
        | Rule::compare_op
        | Rule::pattern
        | Rule::pattern_op
        | Rule::quoted
        | Rule::quoted_text
        | Rule::bare => &["value"],
        _ => &[],
    }
}

/// `"` opening a value that runs to the end of input.
fn is_unterminated_quote(rest: &str) -> bool {
    let Some(body) = rest.strip_prefix('"') else {
        return false;
    };
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
            } else {
                return false;
            }
        }
    }
    true
}

/// Token found at an error position.
fn describe(rest: &str) -> String {
    if rest.is_empty() {
        return "end of input".to_string();
    }
    if let Some(symbol) = ["..", "<>", "<=", ">="].into_iter().find(|s| rest.starts_with(s)) {
        return format!("'{symbol}'");
    }
    match QueryParser::parse(Rule::bare, rest) {
        Ok(pairs) => format!("\"{}\"", pairs.as_str()),
        Err(_) => rest
            .chars()
            .next()
            .map_or_else(String::new, |c| format!("'{c}'")),
    }
}

/// Returns `true` if `text` can be written without quotes and reads back
/// as the same single literal, also as a range bound.
pub(crate) fn is_bare_literal(text: &str) -> bool {
    !text.starts_with('.')
        && !text.ends_with('.')
        && QueryParser::parse(Rule::bare, text).is_ok_and(|pairs| pairs.as_str() == text)
}
