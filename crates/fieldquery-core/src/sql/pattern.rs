//! Pattern-match translation, one table for every dialect.
//!
//! | kind        | bound LIKE param | CONCAT form              | GLOB param |
//! |-------------|------------------|--------------------------|------------|
//! | contains    | `%v%`            | `CONCAT('%', :p, '%')`   | `*v*`      |
//! | starts-with | `v%`             | `CONCAT(:p, '%')`        | `v*`       |
//! | ends-with   | `%v`             | `CONCAT('%', :p)`        | `*v`       |
//! | equals      | `=` / `<>` comparison on all dialects                 |
//!
//! `v` is the value with the dialect's wildcards escaped. Case-insensitive
//! patterns wrap both operands in `LOWER()`, negated ones use `NOT LIKE` /
//! `NOT GLOB` / `<>`.

use crate::condition::{PatternKind, PatternMatch};
use crate::value::Value;

use super::platform::{PatternStyle, Platform};

/// Escape character used in every generated `LIKE`.
pub const LIKE_ESCAPE: char = '\\';

/// Escapes `%`, `_` and the escape character itself.
#[must_use]
pub fn escape_like(value: &str, escape: char) -> String {
    let mut escaped = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if c == '%' || c == '_' || c == escape {
            escaped.push(escape);
        }
        escaped.push(c);
    }
    escaped
}

/// Builds a complete `LIKE` pattern with `%` markers placed for `kind`.
///
/// Equality patterns have no wildcards and are returned escaped as-is.
#[must_use]
pub fn like_pattern(kind: PatternKind, value: &str, escape: char) -> String {
    let escaped = escape_like(value, escape);
    match kind {
        PatternKind::Contains => format!("%{escaped}%"),
        PatternKind::StartsWith => format!("{escaped}%"),
        PatternKind::EndsWith => format!("%{escaped}"),
        PatternKind::Equals => escaped,
    }
}

/// Escapes glob metacharacters by wrapping them in a character class.
fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        match c {
            '*' | '?' | '[' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

fn glob_pattern(kind: PatternKind, value: &str) -> String {
    let escaped = escape_glob(value);
    match kind {
        PatternKind::Contains => format!("*{escaped}*"),
        PatternKind::StartsWith => format!("{escaped}*"),
        PatternKind::EndsWith => format!("*{escaped}"),
        PatternKind::Equals => escaped,
    }
}

/// SQL for one pattern and the value to bind to its placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternSql {
    pub sql: String,
    pub parameter: Value,
}

pub(crate) fn pattern_predicate(
    platform: Platform,
    column: &str,
    placeholder: &str,
    pattern: &PatternMatch,
) -> PatternSql {
    let (column, operand) = if pattern.case_insensitive {
        (format!("LOWER({column})"), format!("LOWER({placeholder})"))
    } else {
        (column.to_string(), placeholder.to_string())
    };
    let not = if pattern.negated { "NOT " } else { "" };

    if pattern.kind == PatternKind::Equals {
        let operator = if pattern.negated { "<>" } else { "=" };
        return PatternSql {
            sql: format!("{column} {operator} {operand}"),
            parameter: Value::Text(pattern.value.clone()),
        };
    }

    match platform.pattern_style(pattern.case_insensitive) {
        PatternStyle::BoundLike => PatternSql {
            sql: format!(
                "{column} {not}LIKE {operand}{}",
                platform.like_escape_clause()
            ),
            parameter: Value::Text(like_pattern(pattern.kind, &pattern.value, LIKE_ESCAPE)),
        },
        PatternStyle::ConcatLike => {
            let concat = match pattern.kind {
                PatternKind::StartsWith => format!("CONCAT({operand}, '%')"),
                PatternKind::EndsWith => format!("CONCAT('%', {operand})"),
                PatternKind::Contains | PatternKind::Equals => {
                    format!("CONCAT('%', {operand}, '%')")
                }
            };
            PatternSql {
                sql: format!("{column} {not}LIKE {concat}{}", platform.like_escape_clause()),
                parameter: Value::Text(escape_like(&pattern.value, LIKE_ESCAPE)),
            }
        }
        PatternStyle::Glob => PatternSql {
            sql: format!("{column} {not}GLOB {operand}"),
            parameter: Value::Text(glob_pattern(pattern.kind, &pattern.value)),
        },
    }
}
