//! Syntax errors of query input.

use std::fmt;

use crate::condition::{params, ConditionErrorMessage};

/// Malformed input, located by 1-based line and column when the input is
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Kind of error.
    pub kind: SyntaxErrorKind,
    /// Line and column of the offending token; `None` for already decoded
    /// documents, which have no textual position.
    pub position: Option<(usize, usize)>,
    /// What the parser would have accepted; empty for "unexpected" errors.
    pub expected: Vec<String>,
    /// Description of what was found.
    pub got: String,
}

impl SyntaxError {
    /// Creates an "expected X, got Y" error.
    #[must_use]
    pub fn expected(line: usize, column: usize, expected: &[&str], got: impl Into<String>) -> Self {
        Self {
            kind: SyntaxErrorKind::UnexpectedToken,
            position: Some((line, column)),
            expected: expected.iter().map(ToString::to_string).collect(),
            got: got.into(),
        }
    }

    /// Creates an "unexpected Y" error of the given kind.
    #[must_use]
    pub fn unexpected(
        kind: SyntaxErrorKind,
        line: usize,
        column: usize,
        got: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            position: Some((line, column)),
            expected: Vec::new(),
            got: got.into(),
        }
    }

    /// Creates an "unexpected Y" error with no position.
    #[must_use]
    pub fn unlocated(kind: SyntaxErrorKind, got: impl Into<String>) -> Self {
        Self {
            kind,
            position: None,
            expected: Vec::new(),
            got: got.into(),
        }
    }

    /// Overrides the kind.
    #[must_use]
    pub fn with_kind(mut self, kind: SyntaxErrorKind) -> Self {
        self.kind = kind;
        self
    }

    fn expected_list(&self) -> String {
        match self.expected.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [init @ .., last] => format!("{} or {last}", init.join(", ")),
        }
    }

    fn template(&self) -> String {
        let location = if self.position.is_some() {
            "Line {{ line }}, Column {{ column }}: "
        } else {
            ""
        };
        let body = if self.expected.is_empty() {
            "Unexpected {{ got }}."
        } else {
            "Expected {{ expected }}, got {{ got }}."
        };
        format!("[Syntax Error] {location}{body}")
    }

    /// Converts the error into a reportable message at the root path.
    #[must_use]
    pub fn to_message(&self) -> ConditionErrorMessage {
        let mut parameters = params([("got", self.got.clone())]);
        if let Some((line, column)) = self.position {
            parameters.insert("line".to_string(), line.to_string());
            parameters.insert("column".to_string(), column.to_string());
        }
        if !self.expected.is_empty() {
            parameters.insert("expected".to_string(), self.expected_list());
        }
        ConditionErrorMessage::new("", self.template(), parameters)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Syntax Error] ")?;
        if let Some((line, column)) = self.position {
            write!(f, "Line {line}, Column {column}: ")?;
        }
        if self.expected.is_empty() {
            write!(f, "Unexpected {}.", self.got)
        } else {
            write!(f, "Expected {}, got {}.", self.expected_list(), self.got)
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Kind of syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Token not valid at this point (E001).
    UnexpectedToken,
    /// Quoted value without closing quote (E002).
    UnterminatedString,
    /// `~` not followed by a valid pattern type (E003).
    InvalidPattern,
    /// Input is not well-formed JSON or has the wrong structure (E004).
    InvalidJson,
}

impl SyntaxErrorKind {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedToken => "E001",
            Self::UnterminatedString => "E002",
            Self::InvalidPattern => "E003",
            Self::InvalidJson => "E004",
        }
    }
}
