//! Error types for `fieldquery`.
//!
//! Only programmer and configuration mistakes are `Err` values. Problems in
//! end-user input never unwind: they are collected as
//! [`ConditionErrorMessage`](crate::condition::ConditionErrorMessage)s on the
//! processed condition.
//!
//! Error codes follow the pattern `FQ-XXX`.

use thiserror::Error;

/// Result type alias for `fieldquery` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and API-misuse errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Field is not part of the field set (FQ-001).
    #[error("[FQ-001] Field '{field}' is not registered in field set '{field_set}'")]
    UnknownField {
        /// Requested field name.
        field: String,
        /// Field set that was searched.
        field_set: String,
    },

    /// Two fields with the same name (FQ-002).
    #[error("[FQ-002] Field '{field}' is already registered in field set '{field_set}'")]
    DuplicateField {
        /// Duplicated field name.
        field: String,
        /// Field set being built.
        field_set: String,
    },

    /// No type registered under the name (FQ-003).
    #[error("[FQ-003] Field type '{0}' is not registered")]
    UnknownType(String),

    /// Invalid configuration value (FQ-004).
    #[error("[FQ-004] Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },

    /// Configuration could not be parsed (FQ-005).
    #[error("[FQ-005] Failed to parse configuration: {0}")]
    Parse(String),

    /// A value given to the condition builder was rejected (FQ-006).
    #[error("[FQ-006] Invalid value for field '{field}': {message}")]
    InvalidFieldValue {
        /// Field name.
        field: String,
        /// Rendered transformer message.
        message: String,
    },

    /// The field does not accept this kind of value (FQ-007).
    #[error("[FQ-007] Field '{field}' does not accept {kind}")]
    UnsupportedValueKind {
        /// Field name.
        field: String,
        /// Rejected kind, e.g. "ranges".
        kind: String,
    },

    /// A range whose lower bound is not below its upper bound (FQ-008).
    #[error("[FQ-008] Invalid range for field '{field}': {message}")]
    InvalidRange {
        /// Field name.
        field: String,
        /// Rendered ordering message.
        message: String,
    },
}

/// Errors raised while translating a condition into a backend query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// No column mapping for a field used by the condition (FQ-020).
    #[error("[FQ-020] No column mapping for field '{0}'")]
    UnmappedField(String),

    /// The condition still carries input errors (FQ-021).
    #[error("[FQ-021] Cannot generate a query for an invalid condition ({0} error(s))")]
    InvalidCondition(usize),

    /// Conversion cannot be expressed on this platform (FQ-022).
    #[error("[FQ-022] Conversion '{conversion}' for field '{field}' is not supported on platform '{platform}'")]
    UnsupportedConversion {
        /// Field name.
        field: String,
        /// Conversion name.
        conversion: String,
        /// Platform name.
        platform: String,
    },
}

/// Top-level error aggregating all module errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (FQ-0xx).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Query generation error (FQ-02x).
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// IO error (FQ-090).
    #[error("[FQ-090] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (FQ-091).
    #[error("[FQ-091] Serialization error: {0}")]
    Serialization(String),
}

impl ConfigError {
    /// Returns the error code (e.g., "FQ-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownField { .. } => "FQ-001",
            Self::DuplicateField { .. } => "FQ-002",
            Self::UnknownType(_) => "FQ-003",
            Self::InvalidValue { .. } => "FQ-004",
            Self::Parse(_) => "FQ-005",
            Self::InvalidFieldValue { .. } => "FQ-006",
            Self::UnsupportedValueKind { .. } => "FQ-007",
            Self::InvalidRange { .. } => "FQ-008",
        }
    }
}

impl GenerateError {
    /// Returns the error code (e.g., "FQ-020").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnmappedField(_) => "FQ-020",
            Self::InvalidCondition(_) => "FQ-021",
            Self::UnsupportedConversion { .. } => "FQ-022",
        }
    }
}

impl Error {
    /// Returns the error code of the wrapped error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.code(),
            Self::Generate(e) => e.code(),
            Self::Io(_) => "FQ-090",
            Self::Serialization(_) => "FQ-091",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
