//! Per-field rewrites of column and value expressions.

use std::fmt::Debug;

use crate::error::GenerateError;

use super::Platform;

/// What a conversion knows about the occurrence it rewrites.
#[derive(Debug, Clone, Copy)]
pub struct ConversionContext<'a> {
    /// Field name.
    pub field: &'a str,
    /// Target platform.
    pub platform: Platform,
}

/// Rewrites the SQL of one field, applied to every value of that field.
pub trait SqlConversion: Debug + Send + Sync {
    /// Name used in errors and configuration.
    fn name(&self) -> &str;

    /// Rewrites the column expression.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnsupportedConversion`] when the platform
    /// cannot express the conversion.
    fn convert_column(&self, column: &str, context: &ConversionContext<'_>) -> Result<String, GenerateError> {
        let _ = context;
        Ok(column.to_string())
    }

    /// Rewrites a value placeholder (`:name_1`).
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnsupportedConversion`] when the platform
    /// cannot express the conversion.
    fn convert_value(&self, placeholder: &str, context: &ConversionContext<'_>) -> Result<String, GenerateError> {
        let _ = context;
        Ok(placeholder.to_string())
    }
}

/// `CAST(x AS type)` on both the column and the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastConversion {
    db_type: String,
}

impl CastConversion {
    /// Casts to `db_type` (e.g. `DATE`, `INTEGER`).
    #[must_use]
    pub fn new(db_type: impl Into<String>) -> Self {
        Self {
            db_type: db_type.into(),
        }
    }
}

impl SqlConversion for CastConversion {
    fn name(&self) -> &str {
        "cast"
    }

    fn convert_column(&self, column: &str, _context: &ConversionContext<'_>) -> Result<String, GenerateError> {
        Ok(format!("CAST({column} AS {})", self.db_type))
    }

    fn convert_value(&self, placeholder: &str, _context: &ConversionContext<'_>) -> Result<String, GenerateError> {
        Ok(format!("CAST({placeholder} AS {})", self.db_type))
    }
}

/// Wraps the column in a function call, e.g. `LOWER(email)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionConversion {
    function: String,
}

impl FunctionConversion {
    /// Applies `function` to the column.
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
        }
    }
}

impl SqlConversion for FunctionConversion {
    fn name(&self) -> &str {
        "function"
    }

    fn convert_column(&self, column: &str, _context: &ConversionContext<'_>) -> Result<String, GenerateError> {
        Ok(format!("{}({column})", self.function))
    }
}

/// Turns a birth date column into an age in whole years, so users can
/// search an integer `age` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgeConversion;

impl SqlConversion for AgeConversion {
    fn name(&self) -> &str {
        "age"
    }

    fn convert_column(&self, column: &str, context: &ConversionContext<'_>) -> Result<String, GenerateError> {
        match context.platform {
            Platform::Postgres => Ok(format!("CAST(EXTRACT(YEAR FROM AGE({column})) AS INTEGER)")),
            Platform::Mysql => Ok(format!("TIMESTAMPDIFF(YEAR, {column}, CURDATE())")),
            Platform::Sqlite => Ok(format!(
                "CAST(strftime('%Y.%m%d', 'now') - strftime('%Y.%m%d', {column}) AS INTEGER)"
            )),
            Platform::Dql => Err(GenerateError::UnsupportedConversion {
                field: context.field.to_string(),
                conversion: self.name().to_string(),
                platform: context.platform.to_string(),
            }),
        }
    }
}
