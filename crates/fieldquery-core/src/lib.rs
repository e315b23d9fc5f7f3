//! # `fieldquery` Core
//!
//! Typed search conditions for end-user queries.
//!
//! A [`FieldSet`] declares which fields can be searched and how their values
//! are parsed and compared. User input (a compact query string or JSON) is
//! turned into a [`SearchCondition`] tree, optimized, and translated into a
//! parameterized SQL or DQL predicate.
//!
//! ## Features
//!
//! - **Typed values**: integer, decimal, money, date, datetime, text,
//!   boolean and choice fields, plus custom types through [`TypeRegistry`]
//! - **Two input formats**: `id: 1, 2; name: !"john"` and a JSON tree
//! - **Errors as data**: invalid input never panics or unwinds; every
//!   problem is reported with a path and a template
//! - **Optimizer**: merges overlapping ranges, drops covered and duplicate
//!   values
//! - **SQL/DQL**: PostgreSQL, MySQL, SQLite and Doctrine DQL with bound
//!   parameters only
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fieldquery_core::{
//!     ConditionOptimizer, FieldMappings, FieldSet, FieldType, InputProcessor, Platform,
//!     ProcessorConfig, SqlConditionGenerator, StringQueryInput,
//! };
//!
//! let field_set = Arc::new(
//!     FieldSet::builder("customers")
//!         .add_field("id", FieldType::integer())
//!         .add_field("name", FieldType::text())
//!         .build()?,
//! );
//!
//! let config = ProcessorConfig::new(Arc::clone(&field_set));
//! let condition = StringQueryInput::new().process(&config, "id: 1, 2; name: !\"john\"");
//! assert!(condition.is_valid());
//!
//! let condition = ConditionOptimizer::new().optimize(condition);
//! let clause = SqlConditionGenerator::new(Platform::Postgres)
//!     .generate(&condition, &FieldMappings::identity(&field_set))?;
//! assert_eq!(clause.sql, "(id IN (:id_1, :id_2)) AND (name <> :name_1)");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::single_match_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::unused_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::missing_errors_doc)]

pub mod condition;
pub mod config;
pub mod error;
#[cfg(test)]
mod error_tests;
pub mod export;
pub mod field;
pub mod input;
pub mod matcher;
#[cfg(test)]
mod matcher_tests;
pub mod optimizer;
pub mod sql;
#[cfg(test)]
mod test_fixtures;
pub mod value;

pub use condition::{
    Compare, CompareOp, ConditionErrorMessage, GroupBuilder, Logical, PatternKind, PatternMatch,
    Range, SearchCondition, SearchConditionBuilder, SingleValue, ValuesBag, ValuesBagBuilder,
    ValuesGroup,
};
pub use config::{
    ConversionDefinition, FieldDefinition, FieldQueryConfig, FieldSetConfig, LoggingConfig,
    ProcessorLimits, SqlConfig,
};
pub use error::{ConfigError, Error, GenerateError, Result};
pub use export::{ConditionExporter, JsonExporter, StringExporter};
pub use field::{FieldConfig, FieldOptions, FieldSet, FieldSetBuilder, FieldType, TypeKind, TypeRegistry};
pub use input::{
    InputProcessor, JsonInput, ProcessorConfig, StringQueryInput, SyntaxError, SyntaxErrorKind,
};
pub use matcher::Record;
pub use optimizer::ConditionOptimizer;
pub use sql::{
    AgeConversion, BoundParameter, CastConversion, ColumnMapping, FieldMappings,
    FunctionConversion, Platform, SqlConditionGenerator, SqlConversion, WhereClause,
};
pub use value::{
    ComparisonError, Decimal, Money, TransformationFailed, Value, ValueComparator, ValueTransformer,
};
