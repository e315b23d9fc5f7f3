//! SQL / DQL condition generation.
//!
//! [`SqlConditionGenerator::generate`] walks a condition and returns a
//! parameterized boolean expression plus its bound parameters:
//!
//! ```text
//! id: 1, 2; name: !"john"
//!   -> (id IN (:id_1, :id_2)) AND (name <> :name_1)
//!      id_1 = 1, id_2 = 2, name_1 = "john"
//! ```
//!
//! Within one field, inclusive values (simple values, ranges, `<`, `<=`,
//! `>`, `>=`, positive patterns) are ORed; exclusive values (excluded values
//! and ranges, `<>`, negated patterns) are ANDed; both together become
//! `(inclusive) AND (exclusive)`.

mod conversion;
mod pattern;
mod platform;

pub use conversion::{AgeConversion, CastConversion, ConversionContext, FunctionConversion, SqlConversion};
pub use pattern::{escape_like, like_pattern, LIKE_ESCAPE};
pub use platform::Platform;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::condition::{
    CompareOp, PatternMatch, SearchCondition, SingleValue, ValuesBag, ValuesGroup,
};
use crate::error::GenerateError;
use crate::field::{FieldConfig, FieldSet};
use crate::value::Value;

/// Column a field is stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    column: String,
    quoted: bool,
}

impl ColumnMapping {
    /// Uses `column` verbatim (e.g. `u.name`, or an expression).
    #[must_use]
    pub fn raw(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            quoted: false,
        }
    }

    /// Quotes `column` with the platform's identifier quotes.
    #[must_use]
    pub fn quoted(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            quoted: true,
        }
    }

    /// Column as written in the query.
    #[must_use]
    pub fn expression(&self, platform: Platform) -> String {
        if self.quoted {
            platform.quote_identifier(&self.column)
        } else {
            self.column.clone()
        }
    }
}

/// Field name to column mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMappings {
    columns: IndexMap<String, ColumnMapping>,
}

impl FieldMappings {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, column: ColumnMapping) -> Self {
        self.insert(field, column);
        self
    }

    /// Adds or replaces a mapping.
    pub fn insert(&mut self, field: impl Into<String>, column: ColumnMapping) {
        self.columns.insert(field.into(), column);
    }

    /// Mapping of `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ColumnMapping> {
        self.columns.get(field)
    }

    /// Maps every field to a raw column of the same name.
    #[must_use]
    pub fn identity(field_set: &FieldSet) -> Self {
        field_set.iter().fold(Self::new(), |mappings, field| {
            mappings.with(field.name(), ColumnMapping::raw(field.name()))
        })
    }
}

/// A named value to bind to the generated SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundParameter {
    /// Placeholder name without the leading colon.
    pub name: String,
    /// Value to bind.
    pub value: Value,
}

/// Generated predicate and its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WhereClause {
    /// Boolean SQL expression; empty when the condition has no values.
    pub sql: String,
    /// Parameters in placeholder order.
    pub parameters: Vec<BoundParameter>,
}

impl WhereClause {
    /// Returns `true` when there is nothing to filter on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Value bound to `name` (without colon).
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

/// One piece of SQL; `compound` pieces need parentheses when combined.
#[derive(Debug, Clone)]
struct Part {
    sql: String,
    compound: bool,
}

impl Part {
    fn atom(sql: String) -> Self {
        Self {
            sql,
            compound: false,
        }
    }

    fn wrapped(&self) -> String {
        if self.compound {
            format!("({})", self.sql)
        } else {
            self.sql.clone()
        }
    }

    /// Joins parts, wrapping compound ones.
    fn join(parts: Vec<Self>, connector: &str) -> Option<Self> {
        match parts.len() {
            0 => None,
            1 => parts.into_iter().next(),
            _ => Some(Self {
                sql: parts
                    .iter()
                    .map(Self::wrapped)
                    .collect::<Vec<_>>()
                    .join(&format!(" {connector} ")),
                compound: true,
            }),
        }
    }
}

/// Translates conditions into SQL for one platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlConditionGenerator {
    platform: Platform,
}

impl SqlConditionGenerator {
    /// Creates a generator for `platform`.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Target platform.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Generates the predicate for `condition`.
    ///
    /// The primary condition, when present, is ANDed with the user
    /// condition: `(<primary>) AND (<user>)`.
    ///
    /// # Errors
    ///
    /// - [`GenerateError::InvalidCondition`] if the condition has errors
    /// - [`GenerateError::UnmappedField`] if a used field has no mapping;
    ///   checked before any SQL is built
    /// - [`GenerateError::UnsupportedConversion`] if a field conversion
    ///   cannot be expressed on the platform
    pub fn generate(
        &self,
        condition: &SearchCondition,
        mappings: &FieldMappings,
    ) -> Result<WhereClause, GenerateError> {
        if condition.has_errors() {
            return Err(GenerateError::InvalidCondition(condition.errors().len()));
        }

        let primary = condition.primary_condition();
        let root = condition.values_group();
        for group in primary.into_iter().chain(std::iter::once(root)) {
            check_mapped(group, mappings)?;
        }

        let mut state = GenerationState {
            field_set: condition.field_set(),
            mappings,
            platform: self.platform,
            parameters: Vec::new(),
            counters: FxHashMap::default(),
        };

        let primary_part = primary.map(|group| state.group(group)).transpose()?.flatten();
        let user_part = state.group(root)?;

        let sql = match (primary_part, user_part) {
            (Some(primary), Some(user)) => format!("({}) AND ({})", primary.sql, user.sql),
            (Some(only), None) | (None, Some(only)) => only.sql,
            (None, None) => String::new(),
        };

        tracing::debug!(
            platform = %self.platform,
            length = sql.len(),
            parameters = state.parameters.len(),
            "generated SQL condition"
        );

        Ok(WhereClause {
            sql,
            parameters: state.parameters,
        })
    }
}

fn check_mapped(group: &ValuesGroup, mappings: &FieldMappings) -> Result<(), GenerateError> {
    let mut missing = None;
    group.for_each_field(&mut |name, bag| {
        if missing.is_none() && !bag.is_empty() && mappings.get(name).is_none() {
            missing = Some(name.to_string());
        }
    });
    match missing {
        Some(field) => Err(GenerateError::UnmappedField(field)),
        None => Ok(()),
    }
}

/// Keeps only characters valid in a placeholder name.
fn sanitize(field: &str) -> String {
    field
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

struct GenerationState<'a> {
    field_set: &'a FieldSet,
    mappings: &'a FieldMappings,
    platform: Platform,
    parameters: Vec<BoundParameter>,
    counters: FxHashMap<String, usize>,
}

/// Column and value expressions of one field, conversions applied.
struct FieldContext<'f> {
    field: &'f str,
    column: String,
    conversion: Option<&'f dyn SqlConversion>,
}

impl GenerationState<'_> {
    /// Next parameter name for `field`: `<field>_1`, `<field>_2`, ...
    fn next_name(&mut self, field: &str) -> String {
        let base = sanitize(field);
        let counter = self.counters.entry(base.clone()).or_insert(0);
        *counter += 1;
        format!("{base}_{counter}")
    }

    fn bind(&mut self, field: &str, value: Value) -> String {
        let name = self.next_name(field);
        let placeholder = format!(":{name}");
        self.parameters.push(BoundParameter { name, value });
        placeholder
    }

    /// Binds `value` and returns its (converted) placeholder.
    fn value(&mut self, ctx: &FieldContext<'_>, value: &SingleValue) -> Result<String, GenerateError> {
        let placeholder = self.bind(ctx.field, value.value.clone());
        match ctx.conversion {
            Some(conversion) => conversion.convert_value(&placeholder, &self.context(ctx.field)),
            None => Ok(placeholder),
        }
    }

    fn context<'f>(&self, field: &'f str) -> ConversionContext<'f> {
        ConversionContext {
            field,
            platform: self.platform,
        }
    }

    fn group(&mut self, group: &ValuesGroup) -> Result<Option<Part>, GenerateError> {
        let mut parts = Vec::new();
        for (name, bag) in group.fields() {
            if let Some(part) = self.field(name, bag)? {
                parts.push(part);
            }
        }
        for child in group.groups() {
            if let Some(part) = self.group(child)? {
                parts.push(part);
            }
        }

        if parts.len() < 2 {
            return Ok(parts.pop());
        }
        let sql = parts
            .iter()
            .map(|part| format!("({})", part.sql))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", group.logical()));
        Ok(Some(Part {
            sql,
            compound: true,
        }))
    }

    fn field(&mut self, name: &str, bag: &ValuesBag) -> Result<Option<Part>, GenerateError> {
        if bag.is_empty() {
            return Ok(None);
        }
        let field_set = self.field_set;
        let config: Option<&FieldConfig> = field_set.find(name);
        let conversion = config.and_then(|f| f.conversion()).map(AsRef::as_ref);

        let mappings = self.mappings;
        let mapping = mappings
            .get(name)
            .ok_or_else(|| GenerateError::UnmappedField(name.to_string()))?;
        let mut column = mapping.expression(self.platform);
        if let Some(conversion) = conversion {
            column = conversion.convert_column(&column, &self.context(name))?;
        }
        let ctx = FieldContext {
            field: name,
            column,
            conversion,
        };

        let inclusive = self.inclusive_parts(&ctx, bag)?;
        let exclusive = self.exclusive_parts(&ctx, bag)?;

        Ok(match (Part::join(inclusive, "OR"), Part::join(exclusive, "AND")) {
            (Some(incl), Some(excl)) => Some(Part {
                sql: format!("({}) AND ({})", incl.sql, excl.sql),
                compound: true,
            }),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        })
    }

    fn in_list(
        &mut self,
        ctx: &FieldContext<'_>,
        values: &[SingleValue],
        single: &str,
        list: &str,
    ) -> Result<Option<Part>, GenerateError> {
        let placeholders = values
            .iter()
            .map(|v| self.value(ctx, v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match placeholders.as_slice() {
            [] => None,
            [only] => Some(Part::atom(format!("{} {single} {only}", ctx.column))),
            many => Some(Part::atom(format!(
                "{} {list} ({})",
                ctx.column,
                many.join(", ")
            ))),
        })
    }

    fn inclusive_parts(&mut self, ctx: &FieldContext<'_>, bag: &ValuesBag) -> Result<Vec<Part>, GenerateError> {
        let mut parts = Vec::new();
        parts.extend(self.in_list(ctx, &bag.simple_values, "=", "IN")?);

        for range in &bag.ranges {
            let lower = self.value(ctx, &range.lower)?;
            let upper = self.value(ctx, &range.upper)?;
            let lower_op = if range.inclusive_lower { ">=" } else { ">" };
            let upper_op = if range.inclusive_upper { "<=" } else { "<" };
            parts.push(Part {
                sql: format!(
                    "{col} {lower_op} {lower} AND {col} {upper_op} {upper}",
                    col = ctx.column
                ),
                compound: true,
            });
        }

        for compare in bag.comparisons.iter().filter(|c| c.operator != CompareOp::Ne) {
            let value = self.value(ctx, &compare.value)?;
            parts.push(Part::atom(format!("{} {} {value}", ctx.column, compare.operator)));
        }

        for pattern in bag.pattern_matchers.iter().filter(|p| !p.negated) {
            parts.push(self.pattern(ctx, pattern)?);
        }
        Ok(parts)
    }

    fn exclusive_parts(&mut self, ctx: &FieldContext<'_>, bag: &ValuesBag) -> Result<Vec<Part>, GenerateError> {
        let mut parts = Vec::new();
        parts.extend(self.in_list(ctx, &bag.excluded_simple_values, "<>", "NOT IN")?);

        for range in &bag.excluded_ranges {
            let lower = self.value(ctx, &range.lower)?;
            let upper = self.value(ctx, &range.upper)?;
            let below = if range.inclusive_lower { "<" } else { "<=" };
            let above = if range.inclusive_upper { ">" } else { ">=" };
            parts.push(Part {
                sql: format!(
                    "{col} {below} {lower} OR {col} {above} {upper}",
                    col = ctx.column
                ),
                compound: true,
            });
        }

        for compare in bag.comparisons.iter().filter(|c| c.operator == CompareOp::Ne) {
            let value = self.value(ctx, &compare.value)?;
            parts.push(Part::atom(format!("{} <> {value}", ctx.column)));
        }

        for pattern in bag.pattern_matchers.iter().filter(|p| p.negated) {
            parts.push(self.pattern(ctx, pattern)?);
        }
        Ok(parts)
    }

    /// Binds the pattern parameter; the value conversion wraps its
    /// placeholder like any other value of the field.
    fn pattern(&mut self, ctx: &FieldContext<'_>, pattern: &PatternMatch) -> Result<Part, GenerateError> {
        let name = self.next_name(ctx.field);
        let mut placeholder = format!(":{name}");
        if let Some(conversion) = ctx.conversion {
            placeholder = conversion.convert_value(&placeholder, &self.context(ctx.field))?;
        }
        let translated = pattern::pattern_predicate(self.platform, &ctx.column, &placeholder, pattern);
        self.parameters.push(BoundParameter {
            name,
            value: translated.parameter,
        });
        Ok(Part::atom(translated.sql))
    }
}
