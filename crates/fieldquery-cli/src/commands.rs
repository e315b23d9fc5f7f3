//! Subcommand implementations.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _};
use colored::Colorize;
use fieldquery_core::{
    ConditionExporter, ConditionOptimizer, FieldQueryConfig, FieldSet, InputProcessor, JsonExporter,
    JsonInput, Platform, ProcessorConfig, SearchCondition, SqlConditionGenerator, StringExporter,
    StringQueryInput, TypeRegistry,
};
use serde_json::json;

use crate::output;
use crate::{InputFormat, OutputFormat};

/// Loaded configuration and the field set built from it.
pub struct Context {
    pub config: FieldQueryConfig,
    pub field_set: Arc<FieldSet>,
}

impl Context {
    /// Loads, validates and builds the configuration at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            bail!("Configuration file not found: {}", path.display());
        }
        let config = FieldQueryConfig::load_from_path(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        let field_set = config
            .build_field_set(&TypeRegistry::with_builtin_types())
            .with_context(|| format!("Invalid field set in {}", path.display()))?;

        Ok(Self {
            config,
            field_set: Arc::new(field_set),
        })
    }

    fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig::new(Arc::clone(&self.field_set)).with_limits(&self.config.processor)
    }

    fn process(&self, query: &str, input: InputFormat) -> SearchCondition {
        let config = self.processor_config();
        match input {
            InputFormat::String => StringQueryInput::new().process(&config, query),
            InputFormat::Json => JsonInput::new().process(&config, query),
        }
    }
}

/// Returns `query`, or standard input when it is `-`.
pub fn read_query(query: &str) -> anyhow::Result<String> {
    if query != "-" {
        return Ok(query.to_string());
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read query from standard input")?;
    Ok(buffer)
}

fn ensure_valid(condition: &SearchCondition) -> anyhow::Result<()> {
    if condition.is_valid() {
        Ok(())
    } else {
        bail!("Query is invalid ({} error(s))", condition.errors().len())
    }
}

pub fn parse(
    context: &Context,
    query: &str,
    input: InputFormat,
    optimize: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut condition = context.process(query, input);
    if optimize {
        condition = ConditionOptimizer::new().optimize(condition);
    }

    match format {
        OutputFormat::Json => {
            let report = json!({
                "valid": condition.is_valid(),
                "condition": JsonExporter::new().to_value(&condition),
                "errors": condition.errors(),
                "warnings": condition.warnings(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if condition.is_valid() {
                println!("{} {}", "✓".green(), "Query is valid".green().bold());
                println!("  {}", StringExporter::new().export(&condition));
                println!("  {} value(s)", condition.values_group().count_values());
            } else {
                println!("{} {}", "✗".red(), "Query is invalid".red().bold());
                println!("{}", output::messages_table(condition.errors()));
            }
            if !condition.warnings().is_empty() {
                println!("{}", "Warnings:".yellow().bold());
                println!("{}", output::messages_table(condition.warnings()));
            }
        }
    }

    ensure_valid(&condition)
}

pub fn sql(
    context: &Context,
    query: &str,
    input: InputFormat,
    platform: Platform,
    optimize: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut condition = context.process(query, input);
    if !condition.is_valid() {
        println!("{}", output::messages_table(condition.errors()));
        return ensure_valid(&condition);
    }
    if optimize {
        condition = ConditionOptimizer::new().optimize(condition);
    }

    let clause = SqlConditionGenerator::new(platform)
        .generate(&condition, &context.config.field_mappings())
        .context("SQL generation failed")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&clause)?),
        OutputFormat::Text => {
            if clause.is_empty() {
                println!("{}", "No conditions.".dimmed());
            } else {
                println!("{}", clause.sql);
                println!("{}", output::parameters_table(&clause.parameters));
            }
        }
    }
    Ok(())
}

pub fn export(
    context: &Context,
    query: &str,
    input: InputFormat,
    to: InputFormat,
    optimize: bool,
) -> anyhow::Result<()> {
    let mut condition = context.process(query, input);
    if !condition.is_valid() {
        println!("{}", output::messages_table(condition.errors()));
        return ensure_valid(&condition);
    }
    if optimize {
        condition = ConditionOptimizer::new().optimize(condition);
    }

    let exported = match to {
        InputFormat::String => StringExporter::new().export(&condition),
        InputFormat::Json => JsonExporter::pretty().export(&condition),
    };
    println!("{exported}");
    Ok(())
}

pub fn check_config(context: &Context) {
    println!("{}", output::fields_table(&context.config, &context.field_set));
    println!(
        "{} Field set '{}' with {} field(s), platform {}",
        "✓".green(),
        context.field_set.name(),
        context.field_set.len(),
        context.config.sql.platform,
    );
}
