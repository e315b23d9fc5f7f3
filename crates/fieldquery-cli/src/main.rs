#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
//! `fieldquery` CLI - parse search queries and generate SQL from a field set
//! configuration.
//!
//! Usage:
//!   `fieldquery check-config --config ./fieldquery.toml`
//!   `fieldquery parse 'id: 1, 2; name: !"john"'`
//!   `fieldquery sql 'id: 1..10' --platform mysql`
//!   `fieldquery export '{"fields": {"id": {"simple-values": [1]}}}' --input json`

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fieldquery_core::config::DEFAULT_CONFIG_FILE;
use fieldquery_core::Platform;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fieldquery")]
#[command(
    author,
    version,
    about = "fieldquery CLI - typed search conditions to SQL"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file declaring the field set
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Query input format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub(crate) enum InputFormat {
    /// `id: 1, 2; name: !"john"`
    #[default]
    String,
    /// JSON condition tree
    Json,
}

/// Report format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// CLI platform option
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Postgres,
    Mysql,
    Sqlite,
    Dql,
}

impl From<PlatformArg> for Platform {
    fn from(p: PlatformArg) -> Self {
        match p {
            PlatformArg::Postgres => Platform::Postgres,
            PlatformArg::Mysql => Platform::Mysql,
            PlatformArg::Sqlite => Platform::Sqlite,
            PlatformArg::Dql => Platform::Dql,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a query
    Parse {
        /// Query text, or `-` to read standard input
        query: String,

        /// Input format
        #[arg(short, long, value_enum, default_value = "string")]
        input: InputFormat,

        /// Optimize the condition before printing it
        #[arg(long)]
        optimize: bool,

        /// Output format (text, json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate the SQL predicate of a query
    Sql {
        /// Query text, or `-` to read standard input
        query: String,

        /// Input format
        #[arg(short, long, value_enum, default_value = "string")]
        input: InputFormat,

        /// Target platform (defaults to `sql.platform` from the configuration)
        #[arg(short, long, value_enum)]
        platform: Option<PlatformArg>,

        /// Skip the optimizer
        #[arg(long)]
        no_optimize: bool,

        /// Output format (text, json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Convert a query to the string or JSON format
    Export {
        /// Query text, or `-` to read standard input
        query: String,

        /// Input format
        #[arg(short, long, value_enum, default_value = "string")]
        input: InputFormat,

        /// Target format
        #[arg(short, long, value_enum, default_value = "string")]
        to: InputFormat,

        /// Optimize the condition before exporting it
        #[arg(long)]
        optimize: bool,
    },

    /// Validate the configuration and list the field set
    CheckConfig,
}

fn init_tracing(level: &str) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| format!("warn,fieldquery_core={level}"));
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let context = commands::Context::load(&cli.config)?;
    init_tracing(&context.config.logging.level);
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match cli.command {
        Commands::Parse {
            query,
            input,
            optimize,
            format,
        } => {
            let query = commands::read_query(&query)?;
            commands::parse(&context, &query, input, optimize, format)?;
        }
        Commands::Sql {
            query,
            input,
            platform,
            no_optimize,
            format,
        } => {
            let query = commands::read_query(&query)?;
            let platform = platform.map_or(context.config.sql.platform, Platform::from);
            commands::sql(&context, &query, input, platform, !no_optimize, format)?;
        }
        Commands::Export {
            query,
            input,
            to,
            optimize,
        } => {
            let query = commands::read_query(&query)?;
            commands::export(&context, &query, input, to, optimize)?;
        }
        Commands::CheckConfig => {
            commands::check_config(&context);
        }
    }

    Ok(())
}
