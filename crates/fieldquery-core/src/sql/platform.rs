//! Target dialects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// SQL dialect the generator writes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// PostgreSQL.
    #[default]
    Postgres,
    /// MySQL / MariaDB.
    Mysql,
    /// SQLite.
    Sqlite,
    /// Doctrine Query Language.
    Dql,
}

/// How a platform expresses pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternStyle {
    /// Wildcards are part of the bound parameter: `col LIKE :p ESCAPE '\'`.
    BoundLike,
    /// Wildcards are concatenated in the query: `col LIKE CONCAT('%', :p, '%')`.
    ConcatLike,
    /// Case-sensitive glob: `col GLOB :p`.
    Glob,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Self; 4] = [Self::Postgres, Self::Mysql, Self::Sqlite, Self::Dql];

    /// Platform name as used in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Dql => "dql",
        }
    }

    /// Quotes an identifier, part by part for qualified names.
    ///
    /// DQL refers to entity aliases and properties, which are never quoted.
    #[must_use]
    pub fn quote_identifier(self, identifier: &str) -> String {
        let quote = match self {
            Self::Postgres | Self::Sqlite => '"',
            Self::Mysql => '`',
            Self::Dql => return identifier.to_string(),
        };
        identifier
            .split('.')
            .map(|part| {
                let doubled = part.replace(quote, &format!("{quote}{quote}"));
                format!("{quote}{doubled}{quote}")
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `ESCAPE` clause for `LIKE`, with a leading space.
    ///
    /// MySQL reads backslashes in string literals as escapes, so the escape
    /// character itself has to be doubled there.
    #[must_use]
    pub const fn like_escape_clause(self) -> &'static str {
        match self {
            Self::Mysql => r" ESCAPE '\\'",
            Self::Postgres | Self::Sqlite | Self::Dql => r" ESCAPE '\'",
        }
    }

    pub(crate) const fn pattern_style(self, case_insensitive: bool) -> PatternStyle {
        match self {
            Self::Dql => PatternStyle::ConcatLike,
            // SQLite's LIKE ignores ASCII case.
            Self::Sqlite if !case_insensitive => PatternStyle::Glob,
            Self::Postgres | Self::Mysql | Self::Sqlite => PatternStyle::BoundLike,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgsql" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "sqlite" => Ok(Self::Sqlite),
            "dql" | "orm" => Ok(Self::Dql),
            other => Err(ConfigError::InvalidValue {
                key: "sql.platform".to_string(),
                message: format!("unknown platform '{other}', expected postgres, mysql, sqlite or dql"),
            }),
        }
    }
}
