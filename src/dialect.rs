use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SqlGatewayError;
use crate::statement::Statement;

/// Target database dialect, as seen by the renderer.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Short lowercase name, e.g. `"oracle"`.
    fn name(&self) -> &str;

    /// Whether rendered SQL may carry a duplicated trailing `/` separator that must be
    /// collapsed before execution.
    fn requires_separator_fix(&self) -> bool {
        false
    }

    /// Produce the SQL strings for one concrete statement.
    ///
    /// The default emits the statement text unchanged as a single string.
    ///
    /// # Errors
    /// Returns `SqlGatewayError::UnsupportedOperation` when handed an unexpanded change.
    fn generate_sql(&self, statement: &Statement) -> Result<Vec<String>, SqlGatewayError> {
        match statement.sql_text() {
            Some(sql) => Ok(vec![sql.to_string()]),
            None => Err(SqlGatewayError::UnsupportedOperation(
                "changes must be expanded before SQL generation".to_string(),
            )),
        }
    }
}

/// The built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// Anything not recognised
    #[default]
    Generic,
    /// `SQLite`
    Sqlite,
    /// `PostgreSQL`
    #[value(alias = "postgresql")]
    Postgres,
    /// `MySQL` / `MariaDB`
    #[value(alias = "mariadb")]
    Mysql,
    /// SQL Server
    #[value(alias = "sqlserver")]
    Mssql,
    /// Oracle
    Oracle,
}

impl DialectKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DialectKind::Generic => "generic",
            DialectKind::Sqlite => "sqlite",
            DialectKind::Postgres => "postgres",
            DialectKind::Mysql => "mysql",
            DialectKind::Mssql => "mssql",
            DialectKind::Oracle => "oracle",
        }
    }

    /// Detect the dialect from a connection URL.
    ///
    /// Understands `jdbc:`-prefixed URLs, the usual driver schemes, bare `SQLite` paths, and
    /// `offline:<dialect>` URLs. Anything else is [`DialectKind::Generic`].
    /// ```rust
    /// use sql_gateway::prelude::*;
    ///
    /// assert_eq!(DialectKind::from_url("jdbc:oracle:thin:@db:1521/XE"), DialectKind::Oracle);
    /// assert_eq!(DialectKind::from_url("postgresql://localhost/app"), DialectKind::Postgres);
    /// assert_eq!(DialectKind::from_url("offline:mssql"), DialectKind::Mssql);
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let lowered = url.trim().to_ascii_lowercase();
        if let Some(rest) = lowered.strip_prefix("offline:") {
            let name = rest.split(['?', '&', ';']).next().unwrap_or_default();
            return <Self as ValueEnum>::from_str(name, true).unwrap_or_default();
        }

        let url = lowered.strip_prefix("jdbc:").unwrap_or(&lowered);
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "sqlite" => DialectKind::Sqlite,
            "postgres" | "postgresql" => DialectKind::Postgres,
            "mysql" | "mariadb" => DialectKind::Mysql,
            "sqlserver" | "mssql" => DialectKind::Mssql,
            "oracle" => DialectKind::Oracle,
            _ if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" => {
                DialectKind::Sqlite
            }
            _ => DialectKind::Generic,
        }
    }
}

impl Dialect for DialectKind {
    fn name(&self) -> &str {
        DialectKind::name(*self)
    }

    fn requires_separator_fix(&self) -> bool {
        matches!(self, DialectKind::Oracle)
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(DialectKind::name(*self))
    }
}

impl FromStr for DialectKind {
    type Err = SqlGatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s.trim(), true)
            .map_err(|e| SqlGatewayError::Configuration(format!("unknown dialect {s:?}: {e}")))
    }
}
