use std::fmt;

use crate::dialect::Dialect;
use crate::error::SqlGatewayError;
use crate::statement::Statement;
use crate::translation::{SplitOptions, split_statements};

/// A higher-level operation that expands into zero or more statements for a dialect.
pub trait Change: fmt::Debug + Send + Sync {
    /// # Errors
    /// Returns `SqlGatewayError` if the change cannot be expressed for `dialect`.
    fn generate_statements(&self, dialect: &dyn Dialect)
    -> Result<Vec<Statement>, SqlGatewayError>;

    /// One-line summary used in diagnostics.
    fn description(&self) -> String {
        "change".to_string()
    }
}

/// A block of SQL text, optionally split into one raw statement per delimiter.
///
/// ```rust
/// use sql_gateway::prelude::*;
///
/// let change = SqlChange::new("INSERT INTO t VALUES (1);\nINSERT INTO t VALUES (2);");
/// let statements = change.generate_statements(&DialectKind::Sqlite).unwrap();
/// assert_eq!(statements.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlChange {
    sql: String,
    split_statements: bool,
    strip_comments: bool,
    end_delimiter: Option<String>,
}

impl SqlChange {
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            split_statements: true,
            strip_comments: false,
            end_delimiter: None,
        }
    }

    #[must_use]
    pub fn split_statements(mut self, split: bool) -> Self {
        self.split_statements = split;
        self
    }

    #[must_use]
    pub fn strip_comments(mut self, strip: bool) -> Self {
        self.strip_comments = strip;
        self
    }

    /// Replace the default `;` / `GO` / `/` delimiters with `delimiter`.
    #[must_use]
    pub fn end_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.end_delimiter = Some(delimiter.into());
        self
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl Change for SqlChange {
    fn generate_statements(
        &self,
        _dialect: &dyn Dialect,
    ) -> Result<Vec<Statement>, SqlGatewayError> {
        let options = SplitOptions {
            split: self.split_statements,
            strip_comments: self.strip_comments,
            delimiter: self.end_delimiter.clone(),
        };
        Ok(split_statements(&self.sql, &options)
            .into_iter()
            .map(Statement::Raw)
            .collect())
    }

    fn description(&self) -> String {
        let first_line = self.sql.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        format!("sql: {}", first_line.trim())
    }
}
