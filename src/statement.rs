use std::sync::Arc;

use crate::change::Change;
use crate::executor::dispatch;
use crate::connection::{DatabaseConnection, PreparedHandle};
use crate::diagnostics::Diagnostics;
use crate::error::{DriverError, SqlGatewayError};
use crate::types::SqlValue;

/// An executable unit handed to the [`Executor`](crate::executor::Executor).
#[derive(Debug, Clone)]
pub enum Statement {
    /// Plain SQL text, executed as-is.
    Raw(String),
    /// A parameterized statement with its values bound in order.
    Prepared(PreparedSql),
    /// A stored-procedure call.
    Callable(String),
    /// A higher-level change, expanded into concrete statements before execution.
    Change(Arc<dyn Change>),
}

impl Statement {
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Statement::Raw(sql.into())
    }

    #[must_use]
    pub fn prepared(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Statement::Prepared(PreparedSql::new(sql, params))
    }

    #[must_use]
    pub fn callable(sql: impl Into<String>) -> Self {
        Statement::Callable(sql.into())
    }

    #[must_use]
    pub fn change(change: impl Change + 'static) -> Self {
        Statement::Change(Arc::new(change))
    }

    /// SQL text of a concrete statement; `None` for changes.
    #[must_use]
    pub fn sql_text(&self) -> Option<&str> {
        match self {
            Statement::Raw(sql) | Statement::Callable(sql) => Some(sql),
            Statement::Prepared(prepared) => Some(prepared.sql()),
            Statement::Change(_) => None,
        }
    }

    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Statement::Callable(_))
    }

    /// The statement, if it binds and runs itself instead of going through the shared
    /// dispatch path.
    #[must_use]
    pub fn as_self_executing(&self) -> Option<&PreparedSql> {
        match self {
            Statement::Prepared(prepared) => Some(prepared),
            _ => None,
        }
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Statement::raw(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Statement::Raw(sql)
    }
}

/// SQL template plus the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSql {
    sql: String,
    params: Vec<SqlValue>,
}

impl PreparedSql {
    #[must_use]
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Prepare, bind, and run this statement through `factory`.
    ///
    /// # Errors
    /// Returns `SqlGatewayError::DriverFailure` if preparing, binding, or executing fails.
    pub fn execute(&self, factory: &mut PreparedStatementFactory<'_>) -> Result<(), SqlGatewayError> {
        factory.run(&self.sql, |handle| {
            bind_all(handle, &self.params)?;
            handle.execute()
        })
    }
}

pub(crate) fn bind_all(
    handle: &mut dyn PreparedHandle,
    params: &[SqlValue],
) -> Result<(), DriverError> {
    for (position, value) in params.iter().enumerate() {
        handle.bind(position, value)?;
    }
    Ok(())
}

/// Hands self-executing statements a way to prepare SQL on the borrowed connection.
///
/// The prepared handle is scoped to [`PreparedStatementFactory::run`] and released before
/// any error is translated.
pub struct PreparedStatementFactory<'c> {
    connection: &'c mut dyn DatabaseConnection,
    diagnostics: &'c dyn Diagnostics,
}

impl<'c> PreparedStatementFactory<'c> {
    pub(crate) fn new(
        connection: &'c mut dyn DatabaseConnection,
        diagnostics: &'c dyn Diagnostics,
    ) -> Self {
        Self {
            connection,
            diagnostics,
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        self.connection.url()
    }

    /// Prepare `sql`, run `work` against the handle, and release it.
    ///
    /// # Errors
    /// Returns `SqlGatewayError::DriverFailure` wrapping any driver error from preparing or
    /// from `work`.
    pub fn run<R, F>(&mut self, sql: &str, work: F) -> Result<R, SqlGatewayError>
    where
        F: FnOnce(&mut dyn PreparedHandle) -> Result<R, DriverError>,
    {
        let address = self.connection.url().to_string();
        self.diagnostics
            .debug(&format!("executing prepared statement: {sql}"));
        self.connection
            .prepare_statement(sql)
            .and_then(|handle| dispatch::scoped(handle, |handle| work(handle)))
            .map_err(|source| SqlGatewayError::driver_failure(&[sql], &address, source))
    }
}
