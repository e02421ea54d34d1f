// Executor module - the gateway's outward surface
//
// - dispatch: execution shapes, scoped handle release, the plain execute loop
//
// An executor borrows one connection mutably for its lifetime. Every operation acquires
// the handles it needs, uses them, and releases them before returning.

pub(crate) mod dispatch;

use std::sync::Arc;

use crate::change::Change;
use crate::connection::{DatabaseConnection, PreparedHandle};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::dialect::{Dialect, DialectKind};
use crate::error::{DriverError, SqlGatewayError};
use crate::render::{render, render_single};
use crate::results::{QueryResult, RowMapping, UpdateResult};
use crate::statement::{PreparedStatementFactory, Statement};
use crate::types::SqlValue;
use crate::visitor::SqlVisitor;

use dispatch::Strategy;

/// Runs statements against a borrowed connection.
///
/// # Examples
/// ```rust,no_run
/// use sql_gateway::prelude::*;
///
/// # fn demo() -> Result<(), SqlGatewayError> {
/// let mut conn = SqliteConnection::open_in_memory()?;
/// let mut executor = Executor::new(&mut conn);
/// executor.execute(&Statement::raw("CREATE TABLE t (id INTEGER)"), &[])?;
/// let rows = executor.query(&Statement::raw("SELECT id FROM t"), &[])?;
/// assert!(rows.is_empty());
/// # Ok(()) }
/// ```
pub struct Executor<'c> {
    connection: &'c mut dyn DatabaseConnection,
    dialect: Arc<dyn Dialect>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<'c> Executor<'c> {
    /// Executor with the dialect detected from the connection URL and `tracing` diagnostics.
    pub fn new(connection: &'c mut dyn DatabaseConnection) -> Self {
        ExecutorBuilder::new(connection).build()
    }

    pub fn builder(connection: &'c mut dyn DatabaseConnection) -> ExecutorBuilder<'c> {
        ExecutorBuilder::new(connection)
    }

    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Address of the borrowed connection.
    #[must_use]
    pub fn address(&self) -> &str {
        self.connection.url()
    }

    /// The gateway always writes to the database it is connected to.
    #[must_use]
    pub fn updates_database(&self) -> bool {
        true
    }

    /// Run a single-statement read and collect every row.
    ///
    /// # Errors
    /// - `ConnectionUnavailable` if the connection is offline.
    /// - `MultiStatementNotAllowed` unless the statement renders to exactly one string.
    /// - `DriverFailure` if the driver fails while acquiring, executing, or fetching.
    pub fn query(
        &mut self,
        statement: &Statement,
        visitors: &[Arc<dyn SqlVisitor>],
    ) -> Result<QueryResult, SqlGatewayError> {
        self.ensure_online()?;
        let (concrete, sql) = render_single(statement, self.dialect.as_ref(), visitors, "query")?;
        self.diagnostics.debug(&format!("executing query: {sql}"));
        Strategy::for_statement(&concrete)
            .query(&mut *self.connection, &sql)
            .map_err(|source| self.driver_failure(&[&sql], source))
    }

    /// Run a single-statement write and report the affected row count.
    ///
    /// # Errors
    /// - `UnsupportedOperation` for callable statements, before anything is acquired.
    /// - Otherwise the same failures as [`Executor::query`].
    pub fn update(
        &mut self,
        statement: &Statement,
        visitors: &[Arc<dyn SqlVisitor>],
    ) -> Result<UpdateResult, SqlGatewayError> {
        if statement.is_callable() {
            return Err(callable_update());
        }
        self.ensure_online()?;
        let (concrete, sql) = render_single(statement, self.dialect.as_ref(), visitors, "update")?;
        if concrete.is_callable() {
            return Err(callable_update());
        }
        self.diagnostics.debug(&format!("executing update: {sql}"));
        Strategy::for_statement(&concrete)
            .update(&mut *self.connection, &sql)
            .map(UpdateResult::new)
            .map_err(|source| self.driver_failure(&[&sql], source))
    }

    /// Execute a statement for its side effects.
    ///
    /// Prepared statements bind and run themselves; visitors do not apply to them. Changes
    /// run statement by statement through [`Executor::execute_change`]. Anything else renders
    /// to zero or more strings that run in order on one statement handle, stopping at the
    /// first failure. Nothing is rolled back.
    ///
    /// # Errors
    /// - `ConnectionUnavailable` if the connection is offline.
    /// - `DriverFailure` naming every rendered string if any of them fails.
    pub fn execute(
        &mut self,
        statement: &Statement,
        visitors: &[Arc<dyn SqlVisitor>],
    ) -> Result<(), SqlGatewayError> {
        self.ensure_online()?;

        if let Some(prepared) = statement.as_self_executing() {
            let mut factory =
                PreparedStatementFactory::new(&mut *self.connection, self.diagnostics.as_ref());
            return prepared.execute(&mut factory);
        }

        if let Statement::Change(change) = statement {
            return self.execute_change(change.as_ref(), visitors);
        }

        let sql = render(statement, self.dialect.as_ref(), visitors)?;
        dispatch::execute_plain(&mut *self.connection, &sql, self.diagnostics.as_ref())
            .map_err(|source| self.driver_failure(&sql, source))
    }

    /// Execute every statement a change generates, in order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first error from generating or executing the change's statements.
    pub fn execute_change(
        &mut self,
        change: &dyn Change,
        visitors: &[Arc<dyn SqlVisitor>],
    ) -> Result<(), SqlGatewayError> {
        self.ensure_online()?;
        self.diagnostics
            .debug(&format!("executing change: {}", change.description()));
        for statement in change.generate_statements(self.dialect.as_ref())? {
            self.execute(&statement, visitors)?;
        }
        Ok(())
    }

    /// Prepare the statement as a stored-procedure call and hand the handle to `action`.
    ///
    /// Only the first rendered string is used.
    ///
    /// # Errors
    /// - `ConnectionUnavailable` if the connection is offline.
    /// - `MultiStatementNotAllowed` if the statement renders to nothing.
    /// - `DriverFailure` if preparing the call or `action` fails.
    pub fn execute_callable<R, F>(
        &mut self,
        statement: &Statement,
        visitors: &[Arc<dyn SqlVisitor>],
        action: F,
    ) -> Result<R, SqlGatewayError>
    where
        F: FnOnce(&mut dyn PreparedHandle) -> Result<R, DriverError>,
    {
        self.ensure_online()?;
        let rendered = render(statement, self.dialect.as_ref(), visitors)?;
        let Some(sql) = rendered.first() else {
            return Err(SqlGatewayError::MultiStatementNotAllowed {
                operation: "execute_callable",
                count: 0,
            });
        };
        self.diagnostics.debug(&format!("executing callable: {sql}"));
        dispatch::call(&mut *self.connection, sql, action)
            .map_err(|source| self.driver_failure(&[sql], source))
    }

    /// Forward a message to diagnostics. Never touches the connection.
    pub fn comment(&self, message: &str) {
        self.diagnostics.debug(message);
    }

    /// # Errors
    /// Same as [`Executor::query`].
    pub fn query_for_list(
        &mut self,
        statement: &Statement,
        visitors: &[Arc<dyn SqlVisitor>],
    ) -> Result<Vec<RowMapping>, SqlGatewayError> {
        self.query(statement, visitors).map(QueryResult::into_rows)
    }

    /// The single value of a one-row, one-column read.
    ///
    /// # Errors
    /// `UnexpectedResult` for any other shape, plus the failures of [`Executor::query`].
    pub fn query_for_object(
        &mut self,
        statement: &Statement,
        visitors: &[Arc<dyn SqlVisitor>],
    ) -> Result<SqlValue, SqlGatewayError> {
        self.query(statement, visitors)?.single_value().cloned()
    }

    /// # Errors
    /// `UnexpectedResult` if the single value is not integral, plus the failures of
    /// [`Executor::query_for_object`].
    pub fn query_for_long(
        &mut self,
        statement: &Statement,
        visitors: &[Arc<dyn SqlVisitor>],
    ) -> Result<i64, SqlGatewayError> {
        let value = self.query_for_object(statement, visitors)?;
        value.to_i64().ok_or_else(|| {
            SqlGatewayError::UnexpectedResult(format!("expected an integer, got {value:?}"))
        })
    }

    fn ensure_online(&self) -> Result<(), SqlGatewayError> {
        if self.connection.is_offline() {
            return Err(SqlGatewayError::ConnectionUnavailable {
                address: self.connection.url().to_string(),
            });
        }
        Ok(())
    }

    fn driver_failure<S: AsRef<str>>(&self, sql: &[S], source: DriverError) -> SqlGatewayError {
        SqlGatewayError::driver_failure(sql, self.connection.url(), source)
    }
}

fn callable_update() -> SqlGatewayError {
    SqlGatewayError::UnsupportedOperation("update does not support callable statements".into())
}

/// Configures an [`Executor`] before it borrows the connection for good.
pub struct ExecutorBuilder<'c> {
    connection: &'c mut dyn DatabaseConnection,
    dialect: Option<Arc<dyn Dialect>>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl<'c> ExecutorBuilder<'c> {
    pub fn new(connection: &'c mut dyn DatabaseConnection) -> Self {
        Self {
            connection,
            dialect: None,
            diagnostics: None,
        }
    }

    /// Override the dialect detected from the connection URL.
    #[must_use]
    pub fn dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Some(Arc::new(dialect));
        self
    }

    #[must_use]
    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn build(self) -> Executor<'c> {
        let dialect: Arc<dyn Dialect> = match self.dialect {
            Some(dialect) => dialect,
            None => Arc::new(DialectKind::from_url(self.connection.url())),
        };
        let diagnostics: Arc<dyn Diagnostics> = match self.diagnostics {
            Some(diagnostics) => diagnostics,
            None => Arc::new(TracingDiagnostics),
        };
        Executor {
            connection: self.connection,
            dialect,
            diagnostics,
        }
    }
}
