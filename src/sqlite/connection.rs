use rusqlite::params_from_iter;
use rusqlite::types::Value;

use crate::connection::{DatabaseConnection, PreparedHandle, Resource, StatementHandle};
use crate::cursor::RowCursor;
use crate::error::{DriverError, SqlGatewayError};
use crate::types::SqlValue;

use super::config::SqliteOptions;
use super::values::{buffer_rows, to_sqlite_value};

/// A blocking `SQLite` connection the gateway can borrow.
///
/// `SQLite` has no stored procedures, so callable statements are prepared like any other.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
    url: String,
}

impl SqliteConnection {
    /// Open (or create) the database described by `options`.
    ///
    /// # Errors
    /// - `SqlGatewayError::Configuration` if the database cannot be opened.
    /// - `SqlGatewayError::DriverFailure` if applying the busy timeout or WAL mode fails.
    pub fn open(options: &SqliteOptions) -> Result<Self, SqlGatewayError> {
        let url = format!("sqlite:{}", options.db_path);
        let opened = if options.is_in_memory() {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&options.db_path)
        };
        let conn = opened.map_err(|e| {
            SqlGatewayError::Configuration(format!(
                "failed to open SQLite database {}: {e}",
                options.db_path
            ))
        })?;

        if let Some(timeout) = options.busy_timeout {
            conn.busy_timeout(timeout).map_err(|source| {
                SqlGatewayError::driver_failure(&["PRAGMA busy_timeout"], &url, source.into())
            })?;
        }

        // WAL does not apply to in-memory databases
        if options.wal && !options.is_in_memory() {
            let pragma = "PRAGMA journal_mode = WAL;";
            conn.execute_batch(pragma).map_err(|source| {
                SqlGatewayError::driver_failure(&[pragma], &url, source.into())
            })?;
        }

        tracing::debug!(
            target: "sql_gateway",
            db_path = %options.db_path,
            wal = options.wal,
            "opened SQLite connection"
        );
        Ok(Self { conn, url })
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// See [`SqliteConnection::open`].
    pub fn open_in_memory() -> Result<Self, SqlGatewayError> {
        SqliteOptions::new(":memory:").open()
    }

    /// Borrow the underlying rusqlite connection.
    #[must_use]
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl DatabaseConnection for SqliteConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn create_statement(&mut self) -> Result<Box<dyn StatementHandle + '_>, DriverError> {
        Ok(Box::new(SqliteStatementHandle { conn: &self.conn }))
    }

    fn prepare_statement(
        &mut self,
        sql: &str,
    ) -> Result<Box<dyn PreparedHandle + '_>, DriverError> {
        let stmt = self.conn.prepare(sql)?;
        Ok(Box::new(SqlitePreparedHandle {
            stmt: Some(stmt),
            params: Vec::new(),
        }))
    }

    fn prepare_call(&mut self, sql: &str) -> Result<Box<dyn PreparedHandle + '_>, DriverError> {
        self.prepare_statement(sql)
    }
}

fn rows_affected(count: usize) -> Result<u64, DriverError> {
    u64::try_from(count).map_err(|e| DriverError::Conversion(e.to_string()))
}

struct SqliteStatementHandle<'c> {
    conn: &'c rusqlite::Connection,
}

impl Resource for SqliteStatementHandle<'_> {
    // plain statements are prepared and finalized per execution
    fn close(&mut self) {}
}

impl StatementHandle for SqliteStatementHandle<'_> {
    fn set_escape_processing(&mut self, enabled: bool) {
        tracing::trace!(target: "sql_gateway", enabled, "escape processing has no effect on SQLite");
    }

    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn execute_query(&mut self, sql: &str) -> Result<Box<dyn RowCursor + '_>, DriverError> {
        let mut stmt = self.conn.prepare(sql)?;
        let cursor = buffer_rows(&mut stmt, [])?;
        Ok(Box::new(cursor))
    }

    fn execute_update(&mut self, sql: &str) -> Result<u64, DriverError> {
        rows_affected(self.conn.execute(sql, [])?)
    }
}

struct SqlitePreparedHandle<'c> {
    stmt: Option<rusqlite::Statement<'c>>,
    params: Vec<Value>,
}

impl<'c> SqlitePreparedHandle<'c> {
    fn parts(&mut self) -> Result<(&mut rusqlite::Statement<'c>, &[Value]), DriverError> {
        match self.stmt.as_mut() {
            Some(stmt) => Ok((stmt, &self.params)),
            None => Err(DriverError::message("prepared statement is already closed")),
        }
    }
}

impl Resource for SqlitePreparedHandle<'_> {
    fn close(&mut self) {
        // dropping the statement finalizes it
        self.stmt = None;
        self.params.clear();
    }
}

impl PreparedHandle for SqlitePreparedHandle<'_> {
    fn bind(&mut self, position: usize, value: &SqlValue) -> Result<(), DriverError> {
        if self.params.len() <= position {
            self.params.resize(position + 1, Value::Null);
        }
        self.params[position] = to_sqlite_value(value);
        Ok(())
    }

    fn execute(&mut self) -> Result<(), DriverError> {
        let (stmt, params) = self.parts()?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        while rows.next()?.is_some() {}
        Ok(())
    }

    fn execute_query(&mut self) -> Result<Box<dyn RowCursor + '_>, DriverError> {
        let (stmt, params) = self.parts()?;
        let cursor = buffer_rows(stmt, params_from_iter(params.iter()))?;
        Ok(Box::new(cursor))
    }

    fn execute_update(&mut self) -> Result<u64, DriverError> {
        let (stmt, params) = self.parts()?;
        rows_affected(stmt.execute(params_from_iter(params.iter()))?)
    }
}
